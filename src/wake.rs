// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Waking a vehicle and waiting for it to come online.
//!
//! A sleeping vehicle will not answer queries or accept commands, so
//! nearly everything the command-line tool does starts by sending a wake
//! signal and polling the account until the vehicle reports that it is
//! [online](PowerState::Online). Waking is asynchronous on Tesla's end,
//! so the vehicle handle's own state is only trusted before polling
//! begins; after that, every poll re-fetches the vehicle from its
//! [`VehicleDirectory`].
//!
//! [`WakeCoordinator`] runs the polling loop. Time is read and slept
//! through a [`Clock`], so tests can run the whole loop without waiting,
//! and every iteration is reduced to a [`Step`] by [`next_step()`], a
//! pure function of the attempt and the [`WakePolicy`].

use crate::clock::{Clock, TimeDelta, format_elapsed};
use crate::http::HTTPError;
use crate::tesla::thing::{self, PowerState};
use colored::Colorize;
use log::{debug, warn};
use std::num::NonZeroU32;
use std::time::Duration;
use thiserror::Error;

/// Default number of seconds to wait between polls.
pub const DEFAULT_RETRY_DELAY_SECS: u64 = 3;

/// Default number of polls before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 100;

/// The wake signal is sent again on every `REWAKE_INTERVAL`th poll, in
/// case the API dropped the first one.
pub const REWAKE_INTERVAL: u32 = 10;

/// A remote vehicle that can be woken up.
pub trait VehicleHandle: Send {
    /// Vehicle identification number.
    fn vin(&self) -> &str;

    /// Human-readable name of the vehicle.
    fn display_name(&self) -> &str;

    /// The most recently known power state.
    ///
    /// This may be stale; it is only refreshed when the handle itself
    /// talks to the API.
    fn state(&self) -> &PowerState;

    /// Asks the vehicle to wake up.
    ///
    /// Returning successfully does not mean that the vehicle is awake,
    /// only that the request was delivered.
    fn wake(&mut self) -> impl Future<Output = Result<(), LookupError>> + Send;
}

/// Something that knows which vehicles are registered to an account,
/// and what state they are currently in.
pub trait VehicleDirectory: Sync {
    /// The vehicles listed by this directory.
    type Vehicle: VehicleHandle;

    /// Fetches a fresh listing of every vehicle.
    fn list_vehicles(&self) -> impl Future<Output = Result<Vec<Self::Vehicle>, LookupError>> + Send;

    /// Fetches a fresh copy of the vehicle with the given `vin`.
    ///
    /// Returns [`LookupError::NotFound`] if no such vehicle is listed.
    fn find_vehicle(
        &self,
        vin: &str,
    ) -> impl Future<Output = Result<Self::Vehicle, LookupError>> + Send {
        async move {
            self.list_vehicles()
                .await?
                .into_iter()
                .find(|v| v.vin() == vin)
                .ok_or_else(|| LookupError::NotFound(vin.to_string()))
        }
    }
}

/// Receives notifications about the progress of a wake-up.
///
/// Notifications are informational only; they have no bearing on
/// whether a wake-up succeeds.
pub trait Progress: Sync {
    /// Called before every poll with the last known state.
    fn waiting(&self, name: &str, state: &PowerState);

    /// Called when the wake signal is about to be sent again.
    fn rewaking(&self, name: &str);

    /// Called once the vehicle is known to be online.
    fn online(&self, name: &str, state: &PowerState, elapsed: TimeDelta);
}

impl<P: Progress> Progress for &P {
    fn waiting(&self, name: &str, state: &PowerState) {
        (**self).waiting(name, state)
    }

    fn rewaking(&self, name: &str) {
        (**self).rewaking(name)
    }

    fn online(&self, name: &str, state: &PowerState, elapsed: TimeDelta) {
        (**self).online(name, state, elapsed)
    }
}

/// Prints progress notifications to the terminal in color.
#[derive(Debug, Default)]
pub struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn waiting(&self, name: &str, state: &PowerState) {
        println!(
            "{}",
            format!("{name} is {state}, waiting for it to wake up...").blue()
        );
    }

    fn rewaking(&self, _name: &str) {
        println!("{}", "Calling wake up again...".yellow());
    }

    fn online(&self, name: &str, state: &PowerState, elapsed: TimeDelta) {
        debug!("{name} came online after {}", format_elapsed(elapsed));
        println!("{}", format!("{name} is {state}!").green());
    }
}

/// How long and how often to poll a waking vehicle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WakePolicy {
    retry_delay: Duration,
    max_attempts: NonZeroU32,
}

impl WakePolicy {
    /// Creates a new policy that waits `retry_delay_secs` seconds between
    /// polls and polls at most `max_attempts` times.
    ///
    /// A delay of zero is fine. Returns [`WakeError::InvalidAttempts`] if
    /// `max_attempts` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use tesla_cli::wake::WakePolicy;
    /// assert!(WakePolicy::new(0, 1).is_ok());
    /// assert!(WakePolicy::new(3, 0).is_err());
    /// ```
    pub fn new(retry_delay_secs: u64, max_attempts: u32) -> Result<Self, WakeError> {
        let max_attempts =
            NonZeroU32::new(max_attempts).ok_or(WakeError::InvalidAttempts(max_attempts))?;
        let retry_delay = Duration::from_secs(retry_delay_secs);
        Ok(Self {
            retry_delay,
            max_attempts,
        })
    }

    /// Time to wait between polls.
    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Maximum number of polls.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.get()
    }

    /// True if `attempt` (0-based) is the last poll permitted.
    pub fn is_last_attempt(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts() - 1
    }
}

impl Default for WakePolicy {
    fn default() -> Self {
        Self {
            retry_delay: Duration::from_secs(DEFAULT_RETRY_DELAY_SECS),
            max_attempts: NonZeroU32::new(DEFAULT_MAX_ATTEMPTS).unwrap_or(NonZeroU32::MIN),
        }
    }
}

/// True if the wake signal should be sent again before the poll with the
/// 0-based index `attempt`.
///
/// # Examples
///
/// ```
/// use tesla_cli::wake::should_rewake;
/// assert!(!should_rewake(0));
/// assert!(should_rewake(9));
/// assert!(should_rewake(19));
/// ```
pub fn should_rewake(attempt: u32) -> bool {
    (attempt + 1) % REWAKE_INTERVAL == 0
}

/// What a single poll found out.
#[derive(Debug)]
pub enum AttemptOutcome {
    /// The vehicle is online.
    Online,

    /// The vehicle was found but is not online yet.
    StillWaking,

    /// The vehicle could not be looked up, but might be on the next try.
    Error(LookupError),
}

/// A single poll of a waking vehicle.
#[derive(Debug)]
pub struct WakeAttempt {
    /// 0-based index of the poll.
    pub attempt: u32,

    /// The most recently observed state. If the lookup failed, this is
    /// the state observed before the poll.
    pub observed: PowerState,

    /// What the poll found out.
    pub outcome: AttemptOutcome,
}

/// What to do after a poll.
#[derive(Debug)]
pub enum Step {
    /// The vehicle is online; stop polling.
    Online,

    /// Wait, then poll again.
    Retry,

    /// The attempt budget is spent.
    GiveUp(AttemptFailure),
}

/// Decides what to do after `attempt`, given `policy`.
pub fn next_step(attempt: WakeAttempt, policy: &WakePolicy) -> Step {
    let failure = match attempt.outcome {
        AttemptOutcome::Online => return Step::Online,
        AttemptOutcome::StillWaking => AttemptFailure::NotOnline(attempt.observed),
        AttemptOutcome::Error(err) => AttemptFailure::Lookup(err),
    };

    if policy.is_last_attempt(attempt.attempt) {
        Step::GiveUp(failure)
    } else {
        debug!("attempt {} failed: {failure}", attempt.attempt);
        Step::Retry
    }
}

/// Wakes vehicles and waits for them to come online.
#[derive(Debug)]
pub struct WakeCoordinator<'a, D, C, P> {
    directory: &'a D,
    clock: C,
    progress: P,
    policy: WakePolicy,
}

impl<'a, D, C, P> WakeCoordinator<'a, D, C, P>
where
    D: VehicleDirectory,
    C: Clock,
    P: Progress,
{
    /// Creates a new coordinator that looks vehicles up in `directory`,
    /// waits using `clock` and reports to `progress`, using the default
    /// [`WakePolicy`].
    pub fn new(directory: &'a D, clock: C, progress: P) -> Self {
        Self {
            directory,
            clock,
            progress,
            policy: WakePolicy::default(),
        }
    }

    /// Uses `policy` instead of the default policy.
    pub fn policy(mut self, policy: WakePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Wakes `vehicle` and waits until it is online.
    ///
    /// Returns as soon as the vehicle is observed online. Failed lookups
    /// are retried along with polls that find the vehicle still asleep;
    /// once the policy's attempts are used up, the last failure is
    /// returned wrapped in [`WakeError::Timeout`].
    pub async fn ensure_online<V: VehicleHandle>(&self, vehicle: &mut V) -> Result<(), WakeError> {
        let started = self.clock.now();
        let name = vehicle.display_name().to_string();
        let vin = vehicle.vin().to_string();

        self.signal(vehicle).await;
        let mut state = vehicle.state().clone();

        if !state.is_online() {
            let mut attempt = 0;
            loop {
                self.progress.waiting(&name, &state);

                if should_rewake(attempt) {
                    self.progress.rewaking(&name);
                    self.signal(vehicle).await;
                }

                let poll = self.poll(&vin, attempt, &state).await;
                state = poll.observed.clone();

                match next_step(poll, &self.policy) {
                    Step::Online => break,
                    Step::Retry => {
                        self.clock.sleep(self.policy.retry_delay()).await;
                        attempt += 1;
                    }
                    Step::GiveUp(cause) => {
                        return Err(WakeError::Timeout {
                            name,
                            last_state: state,
                            attempts: self.policy.max_attempts(),
                            cause,
                        });
                    }
                }
            }
        }

        self.progress
            .online(&name, &state, self.clock.now() - started);
        Ok(())
    }

    async fn signal<V: VehicleHandle>(&self, vehicle: &mut V) {
        if let Err(err) = vehicle.wake().await {
            warn!("could not send wake signal to {}: {err}", vehicle.display_name());
        }
    }

    async fn poll(
        &self,
        vin: &str,
        attempt: u32,
        last_state: &PowerState,
    ) -> WakeAttempt {
        match self.directory.find_vehicle(vin).await {
            Ok(vehicle) => {
                let observed = vehicle.state().clone();
                let outcome = if observed.is_online() {
                    AttemptOutcome::Online
                } else {
                    AttemptOutcome::StillWaking
                };
                WakeAttempt {
                    attempt,
                    observed,
                    outcome,
                }
            }
            Err(err) => WakeAttempt {
                attempt,
                observed: last_state.clone(),
                outcome: AttemptOutcome::Error(err),
            },
        }
    }
}

/// A vehicle could not be found in its directory.
#[derive(Debug, Error)]
pub enum LookupError {
    /// No vehicle with the given VIN is registered to the account.
    #[error("VIN not found on account: {0}")]
    NotFound(String),

    /// An error from the underlying HTTP service.
    #[error("Service error: {0}")]
    Service(#[from] HTTPError),

    /// An error parsing data.
    #[error("Parse error: {0}")]
    Parse(#[from] thing::Error),
}

/// Why a single poll did not find the vehicle online.
#[derive(Debug, Error)]
pub enum AttemptFailure {
    /// The vehicle was found, but not online.
    #[error("State is not online ({0})")]
    NotOnline(PowerState),

    /// The vehicle could not be looked up.
    #[error("{0}")]
    Lookup(#[source] LookupError),
}

/// A vehicle could not be brought online.
#[derive(Debug, Error)]
pub enum WakeError {
    /// The policy allowed no attempts at all.
    #[error("Maximum attempts must be at least 1 (got {0})")]
    InvalidAttempts(u32),

    /// The vehicle was not observed online within the allowed attempts.
    #[error(
        "Vehicle Connection Error, {name} is still {last_state} after {attempts} attempts: {cause}"
    )]
    Timeout {
        name: String,
        last_state: PowerState,
        attempts: u32,
        #[source]
        cause: AttemptFailure,
    },
}
