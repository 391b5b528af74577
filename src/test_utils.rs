use crate::clock::{Clock, DateTime, TimeDelta, Utc, format_elapsed};
use crate::conf::Credentials;
use crate::http::{HTTPError, HTTPResult};
use crate::tesla::service::Service;
use crate::tesla::thing::PowerState;
use crate::tesla::{Account, Auth};
use crate::wake::{LookupError, Progress, VehicleDirectory, VehicleHandle};
use reqwest::StatusCode;
use std::collections::VecDeque;
use std::fs;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const MOCK_VIN: &str = "5YJ3E1EA7KF000001";

pub fn do_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn load_data(file: &str) -> String {
    fs::read_to_string(format!("tests/data/{file}.json")).expect("could not find test data")
}

pub fn load_output(filename: &str) -> String {
    let filename = format!("tests/output/{filename}.out");
    String::from(
        fs::read_to_string(&filename)
            .expect(&format!("could not load test data from {filename}"))
            .trim_end(),
    )
}

/// Serves canned responses from `tests/data` and remembers what was
/// requested.
#[derive(Debug)]
pub struct TestService {
    suffix: String,
    commands: String,
    status: Option<StatusCode>,
    requests: Mutex<Vec<String>>,
}

impl TestService {
    /// `suffix` picks the vehicle listing, `tests/data/vehicles_{suffix}.json`.
    pub fn new(suffix: &str) -> Self {
        Self {
            suffix: suffix.to_string(),
            commands: String::from("command_ok"),
            status: None,
            requests: Mutex::new(vec![]),
        }
    }

    /// Answers vehicle commands with `tests/data/{fixture}.json`.
    pub fn commands(mut self, fixture: &str) -> Self {
        self.commands = fixture.to_string();
        self
    }

    /// Fails every request with the given HTTP status.
    pub fn failing(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn respond(&self, method: &str, path: &str) -> HTTPResult<String> {
        self.requests.lock().unwrap().push(format!("{method} {path}"));

        if let Some(status) = self.status {
            return Err(HTTPError::Http(status));
        }

        let resource = path.rsplit('/').next().unwrap_or(path);
        let fixture = match resource {
            "vehicles" => format!("vehicles_{}", self.suffix),
            "token" => String::from("token"),
            r if r.starts_with("auto_conditioning_") => self.commands.clone(),
            r => r.to_string(),
        };
        Ok(load_data(&fixture))
    }
}

impl Service for TestService {
    async fn request_token(&self, _credentials: &Credentials) -> HTTPResult<String> {
        self.respond("POST", "oauth/token")
    }

    async fn get_resource(&self, _auth: &Auth, path: &str) -> HTTPResult<String> {
        self.respond("GET", path)
    }

    async fn post_resource(&self, _auth: &Auth, path: &str) -> HTTPResult<String> {
        self.respond("POST", path)
    }
}

impl Account<TestService> {
    /// An account whose vehicle listing is `tests/data/vehicles_{suffix}.json`.
    pub fn test(suffix: &str) -> Self {
        Account::with_auth(TestService::new(suffix), Auth::new("test"))
    }

    /// An account whose every request fails with `status`.
    pub fn test_failing(status: StatusCode) -> Self {
        Account::with_auth(TestService::new("asleep").failing(status), Auth::new("test"))
    }
}

/// A clock that advances when it is asked to sleep, instead of waiting.
pub struct FakeClock {
    now: Mutex<DateTime<Utc>>,
    sleeps: Mutex<Vec<Duration>>,
}

impl FakeClock {
    pub fn new(datetime: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(datetime),
            sleeps: Mutex::new(vec![]),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        let datetime = DateTime::parse_from_rfc3339("2025-05-23T10:13:00-07:00")
            .expect("invalid date supplied")
            .with_timezone(&Utc);
        Self::new(datetime)
    }
}

impl Clock for FakeClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        let delta = TimeDelta::from_std(duration).expect("sleep is too long");
        *self.now.lock().unwrap() += delta;
    }
}

/// Remembers every progress notification as the line it would print.
#[derive(Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    fn record(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl Progress for RecordingProgress {
    fn waiting(&self, name: &str, state: &PowerState) {
        self.record(format!("{name} is {state}, waiting for it to wake up..."));
    }

    fn rewaking(&self, _name: &str) {
        self.record(String::from("Calling wake up again..."));
    }

    fn online(&self, name: &str, state: &PowerState, elapsed: TimeDelta) {
        if elapsed.is_zero() {
            self.record(format!("{name} is {state}!"));
        } else {
            self.record(format!("{name} is {state} after {}!", format_elapsed(elapsed)));
        }
    }
}

struct MockCar {
    state: PowerState,
    registered_vin: String,
    ignored_wakes: u32,
    online_after_lookups: Option<u32>,
    failing_lookups: VecDeque<LookupError>,
    failing_wakes: bool,
    wakes: u32,
    lookups: u32,
}

/// A single scripted vehicle, shared between a [`MockVehicle`] handle and
/// the [`MockDirectory`] that lists it.
///
/// By default the vehicle never wakes up.
pub struct MockFleet {
    car: Arc<Mutex<MockCar>>,
}

impl MockFleet {
    fn new(state: PowerState) -> Self {
        let car = MockCar {
            state,
            registered_vin: MOCK_VIN.to_string(),
            ignored_wakes: u32::MAX,
            online_after_lookups: None,
            failing_lookups: VecDeque::new(),
            failing_wakes: false,
            wakes: 0,
            lookups: 0,
        };
        Self {
            car: Arc::new(Mutex::new(car)),
        }
    }

    pub fn asleep() -> Self {
        Self::new(PowerState::Asleep)
    }

    pub fn online() -> Self {
        Self::new(PowerState::Online)
    }

    /// The vehicle comes online on the first wake signal after `n` have
    /// been ignored.
    pub fn ignoring_wakes(self, n: u32) -> Self {
        self.car.lock().unwrap().ignored_wakes = n;
        self
    }

    /// The vehicle is listed as online from the `n`th lookup on.
    pub fn online_after_lookups(self, n: u32) -> Self {
        self.car.lock().unwrap().online_after_lookups = Some(n);
        self
    }

    /// The first lookups fail with `errors`, in order.
    pub fn failing_lookups(self, errors: Vec<LookupError>) -> Self {
        self.car.lock().unwrap().failing_lookups = errors.into();
        self
    }

    /// Every wake signal fails to be delivered.
    pub fn failing_wakes(self) -> Self {
        self.car.lock().unwrap().failing_wakes = true;
        self
    }

    /// The directory lists the vehicle under `vin` instead of [`MOCK_VIN`].
    pub fn registered_as(self, vin: &str) -> Self {
        self.car.lock().unwrap().registered_vin = vin.to_string();
        self
    }

    pub fn vehicle(&self) -> MockVehicle {
        let state = self.car.lock().unwrap().state.clone();
        MockVehicle {
            car: Arc::clone(&self.car),
            vin: MOCK_VIN.to_string(),
            state,
        }
    }

    pub fn directory(&self) -> MockDirectory {
        MockDirectory {
            car: Arc::clone(&self.car),
        }
    }

    pub fn wakes(&self) -> u32 {
        self.car.lock().unwrap().wakes
    }

    pub fn lookups(&self) -> u32 {
        self.car.lock().unwrap().lookups
    }
}

pub struct MockVehicle {
    car: Arc<Mutex<MockCar>>,
    vin: String,
    state: PowerState,
}

impl VehicleHandle for MockVehicle {
    fn vin(&self) -> &str {
        &self.vin
    }

    fn display_name(&self) -> &str {
        "Mock"
    }

    fn state(&self) -> &PowerState {
        &self.state
    }

    async fn wake(&mut self) -> Result<(), LookupError> {
        let mut car = self.car.lock().unwrap();
        car.wakes += 1;
        if car.failing_wakes {
            return Err(LookupError::Service(HTTPError::Http(
                StatusCode::SERVICE_UNAVAILABLE,
            )));
        }
        if car.ignored_wakes == 0 {
            car.state = PowerState::Online;
        } else {
            car.ignored_wakes -= 1;
        }
        self.state = car.state.clone();
        Ok(())
    }
}

pub struct MockDirectory {
    car: Arc<Mutex<MockCar>>,
}

impl VehicleDirectory for MockDirectory {
    type Vehicle = MockVehicle;

    async fn list_vehicles(&self) -> Result<Vec<MockVehicle>, LookupError> {
        let mut car = self.car.lock().unwrap();
        car.lookups += 1;
        if let Some(err) = car.failing_lookups.pop_front() {
            return Err(err);
        }
        if car.online_after_lookups.is_some_and(|n| car.lookups >= n) {
            car.state = PowerState::Online;
        }
        Ok(vec![MockVehicle {
            car: Arc::clone(&self.car),
            vin: car.registered_vin.clone(),
            state: car.state.clone(),
        }])
    }
}
