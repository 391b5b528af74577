//! Drives the command-line program.

use crate::clock::{Clock, SystemClock};
use crate::conf::{self, Credentials};
use crate::tesla::service::Service;
use crate::tesla::{Account, Vehicle, client};
use crate::text::DistanceUnit;
use crate::view::{ViewOptions, Viewable, debug_view};
use crate::wake::{
    ConsoleProgress, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_SECS, LookupError, Progress,
    VehicleDirectory, VehicleHandle, WakeCoordinator, WakeError, WakePolicy,
};
use clap::{Parser, Subcommand};
use clap_verbosity_flag::Verbosity;
use colored::Colorize;
use indoc::formatdoc;
use log::debug;
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::{error, process};
use thiserror::Error;

/// Prints `message` in red to stderr and exits with `error_code`.
pub fn die(error_code: i32, message: &str) -> ! {
    eprintln!("{}", message.red());
    process::exit(error_code);
}

/// Program configuration.
#[derive(Debug, Parser)]
#[command(version)]
#[command(about = "Wakes up your Tesla and tells you how it's doing", long_about = None)]
pub struct Config {
    #[command(flatten)]
    verbosity: Verbosity,

    /// Show the raw API responses
    #[arg(long, global = true, default_value_t = false)]
    debug: bool,

    /// Unit in which distances are displayed
    #[arg(long, global = true, value_enum, default_value_t = DistanceUnit::Km)]
    unit: DistanceUnit,

    /// Read credentials from PATH instead of ~/.tesla_cli/config.yaml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

impl Config {
    pub fn verbosity(&self) -> &Verbosity {
        &self.verbosity
    }

    /// Location of the credentials file.
    pub fn config_path(&self) -> Result<PathBuf, Error> {
        self.config
            .clone()
            .or_else(conf::default_path)
            .ok_or(Error::NoHome)
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Configure credentials to access your car info
    Setup,

    /// Wake up the car
    WakeUp {
        /// How long to wait between state checks in seconds
        #[arg(long, default_value_t = DEFAULT_RETRY_DELAY_SECS)]
        retry_delay: u64,

        /// How many times to try
        #[arg(
            long,
            default_value_t = DEFAULT_MAX_ATTEMPTS,
            value_parser = clap::value_parser!(u32).range(1..)
        )]
        max_attempts: u32,
    },

    /// Get info about the state of the car
    CarState,

    /// Get info about the charge state
    ChargeState,

    /// Get info about the climate
    ClimateState,

    /// Start climate
    ClimateStart,

    /// Stop climate
    ClimateStop,
}

/// Runs the command-line program.
#[derive(Debug)]
pub struct Runner {
    config: Config,
}

impl Runner {
    /// Create a new program runner using the given `config`.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the command-line program using its stored configuration options.
    pub async fn run(&self) -> Result<(), Error> {
        match &self.config.command {
            Command::Setup => self.run_setup().await,
            Command::WakeUp {
                retry_delay,
                max_attempts,
            } => {
                let policy = WakePolicy::new(*retry_delay, *max_attempts)?;
                self.online_vehicle(policy).await.map(|_| ())
            }
            Command::CarState => self.run_car_state().await,
            Command::ChargeState => self.run_charge_state().await,
            Command::ClimateState => self.run_climate_state().await,
            Command::ClimateStart => self.run_climate_start().await,
            Command::ClimateStop => self.run_climate_stop().await,
        }
    }

    fn view_options(&self) -> ViewOptions {
        ViewOptions::default().unit(self.config.unit)
    }

    /// Renders `item` as a table, preceded by the raw payload in debug mode.
    fn render(&self, raw: &Value, item: &impl Viewable) -> String {
        let view = item.view(&self.view_options());
        if self.config.debug {
            format!("{}\n{view}", debug_view(raw))
        } else {
            view
        }
    }

    fn credentials(&self) -> Result<Credentials, Error> {
        let path = self.config.config_path()?;
        debug!("reading configuration from {}", path.display());
        Credentials::load(&path).map_err(|err| match err {
            conf::Error::Missing(_) => Error::NoConfig,
            err => Error::BadConfig(err),
        })
    }

    /// Logs in, finds the configured vehicle and makes sure it is awake.
    async fn online_vehicle(&self, policy: WakePolicy) -> Result<Vehicle, Error> {
        let credentials = self.credentials()?;
        let account = Account::connect(&credentials)
            .await
            .map_err(Error::from_client)?;
        wake_vehicle(
            &account,
            credentials.vin(),
            policy,
            SystemClock,
            ConsoleProgress,
        )
        .await
    }

    async fn run_setup(&self) -> Result<(), Error> {
        let path = self.config.config_path()?;

        println!("Tesla CLI Tool Setup");
        let username = prompt("Tesla Username (E-mail): ")?;
        let password = rpassword::prompt_password("Tesla Password: ")?;
        let credentials = Credentials::new(username, password, "");

        let account = Account::connect(&credentials)
            .await
            .map_err(Error::from_client)?;
        let vehicles = account
            .list_vehicles()
            .await
            .map_err(Error::from_lookup)?;

        let vehicle = vehicles.first().ok_or(Error::NoVehicles)?;
        if vehicles.len() == 1 {
            println!("Only one vehicle found, the following vehicle will be used:");
        } else {
            println!(
                "{} vehicles found, the following vehicle will be used:",
                vehicles.len()
            );
        }
        println!(
            "{}",
            formatdoc! {"
                Name: {}
                VIN:  {}",
                vehicle.display_name(),
                vehicle.vin(),
            }
        );

        credentials.with_vin(vehicle.vin()).save(&path)?;
        println!("{}", "Done!".green());
        Ok(())
    }

    async fn car_state<S: Service>(&self, vehicle: &Vehicle<S>) -> Result<String, Error> {
        let state = vehicle.vehicle_state().await?;
        Ok(self.render(state.raw(), state.data()))
    }

    async fn charge_state<S: Service>(&self, vehicle: &Vehicle<S>) -> Result<String, Error> {
        let state = vehicle.charge_state().await?;
        Ok(self.render(state.raw(), state.data()))
    }

    async fn climate_state<S: Service>(&self, vehicle: &Vehicle<S>) -> Result<String, Error> {
        let state = vehicle.climate_state().await?;
        Ok(self.render(state.raw(), state.data()))
    }

    async fn run_car_state(&self) -> Result<(), Error> {
        let vehicle = self.online_vehicle(WakePolicy::default()).await?;
        println!("{}", self.car_state(&vehicle).await?);
        Ok(())
    }

    async fn run_charge_state(&self) -> Result<(), Error> {
        let vehicle = self.online_vehicle(WakePolicy::default()).await?;
        println!("{}", self.charge_state(&vehicle).await?);
        Ok(())
    }

    async fn run_climate_state(&self) -> Result<(), Error> {
        let vehicle = self.online_vehicle(WakePolicy::default()).await?;
        println!("{}", self.climate_state(&vehicle).await?);
        Ok(())
    }

    async fn run_climate_start(&self) -> Result<(), Error> {
        let vehicle = self.online_vehicle(WakePolicy::default()).await?;
        vehicle.start_climate().await?;
        println!("{}", "Climate started!".green());
        Ok(())
    }

    async fn run_climate_stop(&self) -> Result<(), Error> {
        let vehicle = self.online_vehicle(WakePolicy::default()).await?;
        vehicle.stop_climate().await?;
        println!("{}", "Climate stopped!".green());
        Ok(())
    }
}

/// Finds the vehicle with the given `vin` on `account` and waits for it to
/// come online.
async fn wake_vehicle<S, C, P>(
    account: &Account<S>,
    vin: &str,
    policy: WakePolicy,
    clock: C,
    progress: P,
) -> Result<Vehicle<S>, Error>
where
    S: Service,
    C: Clock,
    P: Progress,
{
    let mut vehicle = account.find_vehicle(vin).await?;
    WakeCoordinator::new(account, clock, progress)
        .policy(policy)
        .ensure_online(&mut vehicle)
        .await?;
    Ok(vehicle)
}

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

/// Errors that stop the program.
#[derive(Debug, Error)]
pub enum Error {
    #[error("No configuration found, please run 'setup' to create the configuration.")]
    NoConfig,

    #[error(
        "Configuration is malformed or unreadable, please run 'setup' to correct the situation."
    )]
    BadConfig(#[source] conf::Error),

    #[error(
        "Could not find your home directory, please use --config to choose a configuration file."
    )]
    NoHome,

    #[error("Could not save configuration: {0}")]
    SaveConfig(#[from] conf::Error),

    #[error("Invalid credentials, please try again")]
    InvalidCredentials,

    #[error("API Error, please try again")]
    Api(#[source] Box<dyn error::Error + Send + Sync>),

    #[error("No vehicles found on account")]
    NoVehicles,

    #[error("{0}")]
    Lookup(#[from] LookupError),

    #[error("{0}")]
    Wake(#[from] WakeError),

    #[error("{0}")]
    Client(#[from] client::Error),

    #[error("Could not read input: {0}")]
    Input(#[from] io::Error),
}

impl Error {
    fn from_client(err: client::Error) -> Self {
        if err.is_unauthorized() {
            Error::InvalidCredentials
        } else {
            Error::Api(Box::new(err))
        }
    }

    fn from_lookup(err: LookupError) -> Self {
        match err {
            LookupError::Service(err) if err.is_unauthorized() => Error::InvalidCredentials,
            err => Error::Api(Box::new(err)),
        }
    }
}
