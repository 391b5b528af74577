// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! Clients for reading data from, and sending commands to, the Tesla
//! owner API.

use crate::conf::Credentials;
use crate::http::HTTPError;
use crate::tesla::auth::{ACCESS_TOKEN_ENV, Auth};
use crate::tesla::service::{Service, TeslaService};
use crate::tesla::thing::{
    self, ChargeState, ClimateState, CommandResult, Document, PowerState, Token, VehicleState,
    VehicleSummary,
};
use crate::wake::{LookupError, VehicleDirectory, VehicleHandle};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;

/// Everything needed to talk to the API on behalf of one account.
#[derive(Debug)]
struct Session<S> {
    service: S,
    auth: Auth,
}

impl<S: Service> Session<S> {
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Document<T>, Error> {
        let body = self.service.get_resource(&self.auth, path).await?;
        Ok(Document::parse(&body)?)
    }

    async fn post<T: DeserializeOwned>(&self, path: &str) -> Result<Document<T>, Error> {
        let body = self.service.post_resource(&self.auth, path).await?;
        Ok(Document::parse(&body)?)
    }
}

/// A Tesla account, and the directory of vehicles registered to it.
#[derive(Debug)]
pub struct Account<S = TeslaService> {
    session: Arc<Session<S>>,
}

impl Account<TeslaService> {
    /// Logs in to the owner API.
    ///
    /// If `$TESLA_ACCESS_TOKEN` is set, it is used as is; otherwise the
    /// username and password in `credentials` are exchanged for a token.
    ///
    /// Returns an [`enum@Error`] if a token cannot be obtained.
    pub async fn connect(credentials: &Credentials) -> Result<Self, Error> {
        let service = TeslaService::new()?;
        Self::connect_with_service(credentials, service).await
    }
}

impl<S: Service> Account<S> {
    /// Logs in to the owner API using the given `service`.
    ///
    /// Returns an [`enum@Error`] if a token cannot be obtained.
    pub(crate) async fn connect_with_service(
        credentials: &Credentials,
        service: S,
    ) -> Result<Self, Error> {
        let auth = match Auth::from_env(ACCESS_TOKEN_ENV) {
            Ok(auth) => {
                debug!("using access token from ${ACCESS_TOKEN_ENV}");
                auth
            }
            Err(_) => {
                info!("requesting access token for {}", credentials.username());
                let body = service.request_token(credentials).await?;
                Auth::from(Token::parse(&body)?)
            }
        };
        Ok(Self::with_auth(service, auth))
    }

    /// Uses an access token that has already been obtained.
    pub fn with_auth(service: S, auth: Auth) -> Self {
        let session = Arc::new(Session { service, auth });
        Self { session }
    }
}

impl<S: Service> VehicleDirectory for Account<S> {
    type Vehicle = Vehicle<S>;

    async fn list_vehicles(&self) -> Result<Vec<Vehicle<S>>, LookupError> {
        let body = self
            .session
            .service
            .get_resource(&self.session.auth, "api/1/vehicles")
            .await?;
        let listing: Document<Vec<VehicleSummary>> = Document::parse(&body)?;
        debug!("account has {} vehicle(s)", listing.data().len());

        let vehicles = listing
            .into_data()
            .into_iter()
            .map(|summary| Vehicle {
                session: Arc::clone(&self.session),
                summary,
            })
            .collect();
        Ok(vehicles)
    }
}

/// A vehicle registered to an [`Account`].
///
/// Its [power state](Vehicle::state) is a snapshot taken when the vehicle
/// was listed, or when it was last woken up.
#[derive(Debug)]
pub struct Vehicle<S = TeslaService> {
    session: Arc<Session<S>>,
    summary: VehicleSummary,
}

impl<S: Service> Vehicle<S> {
    fn path(&self, resource: &str) -> String {
        format!("api/1/vehicles/{}/{resource}", self.summary.id())
    }

    /// General information about the vehicle, such as its software
    /// version and odometer reading.
    pub async fn vehicle_state(&self) -> Result<Document<VehicleState>, Error> {
        self.session
            .get(&self.path("data_request/vehicle_state"))
            .await
    }

    /// Battery and charging information.
    pub async fn charge_state(&self) -> Result<Document<ChargeState>, Error> {
        self.session.get(&self.path("data_request/charge_state")).await
    }

    /// Cabin temperature and climate control information.
    pub async fn climate_state(&self) -> Result<Document<ClimateState>, Error> {
        self.session
            .get(&self.path("data_request/climate_state"))
            .await
    }

    /// Turns on climate control.
    pub async fn start_climate(&self) -> Result<(), Error> {
        self.command("auto_conditioning_start").await
    }

    /// Turns off climate control.
    pub async fn stop_climate(&self) -> Result<(), Error> {
        self.command("auto_conditioning_stop").await
    }

    async fn command(&self, command: &str) -> Result<(), Error> {
        info!("sending {command} to {}", self.summary.display_name());
        let response: Document<CommandResult> =
            self.session.post(&self.path(&format!("command/{command}"))).await?;
        let response = response.into_data();
        if response.result {
            Ok(())
        } else {
            Err(Error::CommandRejected(response.reason))
        }
    }
}

impl<S: Service> VehicleHandle for Vehicle<S> {
    fn vin(&self) -> &str {
        self.summary.vin()
    }

    fn display_name(&self) -> &str {
        self.summary.display_name()
    }

    fn state(&self) -> &PowerState {
        self.summary.state()
    }

    async fn wake(&mut self) -> Result<(), LookupError> {
        debug!("sending wake signal to {}", self.summary.vin());
        let body = self
            .session
            .service
            .post_resource(&self.session.auth, &self.path("wake_up"))
            .await?;
        let response: Document<VehicleSummary> = Document::parse(&body)?;
        self.summary = response.into_data();
        Ok(())
    }
}

/// A client error.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the underlying HTTP service.
    #[error("Service error: {0}")]
    Service(#[from] HTTPError),

    /// An error parsing data.
    #[error("Parse error: {0}")]
    Parse(#[from] thing::Error),

    /// The vehicle refused to carry out a command.
    #[error("Command rejected: {0}")]
    CommandRejected(String),
}

impl Error {
    /// True if the API refused our credentials.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::Service(err) if err.is_unauthorized())
    }
}
