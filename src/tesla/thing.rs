//! Data returned by the Tesla owner API.
//!
//! Almost every endpoint wraps its payload in a JSON object of the form
//! `{"response": ...}`. [`Document::parse`] unwraps that envelope and
//! keeps the raw payload around alongside the typed data, so that it can
//! be dumped verbatim when debugging.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// A parsed API payload along with its raw JSON representation.
#[derive(Clone, Debug)]
pub struct Document<T> {
    data: T,
    raw: Value,
}

impl<T: DeserializeOwned> Document<T> {
    /// Parses a response body of the form `{"response": ...}`.
    pub fn parse(body: &str) -> Result<Self, Error> {
        let mut envelope: Value = serde_json::from_str(body)?;
        let raw = envelope
            .get_mut("response")
            .map(Value::take)
            .filter(|v| !v.is_null())
            .ok_or(Error::MissingResponse)?;
        let data = T::deserialize(&raw)?;
        Ok(Self { data, raw })
    }
}

impl<T> Document<T> {
    /// The typed payload.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The payload exactly as the API returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Discards the raw JSON and returns the typed payload.
    pub fn into_data(self) -> T {
        self.data
    }
}

/// The power state of a vehicle.
///
/// Tesla only documents a handful of states, but the API is free to
/// return others; anything that is not [`PowerState::Online`] means the
/// vehicle cannot yet answer queries or accept commands.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum PowerState {
    Online,
    Asleep,
    Waking,
    Offline,
    Other(String),
}

impl PowerState {
    /// True if the vehicle is awake and responsive.
    pub fn is_online(&self) -> bool {
        *self == PowerState::Online
    }
}

impl From<String> for PowerState {
    fn from(state: String) -> Self {
        match state.as_str() {
            "online" => PowerState::Online,
            "asleep" => PowerState::Asleep,
            "waking" => PowerState::Waking,
            "offline" => PowerState::Offline,
            _ => PowerState::Other(state),
        }
    }
}

impl From<&str> for PowerState {
    fn from(state: &str) -> Self {
        PowerState::from(state.to_string())
    }
}

impl From<PowerState> for String {
    fn from(state: PowerState) -> Self {
        state.to_string()
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowerState::Online => write!(f, "online"),
            PowerState::Asleep => write!(f, "asleep"),
            PowerState::Waking => write!(f, "waking"),
            PowerState::Offline => write!(f, "offline"),
            PowerState::Other(state) => write!(f, "{state}"),
        }
    }
}

/// An OAuth access token.
#[derive(Clone, Debug, Deserialize)]
pub struct Token {
    access_token: String,
}

impl Token {
    /// Parses the body of a token response.
    pub fn parse(body: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(body)?)
    }

    /// The bearer token itself.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

/// A vehicle as it is listed on an account.
#[derive(Clone, Debug, Deserialize)]
pub struct VehicleSummary {
    id: u64,
    vin: String,
    display_name: Option<String>,
    state: PowerState,
}

impl VehicleSummary {
    /// Identifier used to address the vehicle in API calls.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Vehicle identification number.
    pub fn vin(&self) -> &str {
        &self.vin
    }

    /// The name the owner gave the vehicle, or its VIN if it has none.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.vin)
    }

    /// Power state at the time the vehicle was listed.
    pub fn state(&self) -> &PowerState {
        &self.state
    }
}

/// General vehicle information.
#[derive(Clone, Debug, Deserialize)]
pub struct VehicleState {
    pub vehicle_name: Option<String>,
    pub car_version: String,
    pub locked: bool,
    /// Miles.
    pub odometer: f64,
    pub sentry_mode: Option<bool>,
}

/// Battery and charging information.
///
/// Ranges are in miles, as the API reports them.
#[derive(Clone, Debug, Deserialize)]
pub struct ChargeState {
    pub battery_level: u8,
    pub usable_battery_level: u8,
    pub battery_range: f64,
    pub est_battery_range: f64,
    pub charging_state: String,
    /// Miles of range added per hour.
    pub charge_rate: f64,
    pub charger_voltage: Option<f64>,
    pub charger_actual_current: Option<f64>,
    /// Hours.
    pub time_to_full_charge: f64,
}

impl ChargeState {
    /// Current charging power in kW, or 0 if the vehicle is not plugged in.
    pub fn charge_power(&self) -> f64 {
        let voltage = self.charger_voltage.unwrap_or_default();
        let current = self.charger_actual_current.unwrap_or_default();
        voltage * current / 1000.0
    }
}

/// Cabin climate information. Temperatures are in degrees Celsius.
#[derive(Clone, Debug, Deserialize)]
pub struct ClimateState {
    pub inside_temp: Option<f64>,
    pub outside_temp: Option<f64>,
    pub driver_temp_setting: f64,
    pub fan_status: i64,
    pub is_climate_on: bool,
}

/// Outcome of a vehicle command.
#[derive(Clone, Debug, Deserialize)]
pub struct CommandResult {
    pub result: bool,
    #[serde(default)]
    pub reason: String,
}

/// An error parsing data returned by the API.
#[derive(Debug, Error)]
pub enum Error {
    /// The body was not valid JSON or did not have the expected shape.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The body did not contain a `response` object.
    #[error("Response is missing its payload")]
    MissingResponse,
}

#[cfg(test)]
mod tests {
    mod document {
        use super::super::*;
        use crate::test_utils::load_data;

        #[test]
        fn it_unwraps_the_response_envelope() {
            let doc: Document<Vec<VehicleSummary>> =
                Document::parse(&load_data("vehicles_asleep")).unwrap();
            assert_eq!(doc.data().len(), 1);
            assert!(doc.raw().is_array());
        }

        #[test]
        fn it_fails_without_a_response() {
            let doc = Document::<CommandResult>::parse(r#"{"error": "vehicle unavailable"}"#);
            assert!(matches!(doc, Err(Error::MissingResponse)));
        }

        #[test]
        fn it_fails_with_a_null_response() {
            let doc = Document::<CommandResult>::parse(r#"{"response": null}"#);
            assert!(matches!(doc, Err(Error::MissingResponse)));
        }

        #[test]
        fn it_fails_on_invalid_json() {
            let doc = Document::<CommandResult>::parse("<html>");
            assert!(matches!(doc, Err(Error::Json(_))));
        }

        #[test]
        fn it_fails_on_the_wrong_shape() {
            let doc = Document::<CommandResult>::parse(r#"{"response": {"reason": 3}}"#);
            assert!(matches!(doc, Err(Error::Json(_))));
        }
    }

    mod power_state {
        use super::super::*;

        #[test]
        fn it_parses_known_states() {
            assert_eq!(PowerState::from("online"), PowerState::Online);
            assert_eq!(PowerState::from("asleep"), PowerState::Asleep);
            assert_eq!(PowerState::from("waking"), PowerState::Waking);
            assert_eq!(PowerState::from("offline"), PowerState::Offline);
        }

        #[test]
        fn it_keeps_unknown_states() {
            let state = PowerState::from("updating");
            assert_eq!(state, PowerState::Other("updating".to_string()));
            assert_eq!(state.to_string(), "updating");
        }

        #[test]
        fn it_is_only_online_when_online() {
            assert!(PowerState::Online.is_online());
            assert!(!PowerState::Asleep.is_online());
            assert!(!PowerState::Other("Online".to_string()).is_online());
        }

        #[test]
        fn it_deserializes_from_a_string() {
            let state: PowerState = serde_json::from_str(r#""asleep""#).unwrap();
            assert_eq!(state, PowerState::Asleep);
        }
    }

    mod vehicle_summary {
        use super::super::*;
        use crate::test_utils::load_data;

        #[test]
        fn it_parses_a_vehicle_listing() {
            let doc: Document<Vec<VehicleSummary>> =
                Document::parse(&load_data("vehicles_asleep")).unwrap();
            let vehicle = &doc.data()[0];
            assert_eq!(vehicle.id(), 12345678901234567);
            assert_eq!(vehicle.vin(), "5YJ3E1EA7KF000001");
            assert_eq!(vehicle.display_name(), "Mock");
            assert_eq!(vehicle.state(), &PowerState::Asleep);
        }

        #[test]
        fn it_falls_back_to_the_vin_without_a_name() {
            let vehicle: VehicleSummary = serde_json::from_str(
                r#"{"id": 1, "vin": "5YJ3E1EA7KF000002", "display_name": null, "state": "online"}"#,
            )
            .unwrap();
            assert_eq!(vehicle.display_name(), "5YJ3E1EA7KF000002");
        }
    }

    mod token {
        use super::super::*;
        use crate::test_utils::load_data;

        #[test]
        fn it_parses_a_token_response() {
            let token = Token::parse(&load_data("token")).unwrap();
            assert_eq!(token.access_token(), "qts-0123456789abcdef");
        }
    }

    mod charge_state {
        use super::super::*;
        use crate::test_utils::load_data;

        #[test]
        fn it_calculates_charge_power() {
            let doc: Document<ChargeState> = Document::parse(&load_data("charge_state")).unwrap();
            assert_eq!(doc.data().charge_power(), 11.5);
        }

        #[test]
        fn it_has_no_charge_power_when_unplugged() {
            let doc: Document<ChargeState> =
                Document::parse(&load_data("charge_state_unplugged")).unwrap();
            assert_eq!(doc.data().charge_power(), 0.0);
        }
    }
}
