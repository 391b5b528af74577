//! Tesla owner API clients and services for communicating with Tesla
//! over HTTP.

pub mod auth;
pub mod client;
pub mod service;
pub mod thing;

pub use auth::Auth;
pub use client::{Account, Vehicle};
