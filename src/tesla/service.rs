// SPDX-License-Identifier: Apache-2.0
// Copyright (C) 2025 Michael Dippery <michael@monkey-robot.com>

//! HTTPS connector for the Tesla owner API.
//!
//! Service structures in this module provide a low-level way to interact
//! with the owner API over HTTPS, essentially a specialized HTTPS client
//! specifically for Tesla.

use crate::conf::Credentials;
use crate::http::{HTTPError, HTTPResult, HTTPService};
use crate::tesla::Auth;
use log::debug;
use reqwest::{Client, RequestBuilder, header};
use serde::Serialize;

/// Base URI of the owner API.
pub const BASE_URI: &str = "https://owner-api.teslamotors.com";

// These are the publicly known credentials of the official mobile app.
const CLIENT_ID: &str = "81527cff06843c8634fdc09e8ac0abefb46ac849f38fe1e431c2ef2106796384";
const CLIENT_SECRET: &str = "c7257eb71a564034f9419ee651c7d0e5f7aa6bfbd18bafb5c5c033b093bb2fa3";

/// A service for talking to the Tesla owner API.
///
/// Using this trait, clients can implement different ways of connecting
/// to the API, such as an actual connector for production code, and a
/// mocked connector for testing purposes. Every method returns the raw
/// body of a successful response.
pub trait Service: Send + Sync {
    /// Exchanges an e-mail address and password for an access token.
    fn request_token(
        &self,
        credentials: &Credentials,
    ) -> impl Future<Output = HTTPResult<String>> + Send;

    /// Performs a GET request for the API resource at `path`.
    fn get_resource(
        &self,
        auth: &Auth,
        path: &str,
    ) -> impl Future<Output = HTTPResult<String>> + Send;

    /// Performs a POST request with an empty body to the API resource at
    /// `path`.
    fn post_resource(
        &self,
        auth: &Auth,
        path: &str,
    ) -> impl Future<Output = HTTPResult<String>> + Send;
}

#[derive(Debug, Serialize)]
struct PasswordGrant<'a> {
    grant_type: &'static str,
    client_id: &'static str,
    client_secret: &'static str,
    email: &'a str,
    password: &'a str,
}

impl<'a> PasswordGrant<'a> {
    fn new(credentials: &'a Credentials) -> Self {
        Self {
            grant_type: "password",
            client_id: CLIENT_ID,
            client_secret: CLIENT_SECRET,
            email: credentials.username(),
            password: credentials.password(),
        }
    }
}

/// A service that contacts the Tesla owner API directly.
#[derive(Debug)]
pub struct TeslaService {
    client: Client,
    base_uri: String,
}

impl HTTPService for TeslaService {}

impl TeslaService {
    /// Creates a new Tesla service.
    pub fn new() -> HTTPResult<Self> {
        Self::with_base_uri(BASE_URI)
    }

    /// Creates a new Tesla service that talks to the API at `base_uri`
    /// instead of the official endpoint.
    pub fn with_base_uri(base_uri: impl Into<String>) -> HTTPResult<Self> {
        let client = Self::client()?;
        let base_uri = base_uri.into().trim_end_matches('/').to_string();
        Ok(Self { client, base_uri })
    }

    fn uri(&self, path: &str) -> String {
        format!("{}/{}", self.base_uri, path.trim_start_matches('/'))
    }

    async fn send(&self, request: RequestBuilder) -> HTTPResult<String> {
        let resp = request.send().await?;
        debug!("{} {}", resp.status(), resp.url().path());

        if !resp.status().is_success() {
            Err(HTTPError::Http(resp.status()))
        } else {
            let content_type = resp
                .headers()
                .get(header::CONTENT_TYPE)
                .ok_or(HTTPError::MissingContentType)?
                .to_str()?;
            if !content_type.starts_with("application/json") {
                Err(HTTPError::UnexpectedContentType(content_type.to_string()))
            } else {
                resp.text().await.map_err(HTTPError::Body)
            }
        }
    }
}

impl Service for TeslaService {
    async fn request_token(&self, credentials: &Credentials) -> HTTPResult<String> {
        let request = self
            .client
            .post(self.uri("oauth/token"))
            .json(&PasswordGrant::new(credentials));
        self.send(request).await
    }

    async fn get_resource(&self, auth: &Auth, path: &str) -> HTTPResult<String> {
        let request = self
            .client
            .get(self.uri(path))
            .header(header::AUTHORIZATION, auth.header_value());
        self.send(request).await
    }

    async fn post_resource(&self, auth: &Auth, path: &str) -> HTTPResult<String> {
        let request = self
            .client
            .post(self.uri(path))
            .header(header::AUTHORIZATION, auth.header_value());
        self.send(request).await
    }
}
