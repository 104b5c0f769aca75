//! Client for the Memeologia authentication endpoint.
//!
//! This module provides the `AuthClient` struct, which posts credentials
//! to the login endpoint and turns the response into a token or a
//! `LoginError`.

use std::fmt;
use std::net::IpAddr;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::LoginError;

// ============================================================================
// Constants
// ============================================================================

/// Login endpoint used when nothing else is configured
pub const DEFAULT_LOGIN_URL: &str = "http://localhost:8000/login";

/// JSON body sent to the login endpoint.
///
/// The password key is the literal word `contraseña`; the backend expects
/// exactly that spelling.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    #[serde(rename = "contraseña")]
    pub password: String,
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Client for the login endpoint.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AuthClient {
    client: Client,
    login_url: String,
}

impl AuthClient {
    /// Create a new client posting to `login_url`.
    ///
    /// `timeout` of `None` leaves the request unbounded; it resolves only
    /// when the transport does. Loopback endpoints are reached directly,
    /// never through a proxy from the environment.
    pub fn new(login_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let login_url = login_url.into();

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        if is_loopback(&login_url) {
            builder = builder.no_proxy();
        }
        let client = builder.build()?;

        Ok(Self { client, login_url })
    }

    pub fn login_url(&self) -> &str {
        &self.login_url
    }

    /// Post the credentials once and return the issued token.
    pub async fn authenticate(&self, request: &LoginRequest) -> Result<String, LoginError> {
        debug!(url = %self.login_url, email = %request.email, "Sending login request");

        let response = self
            .client
            .post(&self.login_url)
            .json(request)
            .send()
            .await?;

        let response = Self::check_response(response).await?;

        let body = response.text().await?;
        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            LoginError::MalformedResponse(format!("success body without a token: {}", e))
        })?;

        Ok(parsed.token)
    }

    /// Check if response is successful, returning a classified error if not.
    async fn check_response(response: Response) -> Result<Response, LoginError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        debug!(status = status.as_u16(), "Login endpoint rejected request");
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(LoginError::Unauthorized);
        }

        let body = response.text().await?;
        Err(LoginError::from_status(status, &body))
    }
}

/// True when `url` points at this machine (`localhost`, 127.0.0.0/8, `::1`)
fn is_loopback(url: &str) -> bool {
    let Ok(url) = reqwest::Url::parse(url) else {
        return false;
    };
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_start_matches('[')
            .trim_end_matches(']')
            .parse::<IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false),
        None => false,
    }
}
