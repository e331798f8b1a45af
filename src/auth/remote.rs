//! Client for the hosted remote identity service.
//!
//! The service speaks a GoTrue-style HTTP API: password grant for sign-in,
//! a signup endpoint, and a user-info endpoint keyed by bearer token. Calls
//! are surfaced synchronously; there are no retries.

use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::error::AuthError;

/// Identity as reported by the remote service.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteUser {
    pub email: String,
}

#[derive(Debug, Deserialize)]
struct GrantResponse {
    #[allow(dead_code)]
    access_token: String,
    user: RemoteUser,
}

/// HTTP client for the remote identity service, constructed once at startup
/// and injected where needed.
pub struct RemoteIdentityClient {
    base_url: String,
    api_key: String,
    http: HttpClient,
}

impl RemoteIdentityClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: HttpClient::new(),
        }
    }

    /// Sign in with email and password. Provider rejection maps to
    /// `InvalidCredentials`; an unreachable service maps to `Transport`.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<RemoteUser, AuthError> {
        let response = self
            .http
            .post(format!(
                "{}/auth/v1/token?grant_type=password",
                self.base_url
            ))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            log::error!("🛰️  Remote sign-in rejected with status {}", response.status());
            return Err(AuthError::InvalidCredentials);
        }

        let grant: GrantResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(grant.user)
    }

    /// Ask the service to create an account. No local password hash is
    /// stored for remotely-created accounts.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<RemoteUser, AuthError> {
        let response = self
            .http
            .post(format!("{}/auth/v1/signup", self.base_url))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        match response.status() {
            s if s.is_success() => {
                let user: RemoteUser = response
                    .json()
                    .await
                    .map_err(|e| AuthError::Transport(e.to_string()))?;
                Ok(user)
            }
            StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY => {
                Err(AuthError::DuplicateAccount)
            }
            s => {
                log::error!("🛰️  Remote sign-up failed with status {s}");
                Err(AuthError::Transport(format!("sign-up failed with {s}")))
            }
        }
    }

    /// Resolve the user behind a provider-supplied access token.
    pub async fn user(&self, access_token: &str) -> Result<RemoteUser, AuthError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Verification);
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))
    }
}
