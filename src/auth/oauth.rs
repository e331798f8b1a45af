//! Third-party OAuth consent flow.
//!
//! One provider is configured per process. Login through this path does not
//! establish a session directly: it hands back the provider's consent URL,
//! and the session is established later when the callback exchanges the
//! authorization code for the provider's view of the user.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use reqwest::Client as HttpClient;
use serde::Deserialize;

use super::error::AuthError;

/// Provider endpoints and credentials.
#[derive(Debug, Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
    pub redirect_url: String,
}

impl OAuthSettings {
    /// All-or-nothing: the provider is only considered configured when every
    /// required variable is present.
    pub fn from_env() -> Option<Self> {
        Some(Self {
            client_id: std::env::var("OAUTH_CLIENT_ID").ok()?,
            client_secret: std::env::var("OAUTH_CLIENT_SECRET").ok()?,
            auth_url: std::env::var("OAUTH_AUTH_URL").ok()?,
            token_url: std::env::var("OAUTH_TOKEN_URL").ok()?,
            userinfo_url: std::env::var("OAUTH_USERINFO_URL").ok()?,
            redirect_url: std::env::var("OAUTH_REDIRECT_URL").ok()?,
        })
    }
}

type ProviderClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Drives the consent redirect and the code exchange for the configured
/// provider.
pub struct OAuthClient {
    client: ProviderClient,
    userinfo_url: String,
    http: HttpClient,
}

impl OAuthClient {
    pub fn new(settings: OAuthSettings) -> Result<Self, AuthError> {
        let client = BasicClient::new(ClientId::new(settings.client_id))
            .set_client_secret(ClientSecret::new(settings.client_secret))
            .set_auth_uri(AuthUrl::new(settings.auth_url).map_err(bad_endpoint)?)
            .set_token_uri(TokenUrl::new(settings.token_url).map_err(bad_endpoint)?)
            .set_redirect_uri(RedirectUrl::new(settings.redirect_url).map_err(bad_endpoint)?);

        // Redirects stay with the browser; the token exchange itself must
        // not follow any.
        let http = HttpClient::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            userinfo_url: settings.userinfo_url,
            http,
        })
    }

    /// The consent URL the browser is sent to instead of a session.
    pub fn consent_url(&self) -> String {
        let (url, _state) = self
            .client
            .authorize_url(|| CsrfToken::new(generate_state()))
            .add_scope(Scope::new("email".to_string()))
            .url();
        url.to_string()
    }

    /// Exchange the callback's authorization code for the provider's email
    /// claim.
    pub async fn exchange_code(&self, code: &str) -> Result<String, AuthError> {
        let token = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        #[derive(Deserialize)]
        struct ProviderUser {
            email: String,
        }

        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(token.access_token().secret())
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(AuthError::Verification);
        }

        let user: ProviderUser = response
            .json()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;
        Ok(user.email)
    }
}

fn bad_endpoint(e: oauth2::url::ParseError) -> AuthError {
    AuthError::Transport(format!("invalid provider endpoint: {e}"))
}

/// Opaque random value for the consent round-trip.
fn generate_state() -> String {
    let mut bytes = [0u8; 32];
    getrandom::getrandom(&mut bytes).expect("system randomness unavailable");
    URL_SAFE_NO_PAD.encode(bytes)
}
