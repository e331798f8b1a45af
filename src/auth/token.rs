//! Session token issuance and verification.
//!
//! Tokens are self-contained signed JWTs (HS256) carrying an email claim and
//! an absolute expiry. Two kinds share the shape: a short-lived access token
//! and a longer-lived refresh token, each signed with its own secret so that
//! compromise of one signing key does not grant forgery of the other kind.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use super::error::AuthError;
use super::models::{Claims, Identity};

/// Default access token lifetime.
pub const ACCESS_TTL_SECS: i64 = 60 * 60;
/// Default refresh token lifetime.
pub const REFRESH_TTL_SECS: i64 = 24 * 60 * 60;

/// A signed token together with its expiry instant, so cookie lifetimes can
/// be aligned with the claim's own expiry.
#[derive(Debug, Clone)]
pub struct SignedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// The access/refresh pair minted on every successful authentication.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: SignedToken,
    pub refresh: SignedToken,
}

/// Signs and verifies session tokens. Pure computation, no I/O.
#[derive(Clone)]
pub struct TokenService {
    access_secret: String,
    refresh_secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(access_secret: &str, refresh_secret: &str) -> Self {
        Self {
            access_secret: access_secret.to_string(),
            refresh_secret: refresh_secret.to_string(),
            access_ttl: Duration::seconds(ACCESS_TTL_SECS),
            refresh_ttl: Duration::seconds(REFRESH_TTL_SECS),
        }
    }

    /// Sign a claim set for the given identity, expiring `ttl` from now.
    pub fn issue(identity: &Identity, secret: &str, ttl: Duration) -> Result<SignedToken, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Signing("empty signing secret".to_string()));
        }

        let now = Utc::now();
        let expires_at = now + ttl;
        let claims = Claims {
            email: identity.email.clone(),
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthError::Signing(e.to_string()))?;

        Ok(SignedToken { token, expires_at })
    }

    /// Verify a token against a secret. All-or-nothing: a bad signature, a
    /// structurally malformed token and a passed expiry all yield
    /// `Verification` and never an identity.
    pub fn verify(token: &str, secret: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|_| AuthError::Verification)?;

        Ok(Identity::authenticated(&data.claims.email))
    }

    /// Mint the access/refresh pair for one identity.
    pub fn issue_pair(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        let access = Self::issue(identity, &self.access_secret, self.access_ttl)?;
        let refresh = Self::issue(identity, &self.refresh_secret, self.refresh_ttl)?;
        Ok(TokenPair { access, refresh })
    }

    pub fn verify_access(&self, token: &str) -> Result<Identity, AuthError> {
        Self::verify(token, &self.access_secret)
    }

    pub fn verify_refresh(&self, token: &str) -> Result<Identity, AuthError> {
        Self::verify(token, &self.refresh_secret)
    }
}
