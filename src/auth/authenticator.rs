//! The authenticator capability set: login, register, logout, callback
//! verification.
//!
//! Three variants implement the set behind one tagged type: `Local`
//! (password against the SQLite store), `Remote` (delegated to the hosted
//! identity service) and `OAuthRedirect` (consent-flow redirect, session
//! established by the callback). The variant backing the form verbs is a
//! one-time startup decision; the two persistence models are never mixed in
//! one running instance.

use std::sync::Arc;

use serde::Deserialize;

use super::error::AuthError;
use super::models::{Credentials, Identity, RegisterParams, User};
use super::oauth::OAuthClient;
use super::password::{hash_password, verify_password};
use super::remote::RemoteIdentityClient;
use super::store::UserStore;
use super::token::{TokenPair, TokenService};

/// An established session: the identity plus the freshly-minted token pair
/// the transport will persist as cookies.
#[derive(Debug, Clone)]
pub struct Session {
    pub identity: Identity,
    pub tokens: TokenPair,
}

/// What a login or registration attempt produced. The OAuthRedirect variant
/// never establishes a session directly; it hands back the provider's
/// consent URL instead.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    Established(Session),
    RedirectToProvider(String),
}

/// Parameters delivered to `GET /auth/callback`. The OAuth flow supplies an
/// authorization code; the remote and local flows supply a provider-style
/// access token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub access_token: Option<String>,
}

pub struct LocalAuthenticator {
    store: UserStore,
    tokens: Arc<TokenService>,
}

pub struct RemoteAuthenticator {
    client: RemoteIdentityClient,
    tokens: Arc<TokenService>,
}

pub struct OAuthRedirector {
    client: OAuthClient,
    tokens: Arc<TokenService>,
}

/// Tagged authenticator, constructed once at startup and injected into the
/// router.
pub enum Authenticator {
    Local(LocalAuthenticator),
    Remote(RemoteAuthenticator),
    OAuthRedirect(OAuthRedirector),
}

fn establish(tokens: &TokenService, email: &str) -> Result<Session, AuthError> {
    let identity = Identity::authenticated(email);
    let pair = tokens.issue_pair(&identity)?;
    Ok(Session {
        identity,
        tokens: pair,
    })
}

impl Authenticator {
    pub fn local(store: UserStore, tokens: Arc<TokenService>) -> Self {
        Self::Local(LocalAuthenticator { store, tokens })
    }

    pub fn remote(client: RemoteIdentityClient, tokens: Arc<TokenService>) -> Self {
        Self::Remote(RemoteAuthenticator { client, tokens })
    }

    pub fn oauth_redirect(client: OAuthClient, tokens: Arc<TokenService>) -> Self {
        Self::OAuthRedirect(OAuthRedirector { client, tokens })
    }

    /// Log in with the supplied credentials. Any failure leaves the caller
    /// anonymous.
    pub async fn login(&self, credentials: Credentials) -> Result<LoginOutcome, AuthError> {
        match self {
            Self::Local(local) => {
                log::info!("🔐 🏠 Logging in {} against the local store", credentials.email);
                let user = local
                    .store
                    .find_by_email(&credentials.email)?
                    .ok_or(AuthError::NotFound)?;
                let hash = user
                    .password_hash
                    .as_deref()
                    .ok_or(AuthError::InvalidCredentials)?;
                if !verify_password(&credentials.password, hash)? {
                    return Err(AuthError::InvalidCredentials);
                }
                Ok(LoginOutcome::Established(establish(
                    &local.tokens,
                    &user.email,
                )?))
            }
            Self::Remote(remote) => {
                log::info!("🔐 🛰️  Logging in {} against the identity service", credentials.email);
                let user = remote
                    .client
                    .sign_in(&credentials.email, &credentials.password)
                    .await?;
                Ok(LoginOutcome::Established(establish(
                    &remote.tokens,
                    &user.email,
                )?))
            }
            Self::OAuthRedirect(oauth) => {
                log::info!("🔐 🔀 Redirecting login to the OAuth provider");
                Ok(LoginOutcome::RedirectToProvider(oauth.client.consent_url()))
            }
        }
    }

    /// Register a new account and establish a session with the same shape as
    /// a login success. The confirmation check runs before any store access,
    /// so a mismatch never creates a record.
    pub async fn register(&self, params: RegisterParams) -> Result<LoginOutcome, AuthError> {
        if params.password != params.password_confirmation {
            return Err(AuthError::PasswordMismatch);
        }
        if params.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        match self {
            Self::Local(local) => {
                log::info!("🔐 🏠 Registering {} in the local store", params.email);
                if local.store.find_by_email(&params.email)?.is_some() {
                    return Err(AuthError::DuplicateAccount);
                }
                let hash = hash_password(&params.password)?;
                let user = User::new(&params.email, &params.username, Some(hash));
                local.store.create(&user)?;
                Ok(LoginOutcome::Established(establish(
                    &local.tokens,
                    &user.email,
                )?))
            }
            Self::Remote(remote) => {
                log::info!("🔐 🛰️  Registering {} with the identity service", params.email);
                let user = remote
                    .client
                    .sign_up(&params.email, &params.password)
                    .await?;
                Ok(LoginOutcome::Established(establish(
                    &remote.tokens,
                    &user.email,
                )?))
            }
            Self::OAuthRedirect(oauth) => {
                log::info!("🔐 🔀 Redirecting registration to the OAuth provider");
                Ok(LoginOutcome::RedirectToProvider(oauth.client.consent_url()))
            }
        }
    }

    /// Idempotent: logging out an already-cleared session is not an error.
    /// The transport clears the cookies; nothing is revoked server-side.
    pub fn logout(&self) {
        log::info!("🎬 User logged out");
    }

    /// Exchange a provider-supplied token or authorization code for a local
    /// session.
    pub async fn verify_callback(&self, params: CallbackParams) -> Result<Session, AuthError> {
        match self {
            Self::Local(local) => {
                let token = params.access_token.ok_or(AuthError::Verification)?;
                let identity = local.tokens.verify_access(&token)?;
                establish(&local.tokens, &identity.email)
            }
            Self::Remote(remote) => {
                let token = params.access_token.ok_or(AuthError::Verification)?;
                let user = remote.client.user(&token).await?;
                establish(&remote.tokens, &user.email)
            }
            Self::OAuthRedirect(oauth) => {
                let code = params.code.ok_or(AuthError::Verification)?;
                let email = oauth.client.exchange_code(&code).await?;
                establish(&oauth.tokens, &email)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn local() -> (Authenticator, UserStore, Arc<TokenService>) {
        let store = UserStore::in_memory().unwrap();
        let tokens = Arc::new(TokenService::new("access-secret", "refresh-secret"));
        let auth = Authenticator::local(store.clone(), Arc::clone(&tokens));
        (auth, store, tokens)
    }

    fn register_params(email: &str, password: &str, confirmation: &str) -> RegisterParams {
        RegisterParams {
            username: "testuser".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            password_confirmation: confirmation.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let (auth, _, tokens) = local();

        let outcome = auth
            .register(register_params("user@example.com", "secret123", "secret123"))
            .await
            .unwrap();
        assert_matches!(outcome, LoginOutcome::Established(_));

        let outcome = auth
            .login(Credentials {
                email: "user@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await
            .unwrap();

        let LoginOutcome::Established(session) = outcome else {
            panic!("expected an established session");
        };
        assert!(session.identity.logged_in);
        assert_eq!(session.identity.email, "user@example.com");

        // The minted access token verifies back to the submitted email.
        let verified = tokens.verify_access(&session.tokens.access.token).unwrap();
        assert_eq!(verified.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_not_found() {
        let (auth, _, _) = local();
        let result = auth
            .login(Credentials {
                email: "nobody@example.com".to_string(),
                password: "secret123".to_string(),
            })
            .await;
        assert_matches!(result, Err(AuthError::NotFound));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_invalid_credentials() {
        let (auth, _, _) = local();
        auth.register(register_params("user@example.com", "secret123", "secret123"))
            .await
            .unwrap();

        let result = auth
            .login(Credentials {
                email: "user@example.com".to_string(),
                password: "wrong-password".to_string(),
            })
            .await;
        assert_matches!(result, Err(AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_password_mismatch_never_reaches_the_store() {
        let (auth, store, _) = local();

        let result = auth
            .register(register_params("user@example.com", "secret123", "different"))
            .await;
        assert_matches!(result, Err(AuthError::PasswordMismatch));
        assert_eq!(store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_registration_leaves_first_record_intact() {
        let (auth, store, _) = local();

        auth.register(register_params("user@example.com", "secret123", "secret123"))
            .await
            .unwrap();
        let first = store.find_by_email("user@example.com").unwrap().unwrap();

        let result = auth
            .register(register_params("user@example.com", "other-pass1", "other-pass1"))
            .await;
        assert_matches!(result, Err(AuthError::DuplicateAccount));

        let still = store.find_by_email("user@example.com").unwrap().unwrap();
        assert_eq!(still.id, first.id);
        assert_eq!(still.password_hash, first.password_hash);
        assert_eq!(store.count().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stored_hash_is_not_the_plain_password() {
        let (auth, store, _) = local();
        auth.register(register_params("user@example.com", "secret123", "secret123"))
            .await
            .unwrap();

        let user = store.find_by_email("user@example.com").unwrap().unwrap();
        let hash = user.password_hash.unwrap();
        assert_ne!(hash, "secret123");
        assert!(hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_local_callback_reissues_from_a_valid_access_token() {
        let (auth, _, tokens) = local();
        auth.register(register_params("user@example.com", "secret123", "secret123"))
            .await
            .unwrap();

        let pair = tokens
            .issue_pair(&Identity::authenticated("user@example.com"))
            .unwrap();
        let session = auth
            .verify_callback(CallbackParams {
                access_token: Some(pair.access.token),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(session.identity.email, "user@example.com");
    }

    #[tokio::test]
    async fn test_callback_without_token_fails_verification() {
        let (auth, _, _) = local();
        let result = auth.verify_callback(CallbackParams::default()).await;
        assert_matches!(result, Err(AuthError::Verification));
    }
}
