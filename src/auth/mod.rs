//! Authentication and session subsystem
//!
//! Provides:
//! - Password-backed local accounts (SQLite) and a delegated remote backend
//! - Signed, expiring access/refresh session tokens
//! - Cookie transport for the session set
//! - Per-request identity resolution middleware

pub mod authenticator;
pub mod error;
pub mod middleware;
pub mod models;
pub mod oauth;
pub mod password;
pub mod remote;
pub mod routes;
pub mod session;
pub mod store;
pub mod token;

pub use authenticator::{Authenticator, CallbackParams, LoginOutcome, Session};
pub use error::AuthError;
pub use models::{Claims, Credentials, Identity, RegisterParams, User};
pub use oauth::{OAuthClient, OAuthSettings};
pub use remote::RemoteIdentityClient;
pub use routes::{auth_router, AuthState};
pub use store::UserStore;
pub use token::{TokenPair, TokenService};
