//! # Greenroom
//!
//! A small web application with user registration, login and a
//! session-gated dashboard, backed by either a local SQLite store or a
//! remote hosted identity service.
//!
//! The interesting part is the authentication subsystem in [`auth`]: a
//! tagged authenticator over local/remote/OAuth backends, a signed
//! access/refresh token service, cookie session transport and per-request
//! identity middleware. [`server`] wires it into an axum router.

/// Authentication and session subsystem
pub mod auth;

/// Environment configuration
pub mod config;

/// Router assembly and page handlers
pub mod server;

/// HTML page rendering
pub mod pages;

mod logging;

pub use auth::{AuthError, Authenticator, Identity, TokenService, UserStore};
pub use config::{AuthSettings, BackendKind, ConfigError};
pub use server::{build_router, build_state, ServerConfig};

pub use logging::setup_logging;

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
