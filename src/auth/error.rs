//! Error taxonomy for the authentication subsystem.
//!
//! Every variant here is recoverable at the request boundary: handlers map
//! them to a re-rendered form with a user-facing message, never to a crash.

/// Failures surfaced by the authenticator, token service and stores.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("no credential record matches that email")]
    NotFound,

    #[error("password mismatch or provider rejection")]
    InvalidCredentials,

    #[error("an account with that email already exists")]
    DuplicateAccount,

    #[error("password and confirmation do not match")]
    PasswordMismatch,

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error("token verification failed")]
    Verification,

    #[error("identity service unreachable: {0}")]
    Transport(String),

    #[error("credential store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("password hashing failed: {0}")]
    Hash(String),
}

impl AuthError {
    /// Message rendered back into the form on a failed attempt. Internal
    /// detail never leaks to the page.
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthError::NotFound => "No account matches that email",
            AuthError::InvalidCredentials => "The credentials you have entered are invalid",
            AuthError::DuplicateAccount => "An account with that email already exists",
            AuthError::PasswordMismatch => "The passwords do not match",
            AuthError::Transport(_) => "The identity service is currently unavailable",
            _ => "Something went wrong, please try again",
        }
    }
}
