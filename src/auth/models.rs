//! Authentication data models

use serde::{Deserialize, Serialize};

/// Credential record persisted by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Build a fresh record for a registration. The caller supplies an
    /// already-hashed password, or `None` for accounts whose credentials
    /// live with a remote provider.
    pub fn new(email: &str, username: &str, password_hash: Option<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.to_string(),
            username: username.to_string(),
            password_hash,
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

/// Who is making the current request. Constructed fresh per request from
/// cookie state, never persisted. An identity with `logged_in == false`
/// carries no email claim a caller could rely on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub email: String,
    pub logged_in: bool,
}

impl Identity {
    pub fn authenticated(email: &str) -> Self {
        Self {
            email: email.to_string(),
            logged_in: true,
        }
    }

    pub fn anonymous() -> Self {
        Self {
            email: String::new(),
            logged_in: false,
        }
    }
}

/// JWT claims carried by both token kinds.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub exp: usize,
    pub iat: usize,
}

/// Login form submission.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Registration form submission.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterParams {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
}
