//! Environment configuration for the authentication subsystem.
//!
//! Misconfiguration here is the only fatal failure class in the system:
//! a missing backend selector or an empty signing secret halts startup
//! instead of limping along with defaults.

use crate::auth::oauth::OAuthSettings;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("GREENROOM_BACKEND must be \"local\" or \"remote\" (got {0:?})")]
    Backend(Option<String>),

    #[error("{0} must be set to a non-empty signing secret")]
    MissingSecret(&'static str),

    #[error("remote backend selected but {0} is missing or empty")]
    MissingRemote(&'static str),
}

/// Which variant backs the form verbs. A one-time decision: the two
/// backends have incompatible persistence models and are never mixed within
/// a running instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

/// Remote identity service coordinates.
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub url: String,
    pub api_key: String,
}

/// Everything the auth subsystem needs at startup.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub backend: BackendKind,
    pub access_secret: String,
    pub refresh_secret: String,
    pub remote: Option<RemoteSettings>,
    pub oauth: Option<OAuthSettings>,
}

fn non_empty(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingSecret(name)),
    }
}

// An empty remote URL or key would surface as transport errors on every
// request; it belongs to the fatal startup class like the secrets.
fn required_remote(name: &'static str) -> Result<String, ConfigError> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(ConfigError::MissingRemote(name)),
    }
}

impl AuthSettings {
    pub fn from_env() -> Result<Self, ConfigError> {
        let backend = match std::env::var("GREENROOM_BACKEND").ok().as_deref() {
            Some("local") => BackendKind::Local,
            Some("remote") => BackendKind::Remote,
            other => return Err(ConfigError::Backend(other.map(str::to_string))),
        };

        let access_secret = non_empty("GREENROOM_ACCESS_SECRET")?;
        let refresh_secret = non_empty("GREENROOM_REFRESH_SECRET")?;

        let remote = if backend == BackendKind::Remote {
            Some(RemoteSettings {
                url: required_remote("REMOTE_AUTH_URL")?,
                api_key: required_remote("REMOTE_AUTH_KEY")?,
            })
        } else {
            None
        };

        Ok(Self {
            backend,
            access_secret,
            refresh_secret,
            remote,
            oauth: OAuthSettings::from_env(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // Environment mutation is process-global, so every case lives in this
    // one test and cannot interleave with another.
    #[test]
    fn test_remote_backend_requires_non_empty_coordinates() {
        std::env::set_var("GREENROOM_BACKEND", "remote");
        std::env::set_var("GREENROOM_ACCESS_SECRET", "access-secret");
        std::env::set_var("GREENROOM_REFRESH_SECRET", "refresh-secret");

        std::env::set_var("REMOTE_AUTH_URL", "");
        std::env::set_var("REMOTE_AUTH_KEY", "service-key");
        assert_matches!(
            AuthSettings::from_env(),
            Err(ConfigError::MissingRemote("REMOTE_AUTH_URL"))
        );

        std::env::set_var("REMOTE_AUTH_URL", "https://id.example.com");
        std::env::set_var("REMOTE_AUTH_KEY", "");
        assert_matches!(
            AuthSettings::from_env(),
            Err(ConfigError::MissingRemote("REMOTE_AUTH_KEY"))
        );

        std::env::set_var("REMOTE_AUTH_KEY", "service-key");
        let settings = AuthSettings::from_env().unwrap();
        assert_eq!(settings.backend, BackendKind::Remote);
        assert_eq!(settings.remote.unwrap().url, "https://id.example.com");

        for name in [
            "GREENROOM_BACKEND",
            "GREENROOM_ACCESS_SECRET",
            "GREENROOM_REFRESH_SECRET",
            "REMOTE_AUTH_URL",
            "REMOTE_AUTH_KEY",
        ] {
            std::env::remove_var(name);
        }
    }
}
