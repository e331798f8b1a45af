//! Router assembly and the page handlers outside the auth subsystem.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::Extension,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::cookie::CookieJar;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::auth::middleware::{attach_identity, require_authenticated};
use crate::auth::{
    auth_router, session, AuthState, Authenticator, Identity, OAuthClient, RemoteIdentityClient,
    TokenService, UserStore,
};
use crate::config::{AuthSettings, BackendKind};
use crate::pages;

/// Server bind and filesystem options.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub assets_dir: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            database: "data/greenroom.db".to_string(),
            assets_dir: "assets".to_string(),
        }
    }
}

/// Wire the authenticator variants from settings. Everything is constructed
/// here once and injected; no component reaches for ambient state later.
pub fn build_state(
    settings: &AuthSettings,
    store: UserStore,
) -> Result<AuthState, crate::auth::AuthError> {
    let tokens = Arc::new(TokenService::new(
        &settings.access_secret,
        &settings.refresh_secret,
    ));

    let auth = match settings.backend {
        BackendKind::Local => Authenticator::local(store, Arc::clone(&tokens)),
        BackendKind::Remote => {
            // from_env guarantees remote settings exist for this backend
            let remote = settings.remote.as_ref().ok_or_else(|| {
                crate::auth::AuthError::Transport("remote settings missing".to_string())
            })?;
            Authenticator::remote(
                RemoteIdentityClient::new(&remote.url, &remote.api_key),
                Arc::clone(&tokens),
            )
        }
    };

    let oauth = match &settings.oauth {
        Some(oauth_settings) => Some(Arc::new(Authenticator::oauth_redirect(
            OAuthClient::new(oauth_settings.clone())?,
            Arc::clone(&tokens),
        ))),
        None => None,
    };

    Ok(AuthState {
        auth: Arc::new(auth),
        oauth,
        tokens,
        public_prefix: "/assets".to_string(),
    })
}

/// Assemble the application router. Identity is resolved once per request by
/// the outermost layer; `require_authenticated` gates only the protected
/// routes.
pub fn build_router(state: AuthState, assets_dir: &str) -> Router {
    let protected = Router::new()
        .route("/dashboard", get(get_dashboard))
        .route_layer(middleware::from_fn(require_authenticated));

    Router::new()
        .route("/", get(get_home))
        .merge(auth_router())
        .merge(protected)
        .nest_service("/assets", ServeDir::new(assets_dir))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            attach_identity,
        ))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind and serve until shutdown.
pub async fn serve(
    config: ServerConfig,
    settings: AuthSettings,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = std::path::Path::new(&config.database).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let store = UserStore::open(&config.database)?;
    let state = build_state(&settings, store)?;
    let app = build_router(state, &config.assets_dir);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    log::info!("🌐 Greenroom listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}

/// The marker cookie is only a display-level hint: a stale one costs a
/// redirect to a gated page, which bounces back to login.
async fn get_home(jar: CookieJar) -> Response {
    if jar.get(session::USER_COOKIE).is_some() {
        Redirect::to("/dashboard").into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

async fn get_dashboard(identity: Option<Extension<Identity>>) -> Response {
    let email = identity
        .map(|Extension(identity)| identity.email)
        .unwrap_or_default();
    pages::dashboard_page(&email).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_server_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.host, "127.0.0.1");
    }
}
