//! Request identity middleware.
//!
//! `attach_identity` runs in front of every non-public route and resolves
//! the caller once per request: an identity attached earlier in the same
//! request wins, then verified cookie state, then anonymous. Downstream
//! handlers read the attached extension and never re-resolve.
//! `require_authenticated` is the separable gate that actually enforces
//! authorization for protected routes.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;

use super::models::Identity;
use super::routes::AuthState;
use super::session;

/// Resolve the caller's identity and attach it to the request extensions.
/// Resolution failures degrade to anonymous; they never abort the request.
pub async fn attach_identity(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    if request.uri().path().starts_with(&state.public_prefix) {
        return next.run(request).await;
    }

    // An identity attached by an earlier layer wins unconditionally, even
    // an anonymous one; cookie state is only consulted when nothing is
    // attached yet.
    let identity = match request.extensions().get::<Identity>() {
        Some(existing) => existing.clone(),
        None => session::resolve(&jar, &state.tokens),
    };

    if identity.logged_in {
        log::debug!("💃 {} on {}", identity.email, request.uri().path());
    } else {
        log::debug!("🥷 anonymous on {}", request.uri().path());
    }

    request.extensions_mut().insert(identity);
    next.run(request).await
}

/// Redirect anonymous callers to the login page, preserving the requested
/// path as the post-login target.
pub async fn require_authenticated(request: Request, next: Next) -> Response {
    let logged_in = request
        .extensions()
        .get::<Identity>()
        .map(|identity| identity.logged_in)
        .unwrap_or(false);

    if !logged_in {
        let target = format!("/login?to={}", request.uri().path());
        log::info!("🔀 Unauthenticated access to {}, redirecting", request.uri().path());
        return Redirect::to(&target).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::header;
    use axum::middleware::{from_fn, from_fn_with_state};
    use axum::routing::get;
    use axum::{Extension, Router};
    use tower::ServiceExt;

    use crate::auth::session::ACCESS_COOKIE;
    use crate::auth::{AuthState, Authenticator, TokenService, UserStore};

    async fn whoami(Extension(identity): Extension<Identity>) -> String {
        format!("{}:{}", identity.email, identity.logged_in)
    }

    async fn force_anonymous(mut request: Request, next: Next) -> Response {
        request.extensions_mut().insert(Identity::anonymous());
        next.run(request).await
    }

    fn state() -> AuthState {
        let store = UserStore::in_memory().unwrap();
        let tokens = Arc::new(TokenService::new("access-secret", "refresh-secret"));
        AuthState {
            auth: Arc::new(Authenticator::local(store, Arc::clone(&tokens))),
            oauth: None,
            tokens,
            public_prefix: "/assets".to_string(),
        }
    }

    fn access_cookie(state: &AuthState) -> String {
        let pair = state
            .tokens
            .issue_pair(&Identity::authenticated("user@example.com"))
            .unwrap();
        format!("{ACCESS_COOKIE}={}", pair.access.token)
    }

    async fn call(app: Router, cookie: &str) -> String {
        let request = Request::builder()
            .uri("/whoami")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_cookie_state_resolves_when_nothing_is_attached() {
        let state = state();
        let cookie = access_cookie(&state);
        let app = Router::new()
            .route("/whoami", get(whoami))
            .layer(from_fn_with_state(state, attach_identity));

        assert_eq!(call(app, &cookie).await, "user@example.com:true");
    }

    #[tokio::test]
    async fn test_attached_identity_wins_over_cookie_state() {
        let state = state();
        let cookie = access_cookie(&state);
        // force_anonymous is the outer layer, so its identity is already
        // attached when resolution runs; the valid cookie must not override.
        let app = Router::new()
            .route("/whoami", get(whoami))
            .layer(from_fn_with_state(state, attach_identity))
            .layer(from_fn(force_anonymous));

        assert_eq!(call(app, &cookie).await, ":false");
    }
}
