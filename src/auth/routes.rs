//! Authentication routes: login, registration, logout and callback
//! verification.
//!
//! Every failure taxonomy entry maps to a re-rendered form with a
//! user-facing message; success paths set the session cookies and redirect.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use crate::pages;

use super::authenticator::{Authenticator, CallbackParams, LoginOutcome, Session};
use super::models::{Credentials, RegisterParams};
use super::session;
use super::token::TokenService;

/// Shared authentication state, constructed once at startup and injected
/// into the router.
#[derive(Clone)]
pub struct AuthState {
    /// Backs the form verbs; Local or Remote, never both.
    pub auth: Arc<Authenticator>,
    /// The OAuthRedirect variant, present when a provider is configured.
    pub oauth: Option<Arc<Authenticator>>,
    pub tokens: Arc<TokenService>,
    /// Paths under this prefix skip identity resolution entirely.
    pub public_prefix: String,
}

pub fn auth_router() -> Router<AuthState> {
    Router::new()
        .route("/login", get(get_login).post(post_login))
        .route("/register", get(get_register).post(post_register))
        .route("/logout", post(post_logout))
        .route("/auth/login", get(oauth_login))
        .route("/auth/callback", get(auth_callback))
}

#[derive(Debug, Deserialize)]
struct LoginPageQuery {
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    email: String,
    password: String,
    to: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RegisterForm {
    username: String,
    email: String,
    password: String,
    #[serde(rename = "password-confirmation")]
    password_confirmation: String,
}

/// Where to send the browser after a successful authentication. Only local
/// paths are honored.
fn post_login_target(to: Option<&str>) -> &str {
    match to {
        Some(path) if path.starts_with('/') && !path.starts_with("//") => path,
        _ => "/dashboard",
    }
}

fn established(jar: CookieJar, session: &Session, to: Option<&str>) -> Response {
    let cookies = session::set_session(jar, &session.identity, &session.tokens);
    (cookies, Redirect::to(post_login_target(to))).into_response()
}

async fn get_login(Query(query): Query<LoginPageQuery>) -> Response {
    pages::login_page(None, query.to.as_deref(), None).into_response()
}

async fn post_login(
    State(state): State<AuthState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = Credentials {
        email: form.email.clone(),
        password: form.password,
    };

    match state.auth.login(credentials).await {
        Ok(LoginOutcome::Established(session)) => established(jar, &session, form.to.as_deref()),
        Ok(LoginOutcome::RedirectToProvider(url)) => Redirect::temporary(&url).into_response(),
        Err(err) => {
            log::error!("🚨 Login failed for {}: {err}", form.email);
            pages::login_page(Some(err.user_message()), form.to.as_deref(), Some(&form.email))
                .into_response()
        }
    }
}

async fn get_register() -> Response {
    pages::register_page(None, None, None).into_response()
}

async fn post_register(
    State(state): State<AuthState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let params = RegisterParams {
        username: form.username.clone(),
        email: form.email.clone(),
        password: form.password,
        password_confirmation: form.password_confirmation,
    };

    match state.auth.register(params).await {
        Ok(LoginOutcome::Established(session)) => established(jar, &session, None),
        Ok(LoginOutcome::RedirectToProvider(url)) => Redirect::temporary(&url).into_response(),
        Err(err) => {
            log::error!("🚨 Registration failed for {}: {err}", form.email);
            pages::register_page(
                Some(err.user_message()),
                Some(&form.username),
                Some(&form.email),
            )
            .into_response()
        }
    }
}

/// Clears all three cookies unconditionally; logging out an already-cleared
/// session behaves identically.
async fn post_logout(State(state): State<AuthState>, jar: CookieJar) -> Response {
    state.auth.logout();
    let jar = session::clear_session(jar);
    (jar, Redirect::to("/login")).into_response()
}

/// Entry point of the third-party consent flow.
async fn oauth_login(State(state): State<AuthState>, jar: CookieJar) -> Response {
    let Some(oauth) = &state.oauth else {
        log::warn!("OAuth login requested but no provider is configured");
        return Redirect::to("/login").into_response();
    };

    match oauth.login(Credentials::default()).await {
        Ok(LoginOutcome::RedirectToProvider(url)) => Redirect::temporary(&url).into_response(),
        Ok(LoginOutcome::Established(session)) => established(jar, &session, None),
        Err(err) => {
            log::error!("🚨 OAuth redirect failed: {err}");
            pages::login_page(Some(err.user_message()), None, None).into_response()
        }
    }
}

/// Callback verification: exchanges the provider-supplied code or token for
/// a local session.
async fn auth_callback(
    State(state): State<AuthState>,
    jar: CookieJar,
    Query(params): Query<CallbackParams>,
) -> Response {
    let verifier = match (&state.oauth, params.code.is_some()) {
        (Some(oauth), true) => oauth,
        _ => &state.auth,
    };

    match verifier.verify_callback(params).await {
        Ok(session) => established(jar, &session, None),
        Err(err) => {
            log::error!("🚨 Callback verification failed: {err}");
            pages::login_page(Some(err.user_message()), None, None).into_response()
        }
    }
}
