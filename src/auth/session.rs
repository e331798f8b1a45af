//! Cookie transport for the session.
//!
//! Three cookies are written together on every successful authentication and
//! cleared together on logout: the two HTTP-only token cookies and a plain
//! email marker the UI may read for display. The marker is never trusted for
//! authorization; only a verified access token yields an identity.

use std::convert::Infallible;

use axum::http::{header, HeaderValue};
use axum::response::{IntoResponseParts, ResponseParts};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use chrono::Utc;

use super::models::Identity;
use super::token::{SignedToken, TokenPair, TokenService};

/// Access token cookie, HTTP-only.
pub const ACCESS_COOKIE: &str = "greenroom-access-token";
/// Refresh token cookie, HTTP-only.
pub const REFRESH_COOKIE: &str = "greenroom-refresh-token";
/// Identity marker cookie, plain email, readable by page scripts.
pub const USER_COOKIE: &str = "greenroom-user";

fn max_age_for(token: &SignedToken) -> time::Duration {
    // Round up so the cookie lives exactly as long as its token claim.
    let remaining_ms = (token.expires_at - Utc::now()).num_milliseconds().max(0);
    time::Duration::seconds((remaining_ms + 999) / 1000)
}

/// The cookie set written on a successful authentication: the jar carries
/// the two token cookies, the marker rides alongside. The jar
/// percent-encodes values on serialization; the marker must reach the
/// browser with the plain email, so its header is appended verbatim.
pub struct SessionCookies {
    jar: CookieJar,
    marker: Cookie<'static>,
}

impl IntoResponseParts for SessionCookies {
    type Error = Infallible;

    fn into_response_parts(self, res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        let mut res = self.jar.into_response_parts(res)?;
        // An email that is not a valid header value cannot be carried as a
        // marker; the token cookies alone still establish the session.
        if let Ok(value) = HeaderValue::from_str(&self.marker.to_string()) {
            res.headers_mut().append(header::SET_COOKIE, value);
        }
        Ok(res)
    }
}

/// Write the three session cookies, each expiring with its token.
pub fn set_session(jar: CookieJar, identity: &Identity, pair: &TokenPair) -> SessionCookies {
    let access = Cookie::build((ACCESS_COOKIE, pair.access.token.clone()))
        .path("/")
        .http_only(true)
        .max_age(max_age_for(&pair.access))
        .build();
    let refresh = Cookie::build((REFRESH_COOKIE, pair.refresh.token.clone()))
        .path("/")
        .http_only(true)
        .max_age(max_age_for(&pair.refresh))
        .build();
    let marker = Cookie::build((USER_COOKIE, identity.email.clone()))
        .path("/")
        .max_age(max_age_for(&pair.access))
        .build();

    log::info!("🍪 Session cookies set for {}", identity.email);
    SessionCookies {
        jar: jar.add(access).add(refresh),
        marker,
    }
}

/// Overwrite all three cookies with empty, immediately-expired values. All
/// three are cleared even if only one was originally set.
pub fn clear_session(jar: CookieJar) -> CookieJar {
    let mut jar = jar;
    for name in [ACCESS_COOKIE, REFRESH_COOKIE, USER_COOKIE] {
        let expired = Cookie::build((name, ""))
            .path("/")
            .max_age(time::Duration::ZERO)
            .build();
        jar = jar.add(expired);
    }
    log::info!("🗑️  Session cookies cleared");
    jar
}

/// Resolve the caller's identity from cookie state. A missing cookie or a
/// token that fails verification degrades to anonymous.
pub fn resolve(jar: &CookieJar, tokens: &TokenService) -> Identity {
    let Some(cookie) = jar.get(ACCESS_COOKIE) else {
        return Identity::anonymous();
    };
    match tokens.verify_access(cookie.value()) {
        Ok(identity) => identity,
        Err(e) => {
            log::debug!("access token did not verify, treating as anonymous: {e}");
            Identity::anonymous()
        }
    }
}
