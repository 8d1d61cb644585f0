//! Caller identity.
//!
//! A caller is identified by a sign-in token, sent either as an
//! `Authorization: Bearer` header or in the `journal_token` cookie set by the
//! login page. Tokens map to user ids through configuration. Callers without
//! a known token fall back to the shared anonymous identity unless anonymous
//! access is disabled.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    response::Redirect,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use std::collections::HashMap;
use std::sync::Arc;
use trade_journal_core::{AuthConfig, Identity};
use tracing::{debug, warn};

pub const TOKEN_COOKIE: &str = "journal_token";

#[derive(Debug, Clone)]
pub struct Authenticator {
    allow_anonymous: bool,
    tokens: HashMap<String, String>,
}

impl Authenticator {
    #[must_use]
    pub fn new(allow_anonymous: bool, tokens: HashMap<String, String>) -> Self {
        Self {
            allow_anonymous,
            tokens,
        }
    }

    #[must_use]
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.allow_anonymous, config.tokens.clone())
    }

    #[must_use]
    pub const fn allows_anonymous(&self) -> bool {
        self.allow_anonymous
    }

    /// Exchanges a sign-in token for an identity.
    #[must_use]
    pub fn sign_in(&self, token: &str) -> Option<Identity> {
        self.tokens.get(token.trim()).map(Identity::token)
    }

    /// Resolves the caller from request headers and cookies.
    ///
    /// Returns `None` only when no known token was presented and anonymous
    /// access is disabled.
    #[must_use]
    pub fn resolve(&self, headers: &HeaderMap, jar: &CookieJar) -> Option<Identity> {
        let presented = bearer_token(headers)
            .or_else(|| jar.get(TOKEN_COOKIE).map(|c| c.value().to_string()));

        if let Some(token) = presented {
            if let Some(identity) = self.sign_in(&token) {
                debug!(user_id = %identity.user_id, "Authenticated by token");
                return Some(identity);
            }
            warn!("Unknown sign-in token presented");
        }

        self.allow_anonymous.then(Identity::anonymous)
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Cookie carrying the sign-in token for browser sessions.
#[must_use]
pub fn session_cookie(token: &str) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

#[must_use]
pub fn clear_session(jar: CookieJar) -> CookieJar {
    jar.remove(Cookie::build(TOKEN_COOKIE).path("/"))
}

/// Identity of an API caller; rejects with 401.
pub struct CurrentUser(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        state
            .auth
            .resolve(&parts.headers, &jar)
            .map(Self)
            .ok_or(ApiError::Unauthorized)
    }
}

/// Identity of a browser caller; redirects to the sign-in page.
pub struct PageUser(pub Identity);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for PageUser {
    type Rejection = Redirect;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        state
            .auth
            .resolve(&parts.headers, &jar)
            .map(Self)
            .ok_or_else(|| Redirect::to("/login"))
    }
}
