//! Owner session extractor

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use axum_extra::extract::CookieJar;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::user::User;

pub const SIGN_IN_REQUIRED: &str = "Unauthorized. Please sign in to access this resource.";
pub const USER_NOT_FOUND: &str = "User not found. Please sign in again.";
const SESSIONS_NOT_CONFIGURED: &str =
    "Authentication not configured. Please set SESSION_SECRET in your environment variables.";

/// Extractor resolving the signed-in owner.
///
/// The session token is read from `Authorization: Bearer <token>` or, failing
/// that, from the configured session cookie.
#[derive(Debug, Clone)]
pub struct RequireUser(pub User);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let sessions = state
            .sessions
            .as_ref()
            .ok_or_else(|| ApiError::unavailable(SESSIONS_NOT_CONFIGURED))?;

        let token = extract_session_token(&parts.headers, &state.session_cookie)
            .ok_or_else(|| ApiError::unauthorized(SIGN_IN_REQUIRED))?;

        let claims = sessions.validate(&token).map_err(|e| {
            debug!(error = %e, "Rejected session token");
            ApiError::unauthorized(SIGN_IN_REQUIRED)
        })?;

        let user = state
            .users
            .get_by_email(&claims.email)
            .await?
            .ok_or_else(|| ApiError::unauthorized(USER_NOT_FOUND))?;

        Ok(RequireUser(user))
    }
}

/// Bearer token first, then the named cookie
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(cookie_name)
        .map(|cookie| cookie.value_trimmed())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}
