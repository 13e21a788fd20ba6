//! Caller identity extractors.
//!
//! Authentication happens upstream; the proxy forwards the authenticated user
//! id in the `X-User-Id` header. These extractors resolve it against the
//! directory and enforce role requirements at the type level.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};

use crate::error::AttendanceError;
use crate::models::User;

use super::response::{ApiError, ApiErrorResponse};
use super::state::AppState;

/// Header carrying the authenticated user's id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Resolves the caller from request headers.
pub(crate) fn authenticate(headers: &HeaderMap, state: &AppState) -> Result<User, ApiErrorResponse> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .ok_or_else(ApiErrorResponse::unauthenticated)?;

    match state.directory().user(user_id) {
        Ok(user) => Ok(user),
        Err(AttendanceError::UserNotFound { .. }) => Err(ApiErrorResponse {
            error: ApiError::with_details(
                "UNAUTHENTICATED",
                "A valid user identity is required",
                format!("Unknown user '{}'", user_id),
            ),
            ..ApiErrorResponse::unauthenticated()
        }),
        Err(e) => Err(e.into()),
    }
}

/// Any known user. Rejects with 401 otherwise.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authenticate(&parts.headers, state).map(CurrentUser)
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub User);

#[async_trait]
impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiErrorResponse;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = authenticate(&parts.headers, state)?;
        if !user.is_admin() {
            return Err(AttendanceError::Forbidden {
                message: "Admin role required".to_string(),
            }
            .into());
        }
        Ok(RequireAdmin(user))
    }
}
