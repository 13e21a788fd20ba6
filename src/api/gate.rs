//! Access gate middleware for routes that require an active shift.

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use super::extract::authenticate;
use super::response::ApiErrorResponse;
use super::state::AppState;

/// Response header carrying whole minutes left before the shift ends.
pub const SHIFT_WARNING_HEADER: &str = "x-shift-warning";

/// Runs the access gate before the handler.
///
/// Rejected requests never reach the handler. Passing requests near the end of
/// the shift get [`SHIFT_WARNING_HEADER`] on the response.
pub async fn require_active_shift(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let user = match authenticate(request.headers(), &state) {
        Ok(user) => user,
        Err(rejection) => return rejection.into_response(),
    };

    let pass = match state.gate().check(&user) {
        Ok(pass) => pass,
        Err(err) => {
            warn!(
                user_id = %user.id,
                path = %request.uri().path(),
                error = %err,
                "Access gate rejected request"
            );
            return ApiErrorResponse::from(err).into_response();
        }
    };

    let mut response = next.run(request).await;

    if let Some(warning) = pass.warning {
        debug!(user_id = %user.id, minutes = warning.minutes_remaining, "Shift ending soon");
        response.headers_mut().insert(
            SHIFT_WARNING_HEADER,
            HeaderValue::from(warning.minutes_remaining),
        );
    }
    response
}
