//! Request types for the attendance API.
//!
//! This module defines the JSON request bodies and query strings accepted by
//! the endpoints, plus the shared handling of malformed bodies.

use axum::{extract::rejection::JsonRejection, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::response::{ApiError, ApiErrorResponse};

/// Body of `POST /clock-in`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockInRequest {
    /// Free-text note stored on the session.
    #[serde(default)]
    pub notes: Option<String>,
    /// Till float at the start of the session.
    #[serde(default)]
    pub opening_balance: Option<Decimal>,
}

/// Body of `POST /clock-out`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClockOutRequest {
    /// Free-text note appended to the session.
    #[serde(default)]
    pub notes: Option<String>,
    /// Till count at the end of the session.
    #[serde(default)]
    pub closing_balance: Option<Decimal>,
}

/// Body of `POST /override/extend/:userId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtendShiftRequest {
    /// Minutes to add to the session's end (1-480).
    pub duration: i64,
    /// Reason for the extension.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of `POST /override/force-logout/:userId`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForceLogoutRequest {
    /// Reason for terminating the session.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Body of `PUT /users/:userId/shift`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignShiftRequest {
    /// The shift to assign.
    pub shift_id: String,
}

/// Query string of `GET /override/logs`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideLogQuery {
    /// Restrict to one user.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Unwraps a JSON body, turning extractor rejections into API errors.
pub(crate) fn parse_body<T>(
    payload: Result<Json<T>, JsonRejection>,
    correlation_id: Uuid,
) -> Result<T, ApiErrorResponse> {
    let rejection = match payload {
        Ok(Json(body)) => return Ok(body),
        Err(rejection) => rejection,
    };

    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            // Get the body text which contains the detailed error from serde
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    Err(ApiErrorResponse::bad_request(error))
}
