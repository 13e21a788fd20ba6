//! Response types for the attendance API.
//!
//! This module defines the error response structures and the mapping from
//! [`AttendanceError`] to HTTP status codes and stable error codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::AttendanceError;

/// Shift details attached to errors that the UI explains with the shift's bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftInfo {
    /// Nominal shift end, `HH:MM`.
    pub end_time: String,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Shift bounds for errors that need them.
    #[serde(rename = "shiftInfo", skip_serializing_if = "Option::is_none")]
    pub shift_info: Option<ShiftInfo>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            shift_info: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            details: Some(details.into()),
            ..Self::new(code, message)
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
#[derive(Debug)]
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    /// A 400 response with the given body.
    pub fn bad_request(error: ApiError) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error,
        }
    }

    /// The caller could not be identified.
    pub fn unauthenticated() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            error: ApiError::new("UNAUTHENTICATED", "A valid user identity is required"),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<AttendanceError> for ApiErrorResponse {
    fn from(err: AttendanceError) -> Self {
        if err.is_system_error() {
            error!(error = %err, "Request failed with system error");
            return ApiErrorResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: ApiError::new("INTERNAL_ERROR", "Internal server error"),
            };
        }

        let message = err.to_string();
        let (status, code) = match &err {
            AttendanceError::NoShiftAssigned { .. } => (StatusCode::FORBIDDEN, "NO_SHIFT_ASSIGNED"),
            AttendanceError::AlreadyClockedIn { .. } => (StatusCode::CONFLICT, "ALREADY_CLOCKED_IN"),
            AttendanceError::NotClockedIn { .. } => (StatusCode::BAD_REQUEST, "NOT_CLOCKED_IN"),
            AttendanceError::OutsideShiftWindow { .. } => {
                (StatusCode::FORBIDDEN, "OUTSIDE_SHIFT_TIME")
            }
            AttendanceError::EarlyClockOutRestricted { end_time } => {
                return ApiErrorResponse {
                    status: StatusCode::FORBIDDEN,
                    error: ApiError {
                        shift_info: Some(ShiftInfo {
                            end_time: end_time.clone(),
                        }),
                        ..ApiError::new("EARLY_CLOCK_OUT_RESTRICTED", message)
                    },
                };
            }
            AttendanceError::ShiftEnded { .. } => (StatusCode::FORBIDDEN, "SHIFT_ENDED"),
            AttendanceError::InvalidDuration { .. } => (StatusCode::BAD_REQUEST, "INVALID_DURATION"),
            AttendanceError::ReasonRequired => (StatusCode::BAD_REQUEST, "REASON_REQUIRED"),
            AttendanceError::ShiftNameConflict { .. } => {
                (StatusCode::CONFLICT, "SHIFT_NAME_CONFLICT")
            }
            AttendanceError::InvalidShift { .. } => (StatusCode::BAD_REQUEST, "INVALID_SHIFT"),
            AttendanceError::ShiftNotFound { .. } => (StatusCode::NOT_FOUND, "SHIFT_NOT_FOUND"),
            AttendanceError::ShiftInUse { .. } => (StatusCode::CONFLICT, "SHIFT_IN_USE"),
            AttendanceError::UserNotFound { .. } => (StatusCode::NOT_FOUND, "USER_NOT_FOUND"),
            AttendanceError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AttendanceError::StorageUnavailable { .. }
            | AttendanceError::ConfigNotFound { .. }
            | AttendanceError::ConfigParseError { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
            }
        };

        ApiErrorResponse {
            status,
            error: ApiError::new(code, message),
        }
    }
}
