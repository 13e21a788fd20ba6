//! Error types for the shift attendance engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for every outcome that can stop an attendance operation. Attendance-state
//! variants are expected business outcomes; only the system variants
//! represent infrastructure failures.

use thiserror::Error;

/// The main error type for the shift attendance engine.
///
/// All operations in the engine return this error type, making it easy
/// to handle errors consistently throughout the application.
///
/// # Example
///
/// ```
/// use shift_attendance::error::AttendanceError;
///
/// let error = AttendanceError::EarlyClockOutRestricted {
///     end_time: "17:00".to_string(),
/// };
/// assert_eq!(error.to_string(), "Cannot clock out before shift end at 17:00");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttendanceError {
    /// The user has no shift assigned and cannot take part in attendance.
    #[error("No shift assigned to user '{user_id}'")]
    NoShiftAssigned {
        /// The user without an assignment.
        user_id: String,
    },

    /// The user already has an open attendance session.
    #[error("User '{user_id}' is already clocked in")]
    AlreadyClockedIn {
        /// The user holding the open session.
        user_id: String,
    },

    /// The user has no open attendance session.
    #[error("User '{user_id}' is not clocked in")]
    NotClockedIn {
        /// The user without an open session.
        user_id: String,
    },

    /// The current time falls outside the user's shift window.
    #[error("Outside shift window for '{shift_name}' ({start_time}-{end_time})")]
    OutsideShiftWindow {
        /// Name of the assigned shift.
        shift_name: String,
        /// Nominal shift start, `HH:MM`.
        start_time: String,
        /// Nominal shift end, `HH:MM`.
        end_time: String,
    },

    /// A non-admin tried to clock out before the nominal shift end.
    #[error("Cannot clock out before shift end at {end_time}")]
    EarlyClockOutRestricted {
        /// Nominal shift end, `HH:MM`.
        end_time: String,
    },

    /// The session's window elapsed; it has been closed by the request that found it.
    #[error("Shift ended for user '{user_id}'; session was closed automatically")]
    ShiftEnded {
        /// The user whose session was closed.
        user_id: String,
    },

    /// An override duration was outside the accepted range.
    #[error("Invalid extension duration {minutes} minutes (must be 1-480)")]
    InvalidDuration {
        /// The rejected duration.
        minutes: i64,
    },

    /// An override was submitted without a reason.
    #[error("A reason is required for this action")]
    ReasonRequired,

    /// Another shift already uses this name.
    #[error("A shift named '{name}' already exists")]
    ShiftNameConflict {
        /// The conflicting name.
        name: String,
    },

    /// A shift definition failed validation.
    #[error("Invalid shift field '{field}': {message}")]
    InvalidShift {
        /// The offending field.
        field: String,
        /// What made it invalid.
        message: String,
    },

    /// The shift definition does not exist.
    #[error("Shift not found: {shift_id}")]
    ShiftNotFound {
        /// The missing shift id.
        shift_id: String,
    },

    /// The shift is still assigned to at least one user.
    #[error("Shift '{shift_id}' is assigned to {assigned_users} user(s) and cannot be deleted")]
    ShiftInUse {
        /// The shift that is still referenced.
        shift_id: String,
        /// Number of users still assigned.
        assigned_users: usize,
    },

    /// The user does not exist.
    #[error("User not found: {user_id}")]
    UserNotFound {
        /// The missing user id.
        user_id: String,
    },

    /// The caller lacks the role required for the action.
    #[error("Forbidden: {message}")]
    Forbidden {
        /// Which role was required.
        message: String,
    },

    /// The attendance store could not be read or written.
    #[error("Storage unavailable: {message}")]
    StorageUnavailable {
        /// A description of the failure.
        message: String,
    },

    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },
}

impl AttendanceError {
    /// Returns true for infrastructure failures, as opposed to business outcomes.
    pub fn is_system_error(&self) -> bool {
        matches!(
            self,
            AttendanceError::StorageUnavailable { .. }
                | AttendanceError::ConfigNotFound { .. }
                | AttendanceError::ConfigParseError { .. }
        )
    }
}

/// A type alias for Results that return AttendanceError.
pub type AttendanceResult<T> = Result<T, AttendanceError>;
