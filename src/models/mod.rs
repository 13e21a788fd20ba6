//! Core data models for the shift attendance engine.
//!
//! This module contains all the domain models used throughout the engine.

mod attendance_entry;
mod override_entry;
mod shift_definition;
mod user;

pub use attendance_entry::{AUTO_LOGOUT_NOTE, AttendanceEntry, CloseReason, CloseRequest};
pub use override_entry::{OverrideAction, OverrideEntry};
pub use shift_definition::{DayCode, MINUTES_PER_DAY, ShiftDefinition, ShiftTime};
pub use user::{Role, User};
