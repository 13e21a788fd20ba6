//! Storage for attendance sessions, override audit rows and shift configuration.
//!
//! The attendance log is the only shared mutable resource in the engine. Its
//! trait exposes conditional writes only: opening a session re-checks for an
//! existing open row, and closing a session is a no-op once it is closed.
//! Every invariant is scoped to a single user, so no cross-user locking is
//! needed beyond what a store does internally.

mod directory;
mod memory;

pub use directory::{ShiftDirectory, ShiftDraft};
pub use memory::{InMemoryAttendanceLog, InMemoryOverrideLog};

use crate::error::AttendanceResult;
use crate::models::{AttendanceEntry, CloseRequest, OverrideEntry};

/// Append-only journal of clock-in/out sessions.
pub trait AttendanceLogStore: Send + Sync {
    /// Returns the user's open session, if any.
    fn find_open(&self, user_id: &str) -> AttendanceResult<Option<AttendanceEntry>>;

    /// Returns every open session.
    fn list_open(&self) -> AttendanceResult<Vec<AttendanceEntry>>;

    /// Returns a user's sessions, newest first.
    fn history(&self, user_id: &str) -> AttendanceResult<Vec<AttendanceEntry>>;

    /// Inserts a new open session.
    ///
    /// Fails with `AlreadyClockedIn` if the user already has an open session
    /// at the moment of the write.
    fn insert_open(&self, entry: AttendanceEntry) -> AttendanceResult<AttendanceEntry>;

    /// Closes the session if it is still open.
    ///
    /// Returns `Ok(None)` without touching the row when it was already closed.
    fn close_if_open(
        &self,
        entry_id: &str,
        close: &CloseRequest,
    ) -> AttendanceResult<Option<AttendanceEntry>>;

    /// Adds `minutes` to an open session's extension.
    ///
    /// Returns `Ok(None)` when the session is no longer open.
    fn extend_open(&self, entry_id: &str, minutes: u32)
    -> AttendanceResult<Option<AttendanceEntry>>;
}

/// Append-only audit trail of admin overrides.
pub trait OverrideLogStore: Send + Sync {
    /// Records an override.
    fn append(&self, entry: OverrideEntry) -> AttendanceResult<()>;

    /// Lists overrides, newest first, optionally for a single user.
    fn list(&self, user_id: Option<&str>) -> AttendanceResult<Vec<OverrideEntry>>;
}
