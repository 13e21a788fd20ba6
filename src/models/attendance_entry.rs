//! Attendance log entry model.
//!
//! Each [`AttendanceEntry`] is one clock-in/out session. A session is open
//! while `clock_out_at` is `None`; whether a user is clocked in is always
//! derived from the log rather than stored separately.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Note appended when a session is closed because its shift window elapsed.
pub const AUTO_LOGOUT_NOTE: &str = "[Auto-logout: Shift ended]";

/// How a session came to be closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    /// The user clocked out.
    ClockOut,
    /// The window elapsed and the system closed the session.
    AutoLogout,
    /// An admin terminated the session.
    ForceLogout,
}

/// One clock-in/out session in the attendance log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceEntry {
    /// Unique identifier for the entry.
    pub id: String,
    /// The user the session belongs to.
    pub user_id: String,
    /// The shift the user was assigned when clocking in.
    pub shift_id: String,
    /// When the session was opened.
    pub clock_in_at: NaiveDateTime,
    /// When the session was closed; `None` while open.
    pub clock_out_at: Option<NaiveDateTime>,
    /// Till float declared at clock-in.
    pub opening_balance: Option<Decimal>,
    /// Till count declared at clock-out.
    pub closing_balance: Option<Decimal>,
    /// Free text from the user plus system annotations.
    pub notes: Option<String>,
    /// Minutes added to the shift end by admin extensions for this session.
    #[serde(default)]
    pub extension_minutes: u32,
    /// Why the session was closed.
    pub close_reason: Option<CloseReason>,
}

impl AttendanceEntry {
    /// Returns true while the session has not been closed.
    pub fn is_open(&self) -> bool {
        self.clock_out_at.is_none()
    }

    /// Appends a line to the notes, creating them if empty.
    pub fn append_note(&mut self, note: &str) {
        let note = note.trim();
        if note.is_empty() {
            return;
        }
        match &mut self.notes {
            Some(existing) if !existing.is_empty() => {
                existing.push(' ');
                existing.push_str(note);
            }
            _ => self.notes = Some(note.to_string()),
        }
    }
}

/// Everything needed to close an open session in one guarded write.
#[derive(Debug, Clone, PartialEq)]
pub struct CloseRequest {
    /// The clock-out timestamp.
    pub at: NaiveDateTime,
    /// Why the session is being closed.
    pub reason: CloseReason,
    /// Optional till count.
    pub closing_balance: Option<Decimal>,
    /// Optional note to append.
    pub note: Option<String>,
}

impl CloseRequest {
    /// A close triggered by the shift window elapsing.
    pub fn auto_logout(at: NaiveDateTime) -> Self {
        Self {
            at,
            reason: CloseReason::AutoLogout,
            closing_balance: None,
            note: Some(AUTO_LOGOUT_NOTE.to_string()),
        }
    }
}
