//! Admin overrides on live sessions.
//!
//! Overrides act on someone else's session outside the normal state machine:
//! extending a session's effective end, or terminating it. Each one writes an
//! audit row after the attendance log mutation it performs. The two writes are
//! not atomic: once the mutation has landed, a failed audit write is logged and
//! the mutated session is still returned.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{AttendanceError, AttendanceResult};
use crate::models::{
    AttendanceEntry, CloseReason, CloseRequest, OverrideAction, OverrideEntry, User,
};
use crate::store::{AttendanceLogStore, OverrideLogStore, ShiftDirectory};

use super::clock::Clock;
use super::state_machine::resolve_session_shift;
use super::window::effective_end_time;

/// Shortest accepted extension in minutes.
pub const MIN_EXTENSION_MINUTES: i64 = 1;
/// Longest accepted extension in minutes.
pub const MAX_EXTENSION_MINUTES: i64 = 480;

fn require_admin(actor: &User) -> AttendanceResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(AttendanceError::Forbidden {
            message: "admin role required".to_string(),
        })
    }
}

fn require_reason(reason: &str) -> AttendanceResult<&str> {
    let reason = reason.trim();
    if reason.is_empty() {
        Err(AttendanceError::ReasonRequired)
    } else {
        Ok(reason)
    }
}

/// Admin-only actions that change or end another user's session.
#[derive(Clone)]
pub struct AdminOverrideService {
    directory: Arc<ShiftDirectory>,
    log: Arc<dyn AttendanceLogStore>,
    overrides: Arc<dyn OverrideLogStore>,
    clock: Arc<dyn Clock>,
}

impl AdminOverrideService {
    /// Creates the service over the shared attendance log and its own audit trail.
    pub fn new(
        directory: Arc<ShiftDirectory>,
        log: Arc<dyn AttendanceLogStore>,
        overrides: Arc<dyn OverrideLogStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            log,
            overrides,
            clock,
        }
    }

    fn open_session(&self, user_id: &str) -> AttendanceResult<AttendanceEntry> {
        self.directory.user(user_id)?;
        self.log
            .find_open(user_id)?
            .ok_or_else(|| AttendanceError::NotClockedIn {
                user_id: user_id.to_string(),
            })
    }

    /// Writes an audit row for a mutation that has already been applied.
    fn record(&self, entry: OverrideEntry) {
        if let Err(e) = self.overrides.append(entry.clone()) {
            error!(
                user_id = %entry.user_id,
                action = ?entry.action,
                old_value = ?entry.old_value,
                new_value = ?entry.new_value,
                actor_id = %entry.actor_id,
                error = %e,
                "Failed to write override audit row; session change stands"
            );
        }
    }

    /// Pushes back the effective end of the user's open session.
    ///
    /// `duration_minutes` must be 1-480 and `reason` must not be blank. The
    /// extension accumulates across calls and is consulted by every window
    /// evaluation of the session.
    pub fn extend_shift(
        &self,
        actor: &User,
        user_id: &str,
        duration_minutes: i64,
        reason: &str,
    ) -> AttendanceResult<AttendanceEntry> {
        require_admin(actor)?;
        if !(MIN_EXTENSION_MINUTES..=MAX_EXTENSION_MINUTES).contains(&duration_minutes) {
            return Err(AttendanceError::InvalidDuration {
                minutes: duration_minutes,
            });
        }
        let reason = require_reason(reason)?;

        let entry = self.open_session(user_id)?;
        let shift = resolve_session_shift(&self.directory, &entry)?.ok_or_else(|| {
            AttendanceError::NoShiftAssigned {
                user_id: user_id.to_string(),
            }
        })?;

        let minutes = duration_minutes as u32;
        let extended = self
            .log
            .extend_open(&entry.id, minutes)?
            .ok_or_else(|| AttendanceError::NotClockedIn {
                user_id: user_id.to_string(),
            })?;

        let old_end = effective_end_time(&shift, extended.extension_minutes - minutes);
        let new_end = effective_end_time(&shift, extended.extension_minutes);
        self.record(OverrideEntry {
            id: Uuid::new_v4().to_string(),
            shift_id: shift.id.clone(),
            user_id: user_id.to_string(),
            action: OverrideAction::Extend,
            reason: reason.to_string(),
            old_value: Some(old_end.to_string()),
            new_value: Some(new_end.to_string()),
            notes: Some(format!("Extended by {} minutes", minutes)),
            actor_id: actor.id.clone(),
            created_at: self.clock.now(),
        });

        info!(
            actor_id = %actor.id,
            user_id,
            entry_id = %extended.id,
            minutes,
            new_end = %new_end,
            "Shift extended"
        );
        Ok(extended)
    }

    /// Closes the user's open session on an admin's authority.
    pub fn force_logout(
        &self,
        actor: &User,
        user_id: &str,
        reason: &str,
    ) -> AttendanceResult<AttendanceEntry> {
        require_admin(actor)?;
        let reason = require_reason(reason)?;
        let entry = self.open_session(user_id)?;

        let now = self.clock.now();
        let close = CloseRequest {
            at: now,
            reason: CloseReason::ForceLogout,
            closing_balance: None,
            note: Some(format!("[Force logout: {}]", reason)),
        };
        let closed = self
            .log
            .close_if_open(&entry.id, &close)?
            .ok_or_else(|| AttendanceError::NotClockedIn {
                user_id: user_id.to_string(),
            })?;

        self.record(OverrideEntry {
            id: Uuid::new_v4().to_string(),
            shift_id: closed.shift_id.clone(),
            user_id: user_id.to_string(),
            action: OverrideAction::ForceLogout,
            reason: reason.to_string(),
            old_value: Some(format_timestamp(closed.clock_in_at)),
            new_value: Some(format_timestamp(now)),
            notes: Some(format!("Session {} terminated", closed.id)),
            actor_id: actor.id.clone(),
            created_at: now,
        });

        info!(actor_id = %actor.id, user_id, entry_id = %closed.id, "Forced logout");
        Ok(closed)
    }

    /// Lists override audit rows, newest first.
    pub fn history(
        &self,
        actor: &User,
        user_id: Option<&str>,
    ) -> AttendanceResult<Vec<OverrideEntry>> {
        require_admin(actor)?;
        self.overrides.list(user_id)
    }
}

fn format_timestamp(at: NaiveDateTime) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}
