//! Per-request attendance check for cashier-restricted actions.
//!
//! The gate is evaluated before any action that requires the caller to be on
//! shift. If it finds a session whose window has elapsed it closes that
//! session itself, so no request ever proceeds on a stale session even when
//! the background sweep has not run yet.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{AttendanceError, AttendanceResult};
use crate::models::{CloseRequest, User};
use crate::store::{AttendanceLogStore, ShiftDirectory};

use super::clock::Clock;
use super::state_machine::resolve_session_shift;
use super::window::{is_session_within_window, minutes_until_end};

/// Default size of the pre-end warning window in minutes.
pub const DEFAULT_WARNING_MINUTES: u32 = 10;

/// A non-blocking notice that the caller's shift is about to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftWarning {
    /// Whole minutes left before the session's effective end.
    pub minutes_remaining: i64,
}

/// The outcome of a successful gate check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GatePass {
    /// Set when the caller is inside the pre-end warning window.
    pub warning: Option<ShiftWarning>,
}

/// Decides whether a user may perform a cashier-restricted action right now.
#[derive(Clone)]
pub struct AccessGate {
    directory: Arc<ShiftDirectory>,
    log: Arc<dyn AttendanceLogStore>,
    clock: Arc<dyn Clock>,
    warning_minutes: i64,
}

impl AccessGate {
    /// Creates a gate that warns within `warning_minutes` of the shift end.
    pub fn new(
        directory: Arc<ShiftDirectory>,
        log: Arc<dyn AttendanceLogStore>,
        clock: Arc<dyn Clock>,
        warning_minutes: u32,
    ) -> Self {
        Self {
            directory,
            log,
            clock,
            warning_minutes: i64::from(warning_minutes),
        }
    }

    /// Checks the user against their shift and session.
    ///
    /// Admins pass before any lookup. Everyone else needs an assignment and
    /// an open session whose window (including extensions) still contains
    /// now; otherwise the session is closed inline and the request fails with
    /// `ShiftEnded`. Storage failures propagate without closing anything.
    pub fn check(&self, user: &User) -> AttendanceResult<GatePass> {
        if !user.requires_attendance_tracking() {
            return Ok(GatePass::default());
        }

        if self.directory.assigned_shift(&user.id)?.is_none() {
            return Err(AttendanceError::NoShiftAssigned {
                user_id: user.id.clone(),
            });
        }

        let entry = self
            .log
            .find_open(&user.id)?
            .ok_or_else(|| AttendanceError::NotClockedIn {
                user_id: user.id.clone(),
            })?;

        let shift = resolve_session_shift(&self.directory, &entry)?.ok_or_else(|| {
            AttendanceError::NoShiftAssigned {
                user_id: user.id.clone(),
            }
        })?;

        let now = self.clock.now();
        if !is_session_within_window(now, entry.clock_in_at, &shift, entry.extension_minutes) {
            match self
                .log
                .close_if_open(&entry.id, &CloseRequest::auto_logout(now))?
            {
                Some(_) => info!(
                    user_id = %user.id,
                    entry_id = %entry.id,
                    %now,
                    "Inline auto-logout: shift window elapsed"
                ),
                None => debug!(entry_id = %entry.id, "Session already closed by another path"),
            }
            return Err(AttendanceError::ShiftEnded {
                user_id: user.id.clone(),
            });
        }

        let remaining = minutes_until_end(now, entry.clock_in_at, &shift, entry.extension_minutes);
        let warning = (remaining > 0 && remaining <= self.warning_minutes).then(|| {
            warn!(user_id = %user.id, minutes_remaining = remaining, "Shift ending soon");
            ShiftWarning {
                minutes_remaining: remaining,
            }
        });

        Ok(GatePass { warning })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::test_support::{FailingLog, Fixture, at};
    use crate::models::{AUTO_LOGOUT_NOTE, CloseReason};

    #[test]
    fn test_admin_without_shift_passes() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 03:00"));
        assert_eq!(fx.gate().check(&fx.admin()).unwrap(), GatePass::default());
    }

    #[test]
    fn test_unassigned_user_rejected() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 12:00"));
        assert!(matches!(
            fx.gate().check(&fx.unassigned()),
            Err(AttendanceError::NoShiftAssigned { .. })
        ));
    }

    #[test]
    fn test_not_clocked_in_rejected() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 12:00"));
        assert!(matches!(
            fx.gate().check(&fx.cashier()),
            Err(AttendanceError::NotClockedIn { .. })
        ));
    }

    #[test]
    fn test_passes_inside_window_without_warning() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();

        fx.clock.set(at("2026-01-15 12:00"));
        assert_eq!(fx.gate().check(&fx.cashier()).unwrap().warning, None);
    }

    #[test]
    fn test_warns_near_shift_end() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();

        fx.clock.set(at("2026-01-15 16:52"));
        assert_eq!(
            fx.gate().check(&fx.cashier()).unwrap().warning,
            Some(ShiftWarning {
                minutes_remaining: 8
            })
        );

        fx.clock.set(at("2026-01-15 16:49"));
        assert_eq!(fx.gate().check(&fx.cashier()).unwrap().warning, None);

        // In the trailing grace period the request still passes, without a warning.
        fx.clock.set(at("2026-01-15 17:05"));
        assert_eq!(fx.gate().check(&fx.cashier()).unwrap().warning, None);
    }

    #[test]
    fn test_warns_in_final_partial_minute() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();

        fx.clock.set(at("2026-01-15 16:59") + chrono::Duration::seconds(30));
        assert_eq!(
            fx.gate().check(&fx.cashier()).unwrap().warning,
            Some(ShiftWarning {
                minutes_remaining: 1
            })
        );
    }

    #[test]
    fn test_day_long_extensions_do_not_keep_session_open() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        let entry = fx.machine().clock_in("cashier", None, None).unwrap();
        fx.log.extend_open(&entry.id, 960).unwrap();

        fx.clock.set(at("2026-01-18 12:00"));
        assert_eq!(
            fx.gate().check(&fx.cashier()).unwrap_err(),
            AttendanceError::ShiftEnded {
                user_id: "cashier".to_string()
            }
        );
        assert_eq!(
            fx.log.history("cashier").unwrap()[0].close_reason,
            Some(CloseReason::AutoLogout)
        );
    }

    #[test]
    fn test_elapsed_window_closes_session_inline() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();

        fx.clock.set(at("2026-01-15 17:11"));
        assert_eq!(
            fx.gate().check(&fx.cashier()).unwrap_err(),
            AttendanceError::ShiftEnded {
                user_id: "cashier".to_string()
            }
        );

        let history = fx.log.history("cashier").unwrap();
        assert_eq!(history[0].clock_out_at, Some(at("2026-01-15 17:11")));
        assert_eq!(history[0].notes.as_deref(), Some(AUTO_LOGOUT_NOTE));
        assert_eq!(history[0].close_reason, Some(CloseReason::AutoLogout));

        // The follow-up request sees no session at all.
        assert!(matches!(
            fx.gate().check(&fx.cashier()),
            Err(AttendanceError::NotClockedIn { .. })
        ));
    }

    #[test]
    fn test_storage_failure_does_not_close_session() {
        let fx = Fixture::day_shift(10);
        let gate = AccessGate::new(
            fx.directory.clone(),
            Arc::new(FailingLog),
            Arc::new(fx.clock.clone()),
            DEFAULT_WARNING_MINUTES,
        );
        fx.clock.set(at("2026-01-15 23:00"));
        assert!(matches!(
            gate.check(&fx.cashier()),
            Err(AttendanceError::StorageUnavailable { .. })
        ));
    }
}
