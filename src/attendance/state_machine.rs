//! The clock-in/clock-out state machine.
//!
//! A user is `IN` while they have an open row in the attendance log and `OUT`
//! otherwise; there is no separately stored flag. This machine is the only
//! writer of new open rows. Everything else that ends a session goes through
//! [`AttendanceLogStore::close_if_open`].

use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AttendanceError, AttendanceResult};
use crate::models::{AttendanceEntry, CloseReason, CloseRequest, ShiftDefinition, User};
use crate::store::{AttendanceLogStore, ShiftDirectory};

use super::clock::Clock;
use super::window::{is_session_within_window, is_within_window, session_bounds};

/// Name and nominal bounds of a shift, as shown to staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftSummary {
    /// Shift name.
    pub name: String,
    /// Nominal start, `HH:MM`.
    pub start_time: String,
    /// Nominal end, `HH:MM`.
    pub end_time: String,
}

impl From<&ShiftDefinition> for ShiftSummary {
    fn from(shift: &ShiftDefinition) -> Self {
        Self {
            name: shift.name.clone(),
            start_time: shift.start_time.to_string(),
            end_time: shift.end_time.to_string(),
        }
    }
}

/// A user's attendance state, projected from the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceStatus {
    /// Whether the user has a shift assigned.
    pub has_shift: bool,
    /// The assigned shift.
    pub shift: Option<ShiftSummary>,
    /// Whether the user has an open session.
    pub is_clocked_in: bool,
    /// Whether now falls in the shift window, counting any session extension.
    pub is_within_shift_time: bool,
    /// When the open session started.
    pub clock_in_time: Option<NaiveDateTime>,
}

/// Finds the shift a session is evaluated against.
///
/// Sessions remember the shift they were opened under; if that definition has
/// since disappeared, the user's current assignment is used instead.
pub(crate) fn resolve_session_shift(
    directory: &ShiftDirectory,
    entry: &AttendanceEntry,
) -> AttendanceResult<Option<ShiftDefinition>> {
    match directory.shift(&entry.shift_id) {
        Ok(shift) => Ok(Some(shift)),
        Err(AttendanceError::ShiftNotFound { .. }) => directory.assigned_shift(&entry.user_id),
        Err(e) => Err(e),
    }
}

/// Enforces clock-in and clock-out preconditions and writes the log.
#[derive(Clone)]
pub struct AttendanceStateMachine {
    directory: Arc<ShiftDirectory>,
    log: Arc<dyn AttendanceLogStore>,
    clock: Arc<dyn Clock>,
}

impl AttendanceStateMachine {
    /// Creates a state machine over the given directory, log and clock.
    pub fn new(
        directory: Arc<ShiftDirectory>,
        log: Arc<dyn AttendanceLogStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            directory,
            log,
            clock,
        }
    }

    /// Opens a session for the user.
    ///
    /// Fails with `NoShiftAssigned`, `AlreadyClockedIn` or
    /// `OutsideShiftWindow`, checked in that order. A concurrent clock-in that
    /// wins the race makes this one fail with `AlreadyClockedIn`.
    pub fn clock_in(
        &self,
        user_id: &str,
        opening_balance: Option<Decimal>,
        notes: Option<String>,
    ) -> AttendanceResult<AttendanceEntry> {
        let shift = self
            .directory
            .assigned_shift(user_id)?
            .ok_or_else(|| AttendanceError::NoShiftAssigned {
                user_id: user_id.to_string(),
            })?;

        if self.log.find_open(user_id)?.is_some() {
            return Err(AttendanceError::AlreadyClockedIn {
                user_id: user_id.to_string(),
            });
        }

        let now = self.clock.now();
        if !is_within_window(now, &shift) {
            info!(user_id, shift_id = %shift.id, %now, "Clock-in outside shift window");
            return Err(AttendanceError::OutsideShiftWindow {
                shift_name: shift.name.clone(),
                start_time: shift.start_time.to_string(),
                end_time: shift.end_time.to_string(),
            });
        }

        let entry = AttendanceEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            shift_id: shift.id.clone(),
            clock_in_at: now,
            clock_out_at: None,
            opening_balance,
            closing_balance: None,
            notes: notes.filter(|n| !n.trim().is_empty()),
            extension_minutes: 0,
            close_reason: None,
        };
        let entry = self.log.insert_open(entry)?;
        info!(user_id, entry_id = %entry.id, shift_id = %shift.id, "Clocked in");
        Ok(entry)
    }

    /// Closes the user's open session.
    ///
    /// Staff subject to attendance tracking cannot leave before the nominal
    /// end of the shift occurrence they clocked in to; grace and extensions
    /// do not move that boundary. Admins may clock out at any time.
    pub fn clock_out(
        &self,
        user: &User,
        closing_balance: Option<Decimal>,
        notes: Option<String>,
    ) -> AttendanceResult<AttendanceEntry> {
        let entry = self
            .log
            .find_open(&user.id)?
            .ok_or_else(|| AttendanceError::NotClockedIn {
                user_id: user.id.clone(),
            })?;

        let now = self.clock.now();
        if user.requires_attendance_tracking() {
            if let Some(shift) = resolve_session_shift(&self.directory, &entry)? {
                let (_, nominal_end) = session_bounds(entry.clock_in_at, &shift);
                if now < nominal_end {
                    info!(user_id = %user.id, %now, %nominal_end, "Early clock-out refused");
                    return Err(AttendanceError::EarlyClockOutRestricted {
                        end_time: shift.end_time.to_string(),
                    });
                }
            }
        }

        let close = CloseRequest {
            at: now,
            reason: CloseReason::ClockOut,
            closing_balance,
            note: notes,
        };
        match self.log.close_if_open(&entry.id, &close)? {
            Some(closed) => {
                info!(user_id = %user.id, entry_id = %closed.id, "Clocked out");
                Ok(closed)
            }
            None => {
                warn!(user_id = %user.id, entry_id = %entry.id, "Session closed concurrently");
                Err(AttendanceError::NotClockedIn {
                    user_id: user.id.clone(),
                })
            }
        }
    }

    /// Projects the user's current attendance state.
    pub fn status(&self, user_id: &str) -> AttendanceResult<AttendanceStatus> {
        let shift = self.directory.assigned_shift(user_id)?;
        let open = self.log.find_open(user_id)?;
        let now = self.clock.now();

        let is_within_shift_time = match (&shift, &open) {
            (_, Some(entry)) => match resolve_session_shift(&self.directory, entry)? {
                Some(session_shift) => {
                    is_session_within_window(
                        now,
                        entry.clock_in_at,
                        &session_shift,
                        entry.extension_minutes,
                    )
                }
                None => false,
            },
            (Some(shift), None) => is_within_window(now, shift),
            (None, None) => false,
        };

        Ok(AttendanceStatus {
            has_shift: shift.is_some(),
            shift: shift.as_ref().map(ShiftSummary::from),
            is_clocked_in: open.is_some(),
            is_within_shift_time,
            clock_in_time: open.map(|e| e.clock_in_at),
        })
    }

    /// Lists every open session.
    pub fn open_sessions(&self) -> AttendanceResult<Vec<AttendanceEntry>> {
        self.log.list_open()
    }

    /// Lists a user's sessions, newest first.
    pub fn history(&self, user_id: &str) -> AttendanceResult<Vec<AttendanceEntry>> {
        self.log.history(user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::test_support::{Fixture, at};
    use std::str::FromStr;

    #[test]
    fn test_scenario_a_grace_before_start() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 08:49"));
        assert!(matches!(
            fx.machine().clock_in("cashier", None, None),
            Err(AttendanceError::OutsideShiftWindow { .. })
        ));

        fx.clock.set(at("2026-01-15 08:50"));
        let entry = fx.machine().clock_in("cashier", None, None).unwrap();
        assert_eq!(entry.clock_in_at, at("2026-01-15 08:50"));
        assert!(entry.is_open());
    }

    #[test]
    fn test_scenario_b_overnight() {
        let fx = Fixture::with_shift("22:00", "06:00", 0);
        fx.clock.set(at("2026-01-15 12:00"));
        assert!(matches!(
            fx.machine().clock_in("cashier", None, None),
            Err(AttendanceError::OutsideShiftWindow { .. })
        ));

        fx.clock.set(at("2026-01-15 23:30"));
        assert!(fx.machine().clock_in("cashier", None, None).is_ok());
    }

    #[test]
    fn test_clock_in_requires_assignment() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        assert_eq!(
            fx.machine().clock_in("waiter_unassigned", None, None).unwrap_err(),
            AttendanceError::NoShiftAssigned {
                user_id: "waiter_unassigned".to_string()
            }
        );
    }

    #[test]
    fn test_double_clock_in_rejected() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();
        assert!(matches!(
            fx.machine().clock_in("cashier", None, None),
            Err(AttendanceError::AlreadyClockedIn { .. })
        ));
        assert_eq!(fx.log.list_open().unwrap().len(), 1);
    }

    #[test]
    fn test_scenario_c_early_clock_out() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();

        fx.clock.set(at("2026-01-15 16:50"));
        assert_eq!(
            fx.machine().clock_out(&fx.cashier(), None, None).unwrap_err(),
            AttendanceError::EarlyClockOutRestricted {
                end_time: "17:00".to_string()
            }
        );

        fx.clock.set(at("2026-01-15 17:05"));
        let closed = fx.machine().clock_out(&fx.cashier(), None, None).unwrap();
        assert_eq!(closed.clock_out_at, Some(at("2026-01-15 17:05")));
        assert_eq!(closed.close_reason, Some(CloseReason::ClockOut));
    }

    #[test]
    fn test_admin_bypasses_early_clock_out() {
        let fx = Fixture::day_shift(10);
        fx.directory.assign("admin", "shift_day").unwrap();
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("admin", None, None).unwrap();

        fx.clock.set(at("2026-01-15 11:00"));
        assert!(fx.machine().clock_out(&fx.admin(), None, None).is_ok());
    }

    #[test]
    fn test_overnight_early_clock_out_uses_next_morning() {
        let fx = Fixture::with_shift("22:00", "06:00", 0);
        fx.clock.set(at("2026-01-15 22:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();

        fx.clock.set(at("2026-01-15 23:30"));
        assert!(matches!(
            fx.machine().clock_out(&fx.cashier(), None, None),
            Err(AttendanceError::EarlyClockOutRestricted { .. })
        ));

        fx.clock.set(at("2026-01-16 06:00"));
        assert!(fx.machine().clock_out(&fx.cashier(), None, None).is_ok());
    }

    #[test]
    fn test_clock_out_without_session() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 17:00"));
        assert!(matches!(
            fx.machine().clock_out(&fx.cashier(), None, None),
            Err(AttendanceError::NotClockedIn { .. })
        ));
    }

    #[test]
    fn test_round_trip_records_balances_and_notes() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 08:55"));
        fx.machine()
            .clock_in(
                "cashier",
                Some(Decimal::from_str("150.00").unwrap()),
                Some("float counted".to_string()),
            )
            .unwrap();

        fx.clock.set(at("2026-01-15 17:02"));
        fx.machine()
            .clock_out(
                &fx.cashier(),
                Some(Decimal::from_str("1320.50").unwrap()),
                Some("drawer balanced".to_string()),
            )
            .unwrap();

        let history = fx.machine().history("cashier").unwrap();
        assert_eq!(history.len(), 1);
        let row = &history[0];
        assert!(row.clock_out_at.unwrap() > row.clock_in_at);
        assert_eq!(row.opening_balance, Some(Decimal::from_str("150.00").unwrap()));
        assert_eq!(row.closing_balance, Some(Decimal::from_str("1320.50").unwrap()));
        assert_eq!(row.notes.as_deref(), Some("float counted drawer balanced"));
    }

    #[test]
    fn test_status_projection() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 12:00"));

        let status = fx.machine().status("cashier").unwrap();
        assert!(status.has_shift);
        assert!(!status.is_clocked_in);
        assert!(status.is_within_shift_time);
        assert_eq!(status.shift.unwrap().end_time, "17:00");

        fx.machine().clock_in("cashier", None, None).unwrap();
        let status = fx.machine().status("cashier").unwrap();
        assert!(status.is_clocked_in);
        assert_eq!(status.clock_in_time, Some(at("2026-01-15 12:00")));

        let unassigned = fx.machine().status("waiter_unassigned").unwrap();
        assert!(!unassigned.has_shift);
        assert!(!unassigned.is_within_shift_time);
    }

    #[test]
    fn test_concurrent_clock_ins_leave_one_open_row() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        let machine = fx.machine();

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let machine = machine.clone();
                std::thread::spawn(move || machine.clock_in("cashier", None, None))
            })
            .collect();
        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 1);
        assert_eq!(fx.log.list_open().unwrap().len(), 1);
    }
}
