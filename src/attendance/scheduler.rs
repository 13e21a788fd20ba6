//! Periodic auto-logout sweep.
//!
//! Spawns a background task that closes open sessions whose shift window has
//! elapsed. Runs on a fixed interval using `tokio::time::interval`, alongside
//! the inline check done by the access gate. Both paths close through the
//! same guarded primitive, so whichever gets there second is a no-op.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::AttendanceResult;
use crate::models::CloseRequest;
use crate::store::{AttendanceLogStore, ShiftDirectory};

use super::clock::Clock;
use super::state_machine::resolve_session_shift;
use super::window::is_session_within_window;

/// Default time between sweeps.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// What a single sweep did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SweepReport {
    /// Open sessions examined.
    pub scanned: usize,
    /// Sessions closed by this sweep.
    pub closed: usize,
    /// Sessions left open because no shift could be resolved.
    pub skipped: usize,
    /// Sessions that could not be processed because of an error.
    pub failed: usize,
}

/// Closes stale sessions on a timer, independent of request traffic.
#[derive(Clone)]
pub struct AutoLogoutScheduler {
    directory: Arc<ShiftDirectory>,
    log: Arc<dyn AttendanceLogStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl AutoLogoutScheduler {
    /// Creates a scheduler that sweeps every `interval`.
    pub fn new(
        directory: Arc<ShiftDirectory>,
        log: Arc<dyn AttendanceLogStore>,
        clock: Arc<dyn Clock>,
        interval: Duration,
    ) -> Self {
        Self {
            directory,
            log,
            clock,
            interval,
        }
    }

    /// Runs one sweep over every open session.
    ///
    /// A failure on one session is logged and counted; the rest of the sweep
    /// carries on. Only failing to list open sessions aborts the sweep.
    pub fn run_once(&self) -> AttendanceResult<SweepReport> {
        let open = self.log.list_open()?;
        let now = self.clock.now();
        let mut report = SweepReport {
            scanned: open.len(),
            ..SweepReport::default()
        };

        for entry in open {
            let shift = match resolve_session_shift(&self.directory, &entry) {
                Ok(Some(shift)) => shift,
                Ok(None) => {
                    warn!(entry_id = %entry.id, user_id = %entry.user_id, "No shift for open session");
                    report.skipped += 1;
                    continue;
                }
                Err(e) => {
                    error!(entry_id = %entry.id, error = %e, "Failed to load shift for session");
                    report.failed += 1;
                    continue;
                }
            };

            if is_session_within_window(now, entry.clock_in_at, &shift, entry.extension_minutes) {
                continue;
            }

            match self
                .log
                .close_if_open(&entry.id, &CloseRequest::auto_logout(now))
            {
                Ok(Some(_)) => {
                    info!(
                        entry_id = %entry.id,
                        user_id = %entry.user_id,
                        shift_id = %shift.id,
                        "Auto-logout: shift window elapsed"
                    );
                    report.closed += 1;
                }
                Ok(None) => debug!(entry_id = %entry.id, "Session already closed"),
                Err(e) => {
                    error!(entry_id = %entry.id, error = %e, "Auto-logout failed");
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }

    /// Starts the sweep loop on the tokio runtime.
    ///
    /// Each sweep runs on the blocking pool; an error or panic inside a sweep
    /// is logged and the loop waits for the next tick. Runs until `cancel` is
    /// triggered.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            info!(interval_secs = self.interval.as_secs(), "Auto-logout scheduler started");

            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Auto-logout scheduler stopping");
                        break;
                    }
                    _ = interval.tick() => {
                        let sweeper = self.clone();
                        match tokio::task::spawn_blocking(move || sweeper.run_once()).await {
                            Ok(Ok(report)) => {
                                if report.closed > 0 || report.failed > 0 {
                                    info!(
                                        scanned = report.scanned,
                                        closed = report.closed,
                                        skipped = report.skipped,
                                        failed = report.failed,
                                        "Auto-logout sweep finished"
                                    );
                                } else {
                                    debug!(scanned = report.scanned, "Auto-logout sweep: nothing to close");
                                }
                            }
                            Ok(Err(e)) => {
                                error!(error = %e, "Auto-logout sweep failed");
                            }
                            Err(e) => {
                                error!(error = %e, "Auto-logout sweep panicked");
                            }
                        }
                    }
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attendance::test_support::{FailingLog, Fixture, at};
    use crate::models::{AUTO_LOGOUT_NOTE, CloseReason};
    use crate::store::AttendanceLogStore;

    #[test]
    fn test_scenario_d_sweep_closes_elapsed_session() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();

        fx.clock.set(at("2026-01-15 17:10"));
        let report = fx.scheduler().run_once().unwrap();
        assert_eq!(report.closed, 0);
        assert_eq!(report.scanned, 1);

        fx.clock.set(at("2026-01-15 17:11"));
        let report = fx.scheduler().run_once().unwrap();
        assert_eq!(report.closed, 1);

        let row = &fx.log.history("cashier").unwrap()[0];
        assert_eq!(row.clock_out_at, Some(at("2026-01-15 17:11")));
        assert_eq!(row.notes.as_deref(), Some(AUTO_LOGOUT_NOTE));
    }

    #[test]
    fn test_sweep_after_inline_close_is_noop() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        let entry = fx.machine().clock_in("cashier", None, None).unwrap();

        fx.clock.set(at("2026-01-15 17:20"));
        assert!(fx.gate().check(&fx.cashier()).is_err());

        // A sweep that listed the session before the gate closed it.
        let stale = CloseRequest::auto_logout(at("2026-01-15 17:21"));
        assert!(fx.log.close_if_open(&entry.id, &stale).unwrap().is_none());
        assert_eq!(fx.scheduler().run_once().unwrap().scanned, 0);

        let row = &fx.log.history("cashier").unwrap()[0];
        assert_eq!(row.clock_out_at, Some(at("2026-01-15 17:20")));
        assert_eq!(row.notes.as_deref(), Some(AUTO_LOGOUT_NOTE));
    }

    #[test]
    fn test_sweep_respects_extension() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        let entry = fx.machine().clock_in("cashier", None, None).unwrap();
        fx.log.extend_open(&entry.id, 30).unwrap();

        fx.clock.set(at("2026-01-15 17:30"));
        assert_eq!(fx.scheduler().run_once().unwrap().closed, 0);

        fx.clock.set(at("2026-01-15 17:41"));
        assert_eq!(fx.scheduler().run_once().unwrap().closed, 1);
    }

    #[test]
    fn test_sweep_closes_session_after_day_long_extensions() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();

        fx.clock.set(at("2026-01-15 16:00"));
        for _ in 0..2 {
            fx.overrides()
                .extend_shift(&fx.admin(), "cashier", 480, "stocktake")
                .unwrap();
        }

        fx.clock.set(at("2026-01-18 12:00"));
        let report = fx.scheduler().run_once().unwrap();
        assert_eq!(report.closed, 1);

        let row = &fx.log.history("cashier").unwrap()[0];
        assert_eq!(row.clock_out_at, Some(at("2026-01-18 12:00")));
        assert_eq!(row.close_reason, Some(CloseReason::AutoLogout));
        assert!(fx.log.find_open("cashier").unwrap().is_none());
    }

    #[test]
    fn test_sweep_only_closes_expired_sessions() {
        let fx = Fixture::day_shift(10);
        fx.add_shift("shift_night", "Night", "22:00", "06:00", 0);
        fx.add_cashier("night_cashier", "shift_night");

        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();
        fx.clock.set(at("2026-01-15 22:00"));
        // The day cashier's session is stale by now but nobody has swept yet.
        fx.machine().clock_in("night_cashier", None, None).unwrap();

        let report = fx.scheduler().run_once().unwrap();
        assert_eq!(report.scanned, 2);
        assert_eq!(report.closed, 1);
        assert!(fx.log.find_open("night_cashier").unwrap().is_some());
        assert!(fx.log.find_open("cashier").unwrap().is_none());
    }

    #[test]
    fn test_sweep_surfaces_listing_failure() {
        let fx = Fixture::day_shift(10);
        let scheduler = AutoLogoutScheduler::new(
            fx.directory.clone(),
            Arc::new(FailingLog),
            Arc::new(fx.clock.clone()),
            DEFAULT_SWEEP_INTERVAL,
        );
        assert!(scheduler.run_once().is_err());
    }

    #[tokio::test]
    async fn test_spawned_loop_survives_failing_cycles_and_stops_on_cancel() {
        let fx = Fixture::day_shift(10);
        let scheduler = AutoLogoutScheduler::new(
            fx.directory.clone(),
            Arc::new(FailingLog),
            Arc::new(fx.clock.clone()),
            Duration::from_millis(10),
        );

        let cancel = CancellationToken::new();
        let handle = scheduler.spawn(cancel.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());

        cancel.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_spawned_loop_closes_sessions() {
        let fx = Fixture::day_shift(10);
        fx.clock.set(at("2026-01-15 09:00"));
        fx.machine().clock_in("cashier", None, None).unwrap();
        fx.clock.set(at("2026-01-15 18:00"));

        let cancel = CancellationToken::new();
        let handle = fx.scheduler().spawn(cancel.clone());
        for _ in 0..250 {
            if fx.log.find_open("cashier").unwrap().is_none() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(fx.log.find_open("cashier").unwrap().is_none());

        cancel.cancel();
        handle.await.unwrap();
    }
}
