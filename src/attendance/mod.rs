//! Shift attendance logic.
//!
//! This module contains the shift window evaluator, the clock-in/clock-out
//! state machine, the per-request access gate, the background auto-logout
//! scheduler and the admin override service. All of them share one
//! attendance log and read time through a [`Clock`].

mod access_gate;
mod clock;
mod overrides;
mod scheduler;
mod state_machine;
mod window;

pub use access_gate::{AccessGate, DEFAULT_WARNING_MINUTES, GatePass, ShiftWarning};
pub use clock::{Clock, FixedClock, SystemClock};
pub use overrides::{AdminOverrideService, MAX_EXTENSION_MINUTES, MIN_EXTENSION_MINUTES};
pub use scheduler::{AutoLogoutScheduler, DEFAULT_SWEEP_INTERVAL, SweepReport};
pub use state_machine::{AttendanceStateMachine, AttendanceStatus, ShiftSummary};
pub use window::{
    effective_end_time, is_session_within_window, is_within_window, is_within_window_extended,
    minutes_until_end, session_bounds,
};
