//! Time sources.
//!
//! Attendance decisions depend on the restaurant's local wall-clock time. The
//! [`Clock`] trait lets the server read the system clock while tests pin time
//! to a known instant.

use std::sync::{Arc, RwLock};

use chrono::{Duration, Local, NaiveDateTime};

/// A source of the current local time.
pub trait Clock: Send + Sync {
    /// Returns the current local date and time.
    fn now(&self) -> NaiveDateTime;
}

/// Reads the host's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A clock that returns a settable instant. Clones share the same instant.
///
/// # Examples
///
/// ```
/// use shift_attendance::attendance::{Clock, FixedClock};
/// use chrono::{Duration, NaiveDateTime};
///
/// let start = NaiveDateTime::parse_from_str("2026-01-15 09:00", "%Y-%m-%d %H:%M").unwrap();
/// let clock = FixedClock::new(start);
/// clock.advance(Duration::minutes(5));
/// assert_eq!(clock.now(), start + Duration::minutes(5));
/// ```
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: Arc<RwLock<NaiveDateTime>>,
}

impl FixedClock {
    /// Creates a clock pinned to `now`.
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(RwLock::new(now)),
        }
    }

    /// Moves the clock to `now`.
    pub fn set(&self, now: NaiveDateTime) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard = now;
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut guard = self.now.write().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.read().unwrap_or_else(|e| e.into_inner())
    }
}
