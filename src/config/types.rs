//! Configuration types for the attendance engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use serde::Deserialize;

use crate::attendance::{DEFAULT_SWEEP_INTERVAL, DEFAULT_WARNING_MINUTES};
use crate::models::{DayCode, Role, ShiftTime, User};
use crate::store::ShiftDraft;

/// Engine tunables from `settings.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AttendanceSettings {
    /// Seconds between auto-logout sweeps.
    #[serde(default = "default_sweep_secs")]
    pub auto_logout_interval_secs: u64,
    /// Minutes before the shift end at which the gate starts warning.
    #[serde(default = "default_warning_minutes")]
    pub warning_window_minutes: u32,
}

fn default_sweep_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL.as_secs()
}

fn default_warning_minutes() -> u32 {
    DEFAULT_WARNING_MINUTES
}

impl Default for AttendanceSettings {
    fn default() -> Self {
        Self {
            auto_logout_interval_secs: default_sweep_secs(),
            warning_window_minutes: default_warning_minutes(),
        }
    }
}

impl AttendanceSettings {
    /// Returns the sweep interval, never shorter than one second.
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.auto_logout_interval_secs.max(1))
    }
}

/// A staff member as listed in `users.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSeed {
    /// Unique identifier.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Optional display name.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Role in the point-of-sale system.
    pub role: Role,
}

impl From<UserSeed> for User {
    fn from(seed: UserSeed) -> Self {
        User {
            id: seed.id,
            username: seed.username,
            display_name: seed.display_name,
            role: seed.role,
        }
    }
}

/// Users configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct UsersConfig {
    /// Known staff.
    pub users: Vec<UserSeed>,
}

/// A shift definition as listed in `shifts.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftSeed {
    /// Stable identifier referenced by assignments.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Nominal start, `HH:MM`.
    pub start_time: ShiftTime,
    /// Nominal end, `HH:MM`.
    pub end_time: ShiftTime,
    /// Grace minutes.
    #[serde(default)]
    pub grace_period_minutes: u32,
    /// Optional day restriction.
    #[serde(default)]
    pub days_of_week: Option<BTreeSet<DayCode>>,
    /// Whether the shift is in use.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ShiftSeed {
    /// The editable part of the seed, for validation.
    pub fn draft(&self) -> ShiftDraft {
        ShiftDraft {
            name: self.name.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            grace_period_minutes: self.grace_period_minutes,
            days_of_week: self.days_of_week.clone(),
            is_active: self.is_active,
        }
    }
}

/// Shifts configuration file structure.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftsConfig {
    /// Shift definitions.
    pub shifts: Vec<ShiftSeed>,
    /// Map of user id to shift id.
    #[serde(default)]
    pub assignments: BTreeMap<String, String>,
}
