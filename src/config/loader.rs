//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the staff
//! roster, shift definitions and engine settings from YAML files.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::{AttendanceError, AttendanceResult};
use crate::models::ShiftDefinition;
use crate::store::ShiftDirectory;

use super::types::{AttendanceSettings, ShiftsConfig, UsersConfig};

const SETTINGS_FILE: &str = "settings.yaml";
const USERS_FILE: &str = "users.yaml";
const SHIFTS_FILE: &str = "shifts.yaml";

/// Loads and provides access to the attendance configuration.
///
/// The `ConfigLoader` reads YAML configuration files from a directory and
/// seeds a [`ShiftDirectory`] from them.
///
/// # Directory Structure
///
/// ```text
/// config/restaurant/
/// ├── settings.yaml   # Sweep interval and warning window
/// ├── users.yaml      # Staff roster with roles
/// └── shifts.yaml     # Shift definitions and user assignments
/// ```
///
/// # Example
///
/// ```no_run
/// use shift_attendance::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/restaurant").unwrap();
/// println!("Sweep every {:?}", loader.settings().sweep_interval());
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    settings: AttendanceSettings,
    users: UsersConfig,
    shifts: ShiftsConfig,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` instance on success, or an error if:
    /// - Any required file is missing
    /// - Any file contains invalid YAML
    /// - Any required field is missing from the configuration
    pub fn load<P: AsRef<Path>>(path: P) -> AttendanceResult<Self> {
        let path = path.as_ref();

        let settings = Self::load_yaml::<AttendanceSettings>(&path.join(SETTINGS_FILE))?;
        let users = Self::load_yaml::<UsersConfig>(&path.join(USERS_FILE))?;
        let shifts = Self::load_yaml::<ShiftsConfig>(&path.join(SHIFTS_FILE))?;

        Ok(Self {
            settings,
            users,
            shifts,
        })
    }

    /// Builds a loader from in-memory YAML documents.
    pub fn from_yaml(settings: &str, users: &str, shifts: &str) -> AttendanceResult<Self> {
        Ok(Self {
            settings: Self::parse_yaml(SETTINGS_FILE, settings)?,
            users: Self::parse_yaml(USERS_FILE, users)?,
            shifts: Self::parse_yaml(SHIFTS_FILE, shifts)?,
        })
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> AttendanceResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| AttendanceError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        Self::parse_yaml(&path_str, &content)
    }

    fn parse_yaml<T: serde::de::DeserializeOwned>(path: &str, content: &str) -> AttendanceResult<T> {
        serde_yaml::from_str(content).map_err(|e| AttendanceError::ConfigParseError {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Returns the engine settings.
    pub fn settings(&self) -> &AttendanceSettings {
        &self.settings
    }

    /// Seeds a directory with the configured users, shifts and assignments.
    ///
    /// Every shift is validated with the same rules as the admin API, and
    /// every assignment must reference a configured user and shift.
    pub fn build_directory(&self, now: NaiveDateTime) -> AttendanceResult<ShiftDirectory> {
        let invalid = |e: AttendanceError| AttendanceError::ConfigParseError {
            path: SHIFTS_FILE.to_string(),
            message: e.to_string(),
        };

        let directory = ShiftDirectory::new();
        for user in &self.users.users {
            directory.upsert_user(user.clone().into())?;
        }

        for seed in &self.shifts.shifts {
            seed.draft().validate().map_err(invalid)?;
            let shift = ShiftDefinition {
                id: seed.id.clone(),
                name: seed.name.trim().to_string(),
                start_time: seed.start_time,
                end_time: seed.end_time,
                grace_period_minutes: seed.grace_period_minutes,
                days_of_week: seed.days_of_week.clone(),
                is_active: seed.is_active,
                created_at: now,
                updated_at: now,
            };
            directory.insert_shift(shift).map_err(invalid)?;
        }

        for (user_id, shift_id) in &self.shifts.assignments {
            directory.assign(user_id, shift_id).map_err(invalid)?;
        }

        Ok(directory)
    }
}
