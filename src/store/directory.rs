//! Shift definitions, user assignments and the user roster.
//!
//! This data changes rarely compared to attendance events, so it lives in a
//! single read-mostly cache behind an `RwLock`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{AttendanceError, AttendanceResult};
use crate::models::{DayCode, ShiftDefinition, ShiftTime, User};

/// Minimum length of a shift name.
const NAME_MIN_CHARS: usize = 2;
/// Maximum length of a shift name.
const NAME_MAX_CHARS: usize = 50;
/// Maximum grace period in minutes.
const MAX_GRACE_MINUTES: u32 = 60;

/// The editable fields of a shift definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShiftDraft {
    /// Display name, unique across shifts.
    pub name: String,
    /// Nominal start time.
    pub start_time: ShiftTime,
    /// Nominal end time.
    pub end_time: ShiftTime,
    /// Tolerance in minutes around the nominal bounds.
    #[serde(default)]
    pub grace_period_minutes: u32,
    /// Days the shift runs on. `None` means every day.
    #[serde(default)]
    pub days_of_week: Option<BTreeSet<DayCode>>,
    /// Whether the shift admits anyone.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ShiftDraft {
    /// Checks field-level rules that don't depend on other shifts.
    pub fn validate(&self) -> AttendanceResult<()> {
        let name_len = self.name.trim().chars().count();
        if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&name_len) {
            return Err(AttendanceError::InvalidShift {
                field: "name".to_string(),
                message: format!(
                    "must be {}-{} characters",
                    NAME_MIN_CHARS, NAME_MAX_CHARS
                ),
            });
        }
        if self.start_time == self.end_time {
            return Err(AttendanceError::InvalidShift {
                field: "endTime".to_string(),
                message: "must differ from startTime".to_string(),
            });
        }
        if self.grace_period_minutes > MAX_GRACE_MINUTES {
            return Err(AttendanceError::InvalidShift {
                field: "gracePeriodMinutes".to_string(),
                message: format!("must be 0-{}", MAX_GRACE_MINUTES),
            });
        }
        if self.days_of_week.as_ref().is_some_and(BTreeSet::is_empty) {
            return Err(AttendanceError::InvalidShift {
                field: "daysOfWeek".to_string(),
                message: "must list at least one day or be omitted".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct DirectoryState {
    users: HashMap<String, User>,
    shifts: BTreeMap<String, ShiftDefinition>,
    assignments: HashMap<String, String>,
}

impl DirectoryState {
    fn ensure_unique_name(&self, name: &str, except_id: Option<&str>) -> AttendanceResult<()> {
        let wanted = name.trim().to_lowercase();
        let taken = self.shifts.values().any(|s| {
            Some(s.id.as_str()) != except_id && s.name.trim().to_lowercase() == wanted
        });
        if taken {
            return Err(AttendanceError::ShiftNameConflict {
                name: name.trim().to_string(),
            });
        }
        Ok(())
    }

    fn assigned_count(&self, shift_id: &str) -> usize {
        self.assignments.values().filter(|s| *s == shift_id).count()
    }
}

/// Read-mostly cache of users, shift definitions and assignments.
#[derive(Debug, Default)]
pub struct ShiftDirectory {
    state: RwLock<DirectoryState>,
}

impl ShiftDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> AttendanceResult<RwLockReadGuard<'_, DirectoryState>> {
        self.state
            .read()
            .map_err(|_| AttendanceError::StorageUnavailable {
                message: "shift directory lock poisoned".to_string(),
            })
    }

    fn write(&self) -> AttendanceResult<RwLockWriteGuard<'_, DirectoryState>> {
        self.state
            .write()
            .map_err(|_| AttendanceError::StorageUnavailable {
                message: "shift directory lock poisoned".to_string(),
            })
    }

    /// Adds or replaces a user record.
    pub fn upsert_user(&self, user: User) -> AttendanceResult<()> {
        self.write()?.users.insert(user.id.clone(), user);
        Ok(())
    }

    /// Looks up a user.
    pub fn user(&self, user_id: &str) -> AttendanceResult<User> {
        self.read()?
            .users
            .get(user_id)
            .cloned()
            .ok_or_else(|| AttendanceError::UserNotFound {
                user_id: user_id.to_string(),
            })
    }

    /// Lists all shift definitions ordered by start time.
    pub fn shifts(&self) -> AttendanceResult<Vec<ShiftDefinition>> {
        let mut shifts: Vec<ShiftDefinition> = self.read()?.shifts.values().cloned().collect();
        shifts.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.name.cmp(&b.name)));
        Ok(shifts)
    }

    /// Looks up a shift definition.
    pub fn shift(&self, shift_id: &str) -> AttendanceResult<ShiftDefinition> {
        self.read()?
            .shifts
            .get(shift_id)
            .cloned()
            .ok_or_else(|| AttendanceError::ShiftNotFound {
                shift_id: shift_id.to_string(),
            })
    }

    /// Inserts a pre-built definition, as used when seeding from configuration.
    pub fn insert_shift(&self, shift: ShiftDefinition) -> AttendanceResult<()> {
        let mut state = self.write()?;
        state.ensure_unique_name(&shift.name, Some(&shift.id))?;
        state.shifts.insert(shift.id.clone(), shift);
        Ok(())
    }

    /// Creates a shift definition from a validated draft.
    pub fn create_shift(
        &self,
        draft: ShiftDraft,
        now: NaiveDateTime,
    ) -> AttendanceResult<ShiftDefinition> {
        draft.validate()?;
        let mut state = self.write()?;
        state.ensure_unique_name(&draft.name, None)?;

        let shift = ShiftDefinition {
            id: Uuid::new_v4().to_string(),
            name: draft.name.trim().to_string(),
            start_time: draft.start_time,
            end_time: draft.end_time,
            grace_period_minutes: draft.grace_period_minutes,
            days_of_week: draft.days_of_week,
            is_active: draft.is_active,
            created_at: now,
            updated_at: now,
        };
        state.shifts.insert(shift.id.clone(), shift.clone());
        info!(shift_id = %shift.id, name = %shift.name, "Shift created");
        Ok(shift)
    }

    /// Replaces the editable fields of an existing shift.
    pub fn update_shift(
        &self,
        shift_id: &str,
        draft: ShiftDraft,
        now: NaiveDateTime,
    ) -> AttendanceResult<ShiftDefinition> {
        draft.validate()?;
        let mut state = self.write()?;
        if !state.shifts.contains_key(shift_id) {
            return Err(AttendanceError::ShiftNotFound {
                shift_id: shift_id.to_string(),
            });
        }
        state.ensure_unique_name(&draft.name, Some(shift_id))?;

        let shift = state
            .shifts
            .get_mut(shift_id)
            .ok_or_else(|| AttendanceError::ShiftNotFound {
                shift_id: shift_id.to_string(),
            })?;
        shift.name = draft.name.trim().to_string();
        shift.start_time = draft.start_time;
        shift.end_time = draft.end_time;
        shift.grace_period_minutes = draft.grace_period_minutes;
        shift.days_of_week = draft.days_of_week;
        shift.is_active = draft.is_active;
        shift.updated_at = now;
        info!(shift_id, "Shift updated");
        Ok(shift.clone())
    }

    /// Deletes a shift that no user is assigned to.
    pub fn delete_shift(&self, shift_id: &str) -> AttendanceResult<()> {
        let mut state = self.write()?;
        if !state.shifts.contains_key(shift_id) {
            return Err(AttendanceError::ShiftNotFound {
                shift_id: shift_id.to_string(),
            });
        }
        let assigned_users = state.assigned_count(shift_id);
        if assigned_users > 0 {
            return Err(AttendanceError::ShiftInUse {
                shift_id: shift_id.to_string(),
                assigned_users,
            });
        }
        state.shifts.remove(shift_id);
        info!(shift_id, "Shift deleted");
        Ok(())
    }

    /// Assigns a user to a shift, replacing any previous assignment.
    pub fn assign(&self, user_id: &str, shift_id: &str) -> AttendanceResult<()> {
        let mut state = self.write()?;
        if !state.users.contains_key(user_id) {
            return Err(AttendanceError::UserNotFound {
                user_id: user_id.to_string(),
            });
        }
        if !state.shifts.contains_key(shift_id) {
            return Err(AttendanceError::ShiftNotFound {
                shift_id: shift_id.to_string(),
            });
        }
        state
            .assignments
            .insert(user_id.to_string(), shift_id.to_string());
        info!(user_id, shift_id, "Shift assigned");
        Ok(())
    }

    /// Removes a user's assignment. Returns true if one existed.
    pub fn unassign(&self, user_id: &str) -> AttendanceResult<bool> {
        let removed = self.write()?.assignments.remove(user_id).is_some();
        if removed {
            info!(user_id, "Shift unassigned");
        }
        Ok(removed)
    }

    /// Returns the shift assigned to a user, if any.
    pub fn assigned_shift(&self, user_id: &str) -> AttendanceResult<Option<ShiftDefinition>> {
        let state = self.read()?;
        Ok(state
            .assignments
            .get(user_id)
            .and_then(|shift_id| state.shifts.get(shift_id))
            .cloned())
    }
}
