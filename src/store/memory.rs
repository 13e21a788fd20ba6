//! In-process stores backed by a mutex-guarded vector.
//!
//! Each write takes the lock once, so the "check then write" of a conditional
//! operation happens atomically.

use std::sync::{Mutex, MutexGuard};

use crate::error::{AttendanceError, AttendanceResult};
use crate::models::{AttendanceEntry, CloseRequest, OverrideEntry};

use super::{AttendanceLogStore, OverrideLogStore};

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> AttendanceResult<MutexGuard<'a, T>> {
    mutex.lock().map_err(|_| AttendanceError::StorageUnavailable {
        message: format!("{} lock poisoned", what),
    })
}

/// Attendance log held in memory.
#[derive(Debug, Default)]
pub struct InMemoryAttendanceLog {
    entries: Mutex<Vec<AttendanceEntry>>,
}

impl InMemoryAttendanceLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }
}

impl AttendanceLogStore for InMemoryAttendanceLog {
    fn find_open(&self, user_id: &str) -> AttendanceResult<Option<AttendanceEntry>> {
        let entries = lock(&self.entries, "attendance log")?;
        Ok(entries
            .iter()
            .find(|e| e.user_id == user_id && e.is_open())
            .cloned())
    }

    fn list_open(&self) -> AttendanceResult<Vec<AttendanceEntry>> {
        let entries = lock(&self.entries, "attendance log")?;
        Ok(entries.iter().filter(|e| e.is_open()).cloned().collect())
    }

    fn history(&self, user_id: &str) -> AttendanceResult<Vec<AttendanceEntry>> {
        let entries = lock(&self.entries, "attendance log")?;
        let mut history: Vec<AttendanceEntry> = entries
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        history.sort_by(|a, b| b.clock_in_at.cmp(&a.clock_in_at));
        Ok(history)
    }

    fn insert_open(&self, entry: AttendanceEntry) -> AttendanceResult<AttendanceEntry> {
        let mut entries = lock(&self.entries, "attendance log")?;
        if entries
            .iter()
            .any(|e| e.user_id == entry.user_id && e.is_open())
        {
            return Err(AttendanceError::AlreadyClockedIn {
                user_id: entry.user_id,
            });
        }
        entries.push(entry.clone());
        Ok(entry)
    }

    fn close_if_open(
        &self,
        entry_id: &str,
        close: &CloseRequest,
    ) -> AttendanceResult<Option<AttendanceEntry>> {
        let mut entries = lock(&self.entries, "attendance log")?;
        let Some(entry) = entries.iter_mut().find(|e| e.id == entry_id) else {
            return Ok(None);
        };
        if !entry.is_open() {
            return Ok(None);
        }

        entry.clock_out_at = Some(close.at);
        entry.close_reason = Some(close.reason);
        if close.closing_balance.is_some() {
            entry.closing_balance = close.closing_balance;
        }
        if let Some(note) = &close.note {
            entry.append_note(note);
        }
        Ok(Some(entry.clone()))
    }

    fn extend_open(
        &self,
        entry_id: &str,
        minutes: u32,
    ) -> AttendanceResult<Option<AttendanceEntry>> {
        let mut entries = lock(&self.entries, "attendance log")?;
        match entries.iter_mut().find(|e| e.id == entry_id && e.is_open()) {
            Some(entry) => {
                entry.extension_minutes += minutes;
                Ok(Some(entry.clone()))
            }
            None => Ok(None),
        }
    }
}

/// Override audit trail held in memory.
#[derive(Debug, Default)]
pub struct InMemoryOverrideLog {
    entries: Mutex<Vec<OverrideEntry>>,
}

impl InMemoryOverrideLog {
    /// Creates an empty audit trail.
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverrideLogStore for InMemoryOverrideLog {
    fn append(&self, entry: OverrideEntry) -> AttendanceResult<()> {
        lock(&self.entries, "override log")?.push(entry);
        Ok(())
    }

    fn list(&self, user_id: Option<&str>) -> AttendanceResult<Vec<OverrideEntry>> {
        let entries = lock(&self.entries, "override log")?;
        let mut rows: Vec<OverrideEntry> = entries
            .iter()
            .filter(|e| user_id.is_none_or(|id| e.user_id == id))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }
}
