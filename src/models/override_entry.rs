//! Admin override audit records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The kind of admin override performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverrideAction {
    /// The session's effective end was pushed back.
    Extend,
    /// The session was terminated by an admin.
    ForceLogout,
}

/// An append-only audit row written alongside every override.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverrideEntry {
    /// Unique identifier for the audit row.
    pub id: String,
    /// The shift of the affected session.
    pub shift_id: String,
    /// The user whose session was affected.
    pub user_id: String,
    /// What was done.
    pub action: OverrideAction,
    /// Why the admin did it.
    pub reason: String,
    /// Value before the override.
    pub old_value: Option<String>,
    /// Value after the override.
    pub new_value: Option<String>,
    /// Extra context.
    pub notes: Option<String>,
    /// The admin who performed the override.
    pub actor_id: String,
    /// When the override was recorded.
    pub created_at: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_serializes_upper_case() {
        assert_eq!(
            serde_json::to_value(OverrideAction::Extend).unwrap(),
            "EXTEND"
        );
        assert_eq!(
            serde_json::to_value(OverrideAction::ForceLogout).unwrap(),
            "FORCE_LOGOUT"
        );
    }
}
