//! Staff user model and roles.
//!
//! Users are owned by the upstream user store; this crate only needs their
//! identity and role to decide whether attendance rules apply.

use serde::{Deserialize, Serialize};

/// The role a staff member holds in the point-of-sale system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Full administrative access, exempt from attendance tracking.
    Admin,
    /// Operates the till.
    Cashier,
    /// Takes orders on the floor.
    Waiter,
}

impl Role {
    /// Returns true if this role is subject to shift attendance rules.
    ///
    /// This is the single capability predicate consulted by the access gate
    /// and the clock-out restriction.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_attendance::models::Role;
    ///
    /// assert!(!Role::Admin.requires_attendance_tracking());
    /// assert!(Role::Cashier.requires_attendance_tracking());
    /// ```
    pub fn requires_attendance_tracking(self) -> bool {
        !matches!(self, Role::Admin)
    }
}

/// A staff member known to the attendance engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique identifier for the user.
    pub id: String,
    /// Login name.
    pub username: String,
    /// Name shown on screens and reports.
    #[serde(default)]
    pub display_name: Option<String>,
    /// The user's role.
    pub role: Role,
}

impl User {
    /// Returns true if the user holds the admin role.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Returns true if attendance rules apply to this user.
    pub fn requires_attendance_tracking(&self) -> bool {
        self.role.requires_attendance_tracking()
    }
}
