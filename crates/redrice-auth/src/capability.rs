//! Capability-based authorization
//!
//! Handlers ask whether the caller holds a [`Capability`] instead of
//! inspecting roles directly.

use redrice_db::UserRole;

/// An action a caller may be allowed to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// List, create and re-role any user account
    ManageUsers,
    /// Read or modify the account with this id
    AccessUser(i64),
    /// Create, update and delete restaurants
    ManageRestaurants,
    /// See every reservation in the system
    ViewAllReservations,
    /// Read or modify a reservation owned by this user id
    AccessReservation(i64),
}

impl Capability {
    /// Whether a caller with the given identity holds this capability
    pub fn granted_to(self, user_id: i64, role: UserRole) -> bool {
        if role.is_admin() {
            return true;
        }
        match self {
            Capability::AccessUser(id) | Capability::AccessReservation(id) => id == user_id,
            Capability::ManageUsers
            | Capability::ManageRestaurants
            | Capability::ViewAllReservations => false,
        }
    }
}
