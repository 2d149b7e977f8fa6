//! # Principals
//!
//! The authenticated caller as seen by the engine. Authentication itself
//! happens at the edge; by the time a [`Principal`] exists the identity
//! has been verified.

use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// An authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// The caller's user id. `None` for service/admin tokens not bound to a user.
    pub user_id: Option<UserId>,
    /// Whether the caller holds the administrative role.
    pub admin: bool,
}

impl Principal {
    /// A regular user.
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id: Some(user_id),
            admin: false,
        }
    }

    /// An administrator, optionally bound to a user.
    pub fn admin(user_id: Option<UserId>) -> Self {
        Self {
            user_id,
            admin: true,
        }
    }

    /// Whether this principal is the given user.
    pub fn is(&self, user: &UserId) -> bool {
        self.user_id.as_ref() == Some(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbound_admin_is_nobody() {
        let admin = Principal::admin(None);
        assert!(!admin.is(&UserId::new()));
        assert!(admin.admin);
    }

    #[test]
    fn user_matches_own_id_only() {
        let id = UserId::new();
        let principal = Principal::user(id);
        assert!(principal.is(&id));
        assert!(!principal.is(&UserId::new()));
    }
}
