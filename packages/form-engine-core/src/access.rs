//! Acting identity threaded through every engine operation.

use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// Role carried by an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Elevated privilege, sees and manages every entity
    Admin,
    /// Regular user, sees and manages owned entities only
    #[default]
    User,
}

/// The user on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    /// Creates a regular user actor.
    pub fn user(user_id: u64) -> Self {
        Self {
            user_id: UserId(user_id),
            role: Role::User,
        }
    }

    /// Creates an actor with elevated privilege.
    pub fn admin(user_id: u64) -> Self {
        Self {
            user_id: UserId(user_id),
            role: Role::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// True when the actor is the owner or holds elevated privilege.
    pub fn can_manage(&self, owner: UserId) -> bool {
        self.is_admin() || self.user_id == owner
    }
}
