//! Managed user model for the user administration screen

use super::identity::{Identity, Role};
use serde::{Deserialize, Serialize};

/// A user as listed by the administration endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedUser {
    #[serde(flatten)]
    pub identity: Identity,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

impl ManagedUser {
    pub fn id(&self) -> &str {
        &self.identity.id
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }

    /// Case-insensitive match on handle, names or the Telegram id
    pub fn matches_search(&self, search: &str) -> bool {
        let needle = search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        let names = &self.identity.display_name;
        self.identity.handle.to_lowercase().contains(&needle)
            || names
                .first_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
            || names
                .last_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
            || self.identity.external_id.contains(&needle)
    }
}

/// User list query: server-side role filter plus local search
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    pub role: Option<Role>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRoleInput {
    pub role: Role,
}
