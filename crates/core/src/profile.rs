//! User profiles and project membership.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user profile from the directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Role held by this user (e.g. `gc_project_manager`).
    pub role: String,
}

impl Profile {
    /// Display name for email recipients.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Membership of a user in a project, with the role they hold there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub role: String,
}
