//! Recipient resolution for escalations.
//!
//! An escalation targets the people who both belong to the finding's
//! project and hold the tier's role there. A project without that role
//! staffed is a normal situation, not a fault, so the resolver collapses
//! every failure mode — membership query error, empty membership, profile
//! query error, nobody holding the role — into an empty recipient set.

use tracing::{debug, warn};
use uuid::Uuid;

use sitewatch_core::Profile;

use crate::store::ProjectDirectory;

/// Resolves role-scoped recipients for a project.
pub struct RecipientResolver<'a> {
    directory: &'a dyn ProjectDirectory,
}

impl<'a> RecipientResolver<'a> {
    pub fn new(directory: &'a dyn ProjectDirectory) -> Self {
        Self { directory }
    }

    /// Profiles of project members holding `role`. Always returns a set,
    /// possibly empty; the caller treats empty as a no-op.
    pub async fn resolve(&self, project_id: Uuid, role: &str) -> Vec<Profile> {
        let members = match self.directory.project_members(project_id).await {
            Ok(members) => members,
            Err(e) => {
                warn!(%project_id, error = %e, "membership lookup failed; no recipients");
                return Vec::new();
            }
        };

        if members.is_empty() {
            debug!(%project_id, "project has no members");
            return Vec::new();
        }

        let ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();
        match self.directory.profiles_by_role(&ids, role).await {
            Ok(profiles) => {
                if profiles.is_empty() {
                    debug!(%project_id, role, "no project member holds the target role");
                }
                profiles
            }
            Err(e) => {
                warn!(%project_id, role, error = %e, "profile lookup failed; no recipients");
                Vec::new()
            }
        }
    }
}
