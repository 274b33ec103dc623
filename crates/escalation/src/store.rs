//! Data-access seams for the escalation pipeline.
//!
//! The pipeline never talks to a concrete database. Everything flows
//! through these traits so the evaluator, resolver, dispatcher, and pass
//! runner can be driven against in-memory doubles in tests and against
//! Postgres in production.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use sitewatch_core::{Finding, NewNotification, NotificationType, Profile, ProjectMember};

/// Errors surfaced by store implementations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(String),

    #[error("row decode failed: {0}")]
    Decode(String),
}

/// Read access to findings.
#[async_trait]
pub trait FindingStore: Send + Sync {
    /// All findings with `status != closed` and `due_date < now`.
    async fn overdue_findings(&self, now: DateTime<Utc>) -> Result<Vec<Finding>, StoreError>;
}

/// Read access to projects, memberships, and profiles.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Members of a project.
    async fn project_members(&self, project_id: Uuid) -> Result<Vec<ProjectMember>, StoreError>;

    /// Profiles among `ids` holding exactly `role`.
    async fn profiles_by_role(&self, ids: &[Uuid], role: &str) -> Result<Vec<Profile>, StoreError>;

    /// Display name of a project, if it exists.
    async fn project_name(&self, project_id: Uuid) -> Result<Option<String>, StoreError>;
}

/// Read/write access to notification records.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    /// Whether a notification for `finding_id` of `kind` exists with
    /// `sent_at >= since`.
    async fn recent_exists(
        &self,
        finding_id: Uuid,
        kind: NotificationType,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError>;

    /// Persist a new notification.
    async fn insert(&self, notification: &NewNotification) -> Result<(), StoreError>;

    /// Flip `email_sent` after a successful email delivery. Best-effort:
    /// an unknown id is not an error.
    async fn mark_email_sent(&self, id: Uuid) -> Result<(), StoreError>;
}
