//! Project membership and profile queries.

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use sitewatch_core::{Profile, ProjectMember};
use sitewatch_escalation::{ProjectDirectory, StoreError};

use crate::query_error;

#[derive(Debug, Clone, FromRow)]
pub struct MemberRow {
    pub user_id: Uuid,
    pub project_id: Uuid,
    pub role: String,
}

impl From<MemberRow> for ProjectMember {
    fn from(row: MemberRow) -> Self {
        ProjectMember {
            user_id: row.user_id,
            project_id: row.project_id,
            role: row.role,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ProfileRow {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: String,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            role: row.role,
        }
    }
}

/// Directory backed by the projects, project_members, and profiles tables.
pub struct PgProjectDirectory {
    pool: PgPool,
}

impl PgProjectDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProjectDirectory for PgProjectDirectory {
    async fn project_members(&self, project_id: Uuid) -> Result<Vec<ProjectMember>, StoreError> {
        let rows: Vec<MemberRow> = sqlx::query_as(
            r"
            SELECT user_id, project_id, role
            FROM project_members
            WHERE project_id = $1
            ",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows.into_iter().map(ProjectMember::from).collect())
    }

    async fn profiles_by_role(&self, ids: &[Uuid], role: &str) -> Result<Vec<Profile>, StoreError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            r"
            SELECT id, first_name, last_name, email, role
            FROM profiles
            WHERE id = ANY($1) AND role = $2
            ",
        )
        .bind(ids)
        .bind(role)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(rows.into_iter().map(Profile::from).collect())
    }

    async fn project_name(&self, project_id: Uuid) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar(
            r"
            SELECT name FROM projects WHERE id = $1
            ",
        )
        .bind(project_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(query_error)
    }
}
