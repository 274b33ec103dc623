//! Findings queries.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use sitewatch_core::{Finding, FindingStatus, Severity};
use sitewatch_escalation::{FindingStore, StoreError};

use crate::query_error;

/// Raw findings row; enum columns arrive as TEXT.
#[derive(Debug, Clone, FromRow)]
pub struct FindingRow {
    pub id: Uuid,
    pub title: String,
    pub severity: String,
    pub due_date: DateTime<Utc>,
    pub status: String,
    pub project_id: Uuid,
}

impl TryFrom<FindingRow> for Finding {
    type Error = StoreError;

    fn try_from(row: FindingRow) -> Result<Self, StoreError> {
        Ok(Finding {
            id: row.id,
            title: row.title,
            severity: Severity::from_str(&row.severity)
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            due_date: row.due_date,
            status: FindingStatus::from_str(&row.status)
                .map_err(|e| StoreError::Decode(e.to_string()))?,
            project_id: row.project_id,
        })
    }
}

/// Findings store backed by Postgres.
pub struct PgFindingStore {
    pool: PgPool,
}

impl PgFindingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FindingStore for PgFindingStore {
    async fn overdue_findings(&self, now: DateTime<Utc>) -> Result<Vec<Finding>, StoreError> {
        let rows: Vec<FindingRow> = sqlx::query_as(
            r"
            SELECT id, title, severity, due_date, status, project_id
            FROM findings
            WHERE status <> 'closed' AND due_date < $1
            ORDER BY due_date
            ",
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(query_error)?;

        rows.into_iter().map(Finding::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> FindingRow {
        FindingRow {
            id: Uuid::new_v4(),
            title: "Damaged harness".to_string(),
            severity: "critical".to_string(),
            due_date: Utc::now(),
            status: "in_progress".to_string(),
            project_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn row_converts_to_domain_finding() {
        let finding = Finding::try_from(row()).unwrap();
        assert_eq!(finding.severity, Severity::Critical);
        assert_eq!(finding.status, FindingStatus::InProgress);
    }

    #[test]
    fn unknown_severity_is_a_decode_error() {
        let bad = FindingRow {
            severity: "catastrophic".to_string(),
            ..row()
        };
        match Finding::try_from(bad) {
            Err(StoreError::Decode(msg)) => assert!(msg.contains("catastrophic")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_status_is_a_decode_error() {
        let bad = FindingRow {
            status: "archived".to_string(),
            ..row()
        };
        assert!(matches!(Finding::try_from(bad), Err(StoreError::Decode(_))));
    }
}
