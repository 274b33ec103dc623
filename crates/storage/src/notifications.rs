//! Notification persistence and the dedup lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use sitewatch_core::{NewNotification, NotificationType};
use sitewatch_escalation::{NotificationStore, StoreError};

use crate::query_error;

/// Notification store backed by Postgres.
pub struct PgNotificationStore {
    pool: PgPool,
}

impl PgNotificationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn recent_exists(
        &self,
        finding_id: Uuid,
        kind: NotificationType,
        since: DateTime<Utc>,
    ) -> Result<bool, StoreError> {
        sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM notifications
                WHERE finding_id = $1 AND type = $2 AND sent_at >= $3
            )
            ",
        )
        .bind(finding_id)
        .bind(kind.as_str())
        .bind(since)
        .fetch_one(&self.pool)
        .await
        .map_err(query_error)
    }

    async fn insert(&self, notification: &NewNotification) -> Result<(), StoreError> {
        sqlx::query(
            r"
            INSERT INTO notifications
                (id, user_id, finding_id, type, title, message, sent_at, is_read, email_sent)
            VALUES ($1, $2, $3, $4, $5, $6, $7, FALSE, FALSE)
            ",
        )
        .bind(notification.id)
        .bind(notification.user_id)
        .bind(notification.finding_id)
        .bind(notification.kind.as_str())
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.sent_at)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(())
    }

    async fn mark_email_sent(&self, id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            r"
            UPDATE notifications SET email_sent = TRUE WHERE id = $1
            ",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(query_error)?;

        Ok(())
    }
}
