//! Notification records owned by their recipients.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

/// Kind of notification emitted by the escalation pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    DeadlineReminder,
    OverdueAlert,
    Escalation,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::DeadlineReminder => "deadline_reminder",
            NotificationType::OverdueAlert => "overdue_alert",
            NotificationType::Escalation => "escalation",
        }
    }
}

impl fmt::Display for NotificationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deadline_reminder" => Ok(NotificationType::DeadlineReminder),
            "overdue_alert" => Ok(NotificationType::OverdueAlert),
            "escalation" => Ok(NotificationType::Escalation),
            other => Err(DomainError::UnknownNotificationType(other.to_string())),
        }
    }
}

/// A persisted notification. Immutable once created, except for the
/// `is_read` and `email_sent` flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    /// Recipient (owner) of the notification.
    pub user_id: Uuid,
    /// The finding this notification is about.
    pub finding_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
    pub email_sent: bool,
}

/// A notification about to be inserted. The id is assigned up front so the
/// dispatcher can flip `email_sent` after a successful email delivery.
#[derive(Debug, Clone, Serialize)]
pub struct NewNotification {
    pub id: Uuid,
    pub user_id: Uuid,
    pub finding_id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub title: String,
    pub message: String,
    pub sent_at: DateTime<Utc>,
}
