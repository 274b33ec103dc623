//! EmailSender trait definition and shared error types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use sitewatch_core::Severity;

/// Errors that can occur during email delivery.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("SMTP delivery failed: {0}")]
    Smtp(String),

    #[error("Template rendering failed: {0}")]
    Template(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Payload handed to the email-sending capability.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailRequest {
    /// Notification type string (e.g. `"overdue_alert"`).
    #[serde(rename = "type")]
    pub kind: String,
    pub email_data: EmailData,
    /// Rendered subject line.
    pub title: String,
    /// Rendered plain-text message.
    pub message: String,
}

/// Recipient and finding context for one escalation email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailData {
    pub recipient_email: String,
    pub recipient_name: String,
    pub finding_title: String,
    pub finding_id: Uuid,
    pub due_date: DateTime<Utc>,
    pub severity: Severity,
    pub project_name: String,
    /// Days overdue, rounded up.
    pub escalation_level: i64,
}

/// Trait for email backend implementations.
#[async_trait::async_trait]
pub trait EmailSender: Send + Sync {
    /// Deliver one escalation email. Best-effort: callers log failures and
    /// move on, they never roll back on a send error.
    async fn send(&self, request: &EmailRequest) -> Result<(), NotifyError>;

    /// Human-readable name for this backend (e.g. "function", "smtp").
    fn channel_name(&self) -> &str;
}

/// Backend used when no email delivery is configured. Logs and succeeds,
/// leaving the notification row as the only record.
#[derive(Debug, Default)]
pub struct NoopEmailSender;

#[async_trait::async_trait]
impl EmailSender for NoopEmailSender {
    async fn send(&self, request: &EmailRequest) -> Result<(), NotifyError> {
        tracing::info!(
            recipient = %request.email_data.recipient_email,
            title = %request.title,
            "email delivery not configured; skipping send"
        );
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> EmailRequest {
        EmailRequest {
            kind: "overdue_alert".to_string(),
            email_data: EmailData {
                recipient_email: "a@x.com".to_string(),
                recipient_name: "Ada Lovelace".to_string(),
                finding_title: "Missing guardrail".to_string(),
                finding_id: Uuid::new_v4(),
                due_date: Utc::now(),
                severity: Severity::High,
                project_name: "Tower B".to_string(),
                escalation_level: 3,
            },
            title: "Overdue Finding Escalation - 3 Days".to_string(),
            message: "ESCALATION: ...".to_string(),
        }
    }

    #[test]
    fn request_serializes_kind_as_type() {
        let json = serde_json::to_value(sample_request()).unwrap();
        assert_eq!(json["type"], "overdue_alert");
        assert_eq!(json["email_data"]["severity"], "high");
        assert_eq!(json["email_data"]["escalation_level"], 3);
    }

    #[tokio::test]
    async fn noop_sender_always_succeeds() {
        let sender = NoopEmailSender;
        assert!(sender.send(&sample_request()).await.is_ok());
        assert_eq!(sender.channel_name(), "noop");
    }
}
