//! Fans one escalation out to its recipients.
//!
//! Per recipient the dispatcher inserts a notification row and invokes the
//! email capability. The two side effects are independent failure domains:
//! an insert failure never stops the email attempt or the remaining
//! recipients, and an email failure never rolls back the insert — the
//! notification row is the durable source of truth, email is best-effort.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use sitewatch_core::{Finding, NewNotification, Profile};
use sitewatch_notify::{EmailData, EmailRequest, EmailSender};

use crate::rules::{escalation_level, escalation_message, escalation_title, EscalationRule};
use crate::store::NotificationStore;

/// Result of dispatching one escalation to all its recipients.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Notification rows inserted.
    pub inserted: usize,
    /// Emails handed to the capability without error.
    pub emails_sent: usize,
    /// Recipients whose notification insert failed.
    pub insert_failures: usize,
    /// Recipients whose email send failed.
    pub email_failures: usize,
}

/// Persists notifications and triggers emails for resolved recipients.
pub struct NotificationDispatcher {
    notifications: Arc<dyn NotificationStore>,
    email: Arc<dyn EmailSender>,
}

impl NotificationDispatcher {
    pub fn new(notifications: Arc<dyn NotificationStore>, email: Arc<dyn EmailSender>) -> Self {
        Self {
            notifications,
            email,
        }
    }

    /// Dispatch one escalation to every recipient.
    pub async fn dispatch(
        &self,
        finding: &Finding,
        rule: &EscalationRule,
        hours_overdue: i64,
        project_name: &str,
        recipients: &[Profile],
        now: DateTime<Utc>,
    ) -> DispatchOutcome {
        let level = escalation_level(hours_overdue);
        let title = escalation_title(level);
        let message = escalation_message(&finding.title, hours_overdue);

        let mut outcome = DispatchOutcome::default();

        for recipient in recipients {
            let notification = NewNotification {
                id: Uuid::new_v4(),
                user_id: recipient.id,
                finding_id: finding.id,
                kind: rule.notification_type,
                title: title.clone(),
                message: message.clone(),
                sent_at: now,
            };
            let notification_id = notification.id;

            let inserted = match self.notifications.insert(&notification).await {
                Ok(()) => {
                    outcome.inserted += 1;
                    true
                }
                Err(e) => {
                    warn!(
                        finding_id = %finding.id,
                        user_id = %recipient.id,
                        error = %e,
                        "notification insert failed"
                    );
                    outcome.insert_failures += 1;
                    false
                }
            };

            // Email is attempted regardless of the insert outcome.
            let request = EmailRequest {
                kind: rule.notification_type.to_string(),
                email_data: EmailData {
                    recipient_email: recipient.email.clone(),
                    recipient_name: recipient.full_name(),
                    finding_title: finding.title.clone(),
                    finding_id: finding.id,
                    due_date: finding.due_date,
                    severity: finding.severity,
                    project_name: project_name.to_string(),
                    escalation_level: level,
                },
                title: title.clone(),
                message: message.clone(),
            };

            match self.email.send(&request).await {
                Ok(()) => {
                    outcome.emails_sent += 1;
                    if inserted {
                        if let Err(e) = self.notifications.mark_email_sent(notification_id).await {
                            warn!(
                                notification_id = %notification_id,
                                error = %e,
                                "failed to flag email_sent"
                            );
                        }
                    }
                }
                Err(e) => {
                    warn!(
                        finding_id = %finding.id,
                        recipient = %recipient.email,
                        channel = self.email.channel_name(),
                        error = %e,
                        "escalation email failed"
                    );
                    outcome.email_failures += 1;
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use sitewatch_core::{FindingStatus, NotificationType, Severity};
    use sitewatch_notify::NotifyError;
    use std::sync::Mutex;

    use crate::rules::ESCALATION_RULES;
    use crate::store::StoreError;

    /// Notification store double that can fail every Nth insert.
    #[derive(Default)]
    struct RecordingStore {
        inserted: Mutex<Vec<NewNotification>>,
        email_sent_ids: Mutex<Vec<Uuid>>,
        fail_inserts_for: Mutex<Vec<Uuid>>,
    }

    #[async_trait]
    impl NotificationStore for RecordingStore {
        async fn recent_exists(
            &self,
            _finding_id: Uuid,
            _kind: NotificationType,
            _since: DateTime<Utc>,
        ) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn insert(&self, notification: &NewNotification) -> Result<(), StoreError> {
            if self
                .fail_inserts_for
                .lock()
                .unwrap()
                .contains(&notification.user_id)
            {
                return Err(StoreError::Query("insert rejected".to_string()));
            }
            self.inserted.lock().unwrap().push(notification.clone());
            Ok(())
        }

        async fn mark_email_sent(&self, id: Uuid) -> Result<(), StoreError> {
            self.email_sent_ids.lock().unwrap().push(id);
            Ok(())
        }
    }

    /// Email double counting sends, optionally failing.
    #[derive(Default)]
    struct RecordingEmail {
        requests: Mutex<Vec<EmailRequest>>,
        fail: bool,
    }

    #[async_trait]
    impl EmailSender for RecordingEmail {
        async fn send(&self, request: &EmailRequest) -> Result<(), NotifyError> {
            self.requests.lock().unwrap().push(request.clone());
            if self.fail {
                Err(NotifyError::Smtp("relay down".to_string()))
            } else {
                Ok(())
            }
        }

        fn channel_name(&self) -> &str {
            "recording"
        }
    }

    fn finding(now: DateTime<Utc>) -> Finding {
        Finding {
            id: Uuid::new_v4(),
            title: "Missing edge protection".to_string(),
            severity: Severity::High,
            due_date: now - chrono::Duration::hours(50),
            status: FindingStatus::Assigned,
            project_id: Uuid::new_v4(),
        }
    }

    fn recipient(email: &str) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            first_name: "Sam".to_string(),
            last_name: "Okafor".to_string(),
            email: email.to_string(),
            role: "gc_site_director".to_string(),
        }
    }

    #[tokio::test]
    async fn inserts_and_emails_each_recipient() {
        let store = Arc::new(RecordingStore::default());
        let email = Arc::new(RecordingEmail::default());
        let dispatcher = NotificationDispatcher::new(store.clone(), email.clone());

        let now = Utc::now();
        let finding = finding(now);
        let recipients = vec![recipient("a@x.com"), recipient("b@x.com")];

        let outcome = dispatcher
            .dispatch(&finding, &ESCALATION_RULES[1], 50, "Tower B", &recipients, now)
            .await;

        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.emails_sent, 2);
        assert_eq!(outcome.insert_failures, 0);

        let inserted = store.inserted.lock().unwrap();
        assert_eq!(inserted.len(), 2);
        assert_eq!(inserted[0].kind, NotificationType::OverdueAlert);
        assert_eq!(inserted[0].title, "Overdue Finding Escalation - 3 Days");
        assert!(inserted[0]
            .message
            .contains("is 50 hours overdue and requires immediate attention"));
        assert_eq!(inserted[0].sent_at, now);

        let requests = email.requests.lock().unwrap();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].kind, "overdue_alert");
        assert_eq!(requests[0].email_data.escalation_level, 3);
        assert_eq!(requests[0].email_data.project_name, "Tower B");

        // Successful email flips email_sent on the matching rows.
        assert_eq!(store.email_sent_ids.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn insert_failure_still_attempts_email_and_other_recipients() {
        let first = recipient("first@x.com");
        let second = recipient("second@x.com");

        let store = Arc::new(RecordingStore {
            fail_inserts_for: Mutex::new(vec![first.id]),
            ..Default::default()
        });
        let email = Arc::new(RecordingEmail::default());
        let dispatcher = NotificationDispatcher::new(store.clone(), email.clone());

        let now = Utc::now();
        let finding = finding(now);

        let outcome = dispatcher
            .dispatch(
                &finding,
                &ESCALATION_RULES[1],
                50,
                "Tower B",
                &[first, second],
                now,
            )
            .await;

        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.insert_failures, 1);
        // Both recipients still got an email attempt.
        assert_eq!(outcome.emails_sent, 2);
        // Only the surviving row is flagged.
        assert_eq!(store.email_sent_ids.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn email_failure_keeps_notification_row() {
        let store = Arc::new(RecordingStore::default());
        let email = Arc::new(RecordingEmail {
            fail: true,
            ..Default::default()
        });
        let dispatcher = NotificationDispatcher::new(store.clone(), email.clone());

        let now = Utc::now();
        let finding = finding(now);

        let outcome = dispatcher
            .dispatch(
                &finding,
                &ESCALATION_RULES[1],
                50,
                "Tower B",
                &[recipient("a@x.com")],
                now,
            )
            .await;

        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.emails_sent, 0);
        assert_eq!(outcome.email_failures, 1);
        // The insert is not rolled back and email_sent stays unset.
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
        assert!(store.email_sent_ids.lock().unwrap().is_empty());
    }
}
