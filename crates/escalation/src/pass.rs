//! One full escalation pass over all overdue findings.
//!
//! Findings are processed sequentially; for a given finding the dedup
//! check always happens before the corresponding inserts, so a single
//! pass can never double-notify a tier. A failure on one finding is
//! logged and isolated — the batch continues with the next finding. Only
//! the top-level overdue query aborts the pass.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use sitewatch_notify::EmailSender;

use crate::dispatcher::NotificationDispatcher;
use crate::evaluator::{Decision, Evaluator, SkipReason};
use crate::recipients::RecipientResolver;
use crate::store::{FindingStore, NotificationStore, ProjectDirectory, StoreError};

/// Fallback project label when the directory cannot supply a name.
const UNKNOWN_PROJECT: &str = "Unknown Project";

/// Counters accumulated over one pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PassStats {
    /// Findings returned by the overdue query.
    pub total_overdue: usize,
    /// Findings examined (including skips).
    pub processed: usize,
    /// Findings with at least one notification inserted.
    pub escalations_sent: usize,
    /// Notification rows inserted across all findings.
    pub notifications_inserted: usize,
    /// Emails handed off without error.
    pub emails_sent: usize,
    /// Findings overdue by less than the lowest tier.
    pub skipped_below_threshold: usize,
    /// Findings whose tier already fired within the dedup window.
    pub skipped_duplicate: usize,
    /// Findings whose target role is not staffed on the project.
    pub skipped_no_recipients: usize,
    /// Findings that failed (dedup check error or all inserts failed).
    pub failed: usize,
}

/// Errors that abort an entire pass.
#[derive(Debug, thiserror::Error)]
pub enum PassError {
    #[error("failed to fetch overdue findings: {0}")]
    Findings(#[from] StoreError),
}

/// Batch runner walking every overdue finding once.
///
/// All collaborators are injected as trait objects, so the pass can run
/// against Postgres in production and in-memory doubles in tests.
pub struct EscalationPass {
    findings: Arc<dyn FindingStore>,
    directory: Arc<dyn ProjectDirectory>,
    notifications: Arc<dyn NotificationStore>,
    email: Arc<dyn EmailSender>,
}

impl EscalationPass {
    pub fn new(
        findings: Arc<dyn FindingStore>,
        directory: Arc<dyn ProjectDirectory>,
        notifications: Arc<dyn NotificationStore>,
        email: Arc<dyn EmailSender>,
    ) -> Self {
        Self {
            findings,
            directory,
            notifications,
            email,
        }
    }

    /// Run one pass at the current instant.
    pub async fn run(&self) -> Result<PassStats, PassError> {
        self.run_at(Utc::now()).await
    }

    /// Run one pass at a fixed instant.
    ///
    /// Taking `now` explicitly keeps the hour arithmetic and the dedup
    /// window deterministic for tests and replay.
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<PassStats, PassError> {
        let overdue = self.findings.overdue_findings(now).await.map_err(|e| {
            error!(error = %e, "overdue findings query failed; aborting pass");
            e
        })?;

        let mut stats = PassStats {
            total_overdue: overdue.len(),
            ..PassStats::default()
        };

        if overdue.is_empty() {
            info!("no overdue findings");
            return Ok(stats);
        }

        info!(count = overdue.len(), "processing overdue findings");

        let evaluator = Evaluator::new(self.notifications.as_ref());
        let resolver = RecipientResolver::new(self.directory.as_ref());
        let dispatcher =
            NotificationDispatcher::new(self.notifications.clone(), self.email.clone());

        for finding in &overdue {
            stats.processed += 1;

            // The store query already filters, but the invariant is cheap
            // to re-check against rows that went stale mid-pass.
            if !finding.is_overdue(now) {
                debug!(finding_id = %finding.id, "finding no longer overdue");
                stats.skipped_below_threshold += 1;
                continue;
            }

            match evaluator.evaluate(finding, now).await {
                Decision::Skip(SkipReason::BelowThreshold) => {
                    stats.skipped_below_threshold += 1;
                }
                Decision::Skip(SkipReason::RecentlyNotified) => {
                    stats.skipped_duplicate += 1;
                }
                Decision::Skip(SkipReason::DedupCheckFailed) => {
                    stats.failed += 1;
                }
                Decision::Escalate {
                    rule,
                    hours_overdue,
                } => {
                    let recipients = resolver
                        .resolve(finding.project_id, rule.escalate_to_role)
                        .await;
                    if recipients.is_empty() {
                        stats.skipped_no_recipients += 1;
                        continue;
                    }

                    let project_name = match self.directory.project_name(finding.project_id).await
                    {
                        Ok(Some(name)) => name,
                        Ok(None) => {
                            debug!(project_id = %finding.project_id, "project name missing");
                            UNKNOWN_PROJECT.to_string()
                        }
                        Err(e) => {
                            debug!(project_id = %finding.project_id, error = %e, "project name lookup failed");
                            UNKNOWN_PROJECT.to_string()
                        }
                    };

                    let outcome = dispatcher
                        .dispatch(
                            finding,
                            rule,
                            hours_overdue,
                            &project_name,
                            &recipients,
                            now,
                        )
                        .await;

                    stats.notifications_inserted += outcome.inserted;
                    stats.emails_sent += outcome.emails_sent;

                    if outcome.inserted > 0 {
                        stats.escalations_sent += 1;
                        info!(
                            finding_id = %finding.id,
                            role = rule.escalate_to_role,
                            kind = %rule.notification_type,
                            hours_overdue,
                            recipients = recipients.len(),
                            "escalation dispatched"
                        );
                    } else {
                        stats.failed += 1;
                    }
                }
            }
        }

        info!(
            processed = stats.processed,
            escalations_sent = stats.escalations_sent,
            notifications_inserted = stats.notifications_inserted,
            emails_sent = stats.emails_sent,
            failed = stats.failed,
            "escalation pass complete"
        );

        Ok(stats)
    }
}
