//! Per-finding escalation decision.
//!
//! Computes the overdue duration, selects the applicable tier, and checks
//! the notification store for a recent notification of the same tier. The
//! dedup check fails closed: if the store cannot answer, the finding is
//! skipped for this pass rather than escalated blindly.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use sitewatch_core::Finding;

use crate::rules::{select_rule, EscalationRule, DEDUP_WINDOW_HOURS};
use crate::store::NotificationStore;

/// Outcome of evaluating one overdue finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Emit an escalation for the selected tier.
    Escalate {
        rule: &'static EscalationRule,
        hours_overdue: i64,
    },
    /// Nothing to do for this finding this pass.
    Skip(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Overdue by less than the lowest tier threshold.
    BelowThreshold,
    /// The same tier already fired within the rolling dedup window.
    RecentlyNotified,
    /// The dedup lookup failed; escalating without it risks duplicate spam.
    DedupCheckFailed,
}

/// Decides whether a single overdue finding escalates this pass.
pub struct Evaluator<'a> {
    notifications: &'a dyn NotificationStore,
}

impl<'a> Evaluator<'a> {
    pub fn new(notifications: &'a dyn NotificationStore) -> Self {
        Self { notifications }
    }

    /// Evaluate one finding at the given instant.
    pub async fn evaluate(&self, finding: &Finding, now: DateTime<Utc>) -> Decision {
        let hours_overdue = finding.hours_overdue(now);

        let Some(rule) = select_rule(hours_overdue) else {
            debug!(
                finding_id = %finding.id,
                hours_overdue,
                "below lowest escalation tier"
            );
            return Decision::Skip(SkipReason::BelowThreshold);
        };

        let since = now - Duration::hours(DEDUP_WINDOW_HOURS);
        match self
            .notifications
            .recent_exists(finding.id, rule.notification_type, since)
            .await
        {
            Ok(true) => {
                debug!(
                    finding_id = %finding.id,
                    kind = %rule.notification_type,
                    "tier already notified within the dedup window"
                );
                Decision::Skip(SkipReason::RecentlyNotified)
            }
            Ok(false) => Decision::Escalate {
                rule,
                hours_overdue,
            },
            Err(e) => {
                warn!(
                    finding_id = %finding.id,
                    kind = %rule.notification_type,
                    error = %e,
                    "dedup check failed; skipping finding"
                );
                Decision::Skip(SkipReason::DedupCheckFailed)
            }
        }
    }
}
