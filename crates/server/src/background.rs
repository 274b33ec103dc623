//! Cron-driven escalation scheduler.
//!
//! Ticks on a fixed interval and fires one escalation pass whenever a cron
//! tick falls between the previous run and now. Overlapping passes cannot
//! happen within this loop (the pass is awaited before the next tick is
//! considered); the manual trigger endpoint stays independent.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use cron::Schedule;
use tracing::{error, info};

use crate::state::AppState;

const TICK_INTERVAL: Duration = Duration::from_secs(30);

/// Normalize a 5-field cron expression to 6-field by prepending "0 " for seconds.
///
/// The `cron` crate requires 6 fields: `sec min hour day-of-month month day-of-week`.
/// Configuration uses standard 5-field cron.
fn normalize_cron(cron_5field: &str) -> String {
    let trimmed = cron_5field.trim();
    if trimmed.split_whitespace().count() == 5 {
        format!("0 {}", trimmed)
    } else {
        trimmed.to_string()
    }
}

/// Whether a scheduled tick falls in `(last_run, now]`.
fn is_due(schedule: &Schedule, now: DateTime<Utc>, last_run: DateTime<Utc>) -> bool {
    schedule
        .after(&last_run)
        .next()
        .map(|next| next <= now)
        .unwrap_or(false)
}

/// Spawn the scheduler loop if a cron expression is configured.
///
/// Returns `None` (and logs) when scheduling is disabled or the expression
/// does not parse; the HTTP trigger still works either way.
pub fn spawn_scheduler(state: Arc<AppState>) -> Option<tokio::task::JoinHandle<()>> {
    let expr = state.config.escalation.cron.clone()?;
    let normalized = normalize_cron(&expr);

    let schedule = match Schedule::from_str(&normalized) {
        Ok(schedule) => schedule,
        Err(e) => {
            error!(cron = %expr, error = %e, "invalid cron expression; scheduler disabled");
            return None;
        }
    };

    info!(cron = %normalized, "escalation scheduler enabled");

    Some(tokio::spawn(async move {
        // Start from boot time so a just-missed tick doesn't fire immediately.
        let mut last_run = Utc::now();
        let mut ticker = tokio::time::interval(TICK_INTERVAL);

        loop {
            ticker.tick().await;
            let now = Utc::now();
            if !is_due(&schedule, now, last_run) {
                continue;
            }
            last_run = now;

            let timeout = Duration::from_secs(state.config.escalation.pass_timeout_secs);
            match tokio::time::timeout(timeout, state.pass.run()).await {
                Ok(Ok(stats)) => info!(
                    total_overdue = stats.total_overdue,
                    escalations_sent = stats.escalations_sent,
                    failed = stats.failed,
                    "scheduled escalation pass complete"
                ),
                Ok(Err(e)) => error!(error = %e, "scheduled escalation pass failed"),
                Err(_) => error!(
                    timeout_secs = timeout.as_secs(),
                    "scheduled escalation pass timed out"
                ),
            }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_cron_5_to_6_fields() {
        assert_eq!(normalize_cron("*/15 * * * *"), "0 */15 * * * *");
        assert_eq!(normalize_cron("0 6 * * 1-5"), "0 0 6 * * 1-5");
    }

    #[test]
    fn normalize_cron_already_6_fields() {
        assert_eq!(normalize_cron("0 */15 * * * *"), "0 */15 * * * *");
    }

    #[test]
    fn normalize_cron_trims_whitespace() {
        assert_eq!(normalize_cron("  0 * * * *  "), "0 0 * * * *");
    }

    #[test]
    fn is_due_when_tick_passed() {
        // Hourly schedule.
        let schedule = Schedule::from_str("0 0 * * * *").unwrap();
        let last = chrono::DateTime::parse_from_rfc3339("2026-03-10T09:59:00Z")
            .unwrap()
            .with_timezone(&Utc);

        let before_tick = last + chrono::Duration::seconds(30);
        assert!(!is_due(&schedule, before_tick, last));

        let after_tick = last + chrono::Duration::minutes(2);
        assert!(is_due(&schedule, after_tick, last));
    }

    #[test]
    fn is_due_not_retriggered_after_run() {
        let schedule = Schedule::from_str("0 0 * * * *").unwrap();
        // Ran just after the 10:00 tick; nothing due until 11:00.
        let last = chrono::DateTime::parse_from_rfc3339("2026-03-10T10:00:30Z")
            .unwrap()
            .with_timezone(&Utc);
        let later = last + chrono::Duration::minutes(30);
        assert!(!is_due(&schedule, later, last));
    }
}
