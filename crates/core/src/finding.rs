//! Audit finding entity and its overdue arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;

// ── Severity ──────────────────────────────────────────────────

/// Finding severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(DomainError::UnknownSeverity(other.to_string())),
        }
    }
}

// ── Status ────────────────────────────────────────────────────

/// Finding lifecycle status. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Open,
    Assigned,
    InProgress,
    CompletedPendingApproval,
    Closed,
}

impl FindingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Open => "open",
            FindingStatus::Assigned => "assigned",
            FindingStatus::InProgress => "in_progress",
            FindingStatus::CompletedPendingApproval => "completed_pending_approval",
            FindingStatus::Closed => "closed",
        }
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, FindingStatus::Closed)
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FindingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(FindingStatus::Open),
            "assigned" => Ok(FindingStatus::Assigned),
            "in_progress" => Ok(FindingStatus::InProgress),
            "completed_pending_approval" => Ok(FindingStatus::CompletedPendingApproval),
            "closed" => Ok(FindingStatus::Closed),
            other => Err(DomainError::UnknownStatus(other.to_string())),
        }
    }
}

// ── Finding ───────────────────────────────────────────────────

/// An audit finding under tracking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub id: Uuid,
    pub title: String,
    pub severity: Severity,
    pub due_date: DateTime<Utc>,
    pub status: FindingStatus,
    pub project_id: Uuid,
}

impl Finding {
    /// A finding is overdue iff its due date has passed and it is not closed.
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.due_date < now && !self.status.is_closed()
    }

    /// Whole hours elapsed since the due date (floor), clamped to zero
    /// for findings not yet due.
    pub fn hours_overdue(&self, now: DateTime<Utc>) -> i64 {
        (now - self.due_date).num_hours().max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn finding(status: FindingStatus, due_offset_hours: i64, now: DateTime<Utc>) -> Finding {
        Finding {
            id: Uuid::new_v4(),
            title: "Blocked fire exit".to_string(),
            severity: Severity::High,
            due_date: now - Duration::hours(due_offset_hours),
            status,
            project_id: Uuid::new_v4(),
        }
    }

    #[test]
    fn severity_is_ordinal() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_round_trips() {
        for s in ["low", "medium", "high", "critical"] {
            assert_eq!(s.parse::<Severity>().unwrap().to_string(), s);
        }
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn status_round_trips() {
        for s in [
            "open",
            "assigned",
            "in_progress",
            "completed_pending_approval",
            "closed",
        ] {
            assert_eq!(s.parse::<FindingStatus>().unwrap().to_string(), s);
        }
        assert!("done".parse::<FindingStatus>().is_err());
    }

    #[test]
    fn overdue_requires_past_due_and_not_closed() {
        let now = Utc::now();
        assert!(finding(FindingStatus::Open, 1, now).is_overdue(now));
        assert!(finding(FindingStatus::InProgress, 100, now).is_overdue(now));
        assert!(!finding(FindingStatus::Closed, 100, now).is_overdue(now));
        assert!(!finding(FindingStatus::Open, -1, now).is_overdue(now));
    }

    #[test]
    fn hours_overdue_floors() {
        let now = Utc::now();
        let f = Finding {
            due_date: now - Duration::minutes(50 * 60 + 59),
            ..finding(FindingStatus::Open, 0, now)
        };
        assert_eq!(f.hours_overdue(now), 50);
    }

    #[test]
    fn hours_overdue_clamps_future_due_dates() {
        let now = Utc::now();
        assert_eq!(finding(FindingStatus::Open, -5, now).hours_overdue(now), 0);
    }
}
