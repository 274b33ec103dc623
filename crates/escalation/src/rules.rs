//! Tiered escalation rule table.
//!
//! A fixed, ordered set of thresholds mapping hours overdue to the role
//! that gets notified and the notification type emitted. The table is a
//! constant: tiers are organizational policy, not per-project data.

use serde::Serialize;

use sitewatch_core::NotificationType;

// ── Roles ───────────────────────────────────────────────────────────

pub const GC_PROJECT_MANAGER: &str = "gc_project_manager";
pub const GC_SITE_DIRECTOR: &str = "gc_site_director";
pub const CLIENT_PROJECT_MANAGER: &str = "client_project_manager";

/// Rolling window within which a tier fires at most once per finding.
pub const DEDUP_WINDOW_HOURS: i64 = 24;

// ── Rule table ──────────────────────────────────────────────────────

/// One escalation tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EscalationRule {
    /// Threshold in whole hours overdue.
    pub hours_overdue: i64,
    /// Role notified when this tier applies.
    pub escalate_to_role: &'static str,
    /// Notification type emitted for this tier.
    pub notification_type: NotificationType,
}

/// Tiers ordered by threshold ascending.
pub static ESCALATION_RULES: [EscalationRule; 3] = [
    EscalationRule {
        hours_overdue: 24,
        escalate_to_role: GC_PROJECT_MANAGER,
        notification_type: NotificationType::DeadlineReminder,
    },
    EscalationRule {
        hours_overdue: 48,
        escalate_to_role: GC_SITE_DIRECTOR,
        notification_type: NotificationType::OverdueAlert,
    },
    EscalationRule {
        hours_overdue: 72,
        escalate_to_role: CLIENT_PROJECT_MANAGER,
        notification_type: NotificationType::Escalation,
    },
];

/// Select the applicable tier for an overdue duration.
///
/// The winner is the rule with the **largest** threshold not exceeding
/// `hours_overdue` — the most severe applicable tier, not the first match
/// in table order. Under 24 hours no tier applies.
pub fn select_rule(hours_overdue: i64) -> Option<&'static EscalationRule> {
    ESCALATION_RULES
        .iter()
        .filter(|rule| hours_overdue >= rule.hours_overdue)
        .max_by_key(|rule| rule.hours_overdue)
}

// ── Derived display values ──────────────────────────────────────────

/// Escalation level shown in titles and emails: days overdue, rounded up.
/// Derived from the actual overdue hours, never stored.
pub fn escalation_level(hours_overdue: i64) -> i64 {
    // Equivalent to i64::div_ceil(24), which is unstable on this toolchain:
    // round the quotient toward positive infinity.
    let d = hours_overdue / 24;
    let r = hours_overdue % 24;
    if r > 0 { d + 1 } else { d }
}

/// Notification title for a given escalation level.
pub fn escalation_title(level: i64) -> String {
    let unit = if level == 1 { "Day" } else { "Days" };
    format!("Overdue Finding Escalation - {level} {unit}")
}

/// Notification message for an overdue finding.
pub fn escalation_message(finding_title: &str, hours_overdue: i64) -> String {
    format!(
        "ESCALATION: Finding \"{finding_title}\" is {hours_overdue} hours overdue and requires immediate attention."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_first_tier_selects_nothing() {
        assert_eq!(select_rule(0), None);
        assert_eq!(select_rule(10), None);
        assert_eq!(select_rule(23), None);
    }

    #[test]
    fn first_tier_window() {
        for hours in [24, 30, 47] {
            let rule = select_rule(hours).unwrap();
            assert_eq!(rule.escalate_to_role, GC_PROJECT_MANAGER);
            assert_eq!(rule.notification_type, NotificationType::DeadlineReminder);
        }
    }

    #[test]
    fn second_tier_window() {
        for hours in [48, 50, 71] {
            let rule = select_rule(hours).unwrap();
            assert_eq!(rule.escalate_to_role, GC_SITE_DIRECTOR);
            assert_eq!(rule.notification_type, NotificationType::OverdueAlert);
        }
    }

    #[test]
    fn third_tier_is_open_ended() {
        for hours in [72, 80, 500] {
            let rule = select_rule(hours).unwrap();
            assert_eq!(rule.escalate_to_role, CLIENT_PROJECT_MANAGER);
            assert_eq!(rule.notification_type, NotificationType::Escalation);
        }
    }

    #[test]
    fn selection_is_max_threshold_not_first_match() {
        // At 100h every tier's threshold qualifies; the 24h rule comes first
        // in table order but the 72h rule must win.
        let qualifying: Vec<i64> = ESCALATION_RULES
            .iter()
            .filter(|r| 100 >= r.hours_overdue)
            .map(|r| r.hours_overdue)
            .collect();
        assert_eq!(qualifying, vec![24, 48, 72]);
        assert_eq!(select_rule(100).unwrap().hours_overdue, 72);
    }

    #[test]
    fn level_is_ceiling_of_days() {
        assert_eq!(escalation_level(24), 1);
        assert_eq!(escalation_level(25), 2);
        assert_eq!(escalation_level(48), 2);
        assert_eq!(escalation_level(49), 3);
        assert_eq!(escalation_level(50), 3);
        assert_eq!(escalation_level(72), 3);
        assert_eq!(escalation_level(96), 4);
    }

    #[test]
    fn title_pluralizes() {
        assert_eq!(escalation_title(1), "Overdue Finding Escalation - 1 Day");
        assert_eq!(escalation_title(3), "Overdue Finding Escalation - 3 Days");
    }

    #[test]
    fn message_includes_title_and_hours() {
        let msg = escalation_message("Exposed rebar", 50);
        assert_eq!(
            msg,
            "ESCALATION: Finding \"Exposed rebar\" is 50 hours overdue and requires immediate attention."
        );
    }
}
