//! Overdue-finding escalation pipeline.
//!
//! This crate provides:
//! - Static tiered rule table with max-threshold selection
//! - Per-finding evaluator with a rolling 24h dedup window
//! - Recipient resolution scoped to project membership and role
//! - Notification + email fan-out with independent failure domains
//! - Batch pass runner with per-finding failure isolation
//!
//! All data access flows through the traits in [`store`], so every stage
//! can be exercised against in-memory doubles.

pub mod dispatcher;
pub mod evaluator;
pub mod pass;
pub mod recipients;
pub mod rules;
pub mod store;

pub use dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use evaluator::{Decision, Evaluator, SkipReason};
pub use pass::{EscalationPass, PassError, PassStats};
pub use recipients::RecipientResolver;
pub use rules::{escalation_level, select_rule, EscalationRule, ESCALATION_RULES};
pub use store::{FindingStore, NotificationStore, ProjectDirectory, StoreError};
