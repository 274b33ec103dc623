//! Postgres implementations of the escalation store traits.
//!
//! Each store wraps a shared [`sqlx::PgPool`]. Enum-valued columns are
//! TEXT in the schema and parsed through the core `FromStr` impls during
//! row conversion, so a bad value surfaces as a decode error instead of
//! a silent mismatch.

pub mod directory;
pub mod findings;
pub mod notifications;

pub use directory::PgProjectDirectory;
pub use findings::PgFindingStore;
pub use notifications::PgNotificationStore;

use sitewatch_escalation::StoreError;

pub(crate) fn query_error(e: sqlx::Error) -> StoreError {
    StoreError::Query(e.to_string())
}
