//! Email dispatch capability for escalation notifications.
//!
//! This crate provides:
//! - `EmailSender` trait for pluggable email backends
//! - HTTP function invoker and SMTP sender implementations
//! - Minijinja template rendering for email bodies

pub mod function;
pub mod smtp;
pub mod templating;
pub mod traits;

pub use function::FunctionEmailSender;
pub use smtp::SmtpEmailSender;
pub use templating::TemplateRenderer;
pub use traits::{EmailData, EmailRequest, EmailSender, NoopEmailSender, NotifyError};
