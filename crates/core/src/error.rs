use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("unknown severity: {0}")]
    UnknownSeverity(String),

    #[error("unknown finding status: {0}")]
    UnknownStatus(String),

    #[error("unknown notification type: {0}")]
    UnknownNotificationType(String),
}
