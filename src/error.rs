use thiserror::Error;
use uuid::Uuid;

use crate::intake::RejectionReason;

// Main Application Error Type

#[derive(Error, Debug)]
pub enum AppError {
    #[error("File rejected: {0}")]
    Rejected(RejectionReason),
    #[error("Invalid file descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("An analysis run is already in progress: {0}")]
    RunInProgress(Uuid),
    #[error("Configuration Error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization Error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AppError {
    /// Rejections are the only recoverable input errors; the caller is
    /// expected to drop the file and move on.
    pub fn is_rejection(&self) -> bool {
        matches!(self, AppError::Rejected(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_errors_are_recoverable() {
        assert!(AppError::Rejected(RejectionReason::TooLarge).is_rejection());
        assert!(!AppError::InvalidDescriptor("empty name".to_string()).is_rejection());
    }

    #[test]
    fn rejection_message_names_the_reason() {
        let err = AppError::Rejected(RejectionReason::NotAVideo);
        assert_eq!(err.to_string(), "File rejected: file is not a video");
    }
}
