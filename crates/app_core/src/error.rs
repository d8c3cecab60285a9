//! Application error types

use app_store::StoreError;
use thiserror::Error;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Collaborator failures (fatal to the current intent only) =====
    #[error(transparent)]
    Store(#[from] StoreError),

    // ===== Caller mistakes =====
    #[error("Invalid name: {0:?}")]
    InvalidName(String),

    // ===== Startup =====
    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Can the session carry on after this error?
    ///
    /// Storage failures end the intent that raised them, not the session.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, AppError::Store(_) | AppError::InvalidName(_))
    }

    /// Is this a fatal error?
    pub fn is_fatal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Get a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            AppError::Store(StoreError::NotFound(path)) => format!("Not found: {}", path),
            AppError::Store(StoreError::Credentials(msg)) => {
                format!("Cannot connect, check the connection settings: {}", msg)
            }
            AppError::Store(StoreError::S3 { operation, message }) => {
                format!("{} failed: {}", operation, message)
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_are_recoverable() {
        let err: AppError = StoreError::NotFound("bucket/a.txt".into()).into();
        assert!(err.is_recoverable());
        assert_eq!(err.user_message(), "Not found: bucket/a.txt");
    }

    #[test]
    fn test_config_errors_are_fatal() {
        let err = AppError::Config("bucket name is empty".into());
        assert!(err.is_fatal());
        assert_eq!(err.user_message(), "Configuration error: bucket name is empty");
    }

    #[test]
    fn test_s3_message() {
        let err: AppError = StoreError::S3 {
            operation: "CopyObject",
            message: "AccessDenied".into(),
        }
        .into();
        assert_eq!(err.user_message(), "CopyObject failed: AccessDenied");
        assert_eq!(err.to_string(), "S3 CopyObject failed: AccessDenied");
    }
}
