//! Error types for the inbox service.

use thiserror::Error;

/// Result type alias using the inbox Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for inbox operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found, or owned by another team
    #[error("Not found: {0}")]
    NotFound(String),

    /// Inbox item not found in the caller's team
    #[error("Inbox item not found: {0}")]
    InboxNotFound(uuid::Uuid),

    /// Unique constraint would be violated
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Background job dispatch failed
    #[error("Job error: {0}")]
    Job(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl Error {
    /// True for both flavours of "missing in this team".
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_) | Error::InboxNotFound(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("document".to_string());
        assert_eq!(err.to_string(), "Not found: document");
    }

    #[test]
    fn test_error_display_inbox_not_found() {
        let id = Uuid::nil();
        let err = Error::InboxNotFound(id);
        assert_eq!(err.to_string(), format!("Inbox item not found: {}", id));
    }

    #[test]
    fn test_error_display_conflict() {
        let err = Error::Conflict("Tag 'receipts' already exists".to_string());
        assert_eq!(err.to_string(), "Conflict: Tag 'receipts' already exists");
    }

    #[test]
    fn test_error_display_job() {
        let err = Error::Job("queue unavailable".to_string());
        assert_eq!(err.to_string(), "Job error: queue unavailable");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("limit must be positive".to_string());
        assert_eq!(err.to_string(), "Invalid input: limit must be positive");
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("not a member of this team".to_string());
        assert_eq!(err.to_string(), "Forbidden: not a member of this team");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_payload_encoding_failure_is_serialization() {
        let mut bad = std::collections::HashMap::new();
        bad.insert(vec![1u8], "non-string key");
        let err: Error = serde_json::to_value(&bad).unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
        assert!(err.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn test_is_not_found_covers_both_variants() {
        assert!(Error::NotFound("x".into()).is_not_found());
        assert!(Error::InboxNotFound(Uuid::new_v4()).is_not_found());
        assert!(!Error::Forbidden("x".into()).is_not_found());
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
