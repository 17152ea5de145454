//! Error types for arclens.

use thiserror::Error;

/// Result type alias using arclens's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for arclens operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Authority id not present in the current vocabulary snapshot
    #[error("Unknown authority id: {0}")]
    UnknownAuthority(u32),

    /// Reconciliation record not found
    #[error("Record not found: {0}")]
    RecordNotFound(uuid::Uuid),

    /// Cluster not found
    #[error("Cluster not found: {0}")]
    ClusterNotFound(i64),

    /// Page not found
    #[error("Page not found: {0}")]
    PageNotFound(uuid::Uuid),

    /// Inference/generation failed
    #[error("Inference error: {0}")]
    Inference(String),

    /// External service rejected the request for rate-limit reasons
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// Whether this error is in the rate-limit class and eligible for retry.
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, Error::RateLimited(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_unknown_authority() {
        let err = Error::UnknownAuthority(42);
        assert_eq!(err.to_string(), "Unknown authority id: 42");
    }

    #[test]
    fn test_error_display_record_not_found() {
        let id = Uuid::nil();
        let err = Error::RecordNotFound(id);
        assert_eq!(err.to_string(), format!("Record not found: {}", id));
    }

    #[test]
    fn test_error_display_cluster_not_found() {
        let err = Error::ClusterNotFound(7);
        assert_eq!(err.to_string(), "Cluster not found: 7");
    }

    #[test]
    fn test_error_display_inference() {
        let err = Error::Inference("model timeout".to_string());
        assert_eq!(err.to_string(), "Inference error: model timeout");
    }

    #[test]
    fn test_error_display_rate_limited() {
        let err = Error::RateLimited("429".to_string());
        assert_eq!(err.to_string(), "Rate limited: 429");
        assert!(err.is_rate_limit());
    }

    #[test]
    fn test_non_rate_limit_errors_not_retryable() {
        assert!(!Error::Inference("boom".into()).is_rate_limit());
        assert!(!Error::Request("network unreachable".into()).is_rate_limit());
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
