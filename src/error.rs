//! Error types for bucket-pager
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for bucket-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Parameter Errors
    // ============================================================================
    #[error("Missing required parameter in input: \"{name}\"")]
    MissingParameter { name: String },

    #[error("Invalid value for parameter \"{name}\": {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Unknown parameter in input: \"{name}\", must be one of: {valid}")]
    UnknownParameter { name: String, valid: String },

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Operation cannot be paginated: {name} (available: {available})")]
    UnknownPaginator { name: String, available: String },

    #[error("Invalid StartingToken: {message}")]
    InvalidStartingToken { message: String },

    #[error("The same next token was received twice from {operation}: {token}")]
    RepeatedToken { operation: String, token: String },

    #[error("Page {page} has no '{key}' key")]
    MissingResponseKey { key: String, page: u64 },

    #[error("Page {page} key '{key}' holds {found}, expected a list")]
    InvalidResponseKey {
        key: String,
        page: u64,
        found: String,
    },

    // ============================================================================
    // Service Errors
    // ============================================================================
    #[error("{operation} failed: {message}")]
    Service { operation: String, message: String },

    #[error("The specified bucket does not exist: {bucket}")]
    NoSuchBucket { bucket: String },

    #[error("Object store error: {0}")]
    Store(#[from] object_store::Error),

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing parameter error
    pub fn missing_param(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// Create an invalid parameter error
    pub fn invalid_param(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an invalid starting token error
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidStartingToken {
            message: message.into(),
        }
    }

    /// Create a service error for an operation
    pub fn service(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Whether the error came from reading a page's contents rather than
    /// from talking to the service
    pub fn is_lookup_error(&self) -> bool {
        matches!(
            self,
            Error::MissingResponseKey { .. } | Error::InvalidResponseKey { .. }
        )
    }
}

/// Result type alias for bucket-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_param("Bucket");
        assert_eq!(
            err.to_string(),
            "Missing required parameter in input: \"Bucket\""
        );

        let err = Error::MissingResponseKey {
            key: "Contents".to_string(),
            page: 3,
        };
        assert_eq!(err.to_string(), "Page 3 has no 'Contents' key");
    }

    #[test]
    fn test_is_lookup_error() {
        assert!(Error::MissingResponseKey {
            key: "Contents".to_string(),
            page: 1
        }
        .is_lookup_error());
        assert!(Error::InvalidResponseKey {
            key: "Contents".to_string(),
            page: 1,
            found: "a string".to_string()
        }
        .is_lookup_error());

        assert!(!Error::service("list_objects", "boom").is_lookup_error());
        assert!(!Error::config("test").is_lookup_error());
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.context("outer");
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
