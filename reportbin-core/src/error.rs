//! Custom error types for reportbin.
//!
//! Explicit enum error types only. No `Box<dyn Error>`, no `anyhow::Result`;
//! every failure a caller can observe is a named variant.

use std::path::PathBuf;

use thiserror::Error;

/// How a failure should be surfaced to whoever invoked the writer or reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller did something wrong. Never retried.
    Client,
    /// No live record under the identifier.
    NotFound,
    /// Backend or internal failure. Logged server-side.
    Server,
}

/// Errors produced by the report writer and reader.
#[derive(Debug, Error)]
pub enum ReportError {
    // =========================================================================
    // Client Errors
    // =========================================================================
    #[error("Report ID is required")]
    MissingId,

    #[error("Payload could not be serialized: {source}")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    #[error("Payload is not a single JSON document: {source}")]
    InvalidJson {
        #[source]
        source: serde_json::Error,
    },

    // =========================================================================
    // Lookup
    // =========================================================================
    #[error("Report not found or has expired: {id}")]
    NotFound { id: String },

    // =========================================================================
    // Server Errors
    // =========================================================================
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Stored report {id} could not be decoded: {source}")]
    CorruptRecord {
        id: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ReportError {
    /// Classify the error for status mapping and logging.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingId | Self::Serialization { .. } | Self::InvalidJson { .. } => {
                ErrorClass::Client
            }
            Self::NotFound { .. } => ErrorClass::NotFound,
            Self::Store(_) | Self::CorruptRecord { .. } => ErrorClass::Server,
        }
    }
}

/// Errors reported by a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Backend unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Backend rejected the command (status {status}): {reason}")]
    Rejected { status: u16, reason: String },

    #[error("Unexpected backend reply: {reason}")]
    Protocol { reason: String },
}

/// Configuration errors. Any of these prevents startup.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    #[error("IO error: {context} - {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration parse error: {message}")]
    Parse { message: String },

    #[error("Invalid field value: {field} = {value} - {reason}")]
    InvalidFieldValue {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Missing required field: {field} in {context}")]
    MissingRequiredField {
        field: &'static str,
        context: &'static str,
    },
}

/// Result type alias using ReportError.
pub type ReportResult<T> = Result<T, ReportError>;

/// Result type alias using ConfigError.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_id_is_client_error() {
        assert_eq!(ReportError::MissingId.class(), ErrorClass::Client);
    }

    #[test]
    fn test_not_found_is_distinct_class() {
        let err = ReportError::NotFound {
            id: "abc12345".to_string(),
        };
        assert_eq!(err.class(), ErrorClass::NotFound);
        assert!(err.to_string().contains("abc12345"));
    }

    #[test]
    fn test_store_error_chain() {
        let store_err = StoreError::Unavailable {
            reason: "connection refused".to_string(),
        };
        let err: ReportError = store_err.into();
        assert!(matches!(err, ReportError::Store(_)));
        assert_eq!(err.class(), ErrorClass::Server);
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn test_corrupt_record_is_server_error() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = ReportError::CorruptRecord {
            id: "deadbeef".to_string(),
            source,
        };
        assert_eq!(err.class(), ErrorClass::Server);
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::InvalidFieldValue {
            field: "ttl_secs",
            value: "0".to_string(),
            reason: "TTL must be at least 1 second".to_string(),
        };
        assert!(err.to_string().contains("ttl_secs"));
    }
}
