//! Error types for do-resource
//!
//! This module defines the error hierarchy for the whole crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for do-resource
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
    // Authentication Errors
    // ============================================================================
    #[error("No API token provided and DO_TOKEN is not set")]
    AuthenticationMissing,

    // ============================================================================
    // Remote Errors (classified from status codes)
    // ============================================================================
    #[error("Resource not found: {message}")]
    NotFound { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    /// 400/422 on every verb, 409/429 on write verbs, or a request rejected
    /// locally before it was sent (`status` is `None` then).
    #[error("Client request error: {message}")]
    ClientRequest { status: Option<u16>, message: String },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Materialization Errors
    // ============================================================================
    #[error("Invalid timestamp '{value}' for field '{field}'")]
    Timestamp { field: String, value: String },

    #[error("Invalid rule: {message}")]
    InvalidRule { message: String },

    #[error("Resource '{kind}' has no field '{field}'")]
    UnknownField { kind: String, field: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

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

    /// Create a client request error that was raised locally
    pub fn client_request(message: impl Into<String>) -> Self {
        Self::ClientRequest {
            status: None,
            message: message.into(),
        }
    }

    /// Create an "operation unsupported" error for a resource kind
    pub fn unsupported(kind: &str, operation: &str) -> Self {
        Self::client_request(format!("Resource '{kind}' does not support {operation}"))
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a timestamp parse error
    pub fn timestamp(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Timestamp {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Create an invalid rule error
    pub fn invalid_rule(message: impl Into<String>) -> Self {
        Self::InvalidRule {
            message: message.into(),
        }
    }

    /// Create an unknown field error
    pub fn unknown_field(kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::UnknownField {
            kind: kind.into(),
            field: field.into(),
        }
    }

    /// Check if this error means the remote object does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP status carried by this error, if it came from a response
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::Forbidden { .. } => Some(403),
            Error::ClientRequest { status, .. } => *status,
            Error::Server { status, .. } | Error::HttpStatus { status, .. } => Some(*status),
            Error::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Result type alias for do-resource
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

        let err = Error::http_status(401, "Unauthorized");
        assert_eq!(err.to_string(), "HTTP 401: Unauthorized");

        let err = Error::unsupported("droplet", "updating");
        assert_eq!(
            err.to_string(),
            "Client request error: Resource 'droplet' does not support updating"
        );
    }

    #[test]
    fn test_status() {
        assert_eq!(
            Error::NotFound {
                message: String::new()
            }
            .status(),
            Some(404)
        );
        assert_eq!(Error::client_request("local").status(), None);
        assert_eq!(
            Error::Server {
                status: 503,
                message: String::new()
            }
            .status(),
            Some(503)
        );
        assert_eq!(Error::AuthenticationMissing.status(), None);
    }

    #[test]
    fn test_is_not_found() {
        assert!(Error::NotFound {
            message: "gone".into()
        }
        .is_not_found());
        assert!(!Error::Forbidden {
            message: "no".into()
        }
        .is_not_found());
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
