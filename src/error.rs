//! Error types for the TOPdesk MCP server.
//!
//! This module defines `TopdeskError`, the unified error type used throughout
//! the crate. There are two classes of failure: configuration faults raised at
//! startup, and operation faults raised by the TOPdesk API at call time.
//!
//! # Security
//!
//! Error messages are sanitized so the TOPdesk password never ends up
//! in logs or tool responses. Use `sanitize_message()` when building messages
//! from external sources.

use std::time::Duration;
use thiserror::Error;

/// The three settings required to reach TOPdesk.
pub const REQUIRED_SETTINGS: [&str; 3] = ["TOPDESK_URL", "TOPDESK_USERNAME", "TOPDESK_PASSWORD"];

/// Unified error type for all TOPdesk operations.
#[derive(Error, Debug)]
pub enum TopdeskError {
    /// Configuration error - missing or invalid environment variables.
    #[error("configuration error: {0}")]
    Config(String),

    /// HTTP request failed during transmission.
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// HTTP client initialization failed.
    #[error("HTTP client error: {0}")]
    HttpClient(#[source] reqwest::Error),

    /// HTTP response returned a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code returned.
        status: reqwest::StatusCode,
        /// The response body, usually a TOPdesk error message list.
        body: String,
    },

    /// Request timed out.
    #[error("request timed out after {duration:?} ({operation})")]
    Timeout {
        /// How long we waited before timing out.
        duration: Duration,
        /// The operation that timed out.
        operation: String,
    },

    /// JSON serialization or deserialization failed.
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Requested resource was not found.
    #[error("not found: {resource}")]
    NotFound {
        /// The API path of the resource that was not found.
        resource: String,
    },

    /// Authentication failed - likely a wrong username or application password.
    #[error("authentication failed - check TOPDESK_USERNAME and TOPDESK_PASSWORD")]
    Authentication,

    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(String),
}

impl TopdeskError {
    /// Creates the configuration error reported when credentials are absent.
    ///
    /// The message always names all three required settings, followed by the
    /// ones that were actually missing.
    pub fn missing_credentials(missing: &[&str]) -> Self {
        TopdeskError::Config(format!(
            "missing TOPdesk credentials. Set {}, {}, and {} as environment variables (missing: {})",
            REQUIRED_SETTINGS[0],
            REQUIRED_SETTINGS[1],
            REQUIRED_SETTINGS[2],
            missing.join(", ")
        ))
    }

    /// Creates a configuration error for an invalid value.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        TopdeskError::Config(message.into())
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        TopdeskError::Validation(message.into())
    }

    /// Creates a not found error for an API path.
    pub fn not_found(resource: impl Into<String>) -> Self {
        TopdeskError::NotFound {
            resource: resource.into(),
        }
    }

    /// Creates a timeout error.
    pub fn timeout(duration: Duration, operation: impl Into<String>) -> Self {
        TopdeskError::Timeout {
            duration,
            operation: operation.into(),
        }
    }

    /// Returns true if this error was raised before any tool could be served.
    #[must_use]
    pub fn is_config(&self) -> bool {
        matches!(self, TopdeskError::Config(_))
    }

    /// Replaces every occurrence of `secret` in `message` with `[REDACTED]`.
    #[must_use]
    pub fn sanitize_message(message: &str, secret: &str) -> String {
        if secret.is_empty() {
            return message.to_string();
        }
        message.replace(secret, "[REDACTED]")
    }

    /// Creates a sanitized version of this error's display message.
    #[must_use]
    pub fn sanitized_display(&self, secret: &str) -> String {
        Self::sanitize_message(&self.to_string(), secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credentials_names_all_settings() {
        let err = TopdeskError::missing_credentials(&["TOPDESK_PASSWORD"]);
        let msg = err.to_string();
        for name in REQUIRED_SETTINGS {
            assert!(msg.contains(name), "{msg} should mention {name}");
        }
        assert!(msg.contains("missing: TOPDESK_PASSWORD"));
        assert!(err.is_config());
    }

    #[test]
    fn test_validation_error() {
        let err = TopdeskError::validation("query is required");
        assert_eq!(err.to_string(), "validation error: query is required");
        assert!(!err.is_config());
    }

    #[test]
    fn test_not_found_error() {
        let err = TopdeskError::not_found("/incidents/number/I%202301%20001");
        assert_eq!(err.to_string(), "not found: /incidents/number/I%202301%20001");
    }

    #[test]
    fn test_timeout_error() {
        let err = TopdeskError::timeout(Duration::from_secs(30), "GET /incidents");
        let msg = err.to_string();
        assert!(msg.contains("timed out"));
        assert!(msg.contains("30s"));
        assert!(msg.contains("GET /incidents"));
    }

    #[test]
    fn test_sanitize_message_removes_password() {
        let password = "hunter2-app-password";
        let message = format!("login as operator with {} failed", password);
        let sanitized = TopdeskError::sanitize_message(&message, password);
        assert!(!sanitized.contains(password));
        assert!(sanitized.contains("[REDACTED]"));
    }

    #[test]
    fn test_sanitize_message_empty_secret() {
        let message = "Some error message";
        assert_eq!(TopdeskError::sanitize_message(message, ""), message);
    }

    #[test]
    fn test_sanitized_display_keeps_unrelated_text() {
        let err = TopdeskError::HttpStatus {
            status: reqwest::StatusCode::BAD_REQUEST,
            body: r#"[{"message":"Field 'briefDescription' is too long"}]"#.to_string(),
        };
        let shown = err.sanitized_display("not_present");
        assert_eq!(shown, err.to_string());
        assert!(shown.starts_with("HTTP 400 Bad Request"));
    }
}
