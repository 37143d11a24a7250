//! Error types used throughout the client

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for Nimbus transport and resource operations
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "detail")]
pub enum NimbusError {
    /// The API answered with a non-2xx status and a structured error body
    #[error("API error {code} (status {status}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Option<serde_json::Value>,
        correlation_id: Option<String>,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl NimbusError {
    /// API error code when this error came from a structured error body
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    /// HTTP status when this error came from an API response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for Nimbus operations
pub type Result<T> = std::result::Result<T, NimbusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_code_and_status() {
        let err = NimbusError::Api {
            status: 422,
            code: "invalid_input".into(),
            message: "invalid id".into(),
            details: None,
            correlation_id: Some("abc".into()),
        };

        assert_eq!(err.api_code(), Some("invalid_input"));
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.to_string(), "API error invalid_input (status 422): invalid id");
    }

    #[test]
    fn non_api_errors_have_no_code() {
        let err = NimbusError::Network("connection refused".into());
        assert_eq!(err.api_code(), None);
        assert_eq!(err.status(), None);
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(NimbusError::Config("missing token".into())).unwrap();
        assert_eq!(json["type"], "Config");
        assert_eq!(json["detail"], "missing token");
    }
}
