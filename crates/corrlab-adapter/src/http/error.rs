/*
[INPUT]:  Error sources (HTTP transport, API statuses, serialization)
[OUTPUT]: Structured error types with classification helpers
[POS]:    Error handling layer - unified error types for entire crate
[UPDATE]: When adding new error sources or improving error messages
*/

use reqwest::StatusCode;
use thiserror::Error;

/// Main error type for the analysis service adapter
#[derive(Error, Debug)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, TLS, ...)
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server no longer knows the task (result endpoint returned 404)
    #[error("analysis session expired: {message}")]
    SessionExpired { message: String },

    /// Server returned an unexpected non-success status
    #[error("server error (HTTP {code}): {message}")]
    Server { code: u16, message: String },

    /// Serialization/deserialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// URL parsing failed
    #[error("invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Check if the error is a transport-level failure
    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Http(_))
    }

    /// Check if the error means the server-side task is gone
    pub fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired { .. })
    }

    /// Create a server error from status code and response body
    pub fn server_error(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        } else {
            message
        };
        ApiError::Server {
            code: status.as_u16(),
            message,
        }
    }
}

/// Result type alias for adapter operations
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_creation() {
        let err = ApiError::server_error(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            ApiError::Server { code, message } => {
                assert_eq!(code, 502);
                assert_eq!(message, "upstream down");
            }
            _ => panic!("Expected Server error variant"),
        }
    }

    #[test]
    fn test_server_error_empty_body_uses_canonical_reason() {
        let err = ApiError::server_error(StatusCode::INTERNAL_SERVER_ERROR, "");
        match err {
            ApiError::Server { code, message } => {
                assert_eq!(code, 500);
                assert_eq!(message, "Internal Server Error");
            }
            _ => panic!("Expected Server error variant"),
        }
    }

    #[test]
    fn test_error_classification() {
        let expired = ApiError::SessionExpired {
            message: "task not found".to_string(),
        };
        assert!(expired.is_session_expired());
        assert!(!expired.is_transport());

        let server = ApiError::server_error(StatusCode::BAD_REQUEST, "bad window");
        assert!(!server.is_session_expired());
        assert!(!server.is_transport());
    }
}
