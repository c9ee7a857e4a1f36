//! HTTP client errors.

use serde::Deserialize;
use thiserror::Error;

use crate::storage::StorageError;

/// Convenience alias for API call results.
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors surfaced by [`ApiClient`](super::ApiClient) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the session token (HTTP 401). Storage has already
    /// been cleared when this is returned.
    #[error("Unauthorized: {}", .message.as_deref().unwrap_or("session rejected"))]
    Unauthorized { message: Option<String> },

    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("request failed"))]
    Status { status: u16, message: Option<String> },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Multipart error: {0}")]
    Multipart(String),
}

impl ApiError {
    /// Server-provided message, when the error carried one.
    pub fn message(&self) -> Option<&str> {
        match self {
            ApiError::Unauthorized { message } | ApiError::Status { message, .. } => {
                message.as_deref()
            }
            _ => None,
        }
    }

    /// HTTP status, for errors that came from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized { .. } => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized { .. })
    }
}

/// `{ "message": "..." }` error payload.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<serde_json::Value>,
}

/// Pull a displayable message out of an error response body.
pub(crate) fn extract_message(body: &[u8]) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_slice(body).ok()?;
    match parsed.message? {
        serde_json::Value::String(s) if !s.is_empty() => Some(s),
        serde_json::Value::Array(items) => {
            let joined = items
                .iter()
                .filter_map(|v| v.as_str())
                .collect::<Vec<_>>()
                .join("; ");
            (!joined.is_empty()).then_some(joined)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_string_message() {
        assert_eq!(
            extract_message(br#"{"message":"Email already taken"}"#).as_deref(),
            Some("Email already taken")
        );
    }

    #[test]
    fn joins_validation_message_lists() {
        assert_eq!(
            extract_message(br#"{"message":["email must be an email","password too short"]}"#)
                .as_deref(),
            Some("email must be an email; password too short")
        );
    }

    #[test]
    fn non_json_body_has_no_message() {
        assert_eq!(extract_message(b"<html>502</html>"), None);
        assert_eq!(extract_message(br#"{"error":"x"}"#), None);
    }

    #[test]
    fn display_falls_back_without_message() {
        let e = ApiError::Status {
            status: 500,
            message: None,
        };
        assert_eq!(e.to_string(), "HTTP 500: request failed");
        assert_eq!(e.status(), Some(500));
    }
}
