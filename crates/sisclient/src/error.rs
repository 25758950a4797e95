//! Error types shared by the HTTP client core and the mock data service.

use serde_json::Value;
use thiserror::Error;

/// Errors surfaced by every backend operation.
///
/// The refresh gate fans a single failure out to every queued request, so the
/// type is `Clone` and transport errors are stored as rendered messages.
#[derive(Debug, Error, Clone)]
pub enum ApiError {
    /// HTTP 403 or the mock equivalent. Terminal, never retried.
    #[error("{message}")]
    PermissionDenied { message: String },

    /// HTTP 401 that survived the refresh protocol.
    #[error("{message}")]
    Unauthorized { message: String },

    /// Server-reported validation or field errors.
    #[error("{message}")]
    Validation { message: String },

    /// An id-keyed mock operation targeted a missing record.
    #[error("{resource} not found")]
    NotFound { resource: &'static str },

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    #[error("No refresh token available")]
    MissingRefreshToken,

    /// Transport-level failure.
    #[error("Network error: {message}")]
    Network { message: String },

    /// Response body could not be decoded into the expected shape.
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Token storage could not be read or written.
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Invalid client configuration (e.g. a malformed base URL).
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ApiError {
    /// Builds a permission error from a 403 response body.
    ///
    /// Message precedence: `detail`, then `message`, then a generic fallback.
    pub fn permission_denied(body: &Value) -> Self {
        ApiError::PermissionDenied {
            message: extract_message(body)
                .unwrap_or_else(|| "Permission denied".to_string()),
        }
    }

    /// Builds an authentication error from a 401 response body.
    pub fn unauthorized(body: &Value) -> Self {
        ApiError::Unauthorized {
            message: extract_message(body)
                .or_else(|| join_field_errors(body))
                .unwrap_or_else(|| "Authentication required".to_string()),
        }
    }

    /// Builds a validation error from any other error response body.
    ///
    /// Message precedence: `detail`, then `message`, then all `key: value`
    /// pairs of the body joined with commas.
    pub fn validation(body: &Value) -> Self {
        ApiError::Validation {
            message: extract_message(body)
                .or_else(|| join_field_errors(body))
                .unwrap_or_else(|| "Request failed".to_string()),
        }
    }
}

/// Extracts `detail` or `message` from an error body, in that order.
fn extract_message(body: &Value) -> Option<String> {
    for key in ["detail", "message"] {
        if let Some(text) = body.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }
    None
}

/// Joins the fields of a flat error object into `key: value, key: value`.
fn join_field_errors(body: &Value) -> Option<String> {
    let map = body.as_object()?;
    if map.is_empty() {
        return None;
    }
    let joined = map
        .iter()
        .map(|(key, value)| match value {
            Value::String(text) => format!("{key}: {text}"),
            other => format!("{key}: {other}"),
        })
        .collect::<Vec<_>>()
        .join(", ");
    Some(joined)
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode {
                message: err.to_string(),
            }
        } else {
            ApiError::Network {
                message: err.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Storage {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ApiError {
    fn from(err: url::ParseError) -> Self {
        ApiError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_takes_precedence_over_message() {
        let err = ApiError::validation(&json!({
            "detail": "Bad detail",
            "message": "Bad request"
        }));
        assert_eq!(err.to_string(), "Bad detail");
    }

    #[test]
    fn message_used_when_detail_absent() {
        let err = ApiError::validation(&json!({ "message": "Bad request" }));
        assert_eq!(err.to_string(), "Bad request");
    }

    #[test]
    fn field_errors_joined_with_commas() {
        let err = ApiError::validation(&json!({ "field": "is required" }));
        assert_eq!(err.to_string(), "field: is required");

        let err = ApiError::validation(&json!({
            "email": "invalid",
            "username": "taken"
        }));
        assert_eq!(err.to_string(), "email: invalid, username: taken");
    }

    #[test]
    fn permission_error_falls_back_to_generic_message() {
        let err = ApiError::permission_denied(&json!({}));
        assert_eq!(err.to_string(), "Permission denied");

        let err = ApiError::permission_denied(&json!({ "detail": "Forbidden" }));
        assert_eq!(err.to_string(), "Forbidden");
    }

    #[test]
    fn not_found_names_the_resource() {
        let err = ApiError::NotFound { resource: "User" };
        assert_eq!(err.to_string(), "User not found");
    }
}
