//! Error types for the request engine and the message extraction that turns
//! server error bodies into user-facing text.
//!
//! # Design
//! The backend reports failures in several shapes: `{"detail": "..."}` from
//! route handlers, `{"detail": [{"msg": ...}]}` from request validation,
//! `{"error": ..., "message": ...}` from the global exception handler, and
//! the occasional plain-text body from a proxy. `error_message` walks an
//! ordered list of extractors and the first hit wins, so the precedence is a
//! plain data table that can be tested without a network.

use serde_json::Value;
use thiserror::Error;

use crate::http::ResponseBody;

pub const TIMEOUT_MESSAGE: &str = "Request timeout";
pub const NETWORK_MESSAGE: &str =
    "Network error. Please check your internet connection and try again.";
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response from server";
pub const ENCODE_MESSAGE: &str = "Failed to encode request body";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Every way a request can fail. `Display` is the user-facing message that
/// ends up in the envelope's `error` field.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// The call exceeded the configured timeout and was abandoned.
    #[error("Request timeout")]
    Timeout,

    /// The call never reached a server. Carries the transport's cause for logs.
    #[error("Network error. Please check your internet connection and try again.")]
    Network(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        body: ResponseBody,
    },

    /// A 2xx body announced as JSON could not be parsed.
    #[error("Invalid response from server")]
    Deserialization(String),

    /// The descriptor body could not be serialized.
    #[error("Failed to encode request body")]
    Serialization(String),

    /// The descriptor itself is unusable (e.g. empty endpoint).
    #[error("Invalid request: {0}")]
    InvalidDescriptor(String),

    /// The caller's success callback panicked; carries the panic text.
    #[error("{0}")]
    Callback(String),
}

impl RequestError {
    /// Build an `Http` error from a failed response, deriving the message
    /// with `error_message`.
    pub fn from_status(status: u16, body: ResponseBody) -> Self {
        let message = error_message(&body, status);
        RequestError::Http {
            status,
            message,
            body,
        }
    }

    /// HTTP status when the server answered.
    pub fn status(&self) -> Option<u16> {
        match self {
            RequestError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

type Extractor = fn(&Value) -> Option<String>;

/// Message-carrying fields, highest priority first.
const EXTRACTORS: [Extractor; 3] = [extract_detail, extract_message, extract_error];

/// Derive a human-readable message from an error response body.
///
/// Priority: `detail`, `message`, `error`, the raw body, `HTTP <status>`.
pub fn error_message(body: &ResponseBody, status: u16) -> String {
    if let ResponseBody::Json(value) = body {
        if let Some(found) = EXTRACTORS.iter().find_map(|extract| extract(value)) {
            return found;
        }
    }
    body.raw().unwrap_or_else(|| format!("HTTP {status}"))
}

/// Top-level `message` string of a JSON body, used for success envelopes.
pub fn server_message(body: &ResponseBody) -> Option<String> {
    match body {
        ResponseBody::Json(value) => extract_message(value),
        _ => None,
    }
}

fn extract_detail(value: &Value) -> Option<String> {
    match value.get("detail")? {
        Value::String(s) => non_empty(s),
        // Request-validation failures: [{"loc": [...], "msg": "...", "type": "..."}]
        Value::Array(items) => {
            let msgs: Vec<&str> = items
                .iter()
                .filter_map(|item| item.get("msg").and_then(Value::as_str))
                .filter(|m| !m.trim().is_empty())
                .collect();
            if msgs.is_empty() {
                non_empty(&Value::Array(items.clone()).to_string())
            } else {
                Some(msgs.join("; "))
            }
        }
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn extract_message(value: &Value) -> Option<String> {
    value.get("message").and_then(Value::as_str).and_then(non_empty)
}

fn extract_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::String(s) => non_empty(s),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn detail_wins_over_message_and_error() {
        let body = ResponseBody::Json(json!({
            "detail": "Email already registered",
            "message": "ignored",
            "error": "ignored too"
        }));
        assert_eq!(error_message(&body, 400), "Email already registered");
    }

    #[test]
    fn message_then_error() {
        let body = ResponseBody::Json(json!({"error": "Internal server error", "message": "Try later"}));
        assert_eq!(error_message(&body, 500), "Try later");

        let body = ResponseBody::Json(json!({"error": "Internal server error"}));
        assert_eq!(error_message(&body, 500), "Internal server error");
    }

    #[test]
    fn empty_fields_fall_through() {
        let body = ResponseBody::Json(json!({"detail": "", "message": "  ", "error": "boom"}));
        assert_eq!(error_message(&body, 500), "boom");
    }

    #[test]
    fn validation_detail_array_joins_messages() {
        let body = ResponseBody::Json(json!({
            "detail": [
                {"loc": ["body", "password"], "msg": "Password too weak", "type": "value_error"},
                {"loc": ["body", "email"], "msg": "Invalid email", "type": "value_error"}
            ]
        }));
        assert_eq!(error_message(&body, 422), "Password too weak; Invalid email");
    }

    #[test]
    fn raw_body_then_status_fallback() {
        let body = ResponseBody::Json(json!({"code": 17}));
        assert_eq!(error_message(&body, 409), r#"{"code":17}"#);

        let body = ResponseBody::Text("Bad Gateway".into());
        assert_eq!(error_message(&body, 502), "Bad Gateway");

        assert_eq!(error_message(&ResponseBody::Empty, 404), "HTTP 404");
    }

    #[test]
    fn display_is_user_facing() {
        assert_eq!(RequestError::Timeout.to_string(), TIMEOUT_MESSAGE);
        assert_eq!(RequestError::Network("refused".into()).to_string(), NETWORK_MESSAGE);
        assert_eq!(
            RequestError::Deserialization("eof".into()).to_string(),
            INVALID_RESPONSE_MESSAGE
        );
        assert_eq!(RequestError::Serialization("nan".into()).to_string(), ENCODE_MESSAGE);
        let err = RequestError::from_status(401, ResponseBody::Json(json!({"detail": "Not authenticated"})));
        assert_eq!(err.to_string(), "Not authenticated");
        assert_eq!(err.status(), Some(401));
    }
}
