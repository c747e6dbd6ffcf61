//! The uniform result shape of every request.
//!
//! # Design
//! Fields are private so an envelope can only be built through `ok` or
//! `failure`: data is present iff the call succeeded and `error` is present
//! iff it failed. Callers branch on `is_success`, never on `data`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{server_message, RequestError};
use crate::http::ResponseBody;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T = Value> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T, message: Option<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// `Ok(data)` on success, `Err(error)` otherwise.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.data, self.error) {
            (true, Some(data), _) => Ok(data),
            (_, _, Some(error)) => Err(error),
            _ => Err(String::from("Unknown error")),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        Envelope {
            success: self.success,
            data: self.data.map(f),
            error: self.error,
            message: self.message,
        }
    }
}

impl Envelope<Value> {
    /// Decode the JSON payload into `T`. A shape mismatch turns the envelope
    /// into a failure rather than an `Err`.
    pub fn decode<T: DeserializeOwned>(self) -> Envelope<T> {
        if !self.success {
            return Envelope {
                success: false,
                data: None,
                error: self.error,
                message: self.message,
            };
        }
        let message = self.message;
        match serde_json::from_value(self.data.unwrap_or(Value::Null)) {
            Ok(data) => Envelope::ok(data, message),
            Err(e) => {
                tracing::warn!(error = %e, "response did not match the expected shape");
                Envelope::failure(crate::error::INVALID_RESPONSE_MESSAGE)
            }
        }
    }
}

impl From<Result<ResponseBody, RequestError>> for Envelope<Value> {
    fn from(outcome: Result<ResponseBody, RequestError>) -> Self {
        match outcome {
            Ok(body) => {
                let message = server_message(&body);
                Envelope::ok(body.into_value(), message)
            }
            Err(err) => Envelope::failure(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Status {
        status: String,
    }

    #[test]
    fn success_and_error_are_exclusive() {
        let ok: Envelope = Envelope::ok(json!({"status": "ok"}), None);
        assert!(ok.is_success());
        assert!(ok.error().is_none());

        let failed: Envelope = Envelope::failure("Request timeout");
        assert!(!failed.is_success());
        assert!(failed.data().is_none());
        assert_eq!(failed.error(), Some("Request timeout"));
    }

    #[test]
    fn serializes_without_absent_fields() {
        let ok: Envelope = Envelope::ok(json!({"status": "ok"}), Some("Login successful".into()));
        assert_eq!(
            serde_json::to_value(&ok).unwrap(),
            json!({"success": true, "data": {"status": "ok"}, "message": "Login successful"})
        );
        let failed: Envelope = Envelope::failure("HTTP 404");
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"success": false, "error": "HTTP 404"})
        );
    }

    #[test]
    fn null_data_is_still_success() {
        let ok: Envelope = Envelope::ok(Value::Null, None);
        assert!(ok.is_success());
        assert_eq!(ok.into_result(), Ok(Value::Null));
    }

    #[test]
    fn decode_typed_payload() {
        let ok: Envelope = Envelope::ok(json!({"status": "ok"}), None);
        let typed = ok.decode::<Status>();
        assert_eq!(typed.data(), Some(&Status { status: "ok".into() }));
    }

    #[test]
    fn decode_shape_mismatch_is_failure() {
        let ok: Envelope = Envelope::ok(json!({"unexpected": 1}), None);
        let typed = ok.decode::<Status>();
        assert!(!typed.is_success());
        assert_eq!(typed.error(), Some("Invalid response from server"));
    }

    #[test]
    fn decode_keeps_failure() {
        let failed: Envelope = Envelope::failure("Invalid email or password");
        let typed = failed.decode::<Status>();
        assert_eq!(typed.into_result(), Err("Invalid email or password".to_string()));
    }

    #[test]
    fn from_outcome() {
        let ok: Envelope = Ok(ResponseBody::Json(json!({"message": "Logout successful"}))).into();
        assert_eq!(ok.message(), Some("Logout successful"));

        let empty: Envelope = Ok(ResponseBody::Empty).into();
        assert!(empty.is_success());
        assert_eq!(empty.data(), Some(&Value::Null));

        let failed: Envelope = Err(RequestError::Timeout).into();
        assert_eq!(failed.error(), Some("Request timeout"));
    }
}
