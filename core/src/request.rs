//! Request descriptors: the value object a caller hands to the engine for
//! one HTTP call.
//!
//! Everything except `endpoint` is optional and defaulted. The serializable
//! part deserializes from JSON so native hosts can describe calls over the
//! FFI; callbacks only exist on the Rust side.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::http::HttpMethod;

/// A scalar query-string value. `Null` entries are dropped from the URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl QueryValue {
    /// String form for the query string, `None` for `Null`.
    pub fn to_query_string(&self) -> Option<String> {
        match self {
            QueryValue::Null => None,
            QueryValue::Bool(b) => Some(b.to_string()),
            QueryValue::Int(i) => Some(i.to_string()),
            QueryValue::Float(f) => Some(f.to_string()),
            QueryValue::Str(s) => Some(s.clone()),
        }
    }
}

impl From<bool> for QueryValue {
    fn from(v: bool) -> Self {
        QueryValue::Bool(v)
    }
}

impl From<i64> for QueryValue {
    fn from(v: i64) -> Self {
        QueryValue::Int(v)
    }
}

impl From<i32> for QueryValue {
    fn from(v: i32) -> Self {
        QueryValue::Int(v.into())
    }
}

impl From<u32> for QueryValue {
    fn from(v: u32) -> Self {
        QueryValue::Int(v.into())
    }
}

impl From<f64> for QueryValue {
    fn from(v: f64) -> Self {
        QueryValue::Float(v)
    }
}

impl From<&str> for QueryValue {
    fn from(v: &str) -> Self {
        QueryValue::Str(v.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(v: String) -> Self {
        QueryValue::Str(v)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(QueryValue::Null)
    }
}

/// Which alerts to raise and with what text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertOptions {
    pub show_success: bool,
    pub show_error: bool,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

pub type SuccessCallback = Box<dyn FnOnce(&Value) + Send>;
pub type ErrorCallback = Box<dyn FnOnce(&str) + Send>;

/// Lifecycle hooks, each fired at most once per request.
#[derive(Default)]
pub struct Callbacks {
    pub on_success: Option<SuccessCallback>,
    pub on_error: Option<ErrorCallback>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// One HTTP call as seen by the caller.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestDescriptor {
    pub endpoint: String,
    pub method: HttpMethod,
    pub body: Option<Value>,
    pub params: BTreeMap<String, QueryValue>,
    pub token: Option<String>,
    pub alerts: AlertOptions,
    #[serde(skip)]
    pub callbacks: Callbacks,
}

impl RequestDescriptor {
    pub fn new(method: HttpMethod, endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            method,
            ..Default::default()
        }
    }

    pub fn get(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, endpoint)
    }

    pub fn post(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, endpoint)
    }

    pub fn put(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, endpoint)
    }

    pub fn delete(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, endpoint)
    }

    pub fn patch(endpoint: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, endpoint)
    }

    /// Attach a JSON body. Ignored for GET.
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Attach a token when one is available.
    pub fn bearer_opt(mut self, token: Option<&str>) -> Self {
        self.token = token.map(str::to_string);
        self
    }

    pub fn success_alert(mut self, message: Option<&str>) -> Self {
        self.alerts.show_success = true;
        self.alerts.success_message = message.map(str::to_string);
        self
    }

    pub fn error_alert(mut self, message: Option<&str>) -> Self {
        self.alerts.show_error = true;
        self.alerts.error_message = message.map(str::to_string);
        self
    }

    pub fn on_success(mut self, f: impl FnOnce(&Value) + Send + 'static) -> Self {
        self.callbacks.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl FnOnce(&str) + Send + 'static) -> Self {
        self.callbacks.on_error = Some(Box::new(f));
        self
    }
}
