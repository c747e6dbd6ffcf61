//! The request engine: one descriptor in, one envelope out.
//!
//! # Design
//! `build_request` and `parse_response` are pure and cover everything but
//! the wire; `request` runs them around a `Transport` and folds every
//! failure (bad descriptor, timeout, connectivity, non-2xx, malformed body)
//! into a failure `Envelope`. Nothing is cached and nothing is retried: each
//! call is exactly one network round-trip.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::alert::{Alert, Alerter, LogAlerter, DEFAULT_SUCCESS_MESSAGE};
use crate::config::ApiConfig;
use crate::envelope::Envelope;
use crate::error::{server_message, RequestError, UNEXPECTED_ERROR_MESSAGE};
use crate::http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};
use crate::request::RequestDescriptor;
use crate::transport::{Transport, UreqTransport};

pub struct RequestEngine<T = UreqTransport> {
    config: ApiConfig,
    transport: T,
    alerter: Box<dyn Alerter>,
}

impl RequestEngine<UreqTransport> {
    pub fn new(config: ApiConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> RequestEngine<T> {
    pub fn with_transport(config: ApiConfig, transport: T) -> Self {
        Self {
            config,
            transport,
            alerter: Box::new(LogAlerter),
        }
    }

    /// Replace the alert sink (default: `LogAlerter`).
    pub fn with_alerter(mut self, alerter: impl Alerter + 'static) -> Self {
        self.alerter = Box::new(alerter);
        self
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Turn a descriptor into a concrete request: absolute URL with encoded
    /// query, JSON content type, optional bearer token, JSON body unless GET.
    pub fn build_request(&self, descriptor: &RequestDescriptor) -> Result<HttpRequest, RequestError> {
        let endpoint = descriptor.endpoint.trim();
        if endpoint.is_empty() {
            return Err(RequestError::InvalidDescriptor("endpoint is required".to_string()));
        }

        let mut url = String::from(self.config.base_url());
        if !endpoint.starts_with('/') {
            url.push('/');
        }
        url.push_str(endpoint);

        let query: Vec<String> = descriptor
            .params
            .iter()
            .filter_map(|(k, v)| {
                v.to_query_string()
                    .map(|v| format!("{}={}", encode_component(k), encode_component(&v)))
            })
            .collect();
        if !query.is_empty() {
            url.push(if url.contains('?') { '&' } else { '?' });
            url.push_str(&query.join("&"));
        }

        let mut headers = vec![("Content-Type".to_string(), "application/json".to_string())];
        if let Some(token) = descriptor.token.as_deref().filter(|t| !t.is_empty()) {
            headers.push(("Authorization".to_string(), format!("Bearer {token}")));
        }

        let body = match (&descriptor.method, &descriptor.body) {
            (HttpMethod::Get, _) | (_, None) => None,
            (_, Some(value)) => Some(
                serde_json::to_string(value).map_err(|e| RequestError::Serialization(e.to_string()))?,
            ),
        };

        Ok(HttpRequest {
            method: descriptor.method,
            url,
            headers,
            body,
        })
    }

    /// Interpret a raw response: sniff the body by content type, then map
    /// non-2xx statuses to `RequestError::Http`.
    pub fn parse_response(&self, response: HttpResponse) -> Result<ResponseBody, RequestError> {
        let success = response.is_success();
        let status = response.status;
        let is_json = response.is_json();
        let text = response.body;

        let body = if text.trim().is_empty() {
            ResponseBody::Empty
        } else if is_json {
            match serde_json::from_str(&text) {
                Ok(value) => ResponseBody::Json(value),
                Err(e) if success => return Err(RequestError::Deserialization(e.to_string())),
                Err(_) => ResponseBody::Text(text),
            }
        } else {
            ResponseBody::Text(text)
        };

        if !success {
            return Err(RequestError::from_status(status, body));
        }
        Ok(body)
    }

    /// Perform one request. Never fails: every outcome is an envelope.
    ///
    /// A panic in `on_success` becomes a failure envelope carrying the panic
    /// text; a panic in `on_error` is logged and the failure is returned.
    pub fn request(&self, descriptor: RequestDescriptor) -> Envelope {
        let outcome = self.build_request(&descriptor).and_then(|request| {
            tracing::debug!(method = %request.method, url = %request.url, "issuing request");
            let response = self.transport.execute(&request, self.config.timeout())?;
            tracing::debug!(status = response.status, url = %request.url, "response received");
            self.parse_response(response)
        });

        let RequestDescriptor {
            endpoint,
            method,
            alerts,
            callbacks,
            ..
        } = descriptor;

        // A panicking success callback turns the call into a failure.
        let outcome = outcome.and_then(|body| {
            let message = server_message(&body);
            let data = body.into_value();
            if let Some(on_success) = callbacks.on_success {
                catch_unwind(AssertUnwindSafe(|| on_success(&data)))
                    .map_err(|payload| RequestError::Callback(panic_message(payload.as_ref())))?;
            }
            Ok((data, message))
        });

        match outcome {
            Ok((data, message)) => {
                if alerts.show_success {
                    let text = alerts
                        .success_message
                        .or_else(|| message.clone())
                        .unwrap_or_else(|| DEFAULT_SUCCESS_MESSAGE.to_string());
                    self.alerter.alert(&Alert::success(text));
                }
                Envelope::ok(data, message)
            }
            Err(err) => {
                let error = err.to_string();
                tracing::warn!(
                    %method,
                    endpoint = %endpoint,
                    status = ?err.status(),
                    cause = ?err,
                    "request failed: {error}"
                );
                if let Some(on_error) = callbacks.on_error {
                    if catch_unwind(AssertUnwindSafe(|| on_error(&error))).is_err() {
                        tracing::warn!(%method, endpoint = %endpoint, "error callback panicked");
                    }
                }
                if alerts.show_error {
                    let text = alerts.error_message.unwrap_or_else(|| error.clone());
                    self.alerter.alert(&Alert::error(text));
                }
                Envelope::failure(error)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| UNEXPECTED_ERROR_MESSAGE.to_string())
}

/// Percent-encode a query component, keeping the RFC 3986 unreserved set.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for b in raw.bytes() {
        match b {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => out.push(b as char),
            _ => out.push_str(&format!("%{b:02X}")),
        }
    }
    out
}
