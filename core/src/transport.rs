//! Executing an `HttpRequest` against the network.
//!
//! The engine only ever talks to the `Transport` trait. `UreqTransport` is
//! the production implementation; tests and native hosts plug in their own.

use std::time::Duration;

use crate::error::RequestError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP round-trip.
///
/// Implementations must return non-2xx responses as `Ok` data and abandon
/// the call with `RequestError::Timeout` once `timeout` has elapsed.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, RequestError>;
}

/// Transport built from a closure. Handy for scripted responses in tests
/// and for hosts that already own an HTTP stack.
pub struct FnTransport<F>(pub F);

impl<F> Transport for FnTransport<F>
where
    F: Fn(&HttpRequest, Duration) -> Result<HttpResponse, RequestError> + Send + Sync,
{
    fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, RequestError> {
        (self.0)(request, timeout)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Debug, Clone, Default)]
pub struct UreqTransport;

impl UreqTransport {
    pub fn new() -> Self {
        Self
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest, timeout: Duration) -> Result<HttpResponse, RequestError> {
        // Status codes are data here; the engine interprets them.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();

        let url = request.url.as_str();
        let body = request.body.as_deref();
        let result = match request.method {
            HttpMethod::Get => with_headers_get(agent.get(url), request).call(),
            HttpMethod::Delete => {
                let builder = with_headers_get(agent.delete(url), request);
                match body {
                    Some(b) => builder.force_send_body().send(b.as_bytes()),
                    None => builder.call(),
                }
            }
            HttpMethod::Post => send(with_headers_body(agent.post(url), request), body),
            HttpMethod::Put => send(with_headers_body(agent.put(url), request), body),
            HttpMethod::Patch => send(with_headers_body(agent.patch(url), request), body),
        };

        let mut response = result.map_err(map_ureq_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // The server did answer; a body that is not UTF-8 is still a reply.
        let bytes = response.body_mut().read_to_vec().map_err(map_ureq_error)?;
        let body = String::from_utf8_lossy(&bytes).into_owned();

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

type BodylessBuilder = ureq::RequestBuilder<ureq::typestate::WithoutBody>;
type BodyBuilder = ureq::RequestBuilder<ureq::typestate::WithBody>;

fn with_headers_get(mut builder: BodylessBuilder, request: &HttpRequest) -> BodylessBuilder {
    for (k, v) in &request.headers {
        builder = builder.header(k.as_str(), v.as_str());
    }
    builder
}

fn with_headers_body(mut builder: BodyBuilder, request: &HttpRequest) -> BodyBuilder {
    for (k, v) in &request.headers {
        builder = builder.header(k.as_str(), v.as_str());
    }
    builder
}

fn send(builder: BodyBuilder, body: Option<&str>) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(b) => builder.send(b.as_bytes()),
        None => builder.send_empty(),
    }
}

fn map_ureq_error(err: ureq::Error) -> RequestError {
    match err {
        ureq::Error::Timeout(_) => RequestError::Timeout,
        ureq::Error::Io(ref io) if io.kind() == std::io::ErrorKind::TimedOut => RequestError::Timeout,
        other => RequestError::Network(other.to_string()),
    }
}
