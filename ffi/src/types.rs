//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Requests cross the boundary as plain C structs so the host can hand them
//! straight to its own HTTP stack. Everything richer (descriptors, rule
//! tables, envelopes) crosses as JSON text, which keeps the C surface small
//! and lets the host reuse its JSON decoder.

use std::ffi::CString;
use std::os::raw::c_char;
use std::time::Duration;

use glucovision_core::http::HttpMethod;
use glucovision_core::{FormState, RequestEngine};

/// Opaque handle to a `FormState`.
pub struct FfiForm {
    pub(crate) inner: FormState,
}

/// Opaque handle to a `RequestEngine` using the built-in blocking transport.
pub struct FfiEngine {
    pub(crate) inner: RequestEngine,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
    Put = 2,
    Delete = 3,
    Patch = 4,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
            HttpMethod::Put => FfiHttpMethod::Put,
            HttpMethod::Delete => FfiHttpMethod::Delete,
            HttpMethod::Patch => FfiHttpMethod::Patch,
        }
    }
}

#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A fully built request for the host to execute.
///
/// `url` is absolute, `body` is null when nothing should be sent, and the
/// host must abandon the call after `timeout_ms` and report it with
/// `gv_transport_failure(Timeout)`.
#[repr(C)]
pub struct FfiHttpRequest {
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_ms: u64,
}

impl FfiHttpRequest {
    pub(crate) fn from_core(req: glucovision_core::HttpRequest, timeout: Duration) -> *mut Self {
        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .into_iter()
                .map(|(k, v)| FfiHeader {
                    key: into_c_string(k),
                    value: into_c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            method: req.method.into(),
            url: into_c_string(req.url),
            headers,
            headers_len,
            body: req.body.map(into_c_string).unwrap_or(std::ptr::null_mut()),
            timeout_ms: timeout.as_millis() as u64,
        }))
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// What the host received. The FFI layer reads but does not free these
/// fields; `content_type` and `body` may be null.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub content_type: *const c_char,
    pub body: *const c_char,
}

/// Why the host could not complete a request.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FfiTransportFailure {
    Timeout = 0,
    Network = 1,
}

/// Move a Rust string into a C string owned by the caller. Interior NULs
/// cannot be represented, so such strings come back empty.
pub(crate) fn into_c_string(s: String) -> *mut c_char {
    CString::new(s).unwrap_or_default().into_raw()
}
