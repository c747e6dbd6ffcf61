//! C-ABI wrapper around `glucovision-core`.
//!
//! # Overview
//! Exposes form validation and the request engine through `extern "C"`
//! functions so the mobile shell can validate input and talk to the API
//! without linking Rust's serde or HTTP stacks directly.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Requests come in two flavours: `gv_engine_build_request` /
//!   `gv_engine_parse_response` for hosts that do their own IO, and
//!   `gv_engine_request` for hosts that let the core do the round-trip.
//!   Both produce the same envelope JSON
//!   (`{"success": bool, "data"?, "error"?, "message"?}`).
//! - The C caller owns all returned pointers and must call the matching
//!   `gv_*_free` / `gv_free_*` function to release them.

pub mod types;

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use glucovision_core::error::RequestError;
use glucovision_core::{ApiConfig, Envelope, FormState, HttpResponse, RequestDescriptor, RequestEngine, ResponseBody};

use types::*;

/// Borrow a C string as `&str`. Null and invalid UTF-8 both yield `None`.
fn c_str<'a>(ptr: *const c_char) -> Option<&'a str> {
    if ptr.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(ptr) }.to_str().ok()
}

fn envelope_json(envelope: &Envelope) -> *mut c_char {
    match serde_json::to_string(envelope) {
        Ok(json) => into_c_string(json),
        Err(e) => {
            tracing::error!(error = %e, "could not encode envelope");
            std::ptr::null_mut()
        }
    }
}

fn failure_json(error: &str) -> *mut c_char {
    envelope_json(&Envelope::failure(error))
}

// ---------------------------------------------------------------------------
// Forms
// ---------------------------------------------------------------------------

/// Create a form from a JSON rule table and optional JSON object of
/// initial values.
///
/// `rules_json` looks like `{"email": {"required": true, "type": "email"}}`;
/// rule keys are `required`, `minLength`, `maxLength`, `pattern`, `type`
/// and `message`. Returns null if `rules_json` is null or either document
/// is malformed. Free with `gv_form_free`.
#[unsafe(no_mangle)]
pub extern "C" fn gv_form_new(rules_json: *const c_char, initial_json: *const c_char) -> *mut FfiForm {
    catch_unwind(|| {
        let Some(rules) = c_str(rules_json) else {
            return std::ptr::null_mut();
        };
        match FormState::from_json(rules, c_str(initial_json)) {
            Ok(form) => Box::into_raw(Box::new(FfiForm { inner: form })),
            Err(e) => {
                tracing::warn!(error = %e, "rejected form description");
                std::ptr::null_mut()
            }
        }
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Record an edit to `field`. Returns false if any argument is null.
#[unsafe(no_mangle)]
pub extern "C" fn gv_form_set_value(form: *mut FfiForm, field: *const c_char, value: *const c_char) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if form.is_null() {
            return false;
        }
        let (Some(field), Some(value)) = (c_str(field), c_str(value)) else {
            return false;
        };
        let form = unsafe { &mut *form };
        form.inner.set_value(field, value);
        true
    }))
    .unwrap_or(false)
}

/// Validate one field and store its message. Fields without a rule pass.
/// Returns false if `form` or `field` is null.
#[unsafe(no_mangle)]
pub extern "C" fn gv_form_validate_field(form: *mut FfiForm, field: *const c_char) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if form.is_null() {
            return false;
        }
        let Some(field) = c_str(field) else {
            return false;
        };
        let form = unsafe { &mut *form };
        form.inner.validate_field(field)
    }))
    .unwrap_or(false)
}

/// Validate every field with a rule. True only if all pass.
#[unsafe(no_mangle)]
pub extern "C" fn gv_form_validate_all(form: *mut FfiForm) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if form.is_null() {
            return false;
        }
        let form = unsafe { &mut *form };
        form.inner.validate_all()
    }))
    .unwrap_or(false)
}

#[unsafe(no_mangle)]
pub extern "C" fn gv_form_is_valid(form: *const FfiForm) -> bool {
    catch_unwind(AssertUnwindSafe(|| {
        if form.is_null() {
            return false;
        }
        let form = unsafe { &*form };
        form.inner.is_valid()
    }))
    .unwrap_or(false)
}

/// Current error for `field`, or null when it has none.
/// Free a non-null result with `gv_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn gv_form_error(form: *const FfiForm, field: *const c_char) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if form.is_null() {
            return std::ptr::null_mut();
        }
        let form = unsafe { &*form };
        c_str(field)
            .and_then(|field| form.inner.error(field))
            .map(|e| into_c_string(e.to_string()))
            .unwrap_or(std::ptr::null_mut())
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Restore the initial values and clear every error.
#[unsafe(no_mangle)]
pub extern "C" fn gv_form_reset(form: *mut FfiForm) {
    if form.is_null() {
        return;
    }
    let _ = catch_unwind(AssertUnwindSafe(|| {
        let form = unsafe { &mut *form };
        form.inner.reset_form();
    }));
}

/// Free a form created by `gv_form_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn gv_form_free(form: *mut FfiForm) {
    if !form.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(form) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Engine lifecycle
// ---------------------------------------------------------------------------

/// Create a request engine.
///
/// A null `base_url` resolves the URL from the environment
/// (`GLUCOVISION_API_URL`, then the build's default); `timeout_ms == 0`
/// keeps the configured timeout. Returns null if the environment holds an
/// invalid setting. Free with `gv_engine_free`.
#[unsafe(no_mangle)]
pub extern "C" fn gv_engine_new(base_url: *const c_char, timeout_ms: u64) -> *mut FfiEngine {
    catch_unwind(|| {
        let config = match c_str(base_url) {
            Some(url) => ApiConfig::new(url),
            None => match ApiConfig::from_env() {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(error = %e, "invalid API configuration");
                    return std::ptr::null_mut();
                }
            },
        };
        let config = if timeout_ms > 0 {
            config.with_timeout(Duration::from_millis(timeout_ms))
        } else {
            config
        };
        Box::into_raw(Box::new(FfiEngine {
            inner: RequestEngine::new(config),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free an engine created by `gv_engine_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn gv_engine_free(engine: *mut FfiEngine) {
    if !engine.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(engine) });
        }));
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Build the HTTP request for a JSON request descriptor:
/// `{"endpoint": "/api/v1/glucose/logs", "method": "GET", "params": {...},
/// "body": {...}, "token": "..."}`. Only `endpoint` is required.
///
/// Returns null if an argument is null, the descriptor is malformed, or the
/// endpoint is empty. Free with `gv_free_request`.
#[unsafe(no_mangle)]
pub extern "C" fn gv_engine_build_request(
    engine: *const FfiEngine,
    descriptor_json: *const c_char,
) -> *mut FfiHttpRequest {
    catch_unwind(AssertUnwindSafe(|| {
        if engine.is_null() {
            return std::ptr::null_mut();
        }
        let engine = unsafe { &*engine };
        let Some(raw) = c_str(descriptor_json) else {
            return std::ptr::null_mut();
        };
        let built = parse_descriptor(raw).and_then(|d| engine.inner.build_request(&d));
        match built {
            Ok(req) => FfiHttpRequest::from_core(req, engine.inner.config().timeout()),
            Err(e) => {
                tracing::warn!(error = %e, "could not build request");
                std::ptr::null_mut()
            }
        }
    }))
    .unwrap_or(std::ptr::null_mut())
}

/// Turn a response the host received into envelope JSON.
///
/// Null arguments produce a failure envelope rather than null.
/// Free the result with `gv_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn gv_engine_parse_response(
    engine: *const FfiEngine,
    response: *const FfiHttpResponse,
) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if engine.is_null() {
            return failure_json("null argument: engine");
        }
        if response.is_null() {
            return failure_json("null argument: response");
        }
        let engine = unsafe { &*engine };
        let resp = unsafe { &*response };
        let core_resp = ffi_response_to_core(resp);
        let envelope: Envelope = engine.inner.parse_response(core_resp).into();
        envelope_json(&envelope)
    }))
    .unwrap_or_else(|_| failure_json("panic in gv_engine_parse_response"))
}

/// Failure envelope JSON for a request the host could not complete.
/// Free the result with `gv_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn gv_transport_failure(kind: FfiTransportFailure) -> *mut c_char {
    catch_unwind(|| {
        let err = match kind {
            FfiTransportFailure::Timeout => RequestError::Timeout,
            FfiTransportFailure::Network => RequestError::Network("reported by host".to_string()),
        };
        let envelope = Envelope::from(Err::<ResponseBody, _>(err));
        envelope_json(&envelope)
    })
    .unwrap_or_else(|_| failure_json("panic in gv_transport_failure"))
}

/// Perform the whole round-trip in-process and return envelope JSON.
/// Blocks the calling thread for up to the engine's timeout.
/// Free the result with `gv_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn gv_engine_request(engine: *const FfiEngine, descriptor_json: *const c_char) -> *mut c_char {
    catch_unwind(AssertUnwindSafe(|| {
        if engine.is_null() {
            return failure_json("null argument: engine");
        }
        let engine = unsafe { &*engine };
        let Some(raw) = c_str(descriptor_json) else {
            return failure_json("null argument: descriptor");
        };
        let envelope = match parse_descriptor(raw) {
            Ok(descriptor) => engine.inner.request(descriptor),
            Err(e) => Envelope::failure(e.to_string()),
        };
        envelope_json(&envelope)
    }))
    .unwrap_or_else(|_| failure_json("panic in gv_engine_request"))
}

fn parse_descriptor(raw: &str) -> Result<RequestDescriptor, RequestError> {
    serde_json::from_str(raw).map_err(|e| RequestError::InvalidDescriptor(e.to_string()))
}

fn ffi_response_to_core(resp: &FfiHttpResponse) -> HttpResponse {
    let headers = c_str(resp.content_type)
        .map(|ct| vec![("Content-Type".to_string(), ct.to_string())])
        .unwrap_or_default();
    HttpResponse {
        status: resp.status,
        headers,
        body: c_str(resp.body).unwrap_or("").to_string(),
    }
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free an `FfiHttpRequest` returned by `gv_engine_build_request`.
/// Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn gv_free_request(req: *mut FfiHttpRequest) {
    if req.is_null() {
        return;
    }
    let _ = catch_unwind(|| {
        let req = unsafe { Box::from_raw(req) };
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = unsafe { Box::from_raw(slice) };
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    });
}

/// Free a C string allocated by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn gv_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| free_c_string(s));
}

fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(unsafe { CString::from_raw(s) });
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
