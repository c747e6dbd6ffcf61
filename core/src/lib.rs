//! Request and validation core for the GlucoVision mobile app.
//!
//! # Overview
//! Two engines sit under every screen. The request engine turns a
//! `RequestDescriptor` into an `HttpRequest`, runs it through a
//! `Transport`, and folds whatever happens (success, HTTP error, timeout,
//! dropped connection) into one `Envelope`. The validation engine keeps a
//! form's values and per-field errors against a table of `Rule`s.
//!
//! # Design
//! - Request building and response parsing are pure (`build_request`,
//!   `parse_response`); only `Transport::execute` does IO, so a host that
//!   owns its own HTTP stack can drive the engine through the FFI crate.
//! - Nothing in `RequestEngine::request` returns an error: failures are
//!   data in the envelope, and user-facing alerts go through `Alerter`.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod alert;
pub mod client;
pub mod config;
pub mod endpoints;
pub mod engine;
pub mod envelope;
pub mod error;
pub mod forms;
pub mod http;
pub mod request;
pub mod state;
pub mod transport;
pub mod types;
pub mod validation;

pub use alert::{Alert, AlertKind, Alerter, LogAlerter, QueuedAlerter};
pub use client::GlucoVisionClient;
pub use config::{ApiConfig, ConfigError, Environment};
pub use engine::RequestEngine;
pub use envelope::Envelope;
pub use error::RequestError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, ResponseBody};
pub use request::{AlertOptions, QueryValue, RequestDescriptor};
pub use transport::{FnTransport, Transport, UreqTransport};
pub use validation::{FieldType, FormState, Rule, RuleSpec, ValidationError};
