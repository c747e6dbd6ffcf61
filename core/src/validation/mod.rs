//! Client-side form validation.
//!
//! Rules are registered per field name; `FormState` evaluates them against
//! the current values and keeps one message per field. Nothing here throws:
//! outcomes are booleans plus the error bag.

pub mod form;
pub mod rules;

use thiserror::Error;

pub use form::FormState;
pub use rules::{FieldType, Rule, RuleSpec};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("malformed form description: {0}")]
    MalformedSpec(String),
}
