//! Field rules and the built-in type table.

use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ValidationError;

pub const REQUIRED_MESSAGE: &str = "This field is required";
pub const PATTERN_MESSAGE: &str = "Invalid format";

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| compile(r"^[^\s@]+@[^\s@]+\.[^\s@]+$"));
static LOWER_RE: Lazy<Regex> = Lazy::new(|| compile(r"[a-z]"));
static UPPER_RE: Lazy<Regex> = Lazy::new(|| compile(r"[A-Z]"));
static DIGIT_RE: Lazy<Regex> = Lazy::new(|| compile(r"\d"));
static PHONE_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\+?[\d\s\-().]+$"));
static MEASURE_RE: Lazy<Regex> = Lazy::new(|| compile(r"^\d{1,3}(\.\d{1,2})?$"));
static AGE_RE: Lazy<Regex> = Lazy::new(|| compile(r"^([1-9]|[1-9]\d|1[01]\d|120)$"));

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern compiles")
}

/// Built-in field categories, each with a fixed pattern and message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Email,
    Password,
    Phone,
    Glucose,
    Age,
    Weight,
    Height,
}

impl FieldType {
    pub fn accepts(&self, value: &str) -> bool {
        match self {
            FieldType::Email => EMAIL_RE.is_match(value),
            FieldType::Password => {
                value.chars().count() >= 8
                    && LOWER_RE.is_match(value)
                    && UPPER_RE.is_match(value)
                    && DIGIT_RE.is_match(value)
            }
            FieldType::Phone => {
                PHONE_RE.is_match(value) && value.chars().filter(char::is_ascii_digit).count() >= 10
            }
            FieldType::Glucose | FieldType::Weight | FieldType::Height => MEASURE_RE.is_match(value),
            FieldType::Age => AGE_RE.is_match(value),
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            FieldType::Email => "Please enter a valid email address",
            FieldType::Password => {
                "Password must be at least 8 characters with uppercase, lowercase, and number"
            }
            FieldType::Phone => "Please enter a valid phone number",
            FieldType::Glucose => "Please enter a valid glucose value (0-999)",
            FieldType::Age => "Please enter a valid age (1-120)",
            FieldType::Weight => "Please enter a valid weight",
            FieldType::Height => "Please enter a valid height",
        }
    }
}

pub type CustomCheck = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Validation rule for one named field. All checks are optional.
#[derive(Clone, Default)]
pub struct Rule {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<Regex>,
    pub field_type: Option<FieldType>,
    pub custom: Option<CustomCheck>,
    pub message: Option<String>,
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("required", &self.required)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(Regex::as_str))
            .field("field_type", &self.field_type)
            .field("custom", &self.custom.is_some())
            .field("message", &self.message)
            .finish()
    }
}

impl Rule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub fn of_type(mut self, field_type: FieldType) -> Self {
        self.field_type = Some(field_type);
        self
    }

    pub fn custom(mut self, check: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        self.custom = Some(Arc::new(check));
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Evaluate the rule against one value.
    ///
    /// Order: required, type, min length, max length, pattern, custom; the
    /// first failing check decides the message. A blank value on an optional
    /// field passes without running anything else.
    pub fn check(&self, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return if self.required {
                Err(self.text(REQUIRED_MESSAGE))
            } else {
                Ok(())
            };
        }

        if let Some(field_type) = self.field_type {
            if !field_type.accepts(value) {
                return Err(self.text(field_type.default_message()));
            }
        }

        let len = value.chars().count();
        if let Some(min) = self.min_length {
            if len < min {
                return Err(self.text(&format!("Must be at least {min} characters")));
            }
        }
        if let Some(max) = self.max_length {
            if len > max {
                return Err(self.text(&format!("Must be no more than {max} characters")));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(value) {
                return Err(self.text(PATTERN_MESSAGE));
            }
        }

        if let Some(custom) = &self.custom {
            if let Some(error) = custom(value).filter(|e| !e.is_empty()) {
                return Err(error);
            }
        }

        Ok(())
    }

    fn text(&self, default: &str) -> String {
        self.message.clone().unwrap_or_else(|| default.to_string())
    }
}

/// Serializable form of `Rule` for hosts that describe forms as JSON.
/// Custom functions cannot be expressed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RuleSpec {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub pattern: Option<String>,
    #[serde(rename = "type")]
    pub field_type: Option<FieldType>,
    pub message: Option<String>,
}

impl TryFrom<RuleSpec> for Rule {
    type Error = ValidationError;

    fn try_from(spec: RuleSpec) -> Result<Self, Self::Error> {
        let pattern = spec
            .pattern
            .map(|p| {
                Regex::new(&p).map_err(|e| ValidationError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .transpose()?;
        Ok(Rule {
            required: spec.required,
            min_length: spec.min_length,
            max_length: spec.max_length,
            pattern,
            field_type: spec.field_type,
            custom: None,
            message: spec.message,
        })
    }
}
