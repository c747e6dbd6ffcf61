//! Per-screen form state: values, errors and the rules that relate them.

use std::collections::BTreeMap;

use super::rules::{Rule, RuleSpec};
use super::ValidationError;

/// Mutable value and error bags for one form, owned by the screen that
/// created it. All mutation goes through the methods below.
#[derive(Debug, Clone, Default)]
pub struct FormState {
    rules: BTreeMap<String, Rule>,
    initial: BTreeMap<String, String>,
    values: BTreeMap<String, String>,
    errors: BTreeMap<String, String>,
}

impl FormState {
    pub fn new<R, I, K, V>(rules: R, initial: I) -> Self
    where
        R: IntoIterator<Item = (K, Rule)>,
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let initial: BTreeMap<String, String> = initial
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            rules: rules.into_iter().map(|(k, r)| (k.into(), r)).collect(),
            values: initial.clone(),
            initial,
            errors: BTreeMap::new(),
        }
    }

    /// A form with rules and no seeded values.
    pub fn with_rules<R, K>(rules: R) -> Self
    where
        R: IntoIterator<Item = (K, Rule)>,
        K: Into<String>,
    {
        Self::new(rules, Vec::<(K, String)>::new())
    }

    /// Build from the JSON rule table hosts send across the FFI, e.g.
    /// `{"email": {"required": true, "type": "email"}}`, plus an optional
    /// object of initial values.
    pub fn from_json(rules: &str, initial: Option<&str>) -> Result<Self, ValidationError> {
        let specs: BTreeMap<String, RuleSpec> =
            serde_json::from_str(rules).map_err(|e| ValidationError::MalformedSpec(e.to_string()))?;
        let rules = specs
            .into_iter()
            .map(|(field, spec)| Rule::try_from(spec).map(|rule| (field, rule)))
            .collect::<Result<Vec<_>, _>>()?;
        let initial: BTreeMap<String, String> = match initial {
            Some(raw) => {
                serde_json::from_str(raw).map_err(|e| ValidationError::MalformedSpec(e.to_string()))?
            }
            None => BTreeMap::new(),
        };
        Ok(Self::new(rules, initial))
    }

    /// Record an edit. A pending error on the field is cleared; it comes
    /// back only when the field is validated again.
    pub fn set_value(&mut self, field: &str, value: impl Into<String>) {
        self.values.insert(field.to_string(), value.into());
        if let Some(error) = self.errors.get_mut(field) {
            error.clear();
        }
    }

    /// Validate one field and store the outcome. Fields without a rule pass.
    pub fn validate_field(&mut self, field: &str) -> bool {
        let Some(rule) = self.rules.get(field) else {
            return true;
        };
        let value = self.values.get(field).map(String::as_str).unwrap_or("");
        match rule.check(value) {
            Ok(()) => {
                self.errors.insert(field.to_string(), String::new());
                true
            }
            Err(message) => {
                tracing::trace!(field, %message, "field failed validation");
                self.errors.insert(field.to_string(), message);
                false
            }
        }
    }

    /// Validate every field that has a rule; true only if all pass.
    pub fn validate_all(&mut self) -> bool {
        let fields: Vec<String> = self.rules.keys().cloned().collect();
        fields
            .iter()
            .fold(true, |all, field| self.validate_field(field) && all)
    }

    /// Restore the values passed at construction and clear every error.
    pub fn reset_form(&mut self) {
        self.values = self.initial.clone();
        self.errors.clear();
    }

    /// No stored error is non-empty and every required field has a
    /// non-blank value, validated or not.
    pub fn is_valid(&self) -> bool {
        let no_errors = self.errors.values().all(String::is_empty);
        let required_filled = self
            .rules
            .iter()
            .filter(|(_, rule)| rule.required)
            .all(|(field, _)| !self.value(field).trim().is_empty());
        no_errors && required_filled
    }

    pub fn value(&self, field: &str) -> &str {
        self.values.get(field).map(String::as_str).unwrap_or("")
    }

    /// Current error for `field`, `None` when it has none.
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .map(String::as_str)
            .filter(|e| !e.is_empty())
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Raw error bag; an empty string means "no error".
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    pub fn rule(&self, field: &str) -> Option<&Rule> {
        self.rules.get(field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::rules::FieldType;

    #[test]
    fn email_scenario() {
        let mut form = FormState::with_rules([("email", Rule::required().of_type(FieldType::Email))]);
        form.set_value("email", "not-an-email");
        assert!(!form.validate_field("email"));
        assert_eq!(form.errors()["email"], "Please enter a valid email address");
    }

    #[test]
    fn password_min_length_scenario() {
        let mut form = FormState::with_rules([("password", Rule::required().min_length(6))]);
        form.set_value("password", "abcdef");
        assert!(form.validate_field("password"));
        assert_eq!(form.errors()["password"], "");
        assert_eq!(form.error("password"), None);
    }

    #[test]
    fn pristine_required_field_is_invalid() {
        let form = FormState::with_rules([
            ("email", Rule::required().of_type(FieldType::Email)),
            ("phone", Rule::new().of_type(FieldType::Phone)),
        ]);
        assert!(form.errors().is_empty());
        assert!(!form.is_valid());
    }

    #[test]
    fn optional_empty_field_passes() {
        let mut form = FormState::with_rules([(
            "phone",
            Rule::new().of_type(FieldType::Phone).min_length(10),
        )]);
        assert!(form.validate_field("phone"));
        form.set_value("phone", "   ");
        assert!(form.validate_field("phone"));
        assert!(form.is_valid());
    }

    #[test]
    fn unknown_field_passes_without_touching_errors() {
        let mut form = FormState::with_rules([("email", Rule::required())]);
        assert!(form.validate_field("nickname"));
        assert!(!form.errors().contains_key("nickname"));
    }

    #[test]
    fn edit_clears_error_until_revalidated() {
        let mut form = FormState::with_rules([("age", Rule::required().of_type(FieldType::Age))]);
        form.set_value("age", "200");
        assert!(!form.validate_field("age"));
        assert_eq!(form.error("age"), Some("Please enter a valid age (1-120)"));

        form.set_value("age", "300");
        assert_eq!(form.error("age"), None);
        assert!(form.is_valid(), "edit provisionally resolves the complaint");

        assert!(!form.validate_field("age"));
        assert!(!form.is_valid());
    }

    #[test]
    fn validate_all_runs_every_rule() {
        let mut form = FormState::with_rules([
            ("email", Rule::required().of_type(FieldType::Email)),
            ("password", Rule::required().of_type(FieldType::Password)),
            ("notes", Rule::new().max_length(5)),
        ]);
        form.set_value("email", "user@example.com");
        form.set_value("password", "weak");
        form.set_value("notes", "far too long");
        assert!(!form.validate_all());
        assert_eq!(form.error("email"), None);
        assert!(form.error("password").is_some());
        assert_eq!(form.error("notes"), Some("Must be no more than 5 characters"));

        form.set_value("password", "SecurePass123");
        form.set_value("notes", "ok");
        assert!(form.validate_all());
        assert!(form.is_valid());
    }

    #[test]
    fn reset_restores_initial_values_and_clears_errors() {
        let mut form = FormState::new(
            [("glucose", Rule::required().of_type(FieldType::Glucose))],
            [("glucose", "110"), ("unit", "mg/dL")],
        );
        let initial = form.values().clone();
        form.set_value("glucose", "abc");
        form.set_value("notes", "extra");
        form.validate_all();
        assert!(form.error("glucose").is_some());

        form.reset_form();
        assert_eq!(form.values(), &initial);
        assert!(form.errors().values().all(String::is_empty));
        assert!(form.is_valid());
    }

    #[test]
    fn from_json_builds_rules_and_initial_values() {
        let mut form = FormState::from_json(
            r#"{"email": {"required": true, "type": "email"}, "notes": {"maxLength": 5}}"#,
            Some(r#"{"notes": "hi"}"#),
        )
        .unwrap();
        assert_eq!(form.value("notes"), "hi");
        form.set_value("email", "nope");
        assert!(!form.validate_all());
        assert_eq!(form.error("email"), Some("Please enter a valid email address"));
    }

    #[test]
    fn from_json_reports_bad_input() {
        assert!(matches!(
            FormState::from_json("[1, 2]", None),
            Err(ValidationError::MalformedSpec(_))
        ));
        assert!(matches!(
            FormState::from_json(r#"{"code": {"pattern": "("}}"#, None),
            Err(ValidationError::InvalidPattern { .. })
        ));
        assert!(matches!(
            FormState::from_json("{}", Some(r#"{"age": 42}"#)),
            Err(ValidationError::MalformedSpec(_))
        ));
    }
}
