//! Rule tables for the app's forms, matching the limits the backend
//! enforces so most mistakes are caught before a request is sent.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::validation::{FieldType, FormState, Rule};

static UNIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(mg/dL|mmol/L)$").expect("unit pattern"));
static DATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("date pattern"));

type Rules = BTreeMap<&'static str, Rule>;

pub fn login_rules() -> Rules {
    BTreeMap::from([
        ("email", Rule::required().of_type(FieldType::Email)),
        ("password", Rule::required().min_length(8)),
    ])
}

/// Registration. Matching `confirm_password` against `password` is a
/// cross-field check; see `passwords_match`.
pub fn register_rules() -> Rules {
    BTreeMap::from([
        ("email", Rule::required().of_type(FieldType::Email)),
        ("password", Rule::required().of_type(FieldType::Password)),
        ("confirm_password", Rule::required()),
        ("first_name", Rule::required().max_length(50)),
        ("last_name", Rule::required().max_length(50)),
    ])
}

pub fn forgot_password_rules() -> Rules {
    BTreeMap::from([("email", Rule::required().of_type(FieldType::Email))])
}

pub fn glucose_entry_rules() -> Rules {
    BTreeMap::from([
        ("glucose_value", Rule::required().of_type(FieldType::Glucose)),
        ("unit", Rule::new().pattern(UNIT_RE.clone()).message("Unit must be mg/dL or mmol/L")),
        ("notes", Rule::new().max_length(500)),
        ("symptoms", Rule::new().max_length(300)),
        (
            "carbs_consumed",
            Rule::new().custom(|v| int_in_range(v, 0, 500, "Carbs must be between 0 and 500 grams")),
        ),
        (
            "stress_level",
            Rule::new().custom(|v| int_in_range(v, 1, 10, "Stress level must be between 1 and 10")),
        ),
    ])
}

pub fn profile_rules() -> Rules {
    BTreeMap::from([
        ("first_name", Rule::new().max_length(50)),
        ("last_name", Rule::new().max_length(50)),
        ("age", Rule::new().of_type(FieldType::Age)),
        ("weight", Rule::new().of_type(FieldType::Weight)),
        ("height", Rule::new().of_type(FieldType::Height)),
        ("phone", Rule::new().of_type(FieldType::Phone)),
        (
            "date_of_birth",
            Rule::new().pattern(DATE_RE.clone()).message("Use the format YYYY-MM-DD"),
        ),
    ])
}

pub fn login() -> FormState {
    FormState::with_rules(login_rules())
}

pub fn register() -> FormState {
    FormState::with_rules(register_rules())
}

pub fn forgot_password() -> FormState {
    FormState::with_rules(forgot_password_rules())
}

/// Glucose entry, seeded with the default unit.
pub fn glucose_entry() -> FormState {
    FormState::new(glucose_entry_rules(), [("unit", "mg/dL")])
}

pub fn profile() -> FormState {
    FormState::with_rules(profile_rules())
}

/// Cross-field check for the registration form: `None` when the two
/// password fields agree.
pub fn passwords_match(form: &FormState) -> Option<&'static str> {
    (form.value("password") != form.value("confirm_password")).then_some("Passwords do not match")
}

fn int_in_range(value: &str, min: i64, max: i64, message: &str) -> Option<String> {
    match value.parse::<i64>() {
        Ok(n) if (min..=max).contains(&n) => None,
        _ => Some(message.to_string()),
    }
}
