//! Domain DTOs for the GlucoVision API.
//!
//! # Design
//! These mirror the backend's JSON contract but are defined independently of
//! the mock-server crate; integration tests catch schema drift between the
//! two. Unknown fields are ignored so newer servers stay compatible.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "bearer")]
    pub token_type: String,
    pub expires_in: u64,
}

fn bearer() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[serde(default)]
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub diabetes_type: Option<String>,
    #[serde(default = "mg_dl")]
    pub preferred_unit: String,
    #[serde(default = "target_min")]
    pub target_range_min: i32,
    #[serde(default = "target_max")]
    pub target_range_max: i32,
    #[serde(default)]
    pub has_completed_onboarding: bool,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub is_verified: bool,
}

fn mg_dl() -> String {
    "mg/dL".to_string()
}

fn target_min() -> i32 {
    70
}

fn target_max() -> i32 {
    180
}

/// Body of `register` and `login` responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
    pub tokens: Tokens,
}

/// Body of `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrentUser {
    pub user: User,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Health {
    pub status: String,
}

/// Partial profile update; omitted fields stay unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_unit: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_range_min: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_range_max: Option<i32>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadingType {
    Fasting,
    BeforeMeal,
    AfterMeal,
    Bedtime,
    Random,
    Exercise,
    Sick,
    Stress,
    Other,
}

impl ReadingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingType::Fasting => "fasting",
            ReadingType::BeforeMeal => "before_meal",
            ReadingType::AfterMeal => "after_meal",
            ReadingType::Bedtime => "bedtime",
            ReadingType::Random => "random",
            ReadingType::Exercise => "exercise",
            ReadingType::Sick => "sick",
            ReadingType::Stress => "stress",
            ReadingType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Other,
}

/// Request payload for a new glucose reading.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewGlucoseLog {
    pub glucose_value: f64,
    #[serde(default = "mg_dl")]
    pub unit: String,
    pub reading_type: ReadingType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    pub reading_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_consumed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_duration: Option<u32>,
    #[serde(default)]
    pub insulin_taken: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insulin_units: Option<f64>,
    #[serde(default)]
    pub medication_taken: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
}

impl NewGlucoseLog {
    pub fn new(glucose_value: f64, reading_type: ReadingType, reading_time: impl Into<String>) -> Self {
        Self {
            glucose_value,
            unit: mg_dl(),
            reading_type,
            meal_type: None,
            reading_time: reading_time.into(),
            notes: None,
            symptoms: None,
            carbs_consumed: None,
            exercise_duration: None,
            insulin_taken: false,
            insulin_units: None,
            medication_taken: false,
            stress_level: None,
            sleep_hours: None,
        }
    }
}

/// Partial edit of a stored reading; omitted fields stay unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GlucoseLogUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glucose_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_type: Option<ReadingType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symptoms: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carbs_consumed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exercise_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insulin_taken: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insulin_units: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medication_taken: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stress_level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,
}

/// A stored glucose reading as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlucoseLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub glucose_value: f64,
    pub unit: String,
    pub reading_type: String,
    pub meal_type: Option<String>,
    pub reading_time: String,
    #[serde(default)]
    pub logged_time: String,
    pub notes: Option<String>,
    pub symptoms: Option<String>,
    pub carbs_consumed: Option<u32>,
    pub exercise_duration: Option<u32>,
    #[serde(default)]
    pub insulin_taken: bool,
    pub insulin_units: Option<f64>,
    #[serde(default)]
    pub medication_taken: bool,
    pub stress_level: Option<u8>,
    pub sleep_hours: Option<f64>,
    pub glucose_category: String,
    pub is_in_target_range: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlucoseLogList {
    pub logs: Vec<GlucoseLog>,
    pub total_count: u64,
    pub page: u32,
    pub page_size: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GlucoseStats {
    pub total_readings: u64,
    pub average_glucose: f64,
    pub min_glucose: f64,
    pub max_glucose: f64,
    pub readings_in_range: u64,
    pub readings_below_range: u64,
    pub readings_above_range: u64,
    pub time_in_range_percentage: f64,
    pub last_reading: Option<GlucoseLog>,
}

/// Filters for listing glucose logs. Unset fields are left off the URL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LogQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reading_type: Option<ReadingType>,
    pub min_glucose: Option<f64>,
    pub max_glucose: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn new_log_omits_unset_optionals() {
        let log = NewGlucoseLog::new(120.0, ReadingType::BeforeMeal, "2024-01-15T08:00:00");
        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["reading_type"], "before_meal");
        assert_eq!(value["unit"], "mg/dL");
        assert!(value.get("notes").is_none());
        assert_eq!(value["insulin_taken"], false);
    }

    #[test]
    fn user_tolerates_sparse_payload() {
        let user: User = serde_json::from_value(json!({
            "id": "00000000-0000-0000-0000-000000000001",
            "email": "user@example.com",
            "first_name": null,
            "last_name": null,
            "date_of_birth": null,
            "gender": null,
            "diabetes_type": null,
            "unknown_field": 1
        }))
        .unwrap();
        assert_eq!(user.preferred_unit, "mg/dL");
        assert_eq!(user.target_range_min, 70);
        assert_eq!(user.target_range_max, 180);
        assert!(!user.has_completed_onboarding);
    }

    #[test]
    fn profile_update_serializes_only_set_fields() {
        let update = ProfileUpdate {
            first_name: Some("Jane".into()),
            ..ProfileUpdate::default()
        };
        assert_eq!(serde_json::to_value(&update).unwrap(), json!({"first_name": "Jane"}));
    }
}
