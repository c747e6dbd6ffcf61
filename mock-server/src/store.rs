//! Accounts, sessions and glucose readings held in memory.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::{LogUpdate, NewLog, ProfileInput};

pub const ACCESS_TOKEN_TTL_SECS: u64 = 1800;

pub fn mg_dl() -> String {
    "mg/dL".to_string()
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub diabetes_type: Option<String>,
    pub preferred_unit: String,
    pub target_range_min: i32,
    pub target_range_max: i32,
    pub has_completed_onboarding: bool,
    pub is_active: bool,
    pub is_verified: bool,
}

impl User {
    pub fn new(email: String, first_name: &str, last_name: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            first_name: Some(first_name.to_string()),
            last_name: Some(last_name.to_string()),
            full_name: format!("{first_name} {last_name}"),
            date_of_birth: None,
            gender: None,
            diabetes_type: None,
            preferred_unit: mg_dl(),
            target_range_min: 70,
            target_range_max: 180,
            has_completed_onboarding: false,
            is_active: true,
            is_verified: false,
        }
    }

    /// Overwrite the fields present in `input`.
    pub fn apply(&mut self, input: ProfileInput) {
        if let Some(v) = input.first_name {
            self.first_name = Some(v);
        }
        if let Some(v) = input.last_name {
            self.last_name = Some(v);
        }
        if let Some(v) = input.date_of_birth {
            self.date_of_birth = Some(v);
        }
        if let Some(v) = input.gender {
            self.gender = Some(v);
        }
        if let Some(v) = input.diabetes_type {
            self.diabetes_type = Some(v);
        }
        if let Some(v) = input.preferred_unit {
            self.preferred_unit = v;
        }
        if let Some(v) = input.target_range_min {
            self.target_range_min = v;
        }
        if let Some(v) = input.target_range_max {
            self.target_range_max = v;
        }
        self.full_name = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ");
    }
}

#[derive(Clone, Debug)]
pub struct Account {
    pub user: User,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: User,
    pub tokens: Tokens,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlucoseLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub glucose_value: f64,
    pub unit: String,
    pub reading_type: String,
    pub meal_type: Option<String>,
    pub reading_time: String,
    pub logged_time: String,
    pub notes: Option<String>,
    pub symptoms: Option<String>,
    pub carbs_consumed: Option<u32>,
    pub exercise_duration: Option<u32>,
    pub insulin_taken: bool,
    pub insulin_units: Option<f64>,
    pub medication_taken: bool,
    pub stress_level: Option<u8>,
    pub sleep_hours: Option<f64>,
    pub glucose_category: String,
    pub is_in_target_range: Option<bool>,
}

impl GlucoseLog {
    pub fn new(user_id: Uuid, input: NewLog) -> Self {
        let mg_dl = to_mg_dl(input.glucose_value, &input.unit);
        Self {
            id: Uuid::new_v4(),
            user_id,
            glucose_value: input.glucose_value,
            unit: input.unit,
            reading_type: input.reading_type,
            meal_type: input.meal_type,
            reading_time: input.reading_time,
            logged_time: chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
            notes: input.notes,
            symptoms: input.symptoms,
            carbs_consumed: input.carbs_consumed,
            exercise_duration: input.exercise_duration,
            insulin_taken: input.insulin_taken,
            insulin_units: input.insulin_units,
            medication_taken: input.medication_taken,
            stress_level: input.stress_level,
            sleep_hours: input.sleep_hours,
            glucose_category: category(mg_dl).to_string(),
            is_in_target_range: Some((80.0..=180.0).contains(&mg_dl)),
        }
    }

    /// Overwrite the fields present in `input` and re-derive the category.
    pub fn apply(&mut self, input: LogUpdate) {
        if let Some(v) = input.glucose_value {
            self.glucose_value = v;
        }
        if let Some(v) = input.reading_type {
            self.reading_type = v;
        }
        if input.meal_type.is_some() {
            self.meal_type = input.meal_type;
        }
        if let Some(v) = input.reading_time {
            self.reading_time = v;
        }
        if input.notes.is_some() {
            self.notes = input.notes;
        }
        if input.symptoms.is_some() {
            self.symptoms = input.symptoms;
        }
        if input.carbs_consumed.is_some() {
            self.carbs_consumed = input.carbs_consumed;
        }
        if input.exercise_duration.is_some() {
            self.exercise_duration = input.exercise_duration;
        }
        if let Some(v) = input.insulin_taken {
            self.insulin_taken = v;
        }
        if input.insulin_units.is_some() {
            self.insulin_units = input.insulin_units;
        }
        if let Some(v) = input.medication_taken {
            self.medication_taken = v;
        }
        if input.stress_level.is_some() {
            self.stress_level = input.stress_level;
        }
        if input.sleep_hours.is_some() {
            self.sleep_hours = input.sleep_hours;
        }
        let mg_dl = to_mg_dl(self.glucose_value, &self.unit);
        self.glucose_category = category(mg_dl).to_string();
        self.is_in_target_range = Some((80.0..=180.0).contains(&mg_dl));
    }
}

fn to_mg_dl(value: f64, unit: &str) -> f64 {
    if unit == "mmol/L" {
        value * 18.0
    } else {
        value
    }
}

pub fn category(mg_dl: f64) -> &'static str {
    if mg_dl < 70.0 {
        "low"
    } else if mg_dl <= 180.0 {
        "normal"
    } else if mg_dl <= 250.0 {
        "high"
    } else {
        "very_high"
    }
}

#[derive(Debug, Default)]
pub struct Store {
    accounts: HashMap<Uuid, Account>,
    sessions: HashMap<String, Uuid>,
    logs: HashMap<Uuid, GlucoseLog>,
}

impl Store {
    pub fn insert_account(&mut self, account: Account) {
        self.accounts.insert(account.user.id, account);
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Account> {
        self.accounts.values().find(|a| a.user.email == email)
    }

    pub fn user(&self, id: Uuid) -> Option<&User> {
        self.accounts.get(&id).map(|a| &a.user)
    }

    pub fn user_mut(&mut self, id: Uuid) -> Option<&mut User> {
        self.accounts.get_mut(&id).map(|a| &mut a.user)
    }

    pub fn issue_tokens(&mut self, user_id: Uuid) -> Tokens {
        let access_token = format!("at-{}", Uuid::new_v4().simple());
        self.sessions.insert(access_token.clone(), user_id);
        Tokens {
            access_token,
            refresh_token: format!("rt-{}", Uuid::new_v4().simple()),
            token_type: "bearer".to_string(),
            expires_in: ACCESS_TOKEN_TTL_SECS,
        }
    }

    pub fn session(&self, token: &str) -> Option<Uuid> {
        self.sessions.get(token).copied()
    }

    pub fn revoke(&mut self, token: &str) {
        self.sessions.remove(token);
    }

    pub fn insert_log(&mut self, log: GlucoseLog) {
        self.logs.insert(log.id, log);
    }

    pub fn log(&self, id: Uuid) -> Option<&GlucoseLog> {
        self.logs.get(&id)
    }

    pub fn log_mut(&mut self, id: Uuid) -> Option<&mut GlucoseLog> {
        self.logs.get_mut(&id)
    }

    pub fn remove_log(&mut self, id: Uuid) -> Option<GlucoseLog> {
        self.logs.remove(&id)
    }

    /// A user's readings, newest `reading_time` first.
    pub fn logs_for(&self, user_id: Uuid) -> Vec<&GlucoseLog> {
        let mut logs: Vec<&GlucoseLog> = self.logs.values().filter(|l| l.user_id == user_id).collect();
        logs.sort_by(|a, b| b.reading_time.cmp(&a.reading_time));
        logs
    }
}

/// Summary over `logs` (newest first) against the user's target range.
pub fn summarize(logs: &[&GlucoseLog], target_min: i32, target_max: i32) -> Value {
    if logs.is_empty() {
        return json!({
            "total_readings": 0,
            "average_glucose": 0.0,
            "min_glucose": 0.0,
            "max_glucose": 0.0,
            "readings_in_range": 0,
            "readings_below_range": 0,
            "readings_above_range": 0,
            "time_in_range_percentage": 0.0,
            "last_reading": null,
        });
    }
    let values: Vec<f64> = logs.iter().map(|l| l.glucose_value).collect();
    let total = values.len();
    let (lo, hi) = (f64::from(target_min), f64::from(target_max));
    let in_range = values.iter().filter(|v| (lo..=hi).contains(*v)).count();
    let below = values.iter().filter(|v| **v < lo).count();
    let above = values.iter().filter(|v| **v > hi).count();
    let average = values.iter().sum::<f64>() / total as f64;

    json!({
        "total_readings": total,
        "average_glucose": round1(average),
        "min_glucose": values.iter().copied().fold(f64::INFINITY, f64::min),
        "max_glucose": values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        "readings_in_range": in_range,
        "readings_below_range": below,
        "readings_above_range": above,
        "time_in_range_percentage": round1(in_range as f64 * 100.0 / total as f64),
        "last_reading": logs[0],
    })
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(value: f64, unit: &str, time: &str) -> GlucoseLog {
        GlucoseLog::new(
            Uuid::nil(),
            NewLog {
                glucose_value: value,
                unit: unit.to_string(),
                reading_type: "fasting".to_string(),
                meal_type: None,
                reading_time: time.to_string(),
                notes: None,
                symptoms: None,
                carbs_consumed: None,
                exercise_duration: None,
                insulin_taken: false,
                insulin_units: None,
                medication_taken: false,
                stress_level: None,
                sleep_hours: None,
            },
        )
    }

    #[test]
    fn categories_follow_mg_dl_thresholds() {
        assert_eq!(reading(65.0, "mg/dL", "t").glucose_category, "low");
        assert_eq!(reading(180.0, "mg/dL", "t").glucose_category, "normal");
        assert_eq!(reading(250.0, "mg/dL", "t").glucose_category, "high");
        assert_eq!(reading(251.0, "mg/dL", "t").glucose_category, "very_high");
        assert_eq!(reading(12.0, "mmol/L", "t").glucose_category, "high");
    }

    #[test]
    fn update_rederives_category() {
        let mut log = reading(110.0, "mg/dL", "2024-01-15T07:00:00");
        log.apply(LogUpdate {
            glucose_value: Some(260.0),
            notes: Some("after pizza".to_string()),
            ..LogUpdate::default()
        });
        assert_eq!(log.glucose_value, 260.0);
        assert_eq!(log.glucose_category, "very_high");
        assert_eq!(log.is_in_target_range, Some(false));
        assert_eq!(log.notes.as_deref(), Some("after pizza"));
        assert_eq!(log.reading_time, "2024-01-15T07:00:00");
    }

    #[test]
    fn target_range_flag() {
        assert_eq!(reading(79.0, "mg/dL", "t").is_in_target_range, Some(false));
        assert_eq!(reading(5.0, "mmol/L", "t").is_in_target_range, Some(true));
    }

    #[test]
    fn summary_counts_against_target_range() {
        let logs = [
            reading(60.0, "mg/dL", "2024-01-15T10:00:00"),
            reading(100.0, "mg/dL", "2024-01-15T09:00:00"),
            reading(200.0, "mg/dL", "2024-01-15T08:00:00"),
        ];
        let refs: Vec<&GlucoseLog> = logs.iter().collect();
        let stats = summarize(&refs, 70, 180);
        assert_eq!(stats["total_readings"], 3);
        assert_eq!(stats["average_glucose"], 120.0);
        assert_eq!(stats["min_glucose"], 60.0);
        assert_eq!(stats["max_glucose"], 200.0);
        assert_eq!(stats["readings_in_range"], 1);
        assert_eq!(stats["readings_below_range"], 1);
        assert_eq!(stats["readings_above_range"], 1);
        assert_eq!(stats["time_in_range_percentage"], 33.3);
        assert_eq!(stats["last_reading"]["reading_time"], "2024-01-15T10:00:00");
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let stats = summarize(&[], 70, 180);
        assert_eq!(stats["total_readings"], 0);
        assert!(stats["last_reading"].is_null());
    }

    #[test]
    fn profile_update_recomputes_full_name() {
        let mut user = User::new("a@b.co".to_string(), "Jane", "Doe");
        user.apply(ProfileInput {
            last_name: Some("Smith".to_string()),
            target_range_max: Some(160),
            ..ProfileInput::default()
        });
        assert_eq!(user.full_name, "Jane Smith");
        assert_eq!(user.target_range_max, 160);
        assert_eq!(user.target_range_min, 70);
    }
}
