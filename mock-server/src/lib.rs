//! In-memory stand-in for the GlucoVision backend.
//!
//! Serves the auth, profile and glucose routes the mobile client uses,
//! with the same JSON shapes and error bodies (`{"detail": ...}`), so the
//! client can be exercised end to end without a database.

pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub use store::{Account, AuthResponse, GlucoseLog, Store, Tokens, User};

pub type Db = Arc<RwLock<Store>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/auth/register", post(register))
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/users/profile", get(profile).put(update_profile))
        .route("/api/v1/glucose/logs", get(list_logs).post(create_log))
        .route(
            "/api/v1/glucose/logs/{id}",
            get(get_log).put(update_log).delete(delete_log),
        )
        .route("/api/v1/glucose/stats", get(stats))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Error body in the backend's shape: `{"detail": <string or array>}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    detail: Value,
}

impl ApiError {
    fn new(status: StatusCode, detail: &str) -> Self {
        Self {
            status,
            detail: Value::String(detail.to_string()),
        }
    }

    /// 422 with one `{loc, msg, type}` entry per problem.
    fn validation(location: &str, problems: Vec<(&str, String)>) -> Self {
        let detail = problems
            .into_iter()
            .map(|(field, msg)| json!({"loc": [location, field], "msg": msg, "type": "value_error"}))
            .collect();
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            detail: Value::Array(detail),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}

fn bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Not authenticated"))
}

fn authenticate(headers: &HeaderMap, store: &Store) -> Result<Uuid, ApiError> {
    let token = bearer_token(headers)?;
    store
        .session(token)
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "version": "1.0.0" }))
}

// --- auth ---

#[derive(Deserialize)]
pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Deserialize)]
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

fn register_problems(input: &RegisterInput) -> Vec<(&'static str, String)> {
    let mut problems = Vec::new();
    let at = input.email.find('@');
    if !matches!(at, Some(i) if i > 0 && input.email[i + 1..].contains('.')) {
        problems.push(("email", "value is not a valid email address".to_string()));
    }
    let pw = &input.password;
    if pw.chars().count() < 8 {
        problems.push(("password", "Password must be at least 8 characters long".to_string()));
    } else if !(pw.chars().any(|c| c.is_ascii_uppercase())
        && pw.chars().any(|c| c.is_ascii_lowercase())
        && pw.chars().any(|c| c.is_ascii_digit()))
    {
        problems.push((
            "password",
            "Password must contain uppercase, lowercase, and numeric characters".to_string(),
        ));
    }
    if input.confirm_password != input.password {
        problems.push(("confirm_password", "Passwords do not match".to_string()));
    }
    for (field, value) in [("first_name", &input.first_name), ("last_name", &input.last_name)] {
        match value.trim().chars().count() {
            0 => problems.push((field, "String should have at least 1 character".to_string())),
            n if n > 50 => problems.push((field, "String should have at most 50 characters".to_string())),
            _ => {}
        }
    }
    problems
}

async fn register(
    State(db): State<Db>,
    Json(input): Json<RegisterInput>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let problems = register_problems(&input);
    if !problems.is_empty() {
        return Err(ApiError::validation("body", problems));
    }
    let mut store = db.write().await;
    let email = input.email.trim().to_lowercase();
    if store.find_by_email(&email).is_some() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "Email already registered"));
    }
    let user = User::new(email, input.first_name.trim(), input.last_name.trim());
    store.insert_account(Account {
        user: user.clone(),
        password: input.password,
    });
    let tokens = store.issue_tokens(user.id);
    tracing::info!(user_id = %user.id, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            user,
            tokens,
        }),
    ))
}

async fn login(
    State(db): State<Db>,
    Json(input): Json<LoginInput>,
) -> Result<Json<AuthResponse>, ApiError> {
    let mut store = db.write().await;
    let email = input.email.trim().to_lowercase();
    let user = match store.find_by_email(&email) {
        Some(account) if account.password == input.password => account.user.clone(),
        _ => {
            tracing::warn!(%email, "failed login");
            return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid email or password"));
        }
    };
    if !user.is_active {
        return Err(ApiError::new(StatusCode::FORBIDDEN, "Account is deactivated"));
    }
    let tokens = store.issue_tokens(user.id);
    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        user,
        tokens,
    }))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let user = current_user(&headers, &store)?;
    Ok(Json(json!({
        "user": user,
        "message": "User information retrieved successfully",
    })))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    let user_id = authenticate(&headers, &store)?;
    store.revoke(bearer_token(&headers)?);
    tracing::info!(%user_id, "user logged out");
    Ok(Json(json!({ "message": "Logout successful" })))
}

fn current_user(headers: &HeaderMap, store: &Store) -> Result<User, ApiError> {
    let user_id = authenticate(headers, store)?;
    store
        .user(user_id)
        .cloned()
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Could not validate credentials"))
}

// --- profile ---

#[derive(Debug, Default, Deserialize)]
pub struct ProfileInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub gender: Option<String>,
    pub diabetes_type: Option<String>,
    pub preferred_unit: Option<String>,
    pub target_range_min: Option<i32>,
    pub target_range_max: Option<i32>,
}

async fn profile(State(db): State<Db>, headers: HeaderMap) -> Result<Json<User>, ApiError> {
    let store = db.read().await;
    current_user(&headers, &store).map(Json)
}

async fn update_profile(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ProfileInput>,
) -> Result<Json<User>, ApiError> {
    let mut store = db.write().await;
    let user_id = authenticate(&headers, &store)?;
    let min = input.target_range_min;
    let max = input.target_range_max;
    let user = store
        .user_mut(user_id)
        .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Could not validate credentials"))?;
    if min.unwrap_or(user.target_range_min) >= max.unwrap_or(user.target_range_max) {
        return Err(ApiError::validation(
            "body",
            vec![("target_range_max", "Target maximum must be greater than minimum".to_string())],
        ));
    }
    user.apply(input);
    Ok(Json(user.clone()))
}

// --- glucose ---

const READING_TYPES: [&str; 9] = [
    "fasting",
    "before_meal",
    "after_meal",
    "bedtime",
    "random",
    "exercise",
    "sick",
    "stress",
    "other",
];

#[derive(Debug, Deserialize)]
pub struct NewLog {
    pub glucose_value: f64,
    #[serde(default = "store::mg_dl")]
    pub unit: String,
    pub reading_type: String,
    pub meal_type: Option<String>,
    pub reading_time: String,
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
}

fn log_problems(input: &NewLog) -> Vec<(&'static str, String)> {
    let mut problems = Vec::new();
    if !(input.glucose_value > 0.0 && input.glucose_value <= 1000.0) {
        problems.push(("glucose_value", "Glucose value must be between 0 and 1000".to_string()));
    }
    if input.unit != "mg/dL" && input.unit != "mmol/L" {
        problems.push(("unit", "Unit must be mg/dL or mmol/L".to_string()));
    }
    if !READING_TYPES.contains(&input.reading_type.as_str()) {
        problems.push(("reading_type", format!("Unknown reading type '{}'", input.reading_type)));
    }
    if input.stress_level.is_some_and(|s| !(1..=10).contains(&s)) {
        problems.push(("stress_level", "Stress level must be between 1 and 10".to_string()));
    }
    problems
}

/// Partial edit of a reading; absent fields stay as they are.
#[derive(Debug, Default, Deserialize)]
pub struct LogUpdate {
    pub glucose_value: Option<f64>,
    pub reading_type: Option<String>,
    pub meal_type: Option<String>,
    pub reading_time: Option<String>,
    pub notes: Option<String>,
    pub symptoms: Option<String>,
    pub carbs_consumed: Option<u32>,
    pub exercise_duration: Option<u32>,
    pub insulin_taken: Option<bool>,
    pub insulin_units: Option<f64>,
    pub medication_taken: Option<bool>,
    pub stress_level: Option<u8>,
    pub sleep_hours: Option<f64>,
}

impl LogUpdate {
    fn is_empty(&self) -> bool {
        self.glucose_value.is_none()
            && self.reading_type.is_none()
            && self.meal_type.is_none()
            && self.reading_time.is_none()
            && self.notes.is_none()
            && self.symptoms.is_none()
            && self.carbs_consumed.is_none()
            && self.exercise_duration.is_none()
            && self.insulin_taken.is_none()
            && self.insulin_units.is_none()
            && self.medication_taken.is_none()
            && self.stress_level.is_none()
            && self.sleep_hours.is_none()
    }
}

fn update_problems(input: &LogUpdate) -> Vec<(&'static str, String)> {
    let mut problems = Vec::new();
    if input.glucose_value.is_some_and(|v| !(v > 0.0 && v <= 1000.0)) {
        problems.push(("glucose_value", "Glucose value must be between 0 and 1000".to_string()));
    }
    if let Some(t) = input.reading_type.as_deref().filter(|t| !READING_TYPES.contains(t)) {
        problems.push(("reading_type", format!("Unknown reading type '{t}'")));
    }
    if input.stress_level.is_some_and(|s| !(1..=10).contains(&s)) {
        problems.push(("stress_level", "Stress level must be between 1 and 10".to_string()));
    }
    problems
}

async fn create_log(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<NewLog>,
) -> Result<(StatusCode, Json<GlucoseLog>), ApiError> {
    let mut store = db.write().await;
    let user_id = authenticate(&headers, &store)?;
    let problems = log_problems(&input);
    if !problems.is_empty() {
        return Err(ApiError::validation("body", problems));
    }
    let log = GlucoseLog::new(user_id, input);
    store.insert_log(log.clone());
    tracing::info!(%user_id, log_id = %log.id, value = log.glucose_value, "glucose log created");
    Ok((StatusCode::CREATED, Json(log)))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub reading_type: Option<String>,
    pub min_glucose: Option<f64>,
    pub max_glucose: Option<f64>,
}

async fn list_logs(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let user_id = authenticate(&headers, &store)?;
    let page = params.page.unwrap_or(1);
    let page_size = params.page_size.unwrap_or(20);
    let mut problems = Vec::new();
    if page < 1 {
        problems.push(("page", "Input should be greater than or equal to 1".to_string()));
    }
    if !(1..=100).contains(&page_size) {
        problems.push(("page_size", "Input should be between 1 and 100".to_string()));
    }
    if !problems.is_empty() {
        return Err(ApiError::validation("query", problems));
    }

    let matching: Vec<&GlucoseLog> = store
        .logs_for(user_id)
        .into_iter()
        .filter(|l| params.reading_type.as_deref().is_none_or(|t| l.reading_type == t))
        .filter(|l| params.min_glucose.is_none_or(|m| l.glucose_value >= m))
        .filter(|l| params.max_glucose.is_none_or(|m| l.glucose_value <= m))
        .filter(|l| params.start_date.as_deref().is_none_or(|d| l.reading_time.as_str() >= d))
        .filter(|l| params.end_date.as_deref().is_none_or(|d| l.reading_time.as_str() <= d))
        .collect();
    let total = matching.len();
    let offset = (page as usize - 1).saturating_mul(page_size as usize);
    let logs: Vec<&GlucoseLog> = matching.into_iter().skip(offset).take(page_size as usize).collect();
    let has_next = offset.saturating_add(logs.len()) < total;

    Ok(Json(json!({
        "logs": logs,
        "total_count": total,
        "page": page,
        "page_size": page_size,
        "has_next": has_next,
        "has_previous": page > 1,
    })))
}

fn owned_log(store: &Store, user_id: Uuid, id: Uuid) -> Result<&GlucoseLog, ApiError> {
    let log = store
        .log(id)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Glucose log not found"))?;
    if log.user_id != user_id {
        return Err(ApiError::new(StatusCode::FORBIDDEN, "Access denied"));
    }
    Ok(log)
}

async fn get_log(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<GlucoseLog>, ApiError> {
    let store = db.read().await;
    let user_id = authenticate(&headers, &store)?;
    owned_log(&store, user_id, id).cloned().map(Json)
}

async fn update_log(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(input): Json<LogUpdate>,
) -> Result<Json<GlucoseLog>, ApiError> {
    let mut store = db.write().await;
    let user_id = authenticate(&headers, &store)?;
    owned_log(&store, user_id, id)?;
    if input.is_empty() {
        return Err(ApiError::new(StatusCode::BAD_REQUEST, "No data provided for update"));
    }
    let problems = update_problems(&input);
    if !problems.is_empty() {
        return Err(ApiError::validation("body", problems));
    }
    let log = store
        .log_mut(id)
        .ok_or_else(|| ApiError::new(StatusCode::NOT_FOUND, "Glucose log not found"))?;
    log.apply(input);
    tracing::info!(%user_id, log_id = %id, "glucose log updated");
    Ok(Json(log.clone()))
}

async fn delete_log(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let mut store = db.write().await;
    let user_id = authenticate(&headers, &store)?;
    owned_log(&store, user_id, id)?;
    store.remove_log(id);
    Ok(Json(json!({ "message": "Glucose log deleted successfully" })))
}

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub days: Option<u32>,
}

async fn stats(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(params): Query<StatsParams>,
) -> Result<Json<Value>, ApiError> {
    let store = db.read().await;
    let user = current_user(&headers, &store)?;
    if params.days.is_some_and(|d| !(1..=365).contains(&d)) {
        return Err(ApiError::validation(
            "query",
            vec![("days", "Input should be between 1 and 365".to_string())],
        ));
    }
    Ok(Json(crate::store::summarize(
        &store.logs_for(user.id),
        user.target_range_min,
        user.target_range_max,
    )))
}
