//! End-to-end tests against a live mock backend.
//!
//! # Design
//! Starts the mock server on a random port and drives it through the real
//! `UreqTransport`, so request building, the wire, and response parsing are
//! exercised together. Failure modes that the mock cannot produce (slow
//! responses, refused connections) get their own throwaway listeners.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use glucovision_core::alert::{AlertKind, QueuedAlerter};
use glucovision_core::error::{NETWORK_MESSAGE, TIMEOUT_MESSAGE};
use glucovision_core::types::{
    GlucoseLogUpdate, LogQuery, LoginRequest, NewGlucoseLog, ProfileUpdate, ReadingType, RegisterRequest,
};
use glucovision_core::{ApiConfig, GlucoVisionClient, RequestDescriptor, RequestEngine};
use serde_json::json;

/// Serve the mock backend on `127.0.0.1:0` from a background thread.
fn start_mock() -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });
    addr
}

/// Serve a single route that answers only after `delay`.
fn start_slow(delay: Duration) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let app = axum::Router::new().route(
                "/slow",
                axum::routing::get(move || async move {
                    tokio::time::sleep(delay).await;
                    "finally"
                }),
            );
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            axum::serve(listener, app).await
        })
        .unwrap();
    });
    addr
}

/// Answer one connection with a canned raw HTTP response.
fn start_raw(response: Vec<u8>) -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }
        stream.write_all(&response).unwrap();
    });
    addr
}

fn config(addr: SocketAddr) -> ApiConfig {
    ApiConfig::new(&format!("http://{addr}"))
}

fn registration(email: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        email: email.to_string(),
        password: password.to_string(),
        confirm_password: password.to_string(),
        first_name: "Jane".to_string(),
        last_name: "Doe".to_string(),
    }
}

#[test]
fn account_and_glucose_lifecycle() {
    let addr = start_mock();
    let mut client = GlucoVisionClient::new(config(addr));

    // Step 1: health is public.
    let health = client.health().into_result().unwrap();
    assert_eq!(health.status, "healthy");

    // Step 2: register and keep the access token.
    let auth = client
        .register(&registration("jane@example.com", "SecurePass123"))
        .into_result()
        .unwrap();
    assert_eq!(auth.user.email, "jane@example.com");
    client.set_token(auth.tokens.access_token.clone());

    let me = client.current_user();
    assert!(me.is_success());
    assert_eq!(me.message(), Some("User information retrieved successfully"));
    assert_eq!(me.data().unwrap().user.id, auth.user.id);

    // Step 3: partial profile update.
    let updated = client
        .update_profile(&ProfileUpdate {
            first_name: Some("Janet".to_string()),
            target_range_max: Some(160),
            ..ProfileUpdate::default()
        })
        .into_result()
        .unwrap();
    assert_eq!(updated.full_name, "Janet Doe");
    assert_eq!(updated.target_range_max, 160);
    assert_eq!(client.profile().into_result().unwrap().first_name.as_deref(), Some("Janet"));

    // Step 4: log readings.
    let mut fasting = NewGlucoseLog::new(98.0, ReadingType::Fasting, "2024-01-15T07:00:00");
    fasting.notes = Some("before coffee".to_string());
    let first = client.create_glucose_log(&fasting).into_result().unwrap();
    assert_eq!(first.glucose_category, "normal");
    assert_eq!(first.notes.as_deref(), Some("before coffee"));

    let after_meal = NewGlucoseLog::new(190.0, ReadingType::AfterMeal, "2024-01-15T13:30:00");
    let second = client.create_glucose_log(&after_meal).into_result().unwrap();
    assert_eq!(second.glucose_category, "high");

    // Step 5: list with and without filters.
    let all = client.glucose_logs(&LogQuery::default()).into_result().unwrap();
    assert_eq!(all.total_count, 2);
    assert_eq!(all.logs[0].id, second.id, "newest reading first");

    let fasting_only = client
        .glucose_logs(&LogQuery {
            reading_type: Some(ReadingType::Fasting),
            ..LogQuery::default()
        })
        .into_result()
        .unwrap();
    assert_eq!(fasting_only.total_count, 1);
    assert_eq!(fasting_only.logs[0].id, first.id);

    // Step 6: stats against the updated target range (70..=160).
    let stats = client.glucose_stats(Some(30)).into_result().unwrap();
    assert_eq!(stats.total_readings, 2);
    assert_eq!(stats.readings_in_range, 1);
    assert_eq!(stats.readings_above_range, 1);
    assert_eq!(stats.average_glucose, 144.0);
    assert_eq!(stats.last_reading.map(|l| l.id), Some(second.id));

    // Step 7: correct a reading; untouched fields survive.
    let corrected = client
        .update_glucose_log(
            second.id,
            &GlucoseLogUpdate {
                glucose_value: Some(150.0),
                ..GlucoseLogUpdate::default()
            },
        )
        .into_result()
        .unwrap();
    assert_eq!(corrected.glucose_category, "normal");
    assert_eq!(corrected.reading_time, "2024-01-15T13:30:00");
    assert_eq!(
        client.update_glucose_log(second.id, &GlucoseLogUpdate::default()).error(),
        Some("No data provided for update")
    );

    // Step 8: fetch, delete, fetch again.
    assert_eq!(client.glucose_log(first.id).into_result().unwrap().id, first.id);
    let deleted = client.delete_glucose_log(first.id);
    assert_eq!(deleted.message(), Some("Glucose log deleted successfully"));
    let gone = client.glucose_log(first.id);
    assert!(!gone.is_success());
    assert_eq!(gone.error(), Some("Glucose log not found"));

    // Step 9: logout invalidates the token server-side.
    assert_eq!(client.logout().message(), Some("Logout successful"));
    assert_eq!(client.profile().error(), Some("Could not validate credentials"));

    client.clear_token();
    assert_eq!(client.profile().error(), Some("Not authenticated"));
}

#[test]
fn server_error_details_become_envelope_errors() {
    let addr = start_mock();
    let client = GlucoVisionClient::new(config(addr));

    assert!(client.register(&registration("dup@example.com", "SecurePass123")).is_success());
    let dup = client.register(&registration("dup@example.com", "SecurePass123"));
    assert_eq!(dup.error(), Some("Email already registered"));

    let mut weak = registration("weak@example.com", "short");
    weak.confirm_password = "different".to_string();
    let weak = client.register(&weak);
    assert_eq!(
        weak.error(),
        Some("Password must be at least 8 characters long; Passwords do not match")
    );

    let login = client.login(&LoginRequest {
        email: "dup@example.com".to_string(),
        password: "WrongPass1".to_string(),
    });
    assert_eq!(login.error(), Some("Invalid email or password"));
}

#[test]
fn unknown_route_falls_back_to_status() {
    let addr = start_mock();
    let engine = RequestEngine::new(config(addr));
    let result = engine.request(RequestDescriptor::get("/api/v1/does-not-exist"));
    assert!(!result.is_success());
    assert_eq!(result.error(), Some("HTTP 404"));
}

#[test]
fn plain_text_error_body_is_used_verbatim() {
    let addr = start_mock();
    let engine = RequestEngine::new(config(addr));
    let result = engine.request(
        RequestDescriptor::post("/api/v1/auth/register").json(json!({"email": "x@example.com"})),
    );
    let error = result.error().unwrap();
    assert!(error.contains("missing field"), "got: {error}");
    assert_ne!(error, "HTTP 422");
}

#[test]
fn query_parameters_reach_the_server() {
    let addr = start_mock();
    let engine = RequestEngine::new(config(addr));
    let auth = engine.request(
        RequestDescriptor::post("/api/v1/auth/register")
            .json(serde_json::to_value(registration("q@example.com", "SecurePass123")).unwrap()),
    );
    let token = auth.data().unwrap()["tokens"]["access_token"].as_str().unwrap().to_string();

    let rejected = engine.request(
        RequestDescriptor::get("/api/v1/glucose/logs")
            .bearer(token.as_str())
            .query("page_size", 500),
    );
    assert_eq!(rejected.error(), Some("Input should be between 1 and 100"));

    let accepted = engine.request(
        RequestDescriptor::get("/api/v1/glucose/logs")
            .bearer(token.as_str())
            .query("page", 2)
            .query("reading_type", None::<&str>),
    );
    assert_eq!(accepted.data().unwrap()["page"], 2);
}

#[test]
fn slow_server_times_out() {
    let addr = start_slow(Duration::from_secs(3));
    let engine = RequestEngine::new(config(addr).with_timeout(Duration::from_millis(200)));

    let started = std::time::Instant::now();
    let result = engine.request(RequestDescriptor::get("/slow"));
    assert_eq!(result.error(), Some(TIMEOUT_MESSAGE));
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn refused_connection_is_network_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let engine = RequestEngine::new(config(addr));
    let result = engine.request(RequestDescriptor::get("/health"));
    assert!(!result.is_success());
    assert_eq!(result.error(), Some(NETWORK_MESSAGE));
}

#[test]
fn non_utf8_error_body_is_a_server_reply_not_a_network_error() {
    let mut response = b"HTTP/1.1 500 Internal Server Error\r\n\
        Content-Type: application/octet-stream\r\n\
        Content-Length: 4\r\n\
        Connection: close\r\n\r\n"
        .to_vec();
    response.extend_from_slice(&[0xff, 0xfe, 0x00, 0x41]);
    let addr = start_raw(response);

    let engine = RequestEngine::new(config(addr));
    let result = engine.request(RequestDescriptor::get("/x"));
    assert!(!result.is_success());
    let error = result.error().unwrap();
    assert_ne!(error, NETWORK_MESSAGE);
    assert_eq!(error, "\u{FFFD}\u{FFFD}\u{0}A");
}

#[test]
fn alerts_use_server_message_on_success_and_error_text_on_failure() {
    let addr = start_mock();
    let alerts = Arc::new(QueuedAlerter::new());
    let engine = RequestEngine::new(config(addr)).with_alerter(Arc::clone(&alerts));

    let body = serde_json::to_value(registration("alert@example.com", "SecurePass123")).unwrap();
    engine.request(
        RequestDescriptor::post("/api/v1/auth/register")
            .json(body.clone())
            .success_alert(None),
    );
    engine.request(
        RequestDescriptor::post("/api/v1/auth/register")
            .json(body)
            .error_alert(None),
    );
    engine.request(
        RequestDescriptor::post("/api/v1/auth/login")
            .json(json!({"email": "alert@example.com", "password": "nope"}))
            .error_alert(Some("Could not sign in")),
    );

    let seen = alerts.drain();
    assert_eq!(seen.len(), 3);
    assert_eq!(seen[0].kind, AlertKind::Success);
    assert_eq!(seen[0].message, "User registered successfully");
    assert_eq!(seen[1].kind, AlertKind::Error);
    assert_eq!(seen[1].message, "Email already registered");
    assert_eq!(seen[2].message, "Could not sign in");
}
