//! Check rule evaluation and error-message extraction against the JSON
//! vectors in `test-vectors/`.
//!
//! The vector files are shared with host-side tests, so the same cases pin
//! down behavior on both sides of the FFI.

use std::time::Duration;

use glucovision_core::transport::FnTransport;
use glucovision_core::{ApiConfig, FormState, HttpRequest, HttpResponse, RequestDescriptor, RequestEngine, Rule, RuleSpec};
use serde_json::Value;

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

#[test]
fn validation_vectors() {
    for case in cases(include_str!("../../test-vectors/validation.json")) {
        let name = case["name"].as_str().unwrap();
        let spec: RuleSpec = serde_json::from_value(case["rule"].clone()).unwrap();
        let rule = Rule::try_from(spec).unwrap();
        let mut form = FormState::with_rules([("field", rule)]);
        form.set_value("field", case["value"].as_str().unwrap());

        let expected = case["error"].as_str().unwrap();
        let passed = form.validate_field("field");
        assert_eq!(passed, expected.is_empty(), "{name}: pass/fail");
        assert_eq!(form.errors()["field"], expected, "{name}: message");
    }
}

#[test]
fn error_message_vectors() {
    for case in cases(include_str!("../../test-vectors/error_messages.json")) {
        let name = case["name"].as_str().unwrap().to_string();
        let status = case["status"].as_u64().unwrap() as u16;
        let content_type = case["content_type"].as_str().unwrap().to_string();
        let body = case["body"].as_str().unwrap().to_string();

        let transport = FnTransport(move |_: &HttpRequest, _: Duration| {
            Ok(HttpResponse {
                status,
                headers: vec![("Content-Type".to_string(), content_type.clone())],
                body: body.clone(),
            })
        });
        let engine = RequestEngine::with_transport(ApiConfig::new("http://localhost:8000"), transport);
        let result = engine.request(RequestDescriptor::get("/api/v1/anything"));

        assert!(!result.is_success(), "{name}");
        assert_eq!(result.error(), case["error"].as_str(), "{name}");
        assert!(result.data().is_none(), "{name}");
    }
}
