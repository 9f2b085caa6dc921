#![allow(dead_code)]

// tests/common/mod.rs
use actix_web::http::header::HeaderName;
use actix_web::http::StatusCode;
use serde_json::Value;

// Logging is auto-installed for every test binary
#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

pub const TEST_SECRET: &str = "test_secret_key_for_testing_purposes_only";

/// The `x-trace-id` header must be present and non-empty.
pub fn assert_trace_header(headers: &actix_web::http::header::HeaderMap) -> String {
    let trace_hdr = HeaderName::from_static("x-trace-id");
    let trace_id = headers
        .get(&trace_hdr)
        .and_then(|v| v.to_str().ok())
        .expect("x-trace-id header should be present and valid UTF-8");
    assert!(!trace_id.is_empty(), "x-trace-id header should not be empty");
    trace_id.to_string()
}

/// Fields every task body carries.
pub fn assert_task_shape(json: &Value) {
    for key in [
        "id",
        "user_id",
        "title",
        "description",
        "completed",
        "created_at",
        "updated_at",
    ] {
        assert!(json.get(key).is_some(), "{key} field should be present");
    }
}

pub fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).expect("valid status code")
}
