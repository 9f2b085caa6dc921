//! Error envelope test helpers
//!
//! Assertions for the stable error contract without depending on backend
//! types: `{detail, error_code, timestamp, request_id}` plus the
//! `x-trace-id` header.

use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Local mirror of the backend's error body
#[derive(Debug, Deserialize, Serialize)]
pub struct ErrorEnvelopeLike {
    pub detail: String,
    pub error_code: String,
    pub timestamp: String,
    pub request_id: String,
}

/// Assert that response parts conform to the error contract and return the
/// parsed body for further checks.
pub fn assert_envelope_from_parts(
    status: StatusCode,
    headers: &actix_web::http::header::HeaderMap,
    body_bytes: &[u8],
    expected_status: StatusCode,
    expected_code: &str,
    expected_detail_contains: Option<&str>,
) -> ErrorEnvelopeLike {
    assert_eq!(status, expected_status);

    let content_type = headers
        .get(actix_web::http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/json"),
        "Content-Type must be application/json (got {content_type})"
    );

    let envelope: ErrorEnvelopeLike =
        serde_json::from_slice(body_bytes).expect("Response body should be an error envelope");

    assert_eq!(envelope.error_code, expected_code);
    assert!(
        OffsetDateTime::parse(&envelope.timestamp, &Rfc3339).is_ok(),
        "timestamp should be RFC 3339, got '{}'",
        envelope.timestamp
    );
    assert!(!envelope.request_id.is_empty(), "request_id must be set");

    if let Some(expected_detail) = expected_detail_contains {
        assert!(
            envelope.detail.contains(expected_detail),
            "Expected detail to contain '{}', but got '{}'",
            expected_detail,
            envelope.detail
        );
    }

    envelope
}

/// Assert that a `ServiceResponse` carries the error envelope.
pub async fn assert_envelope_from_service_response<B>(
    resp: actix_web::dev::ServiceResponse<B>,
    expected_status: StatusCode,
    expected_code: &str,
    expected_detail_contains: Option<&str>,
) -> ErrorEnvelopeLike
where
    B: actix_web::body::MessageBody,
{
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_envelope_from_parts(
        status,
        &headers,
        &body,
        expected_status,
        expected_code,
        expected_detail_contains,
    )
}
