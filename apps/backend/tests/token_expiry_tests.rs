mod common;
mod support;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::error_envelope::assert_envelope_from_service_response;
use backend_test_support::unique_helpers::unique_email;
use serde_json::{json, Value};
use support::create_test_app;
use tasks_backend::state::build_state;
use tasks_backend::ManualClock;

fn start() -> SystemTime {
    UNIX_EPOCH + Duration::from_secs(1_700_000_000)
}

#[actix_web::test]
async fn test_token_accepted_at_29_minutes_rejected_at_31() -> Result<(), Box<dyn std::error::Error>>
{
    let clock = ManualClock::starting_at(start());
    let state = build_state().with_clock(clock.clone()).build()?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let email = unique_email("expiry");
    let req = test::TestRequest::post()
        .uri("/api/v1/register")
        .set_json(json!({ "email": email, "password": "long-enough-pw" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["expires_in"], 1800);
    let token = body["access_token"].as_str().unwrap().to_string();

    clock.advance(Duration::from_secs(29 * 60));
    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    clock.advance(Duration::from_secs(2 * 60));
    let req = test::TestRequest::get()
        .uri("/api/v1/me")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_envelope_from_service_response(
        resp,
        StatusCode::UNAUTHORIZED,
        "AUTH_001",
        Some("Could not validate credentials"),
    )
    .await;
    Ok(())
}

#[actix_web::test]
async fn test_refresh_extends_session() -> Result<(), Box<dyn std::error::Error>> {
    let clock = ManualClock::starting_at(start());
    let state = build_state().with_clock(clock.clone()).build()?;
    let token = support::auth::mint_test_token(&state, "u-refresh", "r@example.test");
    let app = create_test_app(state).with_prod_routes().build().await;

    clock.advance(Duration::from_secs(20 * 60));
    let req = test::TestRequest::post()
        .uri("/api/auth/refresh")
        .set_json(json!({ "access_token": token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    let refreshed = body["access_token"].as_str().unwrap().to_string();
    assert_eq!(body["token_type"], "bearer");

    // Past the first token's expiry, inside the second's
    clock.advance(Duration::from_secs(15 * 60));
    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((AUTHORIZATION, format!("Bearer {token}")))
        .to_request();
    assert_eq!(
        test::call_service(&app, req).await.status(),
        StatusCode::UNAUTHORIZED
    );

    let req = test::TestRequest::get()
        .uri("/api/auth/me")
        .insert_header((AUTHORIZATION, format!("Bearer {refreshed}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let me: Value = test::read_body_json(resp).await;
    assert_eq!(me["id"], "u-refresh");
    Ok(())
}

#[actix_web::test]
async fn test_refresh_with_expired_token_fails() -> Result<(), Box<dyn std::error::Error>> {
    let clock = ManualClock::starting_at(start());
    let state = build_state().with_clock(clock.clone()).build()?;
    let token = support::auth::mint_test_token(&state, "u-late", "late@example.test");
    let app = create_test_app(state).with_prod_routes().build().await;

    clock.advance(Duration::from_secs(30 * 60));
    let req = test::TestRequest::post()
        .uri("/api/v1/refresh")
        .set_json(json!({ "access_token": token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_envelope_from_service_response(resp, StatusCode::UNAUTHORIZED, "AUTH_001", None).await;
    Ok(())
}
