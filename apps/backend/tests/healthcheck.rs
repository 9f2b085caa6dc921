mod common;
mod support;

use actix_web::test;
use serde_json::Value;
use support::create_test_app;
use tasks_backend::state::build_state;

#[actix_web::test]
async fn test_health_endpoint() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state().build()?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status().as_u16(), 200);
    common::assert_trace_header(resp.headers());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "todo-api-backend");
    assert!(body["version"].as_str().is_some_and(|v| !v.is_empty()));
    Ok(())
}

#[actix_web::test]
async fn test_root_endpoint() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_state().build()?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["message"], "Secure Todo API Backend");
    Ok(())
}
