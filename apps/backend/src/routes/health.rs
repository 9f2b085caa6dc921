use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::error::AppError;

pub const SERVICE_NAME: &str = "todo-api-backend";

#[derive(Debug, Serialize)]
struct RootResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
}

pub async fn root() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(RootResponse {
        message: "Secure Todo API Backend",
    }))
}

async fn health() -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
        version: env!("CARGO_PKG_VERSION"),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(root))
            .default_service(web::to(super::method_not_allowed)),
    )
    .service(
        web::resource("/health")
            .route(web::get().to(health))
            .default_service(web::to(super::method_not_allowed)),
    );
}
