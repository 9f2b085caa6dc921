use actix_web::{error, web, HttpRequest, HttpResponse};

use crate::auth::route_classifier::DEFAULT_API_PREFIXES;
use crate::error::AppError;

pub mod auth;
pub mod health;
pub mod tasks;

/// Fallback for unmatched paths; wire with `App::default_service`.
pub async fn not_found(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::not_found(format!(
        "No route for {} {}",
        req.method(),
        req.path()
    )))
}

/// Fallback for a known path hit with a method it does not serve; wire with
/// `Resource::default_service`.
pub async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, AppError> {
    Err(AppError::method_not_allowed(req.method()))
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::invalid(format!("Invalid path parameter: {err}")).into()
}

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::invalid(format!("Invalid query parameter: {err}")).into()
}

/// Register every route.
///
/// Auth endpoints are mounted under each default API prefix; task routes
/// live under `/api`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::PathConfig::default().error_handler(path_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .configure(health::configure_routes);

    for prefix in DEFAULT_API_PREFIXES {
        cfg.service(web::scope(prefix).configure(auth::configure_routes));
    }

    cfg.service(web::scope("/api").configure(tasks::configure_routes));
}
