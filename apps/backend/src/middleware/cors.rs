use actix_cors::Cors;
use actix_web::http::header;

use super::request_trace::TRACE_HEADER;

/// CORS for the configured browser origins.
///
/// Entries that are empty, `null`, or not http(s) are ignored. An empty
/// result falls back to the local frontend.
pub fn cors_middleware(origins: &[String]) -> Cors {
    let mut effective: Vec<&str> = origins
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "null")
        .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
        .collect();

    if effective.is_empty() {
        effective.push("http://localhost:3000");
    }

    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers(vec![header::HeaderName::from_static(TRACE_HEADER)])
        .supports_credentials()
        .max_age(3600);

    for origin in effective {
        cors = cors.allowed_origin(origin);
    }

    cors
}
