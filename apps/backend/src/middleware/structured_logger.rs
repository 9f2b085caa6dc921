//! Access log: one `request_completed` event per request.
//!
//! Besides method, path, status and latency the event records who the gate
//! let through (`subject`, `-` for public or rejected requests) and the
//! envelope code when the request failed with an [`AppError`].

use std::future::{ready, Ready};
use std::time::Instant;

use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::{Error as ActixError, HttpMessage};
use futures_util::future::LocalBoxFuture;
use tracing::{error, info, warn};

use super::request_trace::TraceId;
use crate::auth::identity::IdentityContext;
use crate::error::AppError;

struct Completed {
    method: String,
    path: String,
    trace_id: String,
    subject: String,
    status: StatusCode,
    error_code: Option<&'static str>,
    duration_us: u64,
}

impl Completed {
    fn emit(&self) {
        let status = self.status.as_u16();
        let error_code = self.error_code.unwrap_or("-");
        if self.status.is_server_error() {
            error!(http.method = %self.method, url.path = %self.path, http.status_code = status, duration_us = self.duration_us, trace_id = %self.trace_id, subject = %self.subject, error_code, "request_completed");
        } else if self.status.is_client_error() {
            warn!(http.method = %self.method, url.path = %self.path, http.status_code = status, duration_us = self.duration_us, trace_id = %self.trace_id, subject = %self.subject, error_code, "request_completed");
        } else {
            info!(http.method = %self.method, url.path = %self.path, http.status_code = status, duration_us = self.duration_us, trace_id = %self.trace_id, subject = %self.subject, "request_completed");
        }
    }
}

fn response_error_code<B>(res: &ServiceResponse<B>) -> Option<&'static str> {
    res.response()
        .error()
        .and_then(|err| err.as_error::<AppError>())
        .map(|app_err| app_err.code().as_str())
}

pub struct StructuredLogger;

impl<S, B> Transform<S, ServiceRequest> for StructuredLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type InitError = ();
    type Transform = StructuredLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(StructuredLoggerMiddleware { service }))
    }
}

pub struct StructuredLoggerMiddleware<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for StructuredLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start = Instant::now();
        let method = req.method().to_string();
        let path = req.path().to_string();
        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .map(|t| t.0.clone())
            .unwrap_or_else(|| "unknown".to_string());

        let fut = self.service.call(req);

        Box::pin(async move {
            let result = fut.await;

            let (status, error_code, subject) = match &result {
                Ok(res) => (
                    res.status(),
                    response_error_code(res),
                    res.request()
                        .extensions()
                        .get::<IdentityContext>()
                        .map(|identity| identity.subject().to_string()),
                ),
                Err(err) => (
                    err.as_response_error().status_code(),
                    err.as_error::<AppError>().map(|e| e.code().as_str()),
                    None,
                ),
            };

            Completed {
                method,
                path,
                trace_id,
                subject: subject.unwrap_or_else(|| "-".to_string()),
                status,
                error_code,
                duration_us: start.elapsed().as_micros() as u64,
            }
            .emit();

            result
        })
    }
}
