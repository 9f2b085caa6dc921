//! Outermost failure boundary for the application.
//!
//! Any failure that is not already an [`AppError`] (extractor, routing and
//! payload errors from actix, whether returned as `Err` or attached to a
//! rendered response) is converted into one, and a panic inside a handler
//! becomes an internal error. Every failed request ends with the JSON
//! error envelope instead of a framework default body or a dropped
//! connection.

use std::panic::AssertUnwindSafe;
use std::rc::Rc;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::StatusCode;
use actix_web::error::InternalError;
use actix_web::{Error, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use futures_util::FutureExt;
use tracing::error;

use crate::error::AppError;

/// Map a framework error onto the service taxonomy.
///
/// The original message is kept only for client-class statuses; for
/// everything else it stays in the server log.
pub fn to_app_error(err: &Error) -> AppError {
    let response_error = err.as_response_error();
    let status = response_error.status_code();
    let message = response_error.to_string();

    match status {
        StatusCode::UNAUTHORIZED => AppError::CredentialsMissing,
        StatusCode::FORBIDDEN => AppError::forbidden(message),
        StatusCode::NOT_FOUND => AppError::not_found("Not found"),
        StatusCode::UNPROCESSABLE_ENTITY => AppError::invalid(message),
        StatusCode::CONFLICT => AppError::conflict(message),
        StatusCode::METHOD_NOT_ALLOWED => AppError::MethodNotAllowed { detail: message },
        s if s.is_client_error() => AppError::bad_request(message),
        _ => AppError::internal(message),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

pub struct ErrorBoundary;

impl<S, B> Transform<S, ServiceRequest> for ErrorBoundary
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorBoundaryMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorBoundaryMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorBoundaryMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorBoundaryMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // No handle on the request is kept here: the router needs sole
        // ownership of it to record path matches.
        let service = Rc::clone(&self.service);

        Box::pin(async move {
            // The inner `call` is inside the guarded future so a panic while
            // building it is caught too.
            let outcome = AssertUnwindSafe(async move { service.call(req).await })
                .catch_unwind()
                .await;

            let app_err = match outcome {
                // Handler and extractor errors arrive already rendered, with
                // the source error attached to the response.
                Ok(Ok(res)) => {
                    let foreign = res
                        .response()
                        .error()
                        .filter(|err| err.as_error::<AppError>().is_none())
                        .map(to_app_error);
                    return Ok(match foreign {
                        Some(app_err) => res
                            .into_response(app_err.error_response())
                            .map_into_right_body(),
                        None => res.map_into_left_body(),
                    });
                }
                Ok(Err(err)) => {
                    if err.as_error::<AppError>().is_some() {
                        let response = err.error_response();
                        return Err(InternalError::from_response(err, response).into());
                    }
                    to_app_error(&err)
                }
                Err(payload) => {
                    error!(panic = %panic_message(payload.as_ref()), "handler panicked");
                    AppError::internal("handler panicked")
                }
            };

            // Rendered here, inside the request's trace scope; the server
            // writes the stored response as is.
            let response = app_err.error_response();
            Err(InternalError::from_response(app_err, response).into())
        })
    }
}
