//! Authentication gate in front of every route.
//!
//! Per request: classify the path; public paths pass through untouched
//! (the `Authorization` header is not even read). Protected paths need
//! `Authorization: Bearer <token>` that verifies against the current clock.
//! On success an [`IdentityContext`] is put in request extensions before
//! the handler runs; on any failure the handler is never called.

use std::sync::Arc;
use std::time::SystemTime;

use actix_web::body::EitherBody;
use actix_web::dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{self, HeaderValue};
use actix_web::{Error, HttpMessage, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::auth::clock::Clock;
use crate::auth::identity::IdentityContext;
use crate::auth::jwt::TokenService;
use crate::auth::route_classifier::{RouteClass, RouteClassifier};
use crate::error::AppError;
use crate::logging::security;
use crate::state::app_state::AppState;

const BEARER_SCHEME: &str = "Bearer";

/// Outcome of a successful gate evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Public,
    Verified(IdentityContext),
}

/// Pull the token out of `Bearer <token>`.
///
/// The scheme is case-sensitive and the value must be exactly two
/// whitespace-separated parts.
pub fn bearer_token(header_value: Option<&HeaderValue>) -> Result<&str, AppError> {
    let value = header_value.ok_or(AppError::CredentialsMissing)?;
    let raw = value.to_str().map_err(|_| AppError::CredentialsMalformed)?;

    let mut parts = raw.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(BEARER_SCHEME), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::CredentialsMalformed),
    }
}

fn rejection_reason(err: &AppError) -> &'static str {
    match err {
        AppError::CredentialsMissing => "credentials_missing",
        AppError::CredentialsMalformed => "credentials_malformed",
        AppError::InvalidSignature => "invalid_signature",
        AppError::ExpiredToken => "expired_token",
        _ => "other",
    }
}

#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
    routes: Arc<RouteClassifier>,
    clock: Clock,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>, routes: Arc<RouteClassifier>, clock: Clock) -> Self {
        Self {
            tokens,
            routes,
            clock,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            Arc::clone(&state.tokens),
            Arc::clone(&state.routes),
            state.clock.clone(),
        )
    }

    /// The whole per-request decision, without HTTP.
    pub fn evaluate(
        &self,
        path: &str,
        authorization: Option<&HeaderValue>,
        now: SystemTime,
    ) -> Result<GateDecision, AppError> {
        if self.routes.classify(path) == RouteClass::Public {
            return Ok(GateDecision::Public);
        }

        let token = bearer_token(authorization)?;
        let claims = self.tokens.verify(token, now)?;
        Ok(GateDecision::Verified(IdentityContext::from_verified(claims)))
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthGateMiddleware {
            service,
            gate: self.clone(),
        }))
    }
}

pub struct AuthGateMiddleware<S> {
    service: S,
    gate: AuthGate,
}

impl<S, B> Service<ServiceRequest> for AuthGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = self.gate.evaluate(
            req.path(),
            req.headers().get(header::AUTHORIZATION),
            self.gate.clock.now(),
        );

        match decision {
            Ok(GateDecision::Public) => {}
            Ok(GateDecision::Verified(identity)) => {
                tracing::Span::current().record("subject", identity.subject().as_str());
                req.extensions_mut().insert(identity);
            }
            Err(err) => {
                security::auth_rejected(req.path(), rejection_reason(&err));
                let response = err.error_response();
                return Box::pin(ready(Ok(req
                    .into_response(response)
                    .map_into_right_body())));
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, UNIX_EPOCH};

    use actix_web::{test, web, App, HttpResponse};

    use super::*;
    use crate::auth::clock::ManualClock;
    use crate::auth::identity::Subject;
    use crate::auth::route_classifier::DEFAULT_API_PREFIXES;
    use crate::state::security_config::SecurityConfig;

    const T0: u64 = 1_700_000_000;

    fn gate_with(secret: &str, clock: Clock) -> (AuthGate, Arc<TokenService>) {
        let tokens = Arc::new(TokenService::new(&SecurityConfig::new(secret.as_bytes())));
        let routes = Arc::new(RouteClassifier::standard(DEFAULT_API_PREFIXES).unwrap());
        (AuthGate::new(Arc::clone(&tokens), routes, clock), tokens)
    }

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    fn hv(s: &str) -> HeaderValue {
        HeaderValue::from_str(s).unwrap()
    }

    #[::core::prelude::v1::test]
    fn test_bearer_shapes() {
        assert_eq!(bearer_token(Some(&hv("Bearer abc"))).unwrap(), "abc");
        assert_eq!(bearer_token(Some(&hv("  Bearer   abc  "))).unwrap(), "abc");

        assert!(matches!(
            bearer_token(None),
            Err(AppError::CredentialsMissing)
        ));
        for bad in ["", "Bearer", "Bearer ", "bearer abc", "Basic abc", "Bearer a b", "abc"] {
            assert!(
                matches!(
                    bearer_token(Some(&hv(bad))),
                    Err(AppError::CredentialsMalformed)
                ),
                "{bad:?}"
            );
        }
    }

    #[::core::prelude::v1::test]
    fn test_public_route_ignores_header() {
        let (gate, _) = gate_with("s", Clock::System);
        for header in [None, Some(hv("garbage")), Some(hv("Bearer not.a.jwt"))] {
            let decision = gate.evaluate("/health", header.as_ref(), at(T0)).unwrap();
            assert_eq!(decision, GateDecision::Public);
        }
    }

    #[::core::prelude::v1::test]
    fn test_protected_route_state_machine() {
        let (gate, tokens) = gate_with("s", Clock::System);
        let path = "/api/u-1/tasks";

        assert!(matches!(
            gate.evaluate(path, None, at(T0)),
            Err(AppError::CredentialsMissing)
        ));
        assert!(matches!(
            gate.evaluate(path, Some(&hv("Token x")), at(T0)),
            Err(AppError::CredentialsMalformed)
        ));
        assert!(matches!(
            gate.evaluate(path, Some(&hv("Bearer x.y.z")), at(T0)),
            Err(AppError::InvalidSignature)
        ));

        let token = tokens.issue(&Subject::new("u-1"), "u1@x.io", at(T0)).unwrap();
        let header = hv(&format!("Bearer {token}"));
        match gate.evaluate(path, Some(&header), at(T0 + 60)).unwrap() {
            GateDecision::Verified(identity) => assert_eq!(identity.subject().as_str(), "u-1"),
            other => panic!("unexpected {other:?}"),
        }

        assert!(matches!(
            gate.evaluate(path, Some(&header), at(T0 + 31 * 60)),
            Err(AppError::ExpiredToken)
        ));
    }

    #[actix_web::test]
    async fn test_handler_not_invoked_without_credentials() {
        let (gate, _) = gate_with("s", Clock::System);
        let hits = web::Data::new(AtomicUsize::new(0));

        let app = test::init_service(
            App::new()
                .app_data(hits.clone())
                .wrap(gate)
                .route(
                    "/api/{user_id}/tasks",
                    web::get().to(|hits: web::Data<AtomicUsize>| async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        HttpResponse::Ok().finish()
                    }),
                ),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/u-1/tasks").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401);
        assert_eq!(
            resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
            "Bearer"
        );
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[actix_web::test]
    async fn test_identity_attached_for_handler() {
        let clock = ManualClock::starting_at(at(T0));
        let (gate, tokens) = gate_with("s", clock.clone().into());
        let token = tokens.issue(&Subject::new("u-9"), "u9@x.io", at(T0)).unwrap();

        let app = test::init_service(App::new().wrap(gate).route(
            "/api/v1/me",
            web::get().to(|req: actix_web::HttpRequest| async move {
                let sub = req
                    .extensions()
                    .get::<IdentityContext>()
                    .map(|i| i.subject().to_string())
                    .unwrap_or_default();
                HttpResponse::Ok().body(sub)
            }),
        ))
        .await;

        let req = test::TestRequest::get()
            .uri("/api/v1/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let body = test::call_and_read_body(&app, req).await;
        assert_eq!(body, web::Bytes::from_static(b"u-9"));
    }
}
