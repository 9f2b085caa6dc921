//! Registration, login, logout, refresh and `me`.
//!
//! Mounted once per API prefix. Everything except `me` is public; `refresh`
//! carries its credential in the body.

use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::identity::{IdentityContext, Subject};
use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::logging::security;
use crate::middleware::auth_gate::bearer_token;
use crate::services::users::UserService;
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub access_token: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until expiry
    pub expires_in: u64,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: &'static str,
}

#[derive(Debug, Serialize)]
struct MeResponse<'a> {
    id: &'a str,
    email: &'a str,
}

fn token_response(
    state: &AppState,
    subject: &Subject,
    email: &str,
) -> Result<TokenResponse, AppError> {
    let access_token = state.tokens.issue(subject, email, state.now())?;
    Ok(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: state.tokens.ttl().as_secs(),
    })
}

async fn register(
    body: ValidatedJson<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let CredentialsRequest {
        email,
        password,
        name,
    } = body.into_inner();

    let user = UserService::from_state(&state)
        .register(&email, &password, name)
        .await?;

    let response = token_response(&state, &user.id, &user.email)?;
    Ok(HttpResponse::Created().json(response))
}

async fn login(
    body: ValidatedJson<CredentialsRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user = UserService::from_state(&state)
        .authenticate(&body.email, &body.password)
        .await?;

    let response = token_response(&state, &user.id, &user.email)?;
    Ok(HttpResponse::Ok().json(response))
}

/// Tokens are stateless; nothing is revoked.
async fn logout(req: HttpRequest, state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let subject = bearer_token(req.headers().get(header::AUTHORIZATION))
        .ok()
        .and_then(|token| state.tokens.verify(token, state.now()).ok())
        .map(|claims| claims.sub);

    security::user_logout(subject.as_ref());
    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Successfully logged out",
    }))
}

async fn refresh(
    body: ValidatedJson<RefreshRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let claims = state.tokens.verify(&body.access_token, state.now())?;

    let response = token_response(&state, &claims.sub, &claims.email)?;
    security::token_refreshed(&claims.sub);
    Ok(HttpResponse::Ok().json(response))
}

async fn me(identity: IdentityContext) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(MeResponse {
        id: identity.subject().as_str(),
        email: identity.email(),
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/register")
            .route(web::post().to(register))
            .default_service(web::to(super::method_not_allowed)),
    )
    .service(
        web::resource("/login")
            .route(web::post().to(login))
            .default_service(web::to(super::method_not_allowed)),
    )
    .service(
        web::resource("/logout")
            .route(web::post().to(logout))
            .default_service(web::to(super::method_not_allowed)),
    )
    .service(
        web::resource("/refresh")
            .route(web::post().to(refresh))
            .default_service(web::to(super::method_not_allowed)),
    )
    .service(
        web::resource("/me")
            .route(web::get().to(me))
            .default_service(web::to(super::method_not_allowed)),
    );
}
