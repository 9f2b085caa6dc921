use std::fmt;

use actix_web::error::ResponseError;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{error, info};
use uuid::Uuid;

use crate::auth::jwt::TokenError;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::errors::ErrorCode;
use crate::trace_ctx;

const DETAIL_HEADER_INVALID: &str = "Authorization header missing or invalid format";
const DETAIL_CREDENTIALS_INVALID: &str = "Could not validate credentials";
const DETAIL_INTERNAL: &str = "An internal server error occurred";

/// Body of every failure response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub detail: String,
    pub error_code: String,
    /// RFC 3339, UTC
    pub timestamp: String,
    /// Fresh per error occurrence
    pub request_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("credentials missing")]
    CredentialsMissing,
    #[error("credentials malformed")]
    CredentialsMalformed,
    #[error("invalid token signature or encoding")]
    InvalidSignature,
    #[error("token expired")]
    ExpiredToken,
    /// Login with an unknown email or a wrong password.
    #[error("login rejected")]
    LoginRejected,
    #[error("Forbidden: {detail}")]
    Forbidden { detail: String },
    #[error("Not found: {detail}")]
    NotFound { detail: String },
    #[error("Validation error: {detail}")]
    Validation { detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { detail: String },
    #[error("Conflict: {detail}")]
    Conflict { detail: String },
    /// Path exists, method does not.
    #[error("Method not allowed: {detail}")]
    MethodNotAllowed { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    /// Stable external code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::CredentialsMissing
            | AppError::CredentialsMalformed
            | AppError::InvalidSignature
            | AppError::ExpiredToken
            | AppError::LoginRejected => ErrorCode::InvalidCredentials,
            AppError::Forbidden { .. } => ErrorCode::InsufficientPermissions,
            AppError::NotFound { .. } => ErrorCode::ResourceNotFound,
            AppError::Validation { .. } => ErrorCode::ValidationError,
            AppError::BadRequest { .. } => ErrorCode::BadRequest,
            AppError::Conflict { .. } => ErrorCode::Conflict,
            AppError::MethodNotAllowed { .. } => ErrorCode::MethodNotAllowed,
            AppError::Internal { .. } | AppError::Config { .. } => ErrorCode::InternalError,
        }
    }

    /// Text that is safe to show to the caller.
    ///
    /// Signature and expiry failures share one message. Internal diagnostics
    /// never leave the process.
    pub fn public_detail(&self) -> String {
        match self {
            AppError::CredentialsMissing | AppError::CredentialsMalformed => {
                DETAIL_HEADER_INVALID.to_string()
            }
            AppError::InvalidSignature | AppError::ExpiredToken => {
                DETAIL_CREDENTIALS_INVALID.to_string()
            }
            AppError::LoginRejected => "Incorrect email or password".to_string(),
            AppError::Forbidden { detail }
            | AppError::NotFound { detail }
            | AppError::Validation { detail }
            | AppError::BadRequest { detail }
            | AppError::Conflict { detail }
            | AppError::MethodNotAllowed { detail } => detail.clone(),
            AppError::Internal { .. } | AppError::Config { .. } => DETAIL_INTERNAL.to_string(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::CredentialsMissing
            | AppError::CredentialsMalformed
            | AppError::InvalidSignature
            | AppError::ExpiredToken
            | AppError::LoginRejected => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True for every failure the gate can produce.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == StatusCode::UNAUTHORIZED
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::Forbidden {
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }

    pub fn invalid(detail: impl Into<String>) -> Self {
        Self::Validation {
            detail: detail.into(),
        }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::BadRequest {
            detail: detail.into(),
        }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict {
            detail: detail.into(),
        }
    }

    pub fn method_not_allowed(method: impl fmt::Display) -> Self {
        Self::MethodNotAllowed {
            detail: format!("Method {method} not allowed"),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    /// Build the envelope for one occurrence of this error.
    pub fn envelope(&self) -> ErrorEnvelope {
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_else(|_| "unknown".to_string());

        ErrorEnvelope {
            detail: self.public_detail(),
            error_code: self.code().to_string(),
            timestamp,
            request_id: Uuid::new_v4().to_string(),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::InvalidSignature => AppError::InvalidSignature,
            TokenError::Expired => AppError::ExpiredToken,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::Validation(detail) => AppError::invalid(detail),
            DomainError::Conflict(_, detail) => AppError::conflict(detail),
            DomainError::NotFound(_, detail) => AppError::not_found(detail),
            DomainError::Infra(InfraErrorKind::Timeout, detail) => {
                AppError::internal(format!("store timeout: {detail}"))
            }
            DomainError::Infra(kind, detail) => {
                AppError::internal(format!("infra {kind:?}: {detail}"))
            }
        }
    }
}

impl From<std::env::VarError> for AppError {
    fn from(e: std::env::VarError) -> Self {
        AppError::config(format!("env var error: {e}"))
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let envelope = self.envelope();
        let trace_id = trace_ctx::trace_id();

        if status.is_server_error() {
            // The only place the real diagnostic is recorded
            error!(
                %trace_id,
                request_id = %envelope.request_id,
                error_code = %envelope.error_code,
                diagnostic = %self,
                "request failed"
            );
        } else {
            info!(
                %trace_id,
                request_id = %envelope.request_id,
                error_code = %envelope.error_code,
                status = status.as_u16(),
                "request rejected"
            );
        }

        let mut builder = HttpResponse::build(status);
        builder.insert_header(("x-trace-id", trace_id));
        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        builder.json(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::domain::{ConflictKind, NotFoundKind};

    #[test]
    fn test_signature_and_expiry_look_identical() {
        let sig = AppError::from(TokenError::InvalidSignature);
        let exp = AppError::from(TokenError::Expired);

        // Distinguishable internally
        assert!(matches!(sig, AppError::InvalidSignature));
        assert!(matches!(exp, AppError::ExpiredToken));

        // Identical externally
        assert_eq!(sig.status(), exp.status());
        assert_eq!(sig.code(), exp.code());
        assert_eq!(sig.public_detail(), exp.public_detail());
    }

    #[test]
    fn test_taxonomy_statuses() {
        assert_eq!(AppError::CredentialsMissing.status().as_u16(), 401);
        assert_eq!(AppError::CredentialsMalformed.status().as_u16(), 401);
        assert_eq!(AppError::forbidden("x").status().as_u16(), 403);
        assert_eq!(AppError::not_found("x").status().as_u16(), 404);
        assert_eq!(AppError::invalid("x").status().as_u16(), 422);
        assert_eq!(AppError::method_not_allowed("DELETE").status().as_u16(), 405);
        assert_eq!(AppError::internal("x").status().as_u16(), 500);
    }

    #[test]
    fn test_internal_detail_is_hidden() {
        let err = AppError::internal("connection refused at 10.0.0.3:5432");
        let envelope = err.envelope();
        assert_eq!(envelope.detail, "An internal server error occurred");
        assert_eq!(envelope.error_code, "SYS_001");
        // Still available for the log sink
        assert!(err.to_string().contains("10.0.0.3"));
    }

    #[test]
    fn test_envelope_ids_are_fresh() {
        let err = AppError::not_found("Task not found");
        let a = err.envelope();
        let b = err.envelope();
        assert_ne!(a.request_id, b.request_id);
        assert!(OffsetDateTime::parse(&a.timestamp, &Rfc3339).is_ok());
    }

    #[test]
    fn test_domain_mapping() {
        let app: AppError = DomainError::validation("title too long").into();
        assert_eq!(app.status().as_u16(), 422);
        assert_eq!(app.public_detail(), "title too long");

        let app: AppError = DomainError::conflict(ConflictKind::UniqueEmail, "dup").into();
        assert_eq!(app.code(), ErrorCode::Conflict);

        let app: AppError = DomainError::not_found(NotFoundKind::Task, "gone").into();
        assert_eq!(app.code(), ErrorCode::ResourceNotFound);

        let app: AppError =
            DomainError::infra(InfraErrorKind::StoreUnavailable, "pool closed").into();
        assert_eq!(app.code(), ErrorCode::InternalError);
        assert_eq!(app.public_detail(), "An internal server error occurred");
    }
}
