use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::auth::identity::IdentityContext;
use crate::error::AppError;

/// Hands handlers the identity the gate attached.
///
/// Absent only when a handler mounted on a public route asks for one; that
/// is reported as missing credentials rather than let through.
impl FromRequest for IdentityContext {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(
            req.extensions()
                .get::<IdentityContext>()
                .cloned()
                .ok_or(AppError::CredentialsMissing),
        )
    }
}
