//! Claims carried inside access tokens.

use serde::{Deserialize, Serialize};

use crate::auth::identity::Subject;
use crate::auth::jwt::TokenError;

/// Claims included in backend-issued access tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    /// User identifier
    pub sub: Subject,
    pub email: String,
    /// Issued-at (seconds since epoch); absent on legacy tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Payload as it appears on the wire.
///
/// The subject may arrive as `user_id` or `sub`; `user_id` wins when both exist,
/// matching tokens minted by the earlier service.
#[derive(Debug, Deserialize)]
pub(crate) struct WireClaims {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    email: String,
    #[serde(default)]
    iat: Option<i64>,
    exp: i64,
}

impl TryFrom<WireClaims> for Claims {
    type Error = TokenError;

    fn try_from(wire: WireClaims) -> Result<Self, Self::Error> {
        let subject = wire
            .user_id
            .filter(|s| !s.is_empty())
            .or_else(|| wire.sub.filter(|s| !s.is_empty()))
            .ok_or(TokenError::InvalidSignature)?;

        Ok(Claims {
            sub: Subject::new(subject),
            email: wire.email,
            iat: wire.iat,
            exp: wire.exp,
        })
    }
}
