use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;

use crate::auth::claims::{Claims, WireClaims};
use crate::auth::identity::Subject;
use crate::state::security_config::SecurityConfig;
use crate::AppError;

/// Why a presented token was rejected.
///
/// The two kinds stay distinct for callers and logs; `AppError` renders them
/// identically to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Bad signature, wrong algorithm, or a payload that does not decode.
    #[error("invalid signature")]
    InvalidSignature,
    /// Signature fine, but `now >= exp`.
    #[error("expired")]
    Expired,
}

/// Issues and verifies HMAC-signed access tokens.
///
/// Stateless: holds only the keys derived from the immutable
/// [`SecurityConfig`]. Expiry is checked against the `now` supplied by the
/// caller at whole-second granularity, with no skew allowance.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &self.algorithm)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

fn unix_seconds(t: SystemTime) -> Result<i64, AppError> {
    t.duration_since(UNIX_EPOCH)
        .ok()
        .and_then(|d| i64::try_from(d.as_secs()).ok())
        .ok_or_else(|| AppError::internal("Failed to get current time"))
}

impl TokenService {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(&security.jwt_secret),
            decoding: DecodingKey::from_secret(&security.jwt_secret),
            algorithm: security.algorithm,
            ttl: security.token_ttl,
        }
    }

    /// Lifetime applied by [`TokenService::issue`].
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Mint a token for `subject` using the configured lifetime.
    pub fn issue(&self, subject: &Subject, email: &str, now: SystemTime) -> Result<String, AppError> {
        self.issue_with_ttl(subject, email, self.ttl, now)
    }

    /// Mint a token expiring at `now + ttl`.
    pub fn issue_with_ttl(
        &self,
        subject: &Subject,
        email: &str,
        ttl: Duration,
        now: SystemTime,
    ) -> Result<String, AppError> {
        if ttl.is_zero() {
            return Err(AppError::config("token ttl must be positive"));
        }

        let iat = unix_seconds(now)?;
        let exp = i64::try_from(ttl.as_secs())
            .ok()
            .and_then(|secs| iat.checked_add(secs))
            .ok_or_else(|| AppError::config("token ttl is out of range"))?;
        let claims = Claims {
            sub: subject.clone(),
            email: email.to_string(),
            iat: Some(iat),
            exp,
        };

        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
    }

    /// Check signature first, then expiry.
    pub fn verify(&self, token: &str, now: SystemTime) -> Result<Claims, TokenError> {
        // Expiry is evaluated below against the caller's clock, not the library's.
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        let wire = decode::<WireClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::InvalidSignature)?;
        let claims = Claims::try_from(wire)?;

        let now = now
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
            .unwrap_or(0);
        if now >= claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
