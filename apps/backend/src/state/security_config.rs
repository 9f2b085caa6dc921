use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Default access-token lifetime (30 minutes).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(30 * 60);

/// Signing material and token policy, fixed at startup.
#[derive(Debug, Clone)]
pub struct SecurityConfig {
    /// Shared secret for signing and verifying tokens
    pub jwt_secret: Vec<u8>,
    /// HMAC algorithm pinned for both issuing and verification
    pub algorithm: Algorithm,
    /// Lifetime of newly issued access tokens
    pub token_ttl: Duration,
}

impl SecurityConfig {
    /// HS256 with the default lifetime.
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
