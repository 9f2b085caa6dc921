//! Process configuration, read once from the environment at startup.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::Algorithm;

use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

pub const DEFAULT_ALGORITHM: &str = "HS256";
pub const DEFAULT_EXPIRE_MINUTES: u64 = 30;
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8000;

/// Legacy name for the signing secret, still honored when `JWT_SECRET` is unset.
const LEGACY_SECRET_VAR: &str = "BETTER_AUTH_JWT_SECRET";

#[derive(Clone)]
pub struct Settings {
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_expire_minutes: u64,
    pub allowed_origins: Vec<String>,
    pub host: String,
    pub port: u16,
    pub log_level: Option<String>,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("jwt_secret", &"<redacted>")
            .field("jwt_algorithm", &self.jwt_algorithm)
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .field("allowed_origins", &self.allowed_origins)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .finish()
    }
}

/// Only symmetric algorithms make sense with a shared secret.
pub fn parse_algorithm(raw: &str) -> Result<Algorithm, AppError> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(AppError::config(format!(
            "JWT_ALGORITHM must be one of HS256, HS384, HS512 (got {other:?})"
        ))),
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.trim_end_matches('/').to_string())
        .collect()
}

/// Lifetime in seconds, if it fits a signed token timestamp.
fn ttl_seconds(minutes: u64) -> Option<u64> {
    minutes
        .checked_mul(60)
        .filter(|secs| i64::try_from(*secs).is_ok())
}

impl Settings {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let jwt_secret = get("JWT_SECRET")
            .or_else(|| get(LEGACY_SECRET_VAR))
            .ok_or_else(|| AppError::config("JWT_SECRET must be set"))?;

        let jwt_algorithm = match get("JWT_ALGORITHM") {
            Some(raw) => parse_algorithm(&raw)?,
            None => parse_algorithm(DEFAULT_ALGORITHM)?,
        };

        let access_token_expire_minutes = match get("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                AppError::config(format!(
                    "ACCESS_TOKEN_EXPIRE_MINUTES must be a positive integer (got {raw:?})"
                ))
            })?,
            None => DEFAULT_EXPIRE_MINUTES,
        };
        if access_token_expire_minutes == 0 {
            return Err(AppError::config("ACCESS_TOKEN_EXPIRE_MINUTES must be > 0"));
        }
        if ttl_seconds(access_token_expire_minutes).is_none() {
            return Err(AppError::config(format!(
                "ACCESS_TOKEN_EXPIRE_MINUTES is out of range (got {access_token_expire_minutes})"
            )));
        }

        let mut allowed_origins = get("ALLOWED_ORIGINS")
            .map(|raw| parse_origins(&raw))
            .unwrap_or_else(|| vec![DEFAULT_ORIGIN.to_string()]);
        if let Some(frontend) = get("FRONTEND_URL") {
            let frontend = frontend.trim().trim_end_matches('/').to_string();
            if !allowed_origins.contains(&frontend) {
                allowed_origins.push(frontend);
            }
        }

        let host = get("BACKEND_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match get("BACKEND_PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| {
                AppError::config(format!("BACKEND_PORT must be a valid port number (got {raw:?})"))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            jwt_secret,
            jwt_algorithm,
            access_token_expire_minutes,
            allowed_origins,
            host,
            port,
            log_level: get("LOG_LEVEL"),
        })
    }

    pub fn token_ttl(&self) -> Duration {
        // Range-checked at load; saturate for values set by hand
        Duration::from_secs(self.access_token_expire_minutes.saturating_mul(60))
    }

    pub fn security_config(&self) -> SecurityConfig {
        SecurityConfig::new(self.jwt_secret.as_bytes())
            .with_algorithm(self.jwt_algorithm)
            .with_ttl(self.token_ttl())
    }
}
