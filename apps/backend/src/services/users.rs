use std::sync::Arc;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use time::OffsetDateTime;
use tracing::debug;
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::auth::clock::Clock;
use crate::auth::identity::Subject;
use crate::error::AppError;
use crate::errors::domain::{DomainError, InfraErrorKind};
use crate::logging::security;
use crate::repos::users::{User, UserStore};
use crate::state::app_state::AppState;

pub const PASSWORD_MIN_CHARS: usize = 8;
pub const PASSWORD_MAX_CHARS: usize = 128;

/// Verified against on unknown emails so both login failures cost one argon2
/// run. Same parameters as `Argon2::default()`; the digest matches no password.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

/// Trim, NFKC-normalize and lowercase an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().nfkc().collect::<String>().to_lowercase()
}

fn validate_email(email: &str) -> Result<(), DomainError> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(DomainError::validation("Invalid email address"))
    }
}

fn validate_password(password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_CHARS..=PASSWORD_MAX_CHARS).contains(&len) {
        return Err(DomainError::validation(format!(
            "Password must be between {PASSWORD_MIN_CHARS} and {PASSWORD_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

async fn hash_password(password: String) -> Result<String, DomainError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::infra(InfraErrorKind::PasswordHash, e.to_string()))
    })
    .await
    .map_err(|e| DomainError::infra(InfraErrorKind::PasswordHash, e.to_string()))?
}

async fn verify_password(password: String, stored: String) -> Result<bool, DomainError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&stored)
            .map_err(|e| DomainError::infra(InfraErrorKind::PasswordHash, e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| DomainError::infra(InfraErrorKind::PasswordHash, e.to_string()))?
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
    clock: Clock,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.users.clone(), state.clock.clone())
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<User, AppError> {
        let email = normalize_email(email);
        validate_email(&email)?;
        validate_password(password)?;

        // Cheap pre-check; the store's unique index is authoritative
        if self.store.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email already registered"));
        }

        let user = User {
            id: Subject::new(Uuid::new_v4().to_string()),
            email,
            password_hash: hash_password(password.to_string()).await?,
            name,
            created_at: OffsetDateTime::from(self.clock.now()),
        };
        let user = self.store.insert(user).await?;

        security::user_registered(&user.id, &user.email);
        Ok(user)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, AppError> {
        let email = normalize_email(email);

        let Some(user) = self.store.find_by_email(&email).await? else {
            let _ = verify_password(password.to_string(), DUMMY_PASSWORD_HASH.to_string()).await;
            security::login_failed("unknown_email", Some(&email));
            return Err(AppError::LoginRejected);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            security::login_failed("bad_password", Some(&email));
            return Err(AppError::LoginRejected);
        }

        debug!(user_id = %user.id, "credentials verified");
        security::user_login(&user.id);
        Ok(user)
    }

    pub async fn find(&self, id: &Subject) -> Result<Option<User>, AppError> {
        Ok(self.store.find_by_id(id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryUserStore;

    fn service() -> UserService {
        UserService::new(Arc::new(InMemoryUserStore::new()), Clock::System)
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Alice@Example.COM "), "alice@example.com");
        // Fullwidth letters fold under NFKC
        assert_eq!(normalize_email("ＡＢＣ@example.com"), "abc@example.com");
    }

    #[test]
    fn test_email_shape() {
        assert!(validate_email("a@b.c").is_ok());
        for bad in ["", "plain", "@x.io", "a@", "a@b@c", "a b@x.io"] {
            assert!(validate_email(bad).is_err(), "{bad:?}");
        }
    }

    #[tokio::test]
    async fn test_register_then_authenticate() {
        let svc = service();
        let user = svc
            .register(" Carol@Example.test ", "correct horse", Some("Carol".into()))
            .await
            .unwrap();
        assert_eq!(user.email, "carol@example.test");
        assert!(user.password_hash.starts_with("$argon2"));

        let authed = svc
            .authenticate("carol@example.test", "correct horse")
            .await
            .unwrap();
        assert_eq!(authed.id, user.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let svc = service();
        svc.register("dave@example.test", "password123", None)
            .await
            .unwrap();

        let wrong_password = svc
            .authenticate("dave@example.test", "password124")
            .await
            .unwrap_err();
        let unknown = svc
            .authenticate("nobody@example.test", "password123")
            .await
            .unwrap_err();

        assert_eq!(wrong_password.public_detail(), unknown.public_detail());
        assert_eq!(wrong_password.status(), unknown.status());
        assert_eq!(wrong_password.status().as_u16(), 401);
    }

    #[tokio::test]
    async fn test_dummy_hash_costs_a_real_verification() {
        let parsed = PasswordHash::new(DUMMY_PASSWORD_HASH).unwrap();
        let params = argon2::Params::try_from(&parsed).unwrap();
        let defaults = argon2::Params::default();
        assert_eq!(params.m_cost(), defaults.m_cost());
        assert_eq!(params.t_cost(), defaults.t_cost());
        assert_eq!(params.p_cost(), defaults.p_cost());

        // Parses and runs argon2, but accepts nothing
        for password in ["password123", "", "correct horse"] {
            let ok = verify_password(password.to_string(), DUMMY_PASSWORD_HASH.to_string())
                .await
                .unwrap();
            assert!(!ok, "{password:?}");
        }
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let svc = service();
        svc.register("erin@example.test", "password123", None)
            .await
            .unwrap();

        let err = svc
            .register("ERIN@example.test", "another-pass", None)
            .await
            .unwrap_err();
        assert_eq!(err.status().as_u16(), 409);
    }

    #[tokio::test]
    async fn test_password_length_bounds() {
        let svc = service();
        let short = svc.register("f@example.test", "short", None).await;
        assert!(matches!(short, Err(AppError::Validation { .. })));

        let long = "p".repeat(PASSWORD_MAX_CHARS + 1);
        let long = svc.register("g@example.test", &long, None).await;
        assert!(matches!(long, Err(AppError::Validation { .. })));
    }
}
