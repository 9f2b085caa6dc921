//! User domain model and the storage seam behind it.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::auth::identity::Subject;
use crate::errors::domain::DomainError;

/// User domain model
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: Subject,
    /// Normalized (trimmed, NFKC, lowercase)
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub name: Option<String>,
    pub created_at: OffsetDateTime,
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with `Conflict(UniqueEmail)` if the email is taken.
    async fn insert(&self, user: User) -> Result<User, DomainError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    async fn find_by_id(&self, id: &Subject) -> Result<Option<User>, DomainError>;
}
