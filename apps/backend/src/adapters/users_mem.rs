//! In-memory adapter for the user repository.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::auth::identity::Subject;
use crate::errors::domain::{ConflictKind, DomainError};
use crate::repos::users::{User, UserStore};

/// DashMap-backed implementation of UserStore with a unique email index.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: DashMap<Subject, User>,
    by_email: DashMap<String, Subject>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn insert(&self, user: User) -> Result<User, DomainError> {
        // The email entry stays locked until the user row is in place
        match self.by_email.entry(user.email.clone()) {
            Entry::Occupied(_) => Err(DomainError::conflict(
                ConflictKind::UniqueEmail,
                "Email already registered",
            )),
            Entry::Vacant(slot) => {
                self.users.insert(user.id.clone(), user.clone());
                slot.insert(user.id.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let Some(id) = self.by_email.get(email).map(|entry| entry.value().clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&id).map(|entry| entry.value().clone()))
    }

    async fn find_by_id(&self, id: &Subject) -> Result<Option<User>, DomainError> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }
}
