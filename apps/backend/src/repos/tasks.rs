//! Task domain model and the storage seam behind it.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::identity::Subject;
use crate::auth::ownership::OwnedResource;
use crate::errors::domain::DomainError;

/// Client-facing detail for a task that is absent or not the caller's.
pub const TASK_NOT_FOUND: &str = "Task not found";

/// Task domain model
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: Uuid,
    pub owner: Subject,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl OwnedResource for Task {
    fn owner(&self) -> &Subject {
        &self.owner
    }
}

/// Storage for tasks.
///
/// Implementations own their concurrency: each call either applies fully or
/// not at all. Ownership is not checked here; that belongs to the service.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, task: Task) -> Result<Task, DomainError>;

    async fn find(&self, id: Uuid) -> Result<Option<Task>, DomainError>;

    /// Tasks owned by `owner`, oldest first.
    async fn list_for_owner(
        &self,
        owner: &Subject,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Task>, DomainError>;

    async fn count_for_owner(&self, owner: &Subject) -> Result<usize, DomainError>;

    /// Overwrite an existing task. Fails with `NotFound` if it vanished.
    async fn replace(&self, task: Task) -> Result<Task, DomainError>;

    /// Returns whether a task was removed.
    async fn delete(&self, id: Uuid) -> Result<bool, DomainError>;
}
