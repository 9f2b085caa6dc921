//! In-memory adapter for the task repository.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::auth::identity::Subject;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::tasks::{Task, TaskStore, TASK_NOT_FOUND};

/// DashMap-backed implementation of TaskStore.
#[derive(Debug, Default)]
pub struct InMemoryTaskStore {
    tasks: DashMap<Uuid, Task>,
}

impl InMemoryTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn owned_by(&self, owner: &Subject) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|entry| &entry.value().owner == owner)
            .map(|entry| entry.value().clone())
            .collect();
        tasks.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        tasks
    }
}

#[async_trait]
impl TaskStore for InMemoryTaskStore {
    async fn insert(&self, task: Task) -> Result<Task, DomainError> {
        self.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Task>, DomainError> {
        Ok(self.tasks.get(&id).map(|entry| entry.value().clone()))
    }

    async fn list_for_owner(
        &self,
        owner: &Subject,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Task>, DomainError> {
        Ok(self
            .owned_by(owner)
            .into_iter()
            .skip(offset)
            .take(limit)
            .collect())
    }

    async fn count_for_owner(&self, owner: &Subject) -> Result<usize, DomainError> {
        Ok(self
            .tasks
            .iter()
            .filter(|entry| &entry.value().owner == owner)
            .count())
    }

    async fn replace(&self, task: Task) -> Result<Task, DomainError> {
        match self.tasks.get_mut(&task.id) {
            Some(mut slot) => {
                *slot = task.clone();
                Ok(task)
            }
            None => Err(DomainError::not_found(NotFoundKind::Task, TASK_NOT_FOUND)),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, DomainError> {
        Ok(self.tasks.remove(&id).is_some())
    }
}
