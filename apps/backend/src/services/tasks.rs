//! Task operations for an authenticated caller.
//!
//! Every entry point runs the path-subject check first, then (for
//! operations on one task) loads it and runs the owner check. Field
//! validation happens before anything is written.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use crate::auth::clock::Clock;
use crate::auth::identity::{IdentityContext, Subject};
use crate::auth::ownership::{ensure_creation_owner, ensure_owned, ensure_path_subject};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::repos::tasks::{Task, TaskStore, TASK_NOT_FOUND};
use crate::state::app_state::AppState;

pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;
pub const DEFAULT_PAGE_LIMIT: usize = 100;

#[derive(Debug, Clone)]
pub struct NewTask {
    pub owner: Subject,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
}

/// Partial update; `None` leaves a field untouched. A description of
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.completed.is_none()
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.trim().is_empty() {
        return Err(DomainError::validation("Title must not be empty"));
    }
    if title.chars().count() > TITLE_MAX_CHARS {
        return Err(DomainError::validation(format!(
            "Title must be at most {TITLE_MAX_CHARS} characters"
        )));
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), DomainError> {
    match description {
        Some(d) if d.chars().count() > DESCRIPTION_MAX_CHARS => Err(DomainError::validation(
            format!("Description must be at most {DESCRIPTION_MAX_CHARS} characters"),
        )),
        _ => Ok(()),
    }
}

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn TaskStore>,
    clock: Clock,
}

impl TaskService {
    pub fn new(store: Arc<dyn TaskStore>, clock: Clock) -> Self {
        Self { store, clock }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(state.tasks.clone(), state.clock.clone())
    }

    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::from(self.clock.now())
    }

    /// Page of the caller's tasks plus their total count.
    pub async fn list(
        &self,
        identity: &IdentityContext,
        path_user: &str,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<Task>, usize), AppError> {
        ensure_path_subject(identity, path_user)?;

        let owner = identity.subject();
        let tasks = self.store.list_for_owner(owner, offset, limit).await?;
        let total = self.store.count_for_owner(owner).await?;
        Ok((tasks, total))
    }

    pub async fn create(
        &self,
        identity: &IdentityContext,
        path_user: &str,
        new_task: NewTask,
    ) -> Result<Task, AppError> {
        ensure_path_subject(identity, path_user)?;
        ensure_creation_owner(identity, &new_task.owner)?;
        validate_title(&new_task.title)?;
        validate_description(new_task.description.as_deref())?;

        let now = self.now();
        let task = Task {
            id: Uuid::new_v4(),
            owner: new_task.owner,
            title: new_task.title,
            description: new_task.description,
            completed: new_task.completed,
            created_at: now,
            updated_at: now,
        };

        let task = self.store.insert(task).await?;
        debug!(task_id = %task.id, owner = %task.owner, "task created");
        Ok(task)
    }

    pub async fn get(
        &self,
        identity: &IdentityContext,
        path_user: &str,
        task_id: Uuid,
    ) -> Result<Task, AppError> {
        ensure_path_subject(identity, path_user)?;
        self.load_owned(identity, task_id).await
    }

    pub async fn update(
        &self,
        identity: &IdentityContext,
        path_user: &str,
        task_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Task, AppError> {
        ensure_path_subject(identity, path_user)?;
        if patch.is_empty() {
            return Err(DomainError::validation("No fields provided for update").into());
        }
        if let Some(title) = patch.title.as_deref() {
            validate_title(title)?;
        }
        validate_description(patch.description.as_ref().and_then(|d| d.as_deref()))?;

        let mut task = self.load_owned(identity, task_id).await?;
        if let Some(title) = patch.title {
            task.title = title;
        }
        if let Some(description) = patch.description {
            task.description = description;
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        task.updated_at = self.now();

        Ok(self.store.replace(task).await?)
    }

    pub async fn delete(
        &self,
        identity: &IdentityContext,
        path_user: &str,
        task_id: Uuid,
    ) -> Result<(), AppError> {
        ensure_path_subject(identity, path_user)?;
        let task = self.load_owned(identity, task_id).await?;

        if !self.store.delete(task.id).await? {
            // Removed concurrently between load and delete
            return Err(AppError::not_found(TASK_NOT_FOUND));
        }
        debug!(task_id = %task.id, "task deleted");
        Ok(())
    }

    /// Flip `completed`.
    pub async fn toggle_complete(
        &self,
        identity: &IdentityContext,
        path_user: &str,
        task_id: Uuid,
    ) -> Result<Task, AppError> {
        ensure_path_subject(identity, path_user)?;
        let mut task = self.load_owned(identity, task_id).await?;
        task.completed = !task.completed;
        task.updated_at = self.now();
        Ok(self.store.replace(task).await?)
    }

    async fn load_owned(&self, identity: &IdentityContext, task_id: Uuid) -> Result<Task, AppError> {
        let found = self.store.find(task_id).await?;
        ensure_owned(identity, found, TASK_NOT_FOUND)
    }
}
