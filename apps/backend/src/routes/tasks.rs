use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::identity::{IdentityContext, Subject};
use crate::error::AppError;
use crate::extractors::ValidatedJson;
use crate::repos::tasks::Task;
use crate::services::tasks::{NewTask, TaskPatch, TaskService, DEFAULT_PAGE_LIMIT};
use crate::state::app_state::AppState;

const MAX_PAGE_LIMIT: usize = 1000;

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskRead {
    pub id: Uuid,
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Task> for TaskRead {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            user_id: task.owner.to_string(),
            title: task.title,
            description: task.description,
            completed: task.completed,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskListResponse {
    pub tasks: Vec<TaskRead>,
    pub total_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TaskToggleResponse {
    pub id: Uuid,
    pub completed: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Deserialize)]
pub struct TaskCreateRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    pub user_id: String,
}

#[derive(Debug, Deserialize)]
pub struct TaskUpdateRequest {
    pub title: Option<String>,
    // Absent leaves the description alone; null clears it.
    #[serde(default, with = "double_option")]
    pub description: Option<Option<String>>,
    pub completed: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub skip: usize,
    pub limit: Option<usize>,
}

async fn list_tasks(
    path: web::Path<String>,
    query: web::Query<ListQuery>,
    identity: IdentityContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_LIMIT).min(MAX_PAGE_LIMIT);

    let (tasks, total_count) = TaskService::from_state(&state)
        .list(&identity, &user_id, query.skip, limit)
        .await?;

    Ok(HttpResponse::Ok().json(TaskListResponse {
        tasks: tasks.into_iter().map(TaskRead::from).collect(),
        total_count,
    }))
}

async fn create_task(
    path: web::Path<String>,
    body: ValidatedJson<TaskCreateRequest>,
    identity: IdentityContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let user_id = path.into_inner();
    let body = body.into_inner();
    let new_task = NewTask {
        owner: Subject::new(body.user_id),
        title: body.title,
        description: body.description,
        completed: body.completed,
    };

    let task = TaskService::from_state(&state)
        .create(&identity, &user_id, new_task)
        .await?;

    Ok(HttpResponse::Created().json(TaskRead::from(task)))
}

async fn get_task(
    path: web::Path<(String, Uuid)>,
    identity: IdentityContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (user_id, task_id) = path.into_inner();

    let task = TaskService::from_state(&state)
        .get(&identity, &user_id, task_id)
        .await?;

    Ok(HttpResponse::Ok().json(TaskRead::from(task)))
}

async fn update_task(
    path: web::Path<(String, Uuid)>,
    body: ValidatedJson<TaskUpdateRequest>,
    identity: IdentityContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (user_id, task_id) = path.into_inner();
    let body = body.into_inner();
    let patch = TaskPatch {
        title: body.title,
        description: body.description,
        completed: body.completed,
    };

    let task = TaskService::from_state(&state)
        .update(&identity, &user_id, task_id, patch)
        .await?;

    Ok(HttpResponse::Ok().json(TaskRead::from(task)))
}

async fn delete_task(
    path: web::Path<(String, Uuid)>,
    identity: IdentityContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (user_id, task_id) = path.into_inner();

    TaskService::from_state(&state)
        .delete(&identity, &user_id, task_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}

async fn toggle_complete(
    path: web::Path<(String, Uuid)>,
    identity: IdentityContext,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (user_id, task_id) = path.into_inner();

    let task = TaskService::from_state(&state)
        .toggle_complete(&identity, &user_id, task_id)
        .await?;

    Ok(HttpResponse::Ok().json(TaskToggleResponse {
        id: task.id,
        completed: task.completed,
        updated_at: task.updated_at,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/{user_id}/tasks")
            .route(web::get().to(list_tasks))
            .route(web::post().to(create_task))
            .default_service(web::to(super::method_not_allowed)),
    )
    .service(
        web::resource("/{user_id}/tasks/{task_id}")
            .route(web::get().to(get_task))
            .route(web::put().to(update_task))
            .route(web::delete().to(delete_task))
            .default_service(web::to(super::method_not_allowed)),
    )
    .service(
        web::resource("/{user_id}/tasks/{task_id}/complete")
            .route(web::patch().to(toggle_complete))
            .default_service(web::to(super::method_not_allowed)),
    );
}
