use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{TaskDraft, TaskPatch, TaskQuery},
    services::TaskService,
};
use actix_web::{delete, get, post, put, web, Responder};
use uuid::Uuid;
use validator::Validate;

use super::ApiResponse;

/// Retrieves the caller's tasks.
///
/// ## Query Parameters:
/// - `status` (optional): exactly one of `To Do`, `In Progress`, `Done`.
/// - `deadline` (optional): RFC 3339 timestamp or `YYYY-MM-DD`. Only tasks due at
///   or before it are returned, earliest deadline first.
///
/// ## Responses:
/// - `200 OK`: The matching tasks. Never includes another user's tasks.
/// - `400 Bad Request`: A filter value could not be parsed.
/// - `401 Unauthorized`: Missing or invalid token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskService>,
    query_params: web::Query<TaskQuery>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let filter = query_params.parse().map_err(AppError::BadRequest)?;
    let tasks = tasks.list(caller.user_id, filter).await?;
    Ok(ApiResponse::ok(tasks))
}

/// Creates a task owned by the caller.
///
/// Any owner or creator fields in the body are ignored. Status defaults to `To Do`.
///
/// ## Responses:
/// - `201 Created`: The stored task.
/// - `422 Unprocessable Entity`: Title or description out of bounds.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskService>,
    task_data: web::Json<TaskDraft>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks.create(caller.user_id, task_data.into_inner()).await?;
    Ok(ApiResponse::created(task))
}

/// Retrieves one task.
///
/// ## Responses:
/// - `200 OK`: The task.
/// - `401 Unauthorized`: The task belongs to another user.
/// - `404 Not Found`: No task with this id.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks.get_by_id(task_id.into_inner(), caller.user_id).await?;
    Ok(ApiResponse::ok(task))
}

/// Partially updates a task. Absent fields keep their stored values.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskPatch>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks
        .update(task_id.into_inner(), task_data.into_inner(), caller.user_id)
        .await?;
    Ok(ApiResponse::ok(task))
}

#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskService>,
    task_id: web::Path<Uuid>,
    caller: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    tasks.delete(task_id.into_inner(), caller.user_id).await?;
    Ok(ApiResponse::ok("Task deleted successfully"))
}
