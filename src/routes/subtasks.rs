use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{CreateSubTaskInput, SubTask, SubTaskInput},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Resolves the owner of a task, or 404 if the task does not exist.
async fn task_owner(pool: &PgPool, task_id: Uuid) -> Result<i32, AppError> {
    let owner: Option<(i32,)> = sqlx::query_as("SELECT user_id FROM tasks WHERE id = $1")
        .bind(task_id)
        .fetch_optional(pool)
        .await?;

    match owner {
        Some((user_id,)) => Ok(user_id),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Fetches a subtask and checks that the requester owns its parent task.
/// Unknown subtask → 404; known but another user's → 403.
async fn owned_subtask(
    pool: &PgPool,
    subtask_id: Uuid,
    user_id: i32,
) -> Result<SubTask, AppError> {
    let subtask = sqlx::query_as::<_, SubTask>(
        "SELECT id, name, description, priority, is_done, task_id
         FROM subtasks WHERE id = $1",
    )
    .bind(subtask_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Subtask not found".into()))?;

    if task_owner(pool, subtask.task_id).await? != user_id {
        return Err(AppError::Forbidden("Not a task owner".into()));
    }

    Ok(subtask)
}

/// Creates a subtask under one of the authenticated user's tasks.
///
/// ## Responses:
/// - `201 Created`: Returns the new `SubTask`.
/// - `403 Forbidden`: If the parent task belongs to another user.
/// - `404 Not Found`: If the parent task does not exist.
/// - `422 Unprocessable Entity`: If input validation fails.
#[post("")]
pub async fn create_subtask(
    pool: web::Data<PgPool>,
    payload: web::Json<CreateSubTaskInput>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    if task_owner(&pool, payload.task).await? != user.0 {
        return Err(AppError::Forbidden("Not a task owner".into()));
    }

    let subtask = SubTask::new(payload.into_inner());

    let result = sqlx::query_as::<_, SubTask>(
        "INSERT INTO subtasks (id, name, description, priority, is_done, task_id)
         VALUES ($1, $2, $3, $4, $5, $6)
         RETURNING id, name, description, priority, is_done, task_id",
    )
    .bind(subtask.id)
    .bind(subtask.name)
    .bind(subtask.description)
    .bind(subtask.priority)
    .bind(subtask.is_done)
    .bind(subtask.task_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Retrieves a subtask. The requester must own the parent task.
#[get("/{id}")]
pub async fn get_subtask(
    pool: web::Data<PgPool>,
    subtask_id: web::Path<Uuid>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let subtask = owned_subtask(&pool, subtask_id.into_inner(), user.0).await?;

    Ok(HttpResponse::Ok().json(subtask))
}

/// Updates a subtask. The requester must own the parent task.
#[put("/{id}")]
pub async fn update_subtask(
    pool: web::Data<PgPool>,
    subtask_id: web::Path<Uuid>,
    payload: web::Json<SubTaskInput>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    payload.validate()?;

    let subtask = owned_subtask(&pool, subtask_id.into_inner(), user.0).await?;

    let result = sqlx::query_as::<_, SubTask>(
        "UPDATE subtasks
         SET name = $1, description = $2, priority = $3, is_done = $4
         WHERE id = $5
         RETURNING id, name, description, priority, is_done, task_id",
    )
    .bind(&payload.name)
    .bind(&payload.description)
    .bind(payload.priority.clone())
    .bind(payload.is_done)
    .bind(subtask.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Deletes a subtask. The requester must own the parent task.
#[delete("/{id}")]
pub async fn delete_subtask(
    pool: web::Data<PgPool>,
    subtask_id: web::Path<Uuid>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let subtask = owned_subtask(&pool, subtask_id.into_inner(), user.0).await?;

    sqlx::query("DELETE FROM subtasks WHERE id = $1")
        .bind(subtask.id)
        .execute(&**pool)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
