use crate::{
    auth::AuthenticatedUserId,
    error::AppError,
    models::{SubTask, Task, TaskInput, TaskQuery, TaskSummary},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde::Serialize;
use uuid::Uuid;
use validator::Validate;

/// A task together with its subtasks, as returned by the detail endpoint.
#[derive(Debug, Serialize)]
pub struct TaskDetail {
    #[serde(flatten)]
    pub task: Task,
    pub subtasks: Vec<SubTask>,
}

/// Retrieves a list of tasks for the authenticated user.
///
/// This endpoint fetches tasks owned by the authenticated user. It supports
/// filtering by `is_done`, `priority`, and a `search` term which looks for
/// matches in task names and descriptions.
/// Tasks are ordered by creation date in descending order.
///
/// ## Query Parameters:
/// - `is_done` (optional): Filters tasks by completion state.
/// - `priority` (optional): Filters tasks by their priority ("green", "yellow", "red").
/// - `search` (optional): A string to search for in task names and descriptions (case-insensitive).
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Task` objects.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[get("")]
#[allow(unused_assignments)]
pub async fn get_tasks(
    pool: web::Data<sqlx::PgPool>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    // Base query to select tasks for the authenticated user.
    // Conditions for is_done, priority, and search terms are dynamically appended.
    let mut sql = String::from(
        "SELECT id, name, description, priority, is_done, overdue, date, created_at, updated_at, user_id \
         FROM tasks WHERE user_id = $1",
    );
    let mut param_count = 2;

    let mut conditions: Vec<String> = Vec::new();

    if query_params.is_done.is_some() {
        conditions.push(format!("is_done = ${}", param_count));
        param_count += 1;
    }
    if query_params.priority.is_some() {
        conditions.push(format!("priority = ${}", param_count));
        param_count += 1;
    }
    if query_params.search.is_some() {
        conditions.push(format!("(name ILIKE ${}", param_count));
        param_count += 1;
        conditions
            .last_mut()
            .unwrap()
            .push_str(&format!(" OR description ILIKE ${})", param_count));
        param_count += 1;
    }

    if !conditions.is_empty() {
        sql.push_str(" AND ");
        sql.push_str(&conditions.join(" AND "));
    }

    sql.push_str(" ORDER BY created_at DESC");

    let mut query_builder = sqlx::query_as::<_, Task>(&sql);

    query_builder = query_builder.bind(user.0);

    if let Some(is_done) = query_params.is_done {
        query_builder = query_builder.bind(is_done);
    }
    if let Some(priority) = &query_params.priority {
        query_builder = query_builder.bind(priority.clone());
    }
    if let Some(search) = &query_params.search {
        let search_pattern = format!("%{}%", search);
        query_builder = query_builder.bind(search_pattern.clone());
        query_builder = query_builder.bind(search_pattern);
    }

    let tasks = query_builder.fetch_all(&**pool).await?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Returns completion counts for the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: `{"total": <all tasks>, "done": <completed tasks>}`.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
#[get("/summary")]
pub async fn get_summary(
    pool: web::Data<sqlx::PgPool>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let summary = sqlx::query_as::<_, TaskSummary>(
        "SELECT COUNT(*) AS total, COUNT(*) FILTER (WHERE is_done) AS done
         FROM tasks WHERE user_id = $1",
    )
    .bind(user.0)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(summary))
}

/// Creates a new task for the authenticated user.
///
/// This endpoint allows an authenticated user to create a new task.
/// It expects a JSON payload conforming to `TaskInput`.
/// The `user_id` of the task is automatically set to the ID of the authenticated user.
///
/// ## Request Body:
/// A JSON object matching the `TaskInput` struct, including:
/// - `name`: The name of the task (required).
/// - `description` (optional): A description of the task.
/// - `priority` (optional): The priority of the task ("green", "yellow", "red").
/// - `date`: The day the task is scheduled for; must not be in the past.
/// - `is_done` (optional): Completion state, defaults to false.
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Task` object as JSON.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `422 Unprocessable Entity`: If input validation on `TaskInput` fails (e.g., date in the past).
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[post("")]
pub async fn create_task(
    pool: web::Data<sqlx::PgPool>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    // Validate input
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user.0);

    // Insert task
    let result = sqlx::query_as::<_, Task>(
        "INSERT INTO tasks (id, name, description, priority, is_done, overdue, date, user_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
         RETURNING id, name, description, priority, is_done, overdue, date, created_at, updated_at, user_id",
    )
    .bind(task.id)
    .bind(task.name)
    .bind(task.description)
    .bind(task.priority)
    .bind(task.is_done)
    .bind(task.overdue)
    .bind(task.date)
    .bind(task.user_id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Retrieves a specific task by its ID, including its subtasks.
///
/// The authenticated user must be the owner of the task.
///
/// ## Path Parameters:
/// - `id`: The UUID of the task to retrieve.
///
/// ## Responses:
/// - `200 OK`: Returns the task with its subtasks embedded.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the task with the given ID does not exist or is not owned by the authenticated user.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<sqlx::PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let task_uuid = task_id.into_inner();

    let task = sqlx::query_as::<_, Task>(
        "SELECT id, name, description, priority, is_done, overdue, date, created_at, updated_at, user_id
         FROM tasks WHERE id = $1",
    )
    .bind(task_uuid)
    .fetch_optional(&**pool)
    .await?;

    match task {
        Some(task) if task.user_id == user.0 => {
            let subtasks = sqlx::query_as::<_, SubTask>(
                "SELECT id, name, description, priority, is_done, task_id
                 FROM subtasks WHERE task_id = $1 ORDER BY id",
            )
            .bind(task_uuid)
            .fetch_all(&**pool)
            .await?;

            Ok(HttpResponse::Ok().json(TaskDetail { task, subtasks }))
        }
        // Not-owned reads are indistinguishable from missing tasks.
        _ => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Updates an existing task.
///
/// This endpoint allows an authenticated user to update a task they own.
/// It expects a JSON payload conforming to `TaskInput` and the task's UUID in the path.
/// Only the owner of the task can update it.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Task` object as JSON.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the task with the given ID does not exist or is not owned by the authenticated user.
/// - `422 Unprocessable Entity`: If input validation on `TaskInput` fails.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<sqlx::PgPool>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;
    let task_uuid = task_id.into_inner();

    // First, verify ownership
    let ownership_check: Option<(i32,)> =
        sqlx::query_as("SELECT user_id FROM tasks WHERE id = $1")
            .bind(task_uuid)
            .fetch_optional(&**pool)
            .await?;

    match ownership_check {
        Some((owner_user_id,)) => {
            if owner_user_id != user.0 {
                return Err(AppError::NotFound(
                    "Task not found or not owned by user".into(),
                ));
            }
        }
        None => return Err(AppError::NotFound("Task not found".into())),
    }

    // If ownership is verified, proceed with update
    let result = sqlx::query_as::<_, Task>(
        "UPDATE tasks
         SET name = $1, description = $2, priority = $3, is_done = $4, date = $5, updated_at = now()
         WHERE id = $6 AND user_id = $7
         RETURNING id, name, description, priority, is_done, overdue, date, created_at, updated_at, user_id",
    )
    .bind(&task_data.name)
    .bind(&task_data.description)
    .bind(task_data.priority.clone())
    .bind(task_data.is_done)
    .bind(task_data.date)
    .bind(task_uuid)
    .bind(user.0)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Deletes a task by its ID.
///
/// This endpoint allows an authenticated user to delete a task they own.
/// Only the owner of the task can delete it. Subtasks are removed with their
/// task.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `401 Unauthorized`: If the request lacks a valid authentication token.
/// - `404 Not Found`: If the task with the given ID does not exist or is not owned by the authenticated user.
/// - `500 Internal Server Error`: For database errors or other unexpected issues.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<sqlx::PgPool>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let task_uuid = task_id.into_inner();

    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(task_uuid)
        .bind(user.0)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(
            "Task not found or not owned by user".into(),
        ));
    }

    Ok(HttpResponse::NoContent().finish())
}
