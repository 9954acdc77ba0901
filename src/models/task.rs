use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Represents the priority of a task or subtask.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    /// Lowest urgency.
    Green,
    /// Should be handled soon.
    Yellow,
    /// Highest urgency.
    Red,
}

/// Input structure for creating or updating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The name of the task.
    /// Must be between 1 and 255 characters.
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    /// An optional description for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    /// The priority of the task.
    pub priority: Option<TaskPriority>,

    /// The day the task is scheduled for. Must not lie in the past.
    #[validate(custom = "validate_task_date")]
    pub date: NaiveDate,

    /// Whether the task is completed. Defaults to false when omitted.
    #[serde(default)]
    pub is_done: bool,
}

/// A task may only be scheduled for today or a future day.
fn validate_task_date(date: &NaiveDate) -> Result<(), ValidationError> {
    if *date < Utc::now().date_naive() {
        return Err(ValidationError::new("date_in_past"));
    }
    Ok(())
}

/// Represents a task entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The name of the task.
    pub name: String,
    /// An optional description for the task.
    pub description: Option<String>,
    /// The priority of the task.
    pub priority: Option<TaskPriority>,
    /// Whether the task has been completed.
    pub is_done: bool,
    /// Whether the task slipped past its scheduled day without completion.
    pub overdue: bool,
    /// The day the task is scheduled for.
    pub date: NaiveDate,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
}

/// Represents query parameters for filtering tasks when listing them.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Filter tasks by completion state.
    pub is_done: Option<bool>,
    /// Filter tasks by priority.
    pub priority: Option<TaskPriority>,
    /// Search term to filter tasks by name or description (case-insensitive).
    pub search: Option<String>,
}

/// Per-user completion counts returned by the summary endpoint.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TaskSummary {
    /// Total number of tasks owned by the user.
    pub total: i64,
    /// How many of them are done.
    pub done: i64,
}

impl Task {
    /// Creates a new `Task` instance from `TaskInput` and the owner's `user_id`.
    /// Sets `created_at`, `updated_at` to the current time, and `id` to a new UUID.
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            priority: input.priority,
            is_done: input.is_done,
            overdue: false,
            date: input.date,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_task_creation() {
        let input = TaskInput {
            name: "Test Task".to_string(),
            description: Some("Test Description".to_string()),
            priority: Some(TaskPriority::Red),
            date: Utc::now().date_naive(),
            is_done: false,
        };

        let task = Task::new(input, 1);
        assert_eq!(task.name, "Test Task");
        assert_eq!(task.user_id, 1);
        assert!(!task.is_done);
        assert!(!task.overdue);
    }

    #[test]
    fn test_task_validation() {
        let today = Utc::now().date_naive();

        let valid_input = TaskInput {
            name: "Valid Task".to_string(),
            description: Some("Valid Description".to_string()),
            priority: Some(TaskPriority::Green),
            date: today,
            is_done: false,
        };
        assert!(valid_input.validate().is_ok());

        let invalid_input = TaskInput {
            name: "".to_string(), // Empty name
            description: Some("Valid Description".to_string()),
            priority: Some(TaskPriority::Green),
            date: today,
            is_done: false,
        };
        assert!(invalid_input.validate().is_err());
    }

    #[test]
    fn test_task_date_validation() {
        let yesterday = Utc::now().date_naive() - Duration::days(1);
        let tomorrow = Utc::now().date_naive() + Duration::days(1);

        let past_input = TaskInput {
            name: "Late task".to_string(),
            description: None,
            priority: None,
            date: yesterday,
            is_done: false,
        };
        assert!(
            past_input.validate().is_err(),
            "Validation should fail for a date in the past."
        );

        let future_input = TaskInput {
            name: "Planned task".to_string(),
            description: None,
            priority: None,
            date: tomorrow,
            is_done: false,
        };
        assert!(future_input.validate().is_ok());
    }
}
