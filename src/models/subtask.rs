use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::models::task::TaskPriority;

/// Represents a subtask entity. Subtasks belong to a task and are owned
/// through it: whoever owns the task owns its subtasks.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct SubTask {
    /// Unique identifier for the subtask (UUID v4).
    pub id: Uuid,
    /// The name of the subtask.
    pub name: String,
    /// An optional description for the subtask.
    pub description: Option<String>,
    /// The priority of the subtask.
    pub priority: Option<TaskPriority>,
    /// Whether the subtask has been completed.
    pub is_done: bool,
    /// Identifier of the parent task.
    pub task_id: Uuid,
}

/// Input structure for creating a subtask under an existing task.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct CreateSubTaskInput {
    /// The parent task.
    pub task: Uuid,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
}

/// Input structure for updating an existing subtask.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SubTaskInput {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub is_done: bool,
}

impl SubTask {
    /// Creates a new `SubTask` from `CreateSubTaskInput` with a fresh UUID.
    pub fn new(input: CreateSubTaskInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: input.name,
            description: input.description,
            priority: input.priority,
            is_done: false,
            task_id: input.task,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subtask_creation() {
        let task_id = Uuid::new_v4();
        let input = CreateSubTaskInput {
            task: task_id,
            name: "Test subtask".to_string(),
            description: None,
            priority: Some(TaskPriority::Yellow),
        };

        let subtask = SubTask::new(input);
        assert_eq!(subtask.name, "Test subtask");
        assert_eq!(subtask.task_id, task_id);
        assert!(!subtask.is_done);
    }

    #[test]
    fn test_subtask_input_validation() {
        let valid = SubTaskInput {
            name: "Valid subtask".to_string(),
            description: Some("Description".to_string()),
            priority: None,
            is_done: false,
        };
        assert!(valid.validate().is_ok());

        let empty_name = SubTaskInput {
            name: "".to_string(),
            description: None,
            priority: None,
            is_done: false,
        };
        assert!(empty_name.validate().is_err());
    }
}
