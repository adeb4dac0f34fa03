use async_graphql::{Enum, InputObject, SimpleObject};
use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

lazy_static! {
    // A title must contain at least one visible character.
    static ref VISIBLE_TEXT_REGEX: Regex = Regex::new(r"\S").unwrap();
}

/// Represents the priority of a task.
/// Corresponds to the `task_priority` SQL enum.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, Enum)]
#[sqlx(type_name = "task_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

/// Represents the status of a task.
/// Corresponds to the `task_status` SQL enum.
#[derive(Debug, Default, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type, Enum)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[default]
    Todo,
    /// Task is currently being worked on.
    InProgress,
    /// Task is completed and under review.
    Review,
    /// Task is completed.
    Done,
}

/// Represents a task entity as stored in the database and returned by the API.
///
/// The full schema wraps it in `graphql::relations::TaskNode` to add `user` and
/// `assignee`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, SimpleObject)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub priority: Option<TaskPriority>,
    pub status: TaskStatus,
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
    /// Identifier of the user to whom the task is assigned.
    pub assigned_to: Option<i32>,
}

pub(crate) const TASK_COLUMNS: &str = "id, title, description, priority, status, due_date, \
     created_at, updated_at, user_id, assigned_to";

/// Input for `createTask`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, InputObject)]
pub struct CreateTaskInput {
    /// Between 1 and 200 characters, not blank.
    #[validate(
        length(min = 1, max = 200),
        regex(path = "VISIBLE_TEXT_REGEX", message = "Title must not be blank")
    )]
    pub title: String,

    /// At most 1000 characters.
    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    /// Defaults to `TODO`.
    #[graphql(default)]
    #[serde(default)]
    pub status: TaskStatus,

    /// Must not lie in the past.
    #[validate(custom = "not_in_past")]
    pub due_date: Option<DateTime<Utc>>,

    pub assigned_to: Option<i32>,
}

/// Input for `updateTask`. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, InputObject)]
#[validate(schema(function = "has_any_change"))]
pub struct UpdateTaskInput {
    #[validate(
        length(min = 1, max = 200),
        regex(path = "VISIBLE_TEXT_REGEX", message = "Title must not be blank")
    )]
    pub title: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    pub priority: Option<TaskPriority>,

    pub status: Option<TaskStatus>,

    pub due_date: Option<DateTime<Utc>>,

    pub assigned_to: Option<i32>,
}

impl UpdateTaskInput {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.due_date.is_none()
            && self.assigned_to.is_none()
    }
}

fn not_in_past(due_date: &DateTime<Utc>) -> Result<(), ValidationError> {
    if *due_date < Utc::now() {
        let mut error = ValidationError::new("due_date_in_past");
        error.message = Some("Due date must not be in the past".into());
        return Err(error);
    }
    Ok(())
}

fn has_any_change(input: &UpdateTaskInput) -> Result<(), ValidationError> {
    if input.is_empty() {
        let mut error = ValidationError::new("empty_update");
        error.message = Some("At least one field must be provided".into());
        return Err(error);
    }
    Ok(())
}
