use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::filters::{push_limit_offset, push_optional_where, push_order_by};
use crate::error::AppError;
use crate::models::task::TASK_COLUMNS;
use crate::models::{CreateTaskInput, Task, TaskFindMany, TaskWhereInput, UpdateTaskInput};

/// Position of a task in the newest-first ordering (`created_at DESC, id DESC`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskCursor {
    pub created_at: DateTime<Utc>,
    pub id: Uuid,
}

impl From<&Task> for TaskCursor {
    fn from(task: &Task) -> Self {
        Self {
            created_at: task.created_at,
            id: task.id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Towards older tasks, starting after the cursor.
    Forward,
    /// Towards newer tasks, ending before the cursor.
    Backward,
}

/// One keyset page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeysetWindow {
    pub cursor: Option<TaskCursor>,
    pub direction: Direction,
    pub limit: i64,
}

#[derive(Debug)]
pub struct KeysetPage {
    /// Tasks in newest-first order regardless of the direction they were fetched in.
    pub tasks: Vec<Task>,
    /// Whether more rows exist beyond the page in the fetch direction.
    pub has_more: bool,
}

pub struct TaskRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> TaskRepository<'a> {
    pub(super) fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_many(&self, args: &TaskFindMany) -> Result<Vec<Task>, AppError> {
        let mut qb = find_many_query(args);
        let tasks = qb.build_query_as::<Task>().fetch_all(self.pool).await?;
        Ok(tasks)
    }

    pub async fn find_unique(&self, id: Uuid) -> Result<Option<Task>, AppError> {
        let sql = format!("SELECT {} FROM tasks WHERE id = $1", TASK_COLUMNS);
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(self.pool)
            .await?;
        Ok(task)
    }

    pub async fn count(&self, filter: Option<&TaskWhereInput>) -> Result<i64, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM tasks WHERE ");
        push_optional_where(&mut qb, filter);
        let count = qb.build_query_scalar::<i64>().fetch_one(self.pool).await?;
        Ok(count)
    }

    /// Number of tasks per owner, for the owners that have at least one.
    pub async fn count_by_owner(&self, owner_ids: &[i32]) -> Result<Vec<(i32, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (i32, i64)>(
            "SELECT user_id, COUNT(*) FROM tasks WHERE user_id = ANY($1) GROUP BY user_id",
        )
        .bind(owner_ids.to_vec())
        .fetch_all(self.pool)
        .await
    }

    pub async fn create(&self, owner_id: i32, input: &CreateTaskInput) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (id, title, description, priority, status, due_date, user_id, assigned_to) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(Uuid::new_v4())
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.priority)
            .bind(input.status)
            .bind(input.due_date)
            .bind(owner_id)
            .bind(input.assigned_to)
            .fetch_one(self.pool)
            .await?;

        log::info!("Task {} created by user {}", task.id, owner_id);
        Ok(task)
    }

    /// Applies the fields present in `input`; returns `NotFound` if the task is gone.
    pub async fn update(&self, id: Uuid, input: &UpdateTaskInput) -> Result<Task, AppError> {
        let mut qb = update_query(id, input);
        qb.build_query_as::<Task>()
            .fetch_optional(self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    /// Fetches one keyset page of the tasks matching `filter`.
    pub async fn page(
        &self,
        filter: Option<&TaskWhereInput>,
        window: &KeysetWindow,
    ) -> Result<KeysetPage, AppError> {
        let mut qb = keyset_query(filter, window);
        let mut tasks = qb.build_query_as::<Task>().fetch_all(self.pool).await?;

        let limit = usize::try_from(window.limit).unwrap_or(0);
        let has_more = tasks.len() > limit;
        tasks.truncate(limit);
        if window.direction == Direction::Backward {
            tasks.reverse();
        }

        Ok(KeysetPage { tasks, has_more })
    }
}

fn find_many_query(args: &TaskFindMany) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM tasks WHERE ", TASK_COLUMNS));
    push_optional_where(&mut qb, args.filter.as_ref());
    let order: Vec<_> = args
        .order_by
        .iter()
        .map(|o| (o.field.column(), o.direction))
        .collect();
    push_order_by(&mut qb, &order);
    push_limit_offset(&mut qb, args.take, args.skip);
    qb
}

fn update_query(id: Uuid, input: &UpdateTaskInput) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");
    if let Some(title) = &input.title {
        qb.push(", title = ").push_bind(title.clone());
    }
    if let Some(description) = &input.description {
        qb.push(", description = ").push_bind(description.clone());
    }
    if let Some(priority) = input.priority {
        qb.push(", priority = ").push_bind(priority);
    }
    if let Some(status) = input.status {
        qb.push(", status = ").push_bind(status);
    }
    if let Some(due_date) = input.due_date {
        qb.push(", due_date = ").push_bind(due_date);
    }
    if let Some(assigned_to) = input.assigned_to {
        qb.push(", assigned_to = ").push_bind(assigned_to);
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb.push(" RETURNING ").push(TASK_COLUMNS);
    qb
}

fn keyset_query(filter: Option<&TaskWhereInput>, window: &KeysetWindow) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {} FROM tasks WHERE ", TASK_COLUMNS));
    push_optional_where(&mut qb, filter);

    if let Some(cursor) = window.cursor {
        let op = match window.direction {
            Direction::Forward => " < ",
            Direction::Backward => " > ",
        };
        qb.push(" AND (created_at, id)")
            .push(op)
            .push("(")
            .push_bind(cursor.created_at)
            .push(", ")
            .push_bind(cursor.id)
            .push(")");
    }

    qb.push(match window.direction {
        Direction::Forward => " ORDER BY created_at DESC, id DESC",
        Direction::Backward => " ORDER BY created_at ASC, id ASC",
    });
    // One extra row tells whether another page follows.
    qb.push(" LIMIT ").push_bind(window.limit + 1);
    qb
}
