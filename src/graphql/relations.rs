//! `User` and `Task` as the full schema exposes them, with relation fields.
//!
//! The plain and passthrough schemas serve `models::User` / `models::Task` directly and
//! have no relations. Objects reached through a relation are not covered by the root
//! field guards, so every task-returning relation applies the caller's visibility here.

use async_graphql::{Context, ErrorExtensions, Object, Result, ResultExt};
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::auth::{scope_task_filter, ContextExt};
use super::context::RequestContext;
use super::loaders::{loader_error, TaskCountDataLoader, UserDataLoader};
use super::pagination::{tasks_connection, TaskConnection};
use crate::db::Database;
use crate::error::AppError;
use crate::models::{Task, TaskPriority, TaskStatus, TaskWhereInput, User};

pub struct UserNode(pub User);

impl From<User> for UserNode {
    fn from(user: User) -> Self {
        Self(user)
    }
}

/// The tasks of `owner_id` that `context` may see.
fn visible_tasks_of(
    context: RequestContext,
    owner_id: i32,
) -> Result<Option<TaskWhereInput>, AppError> {
    scope_task_filter(context, Some(TaskWhereInput::owned_by(owner_id)))
}

#[Object(name = "User")]
impl UserNode {
    async fn id(&self) -> i32 {
        self.0.id
    }

    async fn username(&self) -> &str {
        &self.0.username
    }

    async fn email(&self) -> &str {
        &self.0.email
    }

    async fn is_admin(&self) -> bool {
        self.0.is_admin
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    /// Number of tasks this user owns that the caller can see.
    async fn task_count(&self, ctx: &Context<'_>) -> Result<i64> {
        if !ctx.request_context().can_access(self.0.id) {
            return Ok(0);
        }
        let loader = ctx.data::<TaskCountDataLoader>()?;
        let count = loader
            .load_one(self.0.id)
            .await
            .map_err(loader_error)
            .extend()?;
        Ok(count.unwrap_or(0))
    }

    /// Tasks owned by this user that the caller can see, newest first.
    async fn tasks(
        &self,
        ctx: &Context<'_>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<TaskConnection> {
        let db = ctx.data::<Database>()?;
        let filter = visible_tasks_of(ctx.request_context(), self.0.id).extend()?;
        tasks_connection(db, filter, after, before, first, last).await
    }
}

pub struct TaskNode(pub Task);

impl From<Task> for TaskNode {
    fn from(task: Task) -> Self {
        Self(task)
    }
}

#[Object(name = "Task")]
impl TaskNode {
    async fn id(&self) -> Uuid {
        self.0.id
    }

    async fn title(&self) -> &str {
        &self.0.title
    }

    async fn description(&self) -> Option<&str> {
        self.0.description.as_deref()
    }

    async fn priority(&self) -> Option<TaskPriority> {
        self.0.priority
    }

    async fn status(&self) -> TaskStatus {
        self.0.status
    }

    async fn due_date(&self) -> Option<DateTime<Utc>> {
        self.0.due_date
    }

    async fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    async fn updated_at(&self) -> DateTime<Utc> {
        self.0.updated_at
    }

    /// Identifier of the user who owns the task.
    async fn user_id(&self) -> i32 {
        self.0.user_id
    }

    async fn assigned_to(&self) -> Option<i32> {
        self.0.assigned_to
    }

    /// The owner of the task.
    async fn user(&self, ctx: &Context<'_>) -> Result<UserNode> {
        let loader = ctx.data::<UserDataLoader>()?;
        loader
            .load_one(self.0.user_id)
            .await
            .map_err(loader_error)
            .extend()?
            .map(UserNode)
            .ok_or_else(|| {
                AppError::NotFound(format!("User {} not found", self.0.user_id)).extend()
            })
    }

    /// The user the task is assigned to, if any.
    async fn assignee(&self, ctx: &Context<'_>) -> Result<Option<UserNode>> {
        let Some(assignee_id) = self.0.assigned_to else {
            return Ok(None);
        };
        let loader = ctx.data::<UserDataLoader>()?;
        let assignee = loader
            .load_one(assignee_id)
            .await
            .map_err(loader_error)
            .extend()?;
        Ok(assignee.map(UserNode))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::filters::SqlFilter;
    use pretty_assertions::assert_eq;
    use sqlx::{Postgres, QueryBuilder};

    fn render(filter: &TaskWhereInput) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("");
        filter.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_other_users_tasks_are_narrowed_to_the_viewer() {
        let filter = visible_tasks_of(RequestContext::user(1), 2)
            .unwrap()
            .unwrap();

        let parts = filter.and.as_ref().expect("viewer filter is a conjunction");
        assert_eq!(parts[0].user_id.as_ref().and_then(|f| f.equals), Some(1));
        assert_eq!(parts[1].user_id.as_ref().and_then(|f| f.equals), Some(2));
        assert_eq!(render(&filter), "((user_id = $1) AND (user_id = $2))");
    }

    #[test]
    fn test_admins_see_every_owner() {
        let filter = visible_tasks_of(RequestContext::admin(Some(1)), 2)
            .unwrap()
            .unwrap();

        assert!(filter.and.is_none());
        assert_eq!(filter.user_id.and_then(|f| f.equals), Some(2));
    }
}
