use async_graphql::{Context, Object, Result, ResultExt};
use uuid::Uuid;

use super::auth::{scope_task_filter, AdminGuard, AuthenticatedGuard, ContextExt};
use super::pagination::{tasks_connection, TaskConnection};
use super::relations::{TaskNode, UserNode};
use crate::db::Database;
use crate::error::AppError;
use crate::models::{
    FindManyArgs, TaskOrderByInput, TaskWhereInput, UserOrderByInput, UserWhereInput,
};

/// Query root of the full server.
pub struct QueryRoot;

#[Object(name = "Query")]
impl QueryRoot {
    /// The user named by the `x-user-id` header.
    #[graphql(guard = "AuthenticatedGuard")]
    async fn me(&self, ctx: &Context<'_>) -> Result<Option<UserNode>> {
        let db = ctx.data::<Database>()?;
        let viewer = ctx.viewer_id().extend()?;
        let user = db.users().find_unique(viewer).await.extend()?;
        Ok(user.map(UserNode))
    }

    #[graphql(guard = "AdminGuard")]
    async fn users(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "where")] filter: Option<UserWhereInput>,
        order_by: Option<Vec<UserOrderByInput>>,
        #[graphql(validator(minimum = 0))] take: Option<i32>,
        #[graphql(validator(minimum = 0))] skip: Option<i32>,
    ) -> Result<Vec<UserNode>> {
        let db = ctx.data::<Database>()?;
        let args = FindManyArgs::new(filter, order_by, take, skip);
        let users = db.users().find_many(&args).await.extend()?;
        Ok(users.into_iter().map(UserNode).collect())
    }

    /// Tasks visible to the caller. Non-admins only see the tasks they own.
    #[graphql(guard = "AuthenticatedGuard")]
    async fn tasks(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "where")] filter: Option<TaskWhereInput>,
        order_by: Option<Vec<TaskOrderByInput>>,
        #[graphql(validator(minimum = 0))] take: Option<i32>,
        #[graphql(validator(minimum = 0))] skip: Option<i32>,
    ) -> Result<Vec<TaskNode>> {
        let db = ctx.data::<Database>()?;
        let filter = scope_task_filter(ctx.request_context(), filter).extend()?;
        let args = FindManyArgs::new(filter, order_by, take, skip);
        let tasks = db.tasks().find_many(&args).await.extend()?;
        Ok(tasks.into_iter().map(TaskNode).collect())
    }

    #[graphql(guard = "AuthenticatedGuard")]
    async fn task(&self, ctx: &Context<'_>, id: Uuid) -> Result<TaskNode> {
        let db = ctx.data::<Database>()?;
        let context = ctx.request_context();
        match db.tasks().find_unique(id).await.extend()? {
            Some(task) if context.can_access(task.user_id) => Ok(TaskNode(task)),
            _ => Err(AppError::NotFound("Task not found".into())).extend(),
        }
    }

    /// Same visibility as `tasks`, paginated newest first.
    #[graphql(guard = "AuthenticatedGuard")]
    async fn tasks_connection(
        &self,
        ctx: &Context<'_>,
        #[graphql(name = "where")] filter: Option<TaskWhereInput>,
        after: Option<String>,
        before: Option<String>,
        first: Option<i32>,
        last: Option<i32>,
    ) -> Result<TaskConnection> {
        let db = ctx.data::<Database>()?;
        let filter = scope_task_filter(ctx.request_context(), filter).extend()?;
        tasks_connection(db, filter, after, before, first, last).await
    }
}
