use async_graphql::{Context, Object, Result, ResultExt};
use uuid::Uuid;
use validator::Validate;

use super::auth::{AuthenticatedGuard, ContextExt};
use super::relations::TaskNode;
use crate::db::Database;
use crate::error::AppError;
use crate::models::{CreateTaskInput, UpdateTaskInput};

/// Mutation root of the full server.
pub struct MutationRoot;

#[Object(name = "Mutation")]
impl MutationRoot {
    /// Creates a task owned by the caller.
    #[graphql(guard = "AuthenticatedGuard")]
    async fn create_task(&self, ctx: &Context<'_>, input: CreateTaskInput) -> Result<TaskNode> {
        let owner = ctx.viewer_id().extend()?;
        input.validate().map_err(AppError::from).extend()?;

        let db = ctx.data::<Database>()?;
        let task = db.tasks().create(owner, &input).await.extend()?;
        Ok(TaskNode(task))
    }

    /// Updates a task the caller owns. Admins may update any task.
    #[graphql(guard = "AuthenticatedGuard")]
    async fn update_task(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateTaskInput,
    ) -> Result<TaskNode> {
        input.validate().map_err(AppError::from).extend()?;

        let db = ctx.data::<Database>()?;
        let context = ctx.request_context();
        match db.tasks().find_unique(id).await.extend()? {
            Some(task) if context.can_access(task.user_id) => {}
            _ => return Err(AppError::NotFound("Task not found".into())).extend(),
        }

        let task = db.tasks().update(id, &input).await.extend()?;
        Ok(TaskNode(task))
    }
}
