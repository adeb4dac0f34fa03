//! Authorization for GraphQL operations.
//!
//! Identity comes from `RequestContext` (the `x-user-id` / `x-is-admin` headers).
//!
//! ```ignore
//! #[graphql(guard = "AuthenticatedGuard")]
//! async fn tasks(&self, ctx: &Context<'_>) -> Result<Vec<Task>> { ... }
//!
//! #[graphql(guard = "AdminGuard")]
//! async fn users(&self, ctx: &Context<'_>) -> Result<Vec<User>> { ... }
//! ```

use async_graphql::{Context, ErrorExtensions, Result};

use super::context::RequestContext;
use crate::error::AppError;
use crate::models::TaskWhereInput;

/// Extension trait to read the request identity from a GraphQL context.
pub trait ContextExt {
    /// The request context, or an anonymous one if none was attached.
    fn request_context(&self) -> RequestContext;

    /// The id of the calling user, or `Unauthorized` if the request names none.
    fn viewer_id(&self) -> Result<i32, AppError>;
}

impl<'a> ContextExt for Context<'a> {
    fn request_context(&self) -> RequestContext {
        self.data_opt::<RequestContext>().copied().unwrap_or_default()
    }

    fn viewer_id(&self) -> Result<i32, AppError> {
        self.request_context()
            .user_id
            .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".into()))
    }
}

/// Requires a user id or admin rights.
pub struct AuthenticatedGuard;

impl async_graphql::Guard for AuthenticatedGuard {
    fn check(&self, ctx: &Context<'_>) -> impl std::future::Future<Output = Result<()>> + Send {
        let context = ctx.request_context();
        let result = if context.user_id.is_some() || context.is_admin {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Authentication required".into()).extend())
        };
        async move { result }
    }
}

/// Requires admin rights.
pub struct AdminGuard;

impl async_graphql::Guard for AdminGuard {
    fn check(&self, ctx: &Context<'_>) -> impl std::future::Future<Output = Result<()>> + Send {
        let result = if ctx.request_context().is_admin {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin privileges required".into()).extend())
        };
        async move { result }
    }
}

/// Restricts a task filter to what `context` may see.
///
/// Admins keep their filter as is; other callers only ever see their own tasks.
pub fn scope_task_filter(
    context: RequestContext,
    filter: Option<TaskWhereInput>,
) -> Result<Option<TaskWhereInput>, AppError> {
    if context.is_admin {
        return Ok(filter);
    }
    let viewer = context
        .user_id
        .ok_or_else(|| AppError::Unauthorized("Missing x-user-id header".into()))?;
    Ok(Some(TaskWhereInput::owned_by(viewer).restrict(filter)))
}
