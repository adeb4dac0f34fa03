//! Cursor-based pagination of tasks.
//!
//! Connections follow the Relay shape (`edges`, `pageInfo`) produced by
//! `async_graphql::connection`. Cursors are opaque encodings of `(created_at, id)`,
//! so pages stay stable while tasks are inserted.

use async_graphql::connection::{self, Connection, Edge, OpaqueCursor};
use async_graphql::{ResultExt, SimpleObject};

use super::relations::TaskNode;
use crate::db::{Database, Direction, KeysetWindow, TaskCursor};
use crate::error::AppError;
use crate::models::TaskWhereInput;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

#[derive(SimpleObject, Debug, Clone, Copy)]
pub struct TaskConnectionFields {
    /// Number of tasks matching the filter, across all pages.
    pub total_count: i64,
}

pub type TaskConnection = Connection<OpaqueCursor<TaskCursor>, TaskNode, TaskConnectionFields>;

/// Turns Relay arguments into a keyset window.
///
/// `first`/`after` page towards older tasks, `last`/`before` towards newer ones. Mixing
/// the two directions is rejected. Page sizes above `MAX_PAGE_SIZE` are clamped.
pub fn keyset_window(
    after: Option<TaskCursor>,
    before: Option<TaskCursor>,
    first: Option<usize>,
    last: Option<usize>,
) -> Result<KeysetWindow, AppError> {
    if first.is_some() && last.is_some() {
        return Err(AppError::BadRequest(
            "Passing both `first` and `last` is not supported".into(),
        ));
    }

    let backward = last.is_some() || (before.is_some() && first.is_none());
    let (direction, cursor, size) = if backward {
        if after.is_some() {
            return Err(AppError::BadRequest(
                "`after` cannot be combined with `last` or `before`".into(),
            ));
        }
        (Direction::Backward, before, last)
    } else {
        if before.is_some() {
            return Err(AppError::BadRequest(
                "`before` cannot be combined with `first` or `after`".into(),
            ));
        }
        (Direction::Forward, after, first)
    };

    let limit = size.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    Ok(KeysetWindow {
        cursor,
        direction,
        limit: limit as i64,
    })
}

/// Resolves one page of the tasks matching `filter`, with the total count.
pub async fn tasks_connection(
    db: &Database,
    filter: Option<TaskWhereInput>,
    after: Option<String>,
    before: Option<String>,
    first: Option<i32>,
    last: Option<i32>,
) -> async_graphql::Result<TaskConnection> {
    connection::query(
        after,
        before,
        first,
        last,
        |after: Option<OpaqueCursor<TaskCursor>>,
         before: Option<OpaqueCursor<TaskCursor>>,
         first,
         last| async move {
            let had_after = after.is_some();
            let had_before = before.is_some();
            let window =
                keyset_window(after.map(|c| c.0), before.map(|c| c.0), first, last).extend()?;

            let tasks = db.tasks();
            let (total_count, page) = futures::try_join!(
                tasks.count(filter.as_ref()),
                tasks.page(filter.as_ref(), &window)
            )
            .extend()?;

            let (has_previous_page, has_next_page) = match window.direction {
                Direction::Forward => (had_after, page.has_more),
                Direction::Backward => (page.has_more, had_before),
            };

            let mut connection = Connection::with_additional_fields(
                has_previous_page,
                has_next_page,
                TaskConnectionFields { total_count },
            );
            connection.edges.extend(page.tasks.into_iter().map(|task| {
                Edge::new(OpaqueCursor(TaskCursor::from(&task)), TaskNode(task))
            }));
            Ok::<_, async_graphql::Error>(connection)
        },
    )
    .await
}
