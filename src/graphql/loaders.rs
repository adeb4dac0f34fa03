//! DataLoaders for the relation fields.
//!
//! `Task.user`, `Task.assignee` and `User.taskCount` are resolved once per parent; the
//! loaders collect those calls within one execution tick and answer them with a single
//! query each. Fresh, caching loaders are attached to every request by `attach`.

use std::collections::HashMap;
use std::sync::Arc;

use async_graphql::dataloader::{DataLoader, HashMapCache, Loader};

use crate::db::Database;
use crate::error::AppError;
use crate::models::User;

pub type UserDataLoader = DataLoader<UserLoader, HashMapCache>;
pub type TaskCountDataLoader = DataLoader<TaskCountLoader, HashMapCache>;

/// Batches user lookups by id.
pub struct UserLoader {
    db: Database,
}

impl UserLoader {
    pub fn new(db: Database) -> UserDataLoader {
        DataLoader::with_cache(Self { db }, tokio::spawn, HashMapCache::default())
    }
}

impl Loader<i32> for UserLoader {
    type Value = User;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        log::debug!("Batch loading {} users", keys.len());
        let users = self.db.users().find_by_ids(keys).await.map_err(Arc::new)?;
        Ok(users.into_iter().map(|user| (user.id, user)).collect())
    }
}

/// Batches task counts by owner id. Owners without tasks count 0.
pub struct TaskCountLoader {
    db: Database,
}

impl TaskCountLoader {
    pub fn new(db: Database) -> TaskCountDataLoader {
        DataLoader::with_cache(Self { db }, tokio::spawn, HashMapCache::default())
    }
}

impl Loader<i32> for TaskCountLoader {
    type Value = i64;
    type Error = Arc<sqlx::Error>;

    async fn load(&self, keys: &[i32]) -> Result<HashMap<i32, Self::Value>, Self::Error> {
        log::debug!("Batch counting tasks for {} users", keys.len());
        let counts = self
            .db
            .tasks()
            .count_by_owner(keys)
            .await
            .map_err(Arc::new)?;
        Ok(fill_missing(keys, counts))
    }
}

fn fill_missing(keys: &[i32], counts: Vec<(i32, i64)>) -> HashMap<i32, i64> {
    let mut by_owner: HashMap<i32, i64> = keys.iter().map(|key| (*key, 0)).collect();
    by_owner.extend(counts);
    by_owner
}

/// Adds per-request loaders to `request`.
pub fn attach(request: async_graphql::Request, db: &Database) -> async_graphql::Request {
    request
        .data(UserLoader::new(db.clone()))
        .data(TaskCountLoader::new(db.clone()))
}

pub(crate) fn loader_error(error: Arc<sqlx::Error>) -> AppError {
    AppError::DatabaseError(error.to_string())
}
