//! Database access layer.
//!
//! `Database` owns the connection pool and hands out one repository per table; the
//! repositories play the part of a typed ORM client (`find_many`, `find_unique`,
//! `create`, `update`, ...) for the GraphQL resolvers.

pub mod filters;
pub mod tasks;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use log::LevelFilter;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};

use crate::config::Config;
use crate::error::AppError;

pub use tasks::{Direction, KeysetPage, KeysetWindow, TaskCursor, TaskRepository};
pub use users::UserRepository;

const SLOW_STATEMENT_THRESHOLD: Duration = Duration::from_secs(1);

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connects using the URL and pool size from `config`.
    ///
    /// With `log_queries` on, every statement is logged at `Info` (the same way the
    /// client is configured to log queries); otherwise only at `Debug`.
    pub async fn connect(config: &Config) -> Result<Self, AppError> {
        let statement_level = if config.log_queries {
            LevelFilter::Info
        } else {
            LevelFilter::Debug
        };
        let options = PgConnectOptions::from_str(&config.database_url)?
            .log_statements(statement_level)
            .log_slow_statements(LevelFilter::Warn, SLOW_STATEMENT_THRESHOLD);

        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect_with(options)
            .await?;

        log::info!(
            "Connected to database (max {} connections)",
            config.database_max_connections
        );
        Ok(Self { pool })
    }

    /// Builds a pool that opens its first connection on first use.
    pub fn connect_lazy(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new().connect_lazy(database_url)?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations under `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        log::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn users(&self) -> UserRepository<'_> {
        UserRepository::new(&self.pool)
    }

    pub fn tasks(&self) -> TaskRepository<'_> {
        TaskRepository::new(&self.pool)
    }
}
