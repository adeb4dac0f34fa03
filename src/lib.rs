#![doc = "The `taskgraph` library crate."]
#![doc = ""]
#![doc = "GraphQL over a Postgres task tracker: users and the tasks they own. Three"]
#![doc = "binaries serve schemas of growing scope built from this crate: a plain user"]
#![doc = "listing, filter/ordering passthrough, and the full API with header-based"]
#![doc = "authorization, relations, batching, pagination and validated mutations."]

pub mod config;
pub mod db;
pub mod error;
pub mod graphql;
pub mod models;
pub mod routes;
pub mod server;

pub use crate::config::Config;
pub use crate::db::Database;
pub use crate::error::AppError;
