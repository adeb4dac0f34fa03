//! Schemas for the three servers.

use async_graphql::extensions::Logger;
use async_graphql::{
    EmptyMutation, EmptySubscription, ObjectType, Schema, SchemaBuilder, SubscriptionType,
};

use super::basic::BasicQuery;
use super::mutation::MutationRoot;
use super::passthrough::PassthroughQuery;
use super::query::QueryRoot;
use crate::config::Config;
use crate::db::Database;

pub type BasicSchema = Schema<BasicQuery, EmptyMutation, EmptySubscription>;
pub type PassthroughSchema = Schema<PassthroughQuery, EmptyMutation, EmptySubscription>;
pub type AppSchema = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Query limits applied to every schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaOptions {
    pub depth_limit: Option<usize>,
    pub complexity_limit: Option<usize>,
}

impl From<&Config> for SchemaOptions {
    fn from(config: &Config) -> Self {
        Self {
            depth_limit: config.depth_limit,
            complexity_limit: config.complexity_limit,
        }
    }
}

pub fn build_basic_schema(db: Database, options: SchemaOptions) -> BasicSchema {
    finish(
        Schema::build(BasicQuery, EmptyMutation, EmptySubscription),
        db,
        options,
    )
}

pub fn build_passthrough_schema(db: Database, options: SchemaOptions) -> PassthroughSchema {
    finish(
        Schema::build(PassthroughQuery, EmptyMutation, EmptySubscription),
        db,
        options,
    )
}

pub fn build_schema(db: Database, options: SchemaOptions) -> AppSchema {
    finish(
        Schema::build(QueryRoot, MutationRoot, EmptySubscription),
        db,
        options,
    )
}

fn finish<Q, M, S>(
    builder: SchemaBuilder<Q, M, S>,
    db: Database,
    options: SchemaOptions,
) -> Schema<Q, M, S>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    let mut builder = builder.data(db).extension(Logger);
    if let Some(depth) = options.depth_limit {
        builder = builder.limit_depth(depth);
    }
    if let Some(complexity) = options.complexity_limit {
        builder = builder.limit_complexity(complexity);
    }
    builder.finish()
}
