//! GraphQL layer: request identity, guards, loaders, pagination and the three schemas.

pub mod auth;
pub mod basic;
pub mod context;
pub mod loaders;
pub mod mutation;
pub mod pagination;
pub mod passthrough;
pub mod query;
pub mod relations;
pub mod schema;

pub use context::RequestContext;
pub use schema::{
    build_basic_schema, build_passthrough_schema, build_schema, AppSchema, BasicSchema,
    PassthroughSchema, SchemaOptions,
};
