pub mod graphql;
pub mod health;

use actix_web::web;
use async_graphql::{ObjectType, SubscriptionType};

pub use graphql::GraphqlSettings;

/// Registers the health check and the GraphQL endpoint for a schema of type
/// `Schema<Q, M, S>`. The schema, the database and the `GraphqlSettings` are expected
/// as app data.
pub fn config<Q, M, S>(cfg: &mut web::ServiceConfig)
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    cfg.service(health::health).service(
        web::resource("/graphql")
            .route(web::post().to(graphql::graphql::<Q, M, S>))
            .route(web::get().to(graphql::graphiql)),
    );
}
