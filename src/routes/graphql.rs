use actix_web::{web, HttpRequest, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql::{ObjectType, Schema, SubscriptionType};
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::db::Database;
use crate::error::{mask_internal_errors, AppError};
use crate::graphql::{loaders, RequestContext};

/// Per-server settings of the GraphQL endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphqlSettings {
    pub mask_errors: bool,
}

/// Executes a GraphQL request.
///
/// The caller's identity is read from the `x-user-id` / `x-is-admin` headers; a
/// malformed `x-user-id` is answered with `400 Bad Request` before anything executes.
pub async fn graphql<Q, M, S>(
    schema: web::Data<Schema<Q, M, S>>,
    db: web::Data<Database>,
    settings: web::Data<GraphqlSettings>,
    req: HttpRequest,
    gql: GraphQLRequest,
) -> Result<GraphQLResponse, AppError>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    let context = RequestContext::from_headers(req.headers())?;
    log::debug!(
        "GraphQL request (user: {:?}, admin: {})",
        context.user_id,
        context.is_admin
    );

    let request = loaders::attach(gql.into_inner().data(context), &db);
    let mut response = schema.execute(request).await;
    if settings.mask_errors {
        mask_internal_errors(&mut response);
    }
    Ok(response.into())
}

/// Serves the GraphiQL IDE.
pub async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}
