//! HTTP server shared by the three binaries.

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use async_graphql::{ObjectType, Schema, SubscriptionType};

use crate::config::Config;
use crate::db::Database;
use crate::error::AppError;
use crate::routes::{self, GraphqlSettings};

/// Loads `.env` and the configuration, connects to the database and runs pending
/// migrations.
pub async fn prepare() -> Result<(Config, Database), AppError> {
    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let db = Database::connect(&config).await?;
    db.migrate().await?;

    Ok((config, db))
}

/// Serves `schema` on `/graphql` until the server is stopped.
pub async fn serve<Q, M, S>(
    config: Config,
    db: Database,
    schema: Schema<Q, M, S>,
) -> std::io::Result<()>
where
    Q: ObjectType + 'static,
    M: ObjectType + 'static,
    S: SubscriptionType + 'static,
{
    let settings = GraphqlSettings {
        mask_errors: config.mask_errors,
    };
    let schema = web::Data::new(schema);
    let db = web::Data::new(db);
    let settings = web::Data::new(settings);

    log::info!("Starting server at {}", config.server_url());
    log::info!("GraphiQL available at {}/graphql", config.server_url());

    HttpServer::new(move || {
        App::new()
            .app_data(schema.clone())
            .app_data(db.clone())
            .app_data(settings.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .configure(routes::config::<Q, M, S>)
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}

impl From<AppError> for std::io::Error {
    fn from(error: AppError) -> Self {
        std::io::Error::new(std::io::ErrorKind::Other, error.to_string())
    }
}
