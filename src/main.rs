use taskgraph::graphql::{build_schema, SchemaOptions};
use taskgraph::server;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let (config, db) = server::prepare().await?;
    let schema = build_schema(db.clone(), SchemaOptions::from(&config));
    server::serve(config, db, schema).await
}
