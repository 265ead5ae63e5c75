use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use quiz_maker_server::{
    app_state::AppState,
    config::Config,
    graphql::create_schema,
    handlers::{self, graphiql, graphql},
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env();
    config.validate_for_production();

    let bind_address = (config.web_server_host.clone(), config.web_server_port);
    let max_upload_bytes = config.max_upload_bytes;

    let app_state = AppState::new(config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let schema = create_schema(app_state.clone());
    let app_state = Arc::new(app_state);

    log::info!(
        "Starting HTTP server on {}:{}",
        bind_address.0,
        bind_address.1
    );
    log::info!(
        "GraphiQL playground: http://{}:{}/graphiql",
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::Data::new(schema.clone()))
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .wrap(RequestIdMiddleware)
            .wrap(Logger::new(
                "%a \"%r\" %s %b %T request_id=%{x-request-id}o",
            ))
            .wrap(Cors::permissive())
            .configure(handlers::configure)
            .service(graphql)
            .service(graphiql)
    })
    .bind(bind_address)?
    .run()
    .await
}
