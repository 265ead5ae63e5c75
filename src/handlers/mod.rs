pub mod graphql_handler;
pub mod health_handler;
pub mod quiz_handler;
pub mod topic_handler;

use actix_web::{error::JsonPayloadError, error::QueryPayloadError, web, HttpRequest};

use crate::errors::AppError;

pub use graphql_handler::{graphiql, graphql};
pub use health_handler::{health_check, health_check_live, health_check_ready};
pub use quiz_handler::{create_quiz_from_pdf, create_quiz_from_url, generate_quiz};
pub use topic_handler::{get_topic, list_categories, list_topics};

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(format!("Invalid JSON body: {}", err)).into()
}

fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::ValidationError(format!("Invalid query string: {}", err)).into()
}

/// Registers the REST routes and their extractor settings.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(generate_quiz)
        .service(create_quiz_from_url)
        .service(create_quiz_from_pdf)
        .service(list_topics)
        .service(get_topic)
        .service(list_categories)
        .service(health_check)
        .service(health_check_live)
        .service(health_check_ready);
}
