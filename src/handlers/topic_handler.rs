use std::sync::Arc;

use actix_web::{get, web, HttpResponse};

use crate::{app_state::AppState, errors::AppError, models::domain::parse_topic_id};

#[get("/api/topics")]
pub async fn list_topics(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let topics = state.topic_service.list_topics().await?;
    Ok(HttpResponse::Ok().json(topics))
}

#[get("/api/topics/{id}")]
pub async fn get_topic(
    state: web::Data<Arc<AppState>>,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let id = parse_topic_id(&id)?;
    let quiz = state.topic_service.get_topic(&id).await?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[get("/api/categories")]
pub async fn list_categories(state: web::Data<Arc<AppState>>) -> Result<HttpResponse, AppError> {
    let categories = state.topic_service.categories().await?;
    Ok(HttpResponse::Ok().json(categories))
}
