use std::sync::Arc;

use actix_web::{post, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    middleware::get_request_id,
    models::dto::{
        request::{GenerateQuizRequest, PdfUploadParams},
        response::CreatedQuizResponse,
    },
};

fn request_id(req: &HttpRequest) -> String {
    get_request_id(req).unwrap_or_else(|| "-".to_string())
}

/// Generates a quiz from a web page without storing it.
#[post("/generate-quiz")]
pub async fn generate_quiz(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
    request: web::Json<GenerateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let (url, params) = request.into_inner().into_parts()?;
    log::info!("[{}] Quiz requested for {}", request_id(&req), url);

    let quiz = state
        .quiz_pipeline
        .generate_from_url(&url, &params)
        .await
        .inspect_err(|e| log::warn!("[{}] Quiz generation for {} failed: {}", request_id(&req), url, e))?;
    Ok(HttpResponse::Ok().json(quiz))
}

#[post("/api/quizzes/url")]
pub async fn create_quiz_from_url(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
    request: web::Json<GenerateQuizRequest>,
) -> Result<HttpResponse, AppError> {
    let (url, params) = request.into_inner().into_parts()?;
    log::info!("[{}] Stored quiz requested for {}", request_id(&req), url);

    let quiz = state
        .quiz_pipeline
        .generate_from_url(&url, &params)
        .await
        .inspect_err(|e| log::warn!("[{}] Quiz generation for {} failed: {}", request_id(&req), url, e))?;
    let id = state.topic_service.save_quiz(&quiz).await?;

    Ok(HttpResponse::Created().json(CreatedQuizResponse { id, quiz }))
}

/// Raw PDF bytes in the body, file name and parameters in the query string.
#[post("/api/quizzes/pdf")]
pub async fn create_quiz_from_pdf(
    req: HttpRequest,
    state: web::Data<Arc<AppState>>,
    query: web::Query<PdfUploadParams>,
    body: web::Bytes,
) -> Result<HttpResponse, AppError> {
    let (filename, params) = query.into_inner().into_parts()?;
    log::info!(
        "[{}] Stored quiz requested for upload '{}' ({} bytes)",
        request_id(&req),
        filename,
        body.len()
    );

    let quiz = state
        .quiz_pipeline
        .generate_from_pdf_upload(&filename, &body, &params)
        .await
        .inspect_err(|e| {
            log::warn!("[{}] Quiz generation for '{}' failed: {}", request_id(&req), filename, e)
        })?;
    let id = state.topic_service.save_quiz(&quiz).await?;

    Ok(HttpResponse::Created().json(CreatedQuizResponse { id, quiz }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        errors::UpstreamErrorKind,
        handlers::configure,
        models::domain::{QuizSource, SourceDocument, SourceOrigin},
        services::{
            completion_client::MockCompletionClient, content_extractor::MockContentExtractor,
        },
        test_utils::{
            fixtures::{sample_quiz, sample_quiz_json},
            in_memory::InMemoryTopicRepository,
            test_helpers::assert_error_status,
        },
    };
    use actix_web::{http::StatusCode, test, App};
    use serde_json::{json, Value};

    fn web_extractor() -> MockContentExtractor {
        let mut extractor = MockContentExtractor::new();
        extractor.expect_extract().returning(|source| match source {
            QuizSource::Web(urls) if urls[0].ends_with("/missing") => {
                Err(AppError::NotFound(format!("Page '{}' not found", urls[0])))
            }
            QuizSource::Web(_) => Ok(SourceDocument::new(
                "Plants make food from light.",
                "Plants",
                SourceOrigin::Web,
            )),
            QuizSource::Pdf(_) => Ok(SourceDocument::new(
                "Lecture notes on plants.",
                "notes.pdf",
                SourceOrigin::Pdf,
            )),
        });
        extractor
    }

    fn completion_returning(reply: Result<String, AppError>) -> MockCompletionClient {
        let mut completion = MockCompletionClient::new();
        completion
            .expect_complete()
            .returning(move |_| reply.clone());
        completion
    }

    fn state(
        extractor: MockContentExtractor,
        completion: MockCompletionClient,
        repo: Arc<InMemoryTopicRepository>,
    ) -> web::Data<Arc<AppState>> {
        web::Data::new(Arc::new(AppState::from_parts(
            Config::test_config(),
            Arc::new(extractor),
            Arc::new(completion),
            repo,
        )))
    }

    #[actix_web::test]
    async fn generate_quiz_returns_quiz_without_storing() {
        let repo = Arc::new(InMemoryTopicRepository::new());
        let app = test::init_service(
            App::new()
                .app_data(state(web_extractor(), completion_returning(Ok(sample_quiz_json())), repo.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate-quiz")
            .set_json(json!({ "url": "https://example.com/plants/", "numQuestions": 2, "difficulty": "easy" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, serde_json::to_value(sample_quiz()).unwrap());
        assert_eq!(repo.topic_count().await, 0);
    }

    #[actix_web::test]
    async fn invalid_difficulty_is_rejected_before_generation() {
        let mut extractor = MockContentExtractor::new();
        extractor.expect_extract().times(0);
        let mut completion = MockCompletionClient::new();
        completion.expect_complete().times(0);
        let app = test::init_service(
            App::new()
                .app_data(state(extractor, completion, Arc::new(InMemoryTopicRepository::new())))
                .configure(configure),
        )
        .await;

        for body in [
            json!({ "url": "https://example.com", "difficulty": "extreme" }),
            json!({ "url": "https://example.com", "num_questions": 0 }),
            json!({ "url": "ftp://example.com/file" }),
            json!({ "url": "not a url" }),
        ] {
            let req = test::TestRequest::post()
                .uri("/generate-quiz")
                .set_json(body)
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[actix_web::test]
    async fn malformed_json_body_is_bad_request() {
        let app = test::init_service(
            App::new()
                .app_data(state(
                    MockContentExtractor::new(),
                    MockCompletionClient::new(),
                    Arc::new(InMemoryTopicRepository::new()),
                ))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate-quiz")
            .insert_header(("content-type", "application/json"))
            .set_payload("{\"url\": ")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["kind"], "VALIDATION_ERROR");
    }

    #[actix_web::test]
    async fn missing_page_maps_to_not_found() {
        let app = test::init_service(
            App::new()
                .app_data(state(
                    web_extractor(),
                    MockCompletionClient::new(),
                    Arc::new(InMemoryTopicRepository::new()),
                ))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/generate-quiz")
            .set_json(json!({ "url": "https://example.com/missing" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn upstream_and_format_failures_are_generic() {
        for reply in [
            Err(AppError::upstream(UpstreamErrorKind::Transient, "overloaded")),
            Ok("no quiz today".to_string()),
        ] {
            let app = test::init_service(
                App::new()
                    .app_data(state(
                        web_extractor(),
                        completion_returning(reply),
                        Arc::new(InMemoryTopicRepository::new()),
                    ))
                    .configure(configure),
            )
            .await;

            let req = test::TestRequest::post()
                .uri("/generate-quiz")
                .set_json(json!({ "url": "https://example.com/plants" }))
                .to_request();
            let resp = test::call_service(&app, req).await;

            assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[actix_web::test]
    async fn url_quiz_is_stored_and_returned_with_id() {
        let repo = Arc::new(InMemoryTopicRepository::new());
        let app = test::init_service(
            App::new()
                .app_data(state(web_extractor(), completion_returning(Ok(sample_quiz_json())), repo.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/quizzes/url")
            .set_json(json!({ "url": "https://example.com/plants" }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["id"].as_str().is_some());
        assert_eq!(body["topic"], "Photosynthesis");
        assert_eq!(repo.topic_count().await, 1);
        assert_eq!(repo.question_count().await, 2);
    }

    #[actix_web::test]
    async fn pdf_upload_is_stored() {
        let repo = Arc::new(InMemoryTopicRepository::new());
        let app = test::init_service(
            App::new()
                .app_data(state(web_extractor(), completion_returning(Ok(sample_quiz_json())), repo.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/quizzes/pdf?filename=notes.pdf&num_questions=2&difficulty=hard")
            .set_payload("%PDF-1.4 fake")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::CREATED);
        assert_eq!(repo.topic_count().await, 1);
    }

    #[actix_web::test]
    async fn non_pdf_upload_is_bad_request() {
        let mut extractor = MockContentExtractor::new();
        extractor.expect_extract().times(0);
        let app = test::init_service(
            App::new()
                .app_data(state(
                    extractor,
                    MockCompletionClient::new(),
                    Arc::new(InMemoryTopicRepository::new()),
                ))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/quizzes/pdf?filename=notes.txt")
            .set_payload("plain text")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_error_status(resp.status());
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
