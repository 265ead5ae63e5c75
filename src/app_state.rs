use std::sync::Arc;

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{MongoTopicRepository, TopicRepository},
    services::{
        CompletionClient, ContentExtractor, HttpContentExtractor, OpenAiCompletionClient,
        PromptComposer, QuizPipeline, TopicService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub quiz_pipeline: Arc<QuizPipeline>,
    pub topic_service: Arc<TopicService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let topic_repository = Arc::new(MongoTopicRepository::new(&db, &config));
        topic_repository.ensure_indexes().await?;

        let extractor = Arc::new(HttpContentExtractor::from_config(&config)?);
        let completion = Arc::new(OpenAiCompletionClient::from_config(&config));

        Ok(Self::from_parts(config, extractor, completion, topic_repository))
    }

    /// Wires the services from already-built collaborators.
    pub fn from_parts(
        config: Config,
        extractor: Arc<dyn ContentExtractor>,
        completion: Arc<dyn CompletionClient>,
        topic_repository: Arc<dyn TopicRepository>,
    ) -> Self {
        let quiz_pipeline = Arc::new(QuizPipeline::new(
            extractor,
            PromptComposer::from_config(&config),
            completion,
        ));
        let topic_service = Arc::new(TopicService::new(topic_repository));

        Self {
            quiz_pipeline,
            topic_service,
            config: Arc::new(config),
        }
    }
}
