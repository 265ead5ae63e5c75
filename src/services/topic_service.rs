use std::sync::Arc;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{
            topic::{quiz_to_records, records_to_quiz},
            Quiz,
        },
        dto::response::{CategoryMap, TopicSummaryDto},
    },
    repositories::TopicRepository,
};

pub struct TopicService {
    repository: Arc<dyn TopicRepository>,
}

impl TopicService {
    pub fn new(repository: Arc<dyn TopicRepository>) -> Self {
        Self { repository }
    }

    /// Persists a generated quiz and returns the new topic id.
    pub async fn save_quiz(&self, quiz: &Quiz) -> AppResult<String> {
        let (topic, questions) = quiz_to_records(quiz)?;
        let id = topic.id.clone();
        let count = questions.len();

        self.repository.insert_quiz(topic, questions).await?;
        log::info!("Saved topic '{}' ({}) with {} question(s)", quiz.topic, id, count);
        Ok(id)
    }

    pub async fn list_topics(&self) -> AppResult<Vec<TopicSummaryDto>> {
        let topics = self.repository.list_topics().await?;
        Ok(topics.into_iter().map(TopicSummaryDto::from).collect())
    }

    pub async fn get_topic(&self, id: &str) -> AppResult<Quiz> {
        let topic = self
            .repository
            .find_topic(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Topic with id '{}' not found", id)))?;
        let questions = self.repository.find_questions(id).await?;

        records_to_quiz(topic, questions)
    }

    pub async fn categories(&self) -> AppResult<CategoryMap> {
        let mut categories = CategoryMap::new();
        for topic in self.repository.list_topics().await? {
            categories
                .entry(topic.category)
                .or_default()
                .insert(topic.subcategory);
        }
        Ok(categories)
    }

    pub async fn health_check(&self) -> AppResult<()> {
        self.repository.ping().await
    }
}
