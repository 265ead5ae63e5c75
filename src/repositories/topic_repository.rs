use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    options::{FindOptions, IndexOptions},
    Collection, IndexModel,
};

use crate::{
    config::Config,
    db::Database,
    errors::AppResult,
    models::domain::{QuestionRecord, TopicRecord},
};

#[async_trait]
pub trait TopicRepository: Send + Sync {
    /// Stores a topic and its questions. Either both land or neither does.
    async fn insert_quiz(&self, topic: TopicRecord, questions: Vec<QuestionRecord>)
        -> AppResult<()>;
    async fn list_topics(&self) -> AppResult<Vec<TopicRecord>>;
    async fn find_topic(&self, id: &str) -> AppResult<Option<TopicRecord>>;
    async fn find_questions(&self, topic_id: &str) -> AppResult<Vec<QuestionRecord>>;
    async fn ping(&self) -> AppResult<()>;
}

pub struct MongoTopicRepository {
    db: Database,
    topics: Collection<TopicRecord>,
    questions: Collection<QuestionRecord>,
}

impl MongoTopicRepository {
    pub fn new(db: &Database, config: &Config) -> Self {
        Self {
            db: db.clone(),
            topics: db.get_collection(&config.topics_collection),
            questions: db.get_collection(&config.questions_collection),
        }
    }

    pub async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for topic and question collections");

        let id_unique = IndexOptions::builder()
            .unique(true)
            .name("id_unique".to_string())
            .build();
        self.topics
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(id_unique.clone())
                    .build(),
            )
            .await?;
        self.questions
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "id": 1 })
                    .options(id_unique)
                    .build(),
            )
            .await?;
        self.questions
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "topic_id": 1, "position": 1 })
                    .options(
                        IndexOptions::builder()
                            .name("topic_position".to_string())
                            .build(),
                    )
                    .build(),
            )
            .await?;

        log::info!("Successfully created indexes for topic and question collections");
        Ok(())
    }
}

#[async_trait]
impl TopicRepository for MongoTopicRepository {
    async fn insert_quiz(
        &self,
        topic: TopicRecord,
        questions: Vec<QuestionRecord>,
    ) -> AppResult<()> {
        self.topics.insert_one(&topic).await?;

        if questions.is_empty() {
            return Ok(());
        }
        if let Err(err) = self.questions.insert_many(&questions).await {
            log::error!(
                "Inserting questions for topic '{}' failed, removing topic: {}",
                topic.id,
                err
            );
            // partial question writes must go too
            self.questions
                .delete_many(doc! { "topic_id": &topic.id })
                .await?;
            self.topics.delete_one(doc! { "id": &topic.id }).await?;
            return Err(err.into());
        }

        Ok(())
    }

    async fn list_topics(&self) -> AppResult<Vec<TopicRecord>> {
        let options = FindOptions::builder()
            .sort(doc! { "created_at": -1 })
            .build();
        let cursor = self.topics.find(doc! {}).with_options(options).await?;
        let topics: Vec<TopicRecord> = cursor.try_collect().await?;
        Ok(topics)
    }

    async fn find_topic(&self, id: &str) -> AppResult<Option<TopicRecord>> {
        let topic = self.topics.find_one(doc! { "id": id }).await?;
        Ok(topic)
    }

    async fn find_questions(&self, topic_id: &str) -> AppResult<Vec<QuestionRecord>> {
        let options = FindOptions::builder().sort(doc! { "position": 1 }).build();
        let cursor = self
            .questions
            .find(doc! { "topic_id": topic_id })
            .with_options(options)
            .await?;
        let questions: Vec<QuestionRecord> = cursor.try_collect().await?;
        Ok(questions)
    }

    async fn ping(&self) -> AppResult<()> {
        self.db.health_check().await
    }
}
