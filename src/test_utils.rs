use crate::models::domain::{OptionLetter, Question, Quiz};

#[cfg(test)]
pub mod fixtures {
    use super::*;

    /// A valid two-question quiz
    pub fn sample_quiz() -> Quiz {
        Quiz {
            topic: "Photosynthesis".to_string(),
            category: "Science & Nature".to_string(),
            subcategory: "Biology & Ecology".to_string(),
            questions: vec![
                Question {
                    text: "In photosynthesis, which gas do plants absorb from the air?".to_string(),
                    options: vec![
                        "a. Oxygen".to_string(),
                        "b. Carbon dioxide".to_string(),
                        "c. Nitrogen".to_string(),
                        "d. Helium".to_string(),
                    ],
                    right_option: OptionLetter::B,
                },
                Question {
                    text: "Where in the plant cell does photosynthesis take place?".to_string(),
                    options: vec![
                        "a. Nucleus".to_string(),
                        "b. Mitochondria".to_string(),
                        "c. Chloroplast".to_string(),
                        "d. Ribosome".to_string(),
                    ],
                    right_option: OptionLetter::C,
                },
            ],
        }
    }

    /// [`sample_quiz`] as the model would return it
    pub fn sample_quiz_json() -> String {
        serde_json::to_string_pretty(&sample_quiz()).unwrap()
    }

    pub fn quiz_titled(topic: &str, category: &str, subcategory: &str) -> Quiz {
        Quiz {
            topic: topic.to_string(),
            category: category.to_string(),
            subcategory: subcategory.to_string(),
            ..sample_quiz()
        }
    }
}

#[cfg(test)]
pub mod in_memory {
    use std::{
        collections::HashMap,
        sync::atomic::{AtomicBool, Ordering},
    };

    use async_trait::async_trait;
    use tokio::sync::RwLock;

    use crate::{
        errors::{AppError, AppResult},
        models::domain::{QuestionRecord, TopicRecord},
        repositories::TopicRepository,
    };

    /// Topic storage backed by maps, with switchable failures.
    #[derive(Default)]
    pub struct InMemoryTopicRepository {
        topics: RwLock<HashMap<String, TopicRecord>>,
        questions: RwLock<Vec<QuestionRecord>>,
        fail_question_insert: AtomicBool,
        offline: AtomicBool,
    }

    impl InMemoryTopicRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn fail_question_inserts(&self) {
            self.fail_question_insert.store(true, Ordering::SeqCst);
        }

        pub fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }

        pub async fn topic_count(&self) -> usize {
            self.topics.read().await.len()
        }

        pub async fn question_count(&self) -> usize {
            self.questions.read().await.len()
        }

        fn check_online(&self) -> AppResult<()> {
            if self.offline.load(Ordering::SeqCst) {
                return Err(AppError::DatabaseError("storage offline".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TopicRepository for InMemoryTopicRepository {
        async fn insert_quiz(
            &self,
            topic: TopicRecord,
            questions: Vec<QuestionRecord>,
        ) -> AppResult<()> {
            self.check_online()?;
            if self.fail_question_insert.load(Ordering::SeqCst) {
                return Err(AppError::DatabaseError(
                    "question insert failed".to_string(),
                ));
            }
            self.topics.write().await.insert(topic.id.clone(), topic);
            self.questions.write().await.extend(questions);
            Ok(())
        }

        async fn list_topics(&self) -> AppResult<Vec<TopicRecord>> {
            self.check_online()?;
            let mut topics: Vec<_> = self.topics.read().await.values().cloned().collect();
            topics.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(topics)
        }

        async fn find_topic(&self, id: &str) -> AppResult<Option<TopicRecord>> {
            self.check_online()?;
            Ok(self.topics.read().await.get(id).cloned())
        }

        async fn find_questions(&self, topic_id: &str) -> AppResult<Vec<QuestionRecord>> {
            self.check_online()?;
            Ok(self
                .questions
                .read()
                .await
                .iter()
                .filter(|q| q.topic_id == topic_id)
                .cloned()
                .collect())
        }

        async fn ping(&self) -> AppResult<()> {
            self.check_online()
        }
    }
}

#[cfg(test)]
pub mod test_helpers {
    use actix_web::http::StatusCode;

    /// Asserts that a status code represents an error (4xx or 5xx)
    pub fn assert_error_status(status: StatusCode) {
        assert!(
            status.is_client_error() || status.is_server_error(),
            "Expected error status, got: {}",
            status
        );
    }

    /// Asserts that a status code represents success (2xx)
    pub fn assert_success_status(status: StatusCode) {
        assert!(
            status.is_success(),
            "Expected success status, got: {}",
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;

    #[test]
    fn sample_quiz_has_four_options_per_question() {
        let quiz = sample_quiz();
        assert_eq!(quiz.topic, "Photosynthesis");
        assert!(quiz.questions.iter().all(|q| q.options.len() == 4));
    }

    #[test]
    fn sample_quiz_json_uses_wire_field_names() {
        let json = sample_quiz_json();
        assert!(json.contains("\"question\""));
        assert!(json.contains("\"right_option\": \"b\""));
    }
}
