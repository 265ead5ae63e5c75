use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    errors::{AppError, AppResult},
    models::domain::quiz::{OptionLetter, Question, Quiz},
};

/// One stored quiz topic. Questions reference it through `topic_id`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct TopicRecord {
    pub id: String,
    pub topic: String,
    pub category: String,
    pub subcategory: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuestionRecord {
    pub id: String,
    pub topic_id: String,
    pub position: i32,
    pub question: String,
    pub options: String, // JSON-encoded list of the four option strings
    pub right_option: String,
}

impl TopicRecord {
    pub fn from_quiz(quiz: &Quiz) -> Self {
        TopicRecord {
            id: Uuid::new_v4().to_string(),
            topic: quiz.topic.clone(),
            category: quiz.category.clone(),
            subcategory: quiz.subcategory.clone(),
            created_at: Some(Utc::now()),
        }
    }
}

impl QuestionRecord {
    pub fn from_question(topic_id: &str, position: usize, question: &Question) -> AppResult<Self> {
        let options = serde_json::to_string(&question.options).map_err(|e| {
            AppError::InternalError(format!("Failed to serialize question options: {}", e))
        })?;

        Ok(QuestionRecord {
            id: Uuid::new_v4().to_string(),
            topic_id: topic_id.to_string(),
            position: position as i32,
            question: question.text.clone(),
            options,
            right_option: question.right_option.to_string(),
        })
    }

    pub fn to_question(&self) -> AppResult<Question> {
        let options: Vec<String> = serde_json::from_str(&self.options).map_err(|e| {
            AppError::InternalError(format!(
                "Stored options for question '{}' are corrupt: {}",
                self.id, e
            ))
        })?;
        let right_option = OptionLetter::parse(&self.right_option).ok_or_else(|| {
            AppError::InternalError(format!(
                "Stored right_option '{}' for question '{}' is not a/b/c/d",
                self.right_option, self.id
            ))
        })?;

        Ok(Question {
            text: self.question.clone(),
            options,
            right_option,
        })
    }
}

/// Topic ids are UUIDs; anything else is rejected before touching storage.
pub fn parse_topic_id(id: &str) -> AppResult<String> {
    Uuid::parse_str(id.trim())
        .map(|uuid| uuid.to_string())
        .map_err(|_| AppError::ValidationError(format!("Invalid topic id '{}'", id)))
}

/// Splits a validated quiz into the topic row and its ordered question rows.
pub fn quiz_to_records(quiz: &Quiz) -> AppResult<(TopicRecord, Vec<QuestionRecord>)> {
    let topic = TopicRecord::from_quiz(quiz);
    let questions = quiz
        .questions
        .iter()
        .enumerate()
        .map(|(position, question)| QuestionRecord::from_question(&topic.id, position, question))
        .collect::<AppResult<Vec<_>>>()?;

    Ok((topic, questions))
}

/// Rebuilds a quiz from stored rows; rows are put back into their original order.
pub fn records_to_quiz(topic: TopicRecord, mut questions: Vec<QuestionRecord>) -> AppResult<Quiz> {
    questions.sort_by_key(|q| q.position);

    Ok(Quiz {
        topic: topic.topic,
        category: topic.category,
        subcategory: topic.subcategory,
        questions: questions
            .iter()
            .map(QuestionRecord::to_question)
            .collect::<AppResult<Vec<_>>>()?,
    })
}
