use std::collections::{BTreeMap, BTreeSet};

use async_graphql::SimpleObject;
use serde::Serialize;

use crate::models::domain::{Quiz, TopicRecord};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
pub struct TopicSummaryDto {
    pub id: String,
    pub topic: String,
    pub category: String,
    pub subcategory: String,
}

impl From<TopicRecord> for TopicSummaryDto {
    fn from(record: TopicRecord) -> Self {
        TopicSummaryDto {
            id: record.id,
            topic: record.topic,
            category: record.category,
            subcategory: record.subcategory,
        }
    }
}

/// A freshly generated quiz together with the id it was stored under.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedQuizResponse {
    pub id: String,
    #[serde(flatten)]
    pub quiz: Quiz,
}

pub type CategoryMap = BTreeMap<String, BTreeSet<String>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, SimpleObject)]
pub struct CategoryGroupDto {
    pub category: String,
    pub subcategories: Vec<String>,
}

pub fn category_groups(categories: CategoryMap) -> Vec<CategoryGroupDto> {
    categories
        .into_iter()
        .map(|(category, subcategories)| CategoryGroupDto {
            category,
            subcategories: subcategories.into_iter().collect(),
        })
        .collect()
}
