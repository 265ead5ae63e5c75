use async_graphql::{
    Context, EmptyMutation, EmptySubscription, ErrorExtensions, Object, Result as GqlResult,
    Schema as GraphQLSchema, ID,
};

use crate::{
    app_state::AppState,
    models::{
        domain::{parse_topic_id, Quiz},
        dto::response::{category_groups, CategoryGroupDto, TopicSummaryDto},
    },
};

pub type Schema = GraphQLSchema<QueryRoot, EmptyMutation, EmptySubscription>;

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Every stored topic, newest first.
    async fn topics(&self, ctx: &Context<'_>) -> GqlResult<Vec<TopicSummaryDto>> {
        let state = ctx.data::<AppState>()?;
        state.topic_service.list_topics().await.map_err(|e| e.extend())
    }

    async fn topic(&self, ctx: &Context<'_>, id: ID) -> GqlResult<Quiz> {
        let state = ctx.data::<AppState>()?;
        let id = parse_topic_id(&id).map_err(|e| e.extend())?;
        state.topic_service.get_topic(&id).await.map_err(|e| e.extend())
    }

    /// Categories in use, each with its distinct subcategories.
    async fn categories(&self, ctx: &Context<'_>) -> GqlResult<Vec<CategoryGroupDto>> {
        let state = ctx.data::<AppState>()?;
        let categories = state
            .topic_service
            .categories()
            .await
            .map_err(|e| e.extend())?;
        Ok(category_groups(categories))
    }
}

pub fn create_schema(app_state: AppState) -> Schema {
    GraphQLSchema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(app_state)
        .finish()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::Config,
        services::{
            completion_client::MockCompletionClient, content_extractor::MockContentExtractor,
        },
        test_utils::{fixtures::sample_quiz, in_memory::InMemoryTopicRepository},
    };

    async fn seeded_schema() -> (Schema, String) {
        let state = AppState::from_parts(
            Config::test_config(),
            Arc::new(MockContentExtractor::new()),
            Arc::new(MockCompletionClient::new()),
            Arc::new(InMemoryTopicRepository::new()),
        );
        let id = state.topic_service.save_quiz(&sample_quiz()).await.unwrap();
        (create_schema(state), id)
    }

    #[actix_rt::test]
    async fn topics_query_lists_saved_topics() {
        let (schema, id) = seeded_schema().await;

        let response = schema.execute("{ topics { id topic category } }").await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        assert_eq!(data["topics"][0]["id"], id.as_str());
        assert_eq!(data["topics"][0]["topic"], "Photosynthesis");
    }

    #[actix_rt::test]
    async fn topic_query_returns_questions_in_order() {
        let (schema, id) = seeded_schema().await;

        let query = format!(
            "{{ topic(id: \"{}\") {{ topic questions {{ question options rightOption }} }} }}",
            id
        );
        let response = schema.execute(query.as_str()).await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);

        let data = response.data.into_json().unwrap();
        let questions = &data["topic"]["questions"];
        assert_eq!(questions.as_array().unwrap().len(), 2);
        assert_eq!(questions[0]["rightOption"], "B");
        assert_eq!(questions[1]["options"][2], "c. Chloroplast");
    }

    #[actix_rt::test]
    async fn malformed_topic_id_reports_validation_code() {
        let (schema, _) = seeded_schema().await;

        let response = schema.execute("{ topic(id: \"nope\") { topic } }").await;
        assert_eq!(response.errors.len(), 1);
        let extensions = response.errors[0].extensions.as_ref().unwrap();
        assert_eq!(
            extensions.get("code"),
            Some(&async_graphql::Value::from("VALIDATION_ERROR"))
        );
    }

    #[actix_rt::test]
    async fn categories_query_groups_subcategories() {
        let (schema, _) = seeded_schema().await;

        let response = schema
            .execute("{ categories { category subcategories } }")
            .await;
        let data = response.data.into_json().unwrap();

        assert_eq!(data["categories"][0]["category"], "Science & Nature");
        assert_eq!(data["categories"][0]["subcategories"][0], "Biology & Ecology");
    }
}
