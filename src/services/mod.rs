pub mod completion_client;
pub mod content_extractor;
pub mod json_repair;
pub mod prompt_composer;
pub mod quiz_parser;
pub mod quiz_pipeline;
pub mod topic_service;

pub use completion_client::{CompletionClient, OpenAiCompletionClient};
pub use content_extractor::{ContentExtractor, HttpContentExtractor};
pub use prompt_composer::PromptComposer;
pub use quiz_pipeline::QuizPipeline;
pub use topic_service::TopicService;
