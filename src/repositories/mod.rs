pub mod topic_repository;

pub use topic_repository::{MongoTopicRepository, TopicRepository};
