pub mod quiz;
pub mod topic;
pub use quiz::{
    Difficulty, GenerationParameters, OptionLetter, Question, Quiz, QuizSource, SourceDocument,
    SourceOrigin,
};
pub use topic::{parse_topic_id, QuestionRecord, TopicRecord};
