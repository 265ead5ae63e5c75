use std::{fmt, path::PathBuf, str::FromStr};

use async_graphql::{Enum, SimpleObject};
use serde::{Deserialize, Serialize};

use crate::errors::{AppError, AppResult};

pub const OPTIONS_PER_QUESTION: usize = 4;
pub const MAX_QUESTIONS: u32 = 50;
pub const DEFAULT_QUESTIONS: u32 = 5;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Quiz {
    pub topic: String,
    pub category: String,
    pub subcategory: String,
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, SimpleObject)]
pub struct Question {
    #[serde(rename = "question")]
    #[graphql(name = "question")]
    pub text: String,
    pub options: Vec<String>, // "a. ..." through "d. ..."
    pub right_option: OptionLetter,
}

impl Question {
    /// Whether the option `right_option` points at carries the same letter prefix.
    pub fn answer_label_matches(&self) -> bool {
        let prefix = format!("{}.", self.right_option);
        self.options
            .get(self.right_option.index())
            .is_some_and(|option| option.trim_start().starts_with(&prefix))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Enum, Copy)]
#[serde(rename_all = "lowercase")]
pub enum OptionLetter {
    A,
    B,
    C,
    D,
}

impl OptionLetter {
    pub const ALL: [OptionLetter; OPTIONS_PER_QUESTION] =
        [OptionLetter::A, OptionLetter::B, OptionLetter::C, OptionLetter::D];

    pub fn as_str(&self) -> &'static str {
        match self {
            OptionLetter::A => "a",
            OptionLetter::B => "b",
            OptionLetter::C => "c",
            OptionLetter::D => "d",
        }
    }

    /// Zero-based position of the option this letter labels.
    pub fn index(&self) -> usize {
        match self {
            OptionLetter::A => 0,
            OptionLetter::B => 1,
            OptionLetter::C => 2,
            OptionLetter::D => 3,
        }
    }

    /// Strict: only the bare lowercase letters are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|letter| letter.as_str() == value)
    }
}

impl fmt::Display for OptionLetter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize, Copy, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(AppError::ValidationError(format!(
                "difficulty must be one of easy, medium, hard (got '{}')",
                other
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Copy)]
pub struct GenerationParameters {
    pub num_questions: u32,
    pub difficulty: Difficulty,
}

impl GenerationParameters {
    pub fn new(num_questions: i64, difficulty: Difficulty) -> AppResult<Self> {
        if num_questions < 1 || num_questions > MAX_QUESTIONS as i64 {
            return Err(AppError::ValidationError(format!(
                "num_questions must be between 1 and {} (got {})",
                MAX_QUESTIONS, num_questions
            )));
        }

        Ok(Self {
            num_questions: num_questions as u32,
            difficulty,
        })
    }

    /// Builds parameters from optional raw request values, applying defaults.
    pub fn from_request(num_questions: Option<i64>, difficulty: Option<&str>) -> AppResult<Self> {
        let difficulty = match difficulty {
            Some(raw) => raw.parse()?,
            None => Difficulty::default(),
        };
        Self::new(
            num_questions.unwrap_or(DEFAULT_QUESTIONS as i64),
            difficulty,
        )
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Copy)]
pub enum SourceOrigin {
    Web,
    Pdf,
}

/// Where quiz material comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizSource {
    Web(Vec<String>),
    Pdf(PathBuf),
}

impl QuizSource {
    pub fn web(url: impl Into<String>) -> Self {
        QuizSource::Web(vec![url.into()])
    }
}

/// Extracted text ready for prompting. Built once per pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceDocument {
    pub raw_text: String,
    pub label: String,
    pub origin: SourceOrigin,
}

impl SourceDocument {
    pub fn new(raw_text: impl Into<String>, label: impl Into<String>, origin: SourceOrigin) -> Self {
        Self {
            raw_text: raw_text.into(),
            label: label.into(),
            origin,
        }
    }
}
