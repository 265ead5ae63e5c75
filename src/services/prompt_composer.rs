use std::fmt::Write as _;

use crate::{
    config::Config,
    constants::quiz_prompt::{
        EASY_INSTRUCTION, FORMAT_RULES, HARD_INSTRUCTION, JSON_EXAMPLE, JSON_ONLY_INSTRUCTION,
        MEDIUM_INSTRUCTION, QUIZ_TAXONOMY, TAXONOMY_INSTRUCTION, WEB_TAXONOMY_LEN,
    },
    models::domain::{Difficulty, GenerationParameters, SourceDocument, SourceOrigin},
};

const TRUNCATION_END: &str = "...";
const TRUNCATION_LEEWAY: usize = 5;

pub const DEFAULT_WEB_TEXT_LIMIT: usize = 4000;
pub const DEFAULT_PDF_TEXT_LIMIT: usize = 8000;

/// Renders the instruction text sent to the completion model.
#[derive(Debug, Clone, Copy)]
pub struct PromptComposer {
    web_text_limit: usize,
    pdf_text_limit: usize,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(DEFAULT_WEB_TEXT_LIMIT, DEFAULT_PDF_TEXT_LIMIT)
    }
}

impl PromptComposer {
    pub fn new(web_text_limit: usize, pdf_text_limit: usize) -> Self {
        Self {
            web_text_limit,
            pdf_text_limit,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.web_text_limit, config.pdf_text_limit)
    }

    pub fn compose(&self, doc: &SourceDocument, params: &GenerationParameters) -> String {
        let (header, taxonomy_len, limit) = match doc.origin {
            SourceOrigin::Web => (
                format!(
                    "Given the following text, create {} multiple choice quizzes in JSON format with {} difficulty level.",
                    params.num_questions, params.difficulty
                ),
                WEB_TAXONOMY_LEN,
                self.web_text_limit,
            ),
            SourceOrigin::Pdf => (
                format!(
                    "Given the following text extracted from a PDF document titled \"{}\", create {} multiple choice quizzes in JSON format with {} difficulty level.",
                    doc.label, params.num_questions, params.difficulty
                ),
                QUIZ_TAXONOMY.len(),
                self.pdf_text_limit,
            ),
        };

        let mut prompt = String::with_capacity(limit + 3000);
        let _ = write!(
            prompt,
            "{}\n\n{}\n\n{}\n\n{}\n\n{}\n{}\n\n{}\n\ntext:\n{}\n",
            header,
            difficulty_instruction(params.difficulty),
            FORMAT_RULES,
            TAXONOMY_INSTRUCTION,
            render_taxonomy(taxonomy_len),
            JSON_ONLY_INSTRUCTION,
            JSON_EXAMPLE,
            truncate_text(&doc.raw_text, limit),
        );
        prompt
    }
}

pub fn difficulty_instruction(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => EASY_INSTRUCTION,
        Difficulty::Medium => MEDIUM_INSTRUCTION,
        Difficulty::Hard => HARD_INSTRUCTION,
    }
}

fn render_taxonomy(len: usize) -> String {
    let mut out = String::new();
    for (number, (category, subcategories)) in QUIZ_TAXONOMY.iter().take(len).enumerate() {
        let _ = writeln!(out, "{}. {}", number + 1, category);
        for subcategory in subcategories.iter() {
            let _ = writeln!(out, "• {}", subcategory);
        }
        out.push('\n');
    }
    out
}

/// Shortens `text` to about `limit` characters on a word boundary.
///
/// Text at most `limit + 5` characters long is returned untouched. Longer text
/// is cut to `limit - 3` characters, trimmed back to the last space, and gets
/// a trailing `...`. Lengths are counted in chars.
pub fn truncate_text(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit + TRUNCATION_LEEWAY {
        return text.to_string();
    }

    let keep = limit.saturating_sub(TRUNCATION_END.len());
    let cut = text
        .char_indices()
        .nth(keep)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let head = &text[..cut];
    let head = match head.rfind(' ') {
        Some(space) if space > 0 => &head[..space],
        _ => head,
    };

    format!("{}{}", head, TRUNCATION_END)
}
