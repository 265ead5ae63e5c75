use std::{path::Path, sync::Arc};

use crate::{
    errors::{AppError, AppResult},
    models::domain::{GenerationParameters, Quiz, QuizSource},
    services::{
        completion_client::CompletionClient, content_extractor::ContentExtractor,
        prompt_composer::PromptComposer, quiz_parser::parse_quiz,
    },
};

/// Extract, compose, complete, parse. One run per request, no shared state.
pub struct QuizPipeline {
    extractor: Arc<dyn ContentExtractor>,
    composer: PromptComposer,
    completion: Arc<dyn CompletionClient>,
}

impl QuizPipeline {
    pub fn new(
        extractor: Arc<dyn ContentExtractor>,
        composer: PromptComposer,
        completion: Arc<dyn CompletionClient>,
    ) -> Self {
        Self {
            extractor,
            composer,
            completion,
        }
    }

    pub async fn generate_from_url(
        &self,
        url: &str,
        params: &GenerationParameters,
    ) -> AppResult<Quiz> {
        self.run(QuizSource::web(url), params).await
    }

    pub async fn generate_from_pdf(
        &self,
        path: &Path,
        params: &GenerationParameters,
    ) -> AppResult<Quiz> {
        self.run(QuizSource::Pdf(path.to_path_buf()), params).await
    }

    /// Generates from uploaded PDF bytes.
    ///
    /// The bytes are written to a private temporary directory that is removed
    /// when this future completes or is dropped.
    pub async fn generate_from_pdf_upload(
        &self,
        filename: &str,
        bytes: &[u8],
        params: &GenerationParameters,
    ) -> AppResult<Quiz> {
        let file_name = sanitize_upload_name(filename)?;
        if bytes.is_empty() {
            return Err(AppError::ValidationError(format!(
                "Uploaded file '{}' is empty",
                file_name
            )));
        }

        let upload_dir = tempfile::Builder::new()
            .prefix("quiz-upload-")
            .tempdir()
            .map_err(|e| AppError::InternalError(format!("Failed to create upload dir: {}", e)))?;
        let path = upload_dir.path().join(&file_name);
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| AppError::InternalError(format!("Failed to store upload: {}", e)))?;
        log::debug!(
            "Stored upload '{}' ({} bytes) at {}",
            file_name,
            bytes.len(),
            path.display()
        );

        let result = self.generate_from_pdf(&path, params).await;
        if let Err(e) = upload_dir.close() {
            log::warn!("Failed to remove upload dir for '{}': {}", file_name, e);
        }
        result
    }

    async fn run(&self, source: QuizSource, params: &GenerationParameters) -> AppResult<Quiz> {
        let document = self.extractor.extract(&source).await?;
        log::info!(
            "Generating {} {} question(s) from {:?} source '{}'",
            params.num_questions,
            params.difficulty,
            document.origin,
            document.label
        );

        let prompt = self.composer.compose(&document, params);
        let reply = self.completion.complete(&prompt).await?;

        let quiz = parse_quiz(&reply).map_err(|e| {
            log::warn!("Model reply for '{}' rejected: {}", document.label, e);
            AppError::from(e)
        })?;
        if quiz.questions.len() != params.num_questions as usize {
            log::info!(
                "Model returned {} question(s) for '{}', {} requested",
                quiz.questions.len(),
                document.label,
                params.num_questions
            );
        }
        Ok(quiz)
    }
}

/// Keeps only the final path component and requires a `.pdf` extension.
fn sanitize_upload_name(filename: &str) -> AppResult<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if base.is_empty() || base == "." || base == ".." {
        return Err(AppError::ValidationError(
            "A file name is required".to_string(),
        ));
    }
    if !base.to_ascii_lowercase().ends_with(".pdf") {
        return Err(AppError::ValidationError(format!(
            "Only PDF files are supported, got '{}'",
            base
        )));
    }
    Ok(base.to_string())
}
