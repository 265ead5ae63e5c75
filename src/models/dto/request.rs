use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::{
    errors::AppResult,
    models::domain::GenerationParameters,
};

fn validate_http_scheme(url: &str) -> Result<(), ValidationError> {
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::new("url_scheme")
            .with_message("url must use http or https".into()))
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GenerateQuizRequest {
    #[validate(url, custom(function = "validate_http_scheme"))]
    pub url: String,

    #[serde(default, alias = "numQuestions")]
    #[validate(range(min = 1, max = 50))]
    pub num_questions: Option<i64>,

    #[serde(default)]
    pub difficulty: Option<String>,
}

impl GenerateQuizRequest {
    /// Validates the request and returns the normalized URL with its parameters.
    pub fn into_parts(self) -> AppResult<(String, GenerationParameters)> {
        self.validate()?;
        let params =
            GenerationParameters::from_request(self.num_questions, self.difficulty.as_deref())?;
        let url = self.url.trim().trim_end_matches('/').to_string();
        Ok((url, params))
    }
}

/// Query string accompanying a raw PDF upload body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PdfUploadParams {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,

    #[serde(default, alias = "numQuestions")]
    #[validate(range(min = 1, max = 50))]
    pub num_questions: Option<i64>,

    #[serde(default)]
    pub difficulty: Option<String>,
}

impl PdfUploadParams {
    pub fn into_parts(self) -> AppResult<(String, GenerationParameters)> {
        self.validate()?;
        let params =
            GenerationParameters::from_request(self.num_questions, self.difficulty.as_deref())?;
        Ok((self.filename, params))
    }
}
