use std::time::Duration;

use async_openai::{config::OpenAIConfig, error::OpenAIError, Client};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::{json, Value};

use crate::{
    config::Config,
    errors::{AppError, AppResult, UpstreamErrorKind},
};

/// Sends one prompt to a chat model and returns the raw reply text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

/// Sampling settings sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub timeout: Duration,
}

impl CompletionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm_model.clone(),
            max_tokens: config.llm_max_tokens,
            temperature: config.llm_temperature,
            top_p: config.llm_top_p,
            timeout: Duration::from_secs(config.llm_timeout_secs),
        }
    }
}

/// Chat completion against any OpenAI-compatible endpoint.
pub struct OpenAiCompletionClient {
    client: Client<OpenAIConfig>,
    settings: CompletionSettings,
}

impl OpenAiCompletionClient {
    pub fn new(api_base: &str, api_key: &str, settings: CompletionSettings) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_base(api_base)
            .with_api_key(api_key);

        Self {
            client: Client::with_config(openai_config),
            settings,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.llm_api_base,
            config.llm_api_key.expose_secret(),
            CompletionSettings::from_config(config),
        )
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.settings.model,
            "messages": [{ "role": "user", "content": prompt }],
            "max_tokens": self.settings.max_tokens,
            "temperature": self.settings.temperature,
            "top_p": self.settings.top_p,
            "stream": false,
        })
    }
}

#[async_trait]
impl CompletionClient for OpenAiCompletionClient {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        log::debug!(
            "Requesting completion from '{}' ({} prompt chars)",
            self.settings.model,
            prompt.chars().count()
        );

        let chat = self.client.chat();
        let request = chat.create_byot(self.request_body(prompt));
        let response: Value = tokio::time::timeout(self.settings.timeout, request)
            .await
            .map_err(|_| {
                AppError::upstream(
                    UpstreamErrorKind::Transient,
                    format!(
                        "Completion timed out after {}s",
                        self.settings.timeout.as_secs()
                    ),
                )
            })?
            .map_err(classify_openai_error)?;

        let content = first_choice_content(&response)?;
        log::info!(
            "Completion from '{}' returned {} chars",
            self.settings.model,
            content.chars().count()
        );
        Ok(content)
    }
}

const TRANSIENT_MARKERS: &[&str] = &[
    "rate_limit",
    "rate limit",
    "server_error",
    "internal_error",
    "overloaded",
    "service_unavailable",
    "unavailable",
    "timeout",
];

/// Splits provider failures into retryable and non-retryable ones.
///
/// Errors the provider reports are transient when their type or code names a
/// rate limit, server fault or overload. Failures that never produced a
/// provider reply (transport, decoding) count as transient too.
fn classify_openai_error(err: OpenAIError) -> AppError {
    match err {
        OpenAIError::ApiError(api) => {
            let descriptor = [api.r#type.as_deref(), api.code.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" ")
                .to_ascii_lowercase();
            let kind = if is_transient_descriptor(&descriptor) {
                UpstreamErrorKind::Transient
            } else {
                UpstreamErrorKind::Permanent
            };
            log::warn!("Completion provider rejected request ({}): {}", kind, api.message);
            AppError::upstream(kind, api.message)
        }
        other => {
            log::warn!("Completion request failed: {}", other);
            AppError::upstream(UpstreamErrorKind::Transient, other.to_string())
        }
    }
}

fn is_transient_descriptor(descriptor: &str) -> bool {
    TRANSIENT_MARKERS
        .iter()
        .any(|marker| descriptor.contains(marker))
}

/// Pulls `choices[0].message.content` out of a chat completion body.
fn first_choice_content(response: &Value) -> AppResult<String> {
    let choice = response
        .get("choices")
        .and_then(Value::as_array)
        .and_then(|choices| choices.first())
        .ok_or_else(|| {
            AppError::upstream(
                UpstreamErrorKind::Permanent,
                "Completion response contained no choices",
            )
        })?;

    choice
        .pointer("/message/content")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::upstream(
                UpstreamErrorKind::Permanent,
                "Completion choice has no message content",
            )
        })
}
