use std::{
    io::Cursor,
    path::Path,
    time::Duration,
};

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::{header::CONTENT_TYPE, StatusCode};
use scraper::{Html, Selector};

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{QuizSource, SourceDocument, SourceOrigin},
};

const HTML_WRAP_WIDTH: usize = 120;
const USER_AGENT: &str = concat!("quiz-maker-server/", env!("CARGO_PKG_VERSION"));

static EXCESS_NEWLINES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\n{3,}").expect("EXCESS_NEWLINES is a valid regex pattern")
});
static TRAILING_SPACES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)[ \t]+$").expect("TRAILING_SPACES is a valid regex pattern")
});

/// Turns a [`QuizSource`] into plain text ready for prompting.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, source: &QuizSource) -> AppResult<SourceDocument>;
}

pub struct HttpContentExtractor {
    client: reqwest::Client,
}

impl HttpContentExtractor {
    pub fn new(fetch_timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(fetch_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(Duration::from_secs(config.fetch_timeout_secs))
    }

    async fn fetch_page(&self, url: &str) -> AppResult<(String, String)> {
        log::debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::FetchError(format!("Failed to fetch '{}': {}", url, e)))?;

        if let Some(err) = status_error(url, response.status()) {
            return Err(err);
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("text/html")
            .to_ascii_lowercase();
        let kind = PageKind::from_content_type(&content_type).ok_or_else(|| {
            AppError::ConversionError(format!(
                "Unsupported content type '{}' at '{}'",
                content_type, url
            ))
        })?;

        let body = response
            .text()
            .await
            .map_err(|e| AppError::FetchError(format!("Failed to read body of '{}': {}", url, e)))?;

        let (text, title) = match kind {
            PageKind::Markup => (html_to_text(&body), page_title(&body)),
            PageKind::PlainText => (body, None),
        };
        let text = normalize_text(&text);
        if text.is_empty() {
            return Err(AppError::ConversionError(format!(
                "No readable text found at '{}'",
                url
            )));
        }

        log::info!("Extracted {} chars from {}", text.chars().count(), url);
        Ok((text, title.unwrap_or_else(|| url.to_string())))
    }

    async fn extract_web(&self, urls: &[String]) -> AppResult<SourceDocument> {
        if urls.is_empty() {
            return Err(AppError::ValidationError(
                "At least one URL is required".to_string(),
            ));
        }

        let mut texts = Vec::with_capacity(urls.len());
        let mut label = None;
        for url in urls {
            let (text, title) = self.fetch_page(url).await?;
            label.get_or_insert(title);
            texts.push(text);
        }

        Ok(SourceDocument::new(
            texts.join("\n\n"),
            label.unwrap_or_default(),
            SourceOrigin::Web,
        ))
    }

    async fn extract_pdf(&self, path: &Path) -> AppResult<SourceDocument> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                AppError::NotFound(format!("PDF file '{}' does not exist", path.display()))
            }
            _ => AppError::FetchError(format!("Failed to read '{}': {}", path.display(), e)),
        })?;

        let label = pdf_label(path);
        log::debug!("Decoding PDF '{}' ({} bytes)", label, bytes.len());

        let decoded = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&bytes))
            .await
            .map_err(|e| {
                AppError::ConversionError(format!("PDF decoder aborted on '{}': {}", label, e))
            })?
            .map_err(|e| AppError::ConversionError(format!("Failed to decode '{}': {}", label, e)))?;

        let text = normalize_text(&join_pdf_pages(&decoded));
        if text.is_empty() {
            return Err(AppError::ConversionError(format!(
                "PDF '{}' contains no extractable text",
                label
            )));
        }

        log::info!("Extracted {} chars from PDF '{}'", text.chars().count(), label);
        Ok(SourceDocument::new(text, label, SourceOrigin::Pdf))
    }
}

#[async_trait]
impl ContentExtractor for HttpContentExtractor {
    async fn extract(&self, source: &QuizSource) -> AppResult<SourceDocument> {
        match source {
            QuizSource::Web(urls) => self.extract_web(urls).await,
            QuizSource::Pdf(path) => self.extract_pdf(path).await,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PageKind {
    Markup,
    PlainText,
}

impl PageKind {
    fn from_content_type(content_type: &str) -> Option<Self> {
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        match mime {
            "text/html" | "application/xhtml+xml" | "text/xml" | "application/xml" => {
                Some(PageKind::Markup)
            }
            "text/plain" => Some(PageKind::PlainText),
            _ => None,
        }
    }
}

/// Maps an unsuccessful HTTP status to the matching error, `None` on success.
fn status_error(url: &str, status: StatusCode) -> Option<AppError> {
    if status.is_success() {
        return None;
    }
    Some(match status {
        StatusCode::NOT_FOUND | StatusCode::GONE => {
            AppError::NotFound(format!("Page '{}' not found ({})", url, status))
        }
        _ => AppError::FetchError(format!("Fetching '{}' returned {}", url, status)),
    })
}

fn html_to_text(html: &str) -> String {
    html2text::from_read(Cursor::new(html.as_bytes()), HTML_WRAP_WIDTH)
}

fn page_title(html: &str) -> Option<String> {
    let selector = Selector::parse("title").ok()?;
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|title| !title.is_empty())
}

/// Pages come back separated by form feeds.
fn join_pdf_pages(decoded: &str) -> String {
    decoded
        .split('\x0C')
        .map(str::trim)
        .filter(|page| !page.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn pdf_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn normalize_text(text: &str) -> String {
    let text = TRAILING_SPACES.replace_all(text, "");
    EXCESS_NEWLINES.replace_all(&text, "\n\n").trim().to_string()
}
