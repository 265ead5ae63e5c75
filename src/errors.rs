use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use async_graphql::ErrorExtensions;
use serde::Serialize;
use thiserror::Error;

/// Whether a completion failure is worth retrying by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    Transient,
    Permanent,
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamErrorKind::Transient => write!(f, "transient"),
            UpstreamErrorKind::Permanent => write!(f, "permanent"),
        }
    }
}

/// Reasons a model response could not be turned into a quiz.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizFormatError {
    #[error("no JSON structure found")]
    NoJsonStructure,

    #[error("unrecoverable JSON: {0}")]
    UnrecoverableJson(String),

    #[error("response array is empty")]
    EmptyArray,

    #[error("expected a quiz object, found {0}")]
    NotAnObject(String),

    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}

impl QuizFormatError {
    pub fn step(&self) -> &'static str {
        match self {
            QuizFormatError::NoJsonStructure => "locate",
            QuizFormatError::UnrecoverableJson(_) => "repair",
            QuizFormatError::EmptyArray | QuizFormatError::NotAnObject(_) => "unwrap",
            QuizFormatError::InvalidField { .. } => "validate",
        }
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        QuizFormatError::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Fetch error: {0}")]
    FetchError(String),

    #[error("Conversion error: {0}")]
    ConversionError(String),

    #[error("Upstream error ({kind}): {message}")]
    UpstreamError {
        kind: UpstreamErrorKind,
        message: String,
    },

    #[error("Quiz format error at {step} step: {0}", step = .0.step())]
    QuizFormatError(#[from] QuizFormatError),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

/// The outward-facing failure buckets the HTTP layer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureCategory {
    NotFound,
    InvalidInput,
    Generic,
}

impl AppError {
    pub fn upstream(kind: UpstreamErrorKind, message: impl Into<String>) -> Self {
        AppError::UpstreamError {
            kind,
            message: message.into(),
        }
    }

    pub fn category(&self) -> FailureCategory {
        match self {
            AppError::NotFound(_) => FailureCategory::NotFound,
            AppError::ValidationError(_) => FailureCategory::InvalidInput,
            _ => FailureCategory::Generic,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::FetchError(_) => "FETCH_ERROR",
            AppError::ConversionError(_) => "CONVERSION_ERROR",
            AppError::UpstreamError {
                kind: UpstreamErrorKind::Transient,
                ..
            } => "UPSTREAM_TRANSIENT",
            AppError::UpstreamError {
                kind: UpstreamErrorKind::Permanent,
                ..
            } => "UPSTREAM_PERMANENT",
            AppError::QuizFormatError(_) => "QUIZ_FORMAT_ERROR",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    pub kind: &'static str,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self.category() {
            FailureCategory::NotFound => StatusCode::NOT_FOUND,
            FailureCategory::InvalidInput => StatusCode::BAD_REQUEST,
            FailureCategory::Generic => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
            kind: self.error_code(),
        })
    }
}
impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
impl From<async_graphql::Error> for AppError {
    fn from(err: async_graphql::Error) -> Self {
        AppError::InternalError(err.message)
    }
}
impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        async_graphql::Error::new(self.to_string()).extend_with(|_err, e| {
            e.set("code", self.error_code());
        })
    }
}

pub type AppResult<T> = Result<T, AppError>;
