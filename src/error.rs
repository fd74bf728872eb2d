use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::models::ErrorBody;

/// Errors surfaced to HTTP callers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("model is not loaded")]
    ModelUnavailable,

    #[error("invalid request: {0}")]
    BadRequest(String),

    #[error("prediction failed: {0}")]
    Prediction(String),

    #[error("city directory is unavailable")]
    CitiesUnavailable,

    #[error("prediction worker failed: {0}")]
    Worker(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ModelUnavailable | ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadRequest(_) | ApiError::Prediction(_) => StatusCode::BAD_REQUEST,
            ApiError::CitiesUnavailable => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ErrorBody {
            error: self.to_string(),
        })
    }
}

/// Errors raised while loading startup state from disk.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("artifact manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to load model: {0}")]
    Model(#[source] anyhow::Error),

    #[error("invalid artifacts: {message}")]
    InvalidArtifacts { message: String },

    #[error("dataset is missing column `{column}`")]
    MissingColumn { column: String },
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;
