//! Error types for the gateway.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::store::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Prompt is required")]
    EmptyPrompt,

    #[error("Generation timed out after {0} seconds")]
    Timeout(u64),

    #[error("Pipeline not available: {0}")]
    PipelineUnavailable(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Prompt not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl From<StoreError> for Error {
    fn from(e: StoreError) -> Self {
        Error::Storage(e.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::EmptyPrompt => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Timeout(_)
            | Error::PipelineUnavailable(_)
            | Error::Inference(_)
            | Error::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (Error::EmptyPrompt, StatusCode::BAD_REQUEST),
            (Error::Timeout(60), StatusCode::INTERNAL_SERVER_ERROR),
            (
                Error::PipelineUnavailable("offline".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::Inference("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                Error::NotFound("abc".to_string()),
                StatusCode::NOT_FOUND,
            ),
            (
                Error::Storage("disk full".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_timeout_message_names_the_bound() {
        assert_eq!(
            Error::Timeout(60).to_string(),
            "Generation timed out after 60 seconds"
        );
    }
}
