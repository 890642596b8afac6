use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::generation::pipeline::PipelineError;
use crate::render::RenderError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut retry_after = None;

        let (status, code, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Pipeline(err) => match err {
                PipelineError::InvalidInput(_) | PipelineError::Style(_) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                PipelineError::Completion(e) => {
                    tracing::error!("Completion error: {e}");
                    (
                        StatusCode::BAD_GATEWAY,
                        "COMPLETION_ERROR",
                        "The text-generation service failed".to_string(),
                    )
                }
                PipelineError::CompletionTimedOut => {
                    tracing::error!("Completion timed out");
                    (
                        StatusCode::GATEWAY_TIMEOUT,
                        "COMPLETION_TIMEOUT",
                        "The text-generation service did not answer in time".to_string(),
                    )
                }
                PipelineError::Render(RenderError::Busy { retry_after: after, .. }) => {
                    retry_after = Some(after.as_secs().max(1));
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "RENDER_BUSY",
                        "All document renderers are busy, retry later".to_string(),
                    )
                }
                PipelineError::Render(RenderError::TimedOut) => {
                    tracing::error!("Render timed out");
                    (
                        StatusCode::GATEWAY_TIMEOUT,
                        "RENDER_TIMEOUT",
                        "Document rendering did not finish in time".to_string(),
                    )
                }
                PipelineError::Render(e) => {
                    tracing::error!("Render error: {e}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "RENDER_ERROR",
                        "Document rendering failed".to_string(),
                    )
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}
