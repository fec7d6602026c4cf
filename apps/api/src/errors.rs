use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::export::ExportError;
use crate::form::FormError;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("No resume data found.")]
    MissingDocument,

    #[error("Stored resume data is malformed: {0}")]
    MalformedDocument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("An export is already in progress")]
    Busy,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<FormError> for AppError {
    fn from(e: FormError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::Malformed(inner) => AppError::MalformedDocument(inner.to_string()),
            other => AppError::Internal(other.into()),
        }
    }
}

impl From<ExportError> for AppError {
    fn from(e: ExportError) -> Self {
        match e {
            ExportError::Busy => AppError::Busy,
            other => AppError::Internal(other.into()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::MissingDocument => (
                StatusCode::NOT_FOUND,
                "MISSING_DOCUMENT",
                self.to_string(),
            ),
            AppError::MalformedDocument(msg) => {
                tracing::warn!("Malformed stored document: {msg}");
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "MALFORMED_DOCUMENT",
                    "Stored resume data could not be read.".to_string(),
                )
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Busy => (StatusCode::CONFLICT, "EXPORT_IN_PROGRESS", self.to_string()),
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut body = json!({
            "error": {
                "code": code,
                "message": message
            }
        });
        // Missing data offers a way back to the start of the flow.
        if matches!(self, AppError::MissingDocument | AppError::MalformedDocument(_)) {
            body["home"] = json!("/");
        }

        (status, Json(body)).into_response()
    }
}
