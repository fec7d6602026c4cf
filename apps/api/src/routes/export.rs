use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::export::ExportOutcome;
use crate::routes::preview::mount_stored;
use crate::state::AppState;

const OUTCOME_HEADER: HeaderName = HeaderName::from_static("x-export-outcome");

/// POST /api/v1/export
pub async fn handle_export(State(state): State<AppState>) -> Result<Response, AppError> {
    if state.exporter.is_busy() {
        return Err(AppError::Busy);
    }
    if !state.surface.is_mounted() {
        mount_stored(&state)?;
    }

    let outcome = state.exporter.export().await?;
    let label = HeaderValue::from_static(outcome.label());
    match outcome {
        ExportOutcome::Saved(file) => {
            let disposition = format!("attachment; filename=\"{}\"", file.file_name);
            let disposition = HeaderValue::from_str(&disposition)
                .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, HeaderValue::from_static("application/pdf")),
                    (header::CONTENT_DISPOSITION, disposition),
                    (OUTCOME_HEADER, label),
                ],
                file.bytes,
            )
                .into_response())
        }
        ExportOutcome::Skipped | ExportOutcome::Failed { .. } => {
            Ok((StatusCode::NO_CONTENT, [(OUTCOME_HEADER, label)]).into_response())
        }
    }
}

/// GET /api/v1/export/status
pub async fn handle_export_status(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "busy": state.exporter.is_busy(),
        "state": state.exporter.state(),
        "page_format": state.config.page_format,
    }))
}
