use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::form::{FormEdit, ResumeForm};
use crate::models::resume::ResumeDocument;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub document: ResumeDocument,
    /// Where the client goes next to see the rendered resume.
    pub preview_route: &'static str,
}

/// Saves a finished form. The mounted preview belongs to the replaced
/// document, so it is taken down; the next preview or export mounts the new one.
fn store(state: &AppState, form: ResumeForm) -> Result<Json<SubmitResponse>, AppError> {
    if state.exporter.is_busy() {
        return Err(AppError::Busy);
    }
    let document = form.submit()?;
    state.bridge.save(&document)?;
    state.surface.unmount();
    let preview_route = document.template_kind().config().preview_route;
    tracing::info!(template = ?document.template_kind(), "Resume submitted");
    Ok(Json(SubmitResponse {
        document,
        preview_route,
    }))
}

fn stored_form(state: &AppState) -> Result<ResumeForm, AppError> {
    let document = state.bridge.load()?.ok_or(AppError::MissingDocument)?;
    Ok(ResumeForm::from_draft(document))
}

/// POST /api/v1/resumes
pub async fn handle_submit(
    State(state): State<AppState>,
    Json(draft): Json<ResumeDocument>,
) -> Result<Json<SubmitResponse>, AppError> {
    store(&state, ResumeForm::from_draft(draft))
}

/// GET /api/v1/resumes/current
pub async fn handle_get_current(
    State(state): State<AppState>,
) -> Result<Json<ResumeDocument>, AppError> {
    let document = state.bridge.load()?.ok_or(AppError::MissingDocument)?;
    Ok(Json(document))
}

/// DELETE /api/v1/resumes/current
/// Empties the slot and takes down the mounted preview.
pub async fn handle_clear_current(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    if state.exporter.is_busy() {
        return Err(AppError::Busy);
    }
    state.bridge.clear()?;
    state.surface.unmount();
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/resumes/current
/// Applies field-level edits to the stored resume and stores the result.
pub async fn handle_edit_current(
    State(state): State<AppState>,
    Json(edits): Json<Vec<FormEdit>>,
) -> Result<Json<SubmitResponse>, AppError> {
    let mut form = stored_form(&state)?;
    for edit in edits {
        form.apply(edit)?;
    }
    store(&state, form)
}

/// PUT /api/v1/resumes/current/picture
/// Raw image body; the `Content-Type` header names its format.
pub async fn handle_upload_picture(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmitResponse>, AppError> {
    let mime = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream");
    let mut form = stored_form(&state)?;
    form.set_profile_picture(&body, mime)?;
    store(&state, form)
}
