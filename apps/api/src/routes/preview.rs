use std::io::Cursor;
use std::sync::Arc;

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use image::ImageOutputFormat;
use serde::Serialize;

use crate::errors::AppError;
use crate::models::resume::ResumeDocument;
use crate::state::AppState;
use crate::templates::TemplateKind;
use crate::view::style::Color;

#[derive(Serialize)]
pub struct ContentSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Serialize)]
pub struct PreviewResponse {
    pub document: ResumeDocument,
    pub template: TemplateKind,
    pub content_size: ContentSize,
    pub mounted_at: DateTime<Utc>,
}

/// Reads the stored document once and mounts its preview. Refused while an
/// export holds the preview.
pub(crate) fn mount_stored(state: &AppState) -> Result<TemplateKind, AppError> {
    if state.exporter.is_busy() {
        return Err(AppError::Busy);
    }
    let document = state.bridge.load()?.ok_or(AppError::MissingDocument)?;
    Ok(state.surface.mount(Arc::new(document)))
}

/// GET /api/v1/preview
pub async fn handle_preview(State(state): State<AppState>) -> Result<Json<PreviewResponse>, AppError> {
    let template = mount_stored(&state)?;
    let (document, root, mounted_at) = state
        .surface
        .with_mounted(|m| (m.document.as_ref().clone(), m.root.clone(), m.mounted_at))
        .ok_or(AppError::MissingDocument)?;
    let (width, height) = state.rasterizer.content_size(&root, template.config().font);
    Ok(Json(PreviewResponse {
        document,
        template,
        content_size: ContentSize { width, height },
        mounted_at,
    }))
}

/// GET /api/v1/preview/image
/// PNG of the mounted preview as it is displayed on screen.
pub async fn handle_preview_image(State(state): State<AppState>) -> Result<Response, AppError> {
    if !state.surface.is_mounted() {
        mount_stored(&state)?;
    }
    let (root, template) = state
        .surface
        .with_mounted(|m| (m.root.clone(), m.template))
        .ok_or(AppError::MissingDocument)?;
    let rasterizer = state.rasterizer.clone();

    let png = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, AppError> {
        let snapshot = rasterizer
            .rasterize(&root, template.config().font, 1.0, Color::WHITE)
            .map_err(|e| AppError::Internal(anyhow!(e)))?;
        let mut buf = Cursor::new(Vec::new());
        snapshot
            .image
            .write_to(&mut buf, ImageOutputFormat::Png)
            .map_err(|e| AppError::Internal(anyhow!("PNG encoding failed: {e}")))?;
        Ok(buf.into_inner())
    })
    .await
    .map_err(|e| AppError::Internal(anyhow!("Preview task panicked: {e}")))??;

    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
