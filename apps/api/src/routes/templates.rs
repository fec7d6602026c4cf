use axum::{extract::Path, Json};

use crate::errors::AppError;
use crate::form::ResumeForm;
use crate::models::resume::ResumeDocument;
use crate::templates::{TemplateConfig, TemplateKind};

/// GET /api/v1/templates
pub async fn handle_list_templates() -> Json<Vec<&'static TemplateConfig>> {
    Json(TemplateKind::ALL.iter().map(|kind| kind.config()).collect())
}

/// GET /api/v1/templates/:kind/form
/// A blank draft with one empty row per section the template shows.
pub async fn handle_blank_form(Path(kind): Path<String>) -> Result<Json<ResumeDocument>, AppError> {
    let kind = TemplateKind::from_slug(&kind)
        .ok_or_else(|| AppError::NotFound(format!("Unknown template '{kind}'")))?;
    Ok(Json(ResumeForm::new(kind).draft().clone()))
}
