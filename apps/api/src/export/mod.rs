// Export pipeline: busy-state controller, file naming, and export sinks.

pub mod controller;
pub mod sink;

use thiserror::Error;

use crate::models::resume::ResumeDocument;
use crate::render::paginator::PaginateError;
use crate::render::pdf::PdfError;
use crate::render::rasterizer::RasterError;
use crate::templates::TemplateKind;

pub use controller::{ExportController, ExportOutcome};
pub use sink::FsSink;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("An export is already in progress")]
    Busy,

    #[error("Rasterization failed: {0}")]
    Raster(#[from] RasterError),

    #[error("Pagination failed: {0}")]
    Paginate(#[from] PaginateError),

    #[error("PDF generation failed: {0}")]
    Pdf(#[from] PdfError),

    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Task(String),
}

/// `<name>.pdf` from the resume's name, or the template's fallback label
/// when no name was given.
pub fn export_file_name(doc: &ResumeDocument, template: TemplateKind) -> String {
    let cleaned: String = doc
        .personal
        .name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = cleaned.trim_matches('.').trim();
    let stem = if stem.is_empty() {
        template.config().fallback_label
    } else {
        stem
    };
    format!("{stem}.pdf")
}
