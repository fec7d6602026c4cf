//! Export controller.
//!
//! One export runs at a time. `try_begin` moves the controller from `Idle` to
//! `Exporting` and hands out an `ExportTicket`; dropping the ticket moves it
//! back, so every exit path (success, skipped, error, panic in the render
//! task) leaves the controller idle.
//!
//! Pipeline: freeze the mounted preview, capture it, paginate the bitmap,
//! write the PDF, save it through the sink. The CPU-bound part runs on the
//! blocking pool. Everything after the freeze works from that one copy, so a
//! remount mid-export cannot mix two documents into one file.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::export::sink::ExportSink;
use crate::export::{export_file_name, ExportError};
use crate::render::paginator::{paginate, PageSize};
use crate::render::pdf::{write_pdf, PdfMeta};
use crate::render::rasterizer::{CapturePlan, Snapshotter};
use crate::view::surface::PreviewSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportState {
    Idle,
    Exporting,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExportedFile {
    pub id: Uuid,
    pub file_name: String,
    pub path: PathBuf,
    pub page_count: usize,
    pub size_bytes: usize,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub bytes: Bytes,
}

#[derive(Debug)]
pub enum ExportOutcome {
    Saved(ExportedFile),
    /// Nothing was mounted; no capture was attempted.
    Skipped,
    /// The pipeline failed. Already logged; no file was written.
    Failed { reason: String },
}

impl ExportOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            ExportOutcome::Saved(_) => "saved",
            ExportOutcome::Skipped => "skipped",
            ExportOutcome::Failed { .. } => "failed",
        }
    }
}

/// Proof that this caller owns the `Exporting` state.
pub struct ExportTicket {
    state: Arc<Mutex<ExportState>>,
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        *lock(&self.state) = ExportState::Idle;
    }
}

fn lock(state: &Mutex<ExportState>) -> MutexGuard<'_, ExportState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

pub struct ExportController {
    state: Arc<Mutex<ExportState>>,
    surface: Arc<PreviewSurface>,
    snapshotter: Arc<dyn Snapshotter>,
    sink: Arc<dyn ExportSink>,
    page: PageSize,
    max_scale: f32,
}

impl ExportController {
    pub fn new(
        surface: Arc<PreviewSurface>,
        snapshotter: Arc<dyn Snapshotter>,
        sink: Arc<dyn ExportSink>,
        page: PageSize,
        max_scale: f32,
    ) -> ExportController {
        ExportController {
            state: Arc::new(Mutex::new(ExportState::Idle)),
            surface,
            snapshotter,
            sink,
            page,
            max_scale,
        }
    }

    pub fn state(&self) -> ExportState {
        *lock(&self.state)
    }

    pub fn is_busy(&self) -> bool {
        self.state() == ExportState::Exporting
    }

    pub fn try_begin(&self) -> Result<ExportTicket, ExportError> {
        let mut state = lock(&self.state);
        if *state == ExportState::Exporting {
            return Err(ExportError::Busy);
        }
        *state = ExportState::Exporting;
        Ok(ExportTicket {
            state: self.state.clone(),
        })
    }

    /// Runs one export. Only `Busy` is returned as an error; pipeline
    /// failures are logged and reported as `ExportOutcome::Failed`.
    pub async fn export(&self) -> Result<ExportOutcome, ExportError> {
        let ticket = self.try_begin()?;
        let outcome = match self.run().await {
            Ok(Some(file)) => {
                tracing::info!(
                    file = %file.file_name,
                    pages = file.page_count,
                    bytes = file.size_bytes,
                    "Export saved"
                );
                ExportOutcome::Saved(file)
            }
            Ok(None) => {
                tracing::info!("Export skipped: no preview mounted");
                ExportOutcome::Skipped
            }
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                ExportOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        };
        drop(ticket);
        Ok(outcome)
    }

    async fn run(&self) -> Result<Option<ExportedFile>, ExportError> {
        let Some(frozen) = self.surface.with_mounted(|mounted| mounted.clone()) else {
            return Ok(None);
        };

        let plan = CapturePlan::for_template(frozen.template.config(), self.max_scale);
        let file_name = export_file_name(&frozen.document, frozen.template);
        let created_at = Utc::now();
        let meta = PdfMeta {
            title: file_name.trim_end_matches(".pdf").to_string(),
            created_at,
        };
        let surface = self.surface.clone();
        let snapshotter = self.snapshotter.clone();
        let page = self.page;

        let (pdf, page_count) = tokio::task::spawn_blocking(move || -> Result<(Vec<u8>, usize), ExportError> {
            let snapshot = snapshotter.capture(&surface, &frozen, &plan)?;
            tracing::debug!(
                css_width = snapshot.css_width,
                css_height = snapshot.css_height,
                mounted_at = %frozen.mounted_at,
                "Preview captured"
            );
            let pagination = paginate(snapshot.image.width(), snapshot.image.height(), page)?;
            let pdf = write_pdf(&snapshot.image, &pagination, &meta)?;
            Ok((pdf, pagination.page_count()))
        })
        .await
        .map_err(|e| ExportError::Task(format!("render task failed: {e}")))??;

        let bytes = Bytes::from(pdf);
        let path = self.sink.save(&file_name, bytes.clone()).await?;
        Ok(Some(ExportedFile {
            id: Uuid::new_v4(),
            file_name,
            path,
            page_count,
            size_bytes: bytes.len(),
            created_at,
            bytes,
        }))
    }
}
