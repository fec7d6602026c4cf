use std::sync::Arc;

use crate::config::Config;
use crate::export::{ExportController, FsSink};
use crate::render::Rasterizer;
use crate::storage::{KeyValueStore, StorageBridge};
use crate::view::PreviewSurface;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// The single saved resume slot.
    pub bridge: StorageBridge,
    /// The live preview that exports are taken from.
    pub surface: Arc<PreviewSurface>,
    pub exporter: Arc<ExportController>,
    /// Also used directly for on-screen preview images.
    pub rasterizer: Arc<Rasterizer>,
}

impl AppState {
    pub fn new(config: Config, store: Arc<dyn KeyValueStore>, rasterizer: Rasterizer) -> AppState {
        let bridge = StorageBridge::new(store, config.storage_key.clone());
        let surface = Arc::new(PreviewSurface::new());
        let rasterizer = Arc::new(rasterizer);
        let exporter = Arc::new(ExportController::new(
            surface.clone(),
            rasterizer.clone(),
            Arc::new(FsSink::new(config.export_dir.clone())),
            config.page_format.size(),
            config.render_max_scale,
        ));
        AppState {
            config,
            bridge,
            surface,
            exporter,
            rasterizer,
        }
    }
}
