mod config;
mod errors;
mod export;
mod form;
mod layout;
mod models;
mod render;
mod routes;
mod state;
mod storage;
mod templates;
mod view;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::render::images::EmbeddedImageResolver;
use crate::render::text::TtfShaper;
use crate::render::Rasterizer;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Document slot: on disk when STORAGE_PATH is set, otherwise in memory
    let store: Arc<dyn KeyValueStore> = match &config.storage_path {
        Some(path) => {
            let store = FileStore::open(path)?;
            info!("File store at {}", store.dir().display());
            Arc::new(store)
        }
        None => {
            info!("In-memory store (documents are lost on restart)");
            Arc::new(MemoryStore::new())
        }
    };

    let mut rasterizer = Rasterizer::new(Arc::new(EmbeddedImageResolver), config.render_max_canvas_dim);
    if let Some(path) = &config.font_path {
        rasterizer = rasterizer.with_truetype(TtfShaper::load(path)?);
        info!("Text rendered with {}", path.display());
    }

    info!(
        "Export: {:?} pages, max scale {}, into {}",
        config.page_format,
        config.render_max_scale,
        config.export_dir.display()
    );

    let state = AppState::new(config.clone(), store, rasterizer);

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
