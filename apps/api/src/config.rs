use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::render::paginator::PageFormat;
use crate::render::rasterizer::DEFAULT_MAX_CANVAS_DIM;
use crate::storage::DEFAULT_STORAGE_KEY;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Directory of the file-backed store. Unset keeps documents in memory.
    pub storage_path: Option<PathBuf>,
    pub storage_key: String,
    pub export_dir: PathBuf,
    /// TrueType font for real glyphs. Unset paints metric greeking.
    pub font_path: Option<PathBuf>,
    pub render_max_scale: f32,
    pub render_max_canvas_dim: u32,
    pub page_format: PageFormat,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let render_max_scale = match var("RENDER_MAX_SCALE") {
            Some(v) => v
                .parse::<f32>()
                .ok()
                .filter(|s| s.is_finite() && *s >= 1.0)
                .with_context(|| format!("RENDER_MAX_SCALE must be a number >= 1, got '{v}'"))?,
            None => 4.0,
        };

        Ok(Config {
            port: var("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            storage_path: var("STORAGE_PATH").map(PathBuf::from),
            storage_key: var("STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string()),
            export_dir: PathBuf::from(var("EXPORT_DIR").unwrap_or_else(|| "exports".to_string())),
            font_path: var("FONT_PATH").map(PathBuf::from),
            render_max_scale,
            render_max_canvas_dim: match var("RENDER_MAX_CANVAS_DIM") {
                Some(v) => v
                    .parse::<u32>()
                    .ok()
                    .filter(|d| *d > 0)
                    .with_context(|| format!("RENDER_MAX_CANVAS_DIM must be a positive integer, got '{v}'"))?,
                None => DEFAULT_MAX_CANVAS_DIM,
            },
            page_format: match var("PAGE_FORMAT") {
                Some(v) => v.parse::<PageFormat>().map_err(anyhow::Error::msg)?,
                None => PageFormat::A4,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.rust_log, "info");
        assert!(cfg.storage_path.is_none());
        assert_eq!(cfg.storage_key, "resumeData");
        assert_eq!(cfg.export_dir, PathBuf::from("exports"));
        assert!(cfg.font_path.is_none());
        assert_eq!(cfg.render_max_scale, 4.0);
        assert_eq!(cfg.render_max_canvas_dim, 32_767);
        assert_eq!(cfg.page_format, PageFormat::A4);
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PORT", "9000"),
            ("STORAGE_PATH", "/var/lib/folio"),
            ("PAGE_FORMAT", "letter"),
            ("RENDER_MAX_SCALE", "2"),
            ("FONT_PATH", ""),
        ])
        .unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.storage_path, Some(PathBuf::from("/var/lib/folio")));
        assert_eq!(cfg.page_format, PageFormat::Letter);
        assert_eq!(cfg.render_max_scale, 2.0);
        assert!(cfg.font_path.is_none());
    }

    #[test]
    fn test_invalid_values_fail() {
        assert!(config(&[("PORT", "eighty")]).is_err());
        assert!(config(&[("RENDER_MAX_SCALE", "0.5")]).is_err());
        assert!(config(&[("PAGE_FORMAT", "tabloid")]).is_err());
        assert!(config(&[("RENDER_MAX_CANVAS_DIM", "0")]).is_err());
        assert!(config(&[("RENDER_MAX_CANVAS_DIM", "-4")]).is_err());
    }
}
