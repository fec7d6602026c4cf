//! Image sources referenced by view nodes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::RgbaImage;

pub trait ImageResolver: Send + Sync {
    /// Decodes `source` for painting. `None` means the image is left out of
    /// the capture; the rest of the tree still renders.
    fn resolve(&self, source: &str) -> Option<RgbaImage>;
}

/// Resolves inline `data:` URIs only. Remote references have no network path
/// here and are omitted.
#[derive(Debug, Default, Clone, Copy)]
pub struct EmbeddedImageResolver;

impl ImageResolver for EmbeddedImageResolver {
    fn resolve(&self, source: &str) -> Option<RgbaImage> {
        let source = source.trim();
        if source.is_empty() {
            return None;
        }
        let Some(payload) = data_uri_payload(source) else {
            tracing::warn!(source = %truncate(source), "Skipping non-embedded image");
            return None;
        };
        let bytes = match STANDARD.decode(payload) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "Embedded image is not valid base64");
                return None;
            }
        };
        match image::load_from_memory(&bytes) {
            Ok(img) => Some(img.to_rgba8()),
            Err(e) => {
                tracing::warn!(error = %e, "Embedded image could not be decoded");
                None
            }
        }
    }
}

/// Base64 payload of a `data:<mime>;base64,<payload>` URI.
fn data_uri_payload(source: &str) -> Option<&str> {
    let rest = source.strip_prefix("data:")?;
    let (header, payload) = rest.split_once(',')?;
    header.ends_with(";base64").then_some(payload)
}

/// Builds a `data:` URI from raw image bytes.
pub fn to_data_uri(bytes: &[u8], mime: &str) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

fn truncate(s: &str) -> &str {
    match s.char_indices().nth(64) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
