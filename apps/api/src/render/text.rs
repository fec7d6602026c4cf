//! Text measurement and painting.
//!
//! `MetricShaper` measures with the static metric tables and paints greeked
//! glyph boxes (each glyph a solid block of its advance width). It needs no
//! font files, so it is the default. `TtfShaper` loads a TrueType font from
//! `FONT_PATH` and rasterizes real glyph outlines with `rusttype`.

use std::path::Path;

use anyhow::{Context, Result};
use rusttype::{point, Font, Scale};

use crate::layout::font_metrics::{get_metrics, FontFamily, FontMetricTable};
use crate::render::canvas::Canvas;
use crate::view::style::TextStyle;

/// Baseline position inside a line box, as a fraction of the font size.
const ASCENT: f32 = 0.8;

pub trait TextShaper: Send + Sync {
    /// Advance width of `text` in CSS px.
    fn measure(&self, text: &str, size: f32, bold: bool) -> f32;

    /// Paints one already-wrapped line whose line box starts at (`x`, `top`).
    fn draw_line(&self, canvas: &mut Canvas, text: &str, x: f32, top: f32, style: &TextStyle);
}

fn baseline(top: f32, style: &TextStyle) -> f32 {
    let leading = (style.line_height - 1.0) * style.size / 2.0;
    top + leading + style.size * ASCENT
}

// ────────────────────────────────────────────────────────────────────────────
// Metric tables + greeked glyphs
// ────────────────────────────────────────────────────────────────────────────

pub struct MetricShaper {
    metrics: &'static FontMetricTable,
}

impl MetricShaper {
    pub fn new(font: FontFamily) -> MetricShaper {
        MetricShaper {
            metrics: get_metrics(font),
        }
    }
}

impl TextShaper for MetricShaper {
    fn measure(&self, text: &str, size: f32, bold: bool) -> f32 {
        self.metrics.measure_px(text, size, bold)
    }

    fn draw_line(&self, canvas: &mut Canvas, text: &str, x: f32, top: f32, style: &TextStyle) {
        let base = baseline(top, style);
        let cap = self.metrics.cap_height * style.size;
        let mut pen = x;

        for c in text.chars() {
            let advance = self.measure(c.encode_utf8(&mut [0u8; 4]), style.size, style.bold);
            if !c.is_whitespace() {
                let glyph_h = if c.is_lowercase() { cap * 0.72 } else { cap };
                let ink = if style.bold { 0.86 } else { 0.72 };
                canvas.fill_rect(
                    crate::layout::Rect {
                        x: pen + advance * (1.0 - ink) / 2.0,
                        y: base - glyph_h,
                        width: advance * ink,
                        height: glyph_h,
                    },
                    style.color,
                );
            }
            pen += advance;
        }

        if style.underline {
            canvas.fill_rect(
                crate::layout::Rect {
                    x,
                    y: base + style.size * 0.1,
                    width: pen - x,
                    height: (style.size * 0.06).max(1.0 / canvas.scale()),
                },
                style.color,
            );
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// TrueType
// ────────────────────────────────────────────────────────────────────────────

pub struct TtfShaper {
    font: Font<'static>,
}

impl TtfShaper {
    pub fn from_bytes(bytes: Vec<u8>) -> Option<TtfShaper> {
        Font::try_from_vec(bytes).map(|font| TtfShaper { font })
    }

    pub fn load(path: &Path) -> Result<TtfShaper> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read font file '{}'", path.display()))?;
        TtfShaper::from_bytes(bytes)
            .with_context(|| format!("'{}' is not a usable TrueType font", path.display()))
    }
}

impl TextShaper for TtfShaper {
    fn measure(&self, text: &str, size: f32, _bold: bool) -> f32 {
        let scale = Scale::uniform(size);
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    fn draw_line(&self, canvas: &mut Canvas, text: &str, x: f32, top: f32, style: &TextStyle) {
        let s = canvas.scale();
        let scale = Scale::uniform(style.size * s);
        let base = baseline(top, style) * s;
        let glyphs: Vec<_> = self.font.layout(text, scale, point(x * s, base)).collect();

        // Faux bold: paint every glyph a second time shifted by a fraction of a pixel.
        let passes: &[f32] = if style.bold { &[0.0, 0.6] } else { &[0.0] };
        for glyph in &glyphs {
            let Some(bb) = glyph.pixel_bounding_box() else {
                continue;
            };
            for &shift in passes {
                glyph.draw(|gx, gy, coverage| {
                    canvas.blend_device_pixel(
                        i64::from(bb.min.x) + i64::from(gx) + shift.round() as i64,
                        i64::from(bb.min.y) + i64::from(gy),
                        style.color,
                        coverage,
                    );
                });
            }
        }

        if style.underline {
            let width = self.measure(text, style.size, style.bold);
            canvas.fill_rect(
                crate::layout::Rect {
                    x,
                    y: baseline(top, style) + style.size * 0.1,
                    width,
                    height: (style.size * 0.06).max(1.0 / s),
                },
                style.color,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::style::Color;

    #[test]
    fn test_metric_shaper_measures_from_table() {
        let shaper = MetricShaper::new(FontFamily::Inter);
        // "Rust" = 2.00em
        assert!((shaper.measure("Rust", 10.0, false) - 20.0).abs() < 1e-3);
    }

    #[test]
    fn test_greeked_line_leaves_ink_inside_line_box() {
        let shaper = MetricShaper::new(FontFamily::Inter);
        let style = TextStyle::new(20.0, Color::BLACK);
        let mut canvas = Canvas::new(200, 40, 1.0, Color::WHITE);
        shaper.draw_line(&mut canvas, "Hello", 0.0, 0.0, &style);
        let image = canvas.into_image();

        let inked: Vec<(u32, u32)> = image
            .enumerate_pixels()
            .filter(|(_, _, p)| p.0 != [255, 255, 255, 255])
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!inked.is_empty());
        let width = shaper.measure("Hello", 20.0, false);
        assert!(inked.iter().all(|&(x, y)| (x as f32) < width && y < 28));
    }

    #[test]
    fn test_whitespace_paints_nothing() {
        let shaper = MetricShaper::new(FontFamily::Inter);
        let mut canvas = Canvas::new(50, 20, 1.0, Color::WHITE);
        shaper.draw_line(&mut canvas, "   ", 0.0, 0.0, &TextStyle::new(12.0, Color::BLACK));
        assert!(canvas.into_image().pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }

    #[test]
    fn test_invalid_font_bytes_are_rejected() {
        assert!(TtfShaper::from_bytes(b"not a font".to_vec()).is_none());
    }
}
