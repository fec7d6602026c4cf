//! Static font-metric tables for the preview typefaces.
//!
//! Advance widths are in em units. They drive line wrapping when no TrueType
//! font is configured, and the greeked glyph painter sizes its glyph boxes
//! from the same numbers, so measurement and painting always agree.
//! Widths cover ASCII 0x20..=0x7E; index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

/// Bold runs are set this much wider than the regular table.
const BOLD_WIDTH_FACTOR: f32 = 1.06;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    /// Creative template: humanist sans-serif.
    Inter,
    /// Professional template: geometric sans-serif, about 5% wider than Inter.
    Lato,
    /// Simple template: traditional TeX serif.
    ComputerModern,
}

/// Per-family metrics. The three preview faces share one set of relative
/// advance widths and differ by a uniform scale.
pub struct FontMetricTable {
    width_scale: f32,
    /// Used for codepoints outside the table.
    pub average_char_width: f32,
    /// Cap height in em, used to size greeked glyph boxes.
    pub cap_height: f32,
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            BASE_WIDTHS[code - 32] * self.width_scale
        } else {
            self.average_char_width
        }
    }

    /// Width of `s` in em units.
    pub fn measure_em(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Width of `s` in pixels when set at `size_px`.
    pub fn measure_px(&self, s: &str, size_px: f32, bold: bool) -> f32 {
        let factor = if bold { BOLD_WIDTH_FACTOR } else { 1.0 };
        self.measure_em(s) * size_px * factor
    }
}

/// Returns the static metric table for a given font family.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::Inter => &INTER,
        FontFamily::Lato => &LATO,
        FontFamily::ComputerModern => &COMPUTER_MODERN,
    }
}

static INTER: FontMetricTable = FontMetricTable {
    width_scale: 1.0,
    average_char_width: 0.52,
    cap_height: 0.73,
};

static LATO: FontMetricTable = FontMetricTable {
    width_scale: 1.05,
    average_char_width: 0.55,
    cap_height: 0.72,
};

static COMPUTER_MODERN: FontMetricTable = FontMetricTable {
    width_scale: 0.9,
    average_char_width: 0.47,
    cap_height: 0.68,
};

// ────────────────────────────────────────────────────────────────────────────
// Relative advance widths, ASCII 0x20..=0x7E
// ────────────────────────────────────────────────────────────────────────────

#[rustfmt::skip]
static BASE_WIDTHS: [f32; 95] = [
    // space and punctuation, 0x20..=0x2F
    0.25, 0.30, 0.38, 0.56, 0.56, 0.89, 0.67, 0.22,
    0.33, 0.33, 0.39, 0.59, 0.28, 0.33, 0.28, 0.31,
    // digits
    0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56, 0.56,
    // 0x3A..=0x40
    0.28, 0.28, 0.59, 0.59, 0.59, 0.50, 1.02,
    // upper case
    0.67, 0.61, 0.61, 0.67, 0.56, 0.50, 0.67, 0.67, 0.25,
    0.39, 0.61, 0.53, 0.78, 0.67, 0.72, 0.56, 0.72, 0.61,
    0.50, 0.56, 0.67, 0.67, 0.89, 0.61, 0.61, 0.56,
    // 0x5B..=0x60
    0.28, 0.31, 0.28, 0.47, 0.56, 0.34,
    // lower case
    0.56, 0.56, 0.50, 0.56, 0.56, 0.31, 0.56, 0.56, 0.22,
    0.22, 0.53, 0.22, 0.83, 0.56, 0.56, 0.56, 0.56, 0.33,
    0.44, 0.39, 0.56, 0.50, 0.72, 0.50, 0.50, 0.44,
    // 0x7B..=0x7E
    0.33, 0.26, 0.33, 0.59,
];
