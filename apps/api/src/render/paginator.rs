//! Splits one tall bitmap into fixed-size page windows.
//!
//! The whole image is scaled to the page width and drawn on every page; page
//! `i` shifts it up by `i * page_height` and the page clip shows only that
//! window. Page count is the ceiling of scaled height over page height.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Relative slack when deciding whether a fractional page remains.
const PAGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum PaginateError {
    #[error("cannot paginate an image of {width}x{height}")]
    EmptyImage { width: u32, height: u32 },

    #[error("invalid page size {width}x{height}")]
    InvalidPage { width: f64, height: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageFormat {
    #[default]
    A4,
    Letter,
}

impl PageFormat {
    /// Portrait size in PDF points.
    pub fn size(self) -> PageSize {
        match self {
            PageFormat::A4 => PageSize {
                width: 595.28,
                height: 841.89,
            },
            PageFormat::Letter => PageSize {
                width: 612.0,
                height: 792.0,
            },
        }
    }
}

impl FromStr for PageFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a4" => Ok(PageFormat::A4),
            "letter" | "us-letter" => Ok(PageFormat::Letter),
            other => Err(format!("unknown page format '{other}' (expected a4 or letter)")),
        }
    }
}

/// Page dimensions in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

/// One page window: where the scaled image's top edge sits relative to the
/// page's top edge (0 on the first page, negative after).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PagePlacement {
    pub index: usize,
    pub offset_y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pagination {
    pub page: PageSize,
    /// Image height after scaling to the page width, in points.
    pub scaled_height: f64,
    pub pages: Vec<PagePlacement>,
}

impl Pagination {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}

/// Number of pages needed for `scaled_height`. Heights within a relative
/// `1e-9` of an exact multiple count as that multiple.
pub fn page_count(scaled_height: f64, page_height: f64) -> usize {
    let ratio = scaled_height / page_height;
    let nearest = ratio.round();
    let pages = if (ratio - nearest).abs() <= PAGE_EPSILON * nearest.max(1.0) {
        nearest
    } else {
        ratio.ceil()
    };
    (pages as usize).max(1)
}

pub fn paginate(image_width: u32, image_height: u32, page: PageSize) -> Result<Pagination, PaginateError> {
    if image_width == 0 || image_height == 0 {
        return Err(PaginateError::EmptyImage {
            width: image_width,
            height: image_height,
        });
    }
    if !(page.width > 0.0 && page.height > 0.0 && page.width.is_finite() && page.height.is_finite()) {
        return Err(PaginateError::InvalidPage {
            width: page.width,
            height: page.height,
        });
    }

    let scaled_height = f64::from(image_height) * page.width / f64::from(image_width);
    let count = page_count(scaled_height, page.height);
    let pages = (0..count)
        .map(|index| PagePlacement {
            index,
            offset_y: -(index as f64) * page.height,
        })
        .collect();

    Ok(Pagination {
        page,
        scaled_height,
        pages,
    })
}
