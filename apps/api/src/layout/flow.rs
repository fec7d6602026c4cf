//! Block and row flow layout of a view tree.
//!
//! Stacks place children top to bottom; rows split their width between
//! fixed-width children and `flex` shares, then stretch auto-height
//! children to the tallest one (grid `align-items: stretch`). Text height
//! comes from wrapping with the active `TextShaper`.

use serde::Serialize;

use crate::layout::wrap::{wrap_text, WrappedLine};
use crate::render::text::TextShaper;
use crate::templates::A4_WIDTH_PX;
use crate::view::node::{NodeKind, ViewNode};
use crate::view::style::{Dimension, Overflow};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// A laid-out node. `rect` is the border box in CSS px relative to the root.
#[derive(Debug, Clone)]
pub struct LayoutBox<'a> {
    pub node: &'a ViewNode,
    pub rect: Rect,
    /// Height the content asks for, before fixed or minimum heights apply.
    pub natural_height: f32,
    pub lines: Vec<WrappedLine>,
    pub children: Vec<LayoutBox<'a>>,
}

impl LayoutBox<'_> {
    /// Height that ends up on a canvas when this box is captured: clipped boxes
    /// stop at their border box, visible overflow extends to the content.
    pub fn painted_height(&self) -> f32 {
        match self.node.style.overflow {
            Overflow::Hidden => self.rect.height,
            Overflow::Visible => self.rect.height.max(self.natural_height),
        }
    }
}

/// Lays out `root` at the origin. The root's own `position` is ignored, as a
/// capture always starts at the captured element.
pub fn layout_tree<'a>(root: &'a ViewNode, shaper: &dyn TextShaper) -> LayoutBox<'a> {
    let available = match root.style.width {
        Dimension::Px(w) => w,
        Dimension::Auto => A4_WIDTH_PX,
    };
    layout_node(root, 0.0, 0.0, available, shaper)
}

fn layout_node<'a>(
    node: &'a ViewNode,
    x: f32,
    y: f32,
    available: f32,
    shaper: &dyn TextShaper,
) -> LayoutBox<'a> {
    let style = &node.style;
    let width = match style.width {
        Dimension::Px(w) => w,
        Dimension::Auto => available,
    }
    .max(0.0);

    let border_left = style.border_left.map(|b| b.width).unwrap_or(0.0);
    let inner_x = x + style.padding.left + border_left;
    let inner_y = y + style.padding.top;
    let inner_w = (width - style.padding.horizontal() - border_left).max(0.0);

    let mut lines = Vec::new();
    let mut children = Vec::new();

    let content_height = match &node.kind {
        NodeKind::Stack(nodes) => {
            let mut cursor = inner_y;
            for (i, child) in nodes.iter().enumerate() {
                if i > 0 {
                    cursor += style.gap;
                }
                let laid = layout_node(child, inner_x, cursor, inner_w, shaper);
                cursor += laid.rect.height + child.style.margin_bottom;
                children.push(laid);
            }
            cursor - inner_y
        }
        NodeKind::Row(nodes) => {
            let widths = row_widths(nodes, inner_w, style.gap);
            let mut cursor = inner_x;
            for (child, w) in nodes.iter().zip(widths) {
                children.push(layout_node(child, cursor, inner_y, w, shaper));
                cursor += w + style.gap;
            }
            let tallest = children
                .iter()
                .map(|c| c.rect.height + c.node.style.margin_bottom)
                .fold(0.0_f32, f32::max);
            for child in children.iter_mut() {
                if child.node.style.height == Dimension::Auto {
                    child.rect.height = child.rect.height.max(tallest);
                }
            }
            tallest
        }
        NodeKind::Text { content, style: text } => {
            let content = if text.uppercase {
                content.to_uppercase()
            } else {
                content.clone()
            };
            lines = wrap_text(&content, inner_w, |s| {
                shaper.measure(s, text.size, text.bold)
            });
            lines.len() as f32 * text.size * text.line_height
        }
        NodeKind::Image { size, .. } => *size,
        NodeKind::Bar { thickness, .. } => *thickness,
    };

    let natural_height = style.padding.vertical() + content_height;
    let mut height = match style.height {
        Dimension::Px(h) => h,
        Dimension::Auto => natural_height,
    };
    if let Some(min) = style.min_height {
        height = height.max(min);
    }

    LayoutBox {
        node,
        rect: Rect {
            x,
            y,
            width,
            height,
        },
        natural_height,
        lines,
        children,
    }
}

fn row_widths(nodes: &[ViewNode], inner_w: f32, gap: f32) -> Vec<f32> {
    let gaps = gap * nodes.len().saturating_sub(1) as f32;
    let fixed: f32 = nodes
        .iter()
        .filter_map(|n| match n.style.width {
            Dimension::Px(w) => Some(w),
            Dimension::Auto => None,
        })
        .sum();
    let flex_total: f32 = nodes
        .iter()
        .filter(|n| n.style.width == Dimension::Auto)
        .map(|n| n.style.flex.max(0.0))
        .sum();
    let remaining = (inner_w - fixed - gaps).max(0.0);

    nodes
        .iter()
        .map(|n| match n.style.width {
            Dimension::Px(w) => w,
            Dimension::Auto if flex_total > 0.0 => remaining * n.style.flex.max(0.0) / flex_total,
            Dimension::Auto => 0.0,
        })
        .collect()
}
