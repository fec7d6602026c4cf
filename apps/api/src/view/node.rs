use serde::Serialize;

use crate::view::style::{Color, Style, TextStyle};

/// One node of a styled preview tree. A mounted root is what the rasterizer captures.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewNode {
    /// Stable name for the regions tests and callers look up.
    pub id: Option<String>,
    pub style: Style,
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum NodeKind {
    /// Children stacked top to bottom.
    Stack(Vec<ViewNode>),
    /// Children side by side; `Auto` widths share the remainder by `flex`.
    Row(Vec<ViewNode>),
    Text {
        content: String,
        style: TextStyle,
    },
    Image {
        source: String,
        size: f32,
        circular: bool,
        ring: Option<Color>,
    },
    /// Horizontal proportion bar (skill levels).
    Bar {
        fraction: f32,
        track: Color,
        fill: Color,
        thickness: f32,
    },
}

impl ViewNode {
    pub fn stack(children: Vec<ViewNode>) -> ViewNode {
        ViewNode {
            id: None,
            style: Style::default(),
            kind: NodeKind::Stack(children),
        }
    }

    pub fn row(children: Vec<ViewNode>) -> ViewNode {
        ViewNode {
            id: None,
            style: Style::default(),
            kind: NodeKind::Row(children),
        }
    }

    pub fn text(content: impl Into<String>, style: TextStyle) -> ViewNode {
        ViewNode {
            id: None,
            style: Style::default(),
            kind: NodeKind::Text {
                content: content.into(),
                style,
            },
        }
    }

    pub fn image(source: impl Into<String>, size: f32, circular: bool) -> ViewNode {
        ViewNode {
            id: None,
            style: Style::default(),
            kind: NodeKind::Image {
                source: source.into(),
                size,
                circular,
                ring: None,
            },
        }
    }

    pub fn bar(fraction: f32, track: Color, fill: Color, thickness: f32) -> ViewNode {
        ViewNode {
            id: None,
            style: Style::default(),
            kind: NodeKind::Bar {
                fraction: fraction.clamp(0.0, 1.0),
                track,
                fill,
                thickness,
            },
        }
    }

    /// Outlines an image node with a ring. No effect on other kinds.
    pub fn with_ring(mut self, color: Color) -> ViewNode {
        if let NodeKind::Image { ring, .. } = &mut self.kind {
            *ring = Some(color);
        }
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> ViewNode {
        self.id = Some(id.into());
        self
    }

    pub fn styled(mut self, f: impl FnOnce(&mut Style)) -> ViewNode {
        f(&mut self.style);
        self
    }

    pub fn children(&self) -> &[ViewNode] {
        match &self.kind {
            NodeKind::Stack(children) | NodeKind::Row(children) => children,
            _ => &[],
        }
    }

    /// Depth-first search by id.
    pub fn find(&self, id: &str) -> Option<&ViewNode> {
        if self.id.as_deref() == Some(id) {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }

    /// All text content in document order, for assertions and plain-text dumps.
    pub fn text_content(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            NodeKind::Text { content, .. } => out.push(content),
            NodeKind::Stack(children) | NodeKind::Row(children) => {
                for child in children {
                    child.collect_text(out);
                }
            }
            _ => {}
        }
    }
}
