//! Inline style properties carried by every view node.
//!
//! Units are CSS pixels at 96 DPI. Only the properties the preview templates
//! and the export geometry actually touch are modelled.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color(pub u8, pub u8, pub u8);

impl Color {
    pub const WHITE: Color = Color(0xff, 0xff, 0xff);
    pub const BLACK: Color = Color(0x00, 0x00, 0x00);

    /// Parses `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> Option<Color> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn to_rgba(self) -> image::Rgba<u8> {
        image::Rgba([self.0, self.1, self.2, 0xff])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Dimension {
    #[default]
    Auto,
    Px(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

/// Drop shadow painted below and around the box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Shadow {
    pub spread: f32,
    pub offset_y: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Transform {
    #[default]
    None,
    Scale(f32),
}

impl Transform {
    pub fn factor(self) -> f32 {
        match self {
            Transform::None => 1.0,
            Transform::Scale(s) => s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Position {
    #[default]
    Static,
    /// Detached from flow at a fixed offset; used to park export clones off-screen.
    Absolute { left: f32, top: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const fn all(v: f32) -> Edges {
        Edges { top: v, right: v, bottom: v, left: v }
    }

    pub const fn symmetric(vertical: f32, horizontal: f32) -> Edges {
        Edges {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f32 {
        self.top + self.bottom
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub width: Dimension,
    pub height: Dimension,
    pub min_height: Option<f32>,
    pub padding: Edges,
    /// Vertical space between stacked children, or horizontal space in a row.
    pub gap: f32,
    pub margin_bottom: f32,
    /// Share of the remaining row width when `width` is `Auto`.
    pub flex: f32,
    pub background: Option<Color>,
    pub overflow: Overflow,
    pub box_shadow: Option<Shadow>,
    pub border_radius: f32,
    pub transform: Transform,
    pub position: Position,
    pub border_left: Option<Border>,
    pub border_bottom: Option<Border>,
}

impl Default for Style {
    fn default() -> Self {
        Style {
            width: Dimension::Auto,
            height: Dimension::Auto,
            min_height: None,
            padding: Edges::default(),
            gap: 0.0,
            margin_bottom: 0.0,
            flex: 1.0,
            background: None,
            overflow: Overflow::Visible,
            box_shadow: None,
            border_radius: 0.0,
            transform: Transform::None,
            position: Position::Static,
            border_left: None,
            border_bottom: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Align {
    #[default]
    Left,
    Center,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f32,
    pub bold: bool,
    pub color: Color,
    pub align: Align,
    /// Line box height as a multiple of `size`.
    pub line_height: f32,
    pub uppercase: bool,
    pub underline: bool,
}

impl TextStyle {
    pub fn new(size: f32, color: Color) -> TextStyle {
        TextStyle {
            size,
            bold: false,
            color,
            align: Align::Left,
            line_height: 1.4,
            uppercase: false,
            underline: false,
        }
    }

    pub fn bold(mut self) -> TextStyle {
        self.bold = true;
        self
    }

    pub fn centered(mut self) -> TextStyle {
        self.align = Align::Center;
        self
    }

    pub fn uppercase(mut self) -> TextStyle {
        self.uppercase = true;
        self
    }

    pub fn with_line_height(mut self, line_height: f32) -> TextStyle {
        self.line_height = line_height;
        self
    }

    pub fn underline(mut self) -> TextStyle {
        self.underline = true;
        self
    }
}
