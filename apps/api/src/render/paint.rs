//! Paints a laid-out view tree onto a `Canvas`.
//!
//! Order per box: shadow, background, borders, own content, children. A box
//! with `overflow: hidden` clips everything it paints after its background.

use crate::layout::{LayoutBox, Rect};
use crate::render::canvas::Canvas;
use crate::render::images::ImageResolver;
use crate::render::text::TextShaper;
use crate::view::node::NodeKind;
use crate::view::style::{Align, Overflow};

/// Width of the ring drawn around a profile picture.
const RING_WIDTH: f32 = 4.0;

pub struct Painter<'a> {
    pub shaper: &'a dyn TextShaper,
    pub images: &'a dyn ImageResolver,
    /// Offset of the layout origin on the canvas, in CSS px.
    pub origin: (f32, f32),
}

impl Painter<'_> {
    pub fn paint(&self, canvas: &mut Canvas, laid: &LayoutBox<'_>) {
        let style = &laid.node.style;
        let rect = self.place(laid.rect);

        if let Some(shadow) = style.box_shadow {
            let spread = Rect {
                x: rect.x - shadow.spread,
                y: rect.y - shadow.spread + shadow.offset_y,
                width: rect.width + 2.0 * shadow.spread,
                height: rect.height + 2.0 * shadow.spread,
            };
            canvas.fill_rounded_rect(spread, style.border_radius + shadow.spread, shadow.color);
        }

        if let Some(background) = style.background {
            canvas.fill_rounded_rect(rect, style.border_radius, background);
        }
        if let Some(border) = style.border_left {
            canvas.fill_rect(Rect { width: border.width, ..rect }, border.color);
        }
        if let Some(border) = style.border_bottom {
            canvas.fill_rect(
                Rect {
                    y: rect.bottom() - border.width,
                    height: border.width,
                    ..rect
                },
                border.color,
            );
        }

        let clipped = style.overflow == Overflow::Hidden;
        if clipped {
            canvas.push_clip(rect);
        }

        let border_left = style.border_left.map(|b| b.width).unwrap_or(0.0);
        let inner = Rect {
            x: rect.x + style.padding.left + border_left,
            y: rect.y + style.padding.top,
            width: (rect.width - style.padding.horizontal() - border_left).max(0.0),
            height: (rect.height - style.padding.vertical()).max(0.0),
        };

        match &laid.node.kind {
            NodeKind::Text { style: text, .. } => {
                let line_box = text.size * text.line_height;
                for (i, line) in laid.lines.iter().enumerate() {
                    let x = match text.align {
                        Align::Left => inner.x,
                        Align::Center => inner.x + (inner.width - line.width).max(0.0) / 2.0,
                    };
                    let top = inner.y + i as f32 * line_box;
                    self.shaper.draw_line(canvas, &line.text, x, top, text);
                }
            }
            NodeKind::Image {
                source,
                size,
                circular,
                ring,
            } => {
                let target = Rect {
                    x: inner.x + (inner.width - size).max(0.0) / 2.0,
                    y: inner.y,
                    width: *size,
                    height: *size,
                };
                if let Some(image) = self.images.resolve(source) {
                    canvas.draw_image(target, &image, *circular);
                }
                if let Some(color) = ring {
                    canvas.stroke_circle(target, RING_WIDTH, *color);
                }
            }
            NodeKind::Bar {
                fraction,
                track,
                fill,
                thickness,
            } => {
                let bar = Rect {
                    height: *thickness,
                    ..inner
                };
                let radius = thickness / 2.0;
                canvas.fill_rounded_rect(bar, radius, *track);
                if *fraction > 0.0 {
                    canvas.fill_rounded_rect(
                        Rect {
                            width: bar.width * fraction,
                            ..bar
                        },
                        radius,
                        *fill,
                    );
                }
            }
            NodeKind::Stack(_) | NodeKind::Row(_) => {}
        }

        for child in &laid.children {
            self.paint(canvas, child);
        }

        if clipped {
            canvas.pop_clip();
        }
    }

    fn place(&self, rect: Rect) -> Rect {
        Rect {
            x: rect.x + self.origin.0,
            y: rect.y + self.origin.1,
            ..rect
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{layout_tree, FontFamily};
    use crate::render::images::EmbeddedImageResolver;
    use crate::render::text::MetricShaper;
    use crate::view::node::ViewNode;
    use crate::view::style::{Color, Dimension};

    const RED: Color = Color(0xff, 0, 0);

    fn paint(root: &ViewNode, w: u32, h: u32) -> image::RgbaImage {
        let shaper = MetricShaper::new(FontFamily::Inter);
        let laid = layout_tree(root, &shaper);
        let mut canvas = Canvas::new(w, h, 1.0, Color::WHITE);
        Painter {
            shaper: &shaper,
            images: &EmbeddedImageResolver,
            origin: (0.0, 0.0),
        }
        .paint(&mut canvas, &laid);
        canvas.into_image()
    }

    #[test]
    fn test_hidden_overflow_clips_children() {
        let child = ViewNode::stack(vec![]).styled(|s| {
            s.height = Dimension::Px(100.0);
            s.background = Some(RED);
        });
        let root = ViewNode::stack(vec![child]).styled(|s| {
            s.width = Dimension::Px(20.0);
            s.height = Dimension::Px(10.0);
            s.overflow = Overflow::Hidden;
        });
        let image = paint(&root, 20, 40);
        assert_eq!(image.get_pixel(5, 5).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(5, 20).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_bar_fill_matches_fraction() {
        let root = ViewNode::bar(0.5, Color(0xdd, 0xdd, 0xdd), RED, 4.0)
            .styled(|s| s.width = Dimension::Px(40.0));
        let image = paint(&root, 40, 4);
        assert_eq!(image.get_pixel(10, 2).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(30, 2).0, [0xdd, 0xdd, 0xdd, 255]);
    }

    #[test]
    fn test_unresolvable_image_leaves_background() {
        let root = ViewNode::image("https://example.com/a.png", 10.0, true)
            .styled(|s| s.width = Dimension::Px(10.0));
        let image = paint(&root, 10, 10);
        assert!(image.pixels().all(|p| p.0 == [255, 255, 255, 255]));
    }
}
