//! RGBA drawing surface addressed in CSS pixels.
//!
//! Callers draw in the layout's coordinate space; the canvas maps to device
//! pixels through `scale` and keeps a clip stack for `overflow: hidden`.

use image::{imageops, Rgba, RgbaImage};

use crate::layout::Rect;
use crate::view::style::Color;

#[derive(Debug, Clone, Copy, PartialEq)]
struct DeviceRect {
    x0: i64,
    y0: i64,
    x1: i64,
    y1: i64,
}

impl DeviceRect {
    fn intersect(self, other: DeviceRect) -> DeviceRect {
        DeviceRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }
}

pub struct Canvas {
    image: RgbaImage,
    scale: f32,
    clips: Vec<DeviceRect>,
}

impl Canvas {
    /// An opaque canvas of `width_px` × `height_px` device pixels filled with `background`.
    pub fn new(width_px: u32, height_px: u32, scale: f32, background: Color) -> Canvas {
        Canvas {
            image: RgbaImage::from_pixel(width_px, height_px, background.to_rgba()),
            scale,
            clips: Vec::new(),
        }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    pub fn push_clip(&mut self, rect: Rect) {
        let device = self.device_rect(rect);
        let clip = match self.clips.last() {
            Some(outer) => outer.intersect(device),
            None => device,
        };
        self.clips.push(clip);
    }

    pub fn pop_clip(&mut self) {
        self.clips.pop();
    }

    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fill_rounded_rect(rect, 0.0, color);
    }

    /// Fills `rect`, leaving the corners outside `radius` untouched.
    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        let area = self.visible(self.device_rect(rect));
        let r = (radius * self.scale).min(rect.width * self.scale / 2.0).min(rect.height * self.scale / 2.0);
        let (left, top) = (rect.x * self.scale, rect.y * self.scale);
        let (right, bottom) = (rect.right() * self.scale, rect.bottom() * self.scale);
        let rgba = color.to_rgba();

        for dy in area.y0..area.y1 {
            for dx in area.x0..area.x1 {
                if r > 0.0 {
                    let (px, py) = (dx as f32 + 0.5, dy as f32 + 0.5);
                    let cx = if px < left + r {
                        left + r
                    } else if px > right - r {
                        right - r
                    } else {
                        px
                    };
                    let cy = if py < top + r {
                        top + r
                    } else if py > bottom - r {
                        bottom - r
                    } else {
                        py
                    };
                    if (px - cx).powi(2) + (py - cy).powi(2) > r * r {
                        continue;
                    }
                }
                self.image.put_pixel(dx as u32, dy as u32, rgba);
            }
        }
    }

    /// Blends `color` over one device pixel with the given coverage in `0.0..=1.0`.
    pub fn blend_device_pixel(&mut self, dx: i64, dy: i64, color: Color, coverage: f32) {
        if !self.contains(dx, dy) || coverage <= 0.0 {
            return;
        }
        let a = coverage.min(1.0);
        let dst = self.image.get_pixel_mut(dx as u32, dy as u32);
        let src = [color.0, color.1, color.2];
        for i in 0..3 {
            dst[i] = (src[i] as f32 * a + dst[i] as f32 * (1.0 - a)).round() as u8;
        }
        dst[3] = 0xff;
    }

    /// Draws `source` scaled into `rect`, optionally masked to the inscribed circle.
    /// Source alpha is composited over what is already on the canvas.
    pub fn draw_image(&mut self, rect: Rect, source: &RgbaImage, circular: bool) {
        let target_w = (rect.width * self.scale).round().max(1.0) as u32;
        let target_h = (rect.height * self.scale).round().max(1.0) as u32;
        let scaled = imageops::resize(source, target_w, target_h, imageops::FilterType::Triangle);

        let ox = (rect.x * self.scale).round() as i64;
        let oy = (rect.y * self.scale).round() as i64;
        let (cx, cy) = (target_w as f32 / 2.0, target_h as f32 / 2.0);
        let radius = cx.min(cy);

        for (sx, sy, pixel) in scaled.enumerate_pixels() {
            if circular {
                let (px, py) = (sx as f32 + 0.5 - cx, sy as f32 + 0.5 - cy);
                if px * px + py * py > radius * radius {
                    continue;
                }
            }
            let Rgba([r, g, b, a]) = *pixel;
            self.blend_device_pixel(
                ox + sx as i64,
                oy + sy as i64,
                Color(r, g, b),
                a as f32 / 255.0,
            );
        }
    }

    /// Strokes a ring of `width` CSS px just inside the circle inscribed in `rect`.
    pub fn stroke_circle(&mut self, rect: Rect, width: f32, color: Color) {
        let area = self.visible(self.device_rect(rect));
        let cx = (rect.x + rect.width / 2.0) * self.scale;
        let cy = (rect.y + rect.height / 2.0) * self.scale;
        let outer = rect.width.min(rect.height) * self.scale / 2.0;
        let inner = (outer - width * self.scale).max(0.0);
        for dy in area.y0..area.y1 {
            for dx in area.x0..area.x1 {
                let d = ((dx as f32 + 0.5 - cx).powi(2) + (dy as f32 + 0.5 - cy).powi(2)).sqrt();
                if d <= outer && d >= inner {
                    self.blend_device_pixel(dx, dy, color, 1.0);
                }
            }
        }
    }

    fn device_rect(&self, rect: Rect) -> DeviceRect {
        DeviceRect {
            x0: (rect.x * self.scale).floor() as i64,
            y0: (rect.y * self.scale).floor() as i64,
            x1: (rect.right() * self.scale).ceil() as i64,
            y1: (rect.bottom() * self.scale).ceil() as i64,
        }
    }

    fn bounds(&self) -> DeviceRect {
        DeviceRect {
            x0: 0,
            y0: 0,
            x1: i64::from(self.image.width()),
            y1: i64::from(self.image.height()),
        }
    }

    fn visible(&self, rect: DeviceRect) -> DeviceRect {
        let mut area = rect.intersect(self.bounds());
        if let Some(clip) = self.clips.last() {
            area = area.intersect(*clip);
        }
        area
    }

    fn contains(&self, dx: i64, dy: i64) -> bool {
        let area = self.visible(self.bounds());
        dx >= area.x0 && dx < area.x1 && dy >= area.y0 && dy < area.y1
    }
}
