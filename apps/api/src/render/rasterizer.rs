//! Snapshot rasterizer: turns the mounted preview into one tall bitmap.
//!
//! Export always captures at A4 width with `height: auto` and visible
//! overflow, so the bitmap holds the whole document no matter how the preview
//! is clipped on screen. Two ways of getting there:
//!
//! * `OffscreenClone` copies the root frozen at export start, parks the copy
//!   at (-9999, -9999) and restyles only the copy.
//! * `InPlace` restyles the mounted root itself while holding the surface
//!   lock. `ExportGeometryGuard` puts every touched property back when it is
//!   dropped, which covers success, error and unwind alike.
//!
//! Both capture the preview frozen when the export began. An in-place capture
//! refuses to run if a different document has been mounted since.

use std::sync::Arc;

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::layout::{layout_tree, FontFamily};
use crate::render::canvas::Canvas;
use crate::render::images::ImageResolver;
use crate::render::paint::Painter;
use crate::render::text::{MetricShaper, TextShaper, TtfShaper};
use crate::templates::{TemplateConfig, A4_WIDTH_PX};
use crate::view::node::ViewNode;
use crate::view::style::{Color, Dimension, Overflow, Position, Shadow, Transform};
use crate::view::surface::{MountedPreview, PreviewSurface};

/// Largest bitmap side most canvas implementations accept.
pub const DEFAULT_MAX_CANVAS_DIM: u32 = 32_767;

/// Where off-screen clones are parked. Layout always starts at the captured
/// root, so this only marks the copy as detached from the live view.
const OFFSCREEN: f32 = -9999.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureStrategy {
    OffscreenClone,
    InPlace,
}

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("capture of {width}x{height}px exceeds the {max}px canvas limit")]
    CanvasTooLarge { width: u64, height: u64, max: u32 },

    #[error("capture has zero area")]
    EmptyCapture,

    #[error("the preview was remounted after the export started")]
    Remounted,
}

/// Everything a capture needs to know about the target geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapturePlan {
    pub strategy: CaptureStrategy,
    pub font: FontFamily,
    pub scale: f32,
    pub width: f32,
    pub min_height: Option<f32>,
    pub background: Color,
}

impl CapturePlan {
    pub fn for_template(config: &TemplateConfig, max_scale: f32) -> CapturePlan {
        CapturePlan {
            strategy: config.capture,
            font: config.font,
            scale: config.export_scale.min(max_scale).max(1.0),
            width: A4_WIDTH_PX,
            min_height: config.export_min_height,
            background: Color::WHITE,
        }
    }
}

/// A captured bitmap and the CSS geometry it was taken at.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub image: RgbaImage,
    pub css_width: f32,
    pub css_height: f32,
}

pub trait Snapshotter: Send + Sync {
    /// Captures `frozen`, the preview as it was mounted when the export
    /// began. `surface` is only touched by in-place captures.
    fn capture(
        &self,
        surface: &PreviewSurface,
        frozen: &MountedPreview,
        plan: &CapturePlan,
    ) -> Result<Snapshot, RasterError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Export geometry
// ────────────────────────────────────────────────────────────────────────────

/// Properties of the root that export geometry overrides.
#[derive(Debug, Clone, PartialEq)]
struct SavedGeometry {
    width: Dimension,
    height: Dimension,
    min_height: Option<f32>,
    box_shadow: Option<Shadow>,
    border_radius: f32,
    overflow: Overflow,
    transform: Transform,
    background: Option<Color>,
}

fn apply_export_geometry(node: &mut ViewNode, plan: &CapturePlan) {
    let style = &mut node.style;
    style.width = Dimension::Px(plan.width);
    style.height = Dimension::Auto;
    if plan.min_height.is_some() {
        style.min_height = plan.min_height;
    }
    style.overflow = Overflow::Visible;
    style.box_shadow = None;
    style.border_radius = 0.0;
    style.transform = Transform::None;
    style.background = Some(plan.background);
}

/// Applies export geometry to a live node and restores it on drop.
pub struct ExportGeometryGuard<'a> {
    node: &'a mut ViewNode,
    saved: SavedGeometry,
}

impl<'a> ExportGeometryGuard<'a> {
    pub fn apply(node: &'a mut ViewNode, plan: &CapturePlan) -> ExportGeometryGuard<'a> {
        let s = &node.style;
        let saved = SavedGeometry {
            width: s.width,
            height: s.height,
            min_height: s.min_height,
            box_shadow: s.box_shadow,
            border_radius: s.border_radius,
            overflow: s.overflow,
            transform: s.transform,
            background: s.background,
        };
        apply_export_geometry(node, plan);
        ExportGeometryGuard { node, saved }
    }

    pub fn node(&self) -> &ViewNode {
        self.node
    }
}

impl Drop for ExportGeometryGuard<'_> {
    fn drop(&mut self) {
        let s = &mut self.node.style;
        s.width = self.saved.width;
        s.height = self.saved.height;
        s.min_height = self.saved.min_height;
        s.box_shadow = self.saved.box_shadow;
        s.border_radius = self.saved.border_radius;
        s.overflow = self.saved.overflow;
        s.transform = self.saved.transform;
        s.background = self.saved.background;
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Rasterizer
// ────────────────────────────────────────────────────────────────────────────

pub struct Rasterizer {
    truetype: Option<Arc<TtfShaper>>,
    images: Arc<dyn ImageResolver>,
    max_canvas_dim: u32,
}

impl Rasterizer {
    pub fn new(images: Arc<dyn ImageResolver>, max_canvas_dim: u32) -> Rasterizer {
        Rasterizer {
            truetype: None,
            images,
            max_canvas_dim,
        }
    }

    /// Paints real glyphs from `shaper` instead of metric-table greeking.
    pub fn with_truetype(mut self, shaper: TtfShaper) -> Rasterizer {
        self.truetype = Some(Arc::new(shaper));
        self
    }

    /// Laid-out size of `root` in CSS px, before any transform.
    pub fn content_size(&self, root: &ViewNode, font: FontFamily) -> (f32, f32) {
        let metric = MetricShaper::new(font);
        let shaper: &dyn TextShaper = match &self.truetype {
            Some(ttf) => ttf.as_ref(),
            None => &metric,
        };
        let laid = layout_tree(root, shaper);
        (laid.rect.width, laid.painted_height())
    }

    /// Rasterizes `root` exactly as styled. The root's transform multiplies
    /// `scale`; a root shadow widens the canvas so it is not cut off.
    pub fn rasterize(
        &self,
        root: &ViewNode,
        font: FontFamily,
        scale: f32,
        background: Color,
    ) -> Result<Snapshot, RasterError> {
        let metric = MetricShaper::new(font);
        let shaper: &dyn TextShaper = match &self.truetype {
            Some(ttf) => ttf.as_ref(),
            None => &metric,
        };

        let laid = layout_tree(root, shaper);
        let scale = scale * root.style.transform.factor();
        let (spread, offset_y) = root
            .style
            .box_shadow
            .map(|s| (s.spread.max(0.0), s.offset_y.max(0.0)))
            .unwrap_or((0.0, 0.0));

        let css_width = laid.rect.width + 2.0 * spread;
        let css_height = laid.painted_height() + 2.0 * spread + offset_y;
        let width = (f64::from(css_width) * f64::from(scale)).ceil().max(0.0) as u64;
        let height = (f64::from(css_height) * f64::from(scale)).ceil().max(0.0) as u64;

        if width == 0 || height == 0 {
            return Err(RasterError::EmptyCapture);
        }
        let max = u64::from(self.max_canvas_dim);
        if width > max || height > max {
            return Err(RasterError::CanvasTooLarge {
                width,
                height,
                max: self.max_canvas_dim,
            });
        }

        tracing::debug!(width, height, scale, "Rasterizing view");

        let mut canvas = Canvas::new(width as u32, height as u32, scale, background);
        Painter {
            shaper,
            images: self.images.as_ref(),
            origin: (spread, spread),
        }
        .paint(&mut canvas, &laid);

        Ok(Snapshot {
            image: canvas.into_image(),
            css_width,
            css_height,
        })
    }
}

impl Snapshotter for Rasterizer {
    fn capture(
        &self,
        surface: &PreviewSurface,
        frozen: &MountedPreview,
        plan: &CapturePlan,
    ) -> Result<Snapshot, RasterError> {
        match plan.strategy {
            CaptureStrategy::OffscreenClone => {
                let mut clone = frozen.root.clone();
                clone.style.position = Position::Absolute {
                    left: OFFSCREEN,
                    top: OFFSCREEN,
                };
                apply_export_geometry(&mut clone, plan);
                self.rasterize(&clone, plan.font, plan.scale, plan.background)
            }
            CaptureStrategy::InPlace => surface
                .with_mounted_mut(|mounted| {
                    if !Arc::ptr_eq(&mounted.document, &frozen.document) {
                        return Err(RasterError::Remounted);
                    }
                    let guard = ExportGeometryGuard::apply(&mut mounted.root, plan);
                    self.rasterize(guard.node(), plan.font, plan.scale, plan.background)
                })
                .unwrap_or(Err(RasterError::Remounted)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{PersonalInfo, ResumeDocument};
    use crate::render::images::EmbeddedImageResolver;
    use crate::templates::{TemplateKind, A4_HEIGHT_PX};
    use crate::view::style::Style;

    fn rasterizer(max: u32) -> Rasterizer {
        Rasterizer::new(Arc::new(EmbeddedImageResolver), max)
    }

    fn document(kind: TemplateKind) -> Arc<ResumeDocument> {
        Arc::new(ResumeDocument {
            template: crate::models::resume::TemplateDescriptor::for_kind(kind),
            personal: PersonalInfo {
                name: "Ada Lovelace".into(),
                title: "Engineer".into(),
                email: "ada@example.com".into(),
                ..Default::default()
            },
            summary: "Wrote the first published algorithm. ".repeat(300),
            ..Default::default()
        })
    }

    fn mounted(kind: TemplateKind) -> PreviewSurface {
        let surface = PreviewSurface::new();
        surface.mount(document(kind));
        surface
    }

    fn plan(kind: TemplateKind) -> CapturePlan {
        CapturePlan::for_template(kind.config(), 4.0)
    }

    fn frozen(surface: &PreviewSurface) -> MountedPreview {
        surface.with_mounted(|m| m.clone()).expect("mounted")
    }

    fn capture(surface: &PreviewSurface, max: u32, plan: &CapturePlan) -> Result<Snapshot, RasterError> {
        rasterizer(max).capture(surface, &frozen(surface), plan)
    }

    fn root_style(surface: &PreviewSurface) -> Style {
        surface
            .with_mounted(|m| m.root.style.clone())
            .expect("mounted")
    }

    #[test]
    fn test_in_place_refuses_a_remounted_preview() {
        let surface = mounted(TemplateKind::Professional);
        let started_with = frozen(&surface);
        surface.mount(document(TemplateKind::Professional));
        let replaced = root_style(&surface);

        let result = rasterizer(DEFAULT_MAX_CANVAS_DIM).capture(
            &surface,
            &started_with,
            &plan(TemplateKind::Professional),
        );
        assert!(matches!(result, Err(RasterError::Remounted)));
        assert_eq!(root_style(&surface), replaced);

        surface.unmount();
        let result = rasterizer(DEFAULT_MAX_CANVAS_DIM).capture(
            &surface,
            &started_with,
            &plan(TemplateKind::Professional),
        );
        assert!(matches!(result, Err(RasterError::Remounted)));
    }

    #[test]
    fn test_offscreen_capture_uses_the_frozen_tree() {
        let surface = mounted(TemplateKind::Creative);
        let started_with = frozen(&surface);
        let mut plan = plan(TemplateKind::Creative);
        plan.scale = 1.0;
        let expected = capture(&surface, DEFAULT_MAX_CANVAS_DIM, &plan).unwrap();

        surface.mount(Arc::new(ResumeDocument {
            personal: PersonalInfo {
                name: "Grace Hopper".into(),
                ..Default::default()
            },
            ..Default::default()
        }));
        let snap = rasterizer(DEFAULT_MAX_CANVAS_DIM)
            .capture(&surface, &started_with, &plan)
            .unwrap();
        assert_eq!(snap.image.dimensions(), expected.image.dimensions());
        assert!(snap.image == expected.image);
    }

    #[test]
    fn test_capture_is_full_width_at_plan_scale() {
        let surface = mounted(TemplateKind::Creative);
        let mut plan = plan(TemplateKind::Creative);
        plan.scale = 1.0;
        let snap = capture(&surface, DEFAULT_MAX_CANVAS_DIM, &plan).unwrap();
        assert_eq!(snap.image.width(), 794);
        assert_eq!(snap.css_width, A4_WIDTH_PX);
        // Opaque white corner: no radius, no shadow.
        assert_eq!(snap.image.get_pixel(0, snap.image.height() - 1).0[3], 255);
    }

    #[test]
    fn test_offscreen_clone_leaves_mounted_view_untouched() {
        let surface = mounted(TemplateKind::Creative);
        let before = root_style(&surface);
        let mut plan = plan(TemplateKind::Creative);
        plan.scale = 1.0;
        capture(&surface, DEFAULT_MAX_CANVAS_DIM, &plan).unwrap();
        assert_eq!(root_style(&surface), before);
    }

    #[test]
    fn test_offscreen_capture_ignores_screen_clip() {
        // The creative preview is clipped at one A4 page on screen; the long
        // summary must still reach the capture.
        let surface = mounted(TemplateKind::Creative);
        let mut plan = plan(TemplateKind::Creative);
        plan.scale = 1.0;
        let snap = capture(&surface, DEFAULT_MAX_CANVAS_DIM, &plan).unwrap();
        assert!(snap.css_height > A4_HEIGHT_PX);
    }

    #[test]
    fn test_in_place_restores_on_success() {
        let surface = mounted(TemplateKind::Professional);
        let before = root_style(&surface);
        let mut plan = plan(TemplateKind::Professional);
        plan.scale = 1.0;
        let snap = capture(&surface, DEFAULT_MAX_CANVAS_DIM, &plan).unwrap();
        assert!(snap.css_height >= A4_HEIGHT_PX);
        assert_eq!(root_style(&surface), before);
    }

    #[test]
    fn test_in_place_restores_on_failure() {
        let surface = mounted(TemplateKind::Professional);
        let before = root_style(&surface);
        let result = capture(&surface, 100, &plan(TemplateKind::Professional));
        assert!(matches!(result, Err(RasterError::CanvasTooLarge { max: 100, .. })));
        assert_eq!(root_style(&surface), before);
    }

    #[test]
    fn test_guard_restores_during_unwind() {
        let mut node = ViewNode::stack(vec![]).styled(|s| {
            s.width = Dimension::Px(900.0);
            s.overflow = Overflow::Hidden;
            s.transform = Transform::Scale(0.9);
            s.border_radius = 8.0;
        });
        let before = node.style.clone();
        let plan = plan(TemplateKind::Professional);

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let guard = ExportGeometryGuard::apply(&mut node, &plan);
            assert_eq!(guard.node().style.width, Dimension::Px(A4_WIDTH_PX));
            panic!("paint failed");
        }));
        assert!(result.is_err());
        assert_eq!(node.style, before);
    }

    #[test]
    fn test_zero_area_is_an_error() {
        let empty = ViewNode::stack(vec![]);
        let result = rasterizer(DEFAULT_MAX_CANVAS_DIM).rasterize(
            &empty,
            FontFamily::Inter,
            3.0,
            Color::WHITE,
        );
        assert!(matches!(result, Err(RasterError::EmptyCapture)));
    }

    #[test]
    fn test_plan_scale_is_capped() {
        let plan = CapturePlan::for_template(TemplateKind::Professional.config(), 2.0);
        assert_eq!(plan.scale, 2.0);
        assert_eq!(plan.min_height, Some(A4_HEIGHT_PX));
        assert_eq!(plan.strategy, CaptureStrategy::InPlace);
    }
}
