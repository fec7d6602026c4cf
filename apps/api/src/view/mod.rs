// Styled view trees: the node model, the per-template preview builder, and
// the surface holding the mounted preview.

pub mod node;
pub mod preview;
pub mod style;
pub mod surface;

pub use surface::PreviewSurface;
