// Snapshot pipeline: paint a view tree into a bitmap, split it into pages,
// and write the pages out as a PDF.

pub mod canvas;
pub mod images;
pub mod paginator;
pub mod paint;
pub mod pdf;
pub mod rasterizer;
pub mod text;

pub use rasterizer::Rasterizer;
