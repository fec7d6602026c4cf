// Preview layout: font metrics, word wrap, and block/row flow over view trees.
// Layout is pure and CPU-bound; export runs it inside tokio::task::spawn_blocking.

pub mod flow;
pub mod font_metrics;
pub mod wrap;

pub use flow::{layout_tree, LayoutBox, Rect};
pub use font_metrics::FontFamily;
