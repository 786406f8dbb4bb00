//! Content height measurement

pub mod font;
mod line_break;

pub use font::FontMetrics;
pub use line_break::{LineBreaker, INDENT_WIDTH};
