//! Line breaking used to measure block heights

use crate::document::{Block, BlockKind};
use crate::layout::font::FontMetrics;
use unicode_linebreak::{linebreaks, BreakOpportunity};
use unicode_segmentation::UnicodeSegmentation;

/// Indentation width per list level
pub const INDENT_WIDTH: f32 = 24.0;

/// Measures blocks by breaking their text into lines
#[derive(Debug, Clone)]
pub struct LineBreaker {
    font: FontMetrics,
    max_width: f32,
}

impl LineBreaker {
    pub fn new(font: FontMetrics, max_width: f32) -> Self {
        Self { font, max_width }
    }

    /// Height of a block including the spacing after it
    pub fn block_height(&self, block: &Block) -> f32 {
        if let BlockKind::Figure { height } = block.kind {
            return height.max(0.0);
        }

        let line_height = self.font.line_height * block.kind.line_height_multiplier();
        let lines = self.line_count(&block.text, self.effective_width(&block.kind));
        lines as f32 * line_height + block.kind.spacing_after() * self.font.line_height
    }

    fn effective_width(&self, kind: &BlockKind) -> f32 {
        match kind {
            BlockKind::ListItem { indent_level } => {
                (self.max_width - (*indent_level as f32 + 1.0) * INDENT_WIDTH).max(self.font.default_width)
            }
            _ => self.max_width,
        }
    }

    /// Number of lines `text` occupies at `width`.
    ///
    /// Lines wrap at Unicode break opportunities; a segment wider than the
    /// whole line is broken wherever it overflows. Empty text is one line.
    pub fn line_count(&self, text: &str, width: f32) -> usize {
        let width = width.max(1.0);
        let mut lines = 1;
        let mut x: f32 = 0.0;
        let mut segment_start = 0;

        for (pos, opportunity) in linebreaks(text) {
            let segment = &text[segment_start..pos];
            segment_start = pos;

            let full = self.text_width(segment);
            // Trailing spaces may hang past the edge
            let visible = self.text_width(segment.trim_end());

            if x > 0.0 && x + visible > width {
                lines += 1;
                x = 0.0;
            }

            if visible > width {
                // Emergency breaks inside the segment
                let extra = (visible / width).ceil() as usize - 1;
                lines += extra;
                x = full - extra as f32 * width;
            } else {
                x += full;
            }

            if opportunity == BreakOpportunity::Mandatory && pos < text.len() {
                lines += 1;
                x = 0.0;
            }
        }

        lines
    }

    fn text_width(&self, text: &str) -> f32 {
        text.graphemes(true)
            .map(|g| {
                if g == "\t" {
                    self.font.default_width * 4.0
                } else {
                    g.chars().map(|c| self.font.width(c)).sum()
                }
            })
            .sum()
    }
}
