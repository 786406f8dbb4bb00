//! Block-level content units

use serde::{Deserialize, Serialize};

/// Stable identifier for a block that survives moves between pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct BlockId(pub u64);

/// The kind of block element
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockKind {
    /// Regular paragraph
    #[default]
    Paragraph,
    /// Heading with level (1-6)
    Heading { level: u8 },
    /// List item
    ListItem { indent_level: u8 },
    /// Fixed-height content such as an image or table
    Figure { height: f32 },
}

impl BlockKind {
    pub fn heading(level: u8) -> Self {
        BlockKind::Heading {
            level: level.clamp(1, 6),
        }
    }

    /// Get the line height multiplier for this block kind
    pub fn line_height_multiplier(&self) -> f32 {
        match self {
            BlockKind::Paragraph => 1.0,
            BlockKind::Heading { level } => match level {
                1 => 1.5,
                2 => 1.4,
                3 => 1.3,
                _ => 1.2,
            },
            BlockKind::ListItem { .. } => 1.0,
            BlockKind::Figure { .. } => 1.0,
        }
    }

    /// Get the spacing after this block (in line heights)
    pub fn spacing_after(&self) -> f32 {
        match self {
            BlockKind::Paragraph => 1.0,
            BlockKind::Heading { .. } => 0.5,
            BlockKind::ListItem { .. } => 0.25,
            BlockKind::Figure { .. } => 0.0,
        }
    }
}

/// A block unit: the smallest granule moved between pages
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    pub text: String,
}

impl Block {
    pub fn new(id: BlockId, kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_is_clamped() {
        assert_eq!(BlockKind::heading(9), BlockKind::Heading { level: 6 });
        assert_eq!(BlockKind::heading(0), BlockKind::Heading { level: 1 });
    }

    #[test]
    fn test_figures_have_no_spacing() {
        let figure = BlockKind::Figure { height: 50.0 };
        assert_eq!(figure.spacing_after(), 0.0);
        assert!(BlockKind::heading(1).line_height_multiplier() > BlockKind::Paragraph.line_height_multiplier());
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&BlockKind::heading(2)).unwrap();
        assert_eq!(json, r#"{"kind":"heading","level":2}"#);

        let figure: BlockKind = serde_json::from_str(r#"{"kind":"figure","height":120.0}"#).unwrap();
        assert_eq!(figure, BlockKind::Figure { height: 120.0 });
    }
}
