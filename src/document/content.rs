//! Serializable content model (the host's "full content" format)

use super::block::{Block, BlockKind};
use serde::{Deserialize, Serialize};

/// Canonical serialization of an empty document: one empty paragraph, no pages
pub const PLACEHOLDER_CONTENT: &str = r#"{"pages":[],"body":[{"kind":"paragraph","text":""}]}"#;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ContentModel {
    #[serde(default)]
    pub pages: Vec<PageModel>,
    #[serde(default)]
    pub body: Vec<BlockModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<u32>,
    #[serde(default)]
    pub blocks: Vec<BlockModel>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockModel {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(flatten)]
    pub kind: BlockKind,
    #[serde(default)]
    pub text: String,
}

impl From<&Block> for BlockModel {
    fn from(block: &Block) -> Self {
        Self {
            id: Some(block.id.0),
            kind: block.kind.clone(),
            text: block.text.clone(),
        }
    }
}

impl ContentModel {
    pub fn parse(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }

    pub fn to_json(&self) -> String {
        // Plain data with string keys always serializes
        serde_json::to_string(self).unwrap_or_default()
    }

    /// No pages and a single empty paragraph, ignoring ids
    pub fn is_placeholder(&self) -> bool {
        self.pages.is_empty()
            && self.body.len() == 1
            && self.body[0].kind == BlockKind::Paragraph
            && self.body[0].text.is_empty()
    }
}
