//! Engine configuration

use crate::error::PaginateError;
use serde::{Deserialize, Serialize};

/// Page margins in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

impl Default for Margins {
    fn default() -> Self {
        // 1 inch on every side
        Self::uniform(25.4)
    }
}

impl Margins {
    pub fn uniform(mm: f32) -> Self {
        Self {
            top: mm,
            bottom: mm,
            left: mm,
            right: mm,
        }
    }
}

/// Configuration for a paginated editing session.
///
/// Page format and orientation stay as names here; they are validated when
/// the page metrics are built so a bad value fails with
/// [`PaginateError::InvalidConfiguration`] rather than a parse error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PaginateConfig {
    pub format: String,
    pub orientation: String,
    /// Logical pixels per inch
    pub resolution_dpi: f32,
    pub margins_mm: Margins,
    /// Delay before the first `init()` after the host is ready
    pub ready_delay_ms: u64,
    /// Delay before `init()` after a full content replacement
    pub replace_settle_ms: u64,
    /// Delay between that `init()` and focusing the current page
    pub replace_focus_ms: u64,
    /// Recovery attempts per mutation before giving up
    pub max_watch_retries: u32,
    /// Block moves allowed in one reconciliation pass
    pub max_block_moves: usize,
}

impl Default for PaginateConfig {
    fn default() -> Self {
        Self {
            format: "A4".to_string(),
            orientation: "portrait".to_string(),
            resolution_dpi: 96.0,
            margins_mm: Margins::default(),
            ready_delay_ms: 500,
            replace_settle_ms: 100,
            replace_focus_ms: 100,
            max_watch_retries: 10,
            max_block_moves: 10_000,
        }
    }
}

impl PaginateConfig {
    /// Parse a JSON config; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, PaginateError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_format(mut self, format: impl Into<String>, orientation: impl Into<String>) -> Self {
        self.format = format.into();
        self.orientation = orientation.into();
        self
    }
}
