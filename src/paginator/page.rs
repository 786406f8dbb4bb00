//! Page entity

use crate::host::ContainerId;

/// One paginated container of the document
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// 1-based position in the page sequence
    pub rank: u32,
    /// Marker of the container in the host document
    pub container: ContainerId,
    /// Last measured content height
    pub content_height: f32,
    /// Maximum usable content height
    pub max_height: f32,
}

impl Page {
    pub fn new(rank: u32, container: ContainerId, content_height: f32, max_height: f32) -> Self {
        Self {
            rank,
            container,
            content_height,
            max_height,
        }
    }

    pub fn overflows(&self) -> bool {
        self.content_height > self.max_height
    }
}
