//! Error types for the pagination engine

use crate::host::ContainerId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaginateError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Invalid page height on page {rank}: {fault}")]
    InvalidPageHeight { rank: u32, fault: HeightFault },

    #[error("Container {0:?} is not a page of this paginator")]
    UnknownContainer(ContainerId),

    #[error("Paginator has been destroyed")]
    Destroyed,

    #[error("Host error: {0}")]
    Host(#[from] HostError),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

impl PaginateError {
    /// Errors the controller may recover from by re-initializing
    pub fn is_invalid_page_height(&self) -> bool {
        matches!(self, PaginateError::InvalidPageHeight { .. })
    }
}

/// Why a page could not be brought within its height bounds
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HeightFault {
    #[error("content height {height:.1}px exceeds maximum {max:.1}px")]
    Overflow { height: f32, max: f32 },

    #[error("content height could not be measured")]
    Unmeasurable,

    #[error("page has no usable height")]
    ZeroUsableHeight,

    #[error("page container is no longer bound to the document")]
    Detached,

    #[error("block move budget exhausted")]
    MoveBudgetExhausted,
}

/// Failures reported by a document host
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HostError {
    #[error("No such container: {0:?}")]
    NoSuchContainer(ContainerId),

    #[error("Container {0:?} has no block to move")]
    EmptyContainer(ContainerId),

    #[error("Invalid content: {0}")]
    InvalidContent(String),
}
