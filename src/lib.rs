//! Mini-Paginate: live pagination for a rich-text editor
//!
//! This crate keeps an editor's content partitioned into fixed-height pages
//! while the user edits:
//! - Page metrics from a paper format, orientation and margins
//! - A paginator that pushes overflowing blocks forward and pulls content
//!   back into pages with room, never splitting a block
//! - An event-driven controller with deferred initialization, bounded
//!   recovery and page navigation
//! - An in-memory reference host and WASM bindings

pub mod config;
pub mod controller;
pub mod document;
pub mod error;
pub mod host;
pub mod layout;
pub mod metrics;
pub mod navigation;
pub mod paginator;
pub mod wasm;

// Re-export WASM types for direct use
pub use wasm::WasmPaginator;

// Re-export primary types
pub use config::{Margins, PaginateConfig};
pub use controller::{EngineEvent, EngineObserver, EngineState, ReconciliationController};
pub use document::{Block, BlockId, BlockKind, Document};
pub use error::{HeightFault, HostError, PaginateError};
pub use host::{ContainerId, ContentChange, DocumentHost, HostEvent, MemoryHost, PageChanged};
pub use layout::{FontMetrics, LineBreaker};
pub use metrics::{Orientation, PageFormat, PageMetrics};
pub use navigation::{NavCommand, NavigationUi};
pub use paginator::{Page, Paginator};
