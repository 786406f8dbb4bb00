//! Boundary between the engine and the editor that owns the document.
//!
//! The engine never owns document nodes. It refers to page containers by
//! [`ContainerId`] and asks the host to measure, move and mark them. Hosts
//! deliver their lifecycle and content notifications as [`HostEvent`]s.

pub mod memory;

use crate::error::HostError;
use crate::paginator::Page;

pub use memory::{MeasureFault, MemoryHost};

/// Identity of an element marked as a page container
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContainerId(pub u64);

/// Payload of a content change: the serialized content before and after
#[derive(Debug, Clone, PartialEq)]
pub struct ContentChange {
    pub new_content: String,
    pub previous_content: String,
}

/// Notification that the focused page changed
#[derive(Debug, Clone, PartialEq)]
pub struct PageChanged {
    pub from_rank: Option<u32>,
    pub to_page: Page,
}

/// Events the host delivers to the engine, in delivery order
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// The editing surface is ready (fires once)
    Ready,
    /// The editor was removed (fires once, terminal)
    Removed,
    /// Content was edited
    ContentChanged(Option<ContentChange>),
    /// The whole content was replaced
    FullContentReplaced { content: Option<String> },
    /// The selection moved; names the page container it landed in, if any
    SelectionContextChanged { page_container: Option<ContainerId> },
    /// A page change notification dispatched on the document
    PageChanged(PageChanged),
}

/// Capabilities the engine consumes from the host editor
pub trait DocumentHost {
    /// Full content as the host's content-model serialization
    fn content(&self) -> String;

    /// Replace the full content
    fn set_content(&mut self, content: &str) -> Result<(), HostError>;

    /// Whether `content` is the host's canonical empty-paragraph placeholder
    fn is_placeholder_content(&self, content: &str) -> bool;

    /// Number of page containers inside a serialized content
    fn count_page_containers(&self, content: &str) -> usize;

    /// Page containers in document order
    fn page_containers(&self) -> Vec<ContainerId>;

    /// Rank marker stored on a container
    fn container_rank(&self, container: ContainerId) -> Option<u32>;

    fn set_container_rank(&mut self, container: ContainerId, rank: u32) -> Result<(), HostError>;

    /// Wrap all loose body content into a new first page container
    fn wrap_body(&mut self) -> Result<ContainerId, HostError>;

    /// Insert an empty page container right after `after`
    fn insert_container_after(&mut self, after: ContainerId) -> Result<ContainerId, HostError>;

    fn remove_container(&mut self, container: ContainerId) -> Result<(), HostError>;

    /// Number of block units in a container, `None` if it no longer exists
    fn block_count(&self, container: ContainerId) -> Option<usize>;

    /// Move the last block of `from` to the front of `to`
    fn move_last_block(&mut self, from: ContainerId, to: ContainerId) -> Result<(), HostError>;

    /// Move the first block of `from` to the end of `to`
    fn move_first_block(&mut self, from: ContainerId, to: ContainerId) -> Result<(), HostError>;

    /// Live content height of a container in logical pixels
    fn measure(&mut self, container: ContainerId) -> Option<f32>;

    /// Height of the first block of a container, as it would measure alone
    fn measure_first_block(&mut self, container: ContainerId) -> Option<f32>;

    /// Container holding the current selection
    fn selection_container(&self) -> Option<ContainerId>;

    /// Move the selection into a container
    fn focus_container(&mut self, container: ContainerId) -> Result<(), HostError>;

    fn bind_page_changed(&mut self);

    fn unbind_page_changed(&mut self);

    fn dispatch_page_changed(&mut self, event: &PageChanged);

    /// Ask the host to re-evaluate its editing state
    fn node_changed(&mut self);
}
