//! In-memory host: a block document with measured heights.
//!
//! Used by the demo binary, the WASM facade, benchmarks and tests. It behaves
//! like an editor that stores pages as marked containers and measures their
//! height from line breaking.

use crate::document::{BlockId, ContentModel, Document};
use crate::error::HostError;
use crate::host::{ContainerId, DocumentHost, PageChanged};
use crate::layout::{FontMetrics, LineBreaker};
use crate::metrics::PageMetrics;
use tracing::debug;

/// Injected measurement failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MeasureFault {
    #[default]
    None,
    /// Fail the next `n` measurements
    Next(usize),
    /// Fail every measurement
    Always,
}

pub struct MemoryHost {
    document: Document,
    breaker: LineBreaker,
    /// Block holding the caret
    selection: Option<BlockId>,
    page_changed_bound: bool,
    dispatched: Vec<PageChanged>,
    node_changes: usize,
    fault: MeasureFault,
    measurements: usize,
    /// Space between adjacent blocks of a container
    block_gap: f32,
}

impl MemoryHost {
    pub const PLACEHOLDER: &'static str = crate::document::PLACEHOLDER_CONTENT;

    pub fn new(document: Document, breaker: LineBreaker) -> Self {
        Self {
            document,
            breaker,
            selection: None,
            page_changed_bound: false,
            dispatched: Vec::new(),
            node_changes: 0,
            fault: MeasureFault::None,
            measurements: 0,
            block_gap: 0.0,
        }
    }

    /// Host measuring at the content width of the given page metrics
    pub fn for_metrics(document: Document, metrics: &PageMetrics, font: FontMetrics) -> Self {
        Self::new(document, LineBreaker::new(font, metrics.max_content_width()))
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct access for simulating user edits
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn set_measure_fault(&mut self, fault: MeasureFault) {
        self.fault = fault;
    }

    /// Add space between sibling blocks; a block measured alone has none
    pub fn set_block_gap(&mut self, gap: f32) {
        self.block_gap = gap.max(0.0);
    }

    /// Place the caret in a block
    pub fn select_block(&mut self, block: BlockId) {
        self.selection = Some(block);
    }

    pub fn is_page_changed_bound(&self) -> bool {
        self.page_changed_bound
    }

    pub fn dispatched(&self) -> &[PageChanged] {
        &self.dispatched
    }

    pub fn node_changes(&self) -> usize {
        self.node_changes
    }

    /// Number of measurements performed so far
    pub fn measurements(&self) -> usize {
        self.measurements
    }

    fn take_fault(&mut self) -> bool {
        match self.fault {
            MeasureFault::None => false,
            MeasureFault::Always => true,
            MeasureFault::Next(n) => {
                self.fault = if n > 1 {
                    MeasureFault::Next(n - 1)
                } else {
                    MeasureFault::None
                };
                true
            }
        }
    }
}

impl DocumentHost for MemoryHost {
    fn content(&self) -> String {
        self.document.to_model().to_json()
    }

    fn set_content(&mut self, content: &str) -> Result<(), HostError> {
        let model = ContentModel::parse(content).map_err(|e| HostError::InvalidContent(e.to_string()))?;
        self.document = Document::from_model(model);
        if self.selection.and_then(|b| self.document.block(b)).is_none() {
            self.selection = None;
        }
        Ok(())
    }

    fn is_placeholder_content(&self, content: &str) -> bool {
        ContentModel::parse(content).map_or(false, |model| model.is_placeholder())
    }

    fn count_page_containers(&self, content: &str) -> usize {
        ContentModel::parse(content).map_or(0, |model| model.pages.len())
    }

    fn page_containers(&self) -> Vec<ContainerId> {
        self.document.containers().iter().map(|c| c.id).collect()
    }

    fn container_rank(&self, container: ContainerId) -> Option<u32> {
        self.document.container(container).and_then(|c| c.rank)
    }

    fn set_container_rank(&mut self, container: ContainerId, rank: u32) -> Result<(), HostError> {
        self.document.set_rank(container, rank)
    }

    fn wrap_body(&mut self) -> Result<ContainerId, HostError> {
        Ok(self.document.wrap_body())
    }

    fn insert_container_after(&mut self, after: ContainerId) -> Result<ContainerId, HostError> {
        self.document.insert_container_after(after)
    }

    fn remove_container(&mut self, container: ContainerId) -> Result<(), HostError> {
        self.document.remove_container(container)
    }

    fn block_count(&self, container: ContainerId) -> Option<usize> {
        self.document.container(container).map(|c| c.blocks.len())
    }

    fn move_last_block(&mut self, from: ContainerId, to: ContainerId) -> Result<(), HostError> {
        let block = self.document.move_last_block(from, to)?;
        debug!(block = block.0, from = from.0, to = to.0, "moved block forward");
        Ok(())
    }

    fn move_first_block(&mut self, from: ContainerId, to: ContainerId) -> Result<(), HostError> {
        let block = self.document.move_first_block(from, to)?;
        debug!(block = block.0, from = from.0, to = to.0, "moved block backward");
        Ok(())
    }

    fn measure(&mut self, container: ContainerId) -> Option<f32> {
        self.measurements += 1;
        if self.take_fault() {
            return None;
        }
        let blocks = self.document.container(container)?.blocks.len();
        let content: f32 = self
            .document
            .container_blocks(container)
            .map(|b| self.breaker.block_height(b))
            .sum();
        Some(content + self.block_gap * blocks.saturating_sub(1) as f32)
    }

    fn measure_first_block(&mut self, container: ContainerId) -> Option<f32> {
        self.measurements += 1;
        if self.take_fault() {
            return None;
        }
        let block = self.document.container_blocks(container).next()?;
        Some(self.breaker.block_height(block))
    }

    fn selection_container(&self) -> Option<ContainerId> {
        self.document.container_of(self.selection?)
    }

    fn focus_container(&mut self, container: ContainerId) -> Result<(), HostError> {
        let first = self
            .document
            .container(container)
            .ok_or(HostError::NoSuchContainer(container))?
            .blocks
            .first()
            .copied()
            .ok_or(HostError::EmptyContainer(container))?;
        self.selection = Some(first);
        Ok(())
    }

    fn bind_page_changed(&mut self) {
        self.page_changed_bound = true;
    }

    fn unbind_page_changed(&mut self) {
        self.page_changed_bound = false;
    }

    fn dispatch_page_changed(&mut self, event: &PageChanged) {
        if self.page_changed_bound {
            self.dispatched.push(event.clone());
        }
    }

    fn node_changed(&mut self) {
        self.node_changes += 1;
    }
}

/// Helper for building test documents from fixed-height blocks
#[cfg(test)]
pub(crate) fn figure_document(heights: &[f32]) -> Document {
    let mut doc = Document::new();
    for height in heights {
        doc.push_body(crate::document::BlockKind::Figure { height: *height }, "");
    }
    doc
}
