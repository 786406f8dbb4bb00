//! Block document model backing the in-memory host.
//!
//! A document is a sequence of page containers, each holding an ordered list
//! of blocks, followed by any loose body blocks not yet wrapped in a page.

mod block;
mod content;

pub use block::{Block, BlockId, BlockKind};
pub use content::{BlockModel, ContentModel, PageModel, PLACEHOLDER_CONTENT};

use crate::error::HostError;
use crate::host::ContainerId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

/// A page container and the blocks it holds, in order
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub id: ContainerId,
    /// Rank marker written by the paginator
    pub rank: Option<u32>,
    pub blocks: SmallVec<[BlockId; 8]>,
}

impl Container {
    fn new(id: ContainerId) -> Self {
        Self {
            id,
            rank: None,
            blocks: SmallVec::new(),
        }
    }
}

/// The main document structure
#[derive(Debug, Clone, Default)]
pub struct Document {
    /// Block storage indexed by id
    blocks: FxHashMap<BlockId, Block>,
    /// Page containers in document order
    containers: Vec<Container>,
    /// Blocks outside any page container
    body: Vec<BlockId>,
    /// Monotonic structural version
    version: u64,
    next_block_id: u64,
    next_container_id: u64,
}

impl Document {
    /// Create a new empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// The host's empty-paragraph placeholder document
    pub fn placeholder() -> Self {
        let mut doc = Self::new();
        doc.push_body(BlockKind::Paragraph, "");
        doc
    }

    /// Create a document of loose paragraphs, one per line
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        for line in text.split('\n') {
            doc.push_body(BlockKind::Paragraph, line);
        }
        doc
    }

    /// Get the structural version
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn containers(&self) -> &[Container] {
        &self.containers
    }

    pub fn container(&self, id: ContainerId) -> Option<&Container> {
        self.containers.iter().find(|c| c.id == id)
    }

    fn container_mut(&mut self, id: ContainerId) -> Result<&mut Container, HostError> {
        self.containers
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(HostError::NoSuchContainer(id))
    }

    fn container_index(&self, id: ContainerId) -> Result<usize, HostError> {
        self.containers
            .iter()
            .position(|c| c.id == id)
            .ok_or(HostError::NoSuchContainer(id))
    }

    pub fn body(&self) -> &[BlockId] {
        &self.body
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(&id)
    }

    /// Blocks of a container, in order
    pub fn container_blocks(&self, id: ContainerId) -> impl Iterator<Item = &Block> + '_ {
        self.container(id)
            .into_iter()
            .flat_map(|c| c.blocks.iter())
            .filter_map(|b| self.blocks.get(b))
    }

    /// Container holding a block
    pub fn container_of(&self, block: BlockId) -> Option<ContainerId> {
        self.containers
            .iter()
            .find(|c| c.blocks.contains(&block))
            .map(|c| c.id)
    }

    /// Total number of blocks, wrapped or not
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    fn alloc_block(&mut self, kind: BlockKind, text: &str) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.insert(id, Block::new(id, kind, text));
        id
    }

    fn alloc_container(&mut self) -> Container {
        let id = ContainerId(self.next_container_id);
        self.next_container_id += 1;
        Container::new(id)
    }

    /// Append a loose block to the body
    pub fn push_body(&mut self, kind: BlockKind, text: &str) -> BlockId {
        let id = self.alloc_block(kind, text);
        self.body.push(id);
        self.version += 1;
        id
    }

    /// Append a block at the end of a container
    pub fn push_block(&mut self, container: ContainerId, kind: BlockKind, text: &str) -> Result<BlockId, HostError> {
        self.container_index(container)?;
        let id = self.alloc_block(kind, text);
        self.container_mut(container)?.blocks.push(id);
        self.version += 1;
        Ok(id)
    }

    /// Insert a block right after another one, in the same container
    pub fn insert_block_after(&mut self, after: BlockId, kind: BlockKind, text: &str) -> Option<BlockId> {
        let container = self.container_of(after)?;
        let id = self.alloc_block(kind, text);
        let c = self.containers.iter_mut().find(|c| c.id == container)?;
        let pos = c.blocks.iter().position(|b| *b == after)?;
        c.blocks.insert(pos + 1, id);
        self.version += 1;
        Some(id)
    }

    /// Delete a block wherever it lives
    pub fn remove_block(&mut self, id: BlockId) -> Option<Block> {
        let block = self.blocks.remove(&id)?;
        for c in &mut self.containers {
            c.blocks.retain(|b| *b != id);
        }
        self.body.retain(|b| *b != id);
        self.version += 1;
        Some(block)
    }

    /// Wrap all body blocks into a new first container.
    ///
    /// An empty body still gets a container holding one empty paragraph.
    pub fn wrap_body(&mut self) -> ContainerId {
        if self.body.is_empty() {
            let id = self.alloc_block(BlockKind::Paragraph, "");
            self.body.push(id);
        }
        let mut container = self.alloc_container();
        container.blocks.extend(self.body.drain(..));
        let id = container.id;
        self.containers.insert(0, container);
        self.version += 1;
        id
    }

    /// Append an empty container at the end of the document
    pub fn push_container(&mut self) -> ContainerId {
        let container = self.alloc_container();
        let id = container.id;
        self.containers.push(container);
        self.version += 1;
        id
    }

    pub fn insert_container_after(&mut self, after: ContainerId) -> Result<ContainerId, HostError> {
        let index = self.container_index(after)?;
        let container = self.alloc_container();
        let id = container.id;
        self.containers.insert(index + 1, container);
        self.version += 1;
        Ok(id)
    }

    /// Remove a container; its blocks are deleted with it
    pub fn remove_container(&mut self, id: ContainerId) -> Result<(), HostError> {
        let index = self.container_index(id)?;
        let container = self.containers.remove(index);
        for block in container.blocks {
            self.blocks.remove(&block);
        }
        self.version += 1;
        Ok(())
    }

    /// Strip a container's page marker, merging its blocks into the previous
    /// container (or the body when it is the first)
    pub fn unwrap_container(&mut self, id: ContainerId) -> Result<(), HostError> {
        let index = self.container_index(id)?;
        let container = self.containers.remove(index);
        match index.checked_sub(1).and_then(|i| self.containers.get_mut(i)) {
            Some(prev) => prev.blocks.extend(container.blocks),
            None => {
                let mut blocks: Vec<_> = container.blocks.into_iter().collect();
                blocks.append(&mut self.body);
                self.body = blocks;
            }
        }
        self.version += 1;
        Ok(())
    }

    pub fn set_rank(&mut self, id: ContainerId, rank: u32) -> Result<(), HostError> {
        let container = self.container_mut(id)?;
        if container.rank != Some(rank) {
            container.rank = Some(rank);
            self.version += 1;
        }
        Ok(())
    }

    /// Move the last block of `from` to the front of `to`
    pub fn move_last_block(&mut self, from: ContainerId, to: ContainerId) -> Result<BlockId, HostError> {
        self.container_index(to)?;
        let block = self
            .container_mut(from)?
            .blocks
            .pop()
            .ok_or(HostError::EmptyContainer(from))?;
        self.container_mut(to)?.blocks.insert(0, block);
        self.version += 1;
        Ok(block)
    }

    /// Move the first block of `from` to the end of `to`
    pub fn move_first_block(&mut self, from: ContainerId, to: ContainerId) -> Result<BlockId, HostError> {
        self.container_index(to)?;
        let source = self.container_mut(from)?;
        if source.blocks.is_empty() {
            return Err(HostError::EmptyContainer(from));
        }
        let block = source.blocks.remove(0);
        self.container_mut(to)?.blocks.push(block);
        self.version += 1;
        Ok(block)
    }

    /// Snapshot into the serializable content model
    pub fn to_model(&self) -> ContentModel {
        let block_model = |id: &BlockId| self.blocks.get(id).map(BlockModel::from);
        ContentModel {
            pages: self
                .containers
                .iter()
                .map(|c| PageModel {
                    id: Some(c.id.0),
                    rank: c.rank,
                    blocks: c.blocks.iter().filter_map(block_model).collect(),
                })
                .collect(),
            body: self.body.iter().filter_map(block_model).collect(),
        }
    }

    /// Rebuild from a content model, keeping ids that are present
    pub fn from_model(model: ContentModel) -> Self {
        let mut doc = Self::new();

        let max_container = model.pages.iter().filter_map(|p| p.id).max();
        let max_block = model
            .pages
            .iter()
            .flat_map(|p| p.blocks.iter())
            .chain(model.body.iter())
            .filter_map(|b| b.id)
            .max();
        doc.next_container_id = max_container.map_or(0, |id| id + 1);
        doc.next_block_id = max_block.map_or(0, |id| id + 1);

        for page in model.pages {
            // A repeated page id (e.g. a pasted page) gets a fresh one
            let mut container = match page.id {
                Some(id) if !doc.containers.iter().any(|c| c.id == ContainerId(id)) => {
                    Container::new(ContainerId(id))
                }
                _ => doc.alloc_container(),
            };
            container.rank = page.rank;
            for block in page.blocks {
                let id = doc.insert_model_block(block);
                container.blocks.push(id);
            }
            doc.containers.push(container);
        }

        for block in model.body {
            let id = doc.insert_model_block(block);
            doc.body.push(id);
        }

        doc
    }

    fn insert_model_block(&mut self, model: BlockModel) -> BlockId {
        match model.id {
            Some(raw) if !self.blocks.contains_key(&BlockId(raw)) => {
                let id = BlockId(raw);
                self.blocks.insert(id, Block::new(id, model.kind, model.text));
                id
            }
            _ => self.alloc_block(model.kind, &model.text),
        }
    }
}
