//! Pagination engine: the ordered pages of a document and their reconciliation

mod flow;
mod page;

pub use page::Page;

use crate::config::PaginateConfig;
use crate::error::{HeightFault, PaginateError};
use crate::host::{ContainerId, DocumentHost, PageChanged};
use crate::metrics::PageMetrics;
use flow::Reflow;
use tracing::{debug, info};

/// Owns the page sequence of one editing session segment
#[derive(Debug, Clone)]
pub struct Paginator {
    /// Maximum content height per page
    max_height: f32,
    /// Block moves allowed per pass
    max_moves: usize,
    pages: Vec<Page>,
    /// Container of the focused page
    focused: Option<ContainerId>,
    /// Rank last announced through a page change
    reported_rank: Option<u32>,
    destroyed: bool,
}

impl Paginator {
    pub fn new(max_height: f32, max_moves: usize) -> Self {
        Self {
            max_height,
            max_moves,
            pages: Vec::new(),
            focused: None,
            reported_rank: None,
            destroyed: false,
        }
    }

    pub fn from_metrics(metrics: &PageMetrics, config: &PaginateConfig) -> Self {
        Self::new(metrics.max_content_height(), config.max_block_moves)
    }

    pub fn max_height(&self) -> f32 {
        self.max_height
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by 1-based rank
    pub fn page(&self, rank: u32) -> Option<&Page> {
        rank.checked_sub(1).and_then(|i| self.pages.get(i as usize))
    }

    pub fn page_for_container(&self, container: ContainerId) -> Option<&Page> {
        self.pages.iter().find(|p| p.container == container)
    }

    /// The focused page, if any
    pub fn current_page(&self) -> Option<&Page> {
        self.focused.and_then(|container| self.page_for_container(container))
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Scan the document for page containers (creating the first one if none
    /// exist) and bring every page within its maximum height.
    ///
    /// On an already valid document this changes nothing.
    pub fn init<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> Result<(), PaginateError> {
        if self.destroyed {
            return Err(PaginateError::Destroyed);
        }
        if !(self.max_height > 0.0) {
            return Err(PaginateError::InvalidPageHeight {
                rank: 1,
                fault: HeightFault::ZeroUsableHeight,
            });
        }

        let mut containers = host.page_containers();
        if containers.is_empty() {
            containers.push(host.wrap_body()?);
        }
        self.pages = containers
            .into_iter()
            .enumerate()
            .map(|(i, container)| Page::new(i as u32 + 1, container, 0.0, self.max_height))
            .collect();

        let mut reflow = Reflow::new(host, &mut self.pages, self.max_height, self.max_moves);
        reflow.renumber(0)?;
        reflow.push_overflow(0, usize::MAX)?;
        reflow.backfill(0, usize::MAX)?;
        reflow.drop_empty_pages()?;
        reflow.verify()?;
        let moves = reflow.moves();

        self.forget_removed_focus();
        info!(pages = self.pages.len(), moves, "paginator initialized");
        Ok(())
    }

    /// Incremental reconciliation after a content mutation.
    ///
    /// Re-measures the edited page, pushes overflow forward, pulls content
    /// back into pages with room, and drops pages left empty. Does nothing
    /// when no page changed size.
    pub fn watch_page<H: DocumentHost + ?Sized>(&mut self, host: &mut H) -> Result<(), PaginateError> {
        if self.destroyed {
            return Err(PaginateError::Destroyed);
        }
        if self.pages.is_empty() {
            return Ok(());
        }

        self.check_binding(host)?;

        let edited = host
            .selection_container()
            .and_then(|c| self.pages.iter().position(|p| p.container == c))
            .or_else(|| self.current_page().map(|page| page.rank as usize - 1))
            .unwrap_or(0)
            .min(self.pages.len() - 1);

        let mut reflow = Reflow::new(host, &mut self.pages, self.max_height, self.max_moves);
        reflow.push_overflow(edited, edited)?;
        reflow.backfill(edited.saturating_sub(1), edited)?;
        reflow.drop_empty_pages()?;
        reflow.verify()?;
        let moves = reflow.moves();

        self.forget_removed_focus();
        if moves > 0 {
            debug!(edited = edited + 1, moves, pages = self.pages.len(), "page watch moved blocks");
        }
        Ok(())
    }

    /// The host's page containers must still be exactly our pages, in order
    fn check_binding<H: DocumentHost + ?Sized>(&self, host: &H) -> Result<(), PaginateError> {
        let containers = host.page_containers();
        let mismatch = self
            .pages
            .iter()
            .zip(containers.iter())
            .position(|(page, container)| {
                page.container != *container || host.container_rank(*container) != Some(page.rank)
            })
            .or_else(|| (containers.len() != self.pages.len()).then(|| containers.len().min(self.pages.len())));

        match mismatch {
            Some(index) => Err(PaginateError::InvalidPageHeight {
                rank: index as u32 + 1,
                fault: HeightFault::Detached,
            }),
            None => Ok(()),
        }
    }

    /// Make the page holding the host's selection the focused page.
    ///
    /// Returns the page change when the focused rank differs from the last
    /// announced one; the change is also dispatched on the host document.
    pub fn goto_focused_page<H: DocumentHost + ?Sized>(
        &mut self,
        host: &mut H,
    ) -> Result<Option<PageChanged>, PaginateError> {
        if self.pages.is_empty() {
            return Ok(None);
        }
        let Some(container) = host.selection_container() else {
            return Ok(None);
        };
        let page = self
            .page_for_container(container)
            .cloned()
            .ok_or(PaginateError::UnknownContainer(container))?;

        self.focused = Some(page.container);
        if self.reported_rank == Some(page.rank) {
            return Ok(None);
        }

        let event = PageChanged {
            from_rank: self.reported_rank,
            to_page: page,
        };
        self.reported_rank = Some(event.to_page.rank);
        debug!(from = ?event.from_rank, to = event.to_page.rank, "focused page changed");
        host.dispatch_page_changed(&event);
        Ok(Some(event))
    }

    /// Release every page reference. Safe to call before `init()`.
    pub fn destroy(&mut self) {
        self.pages.clear();
        self.focused = None;
        self.reported_rank = None;
        self.destroyed = true;
    }

    /// A focused page removed by a reflow is no longer focused
    fn forget_removed_focus(&mut self) {
        if self.current_page().is_none() {
            self.focused = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{BlockKind, Document};
    use crate::host::memory::figure_document;
    use crate::host::MemoryHost;
    use crate::layout::{FontMetrics, LineBreaker};

    const MAX: f32 = 250.0;

    fn host(doc: Document) -> MemoryHost {
        MemoryHost::new(doc, LineBreaker::new(FontMetrics::monospace(10.0, 8.0), 400.0))
    }

    fn paginator() -> Paginator {
        Paginator::new(MAX, 10_000)
    }

    fn assert_invariants(paginator: &Paginator, host: &MemoryHost) {
        let containers = host.page_containers();
        assert_eq!(containers.len(), paginator.page_count());
        for (i, page) in paginator.pages().iter().enumerate() {
            assert_eq!(page.rank, i as u32 + 1);
            assert_eq!(page.container, containers[i]);
            assert_eq!(host.container_rank(page.container), Some(page.rank));
            if i + 1 < paginator.page_count() {
                assert!(!page.overflows(), "page {} overflows", page.rank);
            }
        }
    }

    fn block_layout(host: &MemoryHost) -> Vec<usize> {
        host.document()
            .containers()
            .iter()
            .map(|c| c.blocks.len())
            .collect()
    }

    #[test]
    fn test_init_wraps_body() {
        let mut host = host(figure_document(&[100.0, 100.0]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();

        assert_eq!(paginator.page_count(), 1);
        assert_eq!(paginator.pages()[0].content_height, 200.0);
        assert!(host.document().body().is_empty());
        assert_invariants(&paginator, &host);
    }

    #[test]
    fn test_init_empty_document() {
        let mut host = host(Document::new());
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();
        assert_eq!(paginator.page_count(), 1);
    }

    #[test]
    fn test_init_splits_exactly() {
        // 10 blocks of 100px with 250px pages: two blocks per page
        let mut host = host(figure_document(&[100.0; 10]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();

        assert_eq!(paginator.page_count(), 5);
        assert_eq!(block_layout(&host), vec![2; 5]);
        assert_invariants(&paginator, &host);
    }

    #[test]
    fn test_init_is_idempotent() {
        let mut host = host(figure_document(&[100.0, 120.0, 90.0, 200.0, 30.0]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();
        let pages = paginator.pages().to_vec();
        let version = host.document().version();

        paginator.init(&mut host).unwrap();
        assert_eq!(paginator.pages(), pages.as_slice());
        assert_eq!(host.document().version(), version);
    }

    #[test]
    fn test_init_renumbers_ranks() {
        let mut doc = figure_document(&[100.0, 100.0]);
        let first = doc.wrap_body();
        let second = doc.insert_container_after(first).unwrap();
        doc.move_last_block(first, second).unwrap();
        doc.set_rank(first, 7).unwrap();

        let mut host = host(doc);
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();

        // Both fit on one page, the second container is merged away
        assert_eq!(paginator.page_count(), 1);
        assert_eq!(host.container_rank(first), Some(1));
        assert_invariants(&paginator, &host);
    }

    #[test]
    fn test_zero_usable_height() {
        let mut host = host(figure_document(&[10.0]));
        let mut paginator = Paginator::new(0.0, 100);
        let err = paginator.init(&mut host).unwrap_err();
        assert!(matches!(
            err,
            PaginateError::InvalidPageHeight { rank: 1, fault: HeightFault::ZeroUsableHeight }
        ));
    }

    #[test]
    fn test_oversized_block_before_last_page() {
        let mut host = host(figure_document(&[400.0, 100.0]));
        let mut paginator = paginator();
        let err = paginator.init(&mut host).unwrap_err();
        assert!(matches!(
            err,
            PaginateError::InvalidPageHeight { rank: 1, fault: HeightFault::Overflow { .. } }
        ));

        // Alone on the last page it is tolerated
        let mut host = self::host(figure_document(&[100.0, 400.0]));
        let mut paginator = self::paginator();
        paginator.init(&mut host).unwrap();
        assert_eq!(paginator.page_count(), 2);
    }

    #[test]
    fn test_move_budget() {
        let mut host = host(figure_document(&[100.0; 10]));
        let mut paginator = Paginator::new(MAX, 3);
        let err = paginator.init(&mut host).unwrap_err();
        assert!(matches!(
            err,
            PaginateError::InvalidPageHeight { fault: HeightFault::MoveBudgetExhausted, .. }
        ));
    }

    #[test]
    fn test_watch_without_changes_is_noop() {
        let mut host = host(figure_document(&[100.0; 5]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();
        let version = host.document().version();

        paginator.watch_page(&mut host).unwrap();
        paginator.watch_page(&mut host).unwrap();
        assert_eq!(host.document().version(), version);
    }

    #[test]
    fn test_watch_before_init_is_noop() {
        let mut host = host(figure_document(&[100.0]));
        let mut paginator = paginator();
        paginator.watch_page(&mut host).unwrap();
        assert_eq!(paginator.page_count(), 0);
    }

    #[test]
    fn test_watch_pushes_overflow_forward() {
        let mut host = host(figure_document(&[100.0, 100.0, 100.0]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();
        assert_eq!(block_layout(&host), vec![2, 1]);

        // Type a new block on the first page
        let first = paginator.pages()[0].container;
        let new_block = host
            .document_mut()
            .push_block(first, BlockKind::Figure { height: 60.0 }, "")
            .unwrap();
        host.select_block(new_block);
        paginator.watch_page(&mut host).unwrap();

        // The new last block of page 1 moves to the front of page 2
        assert_eq!(block_layout(&host), vec![2, 2]);
        assert_eq!(host.selection_container(), Some(paginator.pages()[1].container));
        assert_invariants(&paginator, &host);
    }

    #[test]
    fn test_watch_cascades_and_creates_pages() {
        let mut host = host(figure_document(&[100.0; 4]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();
        assert_eq!(block_layout(&host), vec![2, 2]);

        let first = paginator.pages()[0].container;
        let block = host.document().container(first).unwrap().blocks[0];
        host.document_mut()
            .insert_block_after(block, BlockKind::Figure { height: 100.0 }, "")
            .unwrap();
        host.select_block(block);
        paginator.watch_page(&mut host).unwrap();

        assert_eq!(block_layout(&host), vec![2, 2, 1]);
        assert_invariants(&paginator, &host);
    }

    #[test]
    fn test_watch_backfills_and_removes_empty_pages() {
        let mut host = host(figure_document(&[100.0; 5]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();
        assert_eq!(block_layout(&host), vec![2, 2, 1]);

        // Delete both blocks of page 1
        let first = paginator.pages()[0].container;
        let blocks: Vec<_> = host.document().container(first).unwrap().blocks.to_vec();
        for block in blocks {
            host.document_mut().remove_block(block);
        }
        host.focus_container(paginator.pages()[1].container).unwrap();
        paginator.watch_page(&mut host).unwrap();

        assert_eq!(block_layout(&host), vec![2, 1]);
        assert_invariants(&paginator, &host);
    }

    #[test]
    fn test_watch_backfill_keeps_blocks_whole() {
        let mut host = host(figure_document(&[100.0, 100.0, 200.0]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();
        assert_eq!(block_layout(&host), vec![2, 1]);

        // 50px of room on page 1 is not enough for the 200px block
        let first = paginator.pages()[0].container;
        let block = host.document().container(first).unwrap().blocks[1];
        host.document_mut().remove_block(block);
        host.focus_container(first).unwrap();
        let version = host.document().version();
        paginator.watch_page(&mut host).unwrap();

        assert_eq!(block_layout(&host), vec![1, 1]);
        assert_eq!(host.document().version(), version);
    }

    #[test]
    fn test_watch_backfill_moves_block_back_on_live_overflow() {
        let mut host = host(figure_document(&[120.0; 3]));
        // Two moves per watch: the pull and the move back
        let mut paginator = Paginator::new(MAX, 2);
        paginator.init(&mut host).unwrap();
        assert_eq!(block_layout(&host), vec![2, 1]);

        let first = paginator.pages()[0].container;
        let second = paginator.pages()[1].container;
        let block = host.document().container(first).unwrap().blocks[1];
        host.document_mut().remove_block(block);
        let donor_block = host.document().container(second).unwrap().blocks[0];

        // 120 + 120 fits alone, but the gap between them does not
        host.set_block_gap(20.0);
        host.focus_container(first).unwrap();
        let version = host.document().version();
        paginator.watch_page(&mut host).unwrap();

        assert_eq!(block_layout(&host), vec![1, 1]);
        assert_eq!(host.document().container_of(donor_block), Some(second));
        assert_eq!(host.document().version(), version + 2);
        assert_invariants(&paginator, &host);

        // Without room for the second move the pass fails
        let mut tight = Paginator::new(MAX, 1);
        let err = tight.init(&mut host).unwrap_err();
        assert!(matches!(
            err,
            PaginateError::InvalidPageHeight { fault: HeightFault::MoveBudgetExhausted, .. }
        ));
    }

    #[test]
    fn test_focus_follows_renumbered_page() {
        let mut host = host(figure_document(&[100.0; 5]));
        host.bind_page_changed();
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();
        assert_eq!(block_layout(&host), vec![2, 2, 1]);

        let third = paginator.pages()[2].container;
        host.focus_container(third).unwrap();
        paginator.goto_focused_page(&mut host).unwrap();
        assert_eq!(paginator.current_page().map(|p| p.rank), Some(3));

        // Emptying page 1 removes it and renumbers the rest
        let first = paginator.pages()[0].container;
        let blocks: Vec<_> = host.document().container(first).unwrap().blocks.to_vec();
        for block in blocks {
            host.document_mut().remove_block(block);
        }
        paginator.watch_page(&mut host).unwrap();
        assert_eq!(paginator.page_count(), 2);

        let current = paginator.current_page().unwrap();
        assert_eq!(current.container, third);
        assert_eq!(current.rank, 2);

        let event = paginator.goto_focused_page(&mut host).unwrap().unwrap();
        assert_eq!(event.from_rank, Some(3));
        assert_eq!(event.to_page.rank, 2);
    }

    #[test]
    fn test_focus_dropped_with_removed_page() {
        let mut host = host(figure_document(&[100.0; 5]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();

        let second = paginator.pages()[1].container;
        host.focus_container(second).unwrap();
        paginator.goto_focused_page(&mut host).unwrap();

        // Page 1 pulls every block of page 2 back, page 2 goes away
        let first = paginator.pages()[0].container;
        let blocks: Vec<_> = host.document().container(first).unwrap().blocks.to_vec();
        for block in blocks {
            host.document_mut().remove_block(block);
        }
        paginator.watch_page(&mut host).unwrap();
        assert!(paginator.page_for_container(second).is_none());
        assert!(paginator.current_page().is_none());

        let event = paginator.goto_focused_page(&mut host).unwrap().unwrap();
        assert_eq!(event.from_rank, Some(2));
        assert_eq!(event.to_page.rank, 1);
        assert_eq!(
            paginator.current_page().map(|p| p.container),
            host.selection_container()
        );
    }

    #[test]
    fn test_watch_detects_detached_container() {
        let mut host = host(figure_document(&[100.0; 4]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();

        let second = paginator.pages()[1].container;
        host.document_mut().unwrap_container(second).unwrap();
        let err = paginator.watch_page(&mut host).unwrap_err();
        assert!(matches!(
            err,
            PaginateError::InvalidPageHeight { rank: 2, fault: HeightFault::Detached }
        ));

        // A fresh init rebuilds a consistent structure
        paginator.init(&mut host).unwrap();
        assert_eq!(block_layout(&host), vec![2, 2]);
        assert_invariants(&paginator, &host);
    }

    #[test]
    fn test_watch_unmeasurable() {
        let mut host = host(figure_document(&[100.0; 3]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();

        host.set_measure_fault(crate::host::MeasureFault::Next(1));
        let err = paginator.watch_page(&mut host).unwrap_err();
        assert!(matches!(
            err,
            PaginateError::InvalidPageHeight { fault: HeightFault::Unmeasurable, .. }
        ));
        paginator.watch_page(&mut host).unwrap();
    }

    #[test]
    fn test_goto_focused_page() {
        let mut host = host(figure_document(&[100.0; 6]));
        host.bind_page_changed();
        let mut paginator = paginator();
        assert!(paginator.goto_focused_page(&mut host).unwrap().is_none());
        paginator.init(&mut host).unwrap();
        assert!(paginator.current_page().is_none());

        let second = paginator.pages()[1].container;
        host.focus_container(second).unwrap();
        let event = paginator.goto_focused_page(&mut host).unwrap().unwrap();
        assert_eq!(event.from_rank, None);
        assert_eq!(event.to_page.rank, 2);
        assert_eq!(paginator.current_page().map(|p| p.rank), Some(2));

        // Same page again: no notification
        assert!(paginator.goto_focused_page(&mut host).unwrap().is_none());
        assert_eq!(host.dispatched().len(), 1);
        assert_eq!(host.dispatched()[0].to_page.rank, 2);
    }

    #[test]
    fn test_goto_unknown_container() {
        let mut host = host(figure_document(&[100.0]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();

        let stray = host.document_mut().push_container();
        let block = host
            .document_mut()
            .push_block(stray, BlockKind::Paragraph, "stray")
            .unwrap();
        host.select_block(block);
        assert!(matches!(
            paginator.goto_focused_page(&mut host),
            Err(PaginateError::UnknownContainer(c)) if c == stray
        ));
    }

    #[test]
    fn test_destroy() {
        let mut never_initialized = paginator();
        never_initialized.destroy();
        assert!(never_initialized.is_destroyed());

        let mut host = host(figure_document(&[100.0]));
        let mut paginator = paginator();
        paginator.init(&mut host).unwrap();
        paginator.destroy();
        assert_eq!(paginator.page_count(), 0);
        assert!(paginator.current_page().is_none());
        assert!(matches!(paginator.init(&mut host), Err(PaginateError::Destroyed)));
    }
}
