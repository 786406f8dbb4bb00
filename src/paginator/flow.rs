//! Block movement between pages.
//!
//! Overflow pushes the last whole block of a page to the front of the next
//! one; back-fill pulls the first block of the next page back while it fits.
//! Every move is counted against a budget so a pass always terminates, even
//! when the host's measurements are inconsistent.

use crate::error::{HeightFault, PaginateError};
use crate::host::{ContainerId, DocumentHost};
use crate::paginator::Page;
use tracing::debug;

/// One reconciliation pass over a paginator's pages
pub(super) struct Reflow<'a, H: DocumentHost + ?Sized> {
    host: &'a mut H,
    pages: &'a mut Vec<Page>,
    max_height: f32,
    budget: usize,
    moves: usize,
}

impl<'a, H: DocumentHost + ?Sized> Reflow<'a, H> {
    pub(super) fn new(host: &'a mut H, pages: &'a mut Vec<Page>, max_height: f32, budget: usize) -> Self {
        Self {
            host,
            pages,
            max_height,
            budget,
            moves: 0,
        }
    }

    pub(super) fn moves(&self) -> usize {
        self.moves
    }

    fn fault(&self, index: usize, fault: HeightFault) -> PaginateError {
        PaginateError::InvalidPageHeight {
            rank: index as u32 + 1,
            fault,
        }
    }

    fn container(&self, index: usize) -> ContainerId {
        self.pages[index].container
    }

    fn measure(&mut self, index: usize) -> Result<f32, PaginateError> {
        let container = self.container(index);
        match self.host.measure(container) {
            Some(height) if height.is_finite() && height >= 0.0 => {
                self.pages[index].content_height = height;
                Ok(height)
            }
            Some(_) => Err(self.fault(index, HeightFault::Unmeasurable)),
            None if self.host.block_count(container).is_none() => Err(self.fault(index, HeightFault::Detached)),
            None => Err(self.fault(index, HeightFault::Unmeasurable)),
        }
    }

    fn measure_first_block(&mut self, index: usize) -> Result<f32, PaginateError> {
        match self.host.measure_first_block(self.pages[index].container) {
            Some(height) if height.is_finite() && height >= 0.0 => Ok(height),
            _ => Err(self.fault(index, HeightFault::Unmeasurable)),
        }
    }

    /// Block count of a page whose container must still be in the document
    fn block_count(&self, index: usize) -> Result<usize, PaginateError> {
        self.host
            .block_count(self.container(index))
            .ok_or_else(|| self.fault(index, HeightFault::Detached))
    }

    fn spend(&mut self, index: usize) -> Result<(), PaginateError> {
        if self.moves >= self.budget {
            return Err(self.fault(index, HeightFault::MoveBudgetExhausted));
        }
        self.moves += 1;
        Ok(())
    }

    /// Write ranks `from + 1..` onto the pages and their containers
    pub(super) fn renumber(&mut self, from: usize) -> Result<(), PaginateError> {
        for index in from..self.pages.len() {
            let rank = index as u32 + 1;
            self.pages[index].rank = rank;
            let container = self.container(index);
            if self.host.container_rank(container) != Some(rank) {
                self.host.set_container_rank(container, rank)?;
            }
        }
        Ok(())
    }

    fn insert_page_after(&mut self, index: usize) -> Result<(), PaginateError> {
        let after = self.container(index);
        let container = self.host.insert_container_after(after)?;
        self.pages
            .insert(index + 1, Page::new(index as u32 + 2, container, 0.0, self.max_height));
        debug!(rank = index + 2, container = container.0, "inserted page");
        self.renumber(index + 1)
    }

    fn remove_page(&mut self, index: usize) -> Result<(), PaginateError> {
        let page = self.pages.remove(index);
        self.host.remove_container(page.container)?;
        debug!(rank = page.rank, container = page.container.0, "removed empty page");
        self.renumber(index)
    }

    /// Resolve overflow starting at page `start`.
    ///
    /// Pages up to `settle_through` are always visited; later ones only while
    /// the previous page pushed content into them.
    pub(super) fn push_overflow(&mut self, start: usize, settle_through: usize) -> Result<(), PaginateError> {
        let mut index = start;
        while index < self.pages.len() {
            let mut pushed = false;
            loop {
                if self.measure(index)? <= self.max_height {
                    break;
                }
                // A lone block cannot be split; verification reports it
                if self.block_count(index)? <= 1 {
                    break;
                }
                if index + 1 == self.pages.len() {
                    self.insert_page_after(index)?;
                }
                self.block_count(index + 1)?;
                self.spend(index)?;
                let (from, to) = (self.container(index), self.container(index + 1));
                self.host.move_last_block(from, to)?;
                pushed = true;
            }
            if !pushed && index >= settle_through {
                break;
            }
            index += 1;
        }
        Ok(())
    }

    /// Pull content back from following pages starting at page `start`.
    ///
    /// Pages emptied by the pull are removed. Pages up to `settle_through`
    /// are always visited; later ones only while content keeps moving.
    pub(super) fn backfill(&mut self, start: usize, settle_through: usize) -> Result<(), PaginateError> {
        let mut index = start;
        while index + 1 < self.pages.len() {
            let mut pulled = false;
            while index + 1 < self.pages.len() {
                let donor = index + 1;
                if self.block_count(donor)? == 0 {
                    self.remove_page(donor)?;
                    pulled = true;
                    continue;
                }
                let height = self.measure(index)?;
                let incoming = self.measure_first_block(donor)?;
                if height + incoming > self.max_height {
                    break;
                }
                self.spend(index)?;
                let (recipient, source) = (self.container(index), self.container(donor));
                self.host.move_first_block(source, recipient)?;
                if self.measure(index)? > self.max_height {
                    self.spend(index)?;
                    self.host.move_last_block(recipient, source)?;
                    break;
                }
                pulled = true;
            }
            if !pulled && index >= settle_through {
                break;
            }
            index += 1;
        }
        Ok(())
    }

    /// Remove every empty page except a lone first one
    pub(super) fn drop_empty_pages(&mut self) -> Result<(), PaginateError> {
        let mut index = self.pages.len();
        while index > 0 {
            index -= 1;
            if self.pages.len() > 1 && self.block_count(index)? == 0 {
                self.remove_page(index)?;
            }
        }
        Ok(())
    }

    /// Re-measure every page and check the pagination invariants
    pub(super) fn verify(&mut self) -> Result<(), PaginateError> {
        let last = self.pages.len().saturating_sub(1);
        for index in 0..self.pages.len() {
            let container = self.container(index);
            let expected = index as u32 + 1;
            if self.pages[index].rank != expected || self.host.container_rank(container) != Some(expected) {
                return Err(self.fault(index, HeightFault::Detached));
            }
            let height = self.measure(index)?;
            if index < last && height > self.max_height {
                return Err(self.fault(
                    index,
                    HeightFault::Overflow {
                        height,
                        max: self.max_height,
                    },
                ));
            }
        }
        Ok(())
    }
}
