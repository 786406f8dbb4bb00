//! Event-driven supervisor of a paginated editing session.
//!
//! The controller owns the host and the current [`Paginator`] instance. Host
//! notifications arrive through [`ReconciliationController::handle_event`];
//! work that must wait for the host to settle goes through a virtual-time
//! [`DeferredQueue`] driven by [`ReconciliationController::advance`].
//!
//! Every paginator instance gets a new generation. Deferred tasks remember
//! the generation that scheduled them and do nothing once it is superseded,
//! so a late `init()` never touches a destroyed or replaced instance.

pub mod observer;
pub mod scheduler;

pub use observer::{EngineEvent, EngineObserver, EngineState, SkipReason};
pub use scheduler::{Deferred, DeferredQueue, DeferredTask};

use crate::config::PaginateConfig;
use crate::error::PaginateError;
use crate::host::{ContentChange, ContainerId, DocumentHost, HostEvent, PageChanged};
use crate::metrics::PageMetrics;
use crate::navigation::{NavCommand, NavigationUi};
use crate::paginator::{Page, Paginator};
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct ReconciliationController<H: DocumentHost> {
    host: H,
    config: PaginateConfig,
    metrics: PageMetrics,
    state: EngineState,
    paginator: Option<Paginator>,
    generation: u64,
    watch_enabled: bool,
    page_changed_bound: bool,
    retry_count: u32,
    queue: DeferredQueue,
    navigation: NavigationUi,
    observer: Option<Box<dyn EngineObserver>>,
}

impl<H: DocumentHost> ReconciliationController<H> {
    /// Fails with [`PaginateError::InvalidConfiguration`] on an unknown page
    /// format or orientation, or margins that leave no room for content.
    pub fn new(host: H, config: PaginateConfig) -> Result<Self, PaginateError> {
        let metrics = PageMetrics::from_config(&config)?;
        Ok(Self {
            host,
            config,
            metrics,
            state: EngineState::Uninitialized,
            paginator: None,
            generation: 0,
            watch_enabled: false,
            page_changed_bound: false,
            retry_count: 0,
            queue: DeferredQueue::new(),
            navigation: NavigationUi::new(),
            observer: None,
        })
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == EngineState::Listening
    }

    pub fn is_watch_enabled(&self) -> bool {
        self.watch_enabled
    }

    /// Recovery attempts spent on the mutation being processed
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &PaginateConfig {
        &self.config
    }

    pub fn metrics(&self) -> &PageMetrics {
        &self.metrics
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn paginator(&self) -> Option<&Paginator> {
        self.paginator.as_ref()
    }

    pub fn navigation(&self) -> &NavigationUi {
        &self.navigation
    }

    pub fn page_count(&self) -> usize {
        self.paginator.as_ref().map_or(0, Paginator::page_count)
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.paginator.as_ref().and_then(Paginator::current_page)
    }

    pub fn px_to_mm(&self, px: f32) -> f32 {
        self.metrics.px_to_mm(px)
    }

    pub fn set_observer<O: EngineObserver + 'static>(&mut self, observer: O) {
        self.observer = Some(Box::new(observer));
    }

    /// Allow content changes to trigger page watches again
    pub fn enable_watch(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        self.watch_enabled = true;
        self.emit(EngineEvent::WatchToggled { enabled: true });
    }

    /// Stop reacting to content changes, e.g. while headers are edited
    pub fn disable_watch(&mut self) {
        if self.state == EngineState::Destroyed {
            return;
        }
        self.watch_enabled = false;
        self.emit(EngineEvent::WatchToggled { enabled: false });
    }

    pub fn handle_event(&mut self, event: HostEvent) -> Result<(), PaginateError> {
        if self.state == EngineState::Destroyed {
            debug!(?event, "ignoring event after removal");
            return Ok(());
        }
        match event {
            HostEvent::Ready => {
                self.on_ready();
                Ok(())
            }
            HostEvent::Removed => {
                self.on_removed();
                Ok(())
            }
            HostEvent::ContentChanged(change) => self.on_content_changed(change),
            HostEvent::FullContentReplaced { content } => {
                self.on_full_content_replaced(content.as_deref());
                Ok(())
            }
            HostEvent::SelectionContextChanged { page_container } => {
                self.on_selection_changed(page_container);
                Ok(())
            }
            HostEvent::PageChanged(changed) => {
                self.on_page_changed(&changed);
                Ok(())
            }
        }
    }

    /// Navigate with the page controls. Returns the rank navigated to.
    pub fn navigate(&mut self, command: NavCommand) -> Option<u32> {
        if !self.is_listening() {
            return None;
        }
        let target = self.navigation.target_rank(command)?;
        let container = self.paginator.as_ref()?.page(target)?.container;
        if let Err(err) = self.host.focus_container(container) {
            info!(error = %err, rank = target, "can't navigate to page");
            self.emit(EngineEvent::NavigationFailed { error: err.to_string() });
            return None;
        }
        self.goto_focused();
        self.current_page().map(|page| page.rank)
    }

    /// Run every deferred task due within `elapsed` of the current clock
    pub fn advance(&mut self, elapsed: Duration) -> Result<(), PaginateError> {
        let deadline = self.queue.now() + elapsed;
        while let Some(task) = self.queue.pop_due(deadline) {
            self.run_task(task)?;
        }
        self.queue.settle(deadline);
        Ok(())
    }

    /// Run deferred tasks until none are pending
    pub fn run_until_idle(&mut self) -> Result<(), PaginateError> {
        while let Some(due) = self.queue.last_due() {
            let elapsed = due.saturating_sub(self.queue.now());
            self.advance(elapsed)?;
        }
        Ok(())
    }

    fn on_ready(&mut self) {
        if self.state != EngineState::Uninitialized || self.paginator.is_some() {
            debug!("host ready fired twice");
            return;
        }
        self.new_paginator();
        self.host.bind_page_changed();
        self.page_changed_bound = true;
        self.transition(EngineState::Initializing);
        self.schedule(self.config.ready_delay_ms, DeferredTask::InitialInit);
    }

    fn on_removed(&mut self) {
        self.navigation.detach();
        if self.page_changed_bound {
            self.host.unbind_page_changed();
            self.page_changed_bound = false;
        }
        if let Some(paginator) = self.paginator.as_mut() {
            paginator.destroy();
        }
        self.retry_count = 0;
        self.watch_enabled = false;
        self.generation += 1;
        self.transition(EngineState::Destroyed);
    }

    fn on_content_changed(&mut self, change: Option<ContentChange>) -> Result<(), PaginateError> {
        if let Some(change) = change {
            self.restore_overwritten_content(&change)?;
        }

        if !self.is_listening() {
            self.emit(EngineEvent::WatchSkipped {
                reason: SkipReason::NotListening,
            });
            return Ok(());
        }
        if !self.watch_enabled {
            self.emit(EngineEvent::WatchSkipped {
                reason: SkipReason::WatchDisabled,
            });
            return Ok(());
        }
        self.watch_with_recovery()
    }

    /// Some hosts overwrite paginated content with an empty placeholder
    /// paragraph. Put the previous content back when that happens.
    fn restore_overwritten_content(&mut self, change: &ContentChange) -> Result<(), PaginateError> {
        if self.paginator.is_none()
            || !self.host.is_placeholder_content(&change.new_content)
            || self.host.count_page_containers(&change.previous_content) == 0
        {
            return Ok(());
        }

        warn!("content was replaced by an empty placeholder, restoring previous pages");
        self.host.set_content(&change.previous_content)?;
        self.emit(EngineEvent::ContentRestored);
        self.init_paginator()?;
        self.sync_focus();
        Ok(())
    }

    fn on_full_content_replaced(&mut self, content: Option<&str>) {
        if self.paginator.is_none() {
            debug!("content replaced before the host was ready");
            return;
        }
        debug!(len = content.map_or(0, str::len), "full content replaced");

        self.transition(EngineState::Uninitialized);
        self.new_paginator();
        self.transition(EngineState::Initializing);
        self.schedule(self.config.replace_settle_ms, DeferredTask::ReplaceInit);
    }

    fn on_selection_changed(&mut self, page_container: Option<ContainerId>) {
        if page_container.is_some() && self.is_listening() && self.watch_enabled {
            self.goto_focused();
        }
    }

    fn on_page_changed(&mut self, changed: &PageChanged) {
        if !self.page_changed_bound {
            return;
        }
        let page_count = self.page_count();
        self.navigation.update(changed.to_page.rank, page_count);
        self.host.node_changed();
        self.emit(EngineEvent::PageChanged {
            from_rank: changed.from_rank,
            to_rank: changed.to_page.rank,
        });
    }

    /// Watch the edited page, re-initializing and retrying on invalid page
    /// heights until the attempt budget for this mutation is spent.
    fn watch_with_recovery(&mut self) -> Result<(), PaginateError> {
        loop {
            let result = match self.paginator.as_mut() {
                Some(paginator) => paginator.watch_page(&mut self.host),
                None => return Ok(()),
            };
            let err = match result {
                Ok(()) => {
                    self.retry_count = 0;
                    self.sync_focus();
                    return Ok(());
                }
                Err(err) if err.is_invalid_page_height() => err,
                Err(err) => return Err(err),
            };

            self.retry_count += 1;
            let attempt = self.retry_count;
            warn!(attempt, error = %err, "re-initializing paginator then watching again");
            self.emit(EngineEvent::RecoveryAttempt {
                attempt,
                error: err.to_string(),
            });
            self.init_paginator()?;

            if attempt >= self.config.max_watch_retries {
                warn!(attempts = attempt, "giving up on page reconciliation for this change");
                self.retry_count = 0;
                self.emit(EngineEvent::RecoveryAbandoned { attempts: attempt });
                self.sync_focus();
                return Ok(());
            }
        }
    }

    fn run_task(&mut self, deferred: Deferred) -> Result<(), PaginateError> {
        if deferred.generation != self.generation {
            debug!(task = ?deferred.task, generation = deferred.generation, "dropping stale task");
            self.emit(EngineEvent::StaleTaskDropped {
                task: deferred.task,
                generation: deferred.generation,
            });
            return Ok(());
        }

        match deferred.task {
            DeferredTask::InitialInit => {
                self.init_paginator()?;
                self.goto_focused();
                self.attach_navigation();
                self.start_listening();
            }
            DeferredTask::ReplaceInit => {
                self.init_paginator()?;
                self.schedule(self.config.replace_focus_ms, DeferredTask::ReplaceFocus);
            }
            DeferredTask::ReplaceFocus => {
                self.goto_focused();
                self.attach_navigation();
                self.start_listening();
            }
        }
        Ok(())
    }

    /// Invalid page heights are left for the next watch to recover
    fn init_paginator(&mut self) -> Result<(), PaginateError> {
        let Some(paginator) = self.paginator.as_mut() else {
            return Ok(());
        };
        match paginator.init(&mut self.host) {
            Ok(()) => Ok(()),
            Err(err) if err.is_invalid_page_height() => {
                warn!(error = %err, "paginator init left an invalid page");
                self.emit(EngineEvent::InitFailed { error: err.to_string() });
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Navigation failures never reach the caller
    fn goto_focused(&mut self) {
        let Some(paginator) = self.paginator.as_mut() else {
            return;
        };
        match paginator.goto_focused_page(&mut self.host) {
            Ok(Some(changed)) => self.on_page_changed(&changed),
            Ok(None) => {}
            Err(err) => {
                info!(error = %err, "can't go to focused page now");
                self.emit(EngineEvent::NavigationFailed { error: err.to_string() });
            }
        }
    }

    fn attach_navigation(&mut self) {
        if !self.navigation.is_attached() {
            self.navigation.attach(self.page_count());
        }
        self.refresh_navigation();
    }

    /// Pages may have been added, removed or renumbered under the cursor
    fn sync_focus(&mut self) {
        self.goto_focused();
        self.refresh_navigation();
    }

    fn refresh_navigation(&mut self) {
        let page_count = self.page_count();
        let rank = self
            .current_page()
            .map(|page| page.rank)
            .or(self.navigation.displayed_rank())
            .unwrap_or(1)
            .min(page_count.max(1) as u32);
        self.navigation.update(rank, page_count);
    }

    fn start_listening(&mut self) {
        self.watch_enabled = true;
        self.transition(EngineState::Listening);
    }

    fn new_paginator(&mut self) {
        self.paginator = Some(Paginator::from_metrics(&self.metrics, &self.config));
        self.generation += 1;
        self.retry_count = 0;
    }

    fn schedule(&mut self, delay_ms: u64, task: DeferredTask) {
        debug!(?task, delay_ms, generation = self.generation, "scheduling task");
        self.queue
            .schedule(Duration::from_millis(delay_ms), task, self.generation);
    }

    fn transition(&mut self, to: EngineState) {
        let from = self.state;
        if from == to {
            return;
        }
        self.state = to;
        info!(?from, ?to, "engine state changed");
        self.emit(EngineEvent::StateChanged { from, to });
    }

    fn emit(&mut self, event: EngineEvent) {
        if let Some(observer) = self.observer.as_mut() {
            observer.notify(&event);
        }
    }
}
