//! Structured engine events for observers and tests

use crate::controller::scheduler::DeferredTask;

/// Lifecycle state of a reconciliation session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EngineState {
    #[default]
    Uninitialized,
    Initializing,
    Listening,
    Destroyed,
}

/// Why a content change did not trigger a watch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotListening,
    WatchDisabled,
}

/// One event per lifecycle transition and per recovery attempt
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    StateChanged { from: EngineState, to: EngineState },
    WatchSkipped { reason: SkipReason },
    RecoveryAttempt { attempt: u32, error: String },
    RecoveryAbandoned { attempts: u32 },
    ContentRestored,
    NavigationFailed { error: String },
    InitFailed { error: String },
    StaleTaskDropped { task: DeferredTask, generation: u64 },
    PageChanged { from_rank: Option<u32>, to_rank: u32 },
    WatchToggled { enabled: bool },
}

/// Receives every [`EngineEvent`] the controller emits
pub trait EngineObserver {
    fn notify(&mut self, event: &EngineEvent);
}

impl<F: FnMut(&EngineEvent)> EngineObserver for F {
    fn notify(&mut self, event: &EngineEvent) {
        self(event)
    }
}
