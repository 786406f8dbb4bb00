//! Cooperative deferred-task queue on a virtual clock

use std::collections::BinaryHeap;
use std::cmp::{Ordering, Reverse};
use std::time::Duration;

/// Work the controller defers until the host has settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredTask {
    /// First `init()` after the host is ready
    InitialInit,
    /// `init()` after a full content replacement
    ReplaceInit,
    /// Focus the current page once the replacement has settled
    ReplaceFocus,
}

/// A task together with the paginator generation that scheduled it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deferred {
    pub task: DeferredTask,
    pub generation: u64,
    pub due: Duration,
    seq: u64,
}

impl Ord for Deferred {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.due, self.seq).cmp(&(other.due, other.seq))
    }
}

impl PartialOrd for Deferred {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Tasks run in (due time, scheduling order); nothing is ever cancelled
#[derive(Debug, Default)]
pub struct DeferredQueue {
    now: Duration,
    next_seq: u64,
    tasks: BinaryHeap<Reverse<Deferred>>,
}

impl DeferredQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn schedule(&mut self, delay: Duration, task: DeferredTask, generation: u64) {
        let deferred = Deferred {
            task,
            generation,
            due: self.now + delay,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.tasks.push(Reverse(deferred));
    }

    /// Pop the next task due at or before `deadline`, moving the clock to it
    pub fn pop_due(&mut self, deadline: Duration) -> Option<Deferred> {
        let Reverse(next) = self.tasks.peek()?;
        if next.due > deadline {
            return None;
        }
        let Reverse(next) = self.tasks.pop()?;
        self.now = self.now.max(next.due);
        Some(next)
    }

    /// Move the clock forward once every due task has run
    pub fn settle(&mut self, deadline: Duration) {
        self.now = self.now.max(deadline);
    }

    /// Due time of the last pending task
    pub fn last_due(&self) -> Option<Duration> {
        self.tasks.iter().map(|Reverse(d)| d.due).max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_runs_in_due_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(500), DeferredTask::InitialInit, 1);
        queue.schedule(ms(100), DeferredTask::ReplaceInit, 2);

        assert!(queue.pop_due(ms(50)).is_none());
        let first = queue.pop_due(ms(1000)).unwrap();
        assert_eq!(first.task, DeferredTask::ReplaceInit);
        assert_eq!(queue.now(), ms(100));
        let second = queue.pop_due(ms(1000)).unwrap();
        assert_eq!(second.task, DeferredTask::InitialInit);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_equal_due_keeps_scheduling_order() {
        let mut queue = DeferredQueue::new();
        queue.schedule(ms(100), DeferredTask::ReplaceInit, 1);
        queue.schedule(ms(100), DeferredTask::ReplaceInit, 2);
        queue.schedule(ms(100), DeferredTask::ReplaceInit, 3);

        let order: Vec<_> = std::iter::from_fn(|| queue.pop_due(ms(100)))
            .map(|d| d.generation)
            .collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn test_delay_is_relative_to_clock() {
        let mut queue = DeferredQueue::new();
        queue.settle(ms(1000));
        queue.schedule(ms(100), DeferredTask::ReplaceFocus, 1);
        assert_eq!(queue.last_due(), Some(ms(1100)));
        assert!(queue.pop_due(ms(1099)).is_none());
        assert!(queue.pop_due(ms(1100)).is_some());
    }
}
