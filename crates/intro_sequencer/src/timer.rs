// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timer registry with a logical clock.
//!
//! Timers carry plain actions instead of callbacks. The owner of the
//! registry pulls due actions with [`TimerRegistry::pop_due`] and runs them
//! itself, so cancelling a timer removes it from the queue before it can
//! ever be observed.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

/// Handle to a scheduled one-shot timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Get the raw handle value
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Registry of outstanding timers, ordered by deadline then scheduling order
#[derive(Debug)]
pub struct TimerRegistry<A> {
    /// Current logical time (offset from session start)
    now: Duration,
    /// Next handle value
    next_id: u64,
    /// Pending actions keyed by (deadline, handle)
    queue: BTreeMap<(Duration, TimerHandle), A>,
    /// Deadline lookup for cancellation
    deadlines: HashMap<TimerHandle, Duration>,
}

impl<A> TimerRegistry<A> {
    /// Create an empty registry with the clock at zero
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current logical time
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Schedule `action` to come due after `delay`
    pub fn schedule(&mut self, delay: Duration, action: A) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;

        let deadline = self.now + delay;
        self.queue.insert((deadline, handle), action);
        self.deadlines.insert(handle, deadline);
        handle
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        match self.deadlines.remove(&handle) {
            Some(deadline) => self.queue.remove(&(deadline, handle)).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer, returning how many were dropped
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        self.deadlines.clear();
        dropped
    }

    /// Whether `handle` is still waiting to fire
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.deadlines.contains_key(&handle)
    }

    /// Number of pending timers
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Pending actions in firing order
    pub fn pending_actions(&self) -> impl Iterator<Item = &A> {
        self.queue.values()
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<Duration> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest action due at or before `until`.
    ///
    /// The clock moves forward to the deadline of the returned timer, so
    /// anything the action schedules is relative to its own firing time.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerHandle, Duration, A)> {
        let (deadline, handle) = *self.queue.keys().next()?;
        if deadline > until {
            return None;
        }

        let action = self.queue.remove(&(deadline, handle))?;
        self.deadlines.remove(&handle);
        self.now = self.now.max(deadline);
        Some((handle, deadline, action))
    }

    /// Move the clock forward. The clock never runs backwards.
    pub fn advance_clock(&mut self, to: Duration) {
        self.now = self.now.max(to);
    }
}

impl<A> Default for TimerRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_pop_due_orders_by_deadline_then_schedule_order() {
        let mut timers = TimerRegistry::new();
        timers.schedule(ms(300), "late");
        timers.schedule(ms(100), "first");
        timers.schedule(ms(100), "second");

        let mut fired = Vec::new();
        while let Some((_, _, action)) = timers.pop_due(ms(1000)) {
            fired.push(action);
        }

        assert_eq!(fired, vec!["first", "second", "late"]);
        assert_eq!(timers.now(), ms(300));
    }

    #[test]
    fn test_pop_due_respects_limit() {
        let mut timers = TimerRegistry::new();
        timers.schedule(ms(500), ());

        assert!(timers.pop_due(ms(499)).is_none());
        assert_eq!(timers.pending(), 1);
        assert!(timers.pop_due(ms(500)).is_some());
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut timers = TimerRegistry::new();
        let keep = timers.schedule(ms(10), "keep");
        let stale = timers.schedule(ms(0), "drop");

        assert!(timers.cancel(stale));
        assert!(!timers.cancel(stale));
        assert!(timers.is_pending(keep));

        let (handle, _, action) = timers.pop_due(ms(10)).unwrap();
        assert_eq!(handle, keep);
        assert_eq!(action, "keep");
        assert!(timers.pop_due(ms(10)).is_none());
    }

    #[test]
    fn test_cancel_all_is_idempotent() {
        let mut timers: TimerRegistry<u8> = TimerRegistry::new();
        assert_eq!(timers.cancel_all(), 0);

        timers.schedule(ms(1), 1);
        timers.schedule(ms(2), 2);
        assert_eq!(timers.cancel_all(), 2);
        assert_eq!(timers.cancel_all(), 0);
        assert!(timers.next_deadline().is_none());
        assert!(timers.pop_due(Duration::MAX).is_none());
    }

    #[test]
    fn test_schedule_is_relative_to_clock() {
        let mut timers = TimerRegistry::new();
        timers.advance_clock(ms(1000));
        timers.schedule(ms(250), ());
        assert_eq!(timers.next_deadline(), Some(ms(1250)));

        timers.advance_clock(ms(10));
        assert_eq!(timers.now(), ms(1000));
    }
}
