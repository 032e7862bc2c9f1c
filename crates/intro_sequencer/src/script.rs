// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scripted sequences of timed steps.
//!
//! A [`Script`] is a flat list of `(offset, action)` pairs. Running it
//! schedules every step on a [`TimerRegistry`] at once and hands back a
//! single [`ScriptHandle`] that can cancel whatever has not fired yet.

use crate::timer::{TimerHandle, TimerRegistry};
use std::time::Duration;

/// A finite sequence of timed steps
#[derive(Debug, Clone)]
pub struct Script<A> {
    /// Steps as offsets from the moment the script runs
    steps: Vec<(Duration, A)>,
    /// Offset of the most recently appended step
    cursor: Duration,
}

impl<A> Script<A> {
    /// Create an empty script
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            cursor: Duration::ZERO,
        }
    }

    /// Add a step at an absolute offset
    pub fn at(mut self, offset: Duration, action: A) -> Self {
        self.cursor = offset;
        self.steps.push((offset, action));
        self
    }

    /// Add a step `gap` after the previous one
    pub fn then(self, gap: Duration, action: A) -> Self {
        let offset = self.cursor + gap;
        self.at(offset, action)
    }

    /// Add a step at an absolute offset without consuming the script
    pub fn push(&mut self, offset: Duration, action: A) {
        self.cursor = offset;
        self.steps.push((offset, action));
    }

    /// Number of steps
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the script has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Offset of the last step to fire
    pub fn span(&self) -> Duration {
        self.steps
            .iter()
            .map(|(offset, _)| *offset)
            .max()
            .unwrap_or_default()
    }

    /// Iterate over steps in insertion order
    pub fn steps(&self) -> impl Iterator<Item = &(Duration, A)> {
        self.steps.iter()
    }

    /// Schedule every step relative to the registry's current time
    pub fn run(self, timers: &mut TimerRegistry<A>) -> ScriptHandle {
        let timers = self
            .steps
            .into_iter()
            .map(|(offset, action)| timers.schedule(offset, action))
            .collect();
        ScriptHandle { timers }
    }
}

impl<A> Default for Script<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle to a running script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptHandle {
    timers: Vec<TimerHandle>,
}

impl ScriptHandle {
    /// Cancel every step that has not fired yet, returning how many were dropped
    pub fn cancel<A>(&self, timers: &mut TimerRegistry<A>) -> usize {
        self.timers
            .iter()
            .filter(|handle| timers.cancel(**handle))
            .count()
    }

    /// Whether any step is still waiting to fire
    pub fn is_pending<A>(&self, timers: &TimerRegistry<A>) -> bool {
        self.timers.iter().any(|handle| timers.is_pending(*handle))
    }

    /// Number of steps still waiting to fire
    pub fn remaining<A>(&self, timers: &TimerRegistry<A>) -> usize {
        self.timers
            .iter()
            .filter(|handle| timers.is_pending(**handle))
            .count()
    }
}
