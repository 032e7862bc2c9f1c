// SPDX-License-Identifier: MIT OR Apache-2.0
//! Headless rendering: every visual change becomes a log line.

use intro_sequencer::{Surface, VisualDispatcher, VisualState};

/// Visual dispatcher that logs surface changes
#[derive(Debug, Default)]
pub struct LogVisuals {
    applied: u64,
}

impl LogVisuals {
    pub fn new() -> Self {
        Self::default()
    }
}

impl VisualDispatcher for LogVisuals {
    fn apply(&mut self, surface: Surface, state: VisualState) {
        self.applied += 1;
        match (&surface, &state) {
            // High-frequency effects stay at trace level
            (Surface::Particle(_), _) | (_, VisualState::Glow(_)) => {
                tracing::trace!(%surface, ?state, "Visual");
            }
            (Surface::Page(_), _) | (Surface::Overlay, _) | (Surface::LoadingText, _) => {
                tracing::info!(%surface, ?state, "Visual");
            }
            _ => tracing::debug!(%surface, ?state, seq = self.applied, "Visual"),
        }
    }
}
