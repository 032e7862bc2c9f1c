// SPDX-License-Identifier: MIT OR Apache-2.0
//! Floating particles on the completion overlay.

use crate::visual::VisualState;
use rand::Rng;
use std::time::Duration;

/// Number of particles spawned on the overlay
pub const PARTICLE_COUNT: usize = 15;

/// Pause between a particle resetting and drifting again
pub const RESPAWN_GAP: Duration = Duration::from_millis(100);

/// Random placement of a fresh particle
pub fn spawn<R: Rng + ?Sized>(rng: &mut R) -> VisualState {
    VisualState::Spawn {
        size: rng.random_range(2.0..6.0),
        left_pct: rng.random_range(0.0..100.0),
        top_pct: rng.random_range(0.0..100.0),
        alpha: rng.random_range(0.3..0.8),
    }
}

/// Random drift for one particle cycle
pub fn drift<R: Rng + ?Sized>(rng: &mut R) -> VisualState {
    VisualState::Drift {
        dx: rng.random_range(-100.0..100.0),
        dy: rng.random_range(-100.0..100.0),
        over: Duration::from_secs_f32(rng.random_range(3.0..8.0)),
    }
}
