// SPDX-License-Identifier: MIT OR Apache-2.0
//! Visual surfaces and the capability that styles them.

use std::collections::HashSet;
use std::fmt;
use std::sync::mpsc;
use std::time::Duration;

/// A visual target the sequencer can address
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Surface {
    /// The landing screen shown before the intro starts
    Landing,
    /// Background logo on the landing screen
    LandingLogo,
    /// The start control
    StartButton,
    /// An intro page
    Page(usize),
    /// Text block of an intro page
    PageText(usize),
    /// One letter of the logo word
    Letter(usize),
    /// Logo on the final page
    FinalLogo,
    /// Full-screen transition overlay
    Overlay,
    /// Progress bar fill on the overlay
    ProgressFill,
    /// Status text on the overlay
    LoadingText,
    /// Floating particle on the overlay
    Particle(usize),
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Landing => write!(f, "landing"),
            Self::LandingLogo => write!(f, "landing-logo"),
            Self::StartButton => write!(f, "start-button"),
            Self::Page(index) => write!(f, "page[{index}]"),
            Self::PageText(index) => write!(f, "page[{index}].text"),
            Self::Letter(index) => write!(f, "letter[{index}]"),
            Self::FinalLogo => write!(f, "final-logo"),
            Self::Overlay => write!(f, "overlay"),
            Self::ProgressFill => write!(f, "overlay.progress"),
            Self::LoadingText => write!(f, "overlay.text"),
            Self::Particle(index) => write!(f, "particle[{index}]"),
        }
    }
}

/// Descriptor of the look a surface should take
#[derive(Debug, Clone, PartialEq)]
pub enum VisualState {
    /// Fully visible and interactive
    Shown,
    /// Faded out
    Hidden,
    /// Fading, shrinking and blurring away
    Exit,
    /// Removed from layout
    Dismissed,
    /// Sliding off to the left while blurring
    SlideOut,
    /// Reset to the pre-reveal pose, invisible
    Primed,
    /// Animated into the final pose
    Revealed,
    /// Glow around the element at the given strength
    Glow(f32),
    /// Short upward bounce
    Bounce,
    /// Back to rest after a bounce
    Settle,
    /// Idle look of the landing logo
    Idle,
    /// Breathing pulse
    Pulse {
        /// Scale factor
        scale: f32,
        /// Rotation in degrees
        rotate_deg: f32,
    },
    /// Pointer-driven tilt and offset
    Parallax {
        /// Rotation in degrees
        rotate_deg: f32,
        /// Horizontal offset in pixels
        dx: f32,
        /// Vertical offset in pixels
        dy: f32,
    },
    /// Fill fraction animated over a duration
    Progress {
        /// Target fill in `[0, 1]`
        fill: f32,
        /// Animation length
        over: Duration,
    },
    /// Replace the text content
    Text(String),
    /// Particle placed on the overlay
    Spawn {
        /// Diameter in pixels
        size: f32,
        /// Horizontal position in percent of the container
        left_pct: f32,
        /// Vertical position in percent of the container
        top_pct: f32,
        /// Opacity
        alpha: f32,
    },
    /// Particle drifting while fading out
    Drift {
        /// Horizontal travel in pixels
        dx: f32,
        /// Vertical travel in pixels
        dy: f32,
        /// Travel time
        over: Duration,
    },
    /// Particle snapped back to its origin
    Reset,
}

/// Capability for styling surfaces.
///
/// Dispatching to a surface that does not exist must be a silent no-op.
pub trait VisualDispatcher {
    /// Apply `state` to `surface`
    fn apply(&mut self, surface: Surface, state: VisualState);
}

/// Dispatcher that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullVisuals;

impl VisualDispatcher for NullVisuals {
    fn apply(&mut self, _surface: Surface, _state: VisualState) {}
}

/// Dispatcher that forwards every applied state over a channel
#[derive(Debug)]
pub struct RecordingVisuals {
    sender: mpsc::Sender<(Surface, VisualState)>,
    missing: HashSet<Surface>,
}

impl RecordingVisuals {
    /// Create a recording dispatcher and return `(dispatcher, receiver)`
    pub fn new() -> (Self, mpsc::Receiver<(Surface, VisualState)>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
                missing: HashSet::new(),
            },
            receiver,
        )
    }

    /// Treat `surface` as absent from the document
    pub fn without(mut self, surface: Surface) -> Self {
        self.missing.insert(surface);
        self
    }
}

impl VisualDispatcher for RecordingVisuals {
    fn apply(&mut self, surface: Surface, state: VisualState) {
        if self.missing.contains(&surface) {
            return;
        }
        let _ = self.sender.send((surface, state));
    }
}
