// SPDX-License-Identifier: MIT OR Apache-2.0
//! Maps raw input events onto sequencer commands.

use crate::sequencer::{Command, Sequencer};
use std::time::Duration;

/// Minimum time between two accepted activations
pub const ACTIVATE_DEBOUNCE: Duration = Duration::from_millis(300);
/// Minimum time between two handled pointer moves
pub const MOVE_THROTTLE: Duration = Duration::from_millis(50);
/// Horizontal travel a drag needs to count as a swipe
pub const SWIPE_THRESHOLD: f32 = 50.0;
/// Viewport assumed until the host reports one
pub const DEFAULT_VIEWPORT: (f32, f32) = (1280.0, 720.0);

/// Keys the intro reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Next page
    Right,
    /// Previous page
    Left,
    /// Skip the intro
    Escape,
    /// Pause or resume
    Space,
}

impl Key {
    /// Parse a DOM-style key name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "ArrowRight" | "Right" => Some(Self::Right),
            "ArrowLeft" | "Left" => Some(Self::Left),
            "Escape" | "Esc" => Some(Self::Escape),
            " " | "Space" | "Spacebar" => Some(Self::Space),
            _ => None,
        }
    }
}

/// A raw event from the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The start control was activated
    Activate,
    /// A key was pressed
    Key(Key),
    /// A pointer went down
    PointerDown {
        /// Horizontal position in px
        x: f32,
        /// Vertical position in px
        y: f32,
    },
    /// A pointer was released
    PointerUp {
        /// Horizontal position in px
        x: f32,
        /// Vertical position in px
        y: f32,
    },
    /// The pointer moved
    PointerMove {
        /// Horizontal position in px
        x: f32,
        /// Vertical position in px
        y: f32,
    },
    /// The document was hidden or shown
    VisibilityChanged {
        /// Whether the document is now hidden
        hidden: bool,
    },
    /// The document finished loading
    Loaded,
}

/// Guards and gesture state between raw input and the sequencer
#[derive(Debug, Clone)]
pub struct InputRouter {
    viewport: (f32, f32),
    last_activate: Option<Duration>,
    last_move: Option<Duration>,
    drag_origin: Option<(f32, f32)>,
}

impl Default for InputRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl InputRouter {
    /// Create a router with the default viewport
    pub fn new() -> Self {
        Self {
            viewport: DEFAULT_VIEWPORT,
            last_activate: None,
            last_move: None,
            drag_origin: None,
        }
    }

    /// Set the viewport used for parallax
    pub fn with_viewport(mut self, width: f32, height: f32) -> Self {
        self.viewport = (width, height);
        self
    }

    /// Route one event, stamped with the sequencer's clock.
    ///
    /// Returns the command handed to the sequencer, if the event produced
    /// one. Whether the sequencer accepted it is its own decision.
    pub fn handle(&mut self, sequencer: &mut Sequencer, event: InputEvent) -> Option<Command> {
        let now = sequencer.now();
        let command = match event {
            InputEvent::Activate => self.activate(now),
            InputEvent::Key(key) => Self::key(sequencer, key),
            InputEvent::PointerDown { x, y } => {
                self.drag_origin = Some((x, y));
                None
            }
            InputEvent::PointerUp { x, y } => self.swipe(sequencer, x, y),
            InputEvent::PointerMove { x, y } => {
                if self.throttled(now) {
                    return None;
                }
                sequencer.parallax(x, y, self.viewport);
                None
            }
            InputEvent::VisibilityChanged { hidden } => {
                sequencer.set_visibility(hidden);
                None
            }
            InputEvent::Loaded => {
                sequencer.document_loaded();
                None
            }
        }?;

        let accepted = sequencer.execute(command);
        tracing::debug!(?command, accepted, "Routed input");
        Some(command)
    }

    fn activate(&mut self, now: Duration) -> Option<Command> {
        if let Some(last) = self.last_activate {
            if now.saturating_sub(last) < ACTIVATE_DEBOUNCE {
                return None;
            }
        }
        self.last_activate = Some(now);
        Some(Command::Start)
    }

    fn key(sequencer: &Sequencer, key: Key) -> Option<Command> {
        if !sequencer.config().enable_keyboard {
            return None;
        }

        let playing = sequencer.state().is_playing;
        match key {
            Key::Right if playing => Some(Command::Next),
            Key::Left if playing => Some(Command::Previous),
            Key::Right | Key::Left => None,
            Key::Escape => Some(Command::Skip),
            Key::Space => Some(Command::TogglePlayPause),
        }
    }

    fn swipe(&mut self, sequencer: &Sequencer, x: f32, y: f32) -> Option<Command> {
        let (start_x, start_y) = self.drag_origin.take()?;
        if !sequencer.config().enable_swipe || !sequencer.state().is_playing {
            return None;
        }

        let dx = start_x - x;
        let dy = start_y - y;
        if dx.abs() <= dy.abs() || dx.abs() <= SWIPE_THRESHOLD {
            return None;
        }
        Some(if dx > 0.0 {
            Command::Next
        } else {
            Command::Previous
        })
    }

    fn throttled(&mut self, now: Duration) -> bool {
        if let Some(last) = self.last_move {
            if now.saturating_sub(last) < MOVE_THROTTLE {
                return true;
            }
        }
        self.last_move = Some(now);
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::IntroConfig;
    use crate::sequencer::{Phase, SequencerContext};
    use crate::visual::{RecordingVisuals, Surface, VisualState};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    fn sequencer(config: IntroConfig) -> Sequencer {
        Sequencer::new(SequencerContext::new(config))
    }

    fn playing() -> (InputRouter, Sequencer) {
        let mut router = InputRouter::new();
        let mut seq = sequencer(IntroConfig::default());
        router.handle(&mut seq, InputEvent::Activate);
        seq.advance_to(ms(900));
        assert_eq!(seq.phase(), Phase::Playing);
        (router, seq)
    }

    #[test]
    fn test_key_names() {
        assert_eq!(Key::from_name("ArrowRight"), Some(Key::Right));
        assert_eq!(Key::from_name("Right"), Some(Key::Right));
        assert_eq!(Key::from_name("ArrowLeft"), Some(Key::Left));
        assert_eq!(Key::from_name("Escape"), Some(Key::Escape));
        assert_eq!(Key::from_name(" "), Some(Key::Space));
        assert_eq!(Key::from_name("Spacebar"), Some(Key::Space));
        assert_eq!(Key::from_name("Enter"), None);
    }

    #[test]
    fn test_double_activation_starts_once() {
        let mut router = InputRouter::new();
        let mut seq = sequencer(IntroConfig::default());

        assert_eq!(router.handle(&mut seq, InputEvent::Activate), Some(Command::Start));
        seq.advance_to(ms(200));
        assert_eq!(router.handle(&mut seq, InputEvent::Activate), None);

        assert_eq!(seq.analytics().events_named("intro_started").count(), 1);
        assert_eq!(seq.analytics().interactions(), 1);
    }

    #[test]
    fn test_activation_after_debounce_is_routed() {
        let mut router = InputRouter::new();
        let mut seq = sequencer(IntroConfig::default());
        router.handle(&mut seq, InputEvent::Activate);
        seq.advance_to(ms(300));

        assert_eq!(router.handle(&mut seq, InputEvent::Activate), Some(Command::Start));
        assert_eq!(seq.analytics().events_named("intro_started").count(), 1);
    }

    #[test]
    fn test_arrows_only_while_playing() {
        let mut router = InputRouter::new();
        let mut seq = sequencer(IntroConfig::default());
        assert_eq!(router.handle(&mut seq, InputEvent::Key(Key::Right)), None);

        let (mut router, mut seq) = playing();
        assert_eq!(
            router.handle(&mut seq, InputEvent::Key(Key::Right)),
            Some(Command::Next)
        );
        seq.advance_to(ms(1200));
        assert_eq!(seq.state().current_page_index, 1);

        assert_eq!(
            router.handle(&mut seq, InputEvent::Key(Key::Space)),
            Some(Command::TogglePlayPause)
        );
        assert_eq!(seq.phase(), Phase::Paused);
        assert_eq!(router.handle(&mut seq, InputEvent::Key(Key::Left)), None);
    }

    #[test]
    fn test_escape_skips() {
        let (mut router, mut seq) = playing();
        assert_eq!(
            router.handle(&mut seq, InputEvent::Key(Key::Escape)),
            Some(Command::Skip)
        );
        assert_eq!(seq.phase(), Phase::Completed);
    }

    #[test]
    fn test_keyboard_disabled() {
        let mut router = InputRouter::new();
        let mut seq = sequencer(IntroConfig {
            enable_keyboard: false,
            ..IntroConfig::default()
        });
        router.handle(&mut seq, InputEvent::Activate);
        seq.advance_to(ms(900));
        assert_eq!(router.handle(&mut seq, InputEvent::Key(Key::Escape)), None);
        assert_eq!(seq.phase(), Phase::Playing);
    }

    #[test]
    fn test_swipe_directions() {
        let (mut router, mut seq) = playing();

        router.handle(&mut seq, InputEvent::PointerDown { x: 400.0, y: 300.0 });
        let command = router.handle(&mut seq, InputEvent::PointerUp { x: 300.0, y: 320.0 });
        assert_eq!(command, Some(Command::Next));

        seq.advance_to(ms(1200));
        router.handle(&mut seq, InputEvent::PointerDown { x: 300.0, y: 300.0 });
        let command = router.handle(&mut seq, InputEvent::PointerUp { x: 400.0, y: 300.0 });
        assert_eq!(command, Some(Command::Previous));
    }

    #[test]
    fn test_short_or_vertical_drag_ignored() {
        let (mut router, mut seq) = playing();

        router.handle(&mut seq, InputEvent::PointerDown { x: 400.0, y: 300.0 });
        assert_eq!(
            router.handle(&mut seq, InputEvent::PointerUp { x: 360.0, y: 300.0 }),
            None
        );

        router.handle(&mut seq, InputEvent::PointerDown { x: 400.0, y: 300.0 });
        assert_eq!(
            router.handle(&mut seq, InputEvent::PointerUp { x: 300.0, y: 100.0 }),
            None
        );

        assert_eq!(
            router.handle(&mut seq, InputEvent::PointerUp { x: 0.0, y: 300.0 }),
            None
        );
    }

    #[test]
    fn test_swipe_disabled() {
        let mut router = InputRouter::new();
        let mut seq = sequencer(IntroConfig {
            enable_swipe: false,
            ..IntroConfig::default()
        });
        router.handle(&mut seq, InputEvent::Activate);
        seq.advance_to(ms(900));

        router.handle(&mut seq, InputEvent::PointerDown { x: 400.0, y: 300.0 });
        assert_eq!(
            router.handle(&mut seq, InputEvent::PointerUp { x: 100.0, y: 300.0 }),
            None
        );
    }

    #[test]
    fn test_pointer_moves_are_throttled() {
        let (visuals, rx) = RecordingVisuals::new();
        let mut seq =
            Sequencer::new(SequencerContext::new(IntroConfig::default()).with_visuals(visuals));
        let mut router = InputRouter::new().with_viewport(800.0, 600.0);

        for step in 0..10 {
            seq.advance_to(ms(step * 10));
            router.handle(&mut seq, InputEvent::PointerMove { x: 100.0, y: 100.0 });
        }

        let tilts = rx
            .try_iter()
            .filter(|(surface, state)| {
                *surface == Surface::LandingLogo && matches!(state, VisualState::Parallax { .. })
            })
            .count();
        assert_eq!(tilts, 2);
    }

    #[test]
    fn test_visibility_and_load_are_routed() {
        let mut router = InputRouter::new();
        let mut seq = sequencer(IntroConfig::default());

        assert_eq!(router.handle(&mut seq, InputEvent::Loaded), None);
        assert_eq!(seq.analytics().events_named("page_loaded").count(), 1);

        router.handle(&mut seq, InputEvent::VisibilityChanged { hidden: true });
        assert!(seq.is_hidden());
        router.handle(&mut seq, InputEvent::VisibilityChanged { hidden: false });
        assert!(!seq.is_hidden());
    }
}
