// SPDX-License-Identifier: MIT OR Apache-2.0
//! Timing constants and the scripted effects of the intro.
//!
//! Every multi-stage effect is a flat [`Script`] of [`Step`]s with offsets
//! relative to the moment the effect starts.

use crate::cue::CueKind;
use crate::script::Script;
use crate::sequencer::Step;
use crate::visual::{Surface, VisualState};
use std::time::Duration;

/// Landing exit animation before the first page shows
pub const START_DELAY: Duration = Duration::from_millis(800);
/// Slide-out time between an auto-advance firing and the next page
pub const AUTO_EXIT_DELAY: Duration = Duration::from_millis(500);
/// Fade-out time of a manual next/previous
pub const MANUAL_TRANSITION_DELAY: Duration = Duration::from_millis(300);
/// Progress bar fill time on the completion overlay
pub const PROGRESS_FILL: Duration = Duration::from_millis(1500);
/// When the overlay text swaps to the redirect message
pub const TEXT_SWAP_DELAY: Duration = Duration::from_millis(1000);
/// When the completion finale records and navigates
pub const FINALE_DELAY: Duration = Duration::from_millis(2500);
/// Delay before the landing logo settles into its idle look
pub const LANDING_IDLE_DELAY: Duration = Duration::from_millis(500);
/// Half period of the landing logo pulse
pub const PULSE_HALF_PERIOD: Duration = Duration::from_millis(2000);

/// Overlay text while the redirect is pending
pub const LOADING_TEXT: &str = "Loading...";
/// Overlay text once the redirect is imminent
pub const REDIRECT_TEXT: &str = "Taking you to Dr. Robot...";

const GLOW_PULSES: u64 = 5;

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

/// How long a page stays up before auto-advance fires
pub fn page_delay(index: usize) -> Duration {
    match index {
        2 => ms(3500),
        3 => ms(4000),
        _ => ms(2000),
    }
}

/// Per-page reveal animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealEffect {
    /// Page text slides in and glows
    TextReveal,
    /// Logo letters drop in one by one
    LettersReveal,
    /// Final logo flips in and pulses
    FinalLogo,
}

impl RevealEffect {
    /// Fixed page-to-effect mapping
    pub fn for_page(index: usize) -> Self {
        match index {
            2 => Self::LettersReveal,
            3 => Self::FinalLogo,
            _ => Self::TextReveal,
        }
    }

    /// Build the effect script for `page`
    pub fn script(&self, page: usize, letters: usize) -> Script<Step> {
        match self {
            Self::TextReveal => text_reveal(page),
            Self::LettersReveal => letters_reveal(letters),
            Self::FinalLogo => final_logo(),
        }
    }
}

fn visual(surface: Surface, state: VisualState) -> Step {
    Step::Visual(surface, state)
}

fn text_reveal(page: usize) -> Script<Step> {
    let text = Surface::PageText(page);
    Script::new()
        .at(Duration::ZERO, visual(text, VisualState::Primed))
        .at(ms(200), visual(text, VisualState::Revealed))
        .at(ms(200), visual(text, VisualState::Glow(0.7)))
        .then(ms(800), visual(text, VisualState::Glow(0.4)))
}

fn letters_reveal(letters: usize) -> Script<Step> {
    let mut script = Script::new();
    for index in 0..letters {
        let letter = Surface::Letter(index);
        let start = ms(200 * index as u64);

        script.push(Duration::ZERO, visual(letter, VisualState::Primed));
        script.push(start, visual(letter, VisualState::Revealed));
        script.push(start + ms(600), visual(letter, VisualState::Bounce));
        script.push(start + ms(750), visual(letter, VisualState::Settle));
        script.push(ms(300 * index as u64), Step::Cue(CueKind::Reveal));
    }
    script
}

fn final_logo() -> Script<Step> {
    let logo = Surface::FinalLogo;
    let mut script = Script::new()
        .at(Duration::ZERO, visual(logo, VisualState::Primed))
        .at(ms(500), visual(logo, VisualState::Revealed))
        .at(ms(1000), Step::Cue(CueKind::Complete));

    for pulse in 0..GLOW_PULSES {
        let on = ms(1300 + pulse * 500);
        script.push(on, visual(logo, VisualState::Glow(0.9)));
        script.push(on + ms(200), visual(logo, VisualState::Glow(0.5)));
    }
    script
}

/// Landing screen exit; ends by entering playback
pub fn landing_exit() -> Script<Step> {
    Script::new()
        .at(Duration::ZERO, visual(Surface::Landing, VisualState::Exit))
        .at(Duration::ZERO, visual(Surface::StartButton, VisualState::Exit))
        .at(START_DELAY, visual(Surface::Landing, VisualState::Dismissed))
        .at(START_DELAY, Step::EnterPlayback)
}

/// Auto-advance from `page`: slide out, then show the next page
pub fn auto_advance(page: usize) -> Script<Step> {
    Script::new()
        .at(page_delay(page), Step::SlideOut { page })
        .then(AUTO_EXIT_DELAY, Step::ShowPage(page + 1))
}

/// Completion overlay; ends with the finale
pub fn completion_overlay() -> Script<Step> {
    Script::new()
        .at(Duration::ZERO, visual(Surface::Overlay, VisualState::Shown))
        .at(
            Duration::ZERO,
            visual(Surface::LoadingText, VisualState::Text(LOADING_TEXT.to_string())),
        )
        .at(
            Duration::ZERO,
            visual(
                Surface::ProgressFill,
                VisualState::Progress {
                    fill: 1.0,
                    over: PROGRESS_FILL,
                },
            ),
        )
        .at(
            TEXT_SWAP_DELAY,
            visual(Surface::LoadingText, VisualState::Text(REDIRECT_TEXT.to_string())),
        )
        .at(FINALE_DELAY, Step::Finish)
}

/// Landing logo pulse looks
pub fn pulse_state(grow: bool) -> VisualState {
    if grow {
        VisualState::Pulse {
            scale: 1.08,
            rotate_deg: 3.0,
        }
    } else {
        VisualState::Pulse {
            scale: 1.05,
            rotate_deg: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_delays() {
        assert_eq!(page_delay(0), ms(2000));
        assert_eq!(page_delay(1), ms(2000));
        assert_eq!(page_delay(2), ms(3500));
        assert_eq!(page_delay(3), ms(4000));
        assert_eq!(page_delay(7), ms(2000));
    }

    #[test]
    fn test_effect_mapping() {
        assert_eq!(RevealEffect::for_page(0), RevealEffect::TextReveal);
        assert_eq!(RevealEffect::for_page(1), RevealEffect::TextReveal);
        assert_eq!(RevealEffect::for_page(2), RevealEffect::LettersReveal);
        assert_eq!(RevealEffect::for_page(3), RevealEffect::FinalLogo);
        assert_eq!(RevealEffect::for_page(5), RevealEffect::TextReveal);
    }

    #[test]
    fn test_letters_reveal_staggers_cues() {
        let script = RevealEffect::LettersReveal.script(2, 3);
        let cue_offsets: Vec<_> = script
            .steps()
            .filter(|(_, step)| matches!(step, Step::Cue(CueKind::Reveal)))
            .map(|(offset, _)| *offset)
            .collect();
        assert_eq!(cue_offsets, vec![ms(0), ms(300), ms(600)]);
        assert_eq!(script.span(), ms(400 + 750));
    }

    #[test]
    fn test_final_logo_glow_pulses() {
        let script = RevealEffect::FinalLogo.script(3, 0);
        let glows = script
            .steps()
            .filter(|(_, step)| matches!(step, Step::Visual(_, VisualState::Glow(_))))
            .count();
        assert_eq!(glows, 10);
        assert_eq!(script.span(), ms(1300 + 4 * 500 + 200));
    }

    #[test]
    fn test_auto_advance_offsets() {
        let script = auto_advance(2);
        let offsets: Vec<_> = script.steps().map(|(offset, _)| *offset).collect();
        assert_eq!(offsets, vec![ms(3500), ms(4000)]);
    }
}
