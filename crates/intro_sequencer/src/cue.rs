// SPDX-License-Identifier: MIT OR Apache-2.0
//! Audio cues.
//!
//! This module provides:
//! - Tone descriptors for the four named cues
//! - The [`CueDispatcher`] capability the sequencer plays cues through
//! - A pure tone synthesizer that audio backends can stream from
//! - Silent and recording dispatchers

use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;
use std::sync::mpsc;

/// Oscillator shape of a tone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Waveform {
    /// Pure sine
    Sine,
    /// Triangle
    Triangle,
    /// Rising sawtooth
    Sawtooth,
    /// 50% duty square
    Square,
}

impl Waveform {
    /// Sample the waveform at `phase` (in cycles, any real value)
    pub fn sample(&self, phase: f32) -> f32 {
        let t = phase.rem_euclid(1.0);
        match self {
            Self::Sine => (t * TAU).sin(),
            Self::Triangle => 1.0 - 4.0 * (t - 0.5).abs(),
            Self::Sawtooth => 2.0 * t - 1.0,
            Self::Square => {
                if t < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
        }
    }
}

/// A short tone
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AudioCue {
    /// Oscillator frequency in hertz
    pub frequency_hz: f32,
    /// Oscillator shape
    pub waveform: Waveform,
    /// Peak gain in `[0, 1]`
    pub volume: f32,
    /// Length of the tone in seconds
    pub duration_seconds: f32,
}

impl AudioCue {
    /// Create a cue, clamping volume into `[0, 1]` and duration above zero
    pub fn new(frequency_hz: f32, waveform: Waveform, volume: f32, duration_seconds: f32) -> Self {
        Self {
            frequency_hz,
            waveform,
            volume: volume.clamp(0.0, 1.0),
            duration_seconds: duration_seconds.max(0.001),
        }
    }
}

/// The named cues of the intro
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CueKind {
    /// Start control activated
    Click,
    /// A page became active
    Transition,
    /// A logo letter appeared
    Reveal,
    /// The final logo landed
    Complete,
}

impl CueKind {
    /// Tone played for this cue
    pub fn cue(&self) -> AudioCue {
        match self {
            Self::Click => AudioCue::new(800.0, Waveform::Sine, 0.4, 0.3),
            Self::Transition => AudioCue::new(400.0, Waveform::Triangle, 0.3, 0.5),
            Self::Reveal => AudioCue::new(600.0, Waveform::Sawtooth, 0.2, 0.1),
            Self::Complete => AudioCue::new(1200.0, Waveform::Square, 0.5, 1.0),
        }
    }

    /// Get the display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::Transition => "transition",
            Self::Reveal => "reveal",
            Self::Complete => "complete",
        }
    }
}

/// Capability for playing cues.
///
/// Implementations must never block and never fail towards the caller.
pub trait CueDispatcher {
    /// Whether the audio subsystem came up. Queried once at startup.
    fn is_available(&self) -> bool {
        true
    }

    /// Play a tone, best effort
    fn play(&mut self, cue: &AudioCue);

    /// The document went to the background
    fn suspend(&mut self) {}

    /// The document came back to the foreground
    fn resume(&mut self) {}
}

/// Dispatcher that never makes a sound
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentCues;

impl CueDispatcher for SilentCues {
    fn is_available(&self) -> bool {
        false
    }

    fn play(&mut self, _cue: &AudioCue) {}
}

/// Dispatcher that forwards every played cue over a channel
#[derive(Debug)]
pub struct RecordingCues {
    sender: mpsc::Sender<AudioCue>,
    available: bool,
}

impl RecordingCues {
    /// Create a recording dispatcher and return `(dispatcher, receiver)`
    pub fn new() -> (Self, mpsc::Receiver<AudioCue>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender,
                available: true,
            },
            receiver,
        )
    }

    /// Create a recording dispatcher whose audio subsystem is missing
    pub fn unavailable() -> (Self, mpsc::Receiver<AudioCue>) {
        let (mut cues, receiver) = Self::new();
        cues.available = false;
        (cues, receiver)
    }
}

impl CueDispatcher for RecordingCues {
    fn is_available(&self) -> bool {
        self.available
    }

    fn play(&mut self, cue: &AudioCue) {
        let _ = self.sender.send(*cue);
    }
}

/// Length of the linear attack ramp
const ATTACK_SECONDS: f32 = 0.01;

/// Gain reached at the end of the exponential decay
const DECAY_FLOOR: f32 = 0.001;

/// Mono sample stream for a cue: oscillator shaped by a short attack and an
/// exponential decay to [`DECAY_FLOOR`] at the end of the tone.
#[derive(Debug, Clone)]
pub struct ToneSamples {
    cue: AudioCue,
    sample_rate: u32,
    index: u64,
    total: u64,
}

impl ToneSamples {
    /// Create a sample stream for `cue` at `sample_rate`
    pub fn new(cue: AudioCue, sample_rate: u32) -> Self {
        let total = (cue.duration_seconds * sample_rate as f32).round() as u64;
        Self {
            cue,
            sample_rate,
            index: 0,
            total,
        }
    }

    /// Sample rate in hertz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Total number of samples in the tone
    pub fn total_samples(&self) -> u64 {
        self.total
    }

    /// Gain envelope at `time` seconds into the tone
    pub fn envelope(&self, time: f32) -> f32 {
        let volume = self.cue.volume;
        let duration = self.cue.duration_seconds;

        if time <= ATTACK_SECONDS {
            return volume * (time / ATTACK_SECONDS);
        }
        if volume <= DECAY_FLOOR || duration <= ATTACK_SECONDS {
            return volume;
        }

        let progress = ((time - ATTACK_SECONDS) / (duration - ATTACK_SECONDS)).clamp(0.0, 1.0);
        volume * (DECAY_FLOOR / volume).powf(progress)
    }
}

impl Iterator for ToneSamples {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.index >= self.total {
            return None;
        }

        let time = self.index as f32 / self.sample_rate as f32;
        let sample = self.cue.waveform.sample(time * self.cue.frequency_hz) * self.envelope(time);
        self.index += 1;
        Some(sample)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.total - self.index) as usize;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_cues() {
        let click = CueKind::Click.cue();
        assert_eq!(click.frequency_hz, 800.0);
        assert_eq!(click.waveform, Waveform::Sine);

        let complete = CueKind::Complete.cue();
        assert_eq!(complete.waveform, Waveform::Square);
        assert_eq!(complete.duration_seconds, 1.0);
    }

    #[test]
    fn test_cue_clamps_volume() {
        let cue = AudioCue::new(440.0, Waveform::Sine, 3.0, 0.0);
        assert_eq!(cue.volume, 1.0);
        assert!(cue.duration_seconds > 0.0);
    }

    #[test]
    fn test_waveform_shapes() {
        assert!(Waveform::Sine.sample(0.0).abs() < 1e-6);
        assert!((Waveform::Sine.sample(0.25) - 1.0).abs() < 1e-6);
        assert_eq!(Waveform::Square.sample(0.25), 1.0);
        assert_eq!(Waveform::Square.sample(0.75), -1.0);
        assert_eq!(Waveform::Triangle.sample(0.5), 1.0);
        assert_eq!(Waveform::Triangle.sample(0.0), -1.0);
        assert_eq!(Waveform::Sawtooth.sample(0.0), -1.0);
        assert_eq!(Waveform::Sawtooth.sample(1.5), 0.0);
    }

    #[test]
    fn test_tone_length_and_envelope() {
        let cue = AudioCue::new(400.0, Waveform::Triangle, 0.3, 0.5);
        let tone = ToneSamples::new(cue, 1000);
        assert_eq!(tone.total_samples(), 500);
        assert_eq!(tone.clone().count(), 500);

        assert_eq!(tone.envelope(0.0), 0.0);
        assert!((tone.envelope(0.01) - 0.3).abs() < 1e-6);
        assert!((tone.envelope(0.5) - 0.001).abs() < 1e-6);

        let peak = tone.map(f32::abs).fold(0.0, f32::max);
        assert!(peak <= 0.3 + 1e-6);
    }

    #[test]
    fn test_recording_cues() {
        let (mut cues, rx) = RecordingCues::new();
        cues.play(&CueKind::Reveal.cue());
        cues.play(&CueKind::Click.cue());

        let played: Vec<_> = rx.try_iter().map(|cue| cue.frequency_hz).collect();
        assert_eq!(played, vec![600.0, 800.0]);
        assert!(!RecordingCues::unavailable().0.is_available());
        assert!(!SilentCues.is_available());
    }
}
