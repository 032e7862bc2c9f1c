// SPDX-License-Identifier: MIT OR Apache-2.0
//! Page-transition sequencer for a scripted intro reveal.
//!
//! This crate drives a multi-page intro:
//! - Landing screen, start control and parallax
//! - Timed page reveals with autoplay
//! - Manual navigation, skip and pause
//! - Completion overlay, particles and redirect
//!
//! ## Architecture
//!
//! The sequencer is built on:
//! - A logical-clock timer registry with synchronous cancellation
//! - Flat scripts of `(offset, step)` pairs for multi-stage effects
//! - Injected capabilities for cues, visuals and navigation
//! - An append-only analytics recorder

pub mod timer;
pub mod script;
pub mod cue;
pub mod visual;
pub mod navigate;
pub mod config;
pub mod analytics;
pub mod reveal;
pub mod particles;
pub mod sequencer;
pub mod input;

pub use timer::{TimerHandle, TimerRegistry};
pub use script::{Script, ScriptHandle};
pub use cue::{AudioCue, CueDispatcher, CueKind, RecordingCues, SilentCues, ToneSamples, Waveform};
pub use visual::{NullVisuals, RecordingVisuals, Surface, VisualDispatcher, VisualState};
pub use navigate::{LogNavigator, Navigator, RecordingNavigator};
pub use config::{ConfigError, IntroConfig};
pub use analytics::{
    AnalyticsRecorder, ErrorCapture, ErrorLog, ErrorRecord, PageView, Payload, SequenceEvent,
    SessionReport,
};
pub use reveal::RevealEffect;
pub use sequencer::{
    Command, PerformanceStats, Phase, Sequencer, SequencerContext, SequencerState, Step,
};
pub use input::{InputEvent, InputRouter, Key};
