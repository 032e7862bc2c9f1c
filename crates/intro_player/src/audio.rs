// SPDX-License-Identifier: MIT OR Apache-2.0
//! Audio output for intro cues.
//!
//! With the "audio" feature, cues are synthesized and played through rodio.
//! Without it, a stub reports the subsystem as unavailable so the sequencer
//! disables cues for the session.

// ============================================================================
// Tone Output (with rodio)
// ============================================================================

#[cfg(feature = "audio")]
mod engine {
    use intro_sequencer::{AudioCue, CueDispatcher, ToneSamples};
    use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
    use std::time::Duration;

    const SAMPLE_RATE: u32 = 44_100;

    /// A synthesized cue as a rodio source
    struct ToneSource {
        samples: ToneSamples,
        duration: Duration,
    }

    impl ToneSource {
        fn new(cue: &AudioCue) -> Self {
            let samples = ToneSamples::new(*cue, SAMPLE_RATE);
            let duration =
                Duration::from_secs_f64(samples.total_samples() as f64 / SAMPLE_RATE as f64);
            Self { samples, duration }
        }
    }

    impl Iterator for ToneSource {
        type Item = f32;

        fn next(&mut self) -> Option<f32> {
            self.samples.next()
        }
    }

    impl Source for ToneSource {
        fn current_frame_len(&self) -> Option<usize> {
            None
        }

        fn channels(&self) -> u16 {
            1
        }

        fn sample_rate(&self) -> u32 {
            self.samples.sample_rate()
        }

        fn total_duration(&self) -> Option<Duration> {
            Some(self.duration)
        }
    }

    /// Cue dispatcher playing synthesized tones
    pub struct ToneCues {
        /// Output stream (must be kept alive)
        _stream: Option<OutputStream>,
        /// Stream handle for creating sinks
        stream_handle: Option<OutputStreamHandle>,
        /// Tones still playing
        sinks: Vec<Sink>,
        suspended: bool,
    }

    impl Default for ToneCues {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ToneCues {
        pub fn new() -> Self {
            let (stream, stream_handle) = match OutputStream::try_default() {
                Ok((stream, handle)) => {
                    tracing::info!("Audio output initialized");
                    (Some(stream), Some(handle))
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize audio: {}. Cues will be disabled.", e);
                    (None, None)
                }
            };

            Self {
                _stream: stream,
                stream_handle,
                sinks: Vec::new(),
                suspended: false,
            }
        }
    }

    impl CueDispatcher for ToneCues {
        fn is_available(&self) -> bool {
            self.stream_handle.is_some()
        }

        fn play(&mut self, cue: &AudioCue) {
            let Some(stream_handle) = &self.stream_handle else {
                return;
            };
            if self.suspended {
                return;
            }

            self.sinks.retain(|sink| !sink.empty());
            let sink = match Sink::try_new(stream_handle) {
                Ok(sink) => sink,
                Err(e) => {
                    tracing::warn!("Failed to create audio sink: {}", e);
                    return;
                }
            };
            sink.append(ToneSource::new(cue));
            self.sinks.push(sink);
        }

        fn suspend(&mut self) {
            self.suspended = true;
            for sink in &self.sinks {
                sink.pause();
            }
        }

        fn resume(&mut self) {
            self.suspended = false;
            for sink in &self.sinks {
                sink.play();
            }
        }
    }
}

// ============================================================================
// Stub Tone Output (without rodio)
// ============================================================================

#[cfg(not(feature = "audio"))]
mod engine {
    use intro_sequencer::{AudioCue, CueDispatcher};

    /// Cue dispatcher stub (no audio support)
    pub struct ToneCues;

    impl Default for ToneCues {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ToneCues {
        pub fn new() -> Self {
            tracing::info!("Audio output: stub implementation (audio feature not enabled)");
            Self
        }
    }

    impl CueDispatcher for ToneCues {
        fn is_available(&self) -> bool {
            false
        }

        fn play(&mut self, cue: &AudioCue) {
            tracing::trace!(?cue, "Cue dropped");
        }
    }
}

pub use engine::ToneCues;
