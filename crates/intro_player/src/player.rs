// SPDX-License-Identifier: MIT OR Apache-2.0
//! Real-time event loop driving the sequencer.
//!
//! The loop has two suspension points: the next step deadline and the next
//! console line. Session time is wall-clock time since the player started.

use crate::console::{self, ConsoleCommand, HELP};
use intro_sequencer::{InputEvent, InputRouter, SessionReport, Sequencer};
use std::panic::{self, AssertUnwindSafe};
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::{sleep_until, Instant};

/// Whether the loop keeps going after a console line
enum Flow {
    Continue,
    Quit,
}

/// Owns the sequencer and feeds it time and input
pub struct Player {
    sequencer: Sequencer,
    router: InputRouter,
    epoch: Instant,
}

impl Player {
    pub fn new(sequencer: Sequencer, router: InputRouter) -> Self {
        Self {
            sequencer,
            router,
            epoch: Instant::now(),
        }
    }

    /// Session time elapsed so far
    fn elapsed(&self) -> Duration {
        self.epoch.elapsed()
    }

    /// Run until navigation, `quit`, or nothing is left to do
    pub async fn run<R>(mut self, input: R, autostart: bool) -> SessionReport
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        let mut input_open = true;

        self.guarded("boot", |player| {
            player.sequencer.boot();
            player.route(InputEvent::Loaded);
            if autostart {
                player.route(InputEvent::Activate);
            }
        });

        loop {
            if let Some(url) = self.sequencer.navigated_to() {
                tracing::info!("Session ended at {url}");
                break;
            }

            let wake = self.sequencer.next_deadline().map(|at| self.epoch + at);
            if !input_open && (wake.is_none() || !self.sequencer.state().intro_started) {
                tracing::info!("Input closed with nothing left to play");
                break;
            }

            tokio::select! {
                () = sleep_until(wake.unwrap_or_else(Instant::now)), if wake.is_some() => {
                    self.guarded("timer", |player| {
                        let now = player.elapsed();
                        player.sequencer.advance_to(now);
                    });
                }
                line = lines.next_line(), if input_open => match line {
                    Ok(Some(line)) => {
                        if let Flow::Quit = self.command(&line) {
                            break;
                        }
                    }
                    Ok(None) => input_open = false,
                    Err(e) => {
                        tracing::error!("Failed to read input: {e}");
                        input_open = false;
                    }
                },
                else => break,
            }
        }

        self.sequencer.analytics().report(self.sequencer.now())
    }

    fn command(&mut self, line: &str) -> Flow {
        let command = match console::parse_line(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Flow::Continue,
            Err(e) => {
                tracing::warn!("{e}");
                return Flow::Continue;
            }
        };

        match command {
            ConsoleCommand::Input(events) => {
                self.guarded("input", |player| {
                    for event in events {
                        player.route(event);
                    }
                });
            }
            ConsoleCommand::Status => {
                let state = self.sequencer.state();
                tracing::info!(
                    phase = ?self.sequencer.phase(),
                    page = state.current_page_index,
                    pending = self.sequencer.pending_steps(),
                    interactions = self.sequencer.analytics().interactions(),
                    "Status"
                );
            }
            ConsoleCommand::Help => println!("{HELP}"),
            ConsoleCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Route one event at the current session time
    fn route(&mut self, event: InputEvent) {
        let now = self.elapsed();
        self.sequencer.advance_to(now);
        self.router.handle(&mut self.sequencer, event);
    }

    /// Run `dispatch`, containing any panic so the session carries on.
    ///
    /// The panic hook has already logged the fault by the time this returns.
    fn guarded(&mut self, what: &str, dispatch: impl FnOnce(&mut Self)) {
        if panic::catch_unwind(AssertUnwindSafe(|| dispatch(self))).is_err() {
            tracing::warn!("{what} dispatch aborted, continuing the sequence");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intro_sequencer::{IntroConfig, SequencerContext};

    fn player(config: IntroConfig) -> Player {
        let sequencer = Sequencer::new(SequencerContext::new(config)).with_rng_seed(3);
        Player::new(sequencer, InputRouter::new())
    }

    #[tokio::test]
    async fn test_skip_from_console_navigates() {
        let report = player(IntroConfig::default())
            .run(&b"click\nesc\n"[..], false)
            .await;

        let names: Vec<_> = report.events.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["page_loaded", "intro_started", "intro_skipped", "intro_completed"]
        );
        assert_eq!(report.interactions, 1);
        assert!(report.duration >= Duration::from_millis(2500));
    }

    #[tokio::test]
    async fn test_quit_ends_session() {
        let report = player(IntroConfig::default())
            .run(&b"status\nbogus\nquit\nclick\n"[..], false)
            .await;

        assert_eq!(report.interactions, 0);
        assert!(report.page_views.is_empty());
    }

    #[tokio::test]
    async fn test_closed_input_before_start_ends_session() {
        let report = player(IntroConfig::default()).run(&b""[..], false).await;
        assert!(report
            .events
            .iter()
            .all(|event| event.name != "intro_started"));
    }

    #[test]
    fn test_guarded_dispatch_contains_panics() {
        let mut player = player(IntroConfig::default());
        player.guarded("test", |_| panic!("dispatch failure"));
        player.guarded("test", |player| player.route(InputEvent::Activate));
        assert!(player.sequencer.state().intro_started);
    }
}
