// SPDX-License-Identifier: MIT OR Apache-2.0
//! Intro Player - headless driver for the intro sequencer
//!
//! Plays the intro in real time:
//! - Console lines as the input surface
//! - Log output as the visual surface
//! - Synthesized tones when built with the "audio" feature
//!
//! ## Usage
//!
//! `intro_player [CONFIG.ron] [--autostart]`
//!
//! The session report is written to stdout as JSON when the intro ends.

mod audio;
mod console;
mod player;
mod render;

use audio::ToneCues;
use intro_sequencer::{
    ErrorCapture, ErrorLog, InputRouter, IntroConfig, LogNavigator, Sequencer, SequencerContext,
};
use player::Player;
use render::LogVisuals;
use std::path::PathBuf;
use tokio::io::BufReader;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "intro_player=debug,intro_sequencer=debug";

/// Command line options
#[derive(Debug, Default)]
struct Options {
    config: Option<PathBuf>,
    autostart: bool,
}

impl Options {
    fn from_args(args: impl Iterator<Item = String>) -> Self {
        let mut options = Self::default();
        for arg in args {
            match arg.as_str() {
                "--autostart" => options.autostart = true,
                flag if flag.starts_with("--") => tracing::warn!("Ignoring unknown flag {flag}"),
                path => options.config = Some(PathBuf::from(path)),
            }
        }
        options
    }
}

fn load_config(path: Option<&PathBuf>) -> IntroConfig {
    let Some(path) = path else {
        return IntroConfig::default();
    };

    match IntroConfig::load(path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load {}: {e}. Using defaults.", path.display());
            IntroConfig::default()
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Every ERROR event also lands in the session's error log
    let errors = ErrorLog::new();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(ErrorCapture::new(errors.clone()))
        .init();

    std::panic::set_hook(Box::new(|info| {
        tracing::error!("Runtime fault: {info}");
    }));

    tracing::info!("Starting Intro Player v{}", env!("CARGO_PKG_VERSION"));

    let options = Options::from_args(std::env::args().skip(1));
    let config = load_config(options.config.as_ref());

    let context = SequencerContext::new(config)
        .with_cues(ToneCues::new())
        .with_visuals(LogVisuals::new())
        .with_navigator(LogNavigator);
    let sequencer = Sequencer::new(context).with_error_log(errors);

    let input = BufReader::new(tokio::io::stdin());
    let report = Player::new(sequencer, InputRouter::new())
        .run(input, options.autostart)
        .await;

    tracing::info!(
        pages = report.page_views.len(),
        interactions = report.interactions,
        errors = report.errors.len(),
        "Session finished"
    );
    match report.to_json() {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!("Failed to serialize session report: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> Options {
        Options::from_args(args.iter().map(ToString::to_string))
    }

    #[test]
    fn test_options() {
        let parsed = options(&["intro.ron", "--autostart"]);
        assert_eq!(parsed.config, Some(PathBuf::from("intro.ron")));
        assert!(parsed.autostart);

        let parsed = options(&["--verbose"]);
        assert_eq!(parsed.config, None);
        assert!(!parsed.autostart);
    }

    #[test]
    fn test_missing_config_falls_back_to_defaults() {
        let config = load_config(Some(&PathBuf::from("/nonexistent/intro.ron")));
        assert_eq!(config, IntroConfig::default());
    }
}
