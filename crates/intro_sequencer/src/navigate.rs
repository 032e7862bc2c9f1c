// SPDX-License-Identifier: MIT OR Apache-2.0
//! Navigation side effect issued when the intro completes.

use std::sync::mpsc;

/// Capability for leaving the intro
pub trait Navigator {
    /// Send the document to `url`
    fn navigate(&mut self, url: &str);
}

/// Navigator that forwards destinations over a channel
#[derive(Debug)]
pub struct RecordingNavigator {
    sender: mpsc::Sender<String>,
}

impl RecordingNavigator {
    /// Create a recording navigator and return `(navigator, receiver)`
    pub fn new() -> (Self, mpsc::Receiver<String>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&mut self, url: &str) {
        let _ = self.sender.send(url.to_string());
    }
}

/// Navigator that only logs the destination
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&mut self, url: &str) {
        tracing::info!("Navigating to {url}");
    }
}
