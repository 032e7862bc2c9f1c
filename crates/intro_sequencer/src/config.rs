// SPDX-License-Identifier: MIT OR Apache-2.0
//! Intro configuration.
//!
//! The configuration is static: it is loaded once at startup (from a RON
//! file or the defaults) and never changes during a session.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Destination the intro redirects to when it completes
pub const DEFAULT_DESTINATION_URL: &str = "https://yusuffaraag000-alt.github.io/dr-robot00/#/";

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid RON for this schema
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serializing the configuration failed
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Static settings of the intro
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntroConfig {
    /// Advance pages automatically
    pub auto_play: bool,
    /// Nominal autoplay delay, reported with the start event
    pub auto_play_delay_ms: u64,
    /// Nominal transition speed, reported with the start event
    pub transition_speed_ms: u64,
    /// Play audio cues
    pub enable_sound: bool,
    /// Route keyboard shortcuts
    pub enable_keyboard: bool,
    /// Route horizontal drag gestures
    pub enable_swipe: bool,
    /// Float particles on the overlay
    pub enable_particles: bool,
    /// Record analytics events
    pub enable_analytics: bool,
    /// Track timer lateness
    pub enable_performance: bool,
    /// Number of intro pages
    pub total_pages: usize,
    /// Number of letters in the logo word revealed on the letters page
    pub logo_letters: usize,
    /// Where to go once the intro completes
    pub destination_url: String,
}

impl Default for IntroConfig {
    fn default() -> Self {
        Self {
            auto_play: true,
            auto_play_delay_ms: 4000,
            transition_speed_ms: 1200,
            enable_sound: true,
            enable_keyboard: true,
            enable_swipe: true,
            enable_particles: true,
            enable_analytics: true,
            enable_performance: true,
            total_pages: 4,
            logo_letters: 8,
            destination_url: DEFAULT_DESTINATION_URL.to_string(),
        }
    }
}

impl IntroConfig {
    /// Parse a configuration from RON text
    pub fn from_ron(text: &str) -> Result<Self> {
        let config: Self = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty RON text
    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(
            self,
            ron::ser::PrettyConfig::default(),
        )?)
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_ron(&text)?;
        tracing::info!("Loaded intro configuration from {}", path.display());
        Ok(config)
    }

    /// Save to a configuration file
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if self.total_pages == 0 {
            return Err(ConfigError::Invalid(
                "total_pages must be at least 1".to_string(),
            ));
        }
        if self.destination_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "destination_url must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = IntroConfig::default();
        assert!(config.auto_play);
        assert_eq!(config.total_pages, 4);
        assert_eq!(config.destination_url, DEFAULT_DESTINATION_URL);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_serialization() {
        let config = IntroConfig {
            enable_sound: false,
            total_pages: 6,
            ..IntroConfig::default()
        };
        let text = config.to_ron().unwrap();
        let loaded = IntroConfig::from_ron(&text).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let loaded = IntroConfig::from_ron("(auto_play: false)").unwrap();
        assert!(!loaded.auto_play);
        assert!(loaded.enable_keyboard);
        assert_eq!(loaded.logo_letters, 8);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let result = IntroConfig::from_ron("(total_pages: 0)");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));

        let result = IntroConfig::from_ron("(total_pages: \"four\")");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
