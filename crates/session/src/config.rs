//! Client configuration.
//!
//! Loaded from an optional JSON file. Every field has a default, so a file
//! only needs the values it changes:
//!
//! ```json
//! { "api_base_url": "https://memes.example/api", "timings": { "celebration_ms": 5000 } }
//! ```
//!
//! `MEMESWIPE_API_URL` overrides the base URL from the file.

use std::path::Path;
use std::time::Duration;

use api_client::http::DEFAULT_BASE_URL;
use gesture::GestureConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Environment variable overriding `api_base_url`
pub const API_URL_ENV: &str = "MEMESWIPE_API_URL";

/// Durations of the timed overlays and the chat poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// How long the heart burst stays up after a like
    pub like_burst_ms: u64,
    /// Delay between a match response and the celebration
    pub match_reveal_ms: u64,
    /// How long the celebration stays up unless tapped away
    pub celebration_ms: u64,
    pub chat_poll_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            like_burst_ms: 800,
            match_reveal_ms: 800,
            celebration_ms: 3000,
            chat_poll_ms: 3000,
        }
    }
}

impl Timings {
    pub fn like_burst(&self) -> Duration {
        Duration::from_millis(self.like_burst_ms)
    }

    pub fn match_reveal(&self) -> Duration {
        Duration::from_millis(self.match_reveal_ms)
    }

    pub fn celebration(&self) -> Duration {
        Duration::from_millis(self.celebration_ms)
    }

    pub fn chat_poll(&self) -> Duration {
        Duration::from_millis(self.chat_poll_ms)
    }
}

/// Everything the client core can be tuned with
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub gesture: GestureConfig,
    pub timings: Timings,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            gesture: GestureConfig::default(),
            timings: Timings::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from `path` (defaults when `None`), then apply the
    /// environment override.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                })?;
                debug!("Loaded config from {}", path.display());
                Self::from_json(&raw)?
            }
            None => Self::default(),
        };
        config.apply_overrides(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Replace the base URL when an override is present and non-empty
    pub fn apply_overrides(&mut self, api_url: Option<String>) {
        if let Some(url) = api_url.filter(|url| !url.trim().is_empty()) {
            debug!("API base URL overridden: {}", url);
            self.api_base_url = url;
        }
    }
}
