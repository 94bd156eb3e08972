//! Player configuration from environment variables.

use std::env;

use crate::playback::PlaybackConfig;

pub const DEFAULT_ENGINE_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub engine_url: String,
    pub auto_continue: bool,
    pub playback: PlaybackConfig,
}

impl PlayerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let engine_url = lookup("ENGINE_URL")
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| DEFAULT_ENGINE_URL.to_string());

        let auto_continue = lookup("STUDIO_AUTO_CONTINUE")
            .map(|value| parse_flag(&value))
            .unwrap_or(false);

        Self {
            engine_url,
            auto_continue,
            playback: PlaybackConfig::default(),
        }
    }
}

/// `1`, `true`, `yes` and `on` (any case) are true.
pub fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
