//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::capture::LanguageTag;
use crate::domain::recording::Duration;

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub language: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub max_duration: Option<String>,
    pub interim_interval: Option<String>,
    pub segment_length: Option<String>,
    pub notify: Option<bool>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            language: Some(LanguageTag::default().to_string()),
            data_dir: None,
            max_duration: Some(Duration::default_max_duration().to_string()),
            interim_interval: Some(Duration::default_interim_interval().to_string()),
            segment_length: Some(Duration::default_segment_length().to_string()),
            notify: Some(false),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            api_key: other.api_key.or(self.api_key),
            language: other.language.or(self.language),
            data_dir: other.data_dir.or(self.data_dir),
            max_duration: other.max_duration.or(self.max_duration),
            interim_interval: other.interim_interval.or(self.interim_interval),
            segment_length: other.segment_length.or(self.segment_length),
            notify: other.notify.or(self.notify),
        }
    }

    /// Get language as parsed LanguageTag, or pt-BR if not set/invalid
    pub fn language_or_default(&self) -> LanguageTag {
        self.language
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Get the notes data directory, or the platform data dir
    pub fn data_dir_or_default(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Get max_duration as parsed Duration, or default if not set/invalid
    pub fn max_duration_or_default(&self) -> Duration {
        parse_or(&self.max_duration, Duration::default_max_duration())
    }

    /// Get interim_interval as parsed Duration, or default if not set/invalid
    pub fn interim_interval_or_default(&self) -> Duration {
        parse_or(&self.interim_interval, Duration::default_interim_interval())
    }

    /// Get segment_length as parsed Duration, or default if not set/invalid
    pub fn segment_length_or_default(&self) -> Duration {
        parse_or(&self.segment_length, Duration::default_segment_length())
    }

    /// Get notify setting, or false if not set
    pub fn notify_or_default(&self) -> bool {
        self.notify.unwrap_or(false)
    }
}

fn parse_or(value: &Option<String>, fallback: Duration) -> Duration {
    value
        .as_ref()
        .and_then(|s| s.parse().ok())
        .unwrap_or(fallback)
}

/// Platform data directory for notes, e.g. `~/.local/share/voice-notes`
pub fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voice-notes")
}
