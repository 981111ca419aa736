//! Configuration for the gesture engine.

use crate::core::buffer::DEFAULT_BUFFER_CAPACITY;
use crate::core::unistroke::{Recognizer, DEFAULT_POINTS, DEFAULT_SQUARE_SIZE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sample retention when no gesture is registered
    #[serde(with = "duration_millis")]
    pub retention: Duration,

    /// Interval between ticks in hosted loops
    #[serde(with = "duration_millis")]
    pub tick_interval: Duration,

    /// Maximum number of buffered samples
    pub buffer_capacity: usize,

    /// Whether `Down` combo steps also require the key to be held at sweep time
    pub combo_requires_held_key: bool,

    /// Shape recognizer parameters
    pub recognizer: RecognizerConfig,

    /// Path for persisted statistics
    pub data_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("synheart-gesture");

        Self {
            retention: Duration::from_millis(1000),
            tick_interval: Duration::from_millis(16),
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            combo_requires_held_key: true,
            recognizer: RecognizerConfig::default(),
            data_path: data_dir,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from `path`, falling back to defaults if absent.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
            let config: Config = serde_json::from_str(&content)
                .map_err(|e| ConfigError::ParseError(e.to_string()))?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::IoError(e.to_string()))?;
        }

        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        std::fs::write(&config_path, content).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("synheart-gesture")
            .join("config.json")
    }

    /// Path of the persisted statistics file.
    pub fn stats_path(&self) -> PathBuf {
        self.data_path.join("stats.json")
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.retention.is_zero() {
            return Err(ConfigError::Invalid("retention must be positive".into()));
        }
        if self.buffer_capacity == 0 {
            return Err(ConfigError::Invalid("buffer_capacity must be positive".into()));
        }
        if self.recognizer.points < 2 {
            return Err(ConfigError::Invalid("recognizer.points must be at least 2".into()));
        }
        if self.recognizer.square_size.is_nan() || self.recognizer.square_size <= 0.0 {
            return Err(ConfigError::Invalid(
                "recognizer.square_size must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Shape recognizer parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Points every stroke is resampled to
    pub points: usize,
    /// Side of the reference square
    pub square_size: f64,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            points: DEFAULT_POINTS,
            square_size: DEFAULT_SQUARE_SIZE,
        }
    }
}

impl From<RecognizerConfig> for Recognizer {
    fn from(config: RecognizerConfig) -> Self {
        Recognizer::new(config.points, config.square_size)
    }
}

/// Configuration errors.
#[derive(Debug)]
pub enum ConfigError {
    IoError(String),
    ParseError(String),
    SerializeError(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {e}"),
            ConfigError::ParseError(e) => write!(f, "Parse error: {e}"),
            ConfigError::SerializeError(e) => write!(f, "Serialize error: {e}"),
            ConfigError::Invalid(e) => write!(f, "Invalid configuration: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Serde support for Duration as milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.retention, Duration::from_millis(1000));
        assert_eq!(config.buffer_capacity, DEFAULT_BUFFER_CAPACITY);
        assert_eq!(config.recognizer.points, 64);
        assert!(config.combo_requires_held_key);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"retention": 2500, "recognizer": {"points": 32}}"#).unwrap();
        assert_eq!(config.retention, Duration::from_millis(2500));
        assert_eq!(config.tick_interval, Duration::from_millis(16));
        assert_eq!(config.recognizer.points, 32);
        assert_eq!(config.recognizer.square_size, DEFAULT_SQUARE_SIZE);

        let recognizer: Recognizer = config.recognizer.into();
        assert_eq!(recognizer.points, 32);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.buffer_capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.recognizer.square_size = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("synheart-gesture-missing-config.json");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.tick_interval, Duration::from_millis(16));
    }
}
