//! Configuration management for svdtune.
//!
//! This module handles loading, saving, and validating svdtune configuration.
//!
//! ## Configuration File Locations
//!
//! | Platform | Path |
//! |----------|------|
//! | Linux | `~/.config/svdtune/config.toml` |
//! | macOS | `~/Library/Application Support/svdtune/config.toml` |
//! | Windows | `%APPDATA%\svdtune\config.toml` |
//!
//! ## Example
//!
//! ```rust,ignore
//! use svdtune_core::config::Config;
//!
//! let config = Config::load()?;
//! println!("Backend: {}", config.session.base_url);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main configuration struct for svdtune.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Slider and preset mapping
    pub control: ControlConfig,
    /// Recompression backend and debounce settings
    pub session: SessionConfig,
    /// Local upload preview settings
    pub upload: UploadConfig,
}

/// Strategy for turning a compression-rate percentage into `k`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingKind {
    /// `k = max(k_min, round(k_max * (100 - rate) / 100))`
    #[default]
    InverseProportional,
    /// `k = clamp(intercept - rate, k_min, k_max)`
    Linear,
}

/// Control mapping options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Mapping strategy used for both live updates and initialization
    pub mapping: MappingKind,
    /// Smallest `k` ever produced (must be at least 1)
    pub k_min: u32,
    /// Largest `k` ever produced
    pub k_max: u32,
    /// Intercept for the linear mapping
    pub linear_intercept: i64,
    /// Slider position at startup (percentage)
    pub initial_rate: u8,
    /// Preset lookup table
    pub presets: PresetConfig,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            mapping: MappingKind::InverseProportional,
            k_min: crate::DEFAULT_K_MIN,
            k_max: crate::DEFAULT_K_MAX,
            linear_intercept: 105,
            initial_rate: crate::DEFAULT_INITIAL_RATE,
            presets: PresetConfig::default(),
        }
    }
}

/// `k` assigned to each named preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresetConfig {
    /// Low compression (high fidelity)
    pub low: u32,
    /// Medium compression
    pub medium: u32,
    /// High compression (low fidelity)
    pub high: u32,
}

impl Default for PresetConfig {
    fn default() -> Self {
        Self {
            low: 100,
            medium: 50,
            high: 30,
        }
    }
}

/// Recompression session options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Backend origin, e.g. `http://127.0.0.1:5000`
    pub base_url: String,
    /// Path of the recompression endpoint
    pub recompress_path: String,
    /// Path of the upload endpoint
    pub upload_path: String,
    /// Quiet period before a control change triggers a request
    #[serde(with = "humantime_serde")]
    pub debounce: Duration,
    /// Request timeout (None keeps the client default)
    #[serde(with = "humantime_serde::option", skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<Duration>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            recompress_path: "/recompress".to_string(),
            upload_path: "/compress".to_string(),
            debounce: Duration::from_millis(crate::DEFAULT_DEBOUNCE_MS),
            request_timeout: None,
        }
    }
}

/// Upload preview options.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Accepted file extensions (lowercase, without dot)
    pub allowed_extensions: Vec<String>,
    /// Largest file accepted for preview/upload, in bytes
    pub max_file_size: u64,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: vec!["png".to_string(), "jpg".to_string(), "jpeg".to_string()],
            max_file_size: crate::DEFAULT_MAX_UPLOAD_SIZE,
        }
    }
}

impl UploadConfig {
    /// Whether a file name carries an accepted extension.
    #[must_use]
    pub fn allows(&self, file_name: &str) -> bool {
        let Some((_, ext)) = file_name.rsplit_once('.') else {
            return false;
        };
        let ext = ext.to_ascii_lowercase();
        self.allowed_extensions.iter().any(|allowed| *allowed == ext)
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// If the configuration file doesn't exist, returns the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read,
    /// parsed, or fails validation.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)
            .map_err(|e| Error::ConfigError(format!("Failed to read config: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default location.
    ///
    /// Creates the configuration directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be written.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                Error::ConfigError(format!("Failed to create config directory: {e}"))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(&path, content)
            .map_err(|e| Error::ConfigError(format!("Failed to write config: {e}")))
    }

    /// Check the invariants the controller relies on.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] naming the offending key.
    pub fn validate(&self) -> Result<()> {
        let control = &self.control;
        if control.k_min == 0 {
            return Err(invalid("control.k_min", "must be at least 1"));
        }
        if control.k_min > control.k_max {
            return Err(invalid(
                "control.k_min",
                &format!("{} exceeds control.k_max {}", control.k_min, control.k_max),
            ));
        }
        if control.initial_rate > 100 {
            return Err(invalid("control.initial_rate", "must be within 0..=100"));
        }
        if self.session.base_url.trim().is_empty() {
            return Err(invalid("session.base_url", "must not be empty"));
        }
        if !self.session.recompress_path.starts_with('/') {
            return Err(invalid("session.recompress_path", "must start with '/'"));
        }
        if self.upload.allowed_extensions.is_empty() {
            return Err(invalid(
                "upload.allowed_extensions",
                "at least one extension is required",
            ));
        }
        Ok(())
    }

    /// Get the default configuration directory path.
    #[must_use]
    pub fn config_dir() -> Option<PathBuf> {
        directories::ProjectDirs::from("dev", "svdtune", "svdtune")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Get the full path to the configuration file.
    #[must_use]
    pub fn config_path() -> PathBuf {
        Self::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }
}

fn invalid(key: &str, reason: &str) -> Error {
    Error::InvalidConfig {
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_duration(*duration))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    fn format_duration(duration: Duration) -> String {
        if duration.subsec_millis() == 0 {
            format!("{}s", duration.as_secs())
        } else {
            format!("{}ms", duration.as_millis())
        }
    }

    fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        // "ms" must be checked before "s" and "m"
        if let Some(millis) = s.strip_suffix("ms") {
            return millis
                .parse()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string());
        }
        if let Some(secs) = s.strip_suffix('s') {
            return secs
                .parse()
                .map(Duration::from_secs)
                .map_err(|e| e.to_string());
        }
        if let Some(mins) = s.strip_suffix('m') {
            return mins
                .parse::<u64>()
                .map(|m| Duration::from_secs(m * 60))
                .map_err(|e| e.to_string());
        }
        Err(format!("invalid duration format: '{s}'"))
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(duration) => serializer.serialize_str(&super::format_duration(*duration)),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            Option::<String>::deserialize(deserializer)?
                .map(|s| super::parse_duration(&s).map_err(serde::de::Error::custom))
                .transpose()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Helper to create a temp config environment for testing
    fn setup_temp_config(dir: &TempDir) -> PathBuf {
        let config_dir = dir.path().join("config");
        std::fs::create_dir_all(&config_dir).unwrap();
        config_dir.join("config.toml")
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();

        assert_eq!(config.control.mapping, MappingKind::InverseProportional);
        assert_eq!(config.control.k_min, 5);
        assert_eq!(config.control.k_max, 200);
        assert_eq!(config.session.debounce, Duration::from_millis(400));
        assert!(config.session.request_timeout.is_none());
        assert_eq!(config.upload.max_file_size, 10 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = setup_temp_config(&temp_dir);

        let mut original = Config::default();
        original.control.mapping = MappingKind::Linear;
        original.control.k_min = 1;
        original.control.k_max = 100;
        original.session.base_url = "http://svd.local:8000".to_string();
        original.session.request_timeout = Some(Duration::from_secs(30));

        let content = toml::to_string_pretty(&original).expect("serialize");
        std::fs::write(&config_path, &content).expect("write");

        let loaded_content = std::fs::read_to_string(&config_path).expect("read");
        let loaded: Config = toml::from_str(&loaded_content).expect("parse");

        assert_eq!(loaded.control.mapping, MappingKind::Linear);
        assert_eq!(loaded.control.k_max, 100);
        assert_eq!(loaded.session.base_url, "http://svd.local:8000");
        assert_eq!(loaded.session.request_timeout, Some(Duration::from_secs(30)));
        assert_eq!(loaded.session.debounce, Duration::from_millis(400));
    }

    #[test]
    fn test_config_deserialization_partial() {
        let partial_toml = r#"
[control]
mapping = "linear"
k_min = 1
k_max = 100

[session]
debounce = "250ms"
"#;

        let config: Config = toml::from_str(partial_toml).expect("parse partial config");

        assert_eq!(config.control.mapping, MappingKind::Linear);
        assert_eq!(config.control.linear_intercept, 105);
        assert_eq!(config.control.presets, PresetConfig::default());
        assert_eq!(config.session.debounce, Duration::from_millis(250));
        assert_eq!(config.session.recompress_path, "/recompress");
    }

    #[test]
    fn test_humantime_duration_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).expect("serialize");

        assert!(
            toml_str.contains("debounce = \"400ms\""),
            "Sub-second durations should serialize as milliseconds"
        );
        assert!(
            toml_str.contains("mapping = \"inverse_proportional\""),
            "Mapping kind should be serialized as snake_case"
        );
    }

    #[test]
    fn test_validate_rejects_zero_k_min() {
        let mut config = Config::default();
        config.control.k_min = 0;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { ref key, .. } if key == "control.k_min"));
    }

    #[test]
    fn test_validate_rejects_inverted_bounds() {
        let mut config = Config::default();
        config.control.k_min = 300;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_upload_allows_known_extensions() {
        let upload = UploadConfig::default();

        assert!(upload.allows("photo.JPG"));
        assert!(upload.allows("scan.png"));
        assert!(!upload.allows("clip.gif"));
        assert!(!upload.allows("no_extension"));
    }

    #[test]
    fn test_config_path() {
        let path = Config::config_path();
        assert!(
            path.ends_with("config.toml"),
            "Config path should end with config.toml"
        );
    }
}
