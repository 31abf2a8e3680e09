//! Configuration file for the fxbox frame host
//!
//! The on-disk TOML file is the host's side of the settings surface. It is
//! loaded once, validated into an immutable [`Settings`](crate::Settings)
//! snapshot, and never consulted again while a session runs.

use crate::error::ConfigError;
use crate::settings::{CpuEmulation, PortDevice};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub cpu: CpuConfig,
    pub cd: CdConfig,
    pub video: VideoConfig,
    pub audio: AudioConfig,
    pub input: InputConfig,
    pub debug: DebugConfig,
}

/// CPU emulation settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct CpuConfig {
    pub emulation: CpuEmulation,
}

/// CD-ROM drive settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CdConfig {
    /// Access speed multiplier (2 = stock drive)
    pub speed: u32,
}

/// Video settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VideoConfig {
    /// Output width used for the high dot clock mode
    pub high_dotclock_width: u32,
    /// First displayed scanline
    pub scanline_start: u32,
    /// Last displayed scanline, inclusive
    pub scanline_end: u32,
    pub no_sprite_limit: bool,
    /// Interpolate chroma in the RAINBOW decoder
    pub chroma_interpolate: bool,
    pub pixel_pro: bool,
}

/// Audio settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AudioConfig {
    /// Output resampler quality, 0 (fastest) to 5 (best)
    pub resamp_quality: u32,
    /// Tolerated output rate error of the resampler
    pub resamp_rate_error: f64,
    /// Emulate the ADPCM decoder's buggy behaviour
    pub adpcm_buggy: bool,
    /// Suppress clicks on ADPCM channel reset
    pub adpcm_no_clicks: bool,
}

/// Input settings
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    pub ports: [PortDevice; 2],
}

/// Debug settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    pub log_level: LogLevel,
    /// Log a summary line for every frame
    pub trace_frames: bool,
}

/// Logging level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Directive understood by `tracing_subscriber::EnvFilter`
    pub fn as_filter(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

// Default implementations

impl Default for CdConfig {
    fn default() -> Self {
        Self { speed: 2 }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            high_dotclock_width: 1024,
            scanline_start: 4,
            scanline_end: 235,
            no_sprite_limit: false,
            chroma_interpolate: false,
            pixel_pro: false,
        }
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            resamp_quality: 3,
            resamp_rate_error: 0.000_000_9,
            adpcm_buggy: false,
            adpcm_no_clicks: true,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::default(),
            trace_frames: false,
        }
    }
}

impl Config {
    /// Load configuration from the default path, or create it if it doesn't exist
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();

        if path.exists() {
            Self::load_from(&path)
        } else {
            let config = Self::default();
            config.save_to(&path)?;
            Ok(config)
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("fxbox")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.cpu.emulation, CpuEmulation::Auto);
        assert_eq!(config.cd.speed, 2);
        assert_eq!(config.video.high_dotclock_width, 1024);
        assert_eq!(config.video.scanline_start, 4);
        assert_eq!(config.video.scanline_end, 235);
        assert_eq!(config.audio.resamp_quality, 3);
        assert!(config.audio.adpcm_no_clicks);
        assert_eq!(config.input.ports, [PortDevice::Gamepad, PortDevice::Gamepad]);
    }

    #[test]
    fn test_config_serialization() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = Config::from_toml(
            r#"
            [cpu]
            emulation = "accurate"

            [input]
            ports = ["mouse", "none"]
            "#,
        )
        .unwrap();
        assert_eq!(config.cpu.emulation, CpuEmulation::Accurate);
        assert_eq!(config.input.ports, [PortDevice::Mouse, PortDevice::None]);
        assert_eq!(config.cd, CdConfig::default());
        assert_eq!(config.debug.log_level, LogLevel::Info);
    }

    #[test]
    fn test_bad_config_is_rejected() {
        let err = Config::from_toml("[cpu]\nemulation = \"turbo\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.video.no_sprite_limit = true;
        config.debug.log_level = LogLevel::Trace;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }
}
