//! Configuration system
//!
//! Viewer settings are plain serde structs. Files are read as TOML or RON
//! depending on their extension.

use std::path::Path;
use std::time::Duration;

pub use serde::{Deserialize, Serialize};

/// Default window width in pixels
pub const DEFAULT_WIDTH: u32 = 900;

/// Default window height in pixels
pub const DEFAULT_HEIGHT: u32 = 800;

/// Configuration trait
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    /// Load configuration from file
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(ConfigError::Io)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string())),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }

    /// Load configuration from file if it exists, otherwise use defaults
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            log::info!("Loading configuration from {}", path.display());
            Self::load_from_file(path)
        } else {
            log::debug!("No configuration at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?,
            Some("ron") => ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
                .map_err(|e| ConfigError::Serialize(e.to_string()))?,
            _ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents).map_err(ConfigError::Io)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Values that parse but cannot be used
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Framebuffer pixel format requested when a window is created
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PixelFormat {
    /// Red channel bits
    pub red_bits: u32,
    /// Green channel bits
    pub green_bits: u32,
    /// Blue channel bits
    pub blue_bits: u32,
    /// Alpha channel bits
    pub alpha_bits: u32,
    /// Depth buffer bits
    pub depth_bits: u32,
    /// Stencil buffer bits
    pub stencil_bits: u32,
}

impl Default for PixelFormat {
    fn default() -> Self {
        Self {
            red_bits: 8,
            green_bits: 8,
            blue_bits: 8,
            alpha_bits: 8,
            depth_bits: 32,
            stencil_bits: 0,
        }
    }
}

/// Window creation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Window width used by `open()` without explicit dimensions
    pub width: u32,
    /// Window height used by `open()` without explicit dimensions
    pub height: u32,
    /// Window title; empty means "use the program name"
    pub title: String,
    /// Requested framebuffer format
    pub pixel_format: PixelFormat,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            title: String::new(),
            pixel_format: PixelFormat::default(),
        }
    }
}

/// Background runner settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerSettings {
    /// Delay between worker wake-ups, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self { poll_interval_ms: 500 }
    }
}

/// Foreground event loop settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLoopSettings {
    /// Sleep between event pumps of the blocking `view()` loop, in milliseconds
    pub frame_interval_ms: u64,
}

impl Default for EventLoopSettings {
    fn default() -> Self {
        Self { frame_interval_ms: 16 }
    }
}

/// # Viewer Configuration
///
/// Top-level settings for a [`crate::WindowSystem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Window creation settings
    pub window: WindowSettings,
    /// Background runner settings
    pub runner: RunnerSettings,
    /// Foreground event loop settings
    pub event_loop: EventLoopSettings,
    /// Whether grid information is shown on redisplay
    pub show_info: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            runner: RunnerSettings::default(),
            event_loop: EventLoopSettings::default(),
            show_info: true,
        }
    }
}

impl ViewerConfig {
    /// Set default window dimensions
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.window.width = width;
        self.window.height = height;
        self
    }

    /// Set the background worker poll interval
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let millis = interval.as_millis() as u64;
        self.runner.poll_interval_ms = millis;
        self
    }

    /// Set the foreground frame interval
    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let millis = interval.as_millis() as u64;
        self.event_loop.frame_interval_ms = millis;
        self
    }

    /// Background worker poll interval
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.runner.poll_interval_ms)
    }

    /// Foreground frame interval
    pub const fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.event_loop.frame_interval_ms)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            )));
        }
        if self.runner.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll interval must be at least 1 ms".to_string()));
        }
        Ok(())
    }
}

impl Config for ViewerConfig {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_viewer() {
        let config = ViewerConfig::default();
        assert_eq!(config.window.width, 900);
        assert_eq!(config.window.height, 800);
        assert_eq!(config.window.pixel_format.depth_bits, 32);
        assert_eq!(config.window.pixel_format.stencil_bits, 0);
        assert_eq!(config.poll_interval(), Duration::from_millis(500));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ViewerConfig = toml::from_str(
            r#"
            show_info = false

            [runner]
            poll_interval_ms = 100
            "#,
        )
        .unwrap();
        assert!(!config.show_info);
        assert_eq!(config.runner.poll_interval_ms, 100);
        assert_eq!(config.window.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_validate_rejects_zero_sizes() {
        let config = ViewerConfig::default().with_size(0, 10);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = ViewerConfig::default().with_poll_interval(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load_ron() {
        let path = std::env::temp_dir().join(format!("game_window_config_{}.ron", std::process::id()));
        let config = ViewerConfig::default().with_size(640, 480);
        config.save_to_file(&path).unwrap();
        let loaded = ViewerConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unsupported_extension() {
        let err = ViewerConfig::default().save_to_file("viewer.json").unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = ViewerConfig::load_or_default("definitely/not/here.toml").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }
}
