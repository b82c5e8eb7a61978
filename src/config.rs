//! Configuration management for Tiny IDE
//!
//! Everything is optional; a missing `init.toml` yields the built-in defaults.

use crate::error::InitError;
use crate::font::DEFAULT_FONT_PATH;
use crate::session::{DEFAULT_BUFFER_CAPACITY, DEFAULT_MAX_FILES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "init.toml";

/// Largest accepted `editor.font_size`, in logical pixels
pub const MAX_FONT_SIZE: f32 = 512.0;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_banner")]
    pub banner: String,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EditorConfig {
    #[serde(default = "default_font_path")]
    pub font_path: PathBuf,
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// File opened at startup
    #[serde(default = "default_initial_file")]
    pub initial_file: String,
    /// Files created with Ctrl+N are named `{prefix}-{n}.txt`
    #[serde(default = "default_new_file_prefix")]
    pub new_file_prefix: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    /// Includes one reserved slot, so buffers hold `buffer_capacity - 1` characters
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            banner: default_banner(),
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            font_path: default_font_path(),
            font_size: default_font_size(),
            initial_file: default_initial_file(),
            new_file_prefix: default_new_file_prefix(),
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_files: default_max_files(),
            buffer_capacity: default_buffer_capacity(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_title() -> String { "Tiny IDE".to_string() }
fn default_banner() -> String { "Welcome to Tiny IDE!".to_string() }
fn default_width() -> f32 { 800.0 }
fn default_height() -> f32 { 600.0 }
fn default_font_path() -> PathBuf { PathBuf::from(DEFAULT_FONT_PATH) }
fn default_font_size() -> f32 { 24.0 }
fn default_initial_file() -> String { "main.c".to_string() }
fn default_new_file_prefix() -> String { "untitled".to_string() }
fn default_max_files() -> usize { DEFAULT_MAX_FILES }
fn default_buffer_capacity() -> usize { DEFAULT_BUFFER_CAPACITY }
fn default_log_level() -> String { "info".to_string() }

impl AppConfig {
    /// Load configuration from init.toml in the working directory
    pub fn load() -> Result<Self, InitError> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from `path`, falling back to defaults when it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self, InitError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| InitError::Config(format!("{}: {e}", path.display())))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, InitError> {
        let config: AppConfig =
            toml::from_str(content).map_err(|e| InitError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), InitError> {
        if self.limits.max_files == 0 {
            return Err(InitError::Config("limits.max_files must be at least 1".into()));
        }
        if self.limits.buffer_capacity < 2 {
            return Err(InitError::Config(
                "limits.buffer_capacity must be at least 2".into(),
            ));
        }
        let font_size = self.editor.font_size;
        if !(font_size.is_finite() && font_size > 0.0 && font_size <= MAX_FONT_SIZE) {
            return Err(InitError::Config(format!(
                "editor.font_size must be in (0, {MAX_FONT_SIZE}], got {font_size}"
            )));
        }
        let (width, height) = (self.window.width, self.window.height);
        if !(positive(width) && positive(height)) {
            return Err(InitError::Config(format!(
                "window size must be positive, got {width}x{height}"
            )));
        }
        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}
