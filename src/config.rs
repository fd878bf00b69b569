//! Configuration file loading and defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::adapters::live::openai::OPENAI_API_BASE;

/// Watermark drawn when the user leaves the default in place.
pub const DEFAULT_WATERMARK: &str = "The Real Doctor";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API keys.
    pub keys: KeysConfig,
    /// Image service settings.
    pub openai: OpenAiConfig,
    /// Mockup composition settings.
    pub mockup: MockupConfig,
    /// Batch mode settings.
    pub batch: BatchConfig,
    /// Form server settings.
    pub server: ServerConfig,
}

/// API key configuration. Only batch mode reads these; the form takes the
/// key from the user on every call.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// `OpenAI` API key.
    pub openai: Option<String>,
}

/// Image service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OpenAiConfig {
    /// API root, without the `/images/generations` suffix.
    pub api_base: String,
    /// Image model name.
    pub model: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self { api_base: OPENAI_API_BASE.to_string(), model: "dall-e-3".to_string(), timeout_secs: 120 }
    }
}

impl OpenAiConfig {
    /// Request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Mockup composition settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MockupConfig {
    /// Frame template image.
    pub template: PathBuf,
    /// Preferred TrueType font for the watermark.
    pub font: PathBuf,
    /// Watermark font size in pixels.
    pub font_size: f32,
    /// Default watermark text offered by the form.
    pub watermark: String,
}

impl Default for MockupConfig {
    fn default() -> Self {
        Self {
            template: PathBuf::from("frame_template_Wall.png"),
            font: PathBuf::from("arial.ttf"),
            font_size: 24.0,
            watermark: DEFAULT_WATERMARK.to_string(),
        }
    }
}

/// Batch mode settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Directory posters are written to.
    pub output_dir: PathBuf,
    /// CSV log of generated posters.
    pub csv_path: PathBuf,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("anatomy_posters_wall"),
            csv_path: PathBuf::from("anatomy_poster_wall_log.csv"),
        }
    }
}

/// Form server settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to listen on.
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { listen: "127.0.0.1:7860".to_string() }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the `OpenAI` API key for batch mode, preferring the environment variable.
    #[must_use]
    pub fn openai_key(&self) -> Option<String> {
        std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.keys.openai.clone())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `ANATOMY_POSTER_CONFIG` environment variable
/// 3. `~/.config/anatomy-poster/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("ANATOMY_POSTER_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/anatomy-poster/config.toml")
    } else {
        PathBuf::from("anatomy-poster.toml")
    }
}
