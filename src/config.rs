//! Configuration loaded from `~/.config/pitchreel/config.toml`.
//!
//! Every field has a default, so a missing file (or a partial one) is fine.
//! The generative-text credential comes from the file or from
//! `GOOGLE_API_KEY`; the CLI overrides individual values with flags.
//!
//! ```toml
//! [generation]
//! model = "gemini-1.5-flash"
//!
//! [speech]
//! language = "en"
//!
//! [video]
//! width = 640
//! height = 360
//! fps = 24
//! slide_seconds = 3.0
//! encoding = "h264-aac"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PitchError, Result};
use crate::slideshow::{Resolution, VideoEncoding};

/// Environment variable holding the generative-text API key.
pub const API_KEY_ENV: &str = "GOOGLE_API_KEY";

/// Top-level configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory for scratch files (defaults to `$TMPDIR/pitchreel`)
    pub scratch_dir: Option<PathBuf>,
    pub generation: GenerationSettings,
    pub speech: SpeechSettings,
    pub video: VideoSettings,
    pub tools: ToolSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub model: String,
    pub api_base: String,
    /// Prefer `GOOGLE_API_KEY` over storing the key here
    pub api_key: Option<String>,
    pub timeout_secs: u64,
    /// Word budget hinted to the model for narration scripts
    pub max_words: usize,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-1.5-flash".to_string(),
            api_base: "https://generativelanguage.googleapis.com".to_string(),
            api_key: None,
            timeout_secs: 60,
            max_words: 150,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub language: String,
    /// Top-level domain of the translate host (`com`, `co.uk`, ...)
    pub tld: String,
    pub slow: bool,
    pub timeout_secs: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
            tld: "com".to_string(),
            slow: false,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub slide_seconds: f64,
    pub encoding: VideoEncoding,
}

impl Default for VideoSettings {
    fn default() -> Self {
        let resolution = Resolution::HD;
        Self {
            width: resolution.width,
            height: resolution.height,
            fps: 24,
            slide_seconds: 3.0,
            encoding: VideoEncoding::default(),
        }
    }
}

impl VideoSettings {
    #[must_use]
    pub fn resolution(&self) -> Resolution {
        Resolution::new(self.width, self.height)
    }
}

/// Explicit tool paths; `None` means look up in PATH.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub ffmpeg: Option<String>,
    pub ffprobe: Option<String>,
}

impl ToolSettings {
    #[must_use]
    pub fn ffmpeg(&self) -> String {
        self.ffmpeg.clone().unwrap_or_else(|| locate_tool("ffmpeg"))
    }

    #[must_use]
    pub fn ffprobe(&self) -> String {
        self.ffprobe.clone().unwrap_or_else(|| locate_tool("ffprobe"))
    }
}

impl AppConfig {
    /// Load from the default location, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    /// Load from an explicit path. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            PitchError::Config(format!("failed to read {}: {e}", path.display()))
        })?;

        toml::from_str(&content)
            .map_err(|e| PitchError::Config(format!("invalid TOML in {}: {e}", path.display())))
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PitchError::Config(format!("invalid TOML: {e}")))
    }

    /// Render the effective configuration (credential redacted).
    pub fn to_toml_string(&self) -> Result<String> {
        let mut redacted = self.clone();
        if redacted.generation.api_key.is_some() {
            redacted.generation.api_key = Some("<redacted>".to_string());
        }
        toml::to_string_pretty(&redacted)
            .map_err(|e| PitchError::Config(format!("failed to render config: {e}")))
    }

    /// Credential from the config file, else from `GOOGLE_API_KEY`.
    #[must_use]
    pub fn api_key(&self) -> Option<String> {
        self.generation
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok().filter(|k| !k.trim().is_empty()))
    }

    #[must_use]
    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("pitchreel"))
    }
}

/// Return the path to the config file.
#[must_use]
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pitchreel")
        .join("config.toml")
}

/// Resolve a binary through PATH, falling back to the bare name.
#[must_use]
pub fn locate_tool(name: &str) -> String {
    which::which(name).map_or_else(|_| name.to_string(), |p| p.to_string_lossy().to_string())
}
