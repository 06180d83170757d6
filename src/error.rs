//! Error taxonomy shared by every pipeline stage.

use std::path::PathBuf;

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum PitchError {
    /// Speech backend unavailable, rejected the text, or the script was empty
    #[error("Speech synthesis failed: {0}")]
    SynthesisFailure(String),

    /// Assembly attempted with zero images
    #[error("No images provided: a slideshow needs at least one image")]
    NoImagesProvided,

    /// Corrupt or unsupported image upload
    #[error("Failed to decode image {}: {reason}", path.display())]
    ImageDecodeFailure { path: PathBuf, reason: String },

    /// Generative-text backend unavailable or rejected the prompt
    #[error("Text generation failed: {0}")]
    GenerationFailure(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("FFmpeg error: {0}")]
    Ffmpeg(String),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PitchError>;
