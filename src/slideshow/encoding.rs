//! Container/codec pairs the assembler can produce

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Output encoding for an assembled slideshow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VideoEncoding {
    /// MP4 with H.264 video and AAC audio (playable everywhere)
    #[default]
    H264Aac,
    /// Matroska with FFV1 video and no audio track
    Lossless,
}

impl VideoEncoding {
    /// Get ffmpeg format name
    #[must_use]
    pub fn ffmpeg_format(&self) -> &'static str {
        match self {
            Self::H264Aac => "mp4",
            Self::Lossless => "matroska",
        }
    }

    /// Get file extension
    #[must_use]
    pub fn extension(&self) -> &'static str {
        match self {
            Self::H264Aac => "mp4",
            Self::Lossless => "mkv",
        }
    }

    #[must_use]
    pub fn video_codec(&self) -> &'static str {
        match self {
            Self::H264Aac => "libx264",
            Self::Lossless => "ffv1",
        }
    }

    /// Audio codec, or `None` when the container never carries audio
    #[must_use]
    pub fn audio_codec(&self) -> Option<&'static str> {
        match self {
            Self::H264Aac => Some("aac"),
            Self::Lossless => None,
        }
    }

    #[must_use]
    pub fn carries_audio(&self) -> bool {
        self.audio_codec().is_some()
    }

    /// Pixel format handed to the encoder
    #[must_use]
    pub fn pixel_format(&self) -> &'static str {
        match self {
            Self::H264Aac => "yuv420p",
            Self::Lossless => "yuv444p",
        }
    }

    /// 4:2:0 output needs even frame dimensions
    #[must_use]
    pub fn requires_even_dimensions(&self) -> bool {
        matches!(self, Self::H264Aac)
    }

    /// Codec-specific output arguments
    #[must_use]
    pub fn codec_args(&self) -> Vec<String> {
        let args: &[&str] = match self {
            Self::H264Aac => &[
                "-preset",
                "medium",
                "-crf",
                "23",
                "-tune",
                "stillimage",
                "-movflags",
                "+faststart",
            ],
            Self::Lossless => &["-level", "3"],
        };
        args.iter().map(std::string::ToString::to_string).collect()
    }
}

impl fmt::Display for VideoEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::H264Aac => write!(f, "h264-aac"),
            Self::Lossless => write!(f, "lossless"),
        }
    }
}

impl FromStr for VideoEncoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "h264-aac" | "h264" | "mp4" => Ok(Self::H264Aac),
            "lossless" | "ffv1" | "mkv" => Ok(Self::Lossless),
            other => Err(format!(
                "unknown encoding '{other}' (expected 'h264-aac' or 'lossless')"
            )),
        }
    }
}
