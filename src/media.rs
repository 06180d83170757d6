//! Media inspection via ffprobe
//!
//! The narration stage needs the playback duration of the synthesized MP3;
//! tests and the CLI summary use the same probe to read back encoded videos.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tokio::process::Command;
use tracing::debug;

use crate::error::{PitchError, Result};

/// Stream-level facts about a media file
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Container duration
    pub duration: Duration,
    pub video: Option<VideoStreamInfo>,
    pub audio: Option<AudioStreamInfo>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VideoStreamInfo {
    pub codec: Option<String>,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    /// Only present when the probe counted frames
    pub frame_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AudioStreamInfo {
    pub codec: Option<String>,
    pub channels: Option<u32>,
    pub sample_rate: Option<u32>,
}

/// Reads duration and stream layout from an encoded file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<MediaInfo>;
}

/// [`MediaProbe`] backed by the `ffprobe` binary
#[derive(Debug, Clone)]
pub struct Ffprobe {
    ffprobe_path: String,
    count_frames: bool,
}

impl Ffprobe {
    #[must_use]
    pub fn new(ffprobe_path: impl Into<String>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
            count_frames: false,
        }
    }

    /// Decode the whole video stream to count frames exactly (slow).
    #[must_use]
    pub fn with_frame_count(mut self) -> Self {
        self.count_frames = true;
        self
    }
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new(crate::config::locate_tool("ffprobe"))
    }
}

#[async_trait]
impl MediaProbe for Ffprobe {
    async fn probe(&self, path: &Path) -> Result<MediaInfo> {
        let mut args = vec![
            "-v".to_string(),
            "quiet".to_string(),
            "-print_format".to_string(),
            "json".to_string(),
            "-show_format".to_string(),
            "-show_streams".to_string(),
        ];
        if self.count_frames {
            args.push("-count_frames".to_string());
        }
        args.push(path.to_string_lossy().to_string());

        debug!("ffprobe args: {:?}", args);

        let output = Command::new(&self.ffprobe_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| PitchError::Ffmpeg(format!("failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(PitchError::Ffmpeg(format!(
                "ffprobe failed on {}",
                path.display()
            )));
        }

        parse_probe_output(&output.stdout)
    }
}

/// Parse `ffprobe -print_format json` output.
pub fn parse_probe_output(json: &[u8]) -> Result<MediaInfo> {
    let probe: FfprobeOutput = serde_json::from_slice(json)?;

    let video = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .map(|s| VideoStreamInfo {
            codec: s.codec_name.clone(),
            width: s.width.unwrap_or(0),
            height: s.height.unwrap_or(0),
            fps: s
                .r_frame_rate
                .as_deref()
                .and_then(parse_frame_rate)
                .unwrap_or(0.0),
            frame_count: s.nb_read_frames.as_deref().and_then(|n| n.parse().ok()),
        });

    let audio = probe
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("audio"))
        .map(|s| AudioStreamInfo {
            codec: s.codec_name.clone(),
            channels: s.channels,
            sample_rate: s.sample_rate.as_deref().and_then(|r| r.parse().ok()),
        });

    let seconds: f64 = probe
        .format
        .duration
        .parse()
        .map_err(|_| PitchError::Ffmpeg("ffprobe reported no duration".to_string()))?;

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(PitchError::Ffmpeg(format!(
            "ffprobe reported invalid duration {seconds}"
        )));
    }

    Ok(MediaInfo {
        duration: Duration::from_secs_f64(seconds),
        video,
        audio,
    })
}

/// Parse a frame rate like "30/1", "30000/1001" or "25".
fn parse_frame_rate(rate: &str) -> Option<f64> {
    match rate.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            (den != 0.0).then(|| num / den)
        }
        None => rate.parse().ok(),
    }
}

/// `FFprobe` JSON output structure
#[derive(Debug, Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: FfprobeFormat,
}

#[derive(Debug, Deserialize)]
struct FfprobeStream {
    codec_type: Option<String>,
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    r_frame_rate: Option<String>,
    nb_read_frames: Option<String>,
    channels: Option<u32>,
    sample_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FfprobeFormat {
    #[serde(default)]
    duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SLIDESHOW_PROBE: &str = r#"{
        "streams": [
            {
                "codec_type": "video",
                "codec_name": "h264",
                "width": 1280,
                "height": 720,
                "r_frame_rate": "24/1",
                "nb_read_frames": "216"
            },
            {
                "codec_type": "audio",
                "codec_name": "aac",
                "channels": 1,
                "sample_rate": "24000"
            }
        ],
        "format": { "duration": "9.000000" }
    }"#;

    #[test]
    fn parses_video_and_audio_streams() {
        let info = parse_probe_output(SLIDESHOW_PROBE.as_bytes()).unwrap();
        assert_eq!(info.duration, Duration::from_secs(9));

        let video = info.video.unwrap();
        assert_eq!((video.width, video.height), (1280, 720));
        assert!((video.fps - 24.0).abs() < f64::EPSILON);
        assert_eq!(video.frame_count, Some(216));
        assert_eq!(video.codec.as_deref(), Some("h264"));

        let audio = info.audio.unwrap();
        assert_eq!(audio.codec.as_deref(), Some("aac"));
        assert_eq!(audio.sample_rate, Some(24000));
    }

    #[test]
    fn audio_only_file_has_no_video() {
        let json = r#"{
            "streams": [{ "codec_type": "audio", "codec_name": "mp3" }],
            "format": { "duration": "4.32" }
        }"#;
        let info = parse_probe_output(json.as_bytes()).unwrap();
        assert!(info.video.is_none());
        assert_eq!(info.duration, Duration::from_secs_f64(4.32));
    }

    #[test]
    fn missing_duration_is_an_error() {
        let json = r#"{ "streams": [], "format": {} }"#;
        assert!(matches!(
            parse_probe_output(json.as_bytes()),
            Err(PitchError::Ffmpeg(_))
        ));
    }

    #[test]
    fn frame_rate_forms() {
        assert_eq!(parse_frame_rate("24/1"), Some(24.0));
        assert!((parse_frame_rate("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_frame_rate("25"), Some(25.0));
        assert_eq!(parse_frame_rate("0/0"), None);
    }
}
