//! ffmpeg-based slideshow assembler
//!
//! Decodes every slide up front, then streams RGB24 frames into an ffmpeg
//! subprocess (`-f rawvideo -i pipe:0`). An optional audio file is muxed as
//! the single audio track, untrimmed and unlooped.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command};
use tracing::{debug, info, warn};

use super::encoding::VideoEncoding;
use super::raster::{ImageAsset, Resolution};
use super::timeline::{SlideSpec, Timeline};
use crate::error::{PitchError, Result};
use crate::scratch::ScratchFile;

/// Lines of ffmpeg stderr kept for error reports
const STDERR_TAIL_LINES: usize = 12;

/// Configuration for the assembler
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    /// Path to ffmpeg binary
    pub ffmpeg_path: String,
    /// Every slide is resized to this
    pub resolution: Resolution,
    pub fps: u32,
    pub encoding: VideoEncoding,
    /// Audio bitrate (e.g., "192k")
    pub audio_bitrate: String,
    /// Where encoded output is written before hand-off
    pub scratch_dir: PathBuf,
    /// Additional ffmpeg output arguments
    pub output_args: Vec<String>,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: crate::config::locate_tool("ffmpeg"),
            resolution: Resolution::HD,
            fps: 24,
            encoding: VideoEncoding::default(),
            audio_bitrate: "192k".to_string(),
            scratch_dir: std::env::temp_dir().join("pitchreel"),
            output_args: Vec::new(),
        }
    }
}

impl AssemblerConfig {
    /// Small, fast preset (640×360, lossless Matroska, no audio)
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            resolution: Resolution::NHD,
            encoding: VideoEncoding::Lossless,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }

    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: VideoEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    #[must_use]
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    fn validate(&self) -> Result<()> {
        let Resolution { width, height } = self.resolution;
        if width == 0 || height == 0 {
            return Err(PitchError::InvalidSettings(format!(
                "resolution {} has a zero dimension",
                self.resolution
            )));
        }
        if self.encoding.requires_even_dimensions() && (width % 2 != 0 || height % 2 != 0) {
            return Err(PitchError::InvalidSettings(format!(
                "{} output needs even dimensions, got {}",
                self.encoding, self.resolution
            )));
        }
        if self.fps == 0 {
            return Err(PitchError::InvalidSettings(
                "frame rate must be at least 1 fps".to_string(),
            ));
        }
        Ok(())
    }
}

/// An encoded slideshow held in a scratch file until handed off
#[derive(Debug)]
pub struct VideoAsset {
    file: ScratchFile,
    /// Sum of slide durations (audio length is not reconciled)
    pub nominal_duration: Duration,
    pub frame_count: u64,
    pub slide_count: usize,
    pub fps: u32,
    pub resolution: Resolution,
    pub encoding: VideoEncoding,
    pub has_audio: bool,
}

impl VideoAsset {
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Container bytes, for inline playback or upload
    pub async fn bytes(&self) -> Result<Vec<u8>> {
        self.file.read().await
    }

    /// Move the encoded file to `dest` and hand it to the caller.
    pub fn persist(self, dest: &Path) -> Result<PathBuf> {
        self.file.persist(dest)
    }

    /// Wrap an already encoded scratch file (single-slide, no audio).
    #[cfg(test)]
    pub(crate) fn from_scratch(file: ScratchFile, config: &AssemblerConfig) -> Self {
        Self {
            file,
            nominal_duration: Duration::from_secs(1),
            frame_count: u64::from(config.fps),
            slide_count: 1,
            fps: config.fps,
            resolution: config.resolution,
            encoding: config.encoding,
            has_audio: false,
        }
    }
}

/// Turns ordered images into one video
pub struct SlideshowAssembler {
    config: AssemblerConfig,
}

impl SlideshowAssembler {
    #[must_use]
    pub fn new(config: AssemblerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &AssemblerConfig {
        &self.config
    }

    /// Check if ffmpeg is available
    pub async fn check_available(&self) -> bool {
        Command::new(&self.config.ffmpeg_path)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Decode and resize every image in order, pairing each with `seconds`.
    ///
    /// Fails on the first unreadable image, naming it.
    pub async fn load_slides(&self, images: &[PathBuf], seconds: f64) -> Result<Vec<SlideSpec>> {
        if images.is_empty() {
            return Err(PitchError::NoImagesProvided);
        }
        self.config.validate()?;
        Timeline::uniform(images.len(), seconds, self.config.fps)?;

        let target = self.config.resolution;
        let mut slides = Vec::with_capacity(images.len());

        for path in images {
            let owned = path.clone();
            let image = tokio::task::spawn_blocking(move || ImageAsset::load_slide(&owned, target))
                .await
                .map_err(|e| PitchError::ImageDecodeFailure {
                    path: path.clone(),
                    reason: format!("decoder task failed: {e}"),
                })??;

            debug!(
                "Loaded slide {} ({:?}, {})",
                path.display(),
                image.layout(),
                image.resolution()
            );
            slides.push(SlideSpec::new(image, seconds));
        }

        Ok(slides)
    }

    /// Full assembly: decode `images`, show each for `seconds`, attach `audio`.
    pub async fn assemble(
        &self,
        images: &[PathBuf],
        seconds: f64,
        audio: Option<&Path>,
    ) -> Result<VideoAsset> {
        let slides = self.load_slides(images, seconds).await?;
        self.assemble_slides(&slides, audio).await
    }

    /// Encode already-decoded slides.
    pub async fn assemble_slides(
        &self,
        slides: &[SlideSpec],
        audio: Option<&Path>,
    ) -> Result<VideoAsset> {
        self.config.validate()?;
        let timeline = Timeline::from_slides(slides, self.config.fps)?;

        if let Some(slide) = slides
            .iter()
            .find(|s| s.image.resolution() != self.config.resolution)
        {
            return Err(PitchError::InvalidSettings(format!(
                "slide is {} but the video is {}",
                slide.image.resolution(),
                self.config.resolution
            )));
        }

        let audio = match audio {
            Some(path) if !self.config.encoding.carries_audio() => {
                warn!(
                    "{} output has no audio track, ignoring {}",
                    self.config.encoding,
                    path.display()
                );
                None
            }
            other => other,
        };

        let output = ScratchFile::create(
            &self.config.scratch_dir,
            &format!(".{}", self.config.encoding.extension()),
        )?;

        let args = self.build_args(audio, output.path());
        debug!("ffmpeg args: {:?}", args);

        info!(
            "Encoding {} slides ({} frames @ {} fps, {}) to {}",
            slides.len(),
            timeline.total_frames(),
            timeline.fps(),
            self.config.resolution,
            self.config.encoding
        );

        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| PitchError::Ffmpeg(format!("failed to start ffmpeg: {e}")))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PitchError::Ffmpeg("Failed to capture ffmpeg stdin".to_string()))?;

        let stderr_task = child.stderr.take().map(|s| tokio::spawn(drain_stderr(s)));

        let written = write_frames(&mut stdin, slides, &timeline).await;
        // Close stdin so ffmpeg sees EOF and finalizes the container
        drop(stdin);

        let status = child.wait().await?;
        let stderr_tail = match stderr_task {
            Some(task) => task.await.map(Vec::from).unwrap_or_default(),
            None => Vec::new(),
        };

        let frame_count = match written {
            Ok(n) => n,
            Err(e) => {
                return Err(PitchError::Ffmpeg(format!(
                    "failed to stream frames: {e}{}",
                    format_tail(&stderr_tail)
                )));
            }
        };

        if !status.success() {
            return Err(PitchError::Ffmpeg(format!(
                "ffmpeg exited with status: {status}{}",
                format_tail(&stderr_tail)
            )));
        }

        info!(
            "Encoded {} frames ({:.1}s nominal) to {}",
            frame_count,
            timeline.nominal_duration().as_secs_f64(),
            output.path().display()
        );

        Ok(VideoAsset {
            file: output,
            nominal_duration: timeline.nominal_duration(),
            frame_count,
            slide_count: slides.len(),
            fps: timeline.fps(),
            resolution: self.config.resolution,
            encoding: self.config.encoding,
            has_audio: audio.is_some(),
        })
    }

    /// Build ffmpeg arguments
    fn build_args(&self, audio: Option<&Path>, output: &Path) -> Vec<String> {
        let encoding = self.config.encoding;
        let mut args = Vec::new();

        args.extend(
            ["-hide_banner", "-loglevel", "warning", "-y"]
                .iter()
                .map(std::string::ToString::to_string),
        );

        // Raw frames on stdin
        args.extend([
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgb24".to_string(),
            "-s".to_string(),
            self.config.resolution.to_string(),
            "-r".to_string(),
            self.config.fps.to_string(),
            "-i".to_string(),
            "pipe:0".to_string(),
        ]);

        if let Some(path) = audio {
            args.push("-i".to_string());
            args.push(path.to_string_lossy().to_string());
        }

        args.push("-map".to_string());
        args.push("0:v:0".to_string());
        if audio.is_some() {
            args.push("-map".to_string());
            args.push("1:a:0".to_string());
        }

        // Video codec
        args.push("-c:v".to_string());
        args.push(encoding.video_codec().to_string());
        args.push("-pix_fmt".to_string());
        args.push(encoding.pixel_format().to_string());
        args.extend(encoding.codec_args());

        // Audio codec
        if audio.is_some() {
            if let Some(codec) = encoding.audio_codec() {
                args.push("-c:a".to_string());
                args.push(codec.to_string());
                args.push("-b:a".to_string());
                args.push(self.config.audio_bitrate.clone());
            }
        }

        // Custom output args
        args.extend(self.config.output_args.clone());

        args.push("-f".to_string());
        args.push(encoding.ffmpeg_format().to_string());
        args.push(output.to_string_lossy().to_string());

        args
    }
}

/// Write each slide's frame once per frame it occupies. Returns frames written.
async fn write_frames(
    stdin: &mut ChildStdin,
    slides: &[SlideSpec],
    timeline: &Timeline,
) -> std::io::Result<u64> {
    let mut written = 0u64;

    for (slide, range) in slides.iter().zip(timeline.frame_ranges()) {
        let frame = slide.image.to_rgb24();
        for _ in range {
            stdin.write_all(&frame).await?;
            written += 1;
        }
    }

    stdin.flush().await?;
    Ok(written)
}

/// Log ffmpeg stderr and keep the last few lines for error messages.
async fn drain_stderr<R: AsyncRead + Unpin>(stderr: R) -> VecDeque<String> {
    let mut tail = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(stderr).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        if line.contains("Error") || line.contains("Warning") {
            warn!("ffmpeg: {}", line);
        } else {
            debug!("ffmpeg: {}", line);
        }
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    tail
}

fn format_tail(lines: &[String]) -> String {
    if lines.is_empty() {
        String::new()
    } else {
        format!("\n{}", lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};

    fn assembler(encoding: VideoEncoding) -> SlideshowAssembler {
        SlideshowAssembler::new(AssemblerConfig::default().with_encoding(encoding))
    }

    #[test]
    fn test_build_args_with_audio() {
        let assembler = assembler(VideoEncoding::H264Aac);
        let args = assembler.build_args(Some(Path::new("/tmp/voice.mp3")), Path::new("out.mp4"));

        assert!(args.contains(&"pipe:0".to_string()));
        assert!(args.contains(&"rawvideo".to_string()));
        assert!(args.contains(&"1280x720".to_string()));
        assert!(args.contains(&"/tmp/voice.mp3".to_string()));
        assert!(args.contains(&"1:a:0".to_string()));
        assert!(args.contains(&"aac".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
        assert!(!args.contains(&"-shortest".to_string()));
    }

    #[test]
    fn test_build_args_without_audio() {
        let assembler = assembler(VideoEncoding::Lossless);
        let args = assembler.build_args(None, Path::new("out.mkv"));

        assert!(args.contains(&"ffv1".to_string()));
        assert!(args.contains(&"matroska".to_string()));
        assert!(!args.contains(&"-c:a".to_string()));
        assert!(!args.contains(&"1:a:0".to_string()));
    }

    #[test]
    fn minimal_preset() {
        let config = AssemblerConfig::minimal();
        assert_eq!(config.resolution, Resolution::NHD);
        assert_eq!(config.encoding, VideoEncoding::Lossless);
    }

    #[test]
    fn odd_dimensions_rejected_for_h264() {
        let config = AssemblerConfig::default().with_resolution(Resolution::new(641, 360));
        assert!(matches!(
            config.validate(),
            Err(PitchError::InvalidSettings(_))
        ));

        let lossless = config.with_encoding(VideoEncoding::Lossless);
        assert!(lossless.validate().is_ok());
    }

    #[tokio::test]
    async fn empty_image_list_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let assembler = SlideshowAssembler::new(
            AssemblerConfig::default()
                .with_scratch_dir(dir.path())
                .with_resolution(Resolution::NHD),
        );

        let err = assembler.assemble(&[], 3.0, None).await.unwrap_err();
        assert!(matches!(err, PitchError::NoImagesProvided));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn decode_failure_stops_before_encoding() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        DynamicImage::ImageRgb8(RgbImage::new(8, 8)).save(&good).unwrap();
        let bad = dir.path().join("bad.jpg");
        std::fs::write(&bad, b"garbage").unwrap();

        let scratch = dir.path().join("scratch");
        let assembler = SlideshowAssembler::new(
            AssemblerConfig::default()
                .with_scratch_dir(&scratch)
                .with_resolution(Resolution::NHD),
        );

        match assembler.assemble(&[good, bad.clone()], 3.0, None).await {
            Err(PitchError::ImageDecodeFailure { path, .. }) => assert_eq!(path, bad),
            other => panic!("expected ImageDecodeFailure, got {other:?}"),
        }
        assert!(!scratch.exists());
    }

    #[tokio::test]
    async fn load_slides_resizes_to_target() {
        let dir = tempfile::tempdir().unwrap();
        let mut paths = Vec::new();
        for (i, (w, h)) in [(800, 600), (300, 900)].into_iter().enumerate() {
            let path = dir.path().join(format!("slide{i}.png"));
            DynamicImage::ImageRgb8(RgbImage::new(w, h)).save(&path).unwrap();
            paths.push(path);
        }

        let assembler = SlideshowAssembler::new(
            AssemblerConfig::default().with_resolution(Resolution::NHD),
        );
        let slides = assembler.load_slides(&paths, 2.0).await.unwrap();

        assert_eq!(slides.len(), 2);
        for slide in &slides {
            assert_eq!(slide.image.resolution(), Resolution::NHD);
            assert!((slide.seconds - 2.0).abs() < f64::EPSILON);
        }
    }

    #[tokio::test]
    async fn stderr_tail_keeps_last_lines() {
        let log: String = (0..20).map(|i| format!("frame={i}\n")).collect();
        let tail = drain_stderr(log.as_bytes()).await;

        assert_eq!(tail.len(), STDERR_TAIL_LINES);
        assert_eq!(tail.front().map(String::as_str), Some("frame=8"));
        assert_eq!(tail.back().map(String::as_str), Some("frame=19"));
    }
}
