//! Script → narration audio

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use super::sanitize::sanitize_for_speech;
use super::tts::{LanguageCode, SpeechBackend};
use crate::error::{PitchError, Result};
use crate::media::MediaProbe;
use crate::scratch::ScratchFile;

/// Encoded narration (MP3) held in a scratch file
#[derive(Debug)]
pub struct AudioAsset {
    file: ScratchFile,
    /// Playback duration measured after writing
    pub duration: Duration,
    pub byte_len: u64,
    pub language: LanguageCode,
}

impl AudioAsset {
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub async fn bytes(&self) -> Result<Vec<u8>> {
        self.file.read().await
    }

    pub fn persist(self, dest: &Path) -> Result<PathBuf> {
        self.file.persist(dest)
    }

    pub fn keep(self) -> Result<PathBuf> {
        self.file.keep()
    }
}

/// Narration Synthesizer: sanitizes a script, speaks it and measures the result.
pub struct NarrationSynthesizer<'a> {
    backend: &'a dyn SpeechBackend,
    probe: &'a dyn MediaProbe,
    scratch_dir: PathBuf,
}

impl<'a> NarrationSynthesizer<'a> {
    pub fn new(
        backend: &'a dyn SpeechBackend,
        probe: &'a dyn MediaProbe,
        scratch_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            backend,
            probe,
            scratch_dir: scratch_dir.into(),
        }
    }

    pub async fn synthesize(&self, script: &str, language: &LanguageCode) -> Result<AudioAsset> {
        let text = sanitize_for_speech(script);
        if text.is_empty() {
            return Err(PitchError::SynthesisFailure(
                "script is empty after sanitization".to_string(),
            ));
        }

        info!(
            "Synthesizing narration ({} words, lang={})",
            text.split_whitespace().count(),
            language
        );

        let audio = self.backend.synthesize(&text, language).await?;
        if audio.is_empty() {
            return Err(PitchError::SynthesisFailure(
                "speech backend returned no audio".to_string(),
            ));
        }

        let file = ScratchFile::create(&self.scratch_dir, ".mp3")?;
        file.write_all(&audio).await?;
        debug!("Wrote {} bytes of narration to {}", audio.len(), file.path().display());

        let info = self.probe.probe(file.path()).await.map_err(|e| {
            PitchError::SynthesisFailure(format!("could not measure narration length: {e}"))
        })?;

        info!("Narration is {:.1}s", info.duration.as_secs_f64());

        Ok(AudioAsset {
            file,
            duration: info.duration,
            byte_len: audio.len() as u64,
            language: language.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::MediaInfo;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingBackend {
        audio: Vec<u8>,
        spoken: Mutex<Vec<String>>,
    }

    impl RecordingBackend {
        fn returning(audio: &[u8]) -> Self {
            Self {
                audio: audio.to_vec(),
                spoken: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SpeechBackend for RecordingBackend {
        async fn synthesize(&self, text: &str, _language: &LanguageCode) -> Result<Vec<u8>> {
            self.spoken.lock().unwrap().push(text.to_string());
            Ok(self.audio.clone())
        }
    }

    struct FixedProbe(Duration);

    #[async_trait]
    impl MediaProbe for FixedProbe {
        async fn probe(&self, _path: &Path) -> Result<MediaInfo> {
            Ok(MediaInfo {
                duration: self.0,
                video: None,
                audio: None,
            })
        }
    }

    #[tokio::test]
    async fn speaks_sanitized_text_and_measures_duration() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::returning(b"ID3fake-mp3");
        let probe = FixedProbe(Duration::from_millis(8_400));
        let synth = NarrationSynthesizer::new(&backend, &probe, dir.path());

        let audio = synth
            .synthesize("## Hello\n- **world**", &LanguageCode::default())
            .await
            .unwrap();

        assert_eq!(backend.spoken.lock().unwrap().as_slice(), ["Hello world"]);
        assert_eq!(audio.duration, Duration::from_millis(8_400));
        assert_eq!(audio.byte_len, 11);
        assert_eq!(audio.bytes().await.unwrap(), b"ID3fake-mp3");
        assert!(audio.path().to_string_lossy().ends_with(".mp3"));
    }

    #[tokio::test]
    async fn empty_script_fails_before_backend() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::returning(b"x");
        let probe = FixedProbe(Duration::from_secs(1));
        let synth = NarrationSynthesizer::new(&backend, &probe, dir.path());

        let err = synth
            .synthesize("  **  \n - ", &LanguageCode::default())
            .await
            .unwrap_err();
        assert!(matches!(err, PitchError::SynthesisFailure(_)));
        assert!(backend.spoken.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_audio_is_failure_and_leaves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::returning(b"");
        let probe = FixedProbe(Duration::from_secs(1));
        let synth = NarrationSynthesizer::new(&backend, &probe, dir.path());

        let err = synth.synthesize("Hi", &LanguageCode::default()).await.unwrap_err();
        assert!(matches!(err, PitchError::SynthesisFailure(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn scratch_audio_released_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::returning(b"mp3");
        let probe = FixedProbe(Duration::from_secs(2));
        let synth = NarrationSynthesizer::new(&backend, &probe, dir.path());

        let audio = synth.synthesize("Hi", &LanguageCode::default()).await.unwrap();
        let path = audio.path().to_path_buf();
        assert!(path.exists());
        drop(audio);
        assert!(!path.exists());
    }
}
