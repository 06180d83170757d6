//! Narration: script text to spoken audio
//!
//! [`NarrationSynthesizer`] sanitizes a script, hands it to a
//! [`SpeechBackend`] and measures the resulting MP3 with a
//! [`MediaProbe`](crate::media::MediaProbe).

pub mod sanitize;
pub mod synthesizer;
pub mod tts;

pub use sanitize::{normalize_for_pdf, sanitize_for_speech};
pub use synthesizer::{AudioAsset, NarrationSynthesizer};
pub use tts::{chunk_text, GoogleTranslateTts, LanguageCode, SpeechBackend, MAX_CHUNK_CHARS};
