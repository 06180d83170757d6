//! Speech backends
//!
//! The default backend speaks the public Google Translate TTS endpoint. That
//! endpoint accepts at most 100 characters per request, so text is split at
//! word boundaries and the returned MP3 segments are concatenated.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use url::Url;

use crate::config::SpeechSettings;
use crate::error::{PitchError, Result};

/// Longest text the translate endpoint accepts per request
pub const MAX_CHUNK_CHARS: usize = 100;

const USER_AGENT: &str = concat!("pitchreel/", env!("CARGO_PKG_VERSION"));

/// Validated language tag (`en`, `fr`, `pt-BR`, `zh-CN`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LanguageCode(String);

impl LanguageCode {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for LanguageCode {
    fn default() -> Self {
        Self("en".to_string())
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let invalid = || PitchError::InvalidSettings(format!("invalid language code '{s}'"));

        let (primary, region) = match s.split_once('-') {
            Some((p, r)) => (p, Some(r)),
            None => (s, None),
        };

        if !(2..=3).contains(&primary.len()) || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }

        let mut code = primary.to_ascii_lowercase();
        if let Some(region) = region {
            if !(2..=4).contains(&region.len())
                || !region.chars().all(|c| c.is_ascii_alphanumeric())
            {
                return Err(invalid());
            }
            code.push('-');
            code.push_str(region);
        }

        Ok(Self(code))
    }
}

/// Turns text into encoded speech (MP3 bytes).
#[async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn synthesize(&self, text: &str, language: &LanguageCode) -> Result<Vec<u8>>;
}

/// [`SpeechBackend`] backed by the Google Translate TTS endpoint
pub struct GoogleTranslateTts {
    client: reqwest::Client,
    tld: String,
    slow: bool,
}

impl GoogleTranslateTts {
    pub fn new(settings: &SpeechSettings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| PitchError::SynthesisFailure(format!("HTTP client setup: {e}")))?;

        Ok(Self {
            client,
            tld: settings.tld.clone(),
            slow: settings.slow,
        })
    }

    fn endpoint(
        &self,
        chunk: &str,
        language: &LanguageCode,
        idx: usize,
        total: usize,
    ) -> Result<Url> {
        let speed = if self.slow { "0.3" } else { "1" };
        let total = total.to_string();
        let idx = idx.to_string();
        let textlen = chunk.chars().count().to_string();

        Url::parse_with_params(
            &format!("https://translate.google.{}/translate_tts", self.tld),
            [
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("q", chunk),
                ("tl", language.as_str()),
                ("ttsspeed", speed),
                ("total", total.as_str()),
                ("idx", idx.as_str()),
                ("textlen", textlen.as_str()),
            ],
        )
        .map_err(|e| PitchError::SynthesisFailure(format!("bad TTS endpoint: {e}")))
    }
}

#[async_trait]
impl SpeechBackend for GoogleTranslateTts {
    async fn synthesize(&self, text: &str, language: &LanguageCode) -> Result<Vec<u8>> {
        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        if chunks.is_empty() {
            return Err(PitchError::SynthesisFailure("nothing to speak".to_string()));
        }

        let mut audio = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            let url = self.endpoint(chunk, language, idx, chunks.len())?;
            debug!("TTS request {}/{} ({} chars)", idx + 1, chunks.len(), chunk.len());

            let response = self.client.get(url).send().await.map_err(|e| {
                PitchError::SynthesisFailure(format!("TTS service unreachable: {e}"))
            })?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(PitchError::SynthesisFailure(format!(
                    "TTS service returned {status}: {}",
                    body.chars().take(200).collect::<String>()
                )));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| PitchError::SynthesisFailure(e.to_string()))?;
            audio.extend_from_slice(&bytes);
        }

        if audio.is_empty() {
            return Err(PitchError::SynthesisFailure(
                "TTS service returned no audio".to_string(),
            ));
        }

        Ok(audio)
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Breaks at whitespace; a single word longer than the limit is split on
/// character boundaries.
#[must_use]
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();

        if word_len > max_chars {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                chunks.push(piece.iter().collect());
            }
            continue;
        }

        let needed = if current.is_empty() { word_len } else { current_len + 1 + word_len };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }

        if !current.is_empty() {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }

    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunks_respect_limit_without_splitting_words() {
        let text = "Acme turns every sales call into a crisp narrated demo. ".repeat(10);
        let chunks = chunk_text(&text, MAX_CHUNK_CHARS);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= MAX_CHUNK_CHARS, "{chunk:?}");
            assert!(!chunk.starts_with(' ') && !chunk.ends_with(' '));
        }
        let rejoined = chunks.join(" ");
        assert_eq!(rejoined, text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("Hello there", 100), vec!["Hello there"]);
        assert!(chunk_text("   ", 100).is_empty());
    }

    #[test]
    fn overlong_word_is_hard_split() {
        let word = "é".repeat(25);
        let chunks = chunk_text(&format!("a {word} b"), 10);
        assert_eq!(chunks[0], "a");
        assert_eq!(chunks[1].chars().count(), 10);
        assert_eq!(chunks[3].chars().count(), 5);
        assert_eq!(chunks.last().map(String::as_str), Some("b"));
    }

    #[test]
    fn exact_fit_stays_together() {
        assert_eq!(chunk_text("abcd efgh", 9), vec!["abcd efgh"]);
        assert_eq!(chunk_text("abcd efghi", 9), vec!["abcd", "efghi"]);
    }

    #[test]
    fn language_codes() {
        assert_eq!("en".parse::<LanguageCode>().unwrap().as_str(), "en");
        assert_eq!("FR".parse::<LanguageCode>().unwrap().as_str(), "fr");
        assert_eq!("pt-BR".parse::<LanguageCode>().unwrap().as_str(), "pt-BR");
        assert!("english".parse::<LanguageCode>().is_err());
        assert!("e".parse::<LanguageCode>().is_err());
        assert!("en-".parse::<LanguageCode>().is_err());
        assert!("en us".parse::<LanguageCode>().is_err());
    }

    #[test]
    fn endpoint_encodes_query() {
        let tts = GoogleTranslateTts::new(&SpeechSettings::default()).unwrap();
        let url = tts
            .endpoint("Hello & welcome", &LanguageCode::default(), 0, 1)
            .unwrap();

        assert_eq!(url.host_str(), Some("translate.google.com"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("q".to_string(), "Hello & welcome".to_string())));
        assert!(pairs.contains(&("tl".to_string(), "en".to_string())));
        assert!(pairs.contains(&("client".to_string(), "tw-ob".to_string())));
    }
}
