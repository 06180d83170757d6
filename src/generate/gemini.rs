//! Gemini `generateContent` client

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::TextGenerator;
use crate::config::GenerationSettings;
use crate::error::{PitchError, Result};

/// Connection settings for [`GeminiClient`]
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Combine file settings with a resolved credential.
    ///
    /// A missing or blank key is a [`PitchError::GenerationFailure`].
    pub fn from_settings(settings: &GenerationSettings, api_key: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                PitchError::GenerationFailure(format!(
                    "no API key configured (set {} or generation.api_key)",
                    crate::config::API_KEY_ENV
                ))
            })?;

        Ok(Self {
            api_key,
            model: settings.model.clone(),
            api_base: settings.api_base.trim_end_matches('/').to_string(),
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }
}

/// Explicit generative-text client, built once and passed by reference
pub struct GeminiClient {
    client: reqwest::Client,
    config: GeminiConfig,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(config.timeout)
            .build()
            .map_err(|e| PitchError::GenerationFailure(format!("HTTP client setup: {e}")))?;

        Ok(Self { client, config })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.api_base, self.config.model
        )
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = self.endpoint();
        debug!("POST {}", url);

        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some(prompt.to_string()),
                }],
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| PitchError::GenerationFailure(format!("Gemini unreachable: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PitchError::GenerationFailure(e.to_string()))?;

        if !status.is_success() {
            return Err(PitchError::GenerationFailure(format!(
                "Gemini API error ({status}): {}",
                api_error_message(&body)
            )));
        }

        let text = parse_response(&body)?;
        info!(
            "Generated {} words with {}",
            text.split_whitespace().count(),
            self.config.model
        );
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Extract the generated text from a `generateContent` response body.
///
/// Text parts of the first candidate are joined in order.
pub fn parse_response(body: &str) -> Result<String> {
    let response: GenerateResponse = serde_json::from_str(body)
        .map_err(|e| PitchError::GenerationFailure(format!("unexpected response: {e}")))?;

    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(PitchError::GenerationFailure(format!(
            "prompt was blocked ({reason})"
        )));
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| PitchError::GenerationFailure("response had no candidates".to_string()))?;

    let text: String = candidate
        .content
        .parts
        .into_iter()
        .filter_map(|p| p.text)
        .collect();
    let text = text.trim();

    if text.is_empty() {
        let reason = candidate.finish_reason.unwrap_or_else(|| "unknown".to_string());
        return Err(PitchError::GenerationFailure(format!(
            "model returned no text (finish reason: {reason})"
        )));
    }

    Ok(text.to_string())
}

fn api_error_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.chars().take(300).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joins_multi_part_text() {
        let body = r#"{
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Meet Acme. "}, {"text": "It ships fast."}]},
                "finishReason": "STOP"
            }]
        }"#;
        assert_eq!(parse_response(body).unwrap(), "Meet Acme. It ships fast.");
    }

    #[test]
    fn blocked_prompt_is_failure() {
        let body = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let err = parse_response(body).unwrap_err();
        assert!(matches!(err, PitchError::GenerationFailure(_)));
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn empty_candidate_reports_finish_reason() {
        let body = r#"{"candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]}"#;
        let err = parse_response(body).unwrap_err();
        assert!(err.to_string().contains("MAX_TOKENS"));

        let body = r#"{"candidates": [{"finishReason": "RECITATION"}]}"#;
        assert!(parse_response(body).is_err());
    }

    #[test]
    fn no_candidates_is_failure() {
        assert!(parse_response(r#"{"candidates": []}"#).is_err());
        assert!(parse_response("not json").is_err());
    }

    #[test]
    fn api_error_message_is_extracted() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(api_error_message(body), "API key not valid.");
        assert_eq!(api_error_message("oops"), "oops");
    }

    #[test]
    fn missing_key_is_generation_failure() {
        let settings = GenerationSettings::default();
        assert!(matches!(
            GeminiConfig::from_settings(&settings, None),
            Err(PitchError::GenerationFailure(_))
        ));
        assert!(GeminiConfig::from_settings(&settings, Some("  ".to_string())).is_err());
    }

    #[test]
    fn endpoint_uses_model() {
        let settings = GenerationSettings {
            api_base: "https://example.test/".to_string(),
            ..Default::default()
        };
        let config = GeminiConfig::from_settings(&settings, Some("k".to_string())).unwrap();
        let client = GeminiClient::new(config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn request_serializes_contents() {
        let request = GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: Some("hi".to_string()),
                }],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(json["contents"][0]["role"], "user");
    }
}
