//! Gemini API transcriber adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::application::ports::{Transcriber, TranscriptionError};
use crate::domain::transcription::{AudioData, SystemPrompt};

/// Gemini API model to use
const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";

/// Gemini API base URL
const API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

// Request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<Content>,
    system_instruction: SystemInstruction,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<AudioPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AudioPart {
    inline_data: InlineData,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: i32,
}

// Response types

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<ResponsePart>>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    status: Option<String>,
}

/// Gemini API transcriber
pub struct GeminiTranscriber {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiTranscriber {
    /// Create a new Gemini transcriber with the given API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Use a different model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Point at a different API root (used by tests against a mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        )
    }

    fn build_request(&self, audio: &AudioData, prompt: &SystemPrompt) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![AudioPart {
                    inline_data: InlineData {
                        mime_type: audio.mime_type().to_string(),
                        data: audio.to_base64(),
                    },
                }],
            }],
            system_instruction: SystemInstruction {
                parts: vec![TextPart {
                    text: prompt.content().to_string(),
                }],
            },
            generation_config: GenerationConfig {
                temperature: 0.0,
                // Thinking adds latency to every interim update
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        }
    }

    /// Concatenate the text parts of the first candidate.
    ///
    /// `None` when there is no candidate at all; a candidate without text
    /// (silence) yields an empty string.
    fn extract_text(response: &GenerateContentResponse) -> Option<String> {
        let candidate = response.candidates.as_ref()?.first()?;

        let text = candidate
            .content
            .as_ref()
            .and_then(|c| c.parts.as_ref())
            .map(|parts| {
                parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default();

        Some(text)
    }

    fn is_bad_key(error: &ApiError) -> bool {
        error.message.contains("API key not valid")
            || error.status.as_deref() == Some("UNAUTHENTICATED")
    }
}

#[async_trait]
impl Transcriber for GeminiTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioData,
        prompt: &SystemPrompt,
    ) -> Result<String, TranscriptionError> {
        let body = self.build_request(audio, prompt);

        let response = self
            .client
            .post(self.api_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let status = response.status();

        match status {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                return Err(TranscriptionError::InvalidApiKey)
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => return Err(TranscriptionError::RateLimited),
            _ => {}
        }

        let text = response
            .text()
            .await
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let parsed: Result<GenerateContentResponse, _> = serde_json::from_str(&text);

        if !status.is_success() {
            return Err(match parsed.ok().and_then(|r| r.error) {
                Some(error) if Self::is_bad_key(&error) => TranscriptionError::InvalidApiKey,
                Some(error) => TranscriptionError::ApiError(error.message),
                None => TranscriptionError::ApiError(format!("HTTP {}: {}", status, text)),
            });
        }

        let response = parsed.map_err(|e| TranscriptionError::ParseError(e.to_string()))?;

        if let Some(error) = response.error {
            return Err(TranscriptionError::ApiError(error.message));
        }

        let transcript = Self::extract_text(&response).ok_or(TranscriptionError::EmptyResponse)?;
        Ok(transcript.trim().to_string())
    }
}
