//! HTTP client for a Gemini-style `generateContent` inference endpoint.
//!
//! One blocking client serves both collaborator roles: vision field
//! extraction (instruction + inline PNG) and narrative text generation
//! (prompt only). The request timeout is explicit — the pipeline must never
//! hang on a network call.

use base64::Engine as _;
use serde::{Deserialize, Serialize};

use super::{GenerationClient, InferenceError, VisionClient};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Blocking client for the multimodal inference service.
pub struct GeminiClient {
    base_url: String,
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl GeminiClient {
    /// Create a client pointing at a specific endpoint.
    pub fn new(base_url: &str, api_key: &str, timeout_secs: u64) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client,
            timeout_secs,
        }
    }

    /// Production endpoint with an explicit timeout.
    pub fn with_credential(api_key: &str, timeout_secs: u64) -> Self {
        Self::new(DEFAULT_BASE_URL, api_key, timeout_secs)
    }

    pub fn with_model(mut self, model: &str) -> Self {
        self.model = model.to_string();
        self
    }

    fn generate_content(&self, parts: Vec<Part>) -> Result<String, InferenceError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );
        let body = GenerateContentRequest {
            contents: vec![Content { parts }],
        };

        let response = self.client.post(&url).json(&body).send().map_err(|e| {
            if e.is_connect() {
                InferenceError::NotReachable
            } else if e.is_timeout() {
                InferenceError::Timeout(self.timeout_secs)
            } else {
                InferenceError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().unwrap_or_default();
            return Err(InferenceError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .map_err(|e| InferenceError::ResponseParsing(e.to_string()))?;

        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(InferenceError::EmptyResponse);
        }
        Ok(text)
    }
}

impl VisionClient for GeminiClient {
    fn describe_image(
        &self,
        image_png: &[u8],
        instruction: &str,
    ) -> Result<String, InferenceError> {
        let _span = tracing::info_span!(
            "vision_inference",
            model = %self.model,
            image_size = image_png.len(),
        )
        .entered();

        let data = base64::engine::general_purpose::STANDARD.encode(image_png);
        self.generate_content(vec![
            Part::text(instruction),
            Part::inline_png(data),
        ])
    }
}

impl GenerationClient for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, InferenceError> {
        let _span = tracing::info_span!(
            "text_generation",
            model = %self.model,
            prompt_len = prompt.len(),
        )
        .entered();

        self.generate_content(vec![Part::text(prompt)])
    }
}

// ──────────────────────────────────────────────
// Wire types
// ──────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "inline_data", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            inline_data: None,
        }
    }

    fn inline_png(data: String) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: "image/png".to_string(),
                data,
            }),
        }
    }
}

#[derive(Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentOut>,
}

#[derive(Deserialize)]
struct ContentOut {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Deserialize)]
struct PartOut {
    text: Option<String>,
}

// ──────────────────────────────────────────────
// Mocks (testing)
// ──────────────────────────────────────────────

/// Mock vision collaborator — returns a configured response or failure.
pub struct MockVisionClient {
    response: Result<String, String>,
}

impl MockVisionClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: Ok(response.to_string()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
        }
    }
}

impl VisionClient for MockVisionClient {
    fn describe_image(
        &self,
        _image_png: &[u8],
        _instruction: &str,
    ) -> Result<String, InferenceError> {
        self.response
            .clone()
            .map_err(InferenceError::Network)
    }
}

/// Mock text-generation collaborator.
pub struct MockGenerationClient {
    response: String,
}

impl MockGenerationClient {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
        }
    }
}

impl GenerationClient for MockGenerationClient {
    fn generate(&self, _prompt: &str) -> Result<String, InferenceError> {
        Ok(self.response.clone())
    }
}
