//! Gemini `generateContent` client.

use std::time::Duration;

use nexus_types::{ApiError, Message};
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::wire::{Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig};

/// The default Gemini API base URL.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// The default model.
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

/// The default max output tokens for a reply.
pub const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Client for the Gemini `generateContent` endpoint.
///
/// Every call sends the whole conversation; the service keeps no state
/// between calls. Failures are classified into [`ApiError`] and never retried.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: Option<f32>,
    system_prompt: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiClient {
    /// Create a new client with the default model.
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
            system_prompt: None,
            timeout: None,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Per-request timeout; an expired request fails with [`ApiError::Timeout`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the request body for `context` followed by `new_text`.
    pub fn build_request(&self, context: &[Message], new_text: &str) -> GenerateContentRequest {
        let mut contents: Vec<Content> = context.iter().map(Content::from_message).collect();
        contents.push(Content::text(Some("user"), new_text));

        GenerateContentRequest {
            contents,
            system_instruction: self
                .system_prompt
                .as_deref()
                .map(|text| Content::text(None, text)),
            generation_config: GenerationConfig {
                max_output_tokens: self.max_tokens,
                temperature: self.temperature,
            },
        }
    }

    /// Send one chat turn and return the complete reply text.
    pub async fn generate(&self, context: &[Message], new_text: &str) -> Result<String, ApiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "x-goog-api-key",
            HeaderValue::from_str(&self.api_key).map_err(|_| ApiError::Auth {
                message: "Invalid API key format".into(),
            })?,
        );

        let request = self.build_request(context, new_text);
        let body = serde_json::to_string(&request).map_err(|e| ApiError::BadRequest {
            message: format!("Failed to serialize request: {e}"),
        })?;

        tracing::debug!(
            "POST {url} ({} context messages, {} bytes)",
            context.len(),
            body.len()
        );

        let mut builder = self.http.post(&url).headers(headers).body(body);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let response = builder.send().await.map_err(classify_transport)?;
        let status = response.status();
        let body_text = response.text().await.map_err(classify_transport)?;

        if !status.is_success() {
            let err = classify_error(status.as_u16(), &body_text);
            tracing::warn!("Gemini request failed: {err}");
            return Err(err);
        }

        parse_reply(&body_text)
    }
}

/// Extract the reply text from a successful response body.
fn parse_reply(body: &str) -> Result<String, ApiError> {
    let response: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))?;

    if let Some(usage) = &response.usage_metadata {
        tracing::debug!(
            "Token usage: prompt {}, reply {}, total {}",
            usage.prompt_token_count,
            usage.candidates_token_count,
            usage.total_token_count
        );
    }

    if let Some(text) = response.text() {
        return Ok(text);
    }

    let reason = response
        .prompt_feedback
        .and_then(|f| f.block_reason)
        .or_else(|| {
            response
                .candidates
                .first()
                .and_then(|c| c.finish_reason.clone())
        })
        .unwrap_or_else(|| "empty response".to_string());
    Err(ApiError::Blocked { reason })
}

fn classify_transport(e: reqwest::Error) -> ApiError {
    if e.is_timeout() {
        ApiError::Timeout
    } else if e.is_decode() {
        ApiError::Decode(e.to_string())
    } else {
        ApiError::Network(e.to_string())
    }
}

/// Classify an HTTP error response into a typed ApiError.
fn classify_error(status: u16, body: &str) -> ApiError {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: Option<ErrorDetail>,
    }
    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .and_then(|e| e.message)
        .unwrap_or_else(|| body.to_string());

    match status {
        400 => ApiError::BadRequest { message },
        401 | 403 => ApiError::Auth { message },
        429 => ApiError::RateLimited { message },
        _ => ApiError::Server { status, message },
    }
}
