//! Generative-language API client.
//!
//! One `generateContent` round trip per analysis request. Every call is
//! classified into a tagged outcome the pipeline dispatches on: generated
//! text, a rate-limit signal, a remote error, a transport failure, or a
//! well-formed-but-empty response. No sentinel strings.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::http_client::api_client;
use super::models::ModelId;
use crate::pipeline::Analyzer;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Failure classification for a single generation call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Remote quota or throughput exceeded. The only recoverable condition.
    #[error("rate limited by the remote service")]
    RateLimited,

    /// Non-success status other than a rate limit.
    #[error("API error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Transport-level failure before a status was received.
    #[error("connection failure: {0}")]
    Connection(String),

    /// Success status but no usable generated text in the body.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Client bound to one resolved model and one credential for the whole run.
pub struct GeminiClient {
    api_key: String,
    model: ModelId,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: ModelId) -> Self {
        Self {
            api_key,
            model,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    /// Point the client at a different host. Used by integration setups.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &ModelId {
        &self.model
    }

    /// Send one prompt and classify the outcome.
    pub async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
        };

        let url = format!(
            "{}/v1beta/{}:generateContent",
            self.base_url,
            self.model.as_str()
        );

        let response = api_client()
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ApiError::Connection(e.to_string()))?;

        let status = response.status();

        if status.as_u16() == 429 {
            tracing::warn!("[GeminiClient] Rate limited (429)");
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Remote {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .map(|c| {
                c.content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ApiError::MalformedResponse(
                "no generated text in response".to_string(),
            ));
        }

        Ok(text.trim().to_string())
    }
}

#[async_trait::async_trait]
impl Analyzer for GeminiClient {
    async fn analyze(&self, prompt: &str) -> Result<String, ApiError> {
        self.generate(prompt).await
    }
}

/// Pull the human-readable message out of an API error body, falling back
/// to the raw body when it is not the documented JSON shape.
fn extract_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => parsed.error.message,
        Err(_) => body.trim().to_string(),
    }
}

// API request/response types

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}
