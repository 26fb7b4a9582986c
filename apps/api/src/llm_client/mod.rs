/// LLM Client — the single point of entry for all Gemini API calls.
///
/// ARCHITECTURAL RULE: No other module may call the Gemini API directly.
/// All model interactions MUST go through this module.
///
/// Model: gemini-1.5-flash (hardcoded — do not make configurable to prevent drift)
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all generation calls.
pub const MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyContent,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// Capability for producing one text reply from one prompt.
/// `AppState` holds an `Arc<dyn TextGenerator>` so tests can substitute
/// a canned fake for the real Gemini client.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

/// The Gemini client used by the service in production.
/// Holds only a fixed credential and a reusable HTTP client, so it is
/// safely shareable across concurrent requests without synchronization.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    /// Makes a single generateContent call and returns the first text part.
    /// No retries: failures surface directly to the caller.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let url = format!("{GEMINI_API_URL}/{MODEL}:generateContent");
        let response = self
            .client
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to extract the structured error message
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: GenerateContentResponse = response.json().await?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().find_map(|p| p.text))
            .ok_or(LlmError::EmptyContent)?;

        debug!("Gemini call succeeded: {} chars", text.len());

        Ok(text)
    }
}
