//! Google Gemini adapter (tier 2).
//!
//! Gemini's `generateContent` has no separate system role in the basic
//! request shape, so the system prompt is prepended to the user prompt.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::chat::send_json;
use super::{Completion, ProviderAdapter, ProviderError, ProviderId};

const GEMINI_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";
const GEMINI_MODEL: &str = "gemini-1.5-flash";

/// Gemini `generateContent` client.
pub struct GeminiAdapter {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl GeminiAdapter {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: GEMINI_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl ProviderAdapter for GeminiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::Gemini
    }

    async fn call(&self, prompt: &str, system_prompt: &str) -> Result<Completion, ProviderError> {
        let provider = ProviderId::Gemini;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(ProviderError::MissingCredential { provider })?;

        tracing::debug!("Sending request to {}: model={}", provider, GEMINI_MODEL);

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: Some(format!("{}\n\n{}", system_prompt, prompt)),
                }],
            }],
        };
        let builder = self
            .client
            .post(&self.endpoint)
            .header("x-goog-api-key", api_key);
        let body = send_json(provider, builder, &request).await?;

        Ok(Completion {
            text: extract_candidate_text(&body)?,
            provider,
        })
    }
}

/// Extract `candidates[0].content.parts[0].text`.
fn extract_candidate_text(body: &str) -> Result<String, ProviderError> {
    let provider = ProviderId::Gemini;
    let parsed: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| {
            ProviderError::envelope(provider, format!("Failed to parse response: {}", e))
        })?;

    parsed
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|content| content.parts.into_iter().next())
        .and_then(|part| part.text)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ProviderError::envelope(provider, "No candidates in response"))
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}
