//! Shared HTTP plumbing and the OpenAI-compatible chat completions format.
//!
//! DeepSeek and OpenAI speak the same `/v1/chat/completions` dialect; only the
//! endpoint, model and credential differ.

use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::{Completion, ProviderError, ProviderId};

/// Sampling temperature sent to every provider that accepts one.
pub(crate) const TEMPERATURE: f64 = 0.7;

/// Longest slice of an error body kept in an error message.
const MAX_ERROR_BODY: usize = 300;

/// Send `body` and return the raw response text of a 2xx reply.
pub(crate) async fn send_json<B: Serialize + ?Sized>(
    provider: ProviderId,
    request: RequestBuilder,
    body: &B,
) -> Result<String, ProviderError> {
    let response = request
        .header("Content-Type", "application/json")
        .json(body)
        .send()
        .await
        .map_err(|e| ProviderError::transport(provider, e))?;

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| ProviderError::transport(provider, e))?;

    if !status.is_success() {
        return Err(ProviderError::Status {
            provider,
            status: status.as_u16(),
            message: api_error_message(&text, status.canonical_reason()),
        });
    }

    Ok(text)
}

/// Pull a readable message out of an error body.
///
/// Most providers answer `{"error": {"message": ...}}`; anything else is
/// truncated verbatim.
fn api_error_message(body: &str, reason: Option<&str>) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return parsed.error.message;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return reason.unwrap_or("no response body").to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY).collect()
}

/// Chat completions request body.
#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: [ChatMessage<'a>; 2],
    pub temperature: f64,
}

impl<'a> ChatRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, system_prompt: &'a str) -> Self {
        Self {
            model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Extract `choices[0].message.content` from a chat completions reply.
pub(crate) fn extract_chat_text(provider: ProviderId, body: &str) -> Result<String, ProviderError> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| {
            ProviderError::envelope(provider, format!("Failed to parse response: {}", e))
        })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| ProviderError::envelope(provider, "No content in response"))
}

/// Run one chat completions call against an OpenAI-compatible endpoint.
pub(crate) async fn complete_chat(
    provider: ProviderId,
    client: &Client,
    endpoint: &str,
    api_key: Option<&str>,
    model: &str,
    prompt: &str,
    system_prompt: &str,
) -> Result<Completion, ProviderError> {
    let api_key = api_key.ok_or(ProviderError::MissingCredential { provider })?;

    tracing::debug!("Sending request to {}: model={}", provider, model);

    let request = client
        .post(endpoint)
        .header("Authorization", format!("Bearer {}", api_key));
    let body = send_json(provider, request, &ChatRequest::new(model, prompt, system_prompt)).await?;

    Ok(Completion {
        text: extract_chat_text(provider, &body)?,
        provider,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_shape() {
        let body =
            serde_json::to_value(ChatRequest::new("deepseek-chat", "user text", "sys")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "model": "deepseek-chat",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "user text"}
                ],
                "temperature": 0.7
            })
        );
    }

    #[test]
    fn test_extract_chat_text() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"a\":1}"}}]}"#;
        assert_eq!(
            extract_chat_text(ProviderId::DeepSeek, body).unwrap(),
            r#"{"a":1}"#
        );
    }

    #[test]
    fn test_extract_chat_text_rejects_empty() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":[{"message":{"content":"  "}}]}"#,
            "not json",
        ] {
            let err = extract_chat_text(ProviderId::OpenAi, body).unwrap_err();
            assert!(matches!(err, ProviderError::Envelope { .. }), "{}", body);
        }
    }

    #[test]
    fn test_api_error_message() {
        assert_eq!(
            api_error_message(r#"{"error":{"message":"Invalid API key","type":"auth"}}"#, None),
            "Invalid API key"
        );
        assert_eq!(api_error_message("", Some("Bad Gateway")), "Bad Gateway");
        assert_eq!(api_error_message("upstream down", None), "upstream down");
    }
}
