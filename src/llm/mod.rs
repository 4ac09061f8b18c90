//! LLM provider layer.
//!
//! Three backends sit behind one [`ProviderAdapter`] trait and are only ever
//! reached through the [`FallbackChain`], which tries them strictly in order:
//!
//! ```text
//!   DeepSeek (tier 1) ──fail──► Gemini (tier 2) ──fail──► OpenAI (tier 3) ──fail──► AllProvidersFailed
//!        │                          │                          │
//!        └──ok──────────────────────┴──ok──────────────────────┴──ok──► Completion
//! ```
//!
//! Adapters never retry and never panic; every transport problem comes back
//! as a [`ProviderError`] for the chain to absorb.

mod chat;
mod deepseek;
mod error;
mod fallback;
mod gemini;
mod openai;
#[cfg(test)]
mod stub;

pub use deepseek::DeepSeekAdapter;
pub use error::{classify_http_status, ProviderError, ProviderErrorKind};
pub use fallback::{FallbackChain, FallbackError, FallbackEvent, FallbackState, Tier, TierAttempt};
pub use gemini::GeminiAdapter;
pub use openai::OpenAiAdapter;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identifies which backend produced (or failed to produce) a completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    DeepSeek,
    Gemini,
    OpenAi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::DeepSeek => "deepseek",
            ProviderId::Gemini => "gemini",
            ProviderId::OpenAi => "openai",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text generated by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub text: String,
    pub provider: ProviderId,
}

/// Uniform call contract for one AI backend.
///
/// Implementations build their own payload, talk to a fixed endpoint with
/// their own credential, and turn every failure into a [`ProviderError`].
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which backend this adapter talks to.
    fn id(&self) -> ProviderId;

    /// Send one completion request.
    async fn call(&self, prompt: &str, system_prompt: &str) -> Result<Completion, ProviderError>;
}

/// Wire envelope for advisory results: `{success, data?, error?, provider?}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiResponse<T = String> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
}

impl<T> AiResponse<T> {
    pub fn ok(data: T, provider: ProviderId) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            provider: Some(provider),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            provider: None,
        }
    }
}

impl From<Result<Completion, FallbackError>> for AiResponse {
    fn from(result: Result<Completion, FallbackError>) -> Self {
        match result {
            Ok(completion) => AiResponse::ok(completion.text, completion.provider),
            Err(e) => AiResponse::failed(e.to_string()),
        }
    }
}
