//! OpenAI adapter (tier 3).

use async_trait::async_trait;
use reqwest::Client;

use super::chat::complete_chat;
use super::{Completion, ProviderAdapter, ProviderError, ProviderId};

const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const OPENAI_MODEL: &str = "gpt-4-turbo";

/// OpenAI chat completions client.
pub struct OpenAiAdapter {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl OpenAiAdapter {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: OPENAI_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl ProviderAdapter for OpenAiAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::OpenAi
    }

    async fn call(&self, prompt: &str, system_prompt: &str) -> Result<Completion, ProviderError> {
        complete_chat(
            ProviderId::OpenAi,
            &self.client,
            &self.endpoint,
            self.api_key.as_deref(),
            OPENAI_MODEL,
            prompt,
            system_prompt,
        )
        .await
    }
}
