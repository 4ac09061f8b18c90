//! DeepSeek adapter (tier 1).

use async_trait::async_trait;
use reqwest::Client;

use super::chat::complete_chat;
use super::{Completion, ProviderAdapter, ProviderError, ProviderId};

const DEEPSEEK_API_URL: &str = "https://api.deepseek.com/v1/chat/completions";
const DEEPSEEK_MODEL: &str = "deepseek-chat";

/// DeepSeek chat completions client.
pub struct DeepSeekAdapter {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

impl DeepSeekAdapter {
    pub fn new(client: Client, api_key: Option<String>) -> Self {
        Self {
            client,
            api_key,
            endpoint: DEEPSEEK_API_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_endpoint(mut self, endpoint: String) -> Self {
        self.endpoint = endpoint;
        self
    }
}

#[async_trait]
impl ProviderAdapter for DeepSeekAdapter {
    fn id(&self) -> ProviderId {
        ProviderId::DeepSeek
    }

    async fn call(&self, prompt: &str, system_prompt: &str) -> Result<Completion, ProviderError> {
        complete_chat(
            ProviderId::DeepSeek,
            &self.client,
            &self.endpoint,
            self.api_key.as_deref(),
            DEEPSEEK_MODEL,
            prompt,
            system_prompt,
        )
        .await
    }
}
