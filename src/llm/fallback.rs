//! Three-tier provider fallback.
//!
//! The chain is an explicit state machine:
//!
//! ```text
//! Idle ─start─► Trying(Tier1) ─fail─► Trying(Tier2) ─fail─► Trying(Tier3) ─fail─► Failed
//!                    │                     │                     │
//!                    └─ok─► Succeeded(Tier1) └─ok─► Succeeded(Tier2) └─ok─► Succeeded(Tier3)
//! ```
//!
//! Calls are strictly sequential; each tier is tried at most once per run and
//! there is no backoff.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::{
    Completion, DeepSeekAdapter, GeminiAdapter, OpenAiAdapter, ProviderAdapter, ProviderError,
    ProviderErrorKind, ProviderId,
};
use crate::config::ProviderCredentials;

/// Position in the fallback order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Tier1,
    Tier2,
    Tier3,
}

impl Tier {
    pub const ORDER: [Tier; 3] = [Tier::Tier1, Tier::Tier2, Tier::Tier3];

    /// The tier tried after this one fails, if any.
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Tier1 => Some(Tier::Tier2),
            Tier::Tier2 => Some(Tier::Tier3),
            Tier::Tier3 => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Tier::Tier1 => 0,
            Tier::Tier2 => 1,
            Tier::Tier3 => 2,
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Tier::Tier1 => "tier1",
            Tier::Tier2 => "tier2",
            Tier::Tier3 => "tier3",
        };
        f.write_str(s)
    }
}

/// State of one fallback run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackState {
    Idle,
    Trying(Tier),
    Succeeded(Tier),
    Failed,
}

/// Input that moves the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackEvent {
    Start,
    TierSucceeded,
    TierFailed,
}

impl FallbackState {
    /// Apply an event. Events that make no sense in the current state leave
    /// it unchanged.
    pub fn advance(self, event: FallbackEvent) -> FallbackState {
        match (self, event) {
            (FallbackState::Idle, FallbackEvent::Start) => FallbackState::Trying(Tier::Tier1),
            (FallbackState::Trying(tier), FallbackEvent::TierSucceeded) => {
                FallbackState::Succeeded(tier)
            }
            (FallbackState::Trying(tier), FallbackEvent::TierFailed) => match tier.next() {
                Some(next) => FallbackState::Trying(next),
                None => FallbackState::Failed,
            },
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, FallbackState::Succeeded(_) | FallbackState::Failed)
    }
}

/// A failed tier, kept for diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TierAttempt {
    pub tier: Tier,
    pub provider: ProviderId,
    pub error: String,
}

/// Terminal failure of the whole chain.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FallbackError {
    #[error("all providers failed")]
    AllProvidersFailed { attempts: Vec<TierAttempt> },
}

/// The only way to reach the providers.
///
/// Holds no mutable state, so one chain can be shared by `Arc` across any
/// number of concurrent advisory calls.
pub struct FallbackChain {
    tiers: [Arc<dyn ProviderAdapter>; 3],
}

impl FallbackChain {
    pub fn new(
        tier1: Arc<dyn ProviderAdapter>,
        tier2: Arc<dyn ProviderAdapter>,
        tier3: Arc<dyn ProviderAdapter>,
    ) -> Self {
        Self {
            tiers: [tier1, tier2, tier3],
        }
    }

    /// Build the production chain: DeepSeek, then Gemini, then OpenAI.
    ///
    /// All adapters share one HTTP client whose per-request timeout is the
    /// only timeout in the system.
    pub fn from_credentials(
        credentials: &ProviderCredentials,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(
            Arc::new(DeepSeekAdapter::new(client.clone(), credentials.deepseek.clone())),
            Arc::new(GeminiAdapter::new(client.clone(), credentials.gemini.clone())),
            Arc::new(OpenAiAdapter::new(client, credentials.openai.clone())),
        ))
    }

    /// Provider configured at each tier, in order.
    pub fn providers(&self) -> [ProviderId; 3] {
        [self.tiers[0].id(), self.tiers[1].id(), self.tiers[2].id()]
    }

    /// Run the chain once and return the first successful completion.
    pub async fn complete(
        &self,
        prompt: &str,
        system_prompt: &str,
    ) -> Result<Completion, FallbackError> {
        let mut attempts: Vec<TierAttempt> = Vec::new();
        let mut state = FallbackState::Idle.advance(FallbackEvent::Start);

        while let FallbackState::Trying(tier) = state {
            let adapter = &self.tiers[tier.index()];
            tracing::info!("Trying {} ({})", adapter.id(), tier);

            match adapter.call(prompt, system_prompt).await {
                Ok(completion) => {
                    tracing::info!(
                        "{} succeeded after {} failed tier(s)",
                        completion.provider,
                        attempts.len()
                    );
                    state = state.advance(FallbackEvent::TierSucceeded);
                    debug_assert_eq!(state, FallbackState::Succeeded(tier));
                    return Ok(completion);
                }
                Err(error) => {
                    log_tier_failure(tier, &error);
                    attempts.push(TierAttempt {
                        tier,
                        provider: adapter.id(),
                        error: error.to_string(),
                    });
                    state = state.advance(FallbackEvent::TierFailed);
                }
            }
        }

        tracing::error!("All AI providers failed ({} attempts)", attempts.len());
        Err(FallbackError::AllProvidersFailed { attempts })
    }
}

fn log_tier_failure(tier: Tier, error: &ProviderError) {
    match error.kind() {
        ProviderErrorKind::Unconfigured => {
            tracing::debug!("Skipping {} ({}): {}", error.provider(), tier, error)
        }
        kind => tracing::warn!(
            "{} ({}) failed with {}: {}",
            error.provider(),
            tier,
            kind,
            error
        ),
    }
}
