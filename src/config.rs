//! Service configuration, read from environment variables.
//!
//! | Variable                | Default     |
//! |-------------------------|-------------|
//! | `HOST`                  | `127.0.0.1` |
//! | `PORT`                  | `3000`      |
//! | `PROVIDER_TIMEOUT_SECS` | `30`        |
//! | `DEEPSEEK_API_KEY`      | unset       |
//! | `GEMINI_API_KEY`        | unset       |
//! | `OPENAI_API_KEY`        | unset       |
//!
//! A tier whose key is unset is still part of the chain; it simply fails
//! without touching the network.

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

/// Per-request timeout applied to every provider call.
pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// API keys for the three providers.
#[derive(Clone, Default)]
pub struct ProviderCredentials {
    pub deepseek: Option<String>,
    pub gemini: Option<String>,
    pub openai: Option<String>,
}

// Keys never reach logs; only their presence does.
impl fmt::Debug for ProviderCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderCredentials")
            .field("deepseek", &self.deepseek.is_some())
            .field("gemini", &self.gemini.is_some())
            .field("openai", &self.openai.is_some())
            .finish()
    }
}

impl ProviderCredentials {
    pub fn configured_count(&self) -> usize {
        [&self.deepseek, &self.gemini, &self.openai]
            .iter()
            .filter(|k| k.is_some())
            .count()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub provider_timeout: Duration,
    pub credentials: ProviderCredentials,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            provider_timeout: DEFAULT_PROVIDER_TIMEOUT,
            credentials: ProviderCredentials::default(),
        }
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        // Empty values count as unset.
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let port = match var("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT: {}", v))?,
            None => defaults.port,
        };

        let provider_timeout = match var("PROVIDER_TIMEOUT_SECS") {
            Some(v) => {
                let secs = v
                    .trim()
                    .parse::<u64>()
                    .with_context(|| format!("Invalid PROVIDER_TIMEOUT_SECS: {}", v))?;
                if secs == 0 {
                    anyhow::bail!("PROVIDER_TIMEOUT_SECS must be greater than 0");
                }
                Duration::from_secs(secs)
            }
            None => defaults.provider_timeout,
        };

        Ok(Self {
            host: var("HOST").unwrap_or(defaults.host),
            port,
            provider_timeout,
            credentials: ProviderCredentials {
                deepseek: var("DEEPSEEK_API_KEY"),
                gemini: var("GEMINI_API_KEY"),
                openai: var("OPENAI_API_KEY"),
            },
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
