//! Per-provider failure types.

use std::fmt;

use super::ProviderId;

/// Coarse classification of a provider failure, used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderErrorKind {
    /// Credential not configured; nothing was sent.
    Unconfigured,
    /// Connection, DNS or timeout failure.
    Network,
    /// HTTP 429.
    RateLimited,
    /// HTTP 5xx.
    ServerError,
    /// Other non-2xx status (bad key, bad request, ...).
    ClientError,
    /// 2xx response whose envelope held no usable text.
    Envelope,
}

impl fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProviderErrorKind::Unconfigured => "unconfigured",
            ProviderErrorKind::Network => "network error",
            ProviderErrorKind::RateLimited => "rate limited",
            ProviderErrorKind::ServerError => "server error",
            ProviderErrorKind::ClientError => "client error",
            ProviderErrorKind::Envelope => "bad envelope",
        };
        f.write_str(s)
    }
}

/// Classify a non-2xx HTTP status.
pub fn classify_http_status(status: u16) -> ProviderErrorKind {
    match status {
        429 => ProviderErrorKind::RateLimited,
        500..=599 => ProviderErrorKind::ServerError,
        _ => ProviderErrorKind::ClientError,
    }
}

/// A single provider call failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    #[error("{provider}: no API key configured")]
    MissingCredential { provider: ProviderId },

    #[error("{provider}: request failed: {message}")]
    Transport {
        provider: ProviderId,
        message: String,
    },

    #[error("{provider}: API error ({status}): {message}")]
    Status {
        provider: ProviderId,
        status: u16,
        message: String,
    },

    #[error("{provider}: unexpected response: {message}")]
    Envelope {
        provider: ProviderId,
        message: String,
    },
}

impl ProviderError {
    pub fn kind(&self) -> ProviderErrorKind {
        match self {
            ProviderError::MissingCredential { .. } => ProviderErrorKind::Unconfigured,
            ProviderError::Transport { .. } => ProviderErrorKind::Network,
            ProviderError::Status { status, .. } => classify_http_status(*status),
            ProviderError::Envelope { .. } => ProviderErrorKind::Envelope,
        }
    }

    pub fn provider(&self) -> ProviderId {
        match self {
            ProviderError::MissingCredential { provider }
            | ProviderError::Transport { provider, .. }
            | ProviderError::Status { provider, .. }
            | ProviderError::Envelope { provider, .. } => *provider,
        }
    }

    pub(crate) fn transport(provider: ProviderId, err: reqwest::Error) -> Self {
        let message = if err.is_timeout() {
            format!("Request timeout: {}", err)
        } else if err.is_connect() {
            format!("Connection failed: {}", err)
        } else {
            format!("Request failed: {}", err)
        };
        ProviderError::Transport { provider, message }
    }

    pub(crate) fn envelope(provider: ProviderId, message: impl Into<String>) -> Self {
        ProviderError::Envelope {
            provider,
            message: message.into(),
        }
    }
}
