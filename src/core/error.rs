use std::io;
use thiserror::Error;

/// Unified error type for the tgchat application
#[derive(Error, Debug)]
pub enum BotError {
    /// Caller requested a model that is not a registered provider
    #[error("Unknown model: {0}")]
    InvalidModel(String),

    /// Caller requested an unsupported response format
    #[error("Unknown response format: {0}")]
    InvalidFormat(String),

    /// Network failure or timeout reaching the model provider
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Provider returned an application-level error status
    #[error("Provider error {status}: {body}")]
    ProviderError { status: u16, body: String },

    /// Provider response body did not have the expected shape
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Telegram Bot API errors
    #[error("Telegram error: {0}")]
    Telegram(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for BotError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            BotError::ProviderUnavailable(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            BotError::ProviderUnavailable(format!("Connection failed: {}", err))
        } else {
            BotError::ProviderUnavailable(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for BotError {
    fn from(err: serde_yml::Error) -> Self {
        BotError::Serialization(format!("YAML error: {}", err))
    }
}
