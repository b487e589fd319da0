use std::time::Duration;

use thiserror::Error;

/// Errors that can occur when using the aido-llm library.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Missing credential: no secret stored under '{key}'")]
    MissingCredential { key: String },

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Streaming error: {0}")]
    Stream(String),

    #[error("Generation cancelled")]
    Cancelled,

    #[error("No data received for {0:?}")]
    Timeout(Duration),

    #[error("Prompt must not be empty")]
    EmptyPrompt,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Provider error: {provider} - {message}")]
    Provider { provider: String, message: String },
}

impl Error {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn stream(message: impl Into<String>) -> Self {
        Error::Stream(message.into())
    }

    pub fn missing_credential(key: impl Into<String>) -> Self {
        Error::MissingCredential { key: key.into() }
    }

    /// Caller-initiated termination, which is not a failure of the backend.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Cancelled)
    }
}
