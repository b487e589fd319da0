use std::env;
use std::time::Duration;

use super::identity::ModelChoice;
use crate::Error;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OLLAMA_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which local inference endpoint to talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OllamaApi {
    /// `/api/chat` with a message list.
    #[default]
    Chat,
    /// Legacy `/api/generate` with a bare prompt.
    Generate,
}

/// Configuration shared by every provider the factory builds.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub model: ModelChoice,
    pub openai_base_url: String,
    pub ollama_base_url: String,
    pub ollama_api: OllamaApi,
    /// Abort a stream when no bytes arrive for this long. `None` disables it.
    pub idle_timeout: Option<Duration>,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            model: ModelChoice::default(),
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            ollama_base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            ollama_api: OllamaApi::default(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    pub fn with_model(mut self, model: ModelChoice) -> Self {
        self.model = model;
        self
    }

    pub fn with_openai_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.openai_base_url = base_url.into();
        self
    }

    pub fn with_ollama_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.ollama_base_url = base_url.into();
        self
    }

    pub fn with_ollama_api(mut self, api: OllamaApi) -> Self {
        self.ollama_api = api;
        self
    }

    pub fn with_idle_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Create configuration from environment variables.
    ///
    /// * `AIDO_MODEL` - model id of the initially active provider
    /// * `OPENAI_BASE_URL`, `OLLAMA_BASE_URL` - endpoint overrides
    /// * `OLLAMA_API` - `chat` or `generate`
    /// * `AIDO_IDLE_TIMEOUT_SECS` - idle timeout, `0` disables it
    /// * `AIDO_CONNECT_TIMEOUT_SECS` - connect timeout
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(model) = lookup("AIDO_MODEL") {
            config.model = model.parse()?;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            config.openai_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(url) = lookup("OLLAMA_BASE_URL") {
            config.ollama_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(api) = lookup("OLLAMA_API") {
            config.ollama_api = match api.to_lowercase().as_str() {
                "chat" => OllamaApi::Chat,
                "generate" => OllamaApi::Generate,
                _ => {
                    return Err(Error::config(format!(
                        "Invalid OLLAMA_API '{api}'. Valid values are: chat, generate"
                    )))
                }
            };
        }
        if let Some(secs) = lookup("AIDO_IDLE_TIMEOUT_SECS") {
            config.idle_timeout = match parse_secs("AIDO_IDLE_TIMEOUT_SECS", &secs)? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            };
        }
        if let Some(secs) = lookup("AIDO_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout =
                Duration::from_secs(parse_secs("AIDO_CONNECT_TIMEOUT_SECS", &secs)?);
        }

        Ok(config)
    }
}

fn parse_secs(name: &str, value: &str) -> Result<u64, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::config(format!("{name} must be a whole number of seconds, got '{value}'")))
}
