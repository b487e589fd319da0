use std::sync::Arc;

use crate::credentials::CredentialStore;
use crate::transport::{HttpTransport, Transport};
use crate::types::{ClientConfig, ModelChoice, ProviderFamily};
use crate::{Error, LLMProvider, OllamaProvider, OpenAIImageClient, OpenAIProvider, OpenAISpeechClient};

/// Builds providers for the selection surface. All providers share one
/// transport and credential store.
#[derive(Clone)]
pub struct ProviderFactory {
    config: ClientConfig,
    credentials: Arc<dyn CredentialStore>,
    transport: Arc<dyn Transport>,
}

impl ProviderFactory {
    /// Create a factory with a reqwest transport built from `config`.
    pub fn new(config: ClientConfig, credentials: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        let transport = HttpTransport::new(config.connect_timeout)?;
        Ok(Self::with_transport(config, credentials, Arc::new(transport)))
    }

    pub fn with_transport(
        config: ClientConfig,
        credentials: Arc<dyn CredentialStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            credentials,
            transport,
        }
    }

    /// Create a factory from environment variables.
    pub fn from_env(credentials: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        Self::new(ClientConfig::from_env()?, credentials)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialStore> {
        &self.credentials
    }

    /// Create the provider serving `choice`.
    pub fn create(&self, choice: ModelChoice) -> Arc<dyn LLMProvider> {
        match choice.family() {
            ProviderFamily::OpenAI => Arc::new(
                OpenAIProvider::with_transport(
                    self.transport.clone(),
                    self.credentials.clone(),
                    choice.model_id(),
                )
                .with_base_url(&self.config.openai_base_url)
                .with_idle_timeout(self.config.idle_timeout),
            ),
            ProviderFamily::Ollama => Arc::new(
                OllamaProvider::with_transport(self.transport.clone(), choice.model_id())
                    .with_base_url(&self.config.ollama_base_url)
                    .with_api(self.config.ollama_api)
                    .with_idle_timeout(self.config.idle_timeout),
            ),
        }
    }

    /// The provider for the configured model.
    pub fn default_provider(&self) -> Arc<dyn LLMProvider> {
        self.create(self.config.model)
    }

    pub fn image_client(&self) -> OpenAIImageClient {
        OpenAIImageClient::new(self.transport.clone(), self.credentials.clone())
            .with_base_url(&self.config.openai_base_url)
    }

    pub fn speech_client(&self) -> OpenAISpeechClient {
        OpenAISpeechClient::new(self.transport.clone(), self.credentials.clone())
            .with_base_url(&self.config.openai_base_url)
    }
}
