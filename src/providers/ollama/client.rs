use std::sync::Arc;
use std::time::Duration;

use super::types::{ChatRequest, GenerateRequest};
use crate::frame::Framing;
use crate::generation::{Generation, StreamPlan};
use crate::mapper::{ChatMessageMapper, GenerateMapper, ResponseMapper};
use crate::provider::LLMProvider;
use crate::transport::{HttpTransport, Transport, TransportRequest};
use crate::types::{
    GenerationRequest, OllamaApi, ProviderFamily, ProviderIdentity, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_IDLE_TIMEOUT, DEFAULT_OLLAMA_BASE_URL, OLLAMA_PREAMBLE,
};
use crate::Error;

/// Locally hosted Ollama provider. Needs no credential.
pub struct OllamaProvider {
    transport: Arc<dyn Transport>,
    model: String,
    base_url: String,
    api: OllamaApi,
    idle_timeout: Option<Duration>,
}

impl OllamaProvider {
    /// Create a new Ollama provider for `model` on the default local port.
    pub fn new(model: impl Into<String>) -> Result<Self, Error> {
        let transport = HttpTransport::new(DEFAULT_CONNECT_TIMEOUT)?;
        Ok(Self::with_transport(Arc::new(transport), model))
    }

    /// Create a provider that sends through an existing transport.
    pub fn with_transport(transport: Arc<dyn Transport>, model: impl Into<String>) -> Self {
        Self {
            transport,
            model: model.into(),
            base_url: DEFAULT_OLLAMA_BASE_URL.to_string(),
            api: OllamaApi::default(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_api(mut self, api: OllamaApi) -> Self {
        self.api = api;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    fn build_plan(&self, prompt: &str) -> Result<StreamPlan, Error> {
        let request = GenerationRequest::new(&self.model, prompt, OLLAMA_PREAMBLE);

        let (request, mapper) = match self.api {
            OllamaApi::Chat => {
                let body = ChatRequest {
                    model: request.model_id.clone(),
                    messages: request.messages(),
                };
                (
                    TransportRequest::post_json(format!("{}/api/chat", self.base_url), &body)?,
                    Arc::new(ChatMessageMapper) as Arc<dyn ResponseMapper>,
                )
            }
            OllamaApi::Generate => {
                let body = GenerateRequest {
                    model: request.model_id,
                    prompt: request.prompt,
                    system: Some(request.system_preamble),
                };
                (
                    TransportRequest::post_json(format!("{}/api/generate", self.base_url), &body)?,
                    Arc::new(GenerateMapper) as Arc<dyn ResponseMapper>,
                )
            }
        };

        Ok(StreamPlan {
            request,
            framing: Framing::NewlineDelimited,
            mapper,
            idle_timeout: self.idle_timeout,
        })
    }
}

impl LLMProvider for OllamaProvider {
    fn describe(&self) -> ProviderIdentity {
        ProviderIdentity::new(ProviderFamily::Ollama, &self.model)
    }

    fn generate(&self, prompt: &str) -> Generation {
        match self.build_plan(prompt) {
            Ok(plan) => Generation::start(self.transport.clone(), self.describe(), plan),
            Err(error) => Generation::failed(self.describe(), error),
        }
    }
}
