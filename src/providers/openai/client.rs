use std::sync::Arc;
use std::time::Duration;

use super::types::ChatCompletionRequest;
use crate::credentials::CredentialStore;
use crate::frame::Framing;
use crate::generation::{Generation, StreamPlan};
use crate::mapper::ChatCompletionMapper;
use crate::provider::LLMProvider;
use crate::transport::{HttpTransport, Transport, TransportRequest};
use crate::types::{
    GenerationRequest, ProviderFamily, ProviderIdentity, DEFAULT_CONNECT_TIMEOUT,
    DEFAULT_IDLE_TIMEOUT, DEFAULT_OPENAI_BASE_URL, OPENAI_PREAMBLE,
};
use crate::Error;

/// Credential store key holding the OpenAI API token.
pub const CREDENTIAL_KEY: &str = "gptToken";

/// Look up the OpenAI token, failing when it is absent.
pub(crate) fn api_token(credentials: &dyn CredentialStore) -> Result<String, Error> {
    credentials
        .get(CREDENTIAL_KEY)
        .ok_or_else(|| Error::missing_credential(CREDENTIAL_KEY))
}

/// OpenAI Chat Completions provider.
pub struct OpenAIProvider {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    model: String,
    base_url: String,
    idle_timeout: Option<Duration>,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider for `model`.
    pub fn new(model: impl Into<String>, credentials: Arc<dyn CredentialStore>) -> Result<Self, Error> {
        let transport = HttpTransport::new(DEFAULT_CONNECT_TIMEOUT)?;
        Ok(Self::with_transport(Arc::new(transport), credentials, model))
    }

    /// Create a provider that sends through an existing transport.
    pub fn with_transport(
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialStore>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            credentials,
            model: model.into(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            idle_timeout: Some(DEFAULT_IDLE_TIMEOUT),
        }
    }

    /// Use a custom base URL (proxies, tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Option<Duration>) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }

    /// Convert a generation request to the Chat Completions format.
    fn convert_request(request: &GenerationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: request.model_id.clone(),
            stream: request.stream,
            messages: request.messages(),
        }
    }

    fn build_plan(&self, prompt: &str) -> Result<StreamPlan, Error> {
        let token = api_token(self.credentials.as_ref())?;
        let request = GenerationRequest::new(&self.model, prompt, OPENAI_PREAMBLE);

        let request = TransportRequest::post_json(
            format!("{}/chat/completions", self.base_url),
            &Self::convert_request(&request),
        )?
        .bearer(&token)?;

        Ok(StreamPlan {
            request,
            framing: Framing::ServerSentEvents,
            mapper: Arc::new(ChatCompletionMapper),
            idle_timeout: self.idle_timeout,
        })
    }
}

impl LLMProvider for OpenAIProvider {
    fn describe(&self) -> ProviderIdentity {
        ProviderIdentity::new(ProviderFamily::OpenAI, &self.model)
    }

    fn generate(&self, prompt: &str) -> Generation {
        match self.build_plan(prompt) {
            Ok(plan) => Generation::start(self.transport.clone(), self.describe(), plan),
            Err(error) => Generation::failed(self.describe(), error),
        }
    }
}
