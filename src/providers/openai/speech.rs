use std::sync::Arc;

use super::client::api_token;
use super::types::{SpeechGenerateRequest, Voice};
use crate::credentials::CredentialStore;
use crate::transport::{collect_body, Transport, TransportRequest};
use crate::types::DEFAULT_OPENAI_BASE_URL;
use crate::Error;

pub const DEFAULT_SPEECH_MODEL: &str = "tts-1-hd";

/// One-shot text-to-speech client. Playback is left to the caller.
pub struct OpenAISpeechClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    model: String,
    base_url: String,
}

impl OpenAISpeechClient {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            transport,
            credentials,
            model: DEFAULT_SPEECH_MODEL.to_string(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Synthesize `text` and return the encoded audio.
    pub async fn generate(&self, text: &str, voice: Voice) -> Result<Vec<u8>, Error> {
        let token = api_token(self.credentials.as_ref())?;
        let body = SpeechGenerateRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice,
        };
        let request = TransportRequest::post_json(format!("{}/audio/speech", self.base_url), &body)?
            .bearer(&token)?;

        let audio = collect_body(self.transport.open(request).await?).await?;
        tracing::debug!(bytes = audio.len(), "speech received");
        Ok(audio)
    }
}
