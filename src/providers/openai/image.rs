use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use super::client::api_token;
use super::types::{ImageGenerateRequest, ImageGenerateResponse, ImageSize};
use crate::credentials::CredentialStore;
use crate::transport::{collect_body, Transport, TransportRequest};
use crate::types::DEFAULT_OPENAI_BASE_URL;
use crate::Error;

pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// One-shot text-to-image client for task icons.
pub struct OpenAIImageClient {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialStore>,
    model: String,
    size: ImageSize,
    base_url: String,
}

impl OpenAIImageClient {
    pub fn new(transport: Arc<dyn Transport>, credentials: Arc<dyn CredentialStore>) -> Self {
        Self {
            transport,
            credentials,
            model: DEFAULT_IMAGE_MODEL.to_string(),
            size: ImageSize::default(),
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Generate one image and return its decoded bytes.
    pub async fn generate(&self, prompt: &str) -> Result<Vec<u8>, Error> {
        let token = api_token(self.credentials.as_ref())?;
        let body = ImageGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            number_of_images: 1,
            response_format: "b64_json".to_string(),
            size: self.size,
        };
        let request =
            TransportRequest::post_json(format!("{}/images/generations", self.base_url), &body)?
                .bearer(&token)?;

        let bytes = collect_body(self.transport.open(request).await?).await?;
        let response: ImageGenerateResponse = serde_json::from_slice(&bytes)?;

        let encoded = response
            .data
            .into_iter()
            .find_map(|image| image.b64_json)
            .ok_or_else(|| Error::provider("OpenAI", "Image response contained no image data"))?;

        STANDARD
            .decode(encoded.trim())
            .map_err(|e| Error::provider("OpenAI", format!("Invalid base64 image payload: {e}")))
    }
}
