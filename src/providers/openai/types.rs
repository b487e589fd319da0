use serde::{Deserialize, Serialize};

use crate::types::Message;

/// Chat Completions API request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub stream: bool,
    pub messages: Vec<Message>,
}

/// One streamed Chat Completions chunk. Only the text is read; ids, roles and
/// finish reasons are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionChunk {
    pub choices: Vec<ChunkChoice>,
}

/// Choice in a streamed chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub delta: ChunkDelta,
}

/// Delta object of a streamed choice. The first chunk usually carries only
/// the role, the last one nothing at all.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
}

/// Image size accepted by the image generation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum ImageSize {
    #[serde(rename = "256x256")]
    Small,
    #[serde(rename = "512x512")]
    Medium,
    #[default]
    #[serde(rename = "1024x1024")]
    Large,
    #[serde(rename = "1792x1024")]
    ExtraLarge,
}

/// Images API request.
#[derive(Debug, Clone, Serialize)]
pub struct ImageGenerateRequest {
    pub model: String,
    pub prompt: String,
    #[serde(rename = "n")]
    pub number_of_images: u32,
    pub response_format: String,
    pub size: ImageSize,
}

/// Images API response.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageGenerateResponse {
    pub data: Vec<ImageObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageObject {
    #[serde(default)]
    pub b64_json: Option<String>,
    #[serde(default)]
    pub revised_prompt: Option<String>,
}

/// Voice used by the speech endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Fable,
    Alloy,
    Onyx,
    Echo,
}

/// Audio speech API request.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechGenerateRequest {
    pub model: String,
    pub input: String,
    pub voice: Voice,
}
