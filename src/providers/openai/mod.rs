//! OpenAI chat completions, images and speech.

mod client;
mod image;
mod speech;
pub mod types;

pub use client::{OpenAIProvider, CREDENTIAL_KEY};
pub use image::{OpenAIImageClient, DEFAULT_IMAGE_MODEL};
pub use speech::{OpenAISpeechClient, DEFAULT_SPEECH_MODEL};
pub use types::{ImageSize, Voice};
