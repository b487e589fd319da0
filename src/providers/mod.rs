//! Provider implementations for different LLM services.

pub mod ollama;
pub mod openai;

// Re-export commonly used provider types
pub use ollama::OllamaProvider;
pub use openai::{ImageSize, OpenAIImageClient, OpenAIProvider, OpenAISpeechClient, Voice, CREDENTIAL_KEY};
