//! Streaming text generation for the Aido task assistant.
//!
//! This library provides one streaming API over the OpenAI Chat Completions
//! endpoint and a local Ollama server, with a swappable active provider, plus
//! one-shot image and speech clients for task icons and read-outs.

pub mod accumulator;
pub mod credentials;
pub mod error;
pub mod factory;
pub mod frame;
pub mod generation;
pub mod mapper;
pub mod provider;
pub mod providers;
pub mod registry;
pub mod transport;
pub mod types;

// Re-export core types for easy usage
pub use accumulator::*;
pub use credentials::{CredentialStore, MemoryCredentialStore};
pub use error::Error;
pub use factory::ProviderFactory;
pub use frame::{Frame, FrameStream, FrameStreamExt, Framing};
pub use generation::Generation;
pub use mapper::{Mapped, ResponseMapper};
pub use provider::LLMProvider;
pub use providers::*;
pub use registry::ProviderRegistry;
pub use transport::{HttpTransport, Transport, TransportRequest};
pub use types::*;
