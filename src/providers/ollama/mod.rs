//! Ollama local inference server.

mod client;
pub mod types;

pub use client::OllamaProvider;
