pub mod ollama;
pub mod openai;

use aido_llm::LLMProvider;
use std::sync::Arc;
use wiremock::MockServer;

/// Load test fixture from file
pub fn load_fixture(filename: &str) -> String {
    std::fs::read_to_string(filename)
        .unwrap_or_else(|_| panic!("Failed to load test fixture: {filename}"))
}

/// Provider configuration for cross-provider testing
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: &'static str,
    pub model: &'static str,
    pub path: &'static str,
    pub content_type: &'static str,
}

/// Trait for provider-specific test setup
#[async_trait::async_trait]
pub trait ProviderTestSetup {
    /// Get the provider configuration
    fn get_config() -> ProviderConfig;

    /// Create the provider instance
    fn create_provider(base_url: &str) -> Arc<dyn LLMProvider>;

    /// Encode text fragments in the provider's wire format, one record each,
    /// followed by the provider's completion signal.
    fn encode_stream(fragments: &[&str]) -> String;

    /// The recorded "Buy milk" response.
    fn buy_milk_fixture() -> String;

    /// Serve `body` for one generation request on the provider's endpoint.
    async fn mount_stream(mock_server: &MockServer, body: String);
}
