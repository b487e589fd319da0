use super::{load_fixture, ProviderConfig, ProviderTestSetup};
use aido_llm::{LLMProvider, OllamaProvider};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct OllamaTestSetup;

#[async_trait::async_trait]
impl ProviderTestSetup for OllamaTestSetup {
    fn get_config() -> ProviderConfig {
        ProviderConfig {
            name: "Ollama",
            model: "mistral",
            path: "/api/chat",
            content_type: "application/x-ndjson",
        }
    }

    fn create_provider(base_url: &str) -> Arc<dyn LLMProvider> {
        let provider = OllamaProvider::new(Self::get_config().model)
            .expect("Failed to create Ollama provider")
            .with_base_url(base_url);
        Arc::new(provider)
    }

    fn encode_stream(fragments: &[&str]) -> String {
        let mut body = String::new();
        for fragment in fragments {
            let line = json!({
                "model": "mistral",
                "message": {"role": "assistant", "content": fragment},
                "done": false
            });
            body.push_str(&format!("{line}\n"));
        }
        let last = json!({
            "model": "mistral",
            "message": {"role": "assistant", "content": ""},
            "done": true
        });
        body.push_str(&format!("{last}\n"));
        body
    }

    fn buy_milk_fixture() -> String {
        load_fixture("tests/cross_provider/fixtures/ollama/buy_milk.ndjson")
    }

    async fn mount_stream(mock_server: &MockServer, body: String) {
        let config = Self::get_config();
        Mock::given(method("POST"))
            .and(path(config.path))
            .and(body_partial_json(json!({"model": config.model})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", config.content_type),
            )
            .expect(1)
            .mount(mock_server)
            .await;
    }
}
