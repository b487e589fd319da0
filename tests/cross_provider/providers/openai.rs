use super::{load_fixture, ProviderConfig, ProviderTestSetup};
use aido_llm::{LLMProvider, MemoryCredentialStore, OpenAIProvider, CREDENTIAL_KEY};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub struct OpenAITestSetup;

#[async_trait::async_trait]
impl ProviderTestSetup for OpenAITestSetup {
    fn get_config() -> ProviderConfig {
        ProviderConfig {
            name: "OpenAI",
            model: "gpt-4",
            path: "/chat/completions",
            content_type: "text/event-stream",
        }
    }

    fn create_provider(base_url: &str) -> Arc<dyn LLMProvider> {
        let credentials = MemoryCredentialStore::with_secret(CREDENTIAL_KEY, "test-api-key");
        let provider = OpenAIProvider::new(Self::get_config().model, Arc::new(credentials))
            .expect("Failed to create OpenAI provider")
            .with_base_url(base_url);
        Arc::new(provider)
    }

    fn encode_stream(fragments: &[&str]) -> String {
        let mut body = String::new();
        for fragment in fragments {
            let chunk = json!({
                "id": "chatcmpl-test",
                "object": "chat.completion.chunk",
                "choices": [{"index": 0, "delta": {"content": fragment}, "finish_reason": null}]
            });
            body.push_str(&format!("data: {chunk}\n\n"));
        }
        body.push_str("data: [DONE]\n\n");
        body
    }

    fn buy_milk_fixture() -> String {
        load_fixture("tests/cross_provider/fixtures/openai/buy_milk.sse")
    }

    async fn mount_stream(mock_server: &MockServer, body: String) {
        let config = Self::get_config();
        Mock::given(method("POST"))
            .and(path(config.path))
            .and(header("authorization", "Bearer test-api-key"))
            .and(body_partial_json(json!({"model": config.model, "stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(body)
                    .insert_header("content-type", config.content_type)
                    .insert_header("cache-control", "no-cache"),
            )
            .expect(1)
            .mount(mock_server)
            .await;
    }
}
