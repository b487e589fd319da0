mod providers;

use aido_llm::{Error, ProviderRegistry, StreamEvent, StreamOutcome};
use futures_util::StreamExt;
use providers::ollama::OllamaTestSetup;
use providers::openai::OpenAITestSetup;
use providers::ProviderTestSetup;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const BUY_MILK: &str = "1. Go to store. 2. Buy milk";

async fn test_buy_milk_end_to_end<P: ProviderTestSetup>() {
    let mock_server = MockServer::start().await;
    P::mount_stream(&mock_server, P::buy_milk_fixture()).await;

    let provider = P::create_provider(&mock_server.uri());
    let mut generation = provider.generate("Buy milk");

    let mut deltas = Vec::new();
    let mut terminal = None;
    while let Some(event) = generation.next().await {
        match event {
            StreamEvent::Delta(delta) => {
                assert!(terminal.is_none(), "{}: delta after terminal event", P::get_config().name);
                deltas.push(delta.text);
            }
            other => {
                assert!(terminal.is_none(), "{}: second terminal event", P::get_config().name);
                terminal = Some(other);
            }
        }
    }

    assert_eq!(deltas, vec!["1. ", "Go to store", ". 2. Buy milk"]);
    assert!(matches!(terminal, Some(StreamEvent::Completed)));
    assert_eq!(deltas.concat(), BUY_MILK);
}

async fn test_record_granularity_does_not_change_text<P: ProviderTestSetup>() {
    let single = MockServer::start().await;
    P::mount_stream(&single, P::encode_stream(&[BUY_MILK])).await;

    let fragments: Vec<String> = BUY_MILK.chars().map(String::from).collect();
    let fragments: Vec<&str> = fragments.iter().map(String::as_str).collect();
    let many = MockServer::start().await;
    P::mount_stream(&many, P::encode_stream(&fragments)).await;

    let whole = P::create_provider(&single.uri()).generate("Buy milk").accumulate().await;
    let split = P::create_provider(&many.uri()).generate("Buy milk").accumulate().await;

    assert!(whole.is_completed());
    assert!(split.is_completed());
    assert_eq!(whole.text, BUY_MILK);
    assert_eq!(split.text, whole.text);
}

async fn test_http_error_fails_generation<P: ProviderTestSetup>() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model runner crashed"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = P::create_provider(&mock_server.uri())
        .generate("Buy milk")
        .accumulate()
        .await;

    assert_eq!(result.text, "");
    match result.outcome {
        StreamOutcome::Failed(Error::Http { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "model runner crashed");
        }
        other => panic!("{}: expected HTTP failure, got {other:?}", P::get_config().name),
    }
}

async fn test_unreachable_backend_fails_generation<P: ProviderTestSetup>() {
    // Nothing listens on port 1.
    let result = P::create_provider("http://127.0.0.1:1")
        .generate("Buy milk")
        .accumulate()
        .await;

    assert_eq!(result.text, "");
    assert!(matches!(result.outcome, StreamOutcome::Failed(Error::Transport(_))));
}

/// A generation started before a swap keeps its provider to the end; the
/// next call goes to the new one.
async fn test_swap_isolation<A: ProviderTestSetup, B: ProviderTestSetup>() {
    let server_a = MockServer::start().await;
    A::mount_stream(&server_a, A::buy_milk_fixture()).await;
    let server_b = MockServer::start().await;
    B::mount_stream(&server_b, B::encode_stream(&["Call mom"])).await;

    let registry = ProviderRegistry::new(A::create_provider(&server_a.uri()));
    let mut in_flight = registry.generate("Buy milk");

    let first = in_flight.next().await.expect("first event");
    assert!(matches!(first, StreamEvent::Delta(ref d) if d.text == "1. "));

    let previous = registry.swap(B::create_provider(&server_b.uri()));
    assert_eq!(previous.describe().model_id, A::get_config().model);
    assert_eq!(in_flight.identity().model_id, A::get_config().model);

    let rest = in_flight.accumulate().await;
    assert!(rest.is_completed());
    assert_eq!(format!("1. {}", rest.text), BUY_MILK);

    let requests_b = server_b.received_requests().await.unwrap_or_default();
    assert!(requests_b.is_empty(), "new provider contacted by an old generation");

    let next = registry.generate("Call mom").accumulate().await;
    assert!(next.is_completed());
    assert_eq!(next.text, "Call mom");

    let requests_a = server_a.received_requests().await.unwrap_or_default();
    assert_eq!(requests_a.len(), 1);
    assert_eq!(requests_a[0].url.path(), A::get_config().path);
}

#[tokio::test]
async fn test_openai_buy_milk_end_to_end() {
    test_buy_milk_end_to_end::<OpenAITestSetup>().await;
}

#[tokio::test]
async fn test_ollama_buy_milk_end_to_end() {
    test_buy_milk_end_to_end::<OllamaTestSetup>().await;
}

#[tokio::test]
async fn test_openai_record_granularity() {
    test_record_granularity_does_not_change_text::<OpenAITestSetup>().await;
}

#[tokio::test]
async fn test_ollama_record_granularity() {
    test_record_granularity_does_not_change_text::<OllamaTestSetup>().await;
}

#[tokio::test]
async fn test_openai_http_error() {
    test_http_error_fails_generation::<OpenAITestSetup>().await;
}

#[tokio::test]
async fn test_ollama_http_error() {
    test_http_error_fails_generation::<OllamaTestSetup>().await;
}

#[tokio::test]
async fn test_openai_unreachable_backend() {
    test_unreachable_backend_fails_generation::<OpenAITestSetup>().await;
}

#[tokio::test]
async fn test_ollama_unreachable_backend() {
    test_unreachable_backend_fails_generation::<OllamaTestSetup>().await;
}

#[tokio::test]
async fn test_swap_remote_to_local_mid_stream() {
    test_swap_isolation::<OpenAITestSetup, OllamaTestSetup>().await;
}

#[tokio::test]
async fn test_swap_local_to_remote_mid_stream() {
    test_swap_isolation::<OllamaTestSetup, OpenAITestSetup>().await;
}
