use std::sync::Arc;

use gpt_core::config::keys;
use gpt_core::{
    Conversation, FailureLogging, GptService, JsonlUsageSink, LlmError, MemoryConfig,
    MemoryUsageSink, Message, OpenAiConfig, Overrides, UsageSink,
};
use serde_json::{Value, json};
use wiremock::{
    Match, Mock, MockServer, Request as WiremockRequest, ResponseTemplate,
    matchers::{header, method, path},
};

#[derive(Clone)]
struct BodyContains(&'static str);

impl Match for BodyContains {
    fn matches(&self, request: &WiremockRequest) -> bool {
        std::str::from_utf8(&request.body)
            .map(|body| body.contains(self.0))
            .unwrap_or(false)
    }
}

#[derive(Clone)]
struct BodyNotContains(&'static str);

impl Match for BodyNotContains {
    fn matches(&self, request: &WiremockRequest) -> bool {
        !BodyContains(self.0).matches(request)
    }
}

fn service(server: &MockServer, sink: Arc<dyn UsageSink>) -> GptService {
    let config = MemoryConfig::new().with(keys::API_KEY, "sk-test");
    GptService::openai(
        OpenAiConfig::default().with_base_url(format!("{}/v1", server.uri())),
        Arc::new(config),
        sink,
    )
    .unwrap()
}

fn conversation() -> Conversation {
    Conversation::new(vec![
        Message::system("Be brief."),
        Message::user("Say hello"),
    ])
}

fn blank_response(model: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "resp_blank",
        "model": model,
        "status": "incomplete",
        "incomplete_details": { "reason": "max_output_tokens" },
        "output": [{ "type": "reasoning", "summary": [] }],
        "usage": {
            "input_tokens": 9,
            "output_tokens": 128,
            "output_tokens_details": { "reasoning_tokens": 128 },
            "total_tokens": 137
        }
    }))
}

fn text_response(model: &str, text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "resp_text",
        "model": model,
        "status": "completed",
        "output": [
            { "type": "reasoning", "summary": [] },
            {
                "type": "message",
                "role": "assistant",
                "content": [{ "type": "output_text", "text": text, "annotations": [] }]
            }
        ],
        "usage": {
            "input_tokens": 9,
            "input_tokens_details": { "cached_tokens": 0 },
            "output_tokens": 20,
            "total_tokens": 29
        }
    }))
}

fn chat_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": text },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 11, "completion_tokens": 2, "total_tokens": 13 }
    }))
}

fn request_body(request: &WiremockRequest) -> Value {
    serde_json::from_slice(&request.body).unwrap()
}

#[tokio::test]
async fn reasoning_model_posts_to_responses() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(text_response("gpt-5-mini", "Hello."))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(MemoryUsageSink::new());
    let text = service(&server, sink.clone())
        .chat_completion(&conversation(), &Overrides::new().model("gpt-5-mini"))
        .await
        .unwrap();
    assert_eq!(text, "Hello.");

    let requests = server.received_requests().await.unwrap();
    let body = request_body(&requests[0]);
    assert_eq!(body["model"], "gpt-5-mini");
    assert_eq!(body["input"], "Be brief.\nSay hello");
    assert_eq!(body["max_output_tokens"], 1800);
    assert_eq!(body["reasoning"], json!({ "effort": "low" }));
    assert!(body.get("temperature").is_none());

    let records = sink.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].total_tokens, 29);
    assert_eq!(records[0].response, "Hello.");
}

#[tokio::test]
async fn empty_output_retries_then_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(BodyContains(r#""model":"gpt-5-nano""#))
        .respond_with(blank_response("gpt-5-nano"))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .and(BodyContains(r#""model":"gpt-5-mini""#))
        .respond_with(text_response("gpt-5-mini", "Hi there"))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(MemoryUsageSink::new());
    let service = service(&server, sink.clone());
    let params = service
        .resolve(&Overrides::new().max_tokens(64))
        .unwrap();

    let result = service.complete(&conversation(), &params).await.unwrap();

    assert_eq!(result.text, "Hi there");
    assert!(result.used_retry);
    assert!(result.used_fallback);
    assert_eq!(result.effective_model, "gpt-5-mini");

    let budgets: Vec<u64> = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| request_body(request)["max_output_tokens"].as_u64().unwrap())
        .collect();
    assert_eq!(budgets, vec![64, 128, 128]);

    let records = sink.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].model, "gpt-5-mini");
}

#[tokio::test]
async fn exhausted_cascade_reports_diagnostics() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/responses"))
        .respond_with(blank_response("gpt-5-nano"))
        .expect(3)
        .mount(&server)
        .await;

    let path = std::env::temp_dir().join(format!(
        "gpt-core-it-{}-{}.jsonl",
        std::process::id(),
        rand::random::<u64>()
    ));
    let sink = Arc::new(JsonlUsageSink::new(&path));
    let service = service(&server, sink.clone()).with_failure_logging(FailureLogging::Record);

    let error = service
        .chat_completion(&conversation(), &Overrides::new())
        .await
        .unwrap_err();

    let diagnostics = match error {
        LlmError::EmptyOutput(diagnostics) => diagnostics,
        other => panic!("expected empty output, got {other:?}"),
    };
    assert_eq!(diagnostics.attempts, 3);
    assert_eq!(diagnostics.incomplete_reason.as_deref(), Some("max_output_tokens"));
    assert_eq!(diagnostics.usage.reasoning_tokens, 128);

    let records = sink.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].response, "");
    assert_eq!(records[0].status.as_deref(), Some("incomplete"));

    std::fs::remove_file(&path).unwrap();
}

#[tokio::test]
async fn rejected_temperature_is_dropped_on_chat() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(BodyContains(r#""temperature""#))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "message": "Unsupported value: 'temperature' does not support 0.75 with this model. Only the default (1) value is supported.",
                "type": "invalid_request_error",
                "param": "temperature",
                "code": "unsupported_value"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(BodyNotContains(r#""temperature""#))
        .respond_with(chat_response("Hello!"))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(MemoryUsageSink::new());
    let text = service(&server, sink.clone())
        .chat_completion(
            &conversation(),
            &Overrides::new().model("gpt-4o-mini").temperature(0.75),
        )
        .await
        .unwrap();

    assert_eq!(text, "Hello!");

    let records = sink.list().await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].temperature, None);
    assert_eq!(records[0].total_tokens, 13);
    assert_eq!(records[0].status.as_deref(), Some("completed"));
}

#[tokio::test]
async fn provider_errors_surface_without_record() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let sink = Arc::new(MemoryUsageSink::new());
    let error = service(&server, sink.clone())
        .chat_completion(&conversation(), &Overrides::new().model("gpt-4o"))
        .await
        .unwrap_err();

    match error {
        LlmError::Api {
            message,
            status_code,
            ..
        } => {
            assert_eq!(status_code, Some(401));
            assert!(message.contains("Incorrect API key"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(sink.list().await.unwrap().is_empty());
}
