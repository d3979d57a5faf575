//! End-to-end relay tests for the agent integration: mock runtime event
//! stream -> translator -> data-stream records.

use std::sync::{Arc, Mutex};

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use chatrelay_rs::api::chat::{chat_handler, ChatQuery, ChatRequest};
use chatrelay_rs::config::{
    AppConfig, FeaturesConfig, IntegrationMode, ServerConfig, UpstreamConfig,
};
use chatrelay_rs::protocol::StreamProtocol;
use chatrelay_rs::state::AppState;
use chatrelay_rs::tools::builtin_registry;
use chatrelay_rs::transport::HttpTransport;
use serde_json::{json, Value};

type Captured = Arc<Mutex<Option<Value>>>;

fn build_state(base_url: String) -> Arc<AppState> {
    let config = AppConfig {
        server: ServerConfig::default(),
        upstream: UpstreamConfig {
            integration: IntegrationMode::Agent,
            base_url,
            api_key: String::new(),
            model: "agent-default".to_string(),
        },
        features: FeaturesConfig::default(),
    };
    let transport = HttpTransport::new(&config.server).expect("transport");
    let tools = Arc::new(builtin_registry().expect("registry"));
    Arc::new(AppState::new(config, transport, tools))
}

async fn spawn_mock_runtime(sse_body: &'static str) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(None));
    let captured_for_handler = Arc::clone(&captured);

    let app = Router::new().route(
        "/agent/stream",
        post(move |Json(body): Json<Value>| {
            let captured = Arc::clone(&captured_for_handler);
            async move {
                *captured.lock().expect("capture lock") = Some(body);
                ([("content-type", "text/event-stream")], sse_body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock runtime");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    (format!("http://{addr}"), captured)
}

async fn relay(state: &Arc<AppState>, id: Option<&str>, content: &str) -> (StatusCode, String) {
    let request: ChatRequest = serde_json::from_value(json!({
        "id": id,
        "messages": [{ "role": "user", "content": content }]
    }))
    .expect("request");
    let response = chat_handler(
        State(Arc::clone(state)),
        Query(ChatQuery {
            protocol: StreamProtocol::Data,
        }),
        Json(request),
    )
    .await;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    (status, String::from_utf8(body.to_vec()).expect("utf8 body"))
}

const AGENT_RUN_SSE: &str = "\
data: {\"event\":{\"messageStart\":{\"role\":\"assistant\"}}}\n\n\
data: {\"data\":\"I'll add those.\"}\n\n\
data: {\"current_tool_use\":{\"toolUseId\":\"tooluse_1\",\"name\":\"add\"},\"delta\":{\"toolUse\":{\"input\":\"{\\\"a\\\":1,\"}}}\n\n\
data: {\"current_tool_use\":{\"toolUseId\":\"tooluse_1\",\"name\":\"add\"},\"delta\":{\"toolUse\":{\"input\":\"\\\"b\\\":2}\"}}}\n\n\
data: {\"event\":{\"messageStop\":{\"stopReason\":\"tool_use\"}}}\n\n\
data: {\"message\":{\"role\":\"user\",\"content\":[{\"toolResult\":{\"toolUseId\":\"tooluse_1\",\"content\":[{\"text\":\"3\"}]}}]}}\n\n\
data: {\"event\":{\"messageStart\":{\"role\":\"assistant\"}}}\n\n\
data: {\"data\":\"The result is 3.\"}\n\n\
data: {\"event\":{\"messageStop\":{\"stopReason\":\"end_turn\"}}}\n\n";

#[tokio::test]
async fn test_agent_run_transcript() {
    let (base_url, _captured) = spawn_mock_runtime(AGENT_RUN_SSE).await;
    let state = build_state(base_url);

    let (status, body) = relay(&state, Some("conv-42"), "add 1 and 2").await;
    assert_eq!(status, StatusCode::OK);

    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 10, "unexpected transcript: {body}");

    // step ids are freshly generated, so match those lines structurally
    assert!(lines[0].starts_with("f:"));
    let step: Value = serde_json::from_str(&lines[0][2..]).expect("step json");
    assert!(!step["messageId"].as_str().expect("message id").is_empty());

    assert_eq!(lines[1], "0:\"I'll add those.\"");
    assert_eq!(lines[2], "b:{\"toolCallId\":\"tooluse_1\",\"toolName\":\"add\"}");
    assert_eq!(
        lines[3],
        "c:{\"toolCallId\":\"tooluse_1\",\"argsTextDelta\":\"{\\\"a\\\":1,\"}"
    );
    assert_eq!(
        lines[4],
        "c:{\"toolCallId\":\"tooluse_1\",\"argsTextDelta\":\"\\\"b\\\":2}\"}"
    );
    assert_eq!(
        lines[5],
        "e:{\"finishReason\":\"tool-calls\",\"usage\":{\"promptTokens\":100,\"completionTokens\":100},\"isContinued\":false}"
    );
    assert_eq!(lines[6], "a:{\"toolCallId\":\"tooluse_1\",\"result\":\"3\"}");
    assert!(lines[7].starts_with("f:"));
    assert_eq!(lines[8], "0:\"The result is 3.\"");
    assert_eq!(
        lines[9],
        "e:{\"finishReason\":\"stop\",\"usage\":{\"promptTokens\":100,\"completionTokens\":100},\"isContinued\":false}"
    );

    // ordering: the result record follows the announcement
    let announce = body.find("b:{\"toolCallId\":\"tooluse_1\"").expect("announce");
    let result = body.find("a:{\"toolCallId\":\"tooluse_1\"").expect("result");
    assert!(announce < result);
}

#[tokio::test]
async fn test_agent_run_forwards_session_and_prompt() {
    let (base_url, captured) = spawn_mock_runtime(AGENT_RUN_SSE).await;
    let state = build_state(base_url);

    relay(&state, Some("conv-42"), "add 1 and 2").await;

    let seen = captured
        .lock()
        .expect("capture lock")
        .clone()
        .expect("runtime request captured");
    assert_eq!(seen["session_id"], "conv-42");
    assert_eq!(seen["prompt"], "add 1 and 2");
}

#[tokio::test]
async fn test_agent_run_generates_session_id_when_absent() {
    let (base_url, captured) = spawn_mock_runtime(AGENT_RUN_SSE).await;
    let state = build_state(base_url);

    relay(&state, None, "hello").await;

    let seen = captured
        .lock()
        .expect("capture lock")
        .clone()
        .expect("runtime request captured");
    assert!(!seen["session_id"].as_str().expect("session id").is_empty());
}
