use std::sync::Arc;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::config::IntegrationMode;
use crate::error::RelayError;
use crate::protocol::agent::{AgentEvent, AgentRunRequest};
use crate::protocol::completion::{
    CompletionChunk, CompletionMessage, CompletionRequest, StreamOptions,
};
use crate::protocol::StreamProtocol;
use crate::state::AppState;
use crate::stream::sse::parse_frame_json;
use crate::stream::{AgentTranslator, CompletionTranslator};
use crate::util::next_step_id;

use super::streaming::stream_response;

/// Role of a client chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// One message of the client's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientMessage {
    pub role: MessageRole,
    pub content: String,
}

/// Request body of `POST /api/chat`.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Client-chosen conversation identifier; generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub messages: Vec<ClientMessage>,
}

/// Query string of `POST /api/chat`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatQuery {
    #[serde(default)]
    pub protocol: StreamProtocol,
}

/// Relay a chat request to the configured upstream and stream the
/// re-encoded response back.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChatQuery>,
    Json(request): Json<ChatRequest>,
) -> Response {
    match relay_chat(&state, query.protocol, &request).await {
        Ok(response) => response,
        Err(err) => err.into_response(),
    }
}

async fn relay_chat(
    state: &Arc<AppState>,
    protocol: StreamProtocol,
    request: &ChatRequest,
) -> Result<Response, RelayError> {
    // fail fast before any streaming begins
    if request.messages.is_empty() {
        return Err(RelayError::InvalidRequest(
            "messages must not be empty".to_string(),
        ));
    }

    let upstream = &state.config.upstream;
    let model = upstream.model.clone();

    match upstream.integration {
        IntegrationMode::Completion => {
            let completion_request = CompletionRequest {
                model: model.clone(),
                messages: request
                    .messages
                    .iter()
                    .map(|message| CompletionMessage {
                        role: message.role.as_str().to_string(),
                        content: message.content.clone(),
                    })
                    .collect(),
                tools: state.tools.specs(),
                stream: true,
                stream_options: StreamOptions {
                    include_usage: true,
                },
            };
            let bytes = state
                .transport
                .completion_stream(upstream, &completion_request)
                .await?;
            let translator = CompletionTranslator::new(Arc::clone(&state.tools));
            Ok(stream_response(
                bytes,
                translator,
                parse_frame_json::<CompletionChunk>,
                protocol,
                model,
            ))
        }
        IntegrationMode::Agent => {
            // the runtime keeps the history; only the newest prompt goes up
            let prompt = request
                .messages
                .last()
                .map(|message| message.content.clone())
                .unwrap_or_default();
            if prompt.is_empty() {
                return Err(RelayError::InvalidRequest(
                    "latest message must carry text content".to_string(),
                ));
            }
            let run_request = AgentRunRequest {
                session_id: request.id.clone().unwrap_or_else(next_step_id),
                prompt,
            };
            let bytes = state.transport.agent_stream(upstream, &run_request).await?;
            Ok(stream_response(
                bytes,
                AgentTranslator::new(),
                parse_frame_json::<AgentEvent>,
                protocol,
                model,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, FeaturesConfig, ServerConfig, UpstreamConfig};
    use crate::tools::builtin_registry;
    use crate::transport::HttpTransport;
    use axum::http::StatusCode;

    fn test_state(integration: IntegrationMode) -> Arc<AppState> {
        let config = AppConfig {
            server: ServerConfig::default(),
            upstream: UpstreamConfig {
                integration,
                base_url: "http://127.0.0.1:1".to_string(),
                api_key: "test-key".to_string(),
                model: "test-model".to_string(),
            },
            features: FeaturesConfig::default(),
        };
        let transport = HttpTransport::new(&config.server).expect("transport");
        let tools = Arc::new(builtin_registry().expect("registry"));
        Arc::new(AppState::new(config, transport, tools))
    }

    #[test]
    fn test_chat_request_deserializes() {
        let request: ChatRequest = serde_json::from_str(
            r#"{"id":"conv-1","messages":[{"role":"user","content":"hi"}]}"#,
        )
        .expect("parse");
        assert_eq!(request.id.as_deref(), Some("conv-1"));
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, MessageRole::User);
    }

    #[test]
    fn test_protocol_query_defaults_to_data() {
        let query: ChatQuery = serde_json::from_str("{}").expect("parse");
        assert_eq!(query.protocol, StreamProtocol::Data);
        let query: ChatQuery = serde_json::from_str(r#"{"protocol":"text"}"#).expect("parse");
        assert_eq!(query.protocol, StreamProtocol::Text);
    }

    #[tokio::test]
    async fn test_empty_messages_fail_fast() {
        let state = test_state(IntegrationMode::Completion);
        let request = ChatRequest {
            id: None,
            messages: Vec::new(),
        };
        let err = relay_chat(&state, StreamProtocol::Data, &request)
            .await
            .expect_err("must reject");
        assert!(matches!(err, RelayError::InvalidRequest(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_agent_rejects_empty_prompt() {
        let state = test_state(IntegrationMode::Agent);
        let request = ChatRequest {
            id: Some("conv-1".to_string()),
            messages: vec![ClientMessage {
                role: MessageRole::User,
                content: String::new(),
            }],
        };
        let err = relay_chat(&state, StreamProtocol::Data, &request)
            .await
            .expect_err("must reject");
        assert!(matches!(err, RelayError::InvalidRequest(_)));
    }
}
