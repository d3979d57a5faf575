//! Agent runtime upstream wire types.
//!
//! The runtime streams one JSON object per SSE frame. A single event may
//! carry several of these fields at once (text, a tool-use delta, a
//! completed message and a lifecycle marker are not mutually exclusive).

use serde::{Deserialize, Serialize};

use crate::util::parse_sse_data_json_line;

/// Outbound agent run request. The runtime owns conversation history keyed
/// by `session_id`; only the newest user prompt is sent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentRunRequest {
    pub session_id: String,
    pub prompt: String,
}

/// One lifecycle event from the agent runtime stream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentEvent {
    /// Incremental assistant text.
    #[serde(default)]
    pub data: Option<String>,
    /// Model reasoning text. Observed but not re-encoded for the client.
    #[serde(default, rename = "reasoningText")]
    pub reasoning_text: Option<String>,
    /// The tool use currently being assembled by the agent.
    #[serde(default)]
    pub current_tool_use: Option<CurrentToolUse>,
    /// Raw model delta; carries argument text for the current tool use.
    #[serde(default)]
    pub delta: Option<AgentDelta>,
    /// A completed message. Tool results come back as `user` messages.
    #[serde(default)]
    pub message: Option<AgentMessage>,
    /// Provider lifecycle marker (message boundaries).
    #[serde(default)]
    pub event: Option<LifecycleEvent>,
}

/// Descriptor of the in-flight tool use.
#[derive(Debug, Clone, Deserialize)]
pub struct CurrentToolUse {
    #[serde(default, rename = "toolUseId")]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Delta payload of an agent event.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AgentDelta {
    #[serde(default, rename = "toolUse")]
    pub tool_use: Option<ToolUseDelta>,
}

/// Argument-text fragment for the current tool use.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolUseDelta {
    #[serde(default)]
    pub input: Option<String>,
}

/// A completed message observed on the stream.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentMessage {
    pub role: String,
    #[serde(default)]
    pub content: Vec<MessageContent>,
}

/// One content block of a completed message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageContent {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default, rename = "toolResult")]
    pub tool_result: Option<ToolResultContent>,
}

/// An embedded tool result.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolResultContent {
    #[serde(default, rename = "toolUseId")]
    pub tool_use_id: Option<String>,
    #[serde(default)]
    pub content: Vec<ToolResultSegment>,
}

/// One segment of a tool result's content.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolResultSegment {
    #[serde(default)]
    pub text: Option<String>,
}

impl ToolResultContent {
    /// First text segment of the result, or the empty string.
    #[must_use]
    pub fn first_text(&self) -> &str {
        self.content
            .iter()
            .find_map(|segment| segment.text.as_deref())
            .unwrap_or("")
    }
}

/// Message boundary markers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LifecycleEvent {
    #[serde(default, rename = "messageStart")]
    pub message_start: Option<MessageStart>,
    #[serde(default, rename = "messageStop")]
    pub message_stop: Option<MessageStop>,
}

/// Start-of-message marker.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageStart {
    #[serde(default)]
    pub role: Option<String>,
}

/// End-of-message marker with the provider's stop reason.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageStop {
    #[serde(default, rename = "stopReason")]
    pub stop_reason: Option<String>,
}

/// Parse one SSE line of an agent runtime stream into an event.
#[must_use]
pub fn parse_agent_sse_line(line: &str) -> Option<AgentEvent> {
    parse_sse_data_json_line(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text_event() {
        let event = parse_agent_sse_line(r#"data: {"data":"Hello"}"#).expect("event");
        assert_eq!(event.data.as_deref(), Some("Hello"));
        assert!(event.current_tool_use.is_none());
    }

    #[test]
    fn test_parse_tool_use_event() {
        let event = parse_agent_sse_line(
            r#"data: {"current_tool_use":{"toolUseId":"t1","name":"add"},"delta":{"toolUse":{"input":"{\"a\":"}}}"#,
        )
        .expect("event");
        let tool_use = event.current_tool_use.expect("tool use");
        assert_eq!(tool_use.tool_use_id.as_deref(), Some("t1"));
        assert_eq!(tool_use.name.as_deref(), Some("add"));
        let input = event
            .delta
            .and_then(|d| d.tool_use)
            .and_then(|t| t.input)
            .expect("input");
        assert_eq!(input, "{\"a\":");
    }

    #[test]
    fn test_parse_tool_result_message() {
        let event = parse_agent_sse_line(
            r#"data: {"message":{"role":"user","content":[{"toolResult":{"toolUseId":"t1","content":[{"text":"3"}]}}]}}"#,
        )
        .expect("event");
        let message = event.message.expect("message");
        assert_eq!(message.role, "user");
        let result = message.content[0].tool_result.as_ref().expect("result");
        assert_eq!(result.tool_use_id.as_deref(), Some("t1"));
        assert_eq!(result.first_text(), "3");
    }

    #[test]
    fn test_first_text_skips_non_text_segments() {
        let result = ToolResultContent {
            tool_use_id: Some("t1".to_string()),
            content: vec![
                ToolResultSegment { text: None },
                ToolResultSegment {
                    text: Some("42".to_string()),
                },
            ],
        };
        assert_eq!(result.first_text(), "42");
    }

    #[test]
    fn test_parse_lifecycle_markers() {
        let start = parse_agent_sse_line(r#"data: {"event":{"messageStart":{"role":"assistant"}}}"#)
            .expect("event");
        assert!(start
            .event
            .as_ref()
            .and_then(|e| e.message_start.as_ref())
            .is_some());

        let stop = parse_agent_sse_line(
            r#"data: {"event":{"messageStop":{"stopReason":"end_turn"}}}"#,
        )
        .expect("event");
        let stop_reason = stop
            .event
            .and_then(|e| e.message_stop)
            .and_then(|m| m.stop_reason)
            .expect("stop reason");
        assert_eq!(stop_reason, "end_turn");
    }
}
