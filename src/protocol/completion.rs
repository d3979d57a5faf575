//! Chat-completions upstream wire types.
//!
//! Requests advertise the local tool schemas and ask for streamed output
//! with usage reporting; responses arrive as SSE `data:` chunks.

use serde::{Deserialize, Serialize};

use crate::util::parse_sse_data_json_line;

/// Outbound chat-completions request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<CompletionMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<CompletionTool>,
    pub stream: bool,
    pub stream_options: StreamOptions,
}

/// A message forwarded upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionMessage {
    pub role: String,
    pub content: String,
}

/// A tool declaration advertised upstream.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionTool {
    #[serde(rename = "type")]
    pub type_: String,
    pub function: CompletionToolFunction,
}

/// The function declaration within a tool.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionToolFunction {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// `stream_options` asking the upstream for a final usage chunk.
#[derive(Debug, Clone, Serialize)]
pub struct StreamOptions {
    pub include_usage: bool,
}

/// One streamed completion chunk.
///
/// Chunks with an empty `choices` list carry the terminal usage totals.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChunk {
    #[serde(default)]
    pub choices: Vec<ChunkChoice>,
    #[serde(default)]
    pub usage: Option<CompletionUsage>,
}

/// A choice delta within a chunk.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkChoice {
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Incremental content within a choice.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChunkDelta {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<ChunkToolCall>>,
}

/// A tool-call fragment. The first fragment of a call carries `id` and the
/// function name; later fragments carry only argument text at the same
/// `index`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkToolCall {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub function: Option<ChunkToolCallFunction>,
}

/// Function fragment within a streamed tool call.
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkToolCallFunction {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arguments: Option<String>,
}

/// Terminal usage totals.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CompletionUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Parse one SSE line of a chat-completions stream into a chunk.
///
/// Returns `None` for comments, blank lines and the `[DONE]` sentinel.
#[must_use]
pub fn parse_completion_sse_line(line: &str) -> Option<CompletionChunk> {
    parse_sse_data_json_line(line)
}
