//! Client-facing stream part vocabulary and its wire encoding.
//!
//! Every part encodes to a single `<tag>:<JSON>\n` line of the AI SDK
//! data-stream protocol (v1). JSON string escaping guarantees a record
//! never contains a raw newline, so the stream stays parseable line by
//! line without knowing the total length.

use serde::Serialize;
use serde_json::Value;

/// Reason the model's turn ended, normalized across upstream vocabularies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinishReason {
    Stop,
    ToolCalls,
    Other,
}

impl FinishReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FinishReason::Stop => "stop",
            FinishReason::ToolCalls => "tool-calls",
            FinishReason::Other => "other",
        }
    }
}

/// Token usage carried on finish records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// One normalized stream event, produced by the translators in upstream
/// emission order and never reordered or batched.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamPart {
    /// Incremental assistant text.
    TextDelta(String),
    /// A tool call was announced; its arguments will stream separately.
    ToolCallStart { id: String, name: String },
    /// A fragment of a streaming tool call's argument text.
    ToolCallArgsDelta { id: String, delta: String },
    /// A finalized tool call with fully assembled arguments.
    ToolCall {
        id: String,
        name: String,
        args: Value,
    },
    /// The outcome of a tool invocation. `name`/`args` are restated only
    /// when the call was not previously streamed in full.
    ToolCallResult {
        id: String,
        name: Option<String>,
        args: Option<Value>,
        result: Value,
    },
    /// A new response step began.
    StepStart { id: String },
    /// A response step completed.
    StepFinish { reason: FinishReason, usage: Usage },
    /// The whole response completed.
    Finish { reason: FinishReason, usage: Usage },
}

// Typed payloads keep the emitted key order stable (struct field order),
// which also keeps recorded transcripts byte-comparable.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UsagePayload {
    prompt_tokens: u64,
    completion_tokens: u64,
}

impl From<&Usage> for UsagePayload {
    fn from(usage: &Usage) -> Self {
        Self {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallStartPayload<'a> {
    tool_call_id: &'a str,
    tool_name: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallArgsDeltaPayload<'a> {
    tool_call_id: &'a str,
    args_text_delta: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallPayload<'a> {
    tool_call_id: &'a str,
    tool_name: &'a str,
    args: &'a Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallResultPayload<'a> {
    tool_call_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    args: Option<&'a Value>,
    result: &'a Value,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepStartPayload<'a> {
    message_id: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StepFinishPayload {
    finish_reason: &'static str,
    usage: UsagePayload,
    is_continued: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FinishPayload {
    finish_reason: &'static str,
    usage: UsagePayload,
}

fn payload_json<T: Serialize>(payload: &T) -> String {
    // these payload shapes cannot fail to serialize
    serde_json::to_string(payload).unwrap_or_default()
}

/// Encode a stream part as one data-protocol line.
#[must_use]
pub fn encode_data_part(part: &StreamPart) -> String {
    let (tag, payload) = match part {
        StreamPart::TextDelta(text) => ('0', payload_json(text)),
        StreamPart::ToolCallStart { id, name } => (
            'b',
            payload_json(&ToolCallStartPayload {
                tool_call_id: id,
                tool_name: name,
            }),
        ),
        StreamPart::ToolCallArgsDelta { id, delta } => (
            'c',
            payload_json(&ToolCallArgsDeltaPayload {
                tool_call_id: id,
                args_text_delta: delta,
            }),
        ),
        StreamPart::ToolCall { id, name, args } => (
            '9',
            payload_json(&ToolCallPayload {
                tool_call_id: id,
                tool_name: name,
                args,
            }),
        ),
        StreamPart::ToolCallResult {
            id,
            name,
            args,
            result,
        } => (
            'a',
            payload_json(&ToolCallResultPayload {
                tool_call_id: id,
                tool_name: name.as_deref(),
                args: args.as_ref(),
                result,
            }),
        ),
        StreamPart::StepStart { id } => ('f', payload_json(&StepStartPayload { message_id: id })),
        StreamPart::StepFinish { reason, usage } => (
            'e',
            payload_json(&StepFinishPayload {
                finish_reason: reason.as_str(),
                usage: usage.into(),
                is_continued: false,
            }),
        ),
        StreamPart::Finish { reason, usage } => (
            'd',
            payload_json(&FinishPayload {
                finish_reason: reason.as_str(),
                usage: usage.into(),
            }),
        ),
    };

    let mut line = String::with_capacity(payload.len() + 3);
    line.push(tag);
    line.push(':');
    line.push_str(&payload);
    line.push('\n');
    line
}

/// Extract the bare text payload for the `text` protocol mode.
///
/// Only text deltas have a representation there; all structured parts are
/// dropped.
#[must_use]
pub fn encode_text_part(part: &StreamPart) -> Option<&str> {
    match part {
        StreamPart::TextDelta(text) => Some(text.as_str()),
        _ => None,
    }
}
