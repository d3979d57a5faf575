use std::sync::atomic::{AtomicU64, Ordering};

static CALL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

#[inline]
fn push_u64_hex_16(out: &mut String, n: u64) {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut buf = [0u8; 16];
    let mut v = n;
    for slot in buf.iter_mut().rev() {
        *slot = HEX[(v & 0xf) as usize];
        v >>= 4;
    }
    // buf is pure ASCII hex
    out.push_str(std::str::from_utf8(&buf).unwrap_or("0000000000000000"));
}

/// Generate a process-unique tool call id (`call_<hex>`), used when the
/// upstream did not assign one.
#[inline]
pub(crate) fn next_call_id() -> String {
    let id = CALL_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    let mut out = String::with_capacity(21);
    out.push_str("call_");
    push_u64_hex_16(&mut out, id);
    out
}

/// Generate a fresh step identifier for step-start records.
#[inline]
pub(crate) fn next_step_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Extract the JSON payload from an SSE `data:` line.
///
/// Returns `None` for empty lines, comments, `event:` lines and the
/// `[DONE]` sentinel.
#[inline]
pub(crate) fn extract_sse_data_payload(line: &str) -> Option<&str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(':') || trimmed.starts_with("event:") {
        return None;
    }

    let payload = trimmed
        .strip_prefix("data: ")
        .or_else(|| trimmed.strip_prefix("data:"))?
        .trim();
    if payload == "[DONE]" {
        return None;
    }
    Some(payload)
}

/// Parse the JSON payload of an SSE `data:` line into a typed value.
#[inline]
pub(crate) fn parse_sse_data_json_line<T>(line: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(extract_sse_data_payload(line)?).ok()
}
