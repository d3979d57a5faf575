//! SSE (Server-Sent Events) frame parser.
//!
//! Handles the low-level parsing of SSE frames from a byte stream,
//! including buffering partial lines and field semantics per the
//! [SSE specification](https://html.spec.whatwg.org/multipage/server-sent-events.html).
//! Bytes are buffered until a full line is available, so multi-byte
//! UTF-8 sequences split across network chunks never corrupt.

use memchr::memchr_iter;

/// A fully-assembled SSE frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SseEvent {
    pub event: Option<String>,
    pub data: String,
}

/// Parse a frame's data payload as JSON, skipping the `[DONE]` sentinel.
#[must_use]
pub fn parse_frame_json<T>(frame: &SseEvent) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    let data = frame.data.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    serde_json::from_str(data).ok()
}

/// Incremental SSE parser.
///
/// Feed it raw byte chunks (arriving at arbitrary boundaries) and it
/// yields fully-assembled [`SseEvent`] frames.
pub struct SseParser {
    buffer: Vec<u8>,
    event_type: Option<String>,
    data_buffer: String,
    has_data: bool,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            buffer: Vec::new(),
            event_type: None,
            data_buffer: String::new(),
            has_data: false,
        }
    }

    /// Feed raw bytes and append complete frames to `out`.
    ///
    /// SSE field rules:
    /// - `event:` sets the event type for the next frame
    /// - `data:` appends to the data buffer (one leading space stripped);
    ///   multiple `data:` lines are joined with `\n`
    /// - an empty line terminates the frame
    /// - `:` comment lines, `id:` and `retry:` are ignored
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<SseEvent>) {
        self.buffer.extend_from_slice(chunk);

        let mut consumed = 0;
        // memchr over the freshly extended buffer; only complete lines are
        // decoded, the tail stays buffered
        let newline_positions: Vec<usize> = memchr_iter(b'\n', &self.buffer).collect();
        for line_end in newline_positions {
            if line_end < consumed {
                continue;
            }
            let mut line = &self.buffer[consumed..line_end];
            if let [head @ .., b'\r'] = line {
                line = head;
            }
            let line = String::from_utf8_lossy(line).into_owned();
            self.process_line(&line, out);
            consumed = line_end + 1;
        }
        if consumed > 0 {
            self.buffer.drain(..consumed);
        }
    }

    /// Flush a trailing frame whose terminating blank line never arrived.
    ///
    /// Lenient extension for upstreams that close the connection right
    /// after the last `data:` line.
    pub fn finish(&mut self, out: &mut Vec<SseEvent>) {
        if !self.buffer.is_empty() {
            let line = String::from_utf8_lossy(&self.buffer).into_owned();
            self.buffer.clear();
            self.process_line(line.trim_end_matches('\r'), out);
        }
        if self.has_data {
            self.dispatch(out);
        }
    }

    fn process_line(&mut self, line: &str, out: &mut Vec<SseEvent>) {
        if line.is_empty() {
            if self.has_data {
                self.dispatch(out);
            } else {
                self.event_type = None;
            }
            return;
        }
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event_type = Some(value.to_string()),
            "data" => {
                if self.has_data {
                    self.data_buffer.push('\n');
                }
                self.data_buffer.push_str(value);
                self.has_data = true;
            }
            // id and retry are parsed but not surfaced
            _ => {}
        }
    }

    fn dispatch(&mut self, out: &mut Vec<SseEvent>) {
        out.push(SseEvent {
            event: self.event_type.take(),
            data: std::mem::take(&mut self.data_buffer),
        });
        self.has_data = false;
    }
}

impl Default for SseParser {
    fn default() -> Self {
        Self::new()
    }
}
