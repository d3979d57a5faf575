//! Response-body pipeline: upstream bytes -> SSE frames -> translator ->
//! encoded records.
//!
//! Built as a lazy `unfold` stream so every record reaches the client as
//! soon as it exists; nothing is accumulated into a whole-response buffer.
//! Dropping the body (client disconnect) drops the pipeline and with it
//! the upstream subscription.

use std::collections::VecDeque;
use std::pin::Pin;
use std::time::Instant;

use axum::body::Body;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures_util::{Stream, StreamExt};
use tracing::warn;

use crate::observability::log_stream_complete;
use crate::protocol::datastream::{
    encode_data_part, encode_text_part, FinishReason, StreamPart, Usage,
};
use crate::protocol::StreamProtocol;
use crate::stream::sse::SseEvent;
use crate::stream::{SseParser, Translate};

/// Header advertising the stream protocol version to the client.
pub(crate) const STREAM_PROTOCOL_HEADER: &str = "x-vercel-ai-data-stream";
pub(crate) const STREAM_PROTOCOL_VERSION: &str = "v1";

struct Pipeline<S, T, P> {
    upstream: Pin<Box<S>>,
    parser: SseParser,
    translator: T,
    parse_frame: P,
    protocol: StreamProtocol,
    pending: VecDeque<Bytes>,
    finalized: bool,
    model: String,
    started_at: Instant,
    finish_reason: Option<FinishReason>,
    usage: Option<Usage>,
}

impl<S, T, P> Pipeline<S, T, P>
where
    T: Translate,
    P: Fn(&SseEvent) -> Option<T::Event>,
{
    fn process_frames(&mut self, frames: Vec<SseEvent>) {
        for frame in frames {
            if let Some(event) = (self.parse_frame)(&frame) {
                let mut parts = Vec::new();
                self.translator.consume(event, &mut parts);
                self.enqueue_parts(parts);
            }
        }
    }

    fn enqueue_parts(&mut self, parts: Vec<StreamPart>) {
        for part in parts {
            match &part {
                StreamPart::Finish { reason, usage }
                | StreamPart::StepFinish { reason, usage } => {
                    self.finish_reason = Some(*reason);
                    self.usage = Some(*usage);
                }
                _ => {}
            }
            match self.protocol {
                StreamProtocol::Data => {
                    self.pending.push_back(Bytes::from(encode_data_part(&part)));
                }
                StreamProtocol::Text => {
                    if let Some(text) = encode_text_part(&part) {
                        if !text.is_empty() {
                            self.pending.push_back(Bytes::from(text.to_owned()));
                        }
                    }
                }
            }
        }
    }

    fn finalize(&mut self) {
        self.finalized = true;
        log_stream_complete(&self.model, self.finish_reason, self.usage, self.started_at);
    }
}

/// Build the streamed `200 OK` response for a relayed chat request.
pub(crate) fn stream_response<S, T, P, E>(
    upstream: S,
    translator: T,
    parse_frame: P,
    protocol: StreamProtocol,
    model: String,
) -> Response
where
    S: Stream<Item = Result<Bytes, E>> + Send + 'static,
    T: Translate + Send + 'static,
    T::Event: Send,
    P: Fn(&SseEvent) -> Option<T::Event> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
{
    let pipeline = Pipeline {
        upstream: Box::pin(upstream),
        parser: SseParser::new(),
        translator,
        parse_frame,
        protocol,
        pending: VecDeque::with_capacity(8),
        finalized: false,
        model,
        started_at: Instant::now(),
        finish_reason: None,
        usage: None,
    };

    let output = futures_util::stream::unfold(pipeline, |mut pipeline| async move {
        loop {
            if let Some(chunk) = pipeline.pending.pop_front() {
                return Some((chunk, pipeline));
            }
            if pipeline.finalized {
                return None;
            }
            match pipeline.upstream.next().await {
                Some(Ok(bytes)) => {
                    let mut frames = Vec::new();
                    pipeline.parser.feed(&bytes, &mut frames);
                    pipeline.process_frames(frames);
                }
                Some(Err(err)) => {
                    warn!(error = %err, "upstream stream failed mid-response");
                    let mut parts = Vec::new();
                    pipeline.translator.abort(&mut parts);
                    pipeline.enqueue_parts(parts);
                    pipeline.finalize();
                }
                None => {
                    let mut frames = Vec::new();
                    pipeline.parser.finish(&mut frames);
                    pipeline.process_frames(frames);
                    pipeline.finalize();
                }
            }
        }
    });

    let body = Body::from_stream(output.map(Ok::<Bytes, std::convert::Infallible>));
    (
        StatusCode::OK,
        [
            ("content-type", "text/plain; charset=utf-8"),
            (STREAM_PROTOCOL_HEADER, STREAM_PROTOCOL_VERSION),
        ],
        body,
    )
        .into_response()
}
