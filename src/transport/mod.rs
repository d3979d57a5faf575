//! Upstream HTTP client.

use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use std::time::Duration;

use crate::config::{ServerConfig, UpstreamConfig};
use crate::error::RelayError;
use crate::protocol::agent::AgentRunRequest;
use crate::protocol::completion::CompletionRequest;

const UPSTREAM_ERROR_BODY_LIMIT: usize = 2048;

/// Raw upstream byte stream handed to the translation pipeline.
pub type UpstreamByteStream = BoxStream<'static, Result<Bytes, reqwest::Error>>;

/// Shared `reqwest` client. Immutable after startup; safe to share across
/// requests without locking.
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build the transport.
    ///
    /// The configured timeout bounds connection establishment only; the
    /// streamed body has no overall deadline.
    ///
    /// # Errors
    ///
    /// Returns `RelayError::Config` when the client cannot be constructed.
    pub fn new(server: &ServerConfig) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(server.timeout))
            .build()
            .map_err(|e| RelayError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Open a chat-completions stream. Returns the raw SSE byte stream.
    ///
    /// # Errors
    ///
    /// `Transport` on connection failure, `Upstream` on a non-success
    /// status (surfaced before any streaming begins).
    pub async fn completion_stream(
        &self,
        upstream: &UpstreamConfig,
        request: &CompletionRequest,
    ) -> Result<UpstreamByteStream, RelayError> {
        let url = join_url(&upstream.base_url, "chat/completions");
        let response = self
            .client
            .post(url)
            .bearer_auth(&upstream.api_key)
            .header(http::header::ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await?;
        check_status(response).await
    }

    /// Open an agent run stream. Returns the raw SSE byte stream of
    /// lifecycle events.
    ///
    /// # Errors
    ///
    /// Same failure surface as [`Self::completion_stream`].
    pub async fn agent_stream(
        &self,
        upstream: &UpstreamConfig,
        request: &AgentRunRequest,
    ) -> Result<UpstreamByteStream, RelayError> {
        let url = join_url(&upstream.base_url, "agent/stream");
        let mut builder = self
            .client
            .post(url)
            .header(http::header::ACCEPT, "text/event-stream");
        if !upstream.api_key.is_empty() {
            builder = builder.bearer_auth(&upstream.api_key);
        }
        let response = builder.json(request).send().await?;
        check_status(response).await
    }
}

async fn check_status(response: reqwest::Response) -> Result<UpstreamByteStream, RelayError> {
    let status = response.status();
    if !status.is_success() {
        let mut message = response.text().await.unwrap_or_default();
        message.truncate(UPSTREAM_ERROR_BODY_LIMIT);
        return Err(RelayError::Upstream {
            status: status.as_u16(),
            message,
        });
    }
    Ok(response.bytes_stream().boxed())
}

fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    format!("{base}/{path}")
}
