//! HTTP transport seam.
//!
//! The access layer only needs GET with query parameters. Everything above
//! this module talks to [`HttpTransport`], so tests can script replies
//! without a socket.

use async_trait::async_trait;
use std::sync::OnceLock;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: u16,
    pub body: String,
}

impl HttpReply {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Failures below the HTTP layer.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("timed out: {0}")]
    Timeout(String),
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("connection reset: {0}")]
    Reset(String),
    /// The request could not be built or the body could not be read.
    /// Sending it again cannot help.
    #[error("invalid request: {0}")]
    Invalid(String),
    #[error("request failed: {0}")]
    Other(String),
}

#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<HttpReply, TransportError>;
}

static HTTP: OnceLock<reqwest::Client> = OnceLock::new();

fn http_client() -> &'static reqwest::Client {
    HTTP.get_or_init(|| {
        reqwest::Client::builder()
            .pool_max_idle_per_host(8)
            .tcp_nodelay(true)
            .build()
            .unwrap_or_else(|e| {
                log::warn!("[stellarx][http] tuned client unavailable ({e}), using defaults");
                reqwest::Client::new()
            })
    })
}

/// Production transport on a process-wide pooled `reqwest` client.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReqwestTransport;

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<HttpReply, TransportError> {
        let res = http_client()
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(classify)?;
        let status = res.status().as_u16();
        let body = res.text().await.map_err(classify)?;
        Ok(HttpReply { status, body })
    }
}

fn classify(e: reqwest::Error) -> TransportError {
    let msg = e.to_string();
    if e.is_timeout() {
        return TransportError::Timeout(msg);
    }
    if e.is_connect() {
        return TransportError::Connect(msg);
    }
    if e.is_builder() || e.is_decode() {
        return TransportError::Invalid(msg);
    }
    if is_reset(&e) {
        return TransportError::Reset(msg);
    }
    TransportError::Other(msg)
}

fn is_reset(e: &reqwest::Error) -> bool {
    let mut source = std::error::Error::source(e);
    while let Some(err) = source {
        if let Some(io) = err.downcast_ref::<std::io::Error>() {
            return matches!(
                io.kind(),
                std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
            );
        }
        source = err.source();
    }
    false
}
