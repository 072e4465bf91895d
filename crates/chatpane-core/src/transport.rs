//! Backend transport for the `/chat` endpoint.
//!
//! Wire contract: `POST <endpoint>` with `Content-Type: application/json` and
//! body `{"message": "..."}`; the response body must be JSON carrying a string
//! `reply` field. Anything else is a transport error.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;

/// Why a dispatch produced no reply.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat request failed: {0}")]
    Request(String),
    #[error("chat endpoint returned HTTP {status}")]
    Status { status: u16 },
    #[error("chat response is not valid JSON: {0}")]
    Decode(String),
    #[error("chat response has no string `reply` field")]
    MalformedReply,
    #[error("chat request timed out after {0:?}")]
    Timeout(Duration),
}

/// Sends one user message and resolves to exactly one reply.
pub trait ChatTransport: Send + Sync {
    fn send(&self, message: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    reply: Option<serde_json::Value>,
}

/// Extracts the reply text from a decoded response body.
fn reply_from_body(body: &[u8]) -> Result<String, TransportError> {
    let response: ChatResponse =
        serde_json::from_slice(body).map_err(|err| TransportError::Decode(err.to_string()))?;
    match response.reply {
        Some(serde_json::Value::String(reply)) => Ok(reply),
        _ => Err(TransportError::MalformedReply),
    }
}

/// HTTP transport backed by reqwest.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: String,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.into(),
            timeout: None,
        }
    }

    /// Applies a per-request timeout (`None` waits indefinitely).
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Transport for the configured endpoint and request timeout.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.endpoint.clone()).with_timeout(config.request_timeout())
    }

    async fn post(&self, message: &str) -> Result<String, TransportError> {
        let mut request = self
            .http
            .post(&self.endpoint)
            .json(&ChatRequest { message });
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|err| self.map_error(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|err| self.map_error(&err))?;
        reply_from_body(&body)
    }

    fn map_error(&self, err: &reqwest::Error) -> TransportError {
        match self.timeout {
            Some(timeout) if err.is_timeout() => TransportError::Timeout(timeout),
            _ => TransportError::Request(err.to_string()),
        }
    }
}

impl ChatTransport for HttpTransport {
    fn send(&self, message: &str) -> impl Future<Output = Result<String, TransportError>> + Send {
        self.post(message)
    }
}
