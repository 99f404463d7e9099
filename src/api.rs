//! Chat endpoint client.
//!
//! SYSTEM CONTEXT
//! ==============
//! One request/response cycle against `POST /api/ai-chat`. The dispatcher
//! talks to the endpoint through [`ChatTransport`] so tests and alternate
//! hosts can substitute their own transport; [`HttpChatClient`] is the
//! reqwest implementation.
//!
//! ERROR HANDLING
//! ==============
//! Every failure mode (transport error, non-2xx status, malformed body)
//! maps to a [`ChatError`]. The caller turns any of them into the same
//! user-facing fallback, so variants exist for logging only.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::conversation::SessionId;

pub const CHAT_PATH: &str = "/api/ai-chat";

// =============================================================================
// ERROR TYPE
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChatError {
    /// The request never produced a response (connect, DNS, reset, timeout).
    #[error("chat request failed: {0}")]
    Request(String),

    /// The endpoint answered with a non-success status.
    #[error("chat endpoint returned status {status}")]
    Status { status: u16, body: String },

    /// The response body was not a valid chat reply.
    #[error("chat response parse failed: {0}")]
    Parse(String),

    /// The HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ChatError {
    /// Whether a later identical request could plausibly succeed.
    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Request(_) | Self::Status { status: 429 | 500..=599, .. })
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub question: String,
    pub session_id: SessionId,
    /// Serialized as `null` when no user is signed in.
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatReply {
    pub answer: String,
    #[serde(default)]
    pub context: Option<serde_json::Value>,
}

/// Parse a success body into a [`ChatReply`].
///
/// # Errors
///
/// Returns [`ChatError::Parse`] when the body is not JSON or lacks a string `answer`.
pub fn parse_reply(body: &str) -> Result<ChatReply, ChatError> {
    serde_json::from_str(body).map_err(|e| ChatError::Parse(e.to_string()))
}

// =============================================================================
// TRANSPORT
// =============================================================================

/// One attempt at the chat endpoint.
#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError>;
}

/// reqwest-backed [`ChatTransport`].
pub struct HttpChatClient {
    http: reqwest::Client,
    url: String,
}

impl HttpChatClient {
    /// Build a client posting to `{base_url}/api/ai-chat`.
    ///
    /// A timeout of `None` is not applied; reqwest's default (no deadline)
    /// stands.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(
        base_url: &str,
        connect_timeout: Option<Duration>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, ChatError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| ChatError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, url: chat_endpoint(base_url) })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait::async_trait]
impl ChatTransport for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        let response = self
            .http
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::Request(e.to_string()))?;
        if !status.is_success() {
            return Err(ChatError::Status { status: status.as_u16(), body: text });
        }
        parse_reply(&text)
    }
}

fn chat_endpoint(base_url: &str) -> String {
    format!("{}{CHAT_PATH}", base_url.trim_end_matches('/'))
}
