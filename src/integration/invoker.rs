//! Backend function invocation.
//!
//! # Responsibilities
//! - POST the envelope as JSON to the configured invocation URL
//! - Bound every call with the configured timeout
//! - Classify failures so the dispatcher can fall back to a fixed 502
//!
//! # Design Decisions
//! - Exactly one attempt per request; nothing here retries
//! - HTTP error statuses from the invocation endpoint itself count as
//!   transport failures, as does a reply that is not an invocation response

use std::time::Duration;

use thiserror::Error;

use crate::config::BackendConfig;
use crate::integration::envelope::InvocationEnvelope;
use crate::integration::response::{InvocationResponse, NormalizeError};

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("backend invocation timed out after {0:?}")]
    Timeout(Duration),

    #[error("backend transport error: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("backend invocation endpoint returned HTTP {0}")]
    Status(u16),

    #[error("backend reply is not an invocation response: {0}")]
    MalformedReply(#[from] serde_json::Error),

    #[error(transparent)]
    Decode(#[from] NormalizeError),
}

impl InvokeError {
    /// Short label for metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            InvokeError::Timeout(_) => "timeout",
            InvokeError::Transport(_) => "transport",
            InvokeError::Status(_) => "status",
            InvokeError::MalformedReply(_) => "malformed",
            InvokeError::Decode(_) => "decode",
        }
    }
}

/// HTTP client bound to one backend function.
#[derive(Debug, Clone)]
pub struct BackendInvoker {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl BackendInvoker {
    pub fn new(config: &BackendConfig) -> Result<Self, reqwest::Error> {
        let timeout = config.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .no_proxy()
            .build()?;

        Ok(Self {
            client,
            url: config.invocation_url(),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn classify(&self, error: reqwest::Error) -> InvokeError {
        if error.is_timeout() {
            InvokeError::Timeout(self.timeout)
        } else {
            InvokeError::Transport(error)
        }
    }

    /// Invoke the function once and normalize its reply.
    pub async fn invoke(
        &self,
        envelope: &InvocationEnvelope,
    ) -> Result<InvocationResponse, InvokeError> {
        tracing::debug!(url = %self.url, resource = %envelope.resource, "Sending payload to backend function");

        let response = self
            .client
            .post(&self.url)
            .json(envelope)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "Received response from backend function");
        if status.is_client_error() || status.is_server_error() {
            return Err(InvokeError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await.map_err(|e| self.classify(e))?;
        let normalized = InvocationResponse::from_json(&bytes)??;

        tracing::debug!(
            status_code = normalized.status_code,
            body_bytes = normalized.body.len(),
            "Normalized backend response"
        );
        Ok(normalized)
    }
}
