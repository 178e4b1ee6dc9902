//! HTTP transport for the `/api/swarm` chat endpoint.
//!
//! The session controller talks to the gateway through the
//! [`ChatTransport`] trait so tests can substitute scripted
//! implementations; [`HttpTransport`] is the real one.

use async_trait::async_trait;
use swarmlink_core::error::TransportError;
use swarmlink_core::wire::{ChatRequest, ChatResponse};
use tracing::{debug, warn};

/// One request/response exchange with the chat endpoint.
///
/// A single attempt per call: no retry, no backoff, and no timeout —
/// the caller waits until the request settles.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// Transport that POSTs to a fixed endpoint over HTTP.
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport targeting the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        debug!(
            endpoint = %self.endpoint,
            messages = request.messages.len(),
            "Posting chat request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !(200..300).contains(&status) {
            let body = response.text().await.unwrap_or_default();
            warn!(status, body = %body, "Chat endpoint returned an error");
            return Err(TransportError::ApiError {
                status_code: status,
                message: body,
            });
        }

        response
            .json::<ChatResponse>()
            .await
            .map_err(|e| TransportError::MalformedBody(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use swarmlink_core::context::ContextVariables;
    use swarmlink_core::wire::WireMessage;

    #[test]
    fn transport_remembers_endpoint() {
        let transport = HttpTransport::new("http://127.0.0.1:8000/api/swarm");
        assert_eq!(transport.endpoint(), "http://127.0.0.1:8000/api/swarm");
    }

    #[test]
    fn request_body_matches_contract() {
        let request = ChatRequest {
            messages: vec![
                WireMessage::user("Hei!"),
                WireMessage::assistant("Finnish Agent", "Hei, mitä kuuluu?"),
            ],
            context_variables: ContextVariables::new("Guest").with_location("Helsinki"),
        };

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][1]["sender"], "Finnish Agent");
        assert_eq!(body["context_variables"]["user_name"], "Guest");
        assert_eq!(body["context_variables"]["location"], "Helsinki");
    }
}
