//! Error types for the SwarmLink domain.
//!
//! Uses `thiserror` for ergonomic error definitions. The transport and
//! agent-runtime contexts each have their own error enum; the top-level
//! `Error` wraps them for callers that cross both.

use thiserror::Error;

/// The top-level error type for all SwarmLink operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Failures of the client-side HTTP call to the gateway.
///
/// The session controller collapses all of these into a single generic
/// failure class; the variants exist so logs can say what happened.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Gateway returned status {status_code}: {message}")]
    ApiError { status_code: u16, message: String },

    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

/// Failures of the server-side agent runtime and its model backend.
#[derive(Debug, Clone, Error)]
pub enum AgentError {
    #[error("Model API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by model provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Turn limit of {0} exceeded without a final reply")]
    TurnLimitExceeded(u32),
}
