//! Core domain types for SwarmLink.
//!
//! Everything that flows between the chat session, the HTTP transport,
//! and the agent gateway is defined here: messages, the session
//! transcript, the context-variable bag, the wire format of the
//! `/api/swarm` contract, and the error taxonomy.

pub mod context;
pub mod error;
pub mod message;
pub mod wire;

pub use context::ContextVariables;
pub use error::{AgentError, Error, Result, TransportError};
pub use message::{Message, Role, Transcript};
pub use wire::{ChatRequest, ChatResponse, WireMessage};
