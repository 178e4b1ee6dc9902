//! Wire types for the `/api/swarm` HTTP contract.
//!
//! Request: the full transcript snapshot plus the context-variable bag.
//! Response: the new messages produced this turn, the name of the agent
//! that ended the turn, and optional context-variable overrides.
//!
//! Wire messages are looser than transcript entries: content may be
//! null and the role may be `tool`, because the gateway echoes its
//! internal tool plumbing back to the client. The session reducer
//! filters all of that out.

use serde::{Deserialize, Serialize};

use crate::context::ContextVariables;
use crate::message::{Message, Role};

/// One `{role, content, sender?}` object on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,

    /// May be null in tool-call turns.
    pub content: Option<String>,

    /// Agent display label, set by the gateway on generated messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
}

impl WireMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
            sender: None,
        }
    }

    pub fn assistant(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            sender: Some(sender.into()),
        }
    }

    /// True for assistant messages with non-empty content — the only
    /// messages the session reducer will consider appending.
    pub fn is_displayable_reply(&self) -> bool {
        self.role == Role::Assistant
            && self.content.as_deref().is_some_and(|c| !c.is_empty())
    }
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        Self {
            role: msg.role,
            content: Some(msg.content.clone()),
            sender: msg.sender.clone(),
        }
    }
}

/// Body of `POST /api/swarm`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Full conversation snapshot, oldest first.
    pub messages: Vec<WireMessage>,

    /// Context bag snapshot.
    #[serde(default)]
    pub context_variables: ContextVariables,
}

/// Body of a successful `/api/swarm` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Messages generated during this turn, oldest first.
    pub messages: Vec<WireMessage>,

    /// Display name of the agent that produced the final reply.
    pub agent_name: String,

    /// Context-variable overrides, if the server changed any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_variables: Option<ContextVariables>,
}
