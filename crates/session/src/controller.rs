//! The session controller state machine.
//!
//! One session owns one transcript, one context bag, and one busy flag.
//! `submit` drives a full cycle; `begin` / `settle_*` expose the same
//! cycle in phases for callers (and tests) that drive the transport
//! themselves.

use swarmlink_client::ChatTransport;
use swarmlink_core::context::ContextVariables;
use swarmlink_core::message::{Message, Transcript};
use swarmlink_core::wire::{ChatRequest, ChatResponse, WireMessage};
use tracing::{debug, warn};

/// Shown when a successful response carries no usable assistant reply.
pub const NO_REPLY_FALLBACK: &str = "I didn't catch that. Could you try rephrasing?";

/// Shown when the transport call fails or the body cannot be parsed.
pub const TRANSPORT_FALLBACK: &str =
    "Sorry, something went wrong while reaching the assistant. Please try again.";

/// Agent label before the server has reported one.
pub const DEFAULT_AGENT_NAME: &str = "Assistant";

/// Result of a completed submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// An assistant reply was appended.
    Replied,
    /// The call succeeded but carried no usable reply; the no-reply
    /// fallback was appended.
    NoReply,
    /// The transport call failed; the error fallback was appended.
    Failed,
    /// Empty input or a cycle already in flight; nothing happened.
    Ignored,
}

/// Result of starting a cycle.
#[derive(Debug, Clone)]
pub enum Begin {
    /// The user message was appended and the request snapshot built.
    Started(ChatRequest),
    /// Input was empty after trimming; silently dropped.
    EmptyInput,
    /// A cycle is already in flight; silently ignored, not queued.
    Busy,
}

/// A chat session: transcript, context bag, active-agent label, and the
/// single-flight guard.
#[derive(Debug, Clone)]
pub struct ChatSession {
    transcript: Transcript,
    context: ContextVariables,
    active_agent: String,
    busy: bool,
}

impl ChatSession {
    /// Create a session with the given initial context.
    pub fn new(context: ContextVariables) -> Self {
        Self {
            transcript: Transcript::new(),
            context,
            active_agent: DEFAULT_AGENT_NAME.into(),
            busy: false,
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn context(&self) -> &ContextVariables {
        &self.context
    }

    /// Display label of the agent that produced the most recent reply.
    pub fn active_agent(&self) -> &str {
        &self.active_agent
    }

    /// True strictly between `begin` and the settling of its call.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Run one full submit cycle against the transport.
    ///
    /// Exactly one attempt: no retry, no timeout. The busy flag is
    /// released on every exit path.
    pub async fn submit(
        &mut self,
        user_text: &str,
        transport: &dyn ChatTransport,
    ) -> SubmitOutcome {
        let request = match self.begin(user_text) {
            Begin::Started(request) => request,
            Begin::EmptyInput | Begin::Busy => return SubmitOutcome::Ignored,
        };

        match transport.send(&request).await {
            Ok(response) => self.settle_success(response),
            Err(e) => {
                warn!(error = %e, "Chat request failed");
                self.settle_failure()
            }
        }
    }

    /// Start a cycle: validate the input, append the user message
    /// immediately, raise the busy flag, and snapshot the request.
    pub fn begin(&mut self, user_text: &str) -> Begin {
        if self.busy {
            debug!("Submit ignored: a request is already in flight");
            return Begin::Busy;
        }

        let trimmed = user_text.trim();
        if trimmed.is_empty() {
            return Begin::EmptyInput;
        }

        self.transcript.push(Message::user(trimmed));
        self.busy = true;

        Begin::Started(ChatRequest {
            messages: self.transcript.iter().map(WireMessage::from).collect(),
            context_variables: self.context.clone(),
        })
    }

    /// Reduce a successful response into the session.
    ///
    /// Appends the last assistant message with non-empty content, or
    /// the no-reply fallback when none qualifies. Updates the agent
    /// label from the response either way, then syncs the context bag
    /// and releases the busy flag.
    pub fn settle_success(&mut self, response: ChatResponse) -> SubmitOutcome {
        let outcome = match response
            .messages
            .iter()
            .rev()
            .find(|m| m.is_displayable_reply())
            .and_then(|m| m.content.clone())
        {
            Some(content) => {
                self.transcript
                    .push(Message::assistant_from(&response.agent_name, content));
                SubmitOutcome::Replied
            }
            None => {
                debug!(agent = %response.agent_name, "Response carried no usable reply");
                self.transcript.push(Message::assistant_from(
                    &response.agent_name,
                    NO_REPLY_FALLBACK,
                ));
                SubmitOutcome::NoReply
            }
        };

        self.active_agent = response.agent_name;

        if let Some(updates) = &response.context_variables {
            if self.context.apply_updates(updates) {
                debug!("Context variables updated from response");
            }
        }

        self.busy = false;
        outcome
    }

    /// Record a transport or parse failure: append the error fallback
    /// tagged with the pre-call agent label (the label itself does not
    /// change) and release the busy flag.
    pub fn settle_failure(&mut self) -> SubmitOutcome {
        self.transcript.push(Message::assistant_from(
            self.active_agent.clone(),
            TRANSPORT_FALLBACK,
        ));
        self.busy = false;
        SubmitOutcome::Failed
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(ContextVariables::default())
    }
}
