//! Chat session controller.
//!
//! Maintains the conversation transcript and mediates exactly one
//! request/response cycle at a time against a [`ChatTransport`].

mod controller;

pub use controller::{
    Begin, ChatSession, SubmitOutcome, DEFAULT_AGENT_NAME, NO_REPLY_FALLBACK, TRANSPORT_FALLBACK,
};
