//! Agent roster, tools, and the handoff runtime.
//!
//! An agent is a name, a context-aware instruction template, and a set
//! of tools. Tools can return plain values, context-variable updates,
//! or hand the conversation off to another agent. The runtime drives
//! the model/tool loop for one chat turn; the gateway exposes it over
//! HTTP.

pub mod agent;
pub mod backend;
pub mod roster;
pub mod runtime;

pub use agent::{Agent, Tool, ToolDefinition, ToolOutcome};
pub use backend::{ModelBackend, ModelTurn, OpenAiBackend, ToolInvocation, TurnMessage};
pub use roster::{default_roster, AgentRoster, ASSISTANT, FINNISH_AGENT, WEATHER_EXPERT};
pub use runtime::{HandoffRuntime, TurnOutcome};
