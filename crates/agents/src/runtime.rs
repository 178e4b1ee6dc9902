//! The handoff runtime: one chat turn's model/tool loop.
//!
//! Starting from a routed agent, the runtime alternates model calls and
//! tool executions until an agent produces a plain reply. Tools may
//! update the context bag or hand the conversation to another agent;
//! a handoff takes effect on the next model call.

use std::sync::Arc;

use swarmlink_core::context::ContextVariables;
use swarmlink_core::error::AgentError;
use swarmlink_core::wire::WireMessage;
use tracing::{debug, info, warn};

use crate::agent::Agent;
use crate::backend::{ModelBackend, TurnMessage};
use crate::roster::AgentRoster;

const DEFAULT_MAX_TURNS: u32 = 10;

/// Everything one `/api/swarm` turn produced.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// Messages generated during the turn (not the input history).
    pub messages: Vec<WireMessage>,

    /// The agent active when the turn ended.
    pub agent_name: String,

    /// The context bag after tool updates.
    pub context_variables: ContextVariables,
}

/// Drives the model/tool loop over a roster of agents.
pub struct HandoffRuntime {
    roster: AgentRoster,
    backend: Arc<dyn ModelBackend>,
    model: String,
    max_turns: u32,
}

impl HandoffRuntime {
    pub fn new(roster: AgentRoster, backend: Arc<dyn ModelBackend>, model: impl Into<String>) -> Self {
        Self {
            roster,
            backend,
            model: model.into(),
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Cap the number of model calls per turn.
    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = max;
        self
    }

    pub fn roster(&self) -> &AgentRoster {
        &self.roster
    }

    /// Run one chat turn.
    ///
    /// `history` is the cleaned request history; the returned outcome
    /// contains only the messages generated here, which is what the
    /// wire contract sends back.
    pub async fn run(
        &self,
        start_agent: &str,
        history: &[WireMessage],
        context: ContextVariables,
    ) -> Result<TurnOutcome, AgentError> {
        let mut active: &Agent = self
            .roster
            .get(start_agent)
            .ok_or_else(|| AgentError::UnknownAgent(start_agent.into()))?;
        let mut context = context;

        let mut messages: Vec<TurnMessage> = history.iter().map(TurnMessage::from_wire).collect();
        let generated_from = messages.len();

        for _ in 0..self.max_turns {
            let system = active.instructions(&context);
            let definitions = active.tool_definitions();

            let turn = self
                .backend
                .complete(&self.model, &system, &messages, &definitions)
                .await?;

            if turn.tool_calls.is_empty() {
                if let Some(content) = turn.content {
                    debug!(agent = %active.name, "Turn finished with a reply");
                    messages.push(TurnMessage::assistant(&active.name, content));
                } else {
                    warn!(agent = %active.name, "Model returned neither content nor tool calls");
                }
                return Ok(self.finish(messages, generated_from, active, context));
            }

            messages.push(TurnMessage {
                role: swarmlink_core::message::Role::Assistant,
                content: turn.content.clone(),
                sender: Some(active.name.clone()),
                tool_calls: turn.tool_calls.clone(),
                tool_call_id: None,
            });

            for call in &turn.tool_calls {
                let Some(tool) = active.find_tool(&call.name) else {
                    warn!(tool = %call.name, agent = %active.name, "Model requested an unknown tool");
                    messages.push(TurnMessage::tool_result(
                        &call.id,
                        format!("Error: tool {} not found.", call.name),
                    ));
                    continue;
                };

                let args: serde_json::Value =
                    serde_json::from_str(&call.arguments).unwrap_or_else(|e| {
                        warn!(tool = %call.name, error = %e, "Unparseable tool arguments");
                        serde_json::json!({})
                    });

                let outcome = tool.invoke(&context, &args);
                debug!(tool = %call.name, agent = %active.name, "Tool executed");

                if let Some(updates) = &outcome.context_updates {
                    context.merge(updates);
                }

                messages.push(TurnMessage::tool_result(&call.id, outcome.value.clone()));

                if let Some(target) = &outcome.handoff {
                    active = self
                        .roster
                        .get(target)
                        .ok_or_else(|| AgentError::UnknownAgent(target.clone()))?;
                    info!(to = %active.name, "Conversation handed off");
                }
            }
        }

        Err(AgentError::TurnLimitExceeded(self.max_turns))
    }

    fn finish(
        &self,
        messages: Vec<TurnMessage>,
        generated_from: usize,
        active: &Agent,
        context: ContextVariables,
    ) -> TurnOutcome {
        TurnOutcome {
            messages: messages[generated_from..]
                .iter()
                .map(TurnMessage::to_wire)
                .collect(),
            agent_name: active.name.clone(),
            context_variables: context,
        }
    }
}
