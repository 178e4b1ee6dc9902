//! Agent and tool definitions.

use std::sync::Arc;

use swarmlink_core::context::ContextVariables;

/// Renders an agent's system prompt from the current context bag.
pub type Instructions = Arc<dyn Fn(&ContextVariables) -> String + Send + Sync>;

/// Executes a tool call. Receives the current context bag and the
/// parsed JSON arguments from the model.
pub type ToolHandler = Arc<dyn Fn(&ContextVariables, &serde_json::Value) -> ToolOutcome + Send + Sync>;

/// Schema of a tool as advertised to the model backend.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema of the arguments object.
    pub parameters: serde_json::Value,
}

/// What a tool call produced: a result value for the model, and
/// optionally context updates and/or a handoff to another agent.
#[derive(Debug, Clone, Default)]
pub struct ToolOutcome {
    /// Text fed back to the model as the tool result.
    pub value: String,

    /// Name of the agent that should take over the conversation.
    pub handoff: Option<String>,

    /// Context fields to merge into the bag (present fields win).
    pub context_updates: Option<ContextVariables>,
}

impl ToolOutcome {
    /// A plain result value.
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            ..Self::default()
        }
    }

    /// Hand the conversation off to another agent.
    pub fn handoff(agent_name: impl Into<String>) -> Self {
        let agent_name = agent_name.into();
        Self {
            value: format!("Transferred to {agent_name}."),
            handoff: Some(agent_name),
            context_updates: None,
        }
    }

    pub fn with_context(mut self, updates: ContextVariables) -> Self {
        self.context_updates = Some(updates);
        self
    }
}

/// A callable tool: schema plus handler.
#[derive(Clone)]
pub struct Tool {
    pub definition: ToolDefinition,
    handler: ToolHandler,
}

impl Tool {
    pub fn new(definition: ToolDefinition, handler: ToolHandler) -> Self {
        Self {
            definition,
            handler,
        }
    }

    /// A tool with no arguments, described by name and description only.
    pub fn simple(
        name: &str,
        description: &str,
        handler: impl Fn(&ContextVariables, &serde_json::Value) -> ToolOutcome + Send + Sync + 'static,
    ) -> Self {
        Self::new(
            ToolDefinition {
                name: name.into(),
                description: description.into(),
                parameters: serde_json::json!({
                    "type": "object",
                    "properties": {}
                }),
            },
            Arc::new(handler),
        )
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    pub fn invoke(&self, context: &ContextVariables, args: &serde_json::Value) -> ToolOutcome {
        (self.handler)(context, args)
    }
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.definition.name)
            .finish_non_exhaustive()
    }
}

/// A conversational persona: name, instruction template, tool set.
#[derive(Clone)]
pub struct Agent {
    pub name: String,
    instructions: Instructions,
    pub tools: Vec<Tool>,
}

impl Agent {
    pub fn new(
        name: impl Into<String>,
        instructions: impl Fn(&ContextVariables) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: Arc::new(instructions),
            tools: Vec::new(),
        }
    }

    pub fn with_tool(mut self, tool: Tool) -> Self {
        self.tools.push(tool);
        self
    }

    /// Render the system prompt for the current context.
    pub fn instructions(&self, context: &ContextVariables) -> String {
        (self.instructions)(context)
    }

    pub fn find_tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.definition.clone()).collect()
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field(
                "tools",
                &self.tools.iter().map(|t| t.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
