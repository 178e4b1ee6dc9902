//! The default agent roster and request routing.
//!
//! Three personas: a general assistant that can transfer out, a
//! Finnish-only agent, and a weather agent with a canned lookup table.
//! Routing picks the agent whose name last appeared as a `sender` in
//! the request history, so a conversation stays with the persona that
//! spoke last until something transfers it.

use serde_json::json;

use swarmlink_core::context::ContextVariables;
use swarmlink_core::wire::WireMessage;
use tracing::debug;

use crate::agent::{Agent, Tool, ToolDefinition, ToolOutcome};
use std::sync::Arc;

pub const ASSISTANT: &str = "Assistant";
pub const FINNISH_AGENT: &str = "Finnish Agent";
pub const WEATHER_EXPERT: &str = "Weather Expert";

/// Canned weather data; a real deployment would call a weather API.
const WEATHER_TABLE: &[(&str, &str)] = &[
    ("New York", "Sunny, 75°F"),
    ("London", "Rainy, 60°F"),
    ("Tokyo", "Cloudy, 70°F"),
    ("Sydney", "Clear, 80°F"),
    ("Helsinki", "Snow, 25°F (-4°C)"),
];

/// A named set of agents with a default entry point.
pub struct AgentRoster {
    agents: Vec<Agent>,
    default_agent: String,
}

impl AgentRoster {
    /// Create a roster whose first agent is the default.
    pub fn new(default_agent: Agent) -> Self {
        let name = default_agent.name.clone();
        Self {
            agents: vec![default_agent],
            default_agent: name,
        }
    }

    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agents.push(agent);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn default_name(&self) -> &str {
        &self.default_agent
    }

    /// Pick the agent for a request: the roster agent whose name most
    /// recently appeared as a message `sender`, else the default.
    pub fn route<'a>(&'a self, messages: &[WireMessage]) -> &'a str {
        for msg in messages.iter().rev() {
            if let Some(sender) = &msg.sender {
                if let Some(agent) = self.get(sender) {
                    debug!(agent = %agent.name, "Routed request to last-seen agent");
                    return &agent.name;
                }
            }
        }
        &self.default_agent
    }
}

/// Build the default three-agent roster.
pub fn default_roster() -> AgentRoster {
    AgentRoster::new(assistant_agent())
        .with_agent(finnish_agent())
        .with_agent(weather_agent())
}

fn assistant_agent() -> Agent {
    Agent::new(ASSISTANT, |ctx: &ContextVariables| {
        format!(
            "You are a helpful assistant.\n\
             If the user wants to speak in Finnish or mentions Finland, transfer to the \
             Finnish-speaking agent using transfer_to_finnish.\n\
             If the user asks about weather information, transfer to the weather agent \
             using transfer_to_weather.\n\
             When the user asks to update their information or change their name or \
             location, use the update_user_info function.\n\
             Current user info: {} from {}",
            ctx.user_name_or("Unknown"),
            ctx.location_or("Unknown location"),
        )
    })
    .with_tool(transfer_tool(
        "transfer_to_finnish",
        "Transfer the conversation to the Finnish-speaking agent.",
        FINNISH_AGENT,
    ))
    .with_tool(transfer_tool(
        "transfer_to_weather",
        "Transfer the conversation to the weather agent.",
        WEATHER_EXPERT,
    ))
    .with_tool(update_user_info_tool())
}

fn finnish_agent() -> Agent {
    Agent::new(FINNISH_AGENT, |ctx: &ContextVariables| {
        format!(
            "You are a helpful agent who speaks ONLY in Finnish.\n\
             Always respond in Finnish, regardless of the language the user is using.\n\
             Current user: {} from {}\n\
             If the user wants to stop speaking Finnish, transfer them back to the main \
             assistant using transfer_to_assistant.",
            ctx.user_name_or("friend"),
            ctx.location_or("somewhere"),
        )
    })
    .with_tool(transfer_tool(
        "transfer_to_assistant",
        "Transfer back to the main assistant agent.",
        ASSISTANT,
    ))
}

fn weather_agent() -> Agent {
    Agent::new(WEATHER_EXPERT, |ctx: &ContextVariables| {
        format!(
            "You are a weather expert who helps users find weather information.\n\
             You have access to the get_weather function to check current conditions.\n\
             Current user: {} from {}\n\
             If the user wants to discuss something other than weather, transfer them \
             back to the assistant using transfer_to_assistant.",
            ctx.user_name_or("visitor"),
            ctx.location_or("unknown location"),
        )
    })
    .with_tool(get_weather_tool())
    .with_tool(transfer_tool(
        "transfer_to_assistant",
        "Transfer back to the main assistant agent.",
        ASSISTANT,
    ))
}

fn transfer_tool(name: &str, description: &str, target: &'static str) -> Tool {
    Tool::simple(name, description, move |_, _| ToolOutcome::handoff(target))
}

fn update_user_info_tool() -> Tool {
    Tool::new(
        ToolDefinition {
            name: "update_user_info".into(),
            description: "Update the user's name and optionally their location.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "name": {"type": "string", "description": "Name of the user"},
                    "location": {"type": "string", "description": "Location of the user"}
                },
                "required": ["name"]
            }),
        },
        Arc::new(|_, args: &serde_json::Value| {
            let name = args["name"].as_str().unwrap_or("Unknown").to_string();
            let location = args["location"].as_str().map(str::to_string);

            let mut updates = ContextVariables::new(&name);
            if let Some(location) = &location {
                updates.location = Some(location.clone());
            }

            ToolOutcome::value(format!(
                "Updated your information: {} from {}",
                name,
                location.as_deref().unwrap_or("unknown location"),
            ))
            .with_context(updates)
        }),
    )
}

fn get_weather_tool() -> Tool {
    Tool::new(
        ToolDefinition {
            name: "get_weather".into(),
            description: "Get the current weather for a location.".into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "location": {"type": "string", "description": "The location to get weather for"}
                }
            }),
        },
        Arc::new(|_, args: &serde_json::Value| {
            let location = args["location"].as_str().unwrap_or("Helsinki");
            let weather = WEATHER_TABLE
                .iter()
                .find(|(city, _)| *city == location)
                .map(|(_, conditions)| (*conditions).to_string())
                .unwrap_or_else(|| format!("Weather data not available for {location}"));

            ToolOutcome::value(format!("The current weather in {location} is: {weather}"))
        }),
    )
}
