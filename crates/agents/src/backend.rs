//! Model backends.
//!
//! The runtime talks to the language model through [`ModelBackend`];
//! [`OpenAiBackend`] implements it against an OpenAI-compatible
//! `/v1/chat/completions` endpoint with function calling.

use async_trait::async_trait;
use serde::Deserialize;
use swarmlink_core::error::AgentError;
use swarmlink_core::message::Role;
use swarmlink_core::wire::WireMessage;
use tracing::{debug, warn};

use crate::agent::ToolDefinition;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    /// Raw JSON arguments string, exactly as the model produced it.
    pub arguments: String,
}

/// One message in the model-facing conversation. Richer than the wire
/// format: it carries the tool-call plumbing the model needs to see on
/// follow-up turns.
#[derive(Debug, Clone)]
pub struct TurnMessage {
    pub role: Role,
    pub content: Option<String>,
    pub sender: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
    pub tool_call_id: Option<String>,
}

impl TurnMessage {
    pub fn from_wire(msg: &WireMessage) -> Self {
        Self {
            role: msg.role,
            content: msg.content.clone(),
            sender: msg.sender.clone(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn to_wire(&self) -> WireMessage {
        WireMessage {
            role: self.role,
            content: self.content.clone(),
            sender: self.sender.clone(),
        }
    }

    pub fn assistant(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: Some(content.into()),
            sender: Some(sender.into()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    pub fn tool_result(call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: Some(content.into()),
            sender: None,
            tool_calls: Vec::new(),
            tool_call_id: Some(call_id.into()),
        }
    }
}

/// What one model call produced.
#[derive(Debug, Clone, Default)]
pub struct ModelTurn {
    pub content: Option<String>,
    pub tool_calls: Vec<ToolInvocation>,
}

/// One completion call against a language model.
#[async_trait]
pub trait ModelBackend: Send + Sync {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        history: &[TurnMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, AgentError>;
}

/// OpenAI-compatible chat completions backend.
pub struct OpenAiBackend {
    base_url: String,
    api_key: String,
    temperature: f32,
    client: reqwest::Client,
}

impl OpenAiBackend {
    /// Create a new backend with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: DEFAULT_BASE_URL.into(),
            api_key: api_key.into(),
            temperature: 0.7,
            client,
        }
    }

    /// Use a custom base URL (e.g. a local OpenAI-compatible server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Convert the turn history to chat-completions message objects.
    fn to_api_messages(system: &str, history: &[TurnMessage]) -> Vec<serde_json::Value> {
        let mut result = vec![serde_json::json!({
            "role": "system",
            "content": system,
        })];

        for msg in history {
            match msg.role {
                Role::User | Role::System => {
                    result.push(serde_json::json!({
                        "role": msg.role,
                        "content": msg.content.clone().unwrap_or_default(),
                    }));
                }
                Role::Assistant => {
                    let mut obj = serde_json::json!({
                        "role": "assistant",
                        "content": msg.content,
                    });
                    if !msg.tool_calls.is_empty() {
                        obj["tool_calls"] = msg
                            .tool_calls
                            .iter()
                            .map(|tc| {
                                serde_json::json!({
                                    "id": tc.id,
                                    "type": "function",
                                    "function": {
                                        "name": tc.name,
                                        "arguments": tc.arguments,
                                    }
                                })
                            })
                            .collect();
                    }
                    result.push(obj);
                }
                Role::Tool => {
                    result.push(serde_json::json!({
                        "role": "tool",
                        "tool_call_id": msg.tool_call_id.clone().unwrap_or_default(),
                        "content": msg.content.clone().unwrap_or_default(),
                    }));
                }
            }
        }

        result
    }

    fn to_api_tools(tools: &[ToolDefinition]) -> Vec<serde_json::Value> {
        tools
            .iter()
            .map(|t| {
                serde_json::json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect()
    }
}

#[async_trait]
impl ModelBackend for OpenAiBackend {
    async fn complete(
        &self,
        model: &str,
        system: &str,
        history: &[TurnMessage],
        tools: &[ToolDefinition],
    ) -> Result<ModelTurn, AgentError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut body = serde_json::json!({
            "model": model,
            "messages": Self::to_api_messages(system, history),
            "temperature": self.temperature,
        });
        if !tools.is_empty() {
            body["tools"] = serde_json::json!(Self::to_api_tools(tools));
        }

        debug!(model, messages = history.len(), "Sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::Network(e.to_string()))?;

        let status = response.status().as_u16();

        if status == 429 {
            return Err(AgentError::RateLimited {
                retry_after_secs: 5,
            });
        }
        if status == 401 || status == 403 {
            return Err(AgentError::AuthenticationFailed("Invalid API key".into()));
        }
        if status != 200 {
            let error_body = response.text().await.unwrap_or_default();
            warn!(status, body = %error_body, "Model API error");
            return Err(AgentError::ApiError {
                status_code: status,
                message: error_body,
            });
        }

        let api_resp: CompletionResponse =
            response.json().await.map_err(|e| AgentError::ApiError {
                status_code: 200,
                message: format!("Failed to parse completion response: {e}"),
            })?;

        api_resp.into_model_turn()
    }
}

// --- Chat completions API types ---

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ApiToolCall>,
}

#[derive(Debug, Deserialize)]
struct ApiToolCall {
    id: String,
    function: ApiFunctionCall,
}

#[derive(Debug, Deserialize)]
struct ApiFunctionCall {
    name: String,
    arguments: String,
}

impl CompletionResponse {
    fn into_model_turn(mut self) -> Result<ModelTurn, AgentError> {
        if self.choices.is_empty() {
            return Err(AgentError::ApiError {
                status_code: 200,
                message: "Completion response contained no choices".into(),
            });
        }
        let message = self.choices.remove(0).message;

        Ok(ModelTurn {
            content: message.content,
            tool_calls: message
                .tool_calls
                .into_iter()
                .map(|tc| ToolInvocation {
                    id: tc.id,
                    name: tc.function.name,
                    arguments: tc.function.arguments,
                })
                .collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructor_defaults() {
        let backend = OpenAiBackend::new("sk-test");
        assert_eq!(backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(backend.temperature, 0.7);
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        let backend = OpenAiBackend::new("sk-test").with_base_url("http://localhost:11434/");
        assert_eq!(backend.base_url, "http://localhost:11434");
    }

    #[test]
    fn api_messages_start_with_system() {
        let history = vec![TurnMessage::from_wire(&WireMessage::user("hi"))];
        let msgs = OpenAiBackend::to_api_messages("You are helpful.", &history);
        assert_eq!(msgs.len(), 2);
        assert_eq!(msgs[0]["role"], "system");
        assert_eq!(msgs[0]["content"], "You are helpful.");
        assert_eq!(msgs[1]["role"], "user");
        assert_eq!(msgs[1]["content"], "hi");
    }

    #[test]
    fn api_messages_carry_tool_plumbing() {
        let history = vec![
            TurnMessage {
                role: Role::Assistant,
                content: None,
                sender: Some("Weather Expert".into()),
                tool_calls: vec![ToolInvocation {
                    id: "call_1".into(),
                    name: "get_weather".into(),
                    arguments: r#"{"location":"Tokyo"}"#.into(),
                }],
                tool_call_id: None,
            },
            TurnMessage::tool_result("call_1", "Cloudy, 70°F"),
        ];

        let msgs = OpenAiBackend::to_api_messages("sys", &history);
        assert_eq!(msgs[1]["tool_calls"][0]["function"]["name"], "get_weather");
        assert_eq!(msgs[2]["role"], "tool");
        assert_eq!(msgs[2]["tool_call_id"], "call_1");
        assert_eq!(msgs[2]["content"], "Cloudy, 70°F");
    }

    #[test]
    fn api_tools_use_function_wrapper() {
        let tools = vec![ToolDefinition {
            name: "get_weather".into(),
            description: "Get weather".into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }];
        let api = OpenAiBackend::to_api_tools(&tools);
        assert_eq!(api[0]["type"], "function");
        assert_eq!(api[0]["function"]["name"], "get_weather");
    }

    #[test]
    fn parse_text_completion() {
        let resp: CompletionResponse = serde_json::from_str(
            r#"{
                "choices": [
                    {"message": {"role": "assistant", "content": "Hello!"}}
                ]
            }"#,
        )
        .unwrap();

        let turn = resp.into_model_turn().unwrap();
        assert_eq!(turn.content.as_deref(), Some("Hello!"));
        assert!(turn.tool_calls.is_empty());
    }

    #[test]
    fn parse_tool_call_completion() {
        let resp: CompletionResponse = serde_json::from_str(
            r#"{
                "choices": [
                    {"message": {
                        "role": "assistant",
                        "content": null,
                        "tool_calls": [
                            {"id": "call_abc", "type": "function",
                             "function": {"name": "get_weather", "arguments": "{\"location\":\"London\"}"}}
                        ]
                    }}
                ]
            }"#,
        )
        .unwrap();

        let turn = resp.into_model_turn().unwrap();
        assert!(turn.content.is_none());
        assert_eq!(turn.tool_calls.len(), 1);
        assert_eq!(turn.tool_calls[0].name, "get_weather");
        assert_eq!(turn.tool_calls[0].id, "call_abc");
    }

    #[test]
    fn empty_choices_is_an_error() {
        let resp: CompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(resp.into_model_turn().is_err());
    }

    #[test]
    fn turn_message_wire_roundtrip() {
        let wire = WireMessage::assistant("Assistant", "Hi");
        let turn = TurnMessage::from_wire(&wire);
        let back = turn.to_wire();
        assert_eq!(back.role, Role::Assistant);
        assert_eq!(back.content.as_deref(), Some("Hi"));
        assert_eq!(back.sender.as_deref(), Some("Assistant"));
    }
}
