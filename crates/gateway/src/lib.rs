//! HTTP gateway for SwarmLink.
//!
//! Exposes the `/api/swarm` chat endpoint and a health check. Requests
//! are cleaned and truncated, routed to the agent that last spoke, and
//! run through the handoff runtime. Failures never surface as HTTP
//! errors: the client receives its own history back with a fixed
//! apology reply, so the conversation can simply continue.
//!
//! Built on Axum.

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use tower_http::cors::CorsLayer;
use tracing::{error, info};

use swarmlink_agents::{default_roster, HandoffRuntime, OpenAiBackend, ASSISTANT};
use swarmlink_core::error::{AgentError, Error};
use swarmlink_core::message::Role;
use swarmlink_core::wire::{ChatRequest, ChatResponse, WireMessage};

/// Apology appended to the echoed history when a turn fails.
const ERROR_REPLY: &str = "I'm sorry, I encountered an error. Could you try again?";

/// Shared application state for the gateway.
pub struct GatewayState {
    pub runtime: HandoffRuntime,
    /// Keep only this many trailing messages of request history.
    pub history_limit: usize,
}

type SharedState = Arc<GatewayState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/swarm", post(swarm_handler))
        .layer(CorsLayer::permissive())
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: swarmlink_config::AppConfig) -> swarmlink_core::Result<()> {
    let Some(api_key) = config.api_key.clone() else {
        return Err(AgentError::NotConfigured(
            "No API key configured; set SWARMLINK_API_KEY or OPENAI_API_KEY".into(),
        )
        .into());
    };

    let backend = OpenAiBackend::new(api_key)
        .with_base_url(&config.backend.api_url)
        .with_temperature(config.backend.temperature);

    let runtime = HandoffRuntime::new(default_roster(), Arc::new(backend), &config.model)
        .with_max_turns(config.backend.max_turns);

    let state = Arc::new(GatewayState {
        runtime,
        history_limit: config.gateway.history_limit,
    });

    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);
    let app = build_router(state);

    info!(addr = %addr, model = %config.model, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Internal(format!("Failed to bind {addr}: {e}")))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn swarm_handler(
    State(state): State<SharedState>,
    Json(request): Json<ChatRequest>,
) -> (StatusCode, Json<ChatResponse>) {
    info!(messages = request.messages.len(), "Chat request received");

    // Truncation happens before anything else looks at the history:
    // routing and the failure echo see only this window, so a sender
    // older than the window no longer holds the conversation.
    let window = trailing_window(request.messages, state.history_limit);

    let start_agent = state.runtime.roster().route(&window).to_string();

    let history = clean_history(&window);

    match state
        .runtime
        .run(&start_agent, &history, request.context_variables.clone())
        .await
    {
        Ok(outcome) => {
            info!(
                agent = %outcome.agent_name,
                generated = outcome.messages.len(),
                "Chat turn completed"
            );
            (
                StatusCode::OK,
                Json(ChatResponse {
                    messages: outcome.messages,
                    agent_name: outcome.agent_name,
                    context_variables: Some(outcome.context_variables),
                }),
            )
        }
        Err(e) => {
            error!(error = %e, "Chat turn failed");
            (
                StatusCode::OK,
                Json(fallback_response(window, request.context_variables)),
            )
        }
    }
}

/// Keep only the trailing `limit` messages.
fn trailing_window(mut messages: Vec<WireMessage>, limit: usize) -> Vec<WireMessage> {
    let excess = messages.len().saturating_sub(limit);
    if excess > 0 {
        messages.drain(..excess);
        info!(kept = messages.len(), "Truncated request history");
    }
    messages
}

/// Drop anything the model must not see: non-conversation roles and
/// null content. An empty result is seeded with a single greeting so
/// the runtime always has input.
fn clean_history(messages: &[WireMessage]) -> Vec<WireMessage> {
    let mut cleaned: Vec<WireMessage> = messages
        .iter()
        .filter(|m| {
            matches!(m.role, Role::User | Role::Assistant | Role::System) && m.content.is_some()
        })
        .cloned()
        .collect();

    if cleaned.is_empty() {
        cleaned.push(WireMessage::user("Hello"));
    }
    cleaned
}

/// The failure response: echo the (truncated) request history plus a
/// fixed apology, with the context bag passed through untouched.
fn fallback_response(
    mut messages: Vec<WireMessage>,
    context_variables: swarmlink_core::ContextVariables,
) -> ChatResponse {
    messages.push(WireMessage::assistant(ASSISTANT, ERROR_REPLY));
    ChatResponse {
        messages,
        agent_name: ASSISTANT.into(),
        context_variables: Some(context_variables),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use swarmlink_agents::{ModelBackend, ModelTurn, TurnMessage};
    use swarmlink_core::context::ContextVariables;
    use swarmlink_core::error::AgentError;
    use tower::ServiceExt;

    struct FixedBackend {
        reply: Option<String>,
    }

    #[async_trait]
    impl ModelBackend for FixedBackend {
        async fn complete(
            &self,
            _model: &str,
            _system: &str,
            _history: &[TurnMessage],
            _tools: &[swarmlink_agents::ToolDefinition],
        ) -> Result<ModelTurn, AgentError> {
            match &self.reply {
                Some(reply) => Ok(ModelTurn {
                    content: Some(reply.clone()),
                    tool_calls: vec![],
                }),
                None => Err(AgentError::Network("connection refused".into())),
            }
        }
    }

    fn test_state(reply: Option<&str>) -> SharedState {
        let backend = FixedBackend {
            reply: reply.map(str::to_string),
        };
        Arc::new(GatewayState {
            runtime: HandoffRuntime::new(default_roster(), Arc::new(backend), "gpt-4o"),
            history_limit: 10,
        })
    }

    fn chat_request_body(messages: serde_json::Value) -> Body {
        Body::from(
            serde_json::json!({
                "messages": messages,
                "context_variables": {"user_name": "Guest"}
            })
            .to_string(),
        )
    }

    async fn response_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(test_state(Some("hi")));

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn start_refuses_without_api_key() {
        // Default config carries no key; start must fail before binding.
        let err = start(swarmlink_config::AppConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Agent(AgentError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn swarm_endpoint_returns_reply() {
        let app = build_router(test_state(Some("Hello, Guest!")));

        let req = Request::builder()
            .method("POST")
            .uri("/api/swarm")
            .header("Content-Type", "application/json")
            .body(chat_request_body(serde_json::json!([
                {"role": "user", "content": "hello"}
            ])))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["agent_name"], "Assistant");
        assert_eq!(body["messages"][0]["content"], "Hello, Guest!");
        assert_eq!(body["context_variables"]["user_name"], "Guest");
    }

    #[tokio::test]
    async fn swarm_endpoint_failure_returns_apology_with_history() {
        let app = build_router(test_state(None));

        let req = Request::builder()
            .method("POST")
            .uri("/api/swarm")
            .header("Content-Type", "application/json")
            .body(chat_request_body(serde_json::json!([
                {"role": "user", "content": "hello"}
            ])))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        // Failures are delivered as a normal reply, not an HTTP error.
        assert_eq!(response.status(), StatusCode::OK);

        let body = response_json(response).await;
        assert_eq!(body["agent_name"], "Assistant");
        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2); // echoed history + apology
        assert_eq!(messages[0]["content"], "hello");
        assert_eq!(messages[1]["content"], ERROR_REPLY);
        assert_eq!(body["context_variables"]["user_name"], "Guest");
    }

    #[tokio::test]
    async fn swarm_endpoint_routes_to_last_sender() {
        let app = build_router(test_state(Some("Aurinkoista!")));

        let req = Request::builder()
            .method("POST")
            .uri("/api/swarm")
            .header("Content-Type", "application/json")
            .body(chat_request_body(serde_json::json!([
                {"role": "user", "content": "moi"},
                {"role": "assistant", "content": "Hei!", "sender": "Finnish Agent"},
                {"role": "user", "content": "mitä kuuluu?"}
            ])))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        let body = response_json(response).await;
        assert_eq!(body["agent_name"], "Finnish Agent");
        assert_eq!(body["messages"][0]["sender"], "Finnish Agent");
    }

    #[tokio::test]
    async fn routing_ignores_senders_outside_history_window() {
        let app = build_router(test_state(Some("Hello again!")));

        // Eleven messages; the only known sender sits on the oldest
        // one, which the 10-message window drops before routing.
        let mut messages = vec![serde_json::json!(
            {"role": "assistant", "content": "Hei!", "sender": "Finnish Agent"}
        )];
        for i in 0..10 {
            messages.push(serde_json::json!({"role": "user", "content": format!("msg {i}")}));
        }

        let req = Request::builder()
            .method("POST")
            .uri("/api/swarm")
            .header("Content-Type", "application/json")
            .body(chat_request_body(serde_json::Value::Array(messages)))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        let body = response_json(response).await;
        assert_eq!(body["agent_name"], "Assistant");
    }

    #[tokio::test]
    async fn failure_echo_is_truncated_to_window() {
        let app = build_router(test_state(None));

        let messages: Vec<serde_json::Value> = (0..12)
            .map(|i| serde_json::json!({"role": "user", "content": format!("msg {i}")}))
            .collect();

        let req = Request::builder()
            .method("POST")
            .uri("/api/swarm")
            .header("Content-Type", "application/json")
            .body(chat_request_body(serde_json::Value::Array(messages)))
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        let body = response_json(response).await;
        let echoed = body["messages"].as_array().unwrap();
        // 10-message window + apology
        assert_eq!(echoed.len(), 11);
        assert_eq!(echoed[0]["content"], "msg 2");
        assert_eq!(echoed[10]["content"], ERROR_REPLY);
    }

    #[test]
    fn trailing_window_keeps_newest_messages() {
        let messages: Vec<WireMessage> = (0..15)
            .map(|i| WireMessage::user(format!("msg {i}")))
            .collect();
        let window = trailing_window(messages, 10);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content.as_deref(), Some("msg 5"));
    }

    #[test]
    fn clean_history_drops_tool_and_null_messages() {
        let messages = vec![
            WireMessage::user("hi"),
            WireMessage {
                role: Role::Tool,
                content: Some("internal".into()),
                sender: None,
            },
            WireMessage {
                role: Role::Assistant,
                content: None,
                sender: None,
            },
            WireMessage::assistant("Assistant", "hello"),
        ];
        let history = clean_history(&messages);
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].content.as_deref(), Some("hi"));
        assert_eq!(history[1].content.as_deref(), Some("hello"));
    }

    #[test]
    fn clean_history_seeds_empty_input() {
        let history = clean_history(&[]);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content.as_deref(), Some("Hello"));
        assert_eq!(history[0].role, Role::User);
    }

    #[test]
    fn fallback_echoes_history_and_context() {
        let response = fallback_response(
            vec![WireMessage::user("hi")],
            ContextVariables::new("Guest").with_location("Helsinki"),
        );
        assert_eq!(response.messages.len(), 2);
        assert_eq!(response.messages[1].content.as_deref(), Some(ERROR_REPLY));
        assert_eq!(response.agent_name, "Assistant");
        assert_eq!(
            response.context_variables.unwrap().location.as_deref(),
            Some("Helsinki")
        );
    }
}
