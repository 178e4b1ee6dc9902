//! Interactive terminal chat against a running gateway.
//!
//! Reads from stdin, writes to stdout. The session controller enforces
//! one request in flight; the prompt simply doesn't return until the
//! current cycle settles, so there is nothing for the busy flag to
//! reject here.

use std::io::Write as _;

use swarmlink_client::HttpTransport;
use swarmlink_config::AppConfig;
use swarmlink_core::context::ContextVariables;
use swarmlink_session::{ChatSession, SubmitOutcome};
use tokio::io::{self, AsyncBufReadExt, BufReader};

pub async fn run(message: Option<String>) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    let transport = HttpTransport::new(&config.endpoint);

    let mut context = ContextVariables::new(&config.user.name);
    context.location = config.user.location.clone();
    let mut session = ChatSession::new(context);

    // Single-message mode
    if let Some(message) = message {
        session.submit(&message, &transport).await;
        print_last_reply(&session);
        return Ok(());
    }

    println!("SwarmLink chat — connected to {}", transport.endpoint());
    println!("Type 'exit' to quit.");

    let stdin = io::stdin();
    let reader = BufReader::new(stdin);
    let mut lines = reader.lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF (Ctrl+D)
        };

        let line = line.trim().to_string();
        if matches!(line.as_str(), "exit" | "quit" | "/exit" | "/quit" | ":q") {
            break;
        }

        match session.submit(&line, &transport).await {
            SubmitOutcome::Ignored => continue,
            _ => print_last_reply(&session),
        }
    }

    Ok(())
}

fn print_last_reply(session: &ChatSession) {
    if let Some(msg) = session.transcript().last() {
        let label = msg.sender.as_deref().unwrap_or(session.active_agent());
        println!("{label}: {}", msg.content);
    }
}
