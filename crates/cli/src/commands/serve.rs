//! Start the multi-agent HTTP gateway.

use swarmlink_config::AppConfig;

pub async fn run(port: Option<u16>) -> anyhow::Result<()> {
    let mut config = AppConfig::load()?;
    if let Some(port) = port {
        config.gateway.port = port;
    }

    swarmlink_gateway::start(config).await?;
    Ok(())
}
