use anyhow::Result;
use rosmon_agent::agent::Agent;
use rosmon_agent::config::AgentConfig;
use rosmon_agent::logging;
use tokio::signal;
use tokio::time::interval;

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/agent.toml".to_string());

    let config = AgentConfig::load(&config_path)?;
    logging::init(&config.log_level)?;
    tracing::info!(
        config = %config_path,
        devices = config.devices.len(),
        "rosmon-agent starting"
    );

    let mut agent = Agent::from_config(&config)?;
    let mut tick = interval(config.collection_interval());

    tracing::info!(
        interval_secs = config.collection_interval_secs,
        fetch_timeout_secs = config.fetch_timeout_secs,
        max_concurrent = config.max_concurrent,
        "Starting collection loop"
    );

    loop {
        tokio::select! {
            _ = tick.tick() => {
                if let Err(e) = agent.tick().await {
                    tracing::error!(error = %e, "Collection tick failed");
                }
            }
            _ = signal::ctrl_c() => {
                tracing::info!("Shutting down gracefully");
                break;
            }
        }
    }

    Ok(())
}
