//! Controller relay entry point.

use pad_server::config::Config;
use pad_server::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    info!(
        "Starting pad-server on {} (control port {}, max_connections = {})",
        config.socket_addr_string(),
        config.control_port,
        config.max_connections
    );

    server::run(config).await
}
