use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use stagehand_api::{ServiceApi, ServiceConfig, serve, shutdown_signal};
use stagehand_observe::{LoggerConfig, logger_init};

/// Serve `GET /name` and `GET /version`.
#[derive(Debug, Parser)]
#[command(name = "stagehand-service", version)]
struct Cli {
    /// Bind address; overrides STAGEHAND_HOST.
    #[arg(long)]
    host: Option<String>,

    /// Bind port; overrides STAGEHAND_PORT.
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger_init(&LoggerConfig::from_env()?)?;

    let mut cfg = ServiceConfig::from_env()?;
    if let Some(host) = cli.host {
        cfg.host = host;
    }
    if let Some(port) = cli.port {
        cfg.port = port;
    }

    let addr = cfg.addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        developer_name = %cfg.routes.developer_name,
        version = %cfg.routes.version,
        "routes configured"
    );

    serve(listener, ServiceApi::new(cfg.routes).router(), shutdown_signal()).await?;
    Ok(())
}
