//! EchoMind API proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!   Front-end ──▶ auth ──▶ routes ──▶ Dispatcher ──▶ UpstreamClient ──▶ EchoMind API
//!                                        │                                  │
//!   Front-end ◀───────────── RelayStream ◀──────────────────────────────────┘
//!
//!   GET /echomind/health ──▶ HealthProber ──▶ {base}/health
//! ```

use std::path::PathBuf;

use clap::Parser;

use echomind_proxy::config::{self, ProxyConfig};
use echomind_proxy::lifecycle::startup;
use echomind_proxy::observability;

#[derive(Parser)]
#[command(name = "echomind-proxy")]
#[command(about = "Streaming reverse proxy in front of the EchoMind API", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults plus environment when omitted.
    #[arg(short, long, env = "ECHOMIND_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Override listener.bind_address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config: ProxyConfig = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => config::load_from_env()?,
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    observability::init_logging(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config_file = ?cli.config,
        bind_address = %config.listener.bind_address,
        upstream_enabled = config.upstream.enabled(),
        timeout_secs = config.upstream.timeout_secs,
        "echomind-proxy starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
