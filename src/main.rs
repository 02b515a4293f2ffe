use anyhow::{Context as _, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use chored::config::Config;
use chored::provider::anthropic::AnthropicClient;
use chored::rest;
use chored::storage::Storage;
use chored::AppContext;

#[derive(Parser)]
#[command(
    name = "chored",
    about = "chored — chat-driven personal task manager daemon",
    version
)]
struct Args {
    /// Path to a TOML config file
    #[arg(long, env = "CHORED_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP port
    #[arg(long, env = "CHORED_PORT")]
    port: Option<u16>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "CHORED_BIND")]
    bind_address: Option<String>,

    /// Data directory for the SQLite database
    #[arg(long, env = "CHORED_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log filter (trace, debug, info, warn, error)
    #[arg(long, env = "CHORED_LOG", default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&args.log))
        .compact()
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(bind_address) = args.bind_address {
        config.server.bind_address = bind_address;
    }
    if let Some(data_dir) = args.data_dir {
        config.server.data_dir = data_dir;
    }

    let api_key =
        std::env::var("ANTHROPIC_API_KEY").context("ANTHROPIC_API_KEY is not set")?;

    // Open-or-create and migrate eagerly, before serving any request.
    let storage = Arc::new(Storage::new(&config.server.data_dir).await?);
    info!(data_dir = %config.server.data_dir.display(), "store ready");

    let model = Arc::new(AnthropicClient::new(
        &config.model,
        api_key,
        config.retry.to_retry_config(),
    )?);

    let ctx = Arc::new(AppContext {
        config: Arc::new(config),
        storage,
        model,
        started_at: std::time::Instant::now(),
    });

    rest::serve(ctx).await
}
