//! Post Gateway (v1)
//!
//! Republishes an upstream blog/comment API under its own endpoints with
//! title filtering, post+comments composition, uniform error bodies, and
//! trace ids on every response.
//!
//! # Architecture Overview
//!
//! ```text
//!                      ┌──────────────────────────────────────────────────┐
//!                      │                  POST GATEWAY                    │
//!                      │                                                  │
//!   Client Request     │  ┌──────────┐  ┌───────────┐  ┌──────────────┐  │
//!   ───────────────────┼─▶│ request  │─▶│  trace    │─▶│  handlers    │  │
//!                      │  │   id     │  │ context   │  │ + validator  │  │
//!                      │  └──────────┘  └───────────┘  └──────┬───────┘  │
//!                      │                                      │          │
//!                      │                                      ▼          │
//!   Client Response    │  ┌──────────┐  ┌───────────┐  ┌──────────────┐  │
//!   ◀──────────────────┼──│  trace   │◀─│  error    │◀─│  upstream    │◀─┼── Upstream
//!                      │  │ headers  │  │ presenter │  │   client     │  │     API
//!                      │  └──────────┘  └───────────┘  └──────────────┘  │
//!                      └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use post_gateway::config::load_or_default;
use post_gateway::lifecycle::{signals, startup, Shutdown};
use post_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "post-gateway")]
#[command(about = "Read-only gateway for the upstream blog API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = load_or_default(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    logging::init_logging(&config.observability);
    tracing::info!("post-gateway v{} starting", env!("CARGO_PKG_VERSION"));

    let shutdown = Shutdown::new();
    signals::trigger_on_signal(shutdown.clone());

    startup::run(config, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
