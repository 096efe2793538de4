//! OAuth token endpoint proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────┐
//!                          │                 TOKEN PROXY                   │
//!     POST /token          │  ┌─────────┐   ┌─────────┐   ┌────────────┐   │
//!     ─────────────────────┼─▶│   net   │──▶│  http   │──▶│   proxy    │───┼──▶ Authorization
//!                          │  │listener │   │ server  │   │  handler   │   │     server
//!                          │  └─────────┘   └─────────┘   └─────┬──────┘   │
//!                          │                                    │ 2xx      │
//!                          │                                    ▼          │
//!     Response             │                             ┌────────────┐    │
//!     ◀────────────────────┼─────────────────────────────│ transform  │    │
//!                          │                             └────────────┘    │
//!                          │  config · lifecycle · observability           │
//!                          └──────────────────────────────────────────────┘
//! ```
//!
//! Configuration is read from `config.yaml` in the working directory, or from
//! the path in `TOKEN_PROXY_CONFIG`.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use token_proxy::config::load_config;
use token_proxy::lifecycle;
use token_proxy::observability::logging;

const CONFIG_ENV: &str = "TOKEN_PROXY_CONFIG";
const DEFAULT_CONFIG: &str = "config.yaml";

#[derive(Parser)]
#[command(name = "token-proxy")]
#[command(about = "Reverse proxy for OAuth token and introspection endpoints", long_about = None)]
struct Cli {
    /// Enable debug
    #[arg(short = 'd')]
    debug: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let path = std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG));

    let config = match load_config(&path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("failed to load configuration from {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    logging::init_logging(&config.observability.log_level, cli.debug);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = %path.display(),
        debug = cli.debug,
        port = config.listener.port,
        "token-proxy starting"
    );
    if cli.debug {
        tracing::info!("Debug enabled");
    }

    match lifecycle::start(config, cli.debug).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Fatal error");
            ExitCode::FAILURE
        }
    }
}
