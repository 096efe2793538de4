//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Bind the listener and begin accepting traffic
//! - Wire OS signals to graceful shutdown
//!
//! # Design Decisions
//! - Config is loaded and validated by the caller before anything starts
//! - Any startup error is fatal and returned to `main`

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::signals::shutdown_signal;
use crate::lifecycle::Shutdown;
use crate::net::{Listener, ListenerError};
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),

    #[error("failed to start metrics exporter: {0}")]
    Metrics(#[from] metrics::MetricsError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Run the proxy until a shutdown signal arrives.
pub async fn start(config: ProxyConfig, debug: bool) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config
            .observability
            .metrics_address
            .parse()
            .map_err(|_| StartupError::MetricsAddress(config.observability.metrics_address.clone()))?;
        metrics::init_metrics(addr)?;
    }

    let listener = Listener::bind(&config.listener).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on(shutdown_signal());

    let server = HttpServer::new(config, debug);
    server.run(listener, server_shutdown).await?;

    Ok(())
}
