//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy routes
//! - Wire up middleware (tracing, body limit, request ID)
//! - Serve HTTP/1.1 and HTTP/2 connections accepted by `net::Listener`
//! - Log response write failures per connection
//! - Drain connections on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, routing::any, Router};
use hyper_util::{
    rt::{TokioExecutor, TokioIo},
    server::conn::auto,
    service::TowerToHyperService,
};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::ProxyConfig;
use crate::http::proxy::{serve_proxy, ProxyHandler};
use crate::http::request::{mark_missing_request_id, MakeRequestUuid, X_REQUEST_ID};
use crate::net::{ConnectionGuard, ConnectionPermit, ConnectionTracker, Listener};
use crate::transform::{AccessTokenToIdToken, Identity};

/// HTTP server for the token proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server. `debug` enables backend response dumps.
    pub fn new(config: ProxyConfig, debug: bool) -> Self {
        let router = Self::build_router(&config, debug);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    ///
    /// `/token` mirrors the access token into `id_token`; `/introspection`
    /// is mounted only when an introspection endpoint is configured and
    /// relays bodies untouched.
    fn build_router(config: &ProxyConfig, debug: bool) -> Router {
        let backend_timeout = config.timeouts.backend();

        let token = ProxyHandler::new(
            "token",
            config.backend.token_endpoint.clone(),
            Arc::new(AccessTokenToIdToken),
        )
        .with_debug(debug)
        .with_backend_timeout(backend_timeout);

        let mut router =
            Router::new().route("/token", any(serve_proxy).with_state(Arc::new(token)));

        if let Some(endpoint) = &config.backend.introspection_endpoint {
            let introspection =
                ProxyHandler::new("introspection", endpoint.clone(), Arc::new(Identity))
                    .with_debug(debug)
                    .with_backend_timeout(backend_timeout);
            router = router.route(
                "/introspection",
                any(serve_proxy).with_state(Arc::new(introspection)),
            );
        }

        router
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::new(X_REQUEST_ID))
            .layer(SetRequestIdLayer::new(X_REQUEST_ID, MakeRequestUuid))
            .layer(middleware::map_request(mark_missing_request_id))
    }

    /// The assembled router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve connections from `listener` until `shutdown` fires, then drain.
    pub async fn run(
        self,
        listener: Listener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            token_endpoint = %self.config.backend.token_endpoint,
            introspection_endpoint = ?self.config.backend.introspection_endpoint,
            "HTTP server starting"
        );

        let tracker = ConnectionTracker::new();

        loop {
            let accepted = tokio::select! {
                accepted = listener.accept() => accepted,
                _ = shutdown.recv() => break,
            };

            let (stream, peer, permit) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    tokio::time::sleep(Duration::from_millis(50)).await;
                    continue;
                }
            };

            tokio::spawn(serve_connection(
                stream,
                peer,
                self.router.clone(),
                permit,
                tracker.track(),
                shutdown.resubscribe(),
            ));
        }

        // Stop accepting before draining.
        drop(listener);

        let deadline = self.config.timeouts.shutdown();
        tracing::info!(
            active_connections = tracker.active_count(),
            deadline_secs = deadline.as_secs(),
            "Draining connections"
        );
        if tokio::time::timeout(deadline, tracker.wait_for_idle()).await.is_err() {
            tracing::warn!(
                active_connections = tracker.active_count(),
                "Shutdown deadline reached with connections still open"
            );
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Router,
    _permit: ConnectionPermit,
    guard: ConnectionGuard,
    mut shutdown: broadcast::Receiver<()>,
) {
    let builder = auto::Builder::new(TokioExecutor::new());
    let conn = builder.serve_connection(TokioIo::new(stream), TowerToHyperService::new(router));
    tokio::pin!(conn);

    let result = tokio::select! {
        result = conn.as_mut() => result,
        _ = shutdown.recv() => {
            conn.as_mut().graceful_shutdown();
            conn.as_mut().await
        }
    };

    // The response may already be partially flushed, so a failure here can only be logged.
    if let Err(e) = result {
        tracing::warn!(
            connection_id = %guard.id(),
            peer_addr = %peer,
            error = %e,
            "Failure sending response to client"
        );
    }
}
