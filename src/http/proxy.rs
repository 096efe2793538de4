//! The forwarding-and-transformation pipeline.
//!
//! # Data Flow
//! ```text
//! inbound POST
//!     → method check (405 otherwise, backend untouched)
//!     → buffer body
//!     → POST to backend with all caller-sent headers
//!     → buffer backend body
//!     → non-2xx: relay status + body verbatim
//!     → 2xx: optional debug dump → transformer → relay
//! ```
//!
//! # Design Decisions
//! - One fresh outbound client per call; nothing is shared between requests
//! - No retries: every failure is terminal for its request
//! - The backend response is owned by a single scope and dropped on every
//!   exit path, so its connection is always released

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use url::Url;

use crate::http::error::ProxyError;
use crate::http::request::{request_id, GeneratedRequestId, X_REQUEST_ID};
use crate::observability::logging::BACKEND_DUMP_TARGET;
use crate::observability::metrics;
use crate::transform::BodyTransformer;

/// Proxies POST requests for one route to one backend endpoint.
#[derive(Debug)]
pub struct ProxyHandler {
    route: &'static str,
    backend_url: String,
    transformer: Arc<dyn BodyTransformer>,
    debug: bool,
    backend_timeout: Option<Duration>,
}

/// A fully buffered backend response.
struct BackendResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ProxyHandler {
    /// Create a handler for `route` forwarding to `backend_url`.
    ///
    /// The URL is parsed per request; a malformed one yields a 500 for each
    /// request rather than failing construction.
    pub fn new(
        route: &'static str,
        backend_url: impl Into<String>,
        transformer: Arc<dyn BodyTransformer>,
    ) -> Self {
        Self {
            route,
            backend_url: backend_url.into(),
            transformer,
            debug: false,
            backend_timeout: None,
        }
    }

    /// Dump backend headers and body for successful responses.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Bound the backend round trip. `None` waits indefinitely.
    pub fn with_backend_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.backend_timeout = timeout;
        self
    }

    /// Handle one inbound exchange.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let start_time = Instant::now();
        let request_id = request_id(request.headers()).to_string();

        tracing::debug!(
            request_id = %request_id,
            route = self.route,
            method = %request.method(),
            "Proxying request"
        );

        let response = match self.forward(request).await {
            Ok(response) => response,
            Err(e) => {
                if e.status().is_client_error() {
                    tracing::warn!(request_id = %request_id, route = self.route, error = %e, "Request rejected");
                } else {
                    tracing::error!(request_id = %request_id, route = self.route, error = %e, "Proxy failure");
                }
                e.into_response()
            }
        };

        metrics::record_request(self.route, response.status().as_u16(), start_time);
        response
    }

    async fn forward(&self, request: Request<Body>) -> Result<Response, ProxyError> {
        if request.method() != Method::POST {
            return Err(ProxyError::MethodNotAllowed);
        }

        let (parts, body) = request.into_parts();
        let body = axum::body::to_bytes(body, usize::MAX)
            .await
            .map_err(ProxyError::RequestBody)?;

        let local_request_id = parts.extensions.get::<GeneratedRequestId>().is_some();
        let backend = self.exchange(&parts.headers, local_request_id, body).await?;

        if !backend.status.is_success() {
            tracing::info!(
                route = self.route,
                status = %backend.status,
                "Backend returned a non-success response, relaying unchanged"
            );
            let content_type = backend.headers.get(header::CONTENT_TYPE).cloned();
            return Ok(build_response(backend.status, content_type, backend.body));
        }

        if self.debug {
            dump_backend_response(&backend.headers, &backend.body);
        }

        let body = self.transformer.transform(backend.body)?;

        let content_type = backend
            .headers
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static(""));
        Ok(build_response(backend.status, Some(content_type), body))
    }

    /// Send the outbound request and buffer the full response.
    async fn exchange(
        &self,
        headers: &HeaderMap,
        local_request_id: bool,
        body: Bytes,
    ) -> Result<BackendResponse, ProxyError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| ProxyError::OutboundRequest(e.to_string()))?;
        let outbound = self.build_outbound(&client, headers, local_request_id, body)?;

        let round_trip = async {
            let response = client.execute(outbound).await.map_err(ProxyError::Backend)?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(ProxyError::BackendBody)?;
            Ok::<_, ProxyError>(BackendResponse { status, headers, body })
        };

        match self.backend_timeout {
            Some(limit) => tokio::time::timeout(limit, round_trip)
                .await
                .map_err(|_| ProxyError::BackendTimeout(limit))?,
            None => round_trip.await,
        }
    }

    fn build_outbound(
        &self,
        client: &reqwest::Client,
        headers: &HeaderMap,
        local_request_id: bool,
        body: Bytes,
    ) -> Result<reqwest::Request, ProxyError> {
        let url = Url::parse(&self.backend_url)
            .map_err(|e| ProxyError::OutboundRequest(format!("{}: {}", self.backend_url, e)))?;

        // Host must come from the backend URL, everything else the caller sent goes through as sent.
        let mut forwarded = HeaderMap::with_capacity(headers.len());
        for (name, value) in headers {
            if *name == header::HOST || (local_request_id && *name == X_REQUEST_ID) {
                continue;
            }
            forwarded.append(name.clone(), value.clone());
        }

        client
            .post(url)
            .headers(forwarded)
            .body(body)
            .build()
            .map_err(|e| ProxyError::OutboundRequest(e.to_string()))
    }
}

/// Axum entry point; the handler is bound per route as state.
pub async fn serve_proxy(
    State(handler): State<Arc<ProxyHandler>>,
    request: Request<Body>,
) -> Response {
    handler.handle(request).await
}

fn build_response(status: StatusCode, content_type: Option<HeaderValue>, body: Bytes) -> Response {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    if let Some(content_type) = content_type {
        response.headers_mut().insert(header::CONTENT_TYPE, content_type);
    }
    response
}

fn dump_backend_response(headers: &HeaderMap, body: &[u8]) {
    tracing::info!(target: BACKEND_DUMP_TARGET, "Debug enabled. Dumping response from backend");
    for name in headers.keys() {
        let values = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect::<Vec<_>>()
            .join(",");
        tracing::info!(target: BACKEND_DUMP_TARGET, "{}: {}", name, values);
    }
    tracing::info!(
        target: BACKEND_DUMP_TARGET,
        body = %String::from_utf8_lossy(body),
        "Backend response body"
    );
}
