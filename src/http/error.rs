//! Handler errors and their HTTP mapping.
//!
//! Every failure is terminal for the request it occurred in. Backend
//! non-success responses are not errors; they are relayed as-is.

use std::time::Duration;

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::transform::TransformError;

#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Invalid request method")]
    MethodNotAllowed,

    #[error("Error reading request body: {0}")]
    RequestBody(#[source] axum::Error),

    #[error("Error creating outbound request: {0}")]
    OutboundRequest(String),

    #[error("Error connecting to backend: {0}")]
    Backend(#[source] reqwest::Error),

    #[error("Error connecting to backend: backend did not respond within {}s", .0.as_secs())]
    BackendTimeout(Duration),

    #[error("Error reading response from backend: {0}")]
    BackendBody(#[source] reqwest::Error),

    #[error("Error processing response body transformer: {0}")]
    Transform(#[from] TransformError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            self.status(),
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("{}\n", self),
        )
            .into_response()
    }
}
