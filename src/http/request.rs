//! Request identification.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the caller did not send one
//! - Echo the ID on the response
//! - Expose the ID to handlers for structured logs
//!
//! # Design Decisions
//! - Request ID added as early as possible (outermost layer)
//! - A caller-supplied `x-request-id` is kept and forwarded to the backend
//! - A generated ID stays local: the backend only sees headers the caller sent

use axum::{
    extract::Request as AxumRequest,
    http::{HeaderMap, HeaderName, HeaderValue, Request},
};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Generates UUID v4 request IDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// Extension marking a request whose `x-request-id` was generated here.
#[derive(Debug, Clone, Copy)]
pub struct GeneratedRequestId;

/// Runs ahead of ID generation and tags requests the caller sent without an ID.
pub async fn mark_missing_request_id(mut request: AxumRequest) -> AxumRequest {
    if !request.headers().contains_key(X_REQUEST_ID) {
        request.extensions_mut().insert(GeneratedRequestId);
    }
    request
}

/// The request ID carried in `headers`, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}
