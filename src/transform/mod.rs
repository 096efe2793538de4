//! Response body transformation.
//!
//! A [`BodyTransformer`] rewrites a successful backend response body before
//! it is relayed to the caller. Implementations must preserve every field
//! they do not explicitly target and must fail rather than emit a partial
//! body when the input cannot be parsed.
//!
//! # Variants
//! - [`Identity`]: relays the body untouched (introspection route)
//! - [`AccessTokenToIdToken`]: mirrors `access_token` into `id_token`

pub mod token;

use bytes::Bytes;
use thiserror::Error;

pub use token::{AccessTokenToIdToken, TokenResponse};

/// Error produced when a body cannot be transformed.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rewrites a backend response body.
pub trait BodyTransformer: Send + Sync + std::fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Produce the body to relay, or fail without producing anything.
    fn transform(&self, body: Bytes) -> Result<Bytes, TransformError>;
}

/// Passes the body through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl BodyTransformer for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn transform(&self, body: Bytes) -> Result<Bytes, TransformError> {
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_returns_input() {
        let body = Bytes::from_static(b"not even json {");
        assert_eq!(Identity.transform(body.clone()).unwrap(), body);
    }
}
