//! OAuth token endpoint proxy library.
//!
//! Forwards POSTs to an authorization server's token (and optionally
//! introspection) endpoint and relays the answer, rewriting successful token
//! responses so `id_token` mirrors `access_token`.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod transform;

pub use config::schema::ProxyConfig;
pub use http::{HttpServer, ProxyHandler};
pub use lifecycle::Shutdown;
pub use transform::{AccessTokenToIdToken, BodyTransformer, Identity, TokenResponse};
