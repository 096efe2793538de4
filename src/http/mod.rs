//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (net::Listener)
//!     → server.rs (hyper-util connection, Axum router, middleware)
//!     → request.rs (request ID)
//!     → proxy.rs (forward to backend, branch on status, transform)
//!     → error.rs (failures mapped to 405/500)
//!     → Send to client
//! ```

pub mod error;
pub mod proxy;
pub mod request;
pub mod server;

pub use error::ProxyError;
pub use proxy::ProxyHandler;
pub use request::{GeneratedRequestId, MakeRequestUuid, X_REQUEST_ID};
pub use server::HttpServer;
