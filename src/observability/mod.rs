//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handlers and the server loop produce:
//!     → logging.rs (structured log events on stderr)
//!     → metrics.rs (request counters and latency histograms)
//!
//! Consumers:
//!     → Log aggregation (stderr)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached to every per-request event
//! - Metric macros are no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
