//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (YAML/JSON/TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → handed by value to the HTTP server at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - Every section except the token endpoint has defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BackendConfig, LimitsConfig, ListenerConfig, ObservabilityConfig, ProxyConfig, TimeoutConfig,
};
pub use validation::{validate_config, ValidationError};
