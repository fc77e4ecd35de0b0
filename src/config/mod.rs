//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → consumed once while the gateway is being configured
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the gateway starts; there is no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use schema::{
    BackendConfig, GatewayConfig, HandlerConfig, ListenerConfig, ObservabilityConfig, TlsConfig,
};
pub use validation::ValidationError;
