//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse, deserialize, semantic checks)
//!     → ServiceConfig (validated, immutable)
//!     → handed to subsystems at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults so the service runs with no config file

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ExporterConfig, ListenerConfig, ObservabilityConfig, ServiceConfig, TimeoutConfig,
};
