//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI overrides (--listen-on, --work-load, --add-host, ...)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → handed by value to the HTTP server at startup
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no ambient global state
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, resolve_config, ConfigError, ConfigOverrides};
pub use schema::{HopConfig, ListenerConfig, ObservabilityConfig, RelayConfig, WorkLoadMode};
pub use validation::ValidationError;
