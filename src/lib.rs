//! Synthetic multi-hop load generator.
//!
//! Each instance answers `GET /?hops=N`. With `N > 0` it forwards
//! `hops=N-1` to a random peer from its host pool and relays the answer;
//! with `N == 0` it answers `Done`.

pub mod config;
pub mod hop;
pub mod http;
pub mod lifecycle;
pub mod observability;

pub use config::RelayConfig;
pub use http::HopServer;
pub use lifecycle::Shutdown;
