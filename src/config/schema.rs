//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a relay
//! instance. All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for a relay instance.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (port, inbound deadline).
    pub listener: ListenerConfig,

    /// Hop forwarding settings (host pool, simulated work).
    pub hops: HopConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind on.
    pub bind_host: String,

    /// Port to listen on.
    pub port: u16,

    /// Per-request deadline on the inbound side in seconds (0 disables).
    pub request_timeout_secs: u64,
}

impl ListenerConfig {
    /// The `host:port` string handed to the TCP listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 10,
        }
    }
}

/// When the simulated work-load delay is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum WorkLoadMode {
    /// Sleep after every completed forward round-trip; the hops=0 leaf answers immediately.
    #[default]
    EveryHop,
    /// Sleep only on the hops=0 leaf.
    Terminal,
}

/// Hop forwarding configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct HopConfig {
    /// Candidate peers (`host:port`) a hop may be forwarded to.
    pub hosts: Vec<String>,

    /// Simulated work in milliseconds (0 disables).
    pub work_load_ms: u64,

    /// Where the simulated work is applied.
    pub work_load_mode: WorkLoadMode,

    /// Deadline for a single outbound forward in milliseconds (0 = unbounded).
    pub forward_timeout_ms: u64,
}

impl Default for HopConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["localhost:8080".to_string(), "localhost:8080".to_string()],
            work_load_ms: 0,
            work_load_mode: WorkLoadMode::default(),
            forward_timeout_ms: 0,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Prometheus exporter bind address; the exporter is off when unset.
    pub metrics_address: Option<String>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_address: None,
        }
    }
}
