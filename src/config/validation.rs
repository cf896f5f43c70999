//! Configuration validation.
//!
//! Serde handles the syntax; this module checks the values. Every problem is
//! reported, not just the first one.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RelayConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener port must be non-zero")]
    ZeroPort,

    #[error("host pool is empty")]
    EmptyHostPool,

    #[error("invalid host entry '{0}', expected host:port")]
    InvalidHost(String),

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),
}

/// Check a configuration, returning every validation error found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.port == 0 {
        errors.push(ValidationError::ZeroPort);
    }

    if config.hops.hosts.is_empty() {
        errors.push(ValidationError::EmptyHostPool);
    }

    for host in &config.hops.hosts {
        if !is_host_port(host) {
            errors.push(ValidationError::InvalidHost(host.clone()));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if let Some(addr) = &config.observability.metrics_address {
        if addr.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidMetricsAddress(addr.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// `host:port` with a non-empty host and a numeric port.
fn is_host_port(entry: &str) -> bool {
    match entry.rsplit_once(':') {
        Some((host, port)) => {
            !host.is_empty() && !host.contains('/') && port.parse::<u16>().is_ok()
        }
        None => false,
    }
}
