//! Configuration loading from disk and the command line.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::{RelayConfig, WorkLoadMode};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Command-line settings layered over the file (or default) configuration.
///
/// Anything left unset keeps the underlying value. Hosts given here replace
/// the configured pool rather than extending it.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigOverrides {
    /// Optional TOML configuration file.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// The port to listen on for this instance.
    #[arg(long = "listen-on", value_name = "PORT")]
    pub listen_on: Option<u16>,

    /// Time in milliseconds spent simulating work.
    #[arg(long = "work-load", value_name = "MS")]
    pub work_load: Option<u64>,

    /// Where the simulated work is applied.
    #[arg(long = "work-load-mode", value_enum)]
    pub work_load_mode: Option<WorkLoadMode>,

    /// Add a host to the pool of hosts to hop to (e.g. localhost:8080). Repeatable.
    #[arg(long = "add-host", value_name = "HOST:PORT")]
    pub add_host: Vec<String>,

    /// Deadline for each outbound forward in milliseconds (0 = unbounded).
    #[arg(long = "forward-timeout", value_name = "MS")]
    pub forward_timeout: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "log-level")]
    pub log_level: Option<String>,

    /// Expose Prometheus metrics on this address.
    #[arg(long = "metrics-address", value_name = "ADDR")]
    pub metrics_address: Option<String>,
}

impl ConfigOverrides {
    /// Apply every set field onto `config`.
    pub fn apply(&self, config: &mut RelayConfig) {
        if let Some(port) = self.listen_on {
            config.listener.port = port;
        }
        if let Some(ms) = self.work_load {
            config.hops.work_load_ms = ms;
        }
        if let Some(mode) = self.work_load_mode {
            config.hops.work_load_mode = mode;
        }
        if !self.add_host.is_empty() {
            config.hops.hosts = self.add_host.clone();
        }
        if let Some(ms) = self.forward_timeout {
            config.hops.forward_timeout_ms = ms;
        }
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
        if let Some(addr) = &self.metrics_address {
            config.observability.metrics_address = Some(addr.clone());
        }
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let config = read_config(path)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Build the effective configuration: file (if any), then overrides, then validation.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<RelayConfig, ConfigError> {
    let mut config = match &overrides.config {
        Some(path) => read_config(path)?,
        None => RelayConfig::default(),
    };

    overrides.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn read_config(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_file() {
        let file = write_config(
            r#"
            [listener]
            port = 9001

            [hops]
            hosts = ["a:1", "b:2"]
            work_load_ms = 25
            "#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.listener.port, 9001);
        assert_eq!(config.hops.hosts, vec!["a:1", "b:2"]);
        assert_eq!(config.hops.work_load_ms, 25);
    }

    #[test]
    fn test_load_config_rejects_invalid() {
        let file = write_config("[hops]\nhosts = []\n");
        match load_config(file.path()) {
            Err(ConfigError::Validation(errors)) => {
                assert_eq!(errors, vec![ValidationError::EmptyHostPool]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_config_parse_error() {
        let file = write_config("[listener\nport = 1");
        assert!(matches!(load_config(file.path()), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let overrides = ConfigOverrides {
            config: Some(PathBuf::from("/definitely/not/here.toml")),
            ..Default::default()
        };
        assert!(matches!(resolve_config(&overrides), Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_overrides_replace_host_pool() {
        let file = write_config("[hops]\nhosts = [\"a:1\"]\nwork_load_ms = 5\n");
        let overrides = ConfigOverrides {
            config: Some(file.path().to_path_buf()),
            listen_on: Some(9100),
            add_host: vec!["b:2".into(), "c:3".into()],
            work_load_mode: Some(WorkLoadMode::Terminal),
            ..Default::default()
        };

        let config = resolve_config(&overrides).unwrap();
        assert_eq!(config.listener.port, 9100);
        assert_eq!(config.hops.hosts, vec!["b:2", "c:3"]);
        assert_eq!(config.hops.work_load_ms, 5);
        assert_eq!(config.hops.work_load_mode, WorkLoadMode::Terminal);
    }

    #[test]
    fn test_no_overrides_uses_defaults() {
        let config = resolve_config(&ConfigOverrides::default()).unwrap();
        assert_eq!(config.hops.hosts, vec!["localhost:8080", "localhost:8080"]);
    }
}
