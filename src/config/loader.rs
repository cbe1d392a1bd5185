//! Configuration loading and CLI-override merging.
//!
//! The file (or the built-in defaults when no file is given) and the
//! command-line overrides are merged first, then validated as a whole,
//! so an override cannot sneak an invalid value past the loader.

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::schema::RelayConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    /// Replaces `listener.bind_address`.
    pub bind_address: Option<String>,
    /// Replaces the upstream target, as `host:port`.
    pub upstream: Option<String>,
}

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path.display(), source)
            }
            ConfigError::Parse { path, source } => {
                write!(f, "failed to parse {}: {}", path.display(), source)
            }
            ConfigError::Validation(errors) => {
                write!(f, "validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load the TOML config file (or defaults when `path` is `None`), apply
/// overrides, and validate the merged result.
pub fn load_config(path: Option<&Path>, overrides: Overrides) -> Result<RelayConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => RelayConfig::default(),
    };

    if let Some(bind) = overrides.bind_address {
        config.listener.bind_address = bind;
    }
    if let Some(upstream) = overrides.upstream {
        match parse_upstream(&upstream) {
            Some((host, port)) => {
                config.upstream.host = host;
                config.upstream.port = port;
            }
            None => {
                return Err(ConfigError::Validation(vec![
                    ValidationError::InvalidUpstreamAddress(upstream),
                ]))
            }
        }
    }

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

fn read_file(path: &Path) -> Result<RelayConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Split a `host:port` override. The right-most colon wins so bracketed
/// IPv6 hosts (`[::1]:8000`) survive.
fn parse_upstream(s: &str) -> Option<(String, u16)> {
    let (host, port) = s.rsplit_once(':')?;
    if host.is_empty() {
        return None;
    }
    Some((host.to_string(), port.parse().ok()?))
}
