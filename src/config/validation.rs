//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (addresses parse, ports valid)
//! - Check TLS paths are present when TLS is configured
//!
//! # Design Decisions
//! - Returns all validation errors, not just the first
//! - Validation is a pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system; file existence for
//!   key material is checked later, at load time

use std::net::SocketAddr;

use crate::config::schema::RelayConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug)]
pub enum ValidationError {
    /// `listener.bind_address` is not a parseable socket address.
    InvalidBindAddress(String),
    /// `upstream.host` is empty.
    EmptyUpstreamHost,
    /// `upstream.port` is zero.
    InvalidUpstreamPort,
    /// An `upstream` CLI override was not of the form `host:port`.
    InvalidUpstreamAddress(String),
    /// A TLS path field is configured but empty.
    EmptyTlsPath(&'static str),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::InvalidBindAddress(addr) => {
                write!(f, "listener.bind_address {:?} is not a valid socket address", addr)
            }
            ValidationError::EmptyUpstreamHost => write!(f, "upstream.host must not be empty"),
            ValidationError::InvalidUpstreamPort => write!(f, "upstream.port must not be zero"),
            ValidationError::InvalidUpstreamAddress(addr) => {
                write!(f, "upstream address {:?} is not of the form host:port", addr)
            }
            ValidationError::EmptyTlsPath(field) => {
                write!(f, "listener.tls.{} must not be empty", field)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate a configuration, collecting every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.upstream.host.is_empty() {
        errors.push(ValidationError::EmptyUpstreamHost);
    }
    if config.upstream.port == 0 {
        errors.push(ValidationError::InvalidUpstreamPort);
    }

    if let Some(tls) = &config.listener.tls {
        if tls.cert_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("cert_path"));
        }
        if tls.key_path.is_empty() {
            errors.push(ValidationError::EmptyTlsPath("key_path"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::TlsConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn collects_all_errors() {
        let mut config = RelayConfig::default();
        config.listener.bind_address = "not-an-address".into();
        config.upstream.host = String::new();
        config.upstream.port = 0;
        config.listener.tls = Some(TlsConfig {
            cert_path: String::new(),
            key_path: String::new(),
        });

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
    }
}
