//! Error taxonomy for the relay.
//!
//! Two tiers:
//! - Startup errors ([`StartupError`]) are fatal. The process cannot serve
//!   without a valid bind and key material, so these terminate it.
//! - Per-session failures ([`FailureClass`]) are isolated to one session.
//!   They are logged and, where HTTP still allows it, surfaced to the
//!   client as a synthesized `502`.

use thiserror::Error;

use crate::config::loader::ConfigError;
use crate::net::listener::BindError;
use crate::net::tls::CertificateError;

/// Fatal startup-class errors. Each variant maps to a distinct operator
/// diagnostic in `main`.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Bind(#[from] BindError),

    #[error(transparent)]
    Certificate(#[from] CertificateError),

    #[error("invalid upstream address: {0}")]
    UpstreamAddress(#[from] http::uri::InvalidUri),

    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Classification of per-session failures.
///
/// `UpstreamUnavailable` is the only class where the relay fabricates
/// response content; everything else can only be logged and aborted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Upstream connect was refused, unreachable, or timed out.
    UpstreamUnavailable,
    /// The upstream exchange failed before any response headers existed.
    UpstreamError,
    /// I/O failed after response headers had begun streaming to the client.
    MidStream,
    /// The client went away before the response completed.
    ClientAborted,
}

impl std::fmt::Display for FailureClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FailureClass::UpstreamUnavailable => "upstream_unavailable",
            FailureClass::UpstreamError => "upstream_error",
            FailureClass::MidStream => "mid_stream",
            FailureClass::ClientAborted => "client_aborted",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_classes_render_as_log_tokens() {
        assert_eq!(FailureClass::UpstreamUnavailable.to_string(), "upstream_unavailable");
        assert_eq!(FailureClass::MidStream.to_string(), "mid_stream");
        assert_eq!(FailureClass::ClientAborted.to_string(), "client_aborted");
    }

    #[test]
    fn startup_errors_preserve_bind_diagnostics() {
        let addr = "127.0.0.1:3000".parse().unwrap();
        let err = StartupError::from(BindError::AddrInUse(addr));
        assert!(err.to_string().contains("already in use"));
    }
}
