//! Structured logging and the access log.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber
//! - Emit one access record per completed or failed session
//!
//! # Design Decisions
//! - Access records go to the dedicated `access` target so they can be
//!   filtered or routed independently of diagnostics
//! - Timestamps come from the fmt layer (RFC 3339)
//! - Recording never fails and never affects request handling

use http::{Method, StatusCode};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::FailureClass;

/// Initialize the tracing subscriber. `RUST_LOG` wins over the configured
/// default level.
pub fn init(default_level: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("tls_relay={default_level},access=info"))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// One line per completed session: method, path, resulting status.
pub fn access(method: &Method, path: &str, status: StatusCode) {
    tracing::info!(
        target: "access",
        method = %method,
        path = %path,
        status = status.as_u16(),
    );
}

/// One line per failed session: method, path, failure class, detail, and
/// the synthesized status when one was sent.
pub fn access_failure(
    method: &Method,
    path: &str,
    status: Option<StatusCode>,
    class: FailureClass,
    detail: &str,
) {
    match status {
        Some(status) => tracing::warn!(
            target: "access",
            method = %method,
            path = %path,
            status = status.as_u16(),
            error = %class,
            detail = %detail,
        ),
        None => tracing::warn!(
            target: "access",
            method = %method,
            path = %path,
            error = %class,
            detail = %detail,
        ),
    }
}
