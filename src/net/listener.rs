//! Socket binding for the relay listener.
//!
//! # Responsibilities
//! - Bind to the configured address
//! - Classify bind failures so a port conflict is diagnosed distinctly
//! - Hand the bound socket to the HTTP layer
//!
//! The accept loop and TLS handshakes themselves are driven by
//! `axum-server`, which takes ownership of the bound socket.

use std::net::SocketAddr;

use crate::config::ListenerConfig;

/// Error type for listener operations.
#[derive(Debug)]
pub enum BindError {
    /// The configured bind address is not a parseable socket address.
    InvalidAddress(String, std::net::AddrParseError),
    /// The address is already bound by another process.
    AddrInUse(SocketAddr),
    /// Any other bind failure.
    Io(std::io::Error),
}

impl std::fmt::Display for BindError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindError::InvalidAddress(addr, e) => {
                write!(f, "invalid bind address {:?}: {}", addr, e)
            }
            BindError::AddrInUse(addr) => write!(
                f,
                "address {} is already in use; free the port or change listener.bind_address",
                addr
            ),
            BindError::Io(e) => write!(f, "failed to bind: {}", e),
        }
    }
}

impl std::error::Error for BindError {}

/// A bound, not-yet-serving listening socket.
#[derive(Debug)]
pub struct Listener {
    inner: std::net::TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind to the configured address.
    ///
    /// "Address already in use" is reported as its own variant so the
    /// startup path can tell a port conflict apart from other failures.
    pub fn bind(config: &ListenerConfig) -> Result<Self, BindError> {
        let addr: SocketAddr = config
            .bind_address
            .parse()
            .map_err(|e| BindError::InvalidAddress(config.bind_address.clone(), e))?;

        let inner = std::net::TcpListener::bind(addr).map_err(|e| {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                BindError::AddrInUse(addr)
            } else {
                BindError::Io(e)
            }
        })?;

        // axum-server registers the socket with the tokio reactor.
        inner.set_nonblocking(true).map_err(BindError::Io)?;
        let local_addr = inner.local_addr().map_err(BindError::Io)?;

        tracing::info!(address = %local_addr, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    /// The local address this listener is bound to. With a port-zero bind
    /// this is the kernel-assigned address.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Surrender the underlying socket to the server.
    pub fn into_std(self) -> std::net::TcpListener {
        self.inner
    }
}
