//! TLS-terminating relay library.
//!
//! Accepts encrypted client connections, decrypts them, and forwards each
//! request verbatim to a single fixed plaintext HTTP upstream, streaming
//! the response back unmodified.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::RelayConfig;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
