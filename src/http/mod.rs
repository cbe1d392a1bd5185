//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection (decrypted by axum-server)
//!     → server.rs (router, middleware, per-connection tasks)
//!     → request.rs (attach request ID)
//!     → forward.rs (stream request upstream, relay response verbatim)
//!     → body.rs (pass response body through, settle session outcome)
//!     → Send to client
//! ```

pub mod body;
pub mod forward;
pub mod request;
pub mod server;

pub use forward::FALLBACK_BODY;
pub use request::{RequestId, RequestIdLayer};
pub use server::RelayServer;
