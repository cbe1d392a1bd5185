//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (bind, port-conflict classification)
//!     → tls.rs (key material loading; handshakes run in axum-server)
//!     → session.rs (per-request lifecycle, state machine)
//!     → Hand off to HTTP layer
//!
//! Session states:
//!     Accepted → HandshakeDone → Forwarding → Completed | Failed
//! ```
//!
//! # Design Decisions
//! - Key material is validated at startup, not at first handshake
//! - A failed handshake drops that connection only
//! - Sessions are fully independent and share no mutable state

pub mod listener;
pub mod session;
pub mod tls;
