//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Bind → Load key material → Serve
//!
//! Shutdown:
//!     signals.rs (SIGTERM/SIGINT) → shutdown.rs (broadcast)
//!     → server drains in-flight sessions → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal, with a distinct diagnostic
//!   for "address already in use"
//! - Draining is bounded by a grace period; stragglers are cut off

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
