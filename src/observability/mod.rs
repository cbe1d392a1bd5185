//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured diagnostics + per-session access records)
//!
//! Consumers:
//!     → stdout, filtered via RUST_LOG / configured level
//! ```

pub mod logging;
