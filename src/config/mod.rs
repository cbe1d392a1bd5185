//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RelayConfig (validated, immutable)
//!     → passed by value into the server at construction
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; sessions never observe mutation
//! - All fields have defaults so an empty config file works
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use schema::ListenerConfig;
pub use schema::RelayConfig;
pub use schema::TlsConfig;
pub use schema::UpstreamConfig;
