//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks, strict mode only)
//!     → AppConfig
//!     → negotiation.rs compiles NegotiationOptions into Negotiation
//!     → shared via Arc with the version dispatcher
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Lenient by default: bad negotiation fields fall back to defaults with a warning
//! - Strict mode turns the same problems into load errors

pub mod loader;
pub mod negotiation;
pub mod schema;
pub mod validation;

pub use negotiation::Negotiation;
pub use schema::AppConfig;
pub use schema::NegotiationOptions;
pub use schema::ObservabilityConfig;
pub use schema::ServerConfig;
