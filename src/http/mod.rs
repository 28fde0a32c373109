//! HTTP server wiring.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → versioning::reroute middleware
//!         → versioned router (handlers.rs demo API) | error status | next
//!     → fallback 404 for paths no version knows
//! ```

pub mod handlers;
pub mod server;

pub use server::HttpServer;
