//! Version negotiation subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (headers, path, method)
//!     → Negotiation::version_token (header + pattern → numeric token)
//!     → dispatcher.rs (scan versions newest first, probe each router)
//!     → Dispatch(version) | Reject(status) | PassThrough
//!     → middleware.rs (run the router, answer the status, or call next)
//! ```
//!
//! # Design Decisions
//! - Highest version ≤ token with a matching route wins
//! - Tokens compare numerically, never lexically
//! - A matching route with no usable token is rejected, not passed through
//! - Dispatchers are immutable; reconfiguring means building a new one

pub mod dispatcher;
pub mod middleware;

pub use dispatcher::{Resolution, ResolvedVersion, VersionDispatcher, VersionError, VersionMap};
pub use middleware::reroute;
