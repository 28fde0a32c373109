//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Route registration (at startup):
//!     VersionRouter::new().get(..).nest(..)
//!     → router.rs (ordered layers)
//!     → matcher.rs (compiled path patterns, method sets)
//!     → Frozen inside a VersionMap
//!
//! Per request:
//!     route_exists(path, method) → probe only, nothing runs
//!     handle(request)            → first matching handler runs
//! ```
//!
//! # Design Decisions
//! - Routers are immutable once registered
//! - No regex in the hot path (segment matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)

pub mod matcher;
pub mod router;

pub use matcher::{MethodSet, PathParams, PathPattern};
pub use router::{Layer, RouteHandler, VersionRouter};
