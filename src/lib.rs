//! Header-negotiated API versioning for Axum.
//!
//! Requests carry a version token in a header (by default a vendor media
//! type in `Accept`). The [`reroute`] middleware sends each request to the
//! newest registered [`VersionRouter`] that is no newer than the requested
//! version and actually has a route for the request's path and method.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod versioning;

pub use config::{AppConfig, Negotiation, NegotiationOptions};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use routing::{MethodSet, PathParams, VersionRouter};
pub use versioning::{reroute, Resolution, ResolvedVersion, VersionDispatcher, VersionMap};
