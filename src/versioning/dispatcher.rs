//! Version resolution and dispatch.
//!
//! The dispatcher walks registered versions from newest to oldest and picks
//! the first one that both handles the request's path/method and is not newer
//! than the version the client asked for.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::config::Negotiation;
use crate::observability::metrics;
use crate::routing::VersionRouter;

/// Errors raised while registering versions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("version 0 is not a valid version")]
    ZeroVersion,

    #[error("version {0} is already registered")]
    DuplicateVersion(u32),
}

/// Routers keyed by the API version they serve.
#[derive(Debug, Clone, Default)]
pub struct VersionMap {
    routers: BTreeMap<u32, Arc<VersionRouter>>,
}

impl VersionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `router` as the routes for `version`.
    pub fn register(&mut self, version: u32, router: VersionRouter) -> Result<(), VersionError> {
        if version == 0 {
            return Err(VersionError::ZeroVersion);
        }
        if self.routers.contains_key(&version) {
            return Err(VersionError::DuplicateVersion(version));
        }
        self.routers.insert(version, Arc::new(router));
        Ok(())
    }

    pub fn with(mut self, version: u32, router: VersionRouter) -> Result<Self, VersionError> {
        self.register(version, router)?;
        Ok(self)
    }

    pub fn get(&self, version: u32) -> Option<&VersionRouter> {
        self.routers.get(&version).map(Arc::as_ref)
    }

    /// Registered versions, newest first.
    pub fn descending(&self) -> impl Iterator<Item = (u32, &VersionRouter)> {
        self.routers
            .iter()
            .rev()
            .map(|(version, router)| (*version, router.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.routers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routers.is_empty()
    }
}

impl<const N: usize> TryFrom<[(u32, VersionRouter); N]> for VersionMap {
    type Error = VersionError;

    fn try_from(entries: [(u32, VersionRouter); N]) -> Result<Self, Self::Error> {
        entries
            .into_iter()
            .try_fold(VersionMap::new(), |map, (version, router)| map.with(version, router))
    }
}

/// What the dispatcher decided to do with a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Run the router registered for `version`.
    Dispatch { version: u32, requested: u64 },
    /// A route exists but no version satisfies the request.
    Reject(StatusCode),
    /// No version has a route for this path and method.
    PassThrough,
}

impl Resolution {
    fn outcome(&self) -> &'static str {
        match self {
            Resolution::Dispatch { .. } => "dispatch",
            Resolution::Reject(_) => "reject",
            Resolution::PassThrough => "pass_through",
        }
    }
}

/// The version selected for a dispatched request, available to handlers as
/// a request extension or extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVersion {
    /// Version token sent by the client.
    pub requested: u64,
    /// Version whose router is handling the request.
    pub resolved: u32,
}

impl<S: Send + Sync> FromRequestParts<S> for ResolvedVersion {
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ResolvedVersion>()
            .copied()
            .ok_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

/// Routes requests to the newest compatible version.
///
/// Cheap to clone and safe to share across tasks: it holds only immutable,
/// reference-counted state.
#[derive(Debug, Clone)]
pub struct VersionDispatcher {
    negotiation: Arc<Negotiation>,
    versions: Arc<VersionMap>,
}

impl VersionDispatcher {
    pub fn new(negotiation: Arc<Negotiation>, versions: VersionMap) -> Self {
        tracing::debug!(
            header = %negotiation.header(),
            versions = ?versions.routers.keys().collect::<Vec<_>>(),
            "Version dispatcher created"
        );
        Self {
            negotiation,
            versions: Arc::new(versions),
        }
    }

    pub fn negotiation(&self) -> &Negotiation {
        &self.negotiation
    }

    pub fn versions(&self) -> &VersionMap {
        &self.versions
    }

    /// Decide how to serve a request without running anything.
    pub fn resolve<B>(&self, req: &Request<B>) -> Resolution {
        self.resolve_parts(req.headers(), req.uri().path(), req.method().as_str())
    }

    pub fn resolve_parts(&self, headers: &HeaderMap, path: &str, method: &str) -> Resolution {
        let token = self.negotiation.version_token(headers);
        self.select(token, path, method).resolution()
    }

    fn select(&self, token: Option<u64>, path: &str, method: &str) -> Selection<'_> {
        let mut any_route_matched_path = false;

        for (version, router) in self.versions.descending() {
            if !router.route_exists(path, method) {
                continue;
            }
            any_route_matched_path = true;

            if let Some(requested) = token {
                if requested >= u64::from(version) {
                    return Selection::Dispatch {
                        version,
                        requested,
                        router,
                    };
                }
            }
        }

        if any_route_matched_path {
            Selection::Reject(self.negotiation.error())
        } else {
            Selection::PassThrough
        }
    }

    /// Serve a request: run the selected version's router, answer with the
    /// configured error status, or hand the request to `next`.
    ///
    /// Exactly one of the three happens.
    pub async fn handle<F, Fut>(&self, mut req: Request<Body>, next: F) -> Response
    where
        F: FnOnce(Request<Body>) -> Fut,
        Fut: Future<Output = Response>,
    {
        let token = self.negotiation.version_token(req.headers());
        let selection = self.select(token, req.uri().path(), req.method().as_str());
        let resolution = selection.resolution();

        tracing::debug!(
            method = %req.method(),
            path = %req.uri().path(),
            requested = ?token,
            resolution = ?resolution,
            "Version resolved"
        );

        match selection {
            Selection::Dispatch {
                version,
                requested,
                router,
            } => {
                metrics::record_decision(resolution.outcome(), Some(version));
                req.extensions_mut().insert(ResolvedVersion {
                    requested,
                    resolved: version,
                });
                router.handle(req).await
            }
            Selection::Reject(status) => {
                metrics::record_decision(resolution.outcome(), None);
                status.into_response()
            }
            Selection::PassThrough => {
                metrics::record_decision(resolution.outcome(), None);
                next(req).await
            }
        }
    }
}

/// A [`Resolution`] that still holds the chosen router.
enum Selection<'a> {
    Dispatch {
        version: u32,
        requested: u64,
        router: &'a VersionRouter,
    },
    Reject(StatusCode),
    PassThrough,
}

impl Selection<'_> {
    fn resolution(&self) -> Resolution {
        match self {
            Selection::Dispatch {
                version, requested, ..
            } => Resolution::Dispatch {
                version: *version,
                requested: *requested,
            },
            Selection::Reject(status) => Resolution::Reject(*status),
            Selection::PassThrough => Resolution::PassThrough,
        }
    }
}
