//! Version-specific routers.
//!
//! # Responsibilities
//! - Store an ordered list of layers (mounts, routes, fallbacks)
//! - Answer "does this router handle `path` + `method`?" without running anything
//! - Run the first matching handler when the router is dispatched to
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Layers are scanned in registration order, first match wins
//! - Fallback layers carry no route metadata, so probing never matches them
//! - Mounted routers are shared via Arc

use std::convert::Infallible;
use std::fmt;
use std::sync::Arc;

use axum::body::Body;
use axum::handler::Handler;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use tower::util::BoxCloneSyncService;
use tower::ServiceExt;

use crate::routing::matcher::{MethodSet, PathParams, PathPattern};

/// Type-erased request handler.
pub type RouteHandler = BoxCloneSyncService<Request<Body>, Response, Infallible>;

fn boxed<H, T>(handler: H) -> RouteHandler
where
    H: Handler<T, ()>,
    T: 'static,
{
    BoxCloneSyncService::new(handler.with_state(()))
}

/// Path left over once a mount prefix has been consumed.
fn remainder(path: &str, consumed: usize) -> &str {
    match &path[consumed..] {
        "" => "/",
        rest => rest,
    }
}

/// One node in a router's tree.
#[derive(Clone)]
pub enum Layer {
    /// A sub-router mounted under a path prefix.
    Mount {
        prefix: PathPattern,
        router: Arc<VersionRouter>,
    },
    /// A handler for one path and a set of methods.
    Route {
        path: PathPattern,
        methods: MethodSet,
        handler: RouteHandler,
    },
    /// A catch-all handler with no path or method metadata.
    Fallback { handler: RouteHandler },
}

impl Layer {
    /// Returns true if this layer, or anything mounted beneath it, has a
    /// route for `path` accepting `method`.
    pub fn matches(&self, path: &str, method: &str) -> bool {
        match self {
            Layer::Mount { prefix, router } => match prefix.match_prefix(path) {
                Some((consumed, _)) => router.route_exists(remainder(path, consumed), method),
                None => false,
            },
            Layer::Route {
                path: pattern,
                methods,
                ..
            } => methods.contains(method) && pattern.matches(path).is_some(),
            Layer::Fallback { .. } => false,
        }
    }
}

impl fmt::Debug for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layer::Mount { prefix, router } => f
                .debug_struct("Mount")
                .field("prefix", &prefix.as_str())
                .field("router", router)
                .finish(),
            Layer::Route { path, methods, .. } => f
                .debug_struct("Route")
                .field("path", &path.as_str())
                .field("methods", methods)
                .finish_non_exhaustive(),
            Layer::Fallback { .. } => f.debug_struct("Fallback").finish_non_exhaustive(),
        }
    }
}

/// The routes served by one API version.
///
/// ```ignore
/// let v2 = VersionRouter::new()
///     .get("/users/:id", get_user)
///     .nest("/admin", admin_routes);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VersionRouter {
    layers: Vec<Layer>,
}

impl VersionRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `path` and the given methods.
    pub fn route<H, T>(mut self, path: &str, methods: impl Into<MethodSet>, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.layers.push(Layer::Route {
            path: PathPattern::new(path),
            methods: methods.into(),
            handler: boxed(handler),
        });
        self
    }

    pub fn get<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(path, Method::GET, handler)
    }

    pub fn post<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(path, Method::POST, handler)
    }

    pub fn put<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(path, Method::PUT, handler)
    }

    pub fn patch<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(path, Method::PATCH, handler)
    }

    pub fn delete<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(path, Method::DELETE, handler)
    }

    /// Register `handler` for `path` under every method.
    pub fn any<H, T>(self, path: &str, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.route(path, MethodSet::All, handler)
    }

    /// Mount `router` beneath `prefix`.
    pub fn nest(mut self, prefix: &str, router: VersionRouter) -> Self {
        self.layers.push(Layer::Mount {
            prefix: PathPattern::new(prefix),
            router: Arc::new(router),
        });
        self
    }

    /// Add a catch-all layer. It handles whatever reaches it when the router
    /// runs, but is invisible to [`route_exists`](Self::route_exists).
    pub fn fallback<H, T>(mut self, handler: H) -> Self
    where
        H: Handler<T, ()>,
        T: 'static,
    {
        self.layers.push(Layer::Fallback {
            handler: boxed(handler),
        });
        self
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns true if some route in this router, at any mount depth,
    /// matches `path` and accepts `method`.
    pub fn route_exists(&self, path: &str, method: &str) -> bool {
        self.layers.iter().any(|layer| layer.matches(path, method))
    }

    /// Find the handler that would serve a request, along with the path
    /// parameters captured on the way down.
    pub fn handler_for(&self, path: &str, method: &str) -> Option<(&RouteHandler, PathParams)> {
        for layer in &self.layers {
            match layer {
                Layer::Mount { prefix, router } => {
                    let Some((consumed, mut params)) = prefix.match_prefix(path) else {
                        continue;
                    };
                    if let Some((handler, nested)) =
                        router.handler_for(remainder(path, consumed), method)
                    {
                        params.extend(nested);
                        return Some((handler, params));
                    }
                }
                Layer::Route {
                    path: pattern,
                    methods,
                    handler,
                } => {
                    if !methods.contains(method) {
                        continue;
                    }
                    if let Some(params) = pattern.matches(path) {
                        return Some((handler, params));
                    }
                }
                Layer::Fallback { handler } => return Some((handler, PathParams::default())),
            }
        }
        None
    }

    /// Run the request through this router.
    ///
    /// Captured path parameters are inserted into the request extensions as
    /// [`PathParams`]. Answers `404 Not Found` when nothing matches.
    pub async fn handle(&self, mut req: Request<Body>) -> Response {
        let found = self
            .handler_for(req.uri().path(), req.method().as_str())
            .map(|(handler, params)| (handler.clone(), params));

        let Some((handler, params)) = found else {
            return StatusCode::NOT_FOUND.into_response();
        };

        req.extensions_mut().insert(params);
        match handler.oneshot(req).await {
            Ok(response) => response,
            Err(never) => match never {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn ok() -> &'static str {
        "ok"
    }

    async fn echo_id(params: PathParams) -> String {
        params.get("id").unwrap_or("none").to_string()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn request(method: Method, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_route_exists_by_method() {
        let router = VersionRouter::new().get("/x", ok).put("/x", ok);

        assert!(router.route_exists("/x", "get"));
        assert!(router.route_exists("/x", "PUT"));
        assert!(!router.route_exists("/x", "post"));
        assert!(!router.route_exists("/y", "get"));
    }

    #[test]
    fn test_all_methods_route() {
        let router = VersionRouter::new().any("/x", ok);
        for method in ["get", "put", "post", "delete", "options"] {
            assert!(router.route_exists("/x", method), "{method} should match");
        }
    }

    #[test]
    fn test_nested_route_exists() {
        let sub = VersionRouter::new().get("/sub-route", ok);
        let router = VersionRouter::new().nest("/base-route", sub);

        assert!(router.route_exists("/base-route/sub-route", "get"));
        assert!(!router.route_exists("/base-route/other", "get"));
        assert!(!router.route_exists("/sub-route", "get"));
        assert!(!router.route_exists("/base-route/sub-route", "post"));
    }

    #[test]
    fn test_deeply_nested_route_exists() {
        let leaf = VersionRouter::new().get("/", ok).get("/:id", ok);
        let middle = VersionRouter::new().nest("/users", leaf);
        let router = VersionRouter::new().nest("/api", middle);

        assert!(router.route_exists("/api/users", "get"));
        assert!(router.route_exists("/api/users/", "get"));
        assert!(router.route_exists("/api/users/9", "get"));
        assert!(!router.route_exists("/api/users/9/posts", "get"));
    }

    #[test]
    fn test_fallback_is_not_a_route() {
        let router = VersionRouter::new().fallback(ok);
        assert!(!router.route_exists("/x", "get"));
        assert!(router.handler_for("/x", "get").is_some());
    }

    #[test]
    fn test_empty_router() {
        let router = VersionRouter::new();
        assert!(router.layers().is_empty());
        assert!(!router.route_exists("/", "get"));
    }

    #[test]
    fn test_handler_for_merges_params() {
        let users = VersionRouter::new().get("/users/:id", ok);
        let router = VersionRouter::new().nest("/tenants/:tenant", users);

        let (_, params) = router.handler_for("/tenants/acme/users/3", "GET").unwrap();
        assert_eq!(params.get("tenant"), Some("acme"));
        assert_eq!(params.get("id"), Some("3"));
    }

    #[tokio::test]
    async fn test_handle_runs_first_match() {
        let router = VersionRouter::new()
            .get("/x", || async { "first" })
            .get("/x", || async { "second" });

        let response = router.handle(request(Method::GET, "/x")).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_text(response).await, "first");
    }

    #[tokio::test]
    async fn test_handle_exposes_params() {
        let router = VersionRouter::new().nest("/users", VersionRouter::new().get("/:id", echo_id));

        let response = router.handle(request(Method::GET, "/users/17")).await;
        assert_eq!(body_text(response).await, "17");
    }

    #[tokio::test]
    async fn test_handle_without_match_is_not_found() {
        let router = VersionRouter::new().get("/x", ok);
        let response = router.handle(request(Method::DELETE, "/x")).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
