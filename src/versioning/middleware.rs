//! Axum middleware entry point for version dispatch.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};

use crate::versioning::dispatcher::VersionDispatcher;

/// Route the request to the newest compatible version, reject it with the
/// configured status, or pass it on to `next`.
///
/// Install with [`axum::middleware::from_fn_with_state`]:
///
/// ```ignore
/// let app = Router::new()
///     .fallback(not_found)
///     .layer(from_fn_with_state(dispatcher, reroute));
/// ```
pub async fn reroute(
    State(dispatcher): State<VersionDispatcher>,
    request: Request<Body>,
    next: Next,
) -> Response {
    dispatcher.handle(request, |request| next.run(request)).await
}
