//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::Response;
use axum::Router;
use tower::ServiceExt;

use accept_version::{reroute, Negotiation, NegotiationOptions, VersionDispatcher, VersionMap};

/// Body returned by the app's own fallback when the dispatcher passes through.
pub const NEXT_BODY: &str = "next handler";

/// Build an app with the dispatcher in front of a fallback that marks pass-through.
pub fn app(versions: VersionMap) -> Router {
    app_with(NegotiationOptions::default(), versions)
}

pub fn app_with(options: NegotiationOptions, versions: VersionMap) -> Router {
    let negotiation = Arc::new(Negotiation::configure(&options));
    let dispatcher = VersionDispatcher::new(negotiation, versions);
    Router::new()
        .fallback(|| async { (StatusCode::IM_A_TEAPOT, NEXT_BODY) })
        .layer(from_fn_with_state(dispatcher, reroute))
}

/// Build a request carrying the default vendor media type for `version`.
pub fn versioned(method: Method, uri: &str, version: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(version) = version {
        builder = builder.header(
            header::ACCEPT,
            format!("vnd.mycompany.com+json; version={version}"),
        );
    }
    builder.body(Body::empty()).unwrap()
}

/// Send a request through the app without a socket.
pub async fn send(app: &Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_text(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Send a request and return its status and body.
pub async fn call(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = send(app, request).await;
    let status = response.status();
    (status, body_text(response).await)
}
