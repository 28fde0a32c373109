//! Demo API served by the `serve` command.
//!
//! Three versions exercise the interesting dispatch cases: v1 accepts
//! GET/PUT/POST on `/greeting`, v2 narrows it to GET and adds nested user
//! routes, v3 only adds `/status`.

use axum::http::Method;
use axum::Json;
use serde_json::{json, Value};

use crate::routing::{PathParams, VersionRouter};
use crate::versioning::{ResolvedVersion, VersionError, VersionMap};

async fn greeting(version: ResolvedVersion) -> Json<Value> {
    Json(json!({
        "message": "hello",
        "requested": version.requested,
        "version": version.resolved,
    }))
}

async fn user(version: ResolvedVersion, params: PathParams) -> Json<Value> {
    Json(json!({
        "id": params.get("id"),
        "version": version.resolved,
    }))
}

async fn status(version: ResolvedVersion) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": version.resolved,
    }))
}

/// Build the demo version map.
pub fn demo_versions() -> Result<VersionMap, VersionError> {
    let v1 = VersionRouter::new().route("/greeting", [Method::GET, Method::PUT, Method::POST], greeting);

    let v2 = VersionRouter::new()
        .get("/greeting", greeting)
        .nest("/users", VersionRouter::new().get("/:id", user));

    let v3 = VersionRouter::new().get("/status", status);

    VersionMap::try_from([(1, v1), (2, v2), (3, v3)])
}
