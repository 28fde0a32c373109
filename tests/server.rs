//! Live-socket tests for the demo server.

use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::Value;

use accept_version::config::loader::parse_config;
use accept_version::http::handlers::demo_versions;
use accept_version::{AppConfig, HttpServer, Shutdown};

const V: &str = "vnd.mycompany.com+json; version=";

async fn start(config: AppConfig) -> (SocketAddr, Shutdown) {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config, demo_versions().unwrap());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    (addr, shutdown)
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_demo_api_over_http() {
    let (addr, shutdown) = start(AppConfig::default()).await;
    let client = client();

    let res = client
        .get(format!("http://{addr}/greeting"))
        .header("accept", format!("{V}3"))
        .send()
        .await
        .expect("Server unreachable");
    assert_eq!(res.status(), 200);
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["version"], 2);
    assert_eq!(json["requested"], 3);

    let res = client
        .post(format!("http://{addr}/greeting"))
        .header("accept", format!("{V}2"))
        .send()
        .await
        .unwrap();
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["version"], 1);

    let res = client
        .get(format!("http://{addr}/users/42"))
        .header("accept", format!("{V}2"))
        .send()
        .await
        .unwrap();
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["id"], "42");

    let res = client
        .get(format!("http://{addr}/status"))
        .header("accept", format!("{V}2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_ACCEPTABLE.as_u16());
    assert!(res.text().await.unwrap().is_empty());

    let res = client
        .get(format!("http://{addr}/nothing-here"))
        .header("accept", format!("{V}3"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);

    let res = client
        .get(format!("http://{addr}/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(res.text().await.unwrap(), "ok");

    shutdown.trigger();
}

#[tokio::test]
async fn test_configured_negotiation_over_http() {
    let config = parse_config(
        r#"
        [negotiation]
        header = "X-Api-Version"
        grab = '^(\d+)$'
        error = 400
        "#,
    )
    .unwrap();
    let (addr, shutdown) = start(config).await;
    let client = client();

    let res = client
        .get(format!("http://{addr}/greeting"))
        .header("x-api-version", "7")
        .send()
        .await
        .unwrap();
    let json: Value = res.json().await.unwrap();
    assert_eq!(json["version"], 2);

    let res = client
        .get(format!("http://{addr}/greeting"))
        .header("accept", format!("{V}2"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);

    shutdown.trigger();
}

#[tokio::test]
async fn test_server_stops_on_shutdown() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(AppConfig::default(), demo_versions().unwrap());
    let handle = tokio::spawn(server.run(listener, shutdown.subscribe()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    shutdown.trigger();

    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("server did not stop")
        .unwrap();
    assert!(result.is_ok());
}
