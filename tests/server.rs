//! End-to-end tests over a real socket.

use serde_json::json;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceExt;

use request_journal::config::LoggingConfig;
use request_journal::observability::format::FormatterConfig;
use request_journal::{HttpServer, ServiceConfig, Shutdown};

mod common;

#[tokio::test]
async fn test_served_requests_carry_remote_address() {
    let (logs, _guard) = common::capture_logs(FormatterConfig::default());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(ServiceConfig::default(), common::test_routes());
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    let client = reqwest::Client::builder().no_proxy().build().unwrap();

    let res = client
        .get(format!("http://{}/health", addr))
        .header("x-request-id", "e2e-1")
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 200);

    let res = client
        .get(format!("http://{}/orders", addr))
        .send()
        .await
        .expect("server unreachable");
    assert_eq!(res.status(), 500);
    assert_eq!(res.text().await.unwrap(), "");

    drop(client);
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), server_task)
        .await
        .expect("server did not stop")
        .unwrap()
        .unwrap();

    let events = logs.journal();
    assert_eq!(events.len(), 3, "{}", logs.text());

    assert_eq!(events[0]["level"], json!("info"));
    assert_eq!(events[0]["request_id"], json!("e2e-1"));
    assert_eq!(events[0]["remote_address"], json!("127.0.0.1"));

    for event in &events[1..] {
        assert_eq!(event["level"], json!("error"));
        assert_eq!(event["status"], json!(500));
        assert_eq!(event["remote_address"], json!("127.0.0.1"));
    }
    let dump = events[2]["error"].as_str().unwrap();
    assert!(dump.starts_with(&format!("GET /orders HTTP/1.1\r\nHost: {}\r\n", addr)), "{dump}");
}

#[tokio::test]
async fn test_server_router_applies_configured_journal() {
    let (logs, _guard) = common::capture_logs(FormatterConfig::default());
    let config = ServiceConfig {
        logging: LoggingConfig {
            dump_request_body: true,
            ..LoggingConfig::default()
        },
        ..ServiceConfig::default()
    };
    let server = HttpServer::new(config, common::test_routes());
    assert!(server.config().logging.dump_request_body);
    assert_eq!(
        server.config().listener.bind_address,
        ServiceConfig::default().listener.bind_address
    );

    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/echo")
        .header("host", "journal.test")
        .body(axum::body::Body::from("hi"))
        .unwrap();
    let response = server.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), 200);

    let events = logs.journal();
    assert_eq!(events.len(), 2, "{}", logs.text());
    assert_eq!(events[1]["error"], json!("POST /echo HTTP/1.1\r\nHost: journal.test\r\nhi\r\n"));
}
