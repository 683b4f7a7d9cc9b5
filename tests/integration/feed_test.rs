//! Yahoo client against a loopback HTTP server

use crate::common::date;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use vix_analysis::feed::{FetchError, FetchRequest, PriceSource, YahooClient, YahooConfig};

const CHART_BODY: &str = r#"{"chart": {"result": [{
    "meta": {"symbol": "^VIX", "gmtoffset": -21600},
    "timestamp": [1704205800, 1704292200, 1704378600],
    "indicators": {"quote": [{"close": [13.20, 14.04, 14.13]}]}
}], "error": null}}"#;

const NOT_FOUND_BODY: &str = r#"{"chart": {"result": null, "error": {
    "code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;

/// Serve one canned response and return the request line
async fn serve_once(status: &'static str, body: &'static str) -> (String, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 4096];
        let n = socket.read(&mut buf).await.unwrap();
        let request = String::from_utf8_lossy(&buf[..n]).into_owned();

        let response = format!(
            "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request.lines().next().unwrap_or_default().to_string()
    });

    (format!("http://{}/v8/finance/chart", addr), handle)
}

fn client(base_url: String) -> YahooClient {
    YahooClient::with_config(YahooConfig {
        base_url,
        timeout: Duration::from_secs(5),
        ..YahooConfig::default()
    })
    .unwrap()
}

fn request() -> FetchRequest {
    FetchRequest::new("^VIX", date(2024, 1, 1), date(2024, 2, 1))
}

#[tokio::test]
async fn test_fetch_daily_closes() {
    let (base_url, server) = serve_once("200 OK", CHART_BODY).await;

    let series = client(base_url).fetch(&request()).await.unwrap();
    let request_line = server.await.unwrap();

    assert!(request_line.starts_with("GET /v8/finance/chart/"));
    assert!(request_line.contains("VIX?period1=1704067200"));
    assert!(request_line.contains("interval=1d"));
    assert_eq!(
        series.dates(),
        vec![date(2024, 1, 2), date(2024, 1, 3), date(2024, 1, 4)]
    );
    assert_eq!(series.values(), vec![13.20, 14.04, 14.13]);
}

#[tokio::test]
async fn test_fetch_unknown_symbol() {
    let (base_url, server) = serve_once("404 Not Found", NOT_FOUND_BODY).await;

    let err = client(base_url).fetch(&request()).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, FetchError::Provider { ref code, .. } if code == "Not Found"));
}

#[tokio::test]
async fn test_fetch_server_error() {
    let (base_url, server) = serve_once("500 Internal Server Error", "oops").await;

    let err = client(base_url).fetch(&request()).await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, FetchError::Status { status: 500, .. }));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client(format!("http://{}/v8/finance/chart", addr))
        .fetch(&request())
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Http(_)));
}
