//! Integration tests for the HTTP adapters.
//!
//! Each test stands up a small axum server on a random local port that
//! mimics the currency-api file layout or an image upload endpoint.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
};
use chrono::NaiveDate;
use rates_adapters::{CurrencyApi, HttpPublisher};
use rates_types::{GraphPublisher, Pair, PublishError, QuoteSource, RateError};
use serde_json::{Value, json};

type Files = Arc<HashMap<String, Value>>;

/// Serves `/{time}/currencies/{from}/{to}.json` from an in-memory table.
async fn rate_file(
    State(files): State<Files>,
    Path((time, from, file)): Path<(String, String, String)>,
) -> Result<Json<Value>, StatusCode> {
    let key = format!("{}/{}/{}", time, from, file);
    files.get(&key).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn provider(files: &[(&str, Value)]) -> CurrencyApi {
    let files: Files = Arc::new(
        files
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect(),
    );
    let app = Router::new()
        .route("/{time}/currencies/{from}/{file}", get(rate_file))
        .with_state(files);
    CurrencyApi::new(spawn(app).await)
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ─────────────────────────────────────────────────────────────────────────────
// CurrencyApi
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_fetch_latest_reads_rate_and_date() {
    let api = provider(&[(
        "latest/usd/eur.json",
        json!({"date": "2024-03-31", "eur": 0.92}),
    )])
    .await;

    let point = api.fetch_latest(&Pair::new("USD", "EUR")).await.unwrap();

    assert_eq!(point.date, day(2024, 3, 31));
    assert_eq!(point.rate, 0.92);
}

#[tokio::test]
async fn test_fetch_on_date_uses_iso_day() {
    let api = provider(&[(
        "2024-03-01/eur/usd.json",
        json!({"date": "2024-03-01", "usd": 1.08}),
    )])
    .await;

    let rate = api
        .fetch_on_date(&Pair::new("EUR", "USD"), day(2024, 3, 1))
        .await
        .unwrap();

    assert_eq!(rate, 1.08);
}

#[tokio::test]
async fn test_fetch_current_combines_both_days() {
    let api = provider(&[
        (
            "latest/usd/eur.json",
            json!({"date": "2024-03-31", "eur": 0.92}),
        ),
        (
            "2024-03-30/usd/eur.json",
            json!({"date": "2024-03-30", "eur": 0.90}),
        ),
    ])
    .await;

    let quote = api.fetch_current(&Pair::new("USD", "EUR")).await.unwrap();

    assert_eq!(quote.rate, 0.92);
    let delta = quote.delta_pct.unwrap();
    assert!((delta - 2.222).abs() < 0.001);
}

#[tokio::test]
async fn test_unknown_code_is_invalid_currency() {
    let api = provider(&[]).await;

    let result = api.fetch_latest(&Pair::new("ZZZ", "EUR")).await;

    assert!(matches!(result, Err(RateError::InvalidCurrency(_))));
}

#[tokio::test]
async fn test_body_without_rate_is_invalid_currency() {
    let api = provider(&[("latest/usd/xxx.json", json!({"date": "2024-03-31"}))]).await;

    let result = api.fetch_latest(&Pair::new("USD", "XXX")).await;

    assert!(matches!(result, Err(RateError::InvalidCurrency(_))));
}

#[tokio::test]
async fn test_other_client_errors_are_network_errors() {
    for status in [
        StatusCode::TOO_MANY_REQUESTS,
        StatusCode::FORBIDDEN,
        StatusCode::UNAUTHORIZED,
    ] {
        let app = Router::new().fallback(move || async move { status });
        let api = CurrencyApi::new(spawn(app).await);

        let result = api.fetch_latest(&Pair::new("USD", "EUR")).await;

        assert!(
            matches!(result, Err(RateError::Network(_))),
            "{} gave {:?}",
            status,
            result
        );
    }
}

#[tokio::test]
async fn test_infinite_rate_is_invalid_currency() {
    let api = provider(&[(
        "2024-03-01/usd/eur.json",
        json!({"date": "2024-03-01", "eur": "Infinity"}),
    )])
    .await;

    let result = api
        .fetch_on_date(&Pair::new("USD", "EUR"), day(2024, 3, 1))
        .await;

    assert!(matches!(result, Err(RateError::InvalidCurrency(_))));
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    // Nothing listens on port 9 of the loopback interface.
    let api = CurrencyApi::new("http://127.0.0.1:9");

    let result = api.fetch_latest(&Pair::new("USD", "EUR")).await;

    assert!(matches!(result, Err(RateError::Network(_))));
}

// ─────────────────────────────────────────────────────────────────────────────
// HttpPublisher
// ─────────────────────────────────────────────────────────────────────────────

async fn accept_upload(headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    if body.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "empty body"})));
    }
    let name = headers
        .get("x-file-name")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("graph.png");
    (
        StatusCode::CREATED,
        Json(json!({"url": format!("https://img.test/{}", name)})),
    )
}

async fn answer_without_url() -> Json<Value> {
    Json(json!({"ok": true}))
}

fn write_chart(dir: &std::path::Path, bytes: &[u8]) -> std::path::PathBuf {
    let path = dir.join("sek-eur.png");
    std::fs::write(&path, bytes).unwrap();
    path
}

#[tokio::test]
async fn test_http_publisher_returns_url() {
    let base = spawn(Router::new().route("/upload", post(accept_upload))).await;
    let dir = tempfile::tempdir().unwrap();
    let publisher = HttpPublisher::new(format!("{}/upload", base));

    let url = publisher
        .upload(&write_chart(dir.path(), b"\x89PNG"))
        .await
        .unwrap();

    assert_eq!(url, "https://img.test/sek-eur.png");
}

#[tokio::test]
async fn test_http_publisher_rejection_keeps_message() {
    let base = spawn(Router::new().route("/upload", post(accept_upload))).await;
    let dir = tempfile::tempdir().unwrap();
    let publisher = HttpPublisher::new(format!("{}/upload", base));

    let result = publisher.upload(&write_chart(dir.path(), b"")).await;

    match result {
        Err(PublishError::Rejected { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "empty body");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn test_http_publisher_missing_url() {
    let base = spawn(Router::new().route("/upload", post(answer_without_url))).await;
    let dir = tempfile::tempdir().unwrap();
    let publisher = HttpPublisher::new(format!("{}/upload", base));

    let result = publisher.upload(&write_chart(dir.path(), b"\x89PNG")).await;

    assert!(matches!(result, Err(PublishError::MissingUrl)));
}
