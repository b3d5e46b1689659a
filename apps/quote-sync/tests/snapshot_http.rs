//! Snapshot Endpoint Integration Tests
//!
//! Runs the HTTP snapshot source and loader against a mock quote service.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use quote_sync::{
    DisplayStore, FetchError, HttpSnapshotSource, LoadOutcome, QuoteList, QuoteRecord,
    RequestedCount, SnapshotLoader, SnapshotSource, UpdateSource,
};

const THREE_STOCKS: &str = r#"[
    {"symbol":"AAPL","openPrice":150.5,"currentPrice":151.25,"refreshInterval":5},
    {"symbol":"MSFT","openPrice":300,"currentPrice":299.75,"refreshInterval":3},
    {"symbol":"TSLA","openPrice":700.125,"currentPrice":701,"refreshInterval":10}
]"#;

fn source_for(server: &MockServer) -> HttpSnapshotSource {
    HttpSnapshotSource::new(&server.uri(), Duration::from_secs(2)).unwrap()
}

fn count(n: u8) -> RequestedCount {
    RequestedCount::new(n).unwrap()
}

#[tokio::test]
async fn fetch_requests_count_and_keeps_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .and(query_param("n", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(THREE_STOCKS, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let quotes = tokio_test::assert_ok!(source_for(&server).fetch(count(3)).await);

    assert_eq!(quotes.symbols(), vec!["AAPL", "MSFT", "TSLA"]);
    let first = &quotes.as_slice()[0];
    assert_eq!(first.open_price, Decimal::new(1505, 1));
    assert_eq!(first.current_price, Decimal::new(15125, 2));
    assert_eq!(first.refresh_interval, 5);
}

#[tokio::test]
async fn empty_array_is_a_valid_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
        .mount(&server)
        .await;

    let quotes = tokio_test::assert_ok!(source_for(&server).fetch(count(1)).await);
    assert!(quotes.is_empty());
}

#[tokio::test]
async fn server_error_maps_to_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = tokio_test::assert_err!(source_for(&server).fetch(count(2)).await);
    assert_eq!(
        err,
        FetchError::Status {
            status: 500,
            body: "boom".to_string()
        }
    );
}

#[tokio::test]
async fn malformed_body_maps_to_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[{\"symbol\":"))
        .mount(&server)
        .await;

    let err = tokio_test::assert_err!(source_for(&server).fetch(count(2)).await);
    assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn object_body_maps_to_decode() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"error":"nope"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = tokio_test::assert_err!(source_for(&server).fetch(count(2)).await);
    assert!(matches!(err, FetchError::Decode(_)), "got {err:?}");
}

#[tokio::test]
async fn unreachable_host_maps_to_network() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let source =
        HttpSnapshotSource::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
    let err = tokio_test::assert_err!(source.fetch(count(1)).await);
    assert!(matches!(err, FetchError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn loader_applies_snapshot_and_clears_loading() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .and(query_param("n", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(THREE_STOCKS, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let store = DisplayStore::new();
    let loader = SnapshotLoader::new(Arc::new(source_for(&server)), store.clone());

    let outcome = loader.load(count(3)).await;

    assert_eq!(outcome, LoadOutcome::Applied { symbols: 3 });
    let snapshot = store.snapshot();
    assert_eq!(snapshot.quotes.len(), 3);
    assert_eq!(snapshot.last_source, Some(UpdateSource::Snapshot));
    assert!(!snapshot.loading);
}

#[tokio::test]
async fn loader_failure_keeps_previous_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/stocks"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let store = DisplayStore::new();
    store.replace_quotes(
        QuoteList::from(vec![QuoteRecord::new("KEEP", Decimal::ONE, Decimal::TWO, 1)]),
        UpdateSource::Feed,
    );
    let loader = SnapshotLoader::new(Arc::new(source_for(&server)), store.clone());

    let outcome = loader.load(count(5)).await;

    assert_eq!(outcome, LoadOutcome::Failed);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.quotes.symbols(), vec!["KEEP"]);
    assert_eq!(snapshot.last_source, Some(UpdateSource::Feed));
    assert!(!snapshot.loading);
}
