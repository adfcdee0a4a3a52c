/// Live rate fetch tests against a mock exchange-rate endpoint
use arc_swap::ArcSwap;
use httpmock::prelude::*;
use serde_json::json;
use std::sync::Arc;

use carpricer::error::AppError;
use carpricer::rates::{RateProvider, RateSource, RateTable};

#[tokio::test]
async fn test_fetch_parses_live_rates() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v6/latest/USD");
            then.status(200).json_body(json!({
                "result": "success",
                "rates": { "USD": 1.0, "EUR": 0.91, "GBP": 0.78, "EGP": 47.6 }
            }));
        })
        .await;

    let provider = RateProvider::new(server.url("/v6/latest/USD"));
    let rates = provider.fetch().await.unwrap();

    assert_eq!(rates["EUR"], 0.91);
    assert_eq!(rates["EGP"], 47.6);
}

#[tokio::test]
async fn test_fetch_injects_egp_when_missing() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v6/latest/USD");
            then.status(200).json_body(json!({
                "result": "success",
                "rates": { "USD": 1.0, "EUR": 0.91 }
            }));
        })
        .await;

    let provider = RateProvider::new(server.url("/v6/latest/USD"));
    let rates = provider.fetch().await.unwrap();

    assert_eq!(rates["EGP"], 50.0);
}

#[tokio::test]
async fn test_refresh_swaps_in_live_table() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v6/latest/USD");
            then.status(200).json_body(json!({
                "result": "success",
                "rates": { "USD": 1.0, "EUR": 0.93, "EGP": 48.0 }
            }));
        })
        .await;

    let table = Arc::new(ArcSwap::from_pointee(RateTable::fallback()));
    let provider = RateProvider::new(server.url("/v6/latest/USD"));

    assert!(provider.refresh_into(&table).await);

    let current = table.load();
    assert_eq!(current.source, RateSource::Live);
    assert_eq!(current.convert(10_000.0, "EUR").unwrap(), 9_300.0);
}

#[tokio::test]
async fn test_api_level_failure_keeps_previous_table() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v6/latest/USD");
            then.status(200).json_body(json!({
                "result": "error",
                "rates": {}
            }));
        })
        .await;

    let table = Arc::new(ArcSwap::from_pointee(RateTable::fallback()));
    let provider = RateProvider::new(server.url("/v6/latest/USD"));

    assert!(!provider.refresh_into(&table).await);

    let current = table.load();
    assert_eq!(current.source, RateSource::Fallback);
    assert_eq!(current.rates["EUR"], 0.85);
}

#[tokio::test]
async fn test_http_failure_keeps_previous_table() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v6/latest/USD");
            then.status(503);
        })
        .await;

    let table = Arc::new(ArcSwap::from_pointee(RateTable::fallback()));
    let provider = RateProvider::new(server.url("/v6/latest/USD"));

    assert!(!provider.refresh_into(&table).await);
    assert_eq!(table.load().source, RateSource::Fallback);
}

#[tokio::test]
async fn test_bad_status_is_rate_unavailable() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v6/latest/USD");
            then.status(500);
        })
        .await;

    let provider = RateProvider::new(server.url("/v6/latest/USD"));
    let err = provider.fetch().await.unwrap_err();

    assert!(matches!(err, AppError::RateUnavailable(_)));
}

#[tokio::test]
async fn test_malformed_body_is_an_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/v6/latest/USD");
            then.status(200).body("not json at all");
        })
        .await;

    let provider = RateProvider::new(server.url("/v6/latest/USD"));
    assert!(provider.fetch().await.is_err());
}
