//! Availability tracking, the liveness probe and end-to-end outage scenarios

#![allow(clippy::unwrap_used)]

mod common;

use common::{count_requests, gateway_for, init_test_logging, live_key, test_config};
use keyadmin_core::types::NewKey;
use keyadmin_gateway::{
    BackendAvailability, DataSource, FallbackDataset, Gateway, GatewayError,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn slow(status: u16) -> ResponseTemplate {
    ResponseTemplate::new(status).set_delay(Duration::from_secs(2))
}

#[tokio::test]
async fn test_timeout_then_write_is_refused() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/keys"))
        .respond_with(slow(200).set_body_json(json!([live_key("LIVE-1", 1)])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/keys"))
        .respond_with(ResponseTemplate::new(201).set_body_json(live_key("NEW-1", 0)))
        .expect(0)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);
    assert!(gateway.availability().is_available());

    let keys = gateway.list_keys().await;
    assert!(keys.is_fallback());
    assert_eq!(keys.data, FallbackDataset::standard().keys);
    assert!(!gateway.availability().is_available());

    let err = gateway.create_key(&NewKey::default()).await.unwrap_err();
    assert!(matches!(err, GatewayError::BackendUnavailable { .. }));
    assert_eq!(count_requests(&server, "POST").await, 0);
}

#[tokio::test]
async fn test_probe_gives_up_after_two_timeouts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(slow(200))
        .expect(2)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    assert!(!gateway.wake_up().await);
    assert!(!gateway.availability().is_available());
    assert_eq!(count_requests(&server, "GET").await, 2);
}

#[tokio::test]
async fn test_probe_recovers_on_second_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(slow(200))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    assert!(gateway.wake_up().await);
    assert!(gateway.availability().is_available());
    assert_eq!(count_requests(&server, "GET").await, 2);
}

#[tokio::test]
async fn test_probe_does_not_retry_an_answer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    assert!(!gateway.wake_up().await);
    assert!(!gateway.availability().is_available());
}

#[tokio::test]
async fn test_successful_probe_flips_flag_back() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/keys"))
        .respond_with(ResponseTemplate::new(201).set_body_json(live_key("NEW-1", 0)))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);
    gateway.availability().mark_unavailable();

    assert!(gateway.refresh_availability().await);
    assert!(gateway.availability().is_available());

    let key = gateway.create_key(&NewKey::default()).await.unwrap();
    assert_eq!(key.key, "NEW-1");
}

#[tokio::test]
async fn test_next_read_after_recovery_goes_live() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([live_key("LIVE-1", 5)])))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);
    gateway.availability().mark_unavailable();

    let offline = gateway.list_keys().await;
    assert_eq!(offline.source, DataSource::Fallback);
    assert!(server.received_requests().await.unwrap().is_empty());

    assert!(gateway.wake_up().await);

    let keys = gateway.list_keys().await;
    assert_eq!(keys.source, DataSource::Live);
    assert_eq!(keys.data.len(), 1);
    assert_eq!(keys.data.first().map(|k| k.key.as_str()), Some("LIVE-1"));

    let key_reads = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|request| request.url.path() == "/api/keys")
        .count();
    assert_eq!(key_reads, 1);
}

#[tokio::test]
async fn test_refresh_respects_recheck_interval() {
    init_test_logging();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let gateway = Gateway::new(keyadmin_core::GatewayConfig {
        recheck_interval_ms: 60_000,
        ..test_config(&format!("{}/api", server.uri()))
    })
    .unwrap();
    gateway.availability().mark_unavailable();

    assert!(!gateway.refresh_availability().await);
    assert!(!gateway.availability().is_available());
}

#[tokio::test]
async fn test_refresh_is_a_no_op_while_available() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    assert!(gateway.refresh_availability().await);
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_refresh_probes_a_never_checked_backend() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/status"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = Gateway::new(keyadmin_core::GatewayConfig {
        recheck_interval_ms: 60_000,
        ..test_config(&format!("{}/api", server.uri()))
    })
    .unwrap()
    .with_availability(Arc::new(BackendAvailability::starting_as(false)));

    assert!(gateway.refresh_availability().await);
}

#[tokio::test]
async fn test_gateways_sharing_state_see_each_others_outcomes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/providers"))
        .respond_with(slow(200).set_body_json(json!([])))
        .mount(&server)
        .await;
    let shared = Arc::new(BackendAvailability::new());
    let reader = gateway_for(&server).with_availability(Arc::clone(&shared));
    let writer = gateway_for(&server).with_availability(Arc::clone(&shared));

    assert!(reader.list_providers().await.is_fallback());

    let err = writer.create_provider("Anthropic").await.unwrap_err();
    assert!(matches!(err, GatewayError::BackendUnavailable { .. }));
    assert_eq!(count_requests(&server, "POST").await, 0);
}
