//! Backend-required writes

#![allow(clippy::unwrap_used, clippy::panic)]

mod common;

use common::{count_requests, gateway_for, live_key, unreachable_gateway};
use keyadmin_core::BankInfo;
use keyadmin_core::proxy::{AutoAssignRequest, NewProxy, ProxyUpdate};
use keyadmin_core::types::{KeyDetailsUpdate, NewKey, PackageInput, ProviderKeyInput};
use keyadmin_gateway::{GatewayError, GatewayResult};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;
use std::fmt::Debug;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn assert_unavailable<T: Debug>(result: GatewayResult<T>) {
    match result {
        Err(GatewayError::BackendUnavailable { .. }) => {}
        other => panic!("expected BackendUnavailable, got {other:?}"),
    }
}

fn package() -> PackageInput {
    PackageInput {
        name: "Starter".to_string(),
        price: 10_000.0,
        credits: 100,
        bonus: None,
        description: None,
        is_popular: false,
        is_active: true,
    }
}

fn bank() -> BankInfo {
    BankInfo {
        bank_name: "Vietcombank".to_string(),
        account_number: "0123456789".to_string(),
        account_name: "ACME CO".to_string(),
        branch_name: "Hanoi".to_string(),
        note: None,
    }
}

#[tokio::test]
async fn test_every_write_is_refused_without_calls_when_unavailable() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);
    gateway.availability().mark_unavailable();

    assert_unavailable(gateway.create_key(&NewKey::default()).await);
    assert_unavailable(gateway.update_credit("TV-DEMO-2024-001", 5.0).await);
    assert_unavailable(
        gateway
            .update_key_details("k1", &KeyDetailsUpdate::default())
            .await,
    );
    assert_unavailable(gateway.update_key_status("k1", false).await);
    assert_unavailable(gateway.revoke_key("TV-DEMO-2024-001").await);
    assert_unavailable(gateway.create_provider("OpenAI").await);
    assert_unavailable(
        gateway
            .add_provider_key(
                "p1",
                &ProviderKeyInput {
                    key: "sk-1".to_string(),
                    nickname: None,
                },
            )
            .await,
    );
    assert_unavailable(gateway.delete_provider_key("p1", "sk-1").await);
    assert_unavailable(gateway.create_package(&package()).await);
    assert_unavailable(gateway.update_package("pk1", &package()).await);
    assert_unavailable(gateway.delete_package("pk1").await);
    assert_unavailable(
        gateway
            .create_proxy(&NewProxy {
                name: "edge".to_string(),
                host: "10.0.0.1".to_string(),
                port: 8080,
                ..NewProxy::default()
            })
            .await,
    );
    assert_unavailable(gateway.update_proxy("x1", &ProxyUpdate::default()).await);
    assert_unavailable(gateway.delete_proxy("x1").await);
    assert_unavailable(gateway.test_proxy("x1").await);
    assert_unavailable(gateway.batch_test_proxies().await);
    assert_unavailable(
        gateway
            .auto_assign_proxies(&AutoAssignRequest::default())
            .await,
    );
    assert_unavailable(gateway.update_bank_info(&bank()).await);

    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_validation_runs_before_availability() {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);
    gateway.availability().mark_unavailable();

    let err = gateway.update_credit("TV-DEMO-2024-001", 0.0).await.unwrap_err();
    assert!(matches!(err, GatewayError::Validation { .. }));

    let err = gateway.revoke_key("  ").await.unwrap_err();
    assert!(matches!(err, GatewayError::Validation { .. }));
}

#[rstest]
#[case(0.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
#[case(1.5)]
#[tokio::test]
async fn test_invalid_credit_delta_makes_no_call(#[case] amount: f64) {
    let server = MockServer::start().await;
    let gateway = gateway_for(&server);

    let err = gateway
        .update_credit("TV-DEMO-2024-001", amount)
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Validation { ref field, .. } if field == "amount"));
    assert_eq!(count_requests(&server, "POST").await, 0);
}

#[rstest]
#[case(5.0, 5)]
#[case(-3.0, -3)]
#[tokio::test]
async fn test_valid_credit_delta_posts_once(#[case] amount: f64, #[case] expected: i64) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/keys/update-credit"))
        .and(body_json(json!({ "key": "TV-DEMO-2024-001", "amount": expected })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(live_key("TV-DEMO-2024-001", 100 + expected)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    let key = gateway
        .update_credit("TV-DEMO-2024-001", amount)
        .await
        .unwrap();

    assert_eq!(key.credit, 100 + expected);
    assert_eq!(count_requests(&server, "POST").await, 1);
}

#[rstest]
#[case(400, json!({ "message": "Key already exists" }), "Key already exists")]
#[case(500, json!({ "error": "Database offline" }), "Database offline")]
#[case(404, json!({}), "server error: status 404")]
#[tokio::test]
async fn test_application_error_surfaces_message_and_keeps_flag(
    #[case] status: u16,
    #[case] body: serde_json::Value,
    #[case] expected: &str,
) {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/keys"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    let err = gateway.create_key(&NewKey::default()).await.unwrap_err();

    assert_eq!(err.status(), Some(status));
    assert_eq!(err.to_string(), expected);
    assert!(gateway.availability().is_available());
}

#[tokio::test]
async fn test_failed_write_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/keys"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(live_key("NEW-1", 0))
                .set_delay(std::time::Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    let err = gateway.create_key(&NewKey::default()).await.unwrap_err();

    assert!(matches!(err, GatewayError::Connectivity { timed_out: true, .. }));
    assert!(!gateway.availability().is_available());
}

#[tokio::test]
async fn test_refused_write_marks_unavailable() {
    let gateway = unreachable_gateway();

    let err = gateway.revoke_key("TV-DEMO-2024-001").await.unwrap_err();

    assert!(err.is_network());
    assert!(!gateway.availability().is_available());
    assert_unavailable(gateway.revoke_key("TV-DEMO-2024-001").await);
}

#[tokio::test]
async fn test_key_writes_hit_their_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/keys/k%201/status"))
        .and(body_json(json!({ "isActive": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_key("K1", 5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/keys/k1/details"))
        .and(body_json(json!({ "note": "vip", "maxActivations": 5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(live_key("K1", 5)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/keys/revoke"))
        .and(body_json(json!({ "key": "K1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "revoked" })))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    gateway.update_key_status("k 1", false).await.unwrap();
    gateway
        .update_key_details(
            "k1",
            &KeyDetailsUpdate {
                note: Some("vip".to_string()),
                max_activations: Some(5),
                ..KeyDetailsUpdate::default()
            },
        )
        .await
        .unwrap();
    let ack = gateway.revoke_key("K1").await.unwrap();

    assert_eq!(ack.message.as_deref(), Some("revoked"));
}

#[tokio::test]
async fn test_delete_tolerates_empty_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/packages/pk1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    let ack = gateway.delete_package("pk1").await.unwrap();

    assert_eq!(ack.success, None);
    assert!(gateway.availability().is_available());
}

#[tokio::test]
async fn test_provider_key_is_added() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/providers/p1/keys"))
        .and(body_json(json!({ "key": "sk-new" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "_id": "p1",
            "name": "OpenAI",
            "status": "Operational",
            "apiKeys": ["sk-old", "sk-new"]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let gateway = gateway_for(&server);

    let provider = gateway
        .add_provider_key(
            "p1",
            &ProviderKeyInput {
                key: "sk-new".to_string(),
                nickname: None,
            },
        )
        .await
        .unwrap();

    assert_eq!(provider.api_keys, vec!["sk-old", "sk-new"]);
}
