//! Shared helpers for gateway integration tests

#![allow(dead_code, clippy::unwrap_used)]

use keyadmin_core::{GatewayConfig, RetryConfig};
use keyadmin_gateway::Gateway;
use serde_json::{Value, json};
use std::sync::Once;
use wiremock::MockServer;

static INIT_LOGGER: Once = Once::new();

/// Request timeout used by every test gateway
pub const TEST_TIMEOUT_MS: u64 = 300;

/// Initialize test logging (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("keyadmin_gateway=debug")
            .with_test_writer()
            .try_init();
    });
}

/// Configuration with short timeouts, fast retries and no fallback latency
pub fn test_config(base_url: &str) -> GatewayConfig {
    GatewayConfig {
        timeout_ms: TEST_TIMEOUT_MS,
        proxy_timeout_ms: TEST_TIMEOUT_MS,
        probe_timeout_ms: TEST_TIMEOUT_MS,
        probe_retry: RetryConfig {
            max_attempts: 2,
            delay_ms: 10,
        },
        read_retry: RetryConfig {
            max_attempts: 1,
            delay_ms: 10,
        },
        recheck_interval_ms: 0,
        fallback_delay_min_ms: 0,
        fallback_delay_max_ms: 0,
        ..GatewayConfig::with_base_url(base_url)
    }
}

/// Gateway pointed at `<server>/api`
pub fn gateway_for(server: &MockServer) -> Gateway {
    init_test_logging();
    Gateway::new(test_config(&format!("{}/api", server.uri()))).unwrap()
}

/// Gateway pointed at a port nothing listens on
pub fn unreachable_gateway() -> Gateway {
    init_test_logging();
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    Gateway::new(test_config(&format!("http://127.0.0.1:{port}/api"))).unwrap()
}

/// Number of requests the server received with `method`
pub async fn count_requests(server: &MockServer, method: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.method.as_str() == method)
        .count()
}

/// A key as the backend returns it
pub fn live_key(key: &str, credit: i64) -> Value {
    json!({
        "_id": format!("id-{key}"),
        "key": key,
        "credit": credit,
        "note": "live",
        "expiredAt": null,
        "createdAt": "2024-05-01T08:00:00Z",
        "isActive": true,
        "maxActivations": 3
    })
}

/// A proxy as the backend returns it
pub fn live_proxy(id: &str) -> Value {
    json!({
        "_id": id,
        "name": format!("Proxy {id}"),
        "host": "10.0.0.7",
        "port": 3128,
        "protocol": "http",
        "isActive": true,
        "location": "VN",
        "provider": "Viettel",
        "lastUsed": null,
        "successCount": 9,
        "failureCount": 1,
        "avgResponseTime": 120.0,
        "assignedApiKey": null,
        "createdAt": "2024-05-01T08:00:00Z",
        "updatedAt": "2024-05-02T08:00:00Z"
    })
}
