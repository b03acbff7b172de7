//! The gateway client and its single transport interception point

use crate::availability::BackendAvailability;
use crate::envelope::{Envelope, decode_body, error_message};
use crate::error::{ErrorSeverity, GatewayError, GatewayResult};
use crate::fallback::FallbackDataset;
use crate::fetched::Fetched;
use crate::retry::with_retry;
use keyadmin_core::GatewayConfig;
use keyadmin_core::types::Acknowledgement;
use rand::Rng;
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Client for the key-management backend
///
/// Every call goes through one interception point, which keeps the
/// availability flag current. Reads degrade to fallback data; writes are
/// refused while the backend is believed unreachable.
#[derive(Debug, Clone)]
pub struct Gateway {
    client: Client,
    base_url: String,
    config: GatewayConfig,
    availability: Arc<BackendAvailability>,
    fallback: Arc<FallbackDataset>,
}

/// A response that arrived, with its body read
#[derive(Debug)]
pub(crate) struct Reply {
    pub(crate) status: u16,
    pub(crate) body: String,
}

impl Reply {
    pub(crate) fn decode<T: DeserializeOwned>(&self) -> GatewayResult<T> {
        decode_body(&self.body)
    }

    pub(crate) fn unwrap_envelope<T: DeserializeOwned>(&self) -> GatewayResult<T> {
        decode_body::<Envelope<T>>(&self.body)?.into_data(self.status)
    }

    pub(crate) fn envelope_ack(&self) -> GatewayResult<Acknowledgement> {
        let message = decode_body::<Envelope<serde_json::Value>>(&self.body)?.into_ack(self.status)?;
        Ok(Acknowledgement {
            success: Some(true),
            message,
        })
    }
}

impl Gateway {
    /// Create a gateway with fresh availability state and the standard
    /// fallback dataset
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the settings are invalid, the base
    /// URL is not an absolute http(s) URL, or the HTTP client cannot be built.
    pub fn new(config: GatewayConfig) -> GatewayResult<Self> {
        config
            .validate()
            .map_err(|e| GatewayError::configuration(e.to_string()))?;

        let base_url = config.base_url().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| GatewayError::configuration(format!("invalid base URL {base_url}: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(GatewayError::configuration(format!(
                "base URL must use http or https: {base_url}"
            )));
        }

        let client = Client::builder()
            .user_agent(concat!("keyadmin-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| GatewayError::configuration(format!("failed to build HTTP client: {e}")))?;

        debug!(base_url = %base_url, "gateway created");

        Ok(Self {
            client,
            base_url,
            config,
            availability: Arc::new(BackendAvailability::new()),
            fallback: FallbackDataset::standard(),
        })
    }

    /// Share an existing availability state
    #[must_use]
    pub fn with_availability(mut self, availability: Arc<BackendAvailability>) -> Self {
        self.availability = availability;
        self
    }

    /// Serve a different fallback dataset
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<FallbackDataset>) -> Self {
        self.fallback = fallback;
        self
    }

    /// The availability state this gateway updates
    pub const fn availability(&self) -> &Arc<BackendAvailability> {
        &self.availability
    }

    /// Resolved base URL, without a trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Settings in effect
    pub const fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub(crate) fn request(&self, method: Method, path: &str, timeout: Duration) -> RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .timeout(timeout)
    }

    /// Send a request and classify the outcome
    ///
    /// A 2xx response marks the backend available. A failure with no
    /// response marks it unavailable. Any other response leaves the flag
    /// alone and becomes a server error carrying the body's message.
    pub(crate) async fn dispatch(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> GatewayResult<Reply> {
        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => return Err(self.transport_failure(operation, &err)),
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(err) => return Err(self.transport_failure(operation, &err)),
        };

        if status.is_success() {
            self.availability.mark_available();
            debug!(operation, status = status.as_u16(), "backend call succeeded");
            Ok(Reply {
                status: status.as_u16(),
                body,
            })
        } else {
            let code = status.as_u16();
            let failure = GatewayError::server(code, error_message(code, &body));
            log_failure(operation, &failure);
            Err(failure)
        }
    }

    fn transport_failure(&self, operation: &'static str, err: &reqwest::Error) -> GatewayError {
        let failure = GatewayError::from_transport(err);
        if failure.is_network() {
            self.availability.mark_unavailable();
        }
        debug!(operation, timed_out = err.is_timeout(), error = %err, "transport error");
        log_failure(operation, &failure);
        failure
    }

    /// Fail fast when the backend is believed unreachable
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::BackendUnavailable`] when the flag is false.
    pub fn ensure_backend(&self, operation: &'static str) -> GatewayResult<()> {
        if self.availability.is_available() {
            Ok(())
        } else {
            let refused = GatewayError::backend_unavailable(operation);
            log_failure(operation, &refused);
            Err(refused)
        }
    }

    /// Run a write: guard, then exactly one call
    pub(crate) async fn write(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> GatewayResult<Reply> {
        self.ensure_backend(operation)?;
        self.dispatch(operation, request).await
    }

    /// Run a fallback-eligible read
    ///
    /// Live data is attempted only while the backend is believed reachable.
    /// Any failure, of any class, is absorbed into fallback data.
    pub(crate) async fn read<T, F, Fut>(
        &self,
        operation: &'static str,
        fetch: F,
        fallback: impl FnOnce(&FallbackDataset) -> T,
    ) -> Fetched<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = GatewayResult<T>>,
    {
        if self.availability.is_available() {
            match with_retry(self.config.read_retry, operation, fetch).await {
                Ok(data) => return Fetched::live(data),
                Err(err) => warn!(operation, error = %err, "read failed, serving fallback data"),
            }
        } else {
            debug!(operation, "backend unavailable, serving fallback data");
        }

        self.simulate_latency().await;
        Fetched::fallback(fallback(&self.fallback))
    }

    async fn simulate_latency(&self) {
        let min = self.config.fallback_delay_min_ms;
        let max = self.config.fallback_delay_max_ms.max(min);
        if max == 0 {
            return;
        }
        let delay_ms = rand::thread_rng().gen_range(min..=max);
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}

/// Log a failed backend call at the level its severity calls for
fn log_failure(operation: &'static str, failure: &GatewayError) {
    let status = failure.status();
    match failure.severity() {
        ErrorSeverity::Info => {
            info!(operation, ?status, error = %failure, "backend call failed");
        }
        ErrorSeverity::Warning => {
            warn!(operation, ?status, error = %failure, "backend call failed");
        }
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(operation, ?status, error = %failure, "backend call failed");
        }
    }
}
