//! Liveness probe used to wake a sleeping backend and to re-check a failed one

use crate::error::GatewayResult;
use crate::gateway::Gateway;
use crate::retry::with_retry;
use reqwest::Method;
use tracing::{debug, info, warn};

impl Gateway {
    /// Probe the health endpoint
    ///
    /// Makes at most two attempts with a fixed delay, retrying only when no
    /// response came back. Returns `true` iff an attempt got a 2xx. A
    /// non-2xx answer from the health endpoint also marks the backend
    /// unavailable, since the backend is up but not serving.
    pub async fn wake_up(&self) -> bool {
        let policy = self.config().probe_retry;
        debug!(attempts = policy.attempts(), "probing backend");

        match with_retry(policy, "wake_up", move || self.probe_once()).await {
            Ok(()) => {
                info!("backend answered the liveness probe");
                true
            }
            Err(err) => {
                if !err.is_network() {
                    self.availability().mark_unavailable();
                }
                warn!(error = %err, "backend did not answer the liveness probe");
                false
            }
        }
    }

    async fn probe_once(&self) -> GatewayResult<()> {
        let request = self.request(
            Method::GET,
            &self.config().health_path,
            self.config().probe_timeout(),
        );
        self.dispatch("wake_up", request).await.map(|_| ())
    }

    /// Re-check a backend previously marked unavailable
    ///
    /// Returns immediately while the flag is true. While it is false, probes
    /// at most once per recheck interval and otherwise reports the cached
    /// state without any network call.
    pub async fn refresh_availability(&self) -> bool {
        let availability = self.availability();
        if availability.is_available() {
            return true;
        }

        let interval = self.config().recheck_interval();
        if let Some(elapsed) = availability.since_last_check()
            && elapsed < interval
        {
            debug!(
                elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                "recheck interval not reached, keeping backend unavailable"
            );
            return false;
        }

        self.wake_up().await
    }
}
