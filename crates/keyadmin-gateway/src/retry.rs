//! Bounded fixed-delay retry for idempotent calls

use crate::error::GatewayResult;
use keyadmin_core::RetryConfig;
use std::future::Future;
use tokio::time::sleep;
use tracing::debug;

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// policy's attempt budget is spent
///
/// Never use this for writes: a retried write can apply its effect twice.
pub(crate) async fn with_retry<T, F, Fut>(
    policy: RetryConfig,
    operation: &'static str,
    mut attempt: F,
) -> GatewayResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = GatewayResult<T>>,
{
    let budget = policy.attempts();
    let mut made = 1;

    loop {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && made < budget => {
                debug!(
                    operation,
                    attempt = made,
                    budget,
                    delay_ms = policy.delay_ms,
                    error = %err,
                    "retrying after network failure"
                );
                sleep(policy.delay()).await;
                made += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
