//! Backend resources, one module per namespace
//!
//! Each module adds its operations to [`Gateway`](crate::Gateway). Reads go
//! through `Gateway::read` and never fail; writes go through
//! `Gateway::write` after their local checks.

mod bank;
mod insights;
mod keys;
mod packages;
mod providers;
mod proxies;

use crate::error::GatewayResult;
use crate::gateway::Gateway;
use reqwest::Method;
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::time::Duration;

impl Gateway {
    /// GET a bare JSON resource
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        timeout: Duration,
    ) -> GatewayResult<T> {
        let request = self.request(Method::GET, path, timeout);
        self.dispatch(operation, request).await?.decode()
    }
}

/// Percent-encode one path segment
fn segment(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}
