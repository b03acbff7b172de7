//! Proxy pool administration
//!
//! Everything under `/admin/proxies` is wrapped in `{ success, data, message }`
//! and runs with the longer proxy timeout, since the backend tests proxies
//! synchronously.

use super::segment;
use crate::error::{GatewayError, GatewayResult};
use crate::fetched::Fetched;
use crate::gateway::Gateway;
use crate::validation::require_identifier;
use keyadmin_core::proxy::{
    AutoAssignReport, AutoAssignRequest, NewProxy, ProxyBatchTestResult, ProxyListQuery, ProxyPage,
    ProxyTestResult, ProxyUpdate,
};
use keyadmin_core::types::Acknowledgement;
use keyadmin_core::{ProxyItem, ProxyStatistics};
use reqwest::Method;

impl Gateway {
    async fn proxy_get<T: serde::de::DeserializeOwned>(
        &self,
        operation: &'static str,
        path: &str,
        query: Option<&ProxyListQuery>,
    ) -> GatewayResult<T> {
        let mut request = self.request(Method::GET, path, self.config().proxy_timeout());
        if let Some(query) = query {
            request = request.query(query);
        }
        self.dispatch(operation, request).await?.unwrap_envelope()
    }

    /// One page of the proxy pool
    pub async fn list_proxies(&self, query: &ProxyListQuery) -> Fetched<ProxyPage> {
        self.read(
            "list_proxies",
            move || self.proxy_get("list_proxies", "/admin/proxies", Some(query)),
            |data| data.proxy_page(query),
        )
        .await
    }

    /// Pool-wide statistics
    pub async fn proxy_stats(&self) -> Fetched<ProxyStatistics> {
        self.read(
            "proxy_stats",
            move || self.proxy_get("proxy_stats", "/admin/proxies/stats", None),
            |data| data.proxy_stats(),
        )
        .await
    }

    /// Add a proxy to the pool
    ///
    /// # Errors
    ///
    /// Validation errors for a blank name or host or a zero port,
    /// `BackendUnavailable` while the backend is down, otherwise the
    /// outcome of the single POST.
    pub async fn create_proxy(&self, proxy: &NewProxy) -> GatewayResult<ProxyItem> {
        require_identifier("name", &proxy.name)?;
        require_identifier("host", &proxy.host)?;
        if proxy.port == 0 {
            return Err(GatewayError::validation("port", "must be between 1 and 65535"));
        }

        let request = self
            .request(Method::POST, "/admin/proxies", self.config().proxy_timeout())
            .json(proxy);
        self.write("create_proxy", request).await?.unwrap_envelope()
    }

    /// Edit a proxy
    ///
    /// # Errors
    ///
    /// Validation errors for a blank id or a zero port, `BackendUnavailable`
    /// while the backend is down, otherwise the outcome of the single PUT.
    pub async fn update_proxy(&self, id: &str, update: &ProxyUpdate) -> GatewayResult<ProxyItem> {
        require_identifier("id", id)?;
        if update.port == Some(0) {
            return Err(GatewayError::validation("port", "must be between 1 and 65535"));
        }

        let path = format!("/admin/proxies/{}", segment(id));
        let request = self
            .request(Method::PUT, &path, self.config().proxy_timeout())
            .json(update);
        self.write("update_proxy", request).await?.unwrap_envelope()
    }

    /// Remove a proxy from the pool
    ///
    /// # Errors
    ///
    /// Validation error for a blank id, `BackendUnavailable` while the
    /// backend is down, otherwise the outcome of the single DELETE.
    pub async fn delete_proxy(&self, id: &str) -> GatewayResult<Acknowledgement> {
        require_identifier("id", id)?;

        let path = format!("/admin/proxies/{}", segment(id));
        let request = self.request(Method::DELETE, &path, self.config().proxy_timeout());
        self.write("delete_proxy", request).await?.envelope_ack()
    }

    /// Have the backend test one proxy
    ///
    /// # Errors
    ///
    /// Validation error for a blank id, `BackendUnavailable` while the
    /// backend is down, otherwise the outcome of the single POST.
    pub async fn test_proxy(&self, id: &str) -> GatewayResult<ProxyTestResult> {
        require_identifier("id", id)?;

        let path = format!("/admin/proxies/{}/test", segment(id));
        let request = self.request(Method::POST, &path, self.config().proxy_timeout());
        self.write("test_proxy", request).await?.unwrap_envelope()
    }

    /// Have the backend test every active proxy
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` while the backend is down, otherwise the outcome
    /// of the single POST.
    pub async fn batch_test_proxies(&self) -> GatewayResult<ProxyBatchTestResult> {
        let request = self.request(
            Method::POST,
            "/admin/proxies/batch-test",
            self.config().proxy_timeout(),
        );
        self.write("batch_test_proxies", request)
            .await?
            .unwrap_envelope()
    }

    /// Assign free proxies to provider credentials
    ///
    /// # Errors
    ///
    /// `BackendUnavailable` while the backend is down, otherwise the outcome
    /// of the single POST.
    pub async fn auto_assign_proxies(
        &self,
        request: &AutoAssignRequest,
    ) -> GatewayResult<AutoAssignReport> {
        let call = self
            .request(
                Method::POST,
                "/admin/proxies/auto-assign",
                self.config().proxy_timeout(),
            )
            .json(request);
        self.write("auto_assign_proxies", call)
            .await?
            .unwrap_envelope()
    }
}
