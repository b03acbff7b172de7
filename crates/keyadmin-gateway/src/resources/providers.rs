use super::segment;
use crate::error::GatewayResult;
use crate::fetched::Fetched;
use crate::gateway::Gateway;
use crate::validation::require_identifier;
use keyadmin_core::ApiProvider;
use keyadmin_core::types::{Acknowledgement, ProviderKeyInput};
use reqwest::Method;
use serde_json::json;

impl Gateway {
    /// List upstream API providers with their pooled credentials
    pub async fn list_providers(&self) -> Fetched<Vec<ApiProvider>> {
        let timeout = self.config().timeout();
        self.read(
            "list_providers",
            move || self.get_json("list_providers", "/providers", timeout),
            |data| data.providers.clone(),
        )
        .await
    }

    /// Register a provider
    ///
    /// # Errors
    ///
    /// Validation error for a blank name, `BackendUnavailable` while the
    /// backend is down, otherwise the outcome of the single POST.
    pub async fn create_provider(&self, name: &str) -> GatewayResult<ApiProvider> {
        require_identifier("name", name)?;

        let request = self
            .request(Method::POST, "/providers", self.config().timeout())
            .json(&json!({ "name": name.trim() }));
        self.write("create_provider", request).await?.decode()
    }

    /// Add a credential to a provider's pool
    ///
    /// # Errors
    ///
    /// Validation errors for a blank provider id or credential,
    /// `BackendUnavailable` while the backend is down, otherwise the
    /// outcome of the single POST.
    pub async fn add_provider_key(
        &self,
        provider_id: &str,
        input: &ProviderKeyInput,
    ) -> GatewayResult<ApiProvider> {
        require_identifier("providerId", provider_id)?;
        require_identifier("key", &input.key)?;

        let path = format!("/providers/{}/keys", segment(provider_id));
        let request = self
            .request(Method::POST, &path, self.config().timeout())
            .json(input);
        self.write("add_provider_key", request).await?.decode()
    }

    /// Remove a credential from a provider's pool
    ///
    /// # Errors
    ///
    /// Validation errors for blank identifiers, `BackendUnavailable` while
    /// the backend is down, otherwise the outcome of the single DELETE.
    pub async fn delete_provider_key(
        &self,
        provider_id: &str,
        key_id: &str,
    ) -> GatewayResult<Acknowledgement> {
        require_identifier("providerId", provider_id)?;
        require_identifier("keyId", key_id)?;

        let path = format!("/providers/{}/keys/{}", segment(provider_id), segment(key_id));
        let request = self.request(Method::DELETE, &path, self.config().timeout());
        self.write("delete_provider_key", request).await?.decode()
    }
}
