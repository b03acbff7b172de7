use super::segment;
use crate::error::{GatewayError, GatewayResult};
use crate::fetched::Fetched;
use crate::gateway::Gateway;
use crate::validation::{CreditDelta, require_identifier};
use keyadmin_core::AdminKey;
use keyadmin_core::types::{Acknowledgement, KeyDetailsUpdate, NewKey};
use reqwest::Method;
use serde_json::json;

impl Gateway {
    /// List all keys
    pub async fn list_keys(&self) -> Fetched<Vec<AdminKey>> {
        let timeout = self.config().timeout();
        self.read(
            "list_keys",
            move || self.get_json("list_keys", "/keys", timeout),
            |data| data.keys.clone(),
        )
        .await
    }

    /// Issue a new key
    ///
    /// # Errors
    ///
    /// Validation errors for a negative credit or a zero activation limit,
    /// `BackendUnavailable` while the backend is down, otherwise the
    /// outcome of the single POST.
    pub async fn create_key(&self, key: &NewKey) -> GatewayResult<AdminKey> {
        if key.credit < 0 {
            return Err(GatewayError::validation("credit", "must not be negative"));
        }
        if key.max_activations == 0 {
            return Err(GatewayError::validation("maxActivations", "must be at least 1"));
        }

        let request = self
            .request(Method::POST, "/keys", self.config().timeout())
            .json(key);
        self.write("create_key", request).await?.decode()
    }

    /// Add `amount` credits to the key identified by its key string
    ///
    /// Negative amounts deduct credit.
    ///
    /// # Errors
    ///
    /// Validation errors for a blank key or an amount that is zero, not
    /// finite, or fractional; `BackendUnavailable` while the backend is down;
    /// otherwise the outcome of the single POST.
    pub async fn update_credit(&self, key: &str, amount: f64) -> GatewayResult<AdminKey> {
        require_identifier("key", key)?;
        let amount = CreditDelta::new(amount)?;

        let request = self
            .request(Method::POST, "/keys/update-credit", self.config().timeout())
            .json(&json!({ "key": key, "amount": amount }));
        self.write("update_credit", request).await?.decode()
    }

    /// Edit a key's note, expiry, activation limit or trial flag
    ///
    /// # Errors
    ///
    /// Validation errors for a blank id or a zero activation limit,
    /// `BackendUnavailable` while the backend is down, otherwise the
    /// outcome of the single PUT.
    pub async fn update_key_details(
        &self,
        id: &str,
        update: &KeyDetailsUpdate,
    ) -> GatewayResult<AdminKey> {
        require_identifier("id", id)?;
        if update.max_activations == Some(0) {
            return Err(GatewayError::validation("maxActivations", "must be at least 1"));
        }

        let path = format!("/keys/{}/details", segment(id));
        let request = self
            .request(Method::PUT, &path, self.config().timeout())
            .json(update);
        self.write("update_key_details", request).await?.decode()
    }

    /// Activate or deactivate a key
    ///
    /// # Errors
    ///
    /// Validation error for a blank id, `BackendUnavailable` while the
    /// backend is down, otherwise the outcome of the single PUT.
    pub async fn update_key_status(&self, id: &str, is_active: bool) -> GatewayResult<AdminKey> {
        require_identifier("id", id)?;

        let path = format!("/keys/{}/status", segment(id));
        let request = self
            .request(Method::PUT, &path, self.config().timeout())
            .json(&json!({ "isActive": is_active }));
        self.write("update_key_status", request).await?.decode()
    }

    /// Revoke a key by its key string
    ///
    /// # Errors
    ///
    /// Validation error for a blank key, `BackendUnavailable` while the
    /// backend is down, otherwise the outcome of the single POST.
    pub async fn revoke_key(&self, key: &str) -> GatewayResult<Acknowledgement> {
        require_identifier("key", key)?;

        let request = self
            .request(Method::POST, "/keys/revoke", self.config().timeout())
            .json(&json!({ "key": key }));
        self.write("revoke_key", request).await?.decode()
    }
}
