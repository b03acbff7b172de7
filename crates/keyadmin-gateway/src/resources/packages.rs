use super::segment;
use crate::error::{GatewayError, GatewayResult};
use crate::fetched::Fetched;
use crate::gateway::Gateway;
use crate::validation::require_identifier;
use keyadmin_core::CreditPackage;
use keyadmin_core::types::{Acknowledgement, PackageInput};
use reqwest::Method;

fn check_package(package: &PackageInput) -> GatewayResult<()> {
    require_identifier("name", &package.name)?;
    if !package.price.is_finite() || package.price < 0.0 {
        return Err(GatewayError::validation("price", "must be a non-negative number"));
    }
    if package.credits <= 0 {
        return Err(GatewayError::validation("credits", "must be positive"));
    }
    Ok(())
}

impl Gateway {
    /// List credit packages
    pub async fn list_packages(&self) -> Fetched<Vec<CreditPackage>> {
        let timeout = self.config().timeout();
        self.read(
            "list_packages",
            move || self.get_json("list_packages", "/packages", timeout),
            |data| data.packages.clone(),
        )
        .await
    }

    /// Create a credit package
    ///
    /// # Errors
    ///
    /// Validation errors for a blank name, a negative or non-finite price or
    /// a non-positive credit count; `BackendUnavailable` while the backend is
    /// down; otherwise the outcome of the single POST.
    pub async fn create_package(&self, package: &PackageInput) -> GatewayResult<CreditPackage> {
        check_package(package)?;

        let request = self
            .request(Method::POST, "/packages", self.config().timeout())
            .json(package);
        self.write("create_package", request).await?.decode()
    }

    /// Replace a credit package
    ///
    /// # Errors
    ///
    /// As [`Gateway::create_package`], plus a validation error for a blank id.
    pub async fn update_package(
        &self,
        id: &str,
        package: &PackageInput,
    ) -> GatewayResult<CreditPackage> {
        require_identifier("id", id)?;
        check_package(package)?;

        let path = format!("/packages/{}", segment(id));
        let request = self
            .request(Method::PUT, &path, self.config().timeout())
            .json(package);
        self.write("update_package", request).await?.decode()
    }

    /// Delete a credit package
    ///
    /// # Errors
    ///
    /// Validation error for a blank id, `BackendUnavailable` while the
    /// backend is down, otherwise the outcome of the single DELETE.
    pub async fn delete_package(&self, id: &str) -> GatewayResult<Acknowledgement> {
        require_identifier("id", id)?;

        let path = format!("/packages/{}", segment(id));
        let request = self.request(Method::DELETE, &path, self.config().timeout());
        self.write("delete_package", request).await?.decode()
    }
}
