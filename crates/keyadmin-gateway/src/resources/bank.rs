use crate::envelope::BankEnvelope;
use crate::error::GatewayResult;
use crate::fetched::Fetched;
use crate::gateway::Gateway;
use crate::validation::require_identifier;
use keyadmin_core::BankInfo;
use reqwest::Method;

impl Gateway {
    /// Bank details shown to customers, if configured
    pub async fn bank_info(&self) -> Fetched<Option<BankInfo>> {
        self.read(
            "bank_info",
            move || async move {
                let request = self.request(Method::GET, "/bank-info", self.config().timeout());
                let reply = self.dispatch("bank_info", request).await?;
                reply.decode::<BankEnvelope>()?.into_bank_info(reply.status)
            },
            |data| data.bank_info.clone(),
        )
        .await
    }

    /// Save the bank details
    ///
    /// Returns the stored details, or the submitted ones when the backend
    /// does not echo them.
    ///
    /// # Errors
    ///
    /// Validation errors for a blank bank name, account number or account
    /// name; `BackendUnavailable` while the backend is down; otherwise the
    /// outcome of the single POST.
    pub async fn update_bank_info(&self, info: &BankInfo) -> GatewayResult<BankInfo> {
        require_identifier("bankName", &info.bank_name)?;
        require_identifier("accountNumber", &info.account_number)?;
        require_identifier("accountName", &info.account_name)?;

        let request = self
            .request(Method::POST, "/bank-info", self.config().timeout())
            .json(info);
        let reply = self.write("update_bank_info", request).await?;
        let stored = reply.decode::<BankEnvelope>()?.into_bank_info(reply.status)?;
        Ok(stored.unwrap_or_else(|| info.clone()))
    }
}
