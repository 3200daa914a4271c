//! Bank account endpoints.

use crate::client::{BackofficeClient, path_segment};
use crate::error::Result;
use crate::types::DataEnvelope;
use crate::types::bank::BankAccount;

impl BackofficeClient {
    /// List the bank accounts registered against an investor.
    ///
    /// **Endpoint:** `GET /investors/{id}/bank-accounts`
    pub async fn get_bank_accounts(&self, investor_id: &str) -> Result<Vec<BankAccount>> {
        let env: DataEnvelope<Vec<BankAccount>> = self
            .get(&format!("/investors/{}/bank-accounts", path_segment(investor_id)))
            .await?;
        Ok(env.data)
    }
}
