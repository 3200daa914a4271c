//! Identity endpoints: investor by unique code, holder by PAN.

use crate::client::{BackofficeClient, path_segment};
use crate::error::Result;
use crate::types::DataEnvelope;
use crate::types::investor::*;

impl BackofficeClient {
    /// Look up an investor by its unique code.
    ///
    /// Returns `Ok(None)` when no investor carries the code.
    ///
    /// **Endpoint:** `GET /investors/by-unique-id/{code}`
    pub async fn get_investor_by_unique_id(&self, code: &str) -> Result<Option<InvestorRecord>> {
        let found: Option<DataEnvelope<InvestorRecord>> = self
            .get_optional(&format!("/investors/by-unique-id/{}", path_segment(code)), false)
            .await?;
        Ok(found.map(|env| env.data))
    }

    /// Look up a holder by PAN.
    ///
    /// Returns `Ok(None)` when no holder carries the PAN.
    ///
    /// **Endpoint:** `GET /holders/by-pan/{pan}`
    pub async fn get_holder_by_pan(&self, pan: &str) -> Result<Option<PersonSnapshot>> {
        let found: Option<DataEnvelope<PersonSnapshot>> = self
            .get_optional(&format!("/holders/by-pan/{}", path_segment(pan)), false)
            .await?;
        Ok(found.map(|env| env.data))
    }
}
