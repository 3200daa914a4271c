//! Security reference endpoints: lookup by ISIN, create, update.

use crate::client::{BackofficeClient, path_segment};
use crate::error::Result;
use crate::types::DataEnvelope;
use crate::types::market_list::*;

impl BackofficeClient {
    /// Look up the reference entry for an ISIN.
    ///
    /// Always bypasses HTTP caches: a cached answer for a previous spelling
    /// would hide the entry for the corrected one. Returns `Ok(None)` on 404.
    ///
    /// **Endpoint:** `GET /market-list/by-isin/{isin}`
    pub async fn lookup_by_isin(&self, isin: &str) -> Result<Option<ReferenceEntry>> {
        let found: Option<DataEnvelope<ReferenceEntry>> = self
            .get_optional(&format!("/market-list/by-isin/{}", path_segment(isin)), true)
            .await?;
        Ok(found.map(|env| env.data))
    }

    /// Create a reference entry.
    ///
    /// **Endpoint:** `POST /market-list`
    pub async fn create_reference_entry(&self, req: &ReferenceEntryRequest) -> Result<ReferenceEntry> {
        let env: DataEnvelope<ReferenceEntry> = self.post("/market-list", req).await?;
        Ok(env.data)
    }

    /// Update an existing reference entry.
    ///
    /// **Endpoint:** `PUT /market-list/{id}`
    pub async fn update_reference_entry(
        &self,
        id: &str,
        req: &ReferenceEntryRequest,
    ) -> Result<ReferenceEntry> {
        let env: DataEnvelope<ReferenceEntry> = self
            .put(&format!("/market-list/{}", path_segment(id)), req)
            .await?;
        Ok(env.data)
    }
}
