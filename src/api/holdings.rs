//! Holdings endpoints: snapshot, in-place update, bulk create.

use chrono::NaiveDate;

use crate::client::{BackofficeClient, path_segment};
use crate::constants::DATE_FORMAT;
use crate::error::Result;
use crate::types::DataEnvelope;
use crate::types::holdings::*;

impl BackofficeClient {
    /// Retrieve an investment's holdings as on a date.
    ///
    /// **Endpoint:** `GET /investments/{id}/holdings?asOnDate={date}`
    pub async fn get_holdings(&self, investment_id: &str, as_on: NaiveDate) -> Result<HoldingsSnapshot> {
        let env: DataEnvelope<HoldingsSnapshot> = self
            .get(&format!(
                "/investments/{}/holdings?asOnDate={}",
                path_segment(investment_id),
                as_on.format(DATE_FORMAT)
            ))
            .await?;
        Ok(env.data)
    }

    /// Update existing holdings in place.
    ///
    /// **Endpoint:** `PUT /investments/{id}/holdings`
    pub async fn update_holdings(
        &self,
        investment_id: &str,
        req: &UpdateHoldingsRequest,
    ) -> Result<Vec<Holding>> {
        let env: DataEnvelope<Vec<Holding>> = self
            .put(&format!("/investments/{}/holdings", path_segment(investment_id)), req)
            .await?;
        Ok(env.data)
    }

    /// Create newly staged holdings.
    ///
    /// **Endpoint:** `POST /investments/{id}/holdings/bulk`
    pub async fn bulk_create_holdings(
        &self,
        investment_id: &str,
        req: &BulkCreateHoldingsRequest,
    ) -> Result<Vec<Holding>> {
        let env: DataEnvelope<Vec<Holding>> = self
            .post(&format!("/investments/{}/holdings/bulk", path_segment(investment_id)), req)
            .await?;
        Ok(env.data)
    }
}
