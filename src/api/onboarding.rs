//! Onboarding submission endpoint.

use crate::client::BackofficeClient;
use crate::error::Result;
use crate::types::DataEnvelope;
use crate::types::onboarding::*;

impl BackofficeClient {
    /// Submit a complete onboarding application.
    ///
    /// **Endpoint:** `POST /onboarding`
    pub async fn submit_onboarding(&self, payload: &OnboardingPayload) -> Result<OnboardingReceipt> {
        let env: DataEnvelope<OnboardingReceipt> = self.post("/onboarding", payload).await?;
        Ok(env.data)
    }
}
