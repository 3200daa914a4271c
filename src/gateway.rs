//! Network seams of the onboarding core.
//!
//! Every component that talks to the server does so through one of these
//! traits. [`BackofficeClient`] implements all of them; tests substitute
//! in-memory fakes.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::client::BackofficeClient;
use crate::error::Result;
use crate::types::bank::BankAccount;
use crate::types::holdings::{BulkCreateHoldingsRequest, Holding, HoldingsSnapshot, UpdateHoldingsRequest};
use crate::types::investor::{InvestorRecord, PersonSnapshot};
use crate::types::kyc::{KycBatchResponse, KycUploadItem, UploadedDocument};
use crate::types::market_list::{ReferenceEntry, ReferenceEntryRequest};
use crate::types::onboarding::{OnboardingPayload, OnboardingReceipt};

/// Party lookups used by the identity resolver.
#[async_trait]
pub trait IdentityGateway: Send + Sync {
    async fn investor_by_code(&self, code: &str) -> Result<Option<InvestorRecord>>;
    async fn holder_by_pan(&self, pan: &str) -> Result<Option<PersonSnapshot>>;
    async fn bank_accounts(&self, investor_id: &str) -> Result<Vec<BankAccount>>;
}

/// Security reference ("market list") access used by the linker.
#[async_trait]
pub trait ReferenceGateway: Send + Sync {
    /// Must not be answered from a cache.
    async fn lookup_by_isin(&self, isin: &str) -> Result<Option<ReferenceEntry>>;
    async fn create_reference(&self, req: &ReferenceEntryRequest) -> Result<ReferenceEntry>;
    async fn update_reference(&self, id: &str, req: &ReferenceEntryRequest) -> Result<ReferenceEntry>;
}

/// Holdings persistence used by the editor's two save operations.
#[async_trait]
pub trait HoldingsGateway: Send + Sync {
    async fn holdings_snapshot(&self, investment_id: &str, as_on: NaiveDate) -> Result<HoldingsSnapshot>;
    async fn update_holdings(&self, investment_id: &str, req: &UpdateHoldingsRequest) -> Result<Vec<Holding>>;
    async fn bulk_create_holdings(
        &self,
        investment_id: &str,
        req: &BulkCreateHoldingsRequest,
    ) -> Result<Vec<Holding>>;
}

/// Document upload used by the KYC intake.
#[async_trait]
pub trait KycGateway: Send + Sync {
    async fn upload_single(&self, item: &KycUploadItem) -> Result<UploadedDocument>;
    async fn upload_batch(&self, items: &[KycUploadItem]) -> Result<KycBatchResponse>;
}

/// Final application submission.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    async fn submit(&self, payload: &OnboardingPayload) -> Result<OnboardingReceipt>;
}

// ---------------------------------------------------------------------------
// BackofficeClient
// ---------------------------------------------------------------------------

#[async_trait]
impl IdentityGateway for BackofficeClient {
    async fn investor_by_code(&self, code: &str) -> Result<Option<InvestorRecord>> {
        self.get_investor_by_unique_id(code).await
    }

    async fn holder_by_pan(&self, pan: &str) -> Result<Option<PersonSnapshot>> {
        self.get_holder_by_pan(pan).await
    }

    async fn bank_accounts(&self, investor_id: &str) -> Result<Vec<BankAccount>> {
        self.get_bank_accounts(investor_id).await
    }
}

#[async_trait]
impl ReferenceGateway for BackofficeClient {
    async fn lookup_by_isin(&self, isin: &str) -> Result<Option<ReferenceEntry>> {
        BackofficeClient::lookup_by_isin(self, isin).await
    }

    async fn create_reference(&self, req: &ReferenceEntryRequest) -> Result<ReferenceEntry> {
        self.create_reference_entry(req).await
    }

    async fn update_reference(&self, id: &str, req: &ReferenceEntryRequest) -> Result<ReferenceEntry> {
        self.update_reference_entry(id, req).await
    }
}

#[async_trait]
impl HoldingsGateway for BackofficeClient {
    async fn holdings_snapshot(&self, investment_id: &str, as_on: NaiveDate) -> Result<HoldingsSnapshot> {
        self.get_holdings(investment_id, as_on).await
    }

    async fn update_holdings(&self, investment_id: &str, req: &UpdateHoldingsRequest) -> Result<Vec<Holding>> {
        BackofficeClient::update_holdings(self, investment_id, req).await
    }

    async fn bulk_create_holdings(
        &self,
        investment_id: &str,
        req: &BulkCreateHoldingsRequest,
    ) -> Result<Vec<Holding>> {
        BackofficeClient::bulk_create_holdings(self, investment_id, req).await
    }
}

#[async_trait]
impl KycGateway for BackofficeClient {
    async fn upload_single(&self, item: &KycUploadItem) -> Result<UploadedDocument> {
        self.upload_kyc(item).await
    }

    async fn upload_batch(&self, items: &[KycUploadItem]) -> Result<KycBatchResponse> {
        self.upload_kyc_batch(items).await
    }
}

#[async_trait]
impl SubmissionGateway for BackofficeClient {
    async fn submit(&self, payload: &OnboardingPayload) -> Result<OnboardingReceipt> {
        self.submit_onboarding(payload).await
    }
}
