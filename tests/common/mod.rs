//! In-memory back office shared by the integration tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;

use wealth_onboard::error::{ApiErrorBody, FieldErrorBody, OnboardError, Result};
use wealth_onboard::gateway::*;
use wealth_onboard::types::bank::BankAccount;
use wealth_onboard::types::holdings::*;
use wealth_onboard::types::investor::{AddressRecord, InvestorRecord, PersonSnapshot};
use wealth_onboard::types::kyc::*;
use wealth_onboard::types::market_list::{ReferenceEntry, ReferenceEntryRequest};
use wealth_onboard::types::onboarding::{OnboardingPayload, OnboardingReceipt};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn dec(raw: &str) -> Decimal {
    raw.parse().unwrap()
}

pub fn person(name: &str, pan: &str) -> PersonSnapshot {
    PersonSnapshot {
        id: Some(format!("person-{pan}")),
        name: Some(name.to_owned()),
        pan: Some(pan.to_owned()),
        dob: Some("1985-04-12".to_owned()),
        gender: Some("M".to_owned()),
        email: Some(format!("{}@example.com", name.to_lowercase().replace(' ', "."))),
        mobile: Some("9876543210".to_owned()),
        addresses: vec![AddressRecord {
            line1: Some("12 MG Road".to_owned()),
            line2: None,
            city: Some("Bengaluru".to_owned()),
            state: Some("Karnataka".to_owned()),
            pincode: Some("560001".to_owned()),
            country: Some("India".to_owned()),
        }],
        ..Default::default()
    }
}

pub fn investor(id: &str, primary: PersonSnapshot) -> InvestorRecord {
    InvestorRecord {
        id: id.to_owned(),
        residential_status: Some("RESIDENT".to_owned()),
        sub_status: Some("INDIVIDUAL".to_owned()),
        myalt_code: Some(format!("MYALT-{id}")),
        primary_person: Some(primary),
    }
}

pub fn reference(id: &str, isin: &str, company: &str) -> ReferenceEntry {
    ReferenceEntry {
        id: id.to_owned(),
        isin: isin.to_owned(),
        company_name: Some(company.to_owned()),
        sector: Some("Energy".to_owned()),
        category_id: Some("LARGE_CAP".to_owned()),
        category: Some("Large Cap".to_owned()),
    }
}

pub fn holding(id: &str, isin: &str, weightage: &str) -> Holding {
    Holding {
        holding_id: id.to_owned(),
        isin_code: isin.to_owned(),
        security_type: None,
        portfolio_weightage: Some(dec(weightage)),
        market_list_id: Some(format!("ml-{isin}")),
        company_name: None,
        sector: None,
        category: None,
    }
}

pub fn kyc_file(name: &str) -> KycFile {
    KycFile {
        file_name: name.to_owned(),
        mime_type: Some("application/pdf".to_owned()),
        content: bytes::Bytes::from_static(b"%PDF-1.4"),
    }
}

pub fn rejection(errors: &[(&str, &str)]) -> ApiErrorBody {
    ApiErrorBody {
        code: Some("VALIDATION_FAILED".to_owned()),
        message: Some("Validation failed".to_owned()),
        errors: errors
            .iter()
            .map(|(field, message)| FieldErrorBody {
                field: (*field).to_owned(),
                message: (*message).to_owned(),
            })
            .collect(),
    }
}

/// Records every call and answers from in-memory tables.
#[derive(Default)]
pub struct FakeBackoffice {
    pub investors: Mutex<HashMap<String, InvestorRecord>>,
    pub persons: Mutex<HashMap<String, PersonSnapshot>>,
    pub bank_accounts: Mutex<HashMap<String, Vec<BankAccount>>>,
    pub references: Mutex<HashMap<String, ReferenceEntry>>,
    pub snapshots: Mutex<HashMap<String, HoldingsSnapshot>>,
    /// File names the KYC endpoint refuses.
    pub rejected_files: Mutex<HashSet<String>>,
    /// File names a batch response leaves out entirely.
    pub unanswered_files: Mutex<HashSet<String>>,
    pub submit_rejection: Mutex<Option<ApiErrorBody>>,
    pub fail_transport: Mutex<bool>,

    pub identity_calls: Mutex<Vec<String>>,
    pub lookups: Mutex<Vec<String>>,
    pub reference_writes: Mutex<Vec<(Option<String>, ReferenceEntryRequest)>>,
    pub updates: Mutex<Vec<UpdateHoldingsRequest>>,
    pub creates: Mutex<Vec<BulkCreateHoldingsRequest>>,
    pub kyc_batches: Mutex<Vec<Vec<(usize, String)>>>,
    pub submissions: Mutex<Vec<OnboardingPayload>>,
    next_id: AtomicUsize,
}

impl FakeBackoffice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_investor(self, code: &str, record: InvestorRecord) -> Self {
        self.investors.lock().unwrap().insert(code.to_owned(), record);
        self
    }

    pub fn with_person(self, person: PersonSnapshot) -> Self {
        let pan = person.pan.clone().unwrap_or_default();
        self.persons.lock().unwrap().insert(pan, person);
        self
    }

    pub fn with_reference(self, entry: ReferenceEntry) -> Self {
        self.references.lock().unwrap().insert(entry.isin.clone(), entry);
        self
    }

    pub fn with_bank_accounts(self, investor_id: &str, accounts: Vec<BankAccount>) -> Self {
        self.bank_accounts.lock().unwrap().insert(investor_id.to_owned(), accounts);
        self
    }

    pub fn reject_file(&self, name: &str) {
        self.rejected_files.lock().unwrap().insert(name.to_owned());
    }

    pub fn accept_all_files(&self) {
        self.rejected_files.lock().unwrap().clear();
    }

    fn next(&self, prefix: &str) -> String {
        format!("{prefix}-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn transport(&self) -> Result<()> {
        if *self.fail_transport.lock().unwrap() {
            return Err(OnboardError::HttpStatus {
                status: reqwest::StatusCode::BAD_GATEWAY,
                body: "upstream unavailable".to_owned(),
            });
        }
        Ok(())
    }

    fn saved(&self, holding_id: Option<String>, isin: &str, weightage: Option<Decimal>, market_list_id: Option<String>) -> Holding {
        Holding {
            holding_id: holding_id.unwrap_or_else(|| self.next("holding")),
            isin_code: isin.to_owned(),
            security_type: None,
            portfolio_weightage: weightage,
            market_list_id,
            company_name: None,
            sector: None,
            category: None,
        }
    }
}

#[async_trait]
impl IdentityGateway for FakeBackoffice {
    async fn investor_by_code(&self, code: &str) -> Result<Option<InvestorRecord>> {
        self.transport()?;
        self.identity_calls.lock().unwrap().push(code.to_owned());
        Ok(self.investors.lock().unwrap().get(code).cloned())
    }

    async fn holder_by_pan(&self, pan: &str) -> Result<Option<PersonSnapshot>> {
        self.transport()?;
        self.identity_calls.lock().unwrap().push(pan.to_owned());
        Ok(self.persons.lock().unwrap().get(pan).cloned())
    }

    async fn bank_accounts(&self, investor_id: &str) -> Result<Vec<BankAccount>> {
        self.transport()?;
        Ok(self
            .bank_accounts
            .lock()
            .unwrap()
            .get(investor_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl ReferenceGateway for FakeBackoffice {
    async fn lookup_by_isin(&self, isin: &str) -> Result<Option<ReferenceEntry>> {
        self.lookups.lock().unwrap().push(isin.to_owned());
        self.transport()?;
        Ok(self.references.lock().unwrap().get(isin).cloned())
    }

    async fn create_reference(&self, req: &ReferenceEntryRequest) -> Result<ReferenceEntry> {
        self.transport()?;
        self.reference_writes.lock().unwrap().push((None, req.clone()));
        let entry = ReferenceEntry {
            id: self.next("ml"),
            isin: req.isin.clone(),
            company_name: Some(req.company_name.clone()),
            sector: req.sector.clone(),
            category_id: req.category_id.clone(),
            category: None,
        };
        self.references.lock().unwrap().insert(entry.isin.clone(), entry.clone());
        Ok(entry)
    }

    async fn update_reference(&self, id: &str, req: &ReferenceEntryRequest) -> Result<ReferenceEntry> {
        self.transport()?;
        self.reference_writes
            .lock()
            .unwrap()
            .push((Some(id.to_owned()), req.clone()));
        let entry = ReferenceEntry {
            id: id.to_owned(),
            isin: req.isin.clone(),
            company_name: Some(req.company_name.clone()),
            sector: req.sector.clone(),
            category_id: req.category_id.clone(),
            category: None,
        };
        self.references.lock().unwrap().insert(entry.isin.clone(), entry.clone());
        Ok(entry)
    }
}

#[async_trait]
impl HoldingsGateway for FakeBackoffice {
    async fn holdings_snapshot(&self, investment_id: &str, as_on: NaiveDate) -> Result<HoldingsSnapshot> {
        self.transport()?;
        Ok(self
            .snapshots
            .lock()
            .unwrap()
            .get(investment_id)
            .cloned()
            .unwrap_or(HoldingsSnapshot {
                holdings_as_on_date: Some(as_on),
                holdings: Vec::new(),
            }))
    }

    async fn update_holdings(&self, _investment_id: &str, req: &UpdateHoldingsRequest) -> Result<Vec<Holding>> {
        self.transport()?;
        self.updates.lock().unwrap().push(req.clone());
        Ok(req
            .holdings
            .iter()
            .map(|u| {
                self.saved(
                    Some(u.holding_id.clone()),
                    u.isin_code.as_deref().unwrap_or_default(),
                    u.portfolio_weightage,
                    u.market_list_id.clone(),
                )
            })
            .collect())
    }

    async fn bulk_create_holdings(
        &self,
        _investment_id: &str,
        req: &BulkCreateHoldingsRequest,
    ) -> Result<Vec<Holding>> {
        self.transport()?;
        self.creates.lock().unwrap().push(req.clone());
        Ok(req
            .holdings
            .iter()
            .map(|h| {
                self.saved(
                    None,
                    &h.isin_code,
                    Some(h.portfolio_weightage),
                    Some(h.market_list_id.clone()),
                )
            })
            .collect())
    }
}

#[async_trait]
impl KycGateway for FakeBackoffice {
    async fn upload_single(&self, item: &KycUploadItem) -> Result<UploadedDocument> {
        self.transport()?;
        if self.rejected_files.lock().unwrap().contains(&item.file.file_name) {
            return Err(OnboardError::Api(ApiErrorBody {
                code: Some("UNREADABLE".to_owned()),
                message: Some("file could not be read".to_owned()),
                errors: Vec::new(),
            }));
        }
        Ok(UploadedDocument {
            id: self.next("doc"),
            document_type: item.document_type.as_server_str().to_owned(),
            person_pan: Some(item.person_pan.clone()),
            holder_index: Some(item.holder_index),
            file_name: Some(item.file.file_name.clone()),
            url: None,
        })
    }

    async fn upload_batch(&self, items: &[KycUploadItem]) -> Result<KycBatchResponse> {
        self.transport()?;
        self.kyc_batches.lock().unwrap().push(
            items
                .iter()
                .map(|i| (i.holder_index, i.document_type.as_server_str().to_owned()))
                .collect(),
        );

        let rejected = self.rejected_files.lock().unwrap().clone();
        let unanswered = self.unanswered_files.lock().unwrap().clone();
        let mut response = KycBatchResponse::default();
        for item in items {
            if unanswered.contains(&item.file.file_name) {
                continue;
            }
            if rejected.contains(&item.file.file_name) {
                response.failed_documents.push(FailedDocument {
                    document_type: item.document_type.as_server_str().to_owned(),
                    person_pan: Some(item.person_pan.clone()),
                    holder_index: None,
                    error: "file could not be read".to_owned(),
                });
            } else {
                response.uploaded_documents.push(UploadedDocument {
                    id: self.next("doc"),
                    document_type: item.document_type.as_server_str().to_owned(),
                    person_pan: Some(item.person_pan.clone()),
                    holder_index: Some(item.holder_index),
                    file_name: Some(item.file.file_name.clone()),
                    url: None,
                });
            }
        }
        Ok(response)
    }
}

#[async_trait]
impl SubmissionGateway for FakeBackoffice {
    async fn submit(&self, payload: &OnboardingPayload) -> Result<OnboardingReceipt> {
        self.transport()?;
        self.submissions.lock().unwrap().push(payload.clone());
        if let Some(body) = self.submit_rejection.lock().unwrap().clone() {
            return Err(OnboardError::Api(body));
        }
        Ok(OnboardingReceipt {
            id: self.next("application"),
            investment_id: Some(self.next("investment")),
            status: Some("SUBMITTED".to_owned()),
        })
    }
}
