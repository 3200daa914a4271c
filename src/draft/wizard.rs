//! The onboarding wizard: a draft plus its derived validation state.
//!
//! Section status, field errors and the submission payload are all derived
//! from the current state on demand. The async helpers here only fetch;
//! every write goes through [`Wizard::dispatch`](super::DraftAction).

use std::collections::{BTreeMap, BTreeSet};

use futures_util::future::join_all;

use super::action::DraftAction;
use super::field::{Section, section_of};
use super::model::DraftApplication;
use super::submit::{assemble_payload, drawdown_applies, nominee_total};
use super::validate::{FieldErrors, validate};
use crate::config::WizardRules;
use crate::error::{OnboardError, Result};
use crate::gateway::{IdentityGateway, SubmissionGateway};
use crate::identity::{self, IdentityRole};
use crate::types::bank::BankAccount;
use crate::types::onboarding::{OnboardingPayload, OnboardingReceipt};

/// Lifecycle of the application as a whole.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitting,
    /// Terminal; the draft no longer accepts actions.
    Submitted { application_id: String },
}

/// Display state of one wizard section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionStatus {
    Untouched,
    Valid,
    Invalid,
}

/// Outcome of asking to navigate away from the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveDecision {
    /// Nothing would be lost.
    Leave,
    /// The draft has unsaved changes; call [`Wizard::confirm_leave`] to
    /// discard them or simply keep editing.
    ConfirmationRequired,
}

/// Identity of a holder row. Unlike its index it survives the removal of
/// an earlier holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HolderKey(u64);

/// An identity lookup to run for one holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityRequest {
    pub holder_index: usize,
    pub role: IdentityRole,
    pub unique_id: String,
}

#[derive(Debug, Clone)]
pub struct Wizard {
    pub(crate) draft: DraftApplication,
    pub(crate) rules: WizardRules,
    pub(crate) bank_accounts: Vec<BankAccount>,
    pub(crate) touched: BTreeSet<Section>,
    pub(crate) server_errors: BTreeMap<String, String>,
    pub(crate) notifications: Vec<String>,
    pub(crate) phase: Phase,
    pub(crate) closed: bool,
    /// Parallel to `draft.holders`.
    pub(crate) holder_keys: Vec<HolderKey>,
    next_holder_key: u64,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new(WizardRules::default())
    }
}

impl Wizard {
    pub fn new(rules: WizardRules) -> Self {
        let draft = DraftApplication::default();
        let holders = draft.holders.len() as u64;
        Self {
            draft,
            rules,
            bank_accounts: Vec::new(),
            touched: BTreeSet::new(),
            server_errors: BTreeMap::new(),
            notifications: Vec::new(),
            phase: Phase::Editing,
            closed: false,
            holder_keys: (0..holders).map(HolderKey).collect(),
            next_holder_key: holders,
        }
    }

    pub fn draft(&self) -> &DraftApplication {
        &self.draft
    }

    pub fn rules(&self) -> &WizardRules {
        &self.rules
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// Bank accounts of the resolved primary investor.
    pub fn bank_accounts(&self) -> &[BankAccount] {
        &self.bank_accounts
    }

    /// Generic messages from the last rejected submission.
    pub fn notifications(&self) -> &[String] {
        &self.notifications
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stable key of the holder currently at `index`.
    pub fn holder_key(&self, index: usize) -> Option<HolderKey> {
        self.holder_keys.get(index).copied()
    }

    /// Current index of the holder with `key`; `None` once it was removed.
    pub fn holder_index(&self, key: HolderKey) -> Option<usize> {
        self.holder_keys.iter().position(|k| *k == key)
    }

    pub(crate) fn push_holder_key(&mut self) {
        self.holder_keys.push(HolderKey(self.next_holder_key));
        self.next_holder_key += 1;
    }

    // -----------------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------------

    /// Client-side rule violations merged with server-reported errors.
    pub fn field_errors(&self) -> FieldErrors {
        let mut errors = validate(&self.draft, &self.rules);
        for (path, msg) in &self.server_errors {
            errors.entry(path.clone()).or_insert_with(|| msg.clone());
        }
        errors
    }

    pub fn section_status(&self, section: Section) -> SectionStatus {
        let errors = self.field_errors();
        self.status_from(&errors, section)
    }

    /// Status of every section, in wizard order.
    pub fn sections(&self) -> Vec<(Section, SectionStatus)> {
        let errors = self.field_errors();
        Section::ALL
            .iter()
            .map(|s| (*s, self.status_from(&errors, *s)))
            .collect()
    }

    fn status_from(&self, errors: &FieldErrors, section: Section) -> SectionStatus {
        let failing = errors.keys().any(|path| section_of(path) == Some(section));
        if !self.touched.contains(&section) {
            SectionStatus::Untouched
        } else if failing {
            SectionStatus::Invalid
        } else {
            SectionStatus::Valid
        }
    }

    /// Whether the drawdown step is shown for the selected product.
    pub fn drawdown_visible(&self) -> bool {
        drawdown_applies(&self.draft, &self.rules)
    }

    /// Nominee allocation entered so far.
    pub fn nominee_total(&self) -> rust_decimal::Decimal {
        nominee_total(&self.draft)
    }

    pub fn is_dirty(&self) -> bool {
        self.draft != DraftApplication::default()
    }

    pub(crate) fn touch_section(&mut self, section: Section) {
        self.touched.insert(section);
    }

    pub(crate) fn touch_path(&mut self, path: &str) {
        if let Some(section) = section_of(path) {
            self.touched.insert(section);
        }
    }

    // -----------------------------------------------------------------------
    // Navigation guard
    // -----------------------------------------------------------------------

    pub fn request_leave(&self) -> LeaveDecision {
        if self.closed || matches!(self.phase, Phase::Submitted { .. }) || !self.is_dirty() {
            LeaveDecision::Leave
        } else {
            LeaveDecision::ConfirmationRequired
        }
    }

    /// Abandon the draft. In-flight results dispatched afterwards are ignored.
    pub fn confirm_leave(&mut self) {
        tracing::info!(dirty = self.is_dirty(), "onboarding draft abandoned");
        self.closed = true;
    }

    // -----------------------------------------------------------------------
    // Identity
    // -----------------------------------------------------------------------

    /// The lookup that would resolve `holder_index`, if it has an identifier.
    pub fn identity_request(&self, holder_index: usize) -> Option<IdentityRequest> {
        let key = self.draft.identity_key(holder_index)?;
        if key.is_empty() {
            return None;
        }
        Some(IdentityRequest {
            holder_index,
            role: if holder_index == 0 {
                IdentityRole::Primary
            } else {
                IdentityRole::Secondary
            },
            unique_id: key.to_owned(),
        })
    }

    /// Resolve one holder and apply the outcome.
    ///
    /// Returns whether the result was applied. Transport errors leave the
    /// draft untouched.
    pub async fn resolve_holder<G>(&mut self, gateway: &G, holder_index: usize) -> Result<bool>
    where
        G: IdentityGateway + ?Sized,
    {
        let Some(req) = self.identity_request(holder_index) else {
            return Ok(false);
        };
        let outcome = identity::resolve(gateway, &req.unique_id, req.role).await?;
        Ok(self.dispatch(DraftAction::ResolveIdentity {
            holder_index: req.holder_index,
            role: req.role,
            unique_id: req.unique_id,
            outcome,
        }))
    }

    /// Resolve every holder that has an identifier, concurrently.
    ///
    /// Each lookup only writes to its own holder. Failed lookups are logged
    /// and skipped; the number of applied results is returned.
    pub async fn resolve_all<G>(&mut self, gateway: &G) -> usize
    where
        G: IdentityGateway + ?Sized,
    {
        let requests: Vec<IdentityRequest> = (0..self.draft.holders.len())
            .filter_map(|i| self.identity_request(i))
            .collect();

        let results = join_all(
            requests
                .iter()
                .map(|req| identity::resolve(gateway, &req.unique_id, req.role)),
        )
        .await;

        let mut applied = 0;
        for (req, result) in requests.into_iter().zip(results) {
            match result {
                Ok(outcome) => {
                    let ok = self.dispatch(DraftAction::ResolveIdentity {
                        holder_index: req.holder_index,
                        role: req.role,
                        unique_id: req.unique_id,
                        outcome,
                    });
                    applied += usize::from(ok);
                }
                Err(e) => tracing::warn!(holder_index = req.holder_index, error = %e, "identity lookup failed"),
            }
        }
        applied
    }

    /// Load the bank accounts of the resolved primary investor.
    pub async fn load_bank_accounts<G>(&mut self, gateway: &G) -> Result<usize>
    where
        G: IdentityGateway + ?Sized,
    {
        let Some(investor_id) = self.draft.customer_profile.investor_id.clone() else {
            return Ok(0);
        };
        let accounts = gateway.bank_accounts(&investor_id).await?;
        let count = accounts.len();
        self.dispatch(DraftAction::BankAccountsLoaded { investor_id, accounts });
        Ok(count)
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Mark every section touched and assemble the payload.
    pub fn prepare_submission(&mut self) -> Result<OnboardingPayload> {
        self.touched.extend(Section::ALL);
        let errors = self.field_errors();
        if !errors.is_empty() {
            return Err(OnboardError::Validation(errors.into_iter().collect()));
        }
        assemble_payload(&self.draft, &self.rules)
    }

    /// Validate, assemble and submit the application.
    ///
    /// A server rejection maps its field errors back onto the draft and is
    /// returned as [`OnboardError::SubmissionRejected`].
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<OnboardingReceipt>
    where
        G: SubmissionGateway + ?Sized,
    {
        if self.closed || self.phase != Phase::Editing {
            return Err(OnboardError::InvalidArgument("the application is not editable".into()));
        }
        let payload = self.prepare_submission()?;
        self.dispatch(DraftAction::SubmissionStarted);

        match gateway.submit(&payload).await {
            Ok(receipt) => {
                self.dispatch(DraftAction::SubmissionSucceeded(receipt.clone()));
                Ok(receipt)
            }
            Err(OnboardError::Api(body)) => {
                tracing::warn!(%body, "onboarding submission rejected");
                self.dispatch(DraftAction::SubmissionRejected(body.clone()));
                Err(OnboardError::SubmissionRejected(body))
            }
            Err(e) => {
                self.phase = Phase::Editing;
                Err(e)
            }
        }
    }
}
