//! Draft actions and the transition function.
//!
//! Every change to a [`Wizard`]'s state goes through [`Wizard::dispatch`].
//! Actions carrying the result of a network call are checked against the
//! current state first; results for a holder whose identifier has changed
//! since the call started, or that arrive after teardown, are dropped.

use super::field::*;
use super::model::*;
use super::submit::map_rejection;
use super::wizard::{Phase, Wizard};
use crate::error::ApiErrorBody;
use crate::identity::{IdentityRole, PersonProfile, ResolvedIdentity};
use crate::types::bank::BankAccount;
use crate::types::enums::{DocumentType, HoldingMode};
use crate::types::kyc::UploadedDocument;
use crate::types::onboarding::OnboardingReceipt;

/// Every state transition of the onboarding wizard.
#[derive(Debug, Clone)]
pub enum DraftAction {
    /// Write a field; runs the cascade table for the path.
    SetField { path: String, value: FieldValue },
    /// Switch between `SINGLE` and `JOINT`; `SINGLE` keeps only the primary.
    SetHoldingMode(HoldingMode),
    /// Append a joint holder; no-op beyond the mode's limit.
    AddHolder,
    /// Remove a joint holder; the primary holder cannot be removed.
    RemoveHolder(usize),
    AddNominee,
    RemoveNominee(usize),
    /// Result of an identity lookup started for `unique_id`.
    ResolveIdentity {
        holder_index: usize,
        role: IdentityRole,
        unique_id: String,
        outcome: Option<ResolvedIdentity>,
    },
    /// Bank accounts listed for `investor_id`.
    BankAccountsLoaded {
        investor_id: String,
        accounts: Vec<BankAccount>,
    },
    /// Copy a listed bank account into the draft, or clear the selection.
    SelectBankAccount(Option<String>),
    /// Fill a KYC slot, replacing whatever document it held.
    AttachDocument {
        holder_index: usize,
        document_type: DocumentType,
        document: UploadedDocument,
    },
    DetachDocument {
        holder_index: usize,
        document_type: DocumentType,
    },
    /// The server refused a document for this slot.
    DocumentRejected {
        holder_index: usize,
        document_type: DocumentType,
        reason: String,
    },
    SubmissionStarted,
    SubmissionRejected(ApiErrorBody),
    SubmissionSucceeded(OnboardingReceipt),
}

pub(crate) fn slot_path(holder_index: usize, document_type: DocumentType) -> String {
    format!("kycDocuments.{holder_index}.{}", document_type.path_key())
}

impl Wizard {
    /// Apply an action. Returns `false` when the action was ignored.
    pub fn dispatch(&mut self, action: DraftAction) -> bool {
        if self.closed || matches!(self.phase, Phase::Submitted { .. }) {
            tracing::debug!(?action, "wizard closed, action ignored");
            return false;
        }

        match action {
            DraftAction::SetField { path, value } => self.set_field(&path, value),
            DraftAction::SetHoldingMode(mode) => self.set_holding_mode(mode),
            DraftAction::AddHolder => {
                if self.draft.holders.len() >= self.draft.holding_mode.max_holders() {
                    return false;
                }
                self.draft.holders.push(Holder::default());
                self.push_holder_key();
                self.touch_section(Section::Holders);
                true
            }
            DraftAction::RemoveHolder(index) => self.remove_holder(index),
            DraftAction::AddNominee => {
                self.draft.nominees.push(Nominee::default());
                self.touch_section(Section::Nominees);
                true
            }
            DraftAction::RemoveNominee(index) => {
                if index >= self.draft.nominees.len() {
                    return false;
                }
                self.draft.nominees.remove(index);
                self.server_errors.retain(|path, _| !path.starts_with("nominees"));
                self.touch_section(Section::Nominees);
                true
            }
            DraftAction::ResolveIdentity {
                holder_index,
                role,
                unique_id,
                outcome,
            } => self.resolve_identity(holder_index, role, &unique_id, outcome),
            DraftAction::BankAccountsLoaded { investor_id, accounts } => {
                if self.draft.customer_profile.investor_id.as_deref() != Some(investor_id.as_str()) {
                    tracing::debug!(%investor_id, "stale bank account listing ignored");
                    return false;
                }
                self.bank_accounts = accounts;
                true
            }
            DraftAction::SelectBankAccount(id) => self.select_bank_account(id),
            DraftAction::AttachDocument {
                holder_index,
                document_type,
                document,
            } => {
                if holder_index >= self.draft.holders.len() {
                    return false;
                }
                let replaced = self.draft.kyc_documents.insert((holder_index, document_type), document);
                if let Some(old) = replaced {
                    tracing::debug!(holder_index, %document_type, old = %old.id, "KYC slot replaced");
                }
                self.server_errors.remove(&slot_path(holder_index, document_type));
                self.touch_section(Section::Documents);
                true
            }
            DraftAction::DetachDocument {
                holder_index,
                document_type,
            } => {
                self.touch_section(Section::Documents);
                self.server_errors.remove(&slot_path(holder_index, document_type));
                self.draft.kyc_documents.remove(&(holder_index, document_type)).is_some()
            }
            DraftAction::DocumentRejected {
                holder_index,
                document_type,
                reason,
            } => {
                if holder_index >= self.draft.holders.len() {
                    return false;
                }
                self.server_errors.insert(slot_path(holder_index, document_type), reason);
                self.touch_section(Section::Documents);
                true
            }
            DraftAction::SubmissionStarted => {
                if self.phase != Phase::Editing {
                    return false;
                }
                self.phase = Phase::Submitting;
                self.notifications.clear();
                true
            }
            DraftAction::SubmissionRejected(body) => {
                let mapped = map_rejection(&body);
                self.notifications.extend(mapped.notifications);
                for (path, message) in mapped.field_errors {
                    // Only keep errors an edit can clear again.
                    if !self.clearable(&path) {
                        self.notifications.push(format!("{path}: {message}"));
                        continue;
                    }
                    self.touch_path(&path);
                    self.server_errors.insert(path, message);
                }
                self.phase = Phase::Editing;
                true
            }
            DraftAction::SubmissionSucceeded(receipt) => {
                tracing::info!(application_id = %receipt.id, "onboarding submitted");
                self.phase = Phase::Submitted {
                    application_id: receipt.id,
                };
                true
            }
        }
    }

    fn set_field(&mut self, path: &str, value: FieldValue) -> bool {
        let changed = match value {
            FieldValue::Text(text) => match self.draft.text_slot(path) {
                Some(slot) if *slot != text => {
                    *slot = text;
                    true
                }
                Some(_) => false,
                None => {
                    tracing::warn!(path, "unknown text field");
                    return false;
                }
            },
            FieldValue::Flag(flag) => match self.draft.flag_slot(path) {
                Some(slot) if *slot != flag => {
                    *slot = flag;
                    true
                }
                Some(_) => false,
                None => {
                    tracing::warn!(path, "unknown flag field");
                    return false;
                }
            },
        };

        self.touch_path(path);
        self.server_errors.remove(path);
        if !changed {
            return true;
        }

        for target in cascade_targets(path) {
            self.clear_field(target);
        }
        if path == PRODUCT_ID {
            let product = self.draft.investment.product_id.trim().to_owned();
            if !self.rules.requires_commitment(&product) {
                for target in COMMITMENT_FIELDS {
                    self.clear_field(target);
                }
            }
        }
        if path == "customerProfile.investorCode" {
            self.clear_investor_link();
        }
        true
    }

    /// Whether some action removes a server error reported at `path`.
    fn clearable(&mut self, path: &str) -> bool {
        if path == HOLDING_MODE || path.starts_with("bankAccount.") {
            return true;
        }
        if let ["kycDocuments", index, key] = path.split('.').collect::<Vec<_>>().as_slice() {
            return index.parse::<usize>().is_ok_and(|i| i < self.draft.holders.len())
                && DocumentType::ALL.iter().any(|t| t.path_key() == *key);
        }
        self.draft.text_slot(path).is_some() || self.draft.flag_slot(path).is_some()
    }

    fn clear_field(&mut self, path: &str) {
        if let Some(slot) = self.draft.text_slot(path) {
            slot.clear();
        }
        self.server_errors.remove(path);
    }

    fn set_holding_mode(&mut self, mode: HoldingMode) -> bool {
        self.draft.holding_mode = mode;
        self.server_errors.remove(HOLDING_MODE);
        let max = mode.max_holders();
        if self.draft.holders.len() > max {
            self.draft.holders.truncate(max);
            self.holder_keys.truncate(max);
            self.draft.kyc_documents.retain(|(holder, _), _| *holder < max);
            self.server_errors.retain(|path, _| !path.starts_with("holders") && !path.starts_with("kycDocuments"));
        }
        self.touch_section(Section::Holders);
        true
    }

    fn remove_holder(&mut self, index: usize) -> bool {
        if index == 0 || index >= self.draft.holders.len() {
            return false;
        }
        self.draft.holders.remove(index);
        self.holder_keys.remove(index);

        let docs = std::mem::take(&mut self.draft.kyc_documents);
        self.draft.kyc_documents = docs
            .into_iter()
            .filter(|((holder, _), _)| *holder != index)
            .map(|((holder, ty), doc)| ((if holder > index { holder - 1 } else { holder }, ty), doc))
            .collect();

        self.server_errors.retain(|path, _| !path.starts_with("holders") && !path.starts_with("kycDocuments"));
        self.touch_section(Section::Holders);
        true
    }

    fn resolve_identity(
        &mut self,
        holder_index: usize,
        role: IdentityRole,
        unique_id: &str,
        outcome: Option<ResolvedIdentity>,
    ) -> bool {
        if role == IdentityRole::Primary && holder_index != 0 {
            return false;
        }
        let current = match role {
            IdentityRole::Primary => Some(self.draft.customer_profile.investor_code.trim()),
            IdentityRole::Secondary => self.draft.holders.get(holder_index).map(|h| h.pan.trim()),
        };
        if !current.is_some_and(|key| key.eq_ignore_ascii_case(unique_id.trim())) {
            tracing::debug!(holder_index, unique_id, "stale identity result ignored");
            return false;
        }

        let Some(resolved) = outcome else {
            if role == IdentityRole::Primary {
                self.clear_investor_link();
            }
            return true;
        };

        if let Some(holder) = self.draft.holders.get_mut(holder_index) {
            apply_person(holder, resolved.person);
        }
        if let (IdentityRole::Primary, Some(link)) = (role, resolved.investor) {
            let cp = &mut self.draft.customer_profile;
            if cp.investor_id.as_deref() != Some(link.investor_id.as_str()) {
                self.bank_accounts.clear();
                self.draft.bank.bank_account_id = None;
            }
            cp.investor_id = Some(link.investor_id);
            fill(&mut cp.residential_status, link.residential_status);
            fill(&mut cp.sub_status, link.sub_status);
            self.touch_section(Section::CustomerProfile);
        }
        self.touch_section(Section::Holders);
        true
    }

    /// Drop everything tied to the previously resolved investor.
    fn clear_investor_link(&mut self) {
        self.draft.customer_profile.investor_id = None;
        self.draft.bank.bank_account_id = None;
        self.bank_accounts.clear();
    }

    fn select_bank_account(&mut self, id: Option<String>) -> bool {
        self.touch_section(Section::BankDemat);
        let Some(id) = id else {
            self.draft.bank = BankSnapshot::default();
            return true;
        };
        let Some(account) = self.bank_accounts.iter().find(|a| a.id == id) else {
            tracing::warn!(%id, "selected bank account is not in the loaded list");
            return false;
        };
        self.draft.bank = BankSnapshot {
            bank_account_id: Some(account.id.clone()),
            bank_name: account.bank_name.clone(),
            account_number: account.account_number.clone(),
            ifsc_code: account.ifsc_code.clone(),
            account_type: account.account_type,
        };
        self.server_errors.retain(|path, _| !path.starts_with("bankAccount"));
        true
    }
}

fn fill(slot: &mut String, value: Option<String>) {
    if let Some(v) = value {
        *slot = v;
    }
}

/// Copy the resolved person onto a holder without erasing what the
/// record does not carry. The minor flag is only ever raised here.
fn apply_person(holder: &mut Holder, person: PersonProfile) {
    fill(&mut holder.name, person.name);
    fill(&mut holder.pan, person.pan);
    fill(&mut holder.dob, person.dob);
    fill(&mut holder.gender, person.gender.map(|g| g.as_str().to_owned()));
    fill(&mut holder.email, person.email);
    fill(&mut holder.mobile, person.mobile);

    if let Some(a) = person.address {
        let addr = &mut holder.address;
        fill(&mut addr.line1, a.line1);
        fill(&mut addr.line2, a.line2);
        fill(&mut addr.city, a.city);
        fill(&mut addr.state, a.state);
        fill(&mut addr.pincode, a.pincode);
        fill(&mut addr.country, a.country);
    }

    if person.is_minor {
        holder.is_minor = true;
        if let Some(g) = person.guardian {
            let guardian = &mut holder.guardian;
            fill(&mut guardian.name, g.name);
            fill(&mut guardian.pan, g.pan);
            fill(&mut guardian.relationship, g.relationship);
            fill(&mut guardian.dob, g.dob);
            fill(&mut guardian.mobile, g.mobile);
        }
    }
}
