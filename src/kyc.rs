//! KYC document intake.
//!
//! Files are staged per holder and document type. An upload sends
//! every staged file in one batch; accepted documents fill their slot in the
//! draft and leave the staging area, rejected ones stay staged with the
//! server's reason so that a retry re-sends only those.

use std::collections::BTreeMap;

use crate::draft::model::SlotKey;
use crate::draft::{DraftAction, HolderKey, Wizard};
use crate::error::{OnboardError, Result};
use crate::gateway::KycGateway;
use crate::types::enums::DocumentType;
use crate::types::kyc::*;

/// Result of one batch upload, attributed to slots.
#[derive(Debug, Clone, Default)]
pub struct KycBatchOutcome {
    pub total: usize,
    pub attached: Vec<(SlotKey, UploadedDocument)>,
    /// Rejections that could be matched to a slot sent in this batch.
    pub rejected: Vec<(SlotKey, String)>,
    pub failed: Vec<FailedDocument>,
}

impl KycBatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Fails with [`OnboardError::PartialBatchFailure`] if anything was rejected.
    pub fn into_result(self) -> Result<Vec<(SlotKey, UploadedDocument)>> {
        if self.failed.is_empty() {
            Ok(self.attached)
        } else {
            Err(OnboardError::PartialBatchFailure {
                total: self.total,
                failed: self.failed,
            })
        }
    }
}

type StagedKey = (HolderKey, DocumentType);

/// Files waiting for upload, held against the holder they were staged for.
///
/// Slots are addressed by holder index at the API, but stored by
/// [`HolderKey`], so removing an earlier holder never moves a file onto
/// someone else.
#[derive(Debug, Clone, Default)]
pub struct KycIntake {
    staged: BTreeMap<StagedKey, KycFile>,
    failures: BTreeMap<StagedKey, String>,
}

impl KycIntake {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(wizard: &Wizard, holder_index: usize, document_type: DocumentType) -> Result<StagedKey> {
        wizard
            .holder_key(holder_index)
            .map(|k| (k, document_type))
            .ok_or_else(|| OnboardError::InvalidArgument(format!("no holder at index {holder_index}")))
    }

    /// Stage a file for a slot, replacing any file already staged there.
    pub fn stage(
        &mut self,
        wizard: &Wizard,
        holder_index: usize,
        document_type: DocumentType,
        file: KycFile,
    ) -> Result<Option<KycFile>> {
        let key = Self::key(wizard, holder_index, document_type)?;
        self.failures.remove(&key);
        Ok(self.staged.insert(key, file))
    }

    pub fn unstage(&mut self, wizard: &Wizard, holder_index: usize, document_type: DocumentType) -> Option<KycFile> {
        let key = Self::key(wizard, holder_index, document_type).ok()?;
        self.failures.remove(&key);
        self.staged.remove(&key)
    }

    /// Staged files by their holder's current slot. Files of removed
    /// holders are skipped.
    pub fn staged<'a>(&'a self, wizard: &'a Wizard) -> impl Iterator<Item = (SlotKey, &'a KycFile)> + 'a {
        self.staged
            .iter()
            .filter_map(move |((key, ty), file)| Some(((wizard.holder_index(*key)?, *ty), file)))
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    /// Reason of the last rejection of a slot still staged.
    pub fn failure(&self, wizard: &Wizard, holder_index: usize, document_type: DocumentType) -> Option<&str> {
        let key = Self::key(wizard, holder_index, document_type).ok()?;
        self.failures.get(&key).map(String::as_str)
    }

    /// Drop files staged for holders that are no longer in the draft.
    pub fn prune(&mut self, wizard: &Wizard) -> usize {
        let before = self.staged.len();
        self.staged.retain(|(key, _), _| wizard.holder_index(*key).is_some());
        self.failures.retain(|(key, _), _| wizard.holder_index(*key).is_some());
        let dropped = before - self.staged.len();
        if dropped > 0 {
            tracing::debug!(dropped, "staged KYC files of removed holders dropped");
        }
        dropped
    }

    /// Build upload items for every staged slot.
    ///
    /// Every item is attributed to the PAN of the holder its file was staged
    /// for. If any such holder lacks one the whole batch is refused before
    /// anything is sent.
    pub fn build_batch(&self, wizard: &Wizard) -> Result<Vec<KycUploadItem>> {
        let mut missing = Vec::new();
        let mut items = Vec::with_capacity(self.staged.len());

        for ((holder_index, document_type), file) in self.staged(wizard) {
            let holder = wizard.draft().holders.get(holder_index);
            let pan = holder.map(|h| h.pan.trim().to_ascii_uppercase()).unwrap_or_default();
            if pan.is_empty() {
                missing.push((
                    crate::draft::action::slot_path(holder_index, document_type),
                    "holder PAN is required before upload".to_owned(),
                ));
                continue;
            }
            items.push(KycUploadItem {
                holder_index,
                document_type,
                person_pan: pan,
                person_name: holder.map(|h| h.name.trim().to_owned()).filter(|n| !n.is_empty()),
                file: file.clone(),
            });
        }

        if !missing.is_empty() {
            return Err(OnboardError::Validation(missing));
        }
        Ok(items)
    }

    /// Attribute a batch response to the slots that were sent.
    ///
    /// Documents are matched by holder index when the server echoes it, and
    /// otherwise by PAN and normalized document type. Accepted slots leave
    /// the staging area; rejected ones stay.
    pub fn reconcile(&mut self, wizard: &Wizard, items: &[KycUploadItem], response: KycBatchResponse) -> KycBatchOutcome {
        let mut pending: Vec<SlotKey> = items.iter().map(|i| (i.holder_index, i.document_type)).collect();
        let mut outcome = KycBatchOutcome {
            total: items.len(),
            ..Default::default()
        };

        for document in response.uploaded_documents {
            match take_slot(&mut pending, items, document.holder_index, document.person_pan.as_deref(), &document.document_type) {
                Some(slot) => {
                    if let Ok(key) = Self::key(wizard, slot.0, slot.1) {
                        self.staged.remove(&key);
                        self.failures.remove(&key);
                    }
                    outcome.attached.push((slot, document));
                }
                None => tracing::warn!(document_id = %document.id, document_type = %document.document_type, "uploaded document matches no staged slot"),
            }
        }

        for failed in response.failed_documents {
            match take_slot(&mut pending, items, failed.holder_index, failed.person_pan.as_deref(), &failed.document_type) {
                Some(slot) => {
                    if let Ok(key) = Self::key(wizard, slot.0, slot.1) {
                        self.failures.insert(key, failed.error.clone());
                    }
                    outcome.rejected.push((slot, failed.error.clone()));
                }
                None => tracing::warn!(document_type = %failed.document_type, error = %failed.error, "failed document matches no staged slot"),
            }
            outcome.failed.push(failed);
        }

        tracing::info!(
            total = outcome.total,
            uploaded = outcome.attached.len(),
            failed = outcome.failed.len(),
            "KYC batch reconciled"
        );
        outcome
    }

    /// Upload every staged document and apply the outcome to the draft.
    ///
    /// Returns the outcome even when some documents were rejected; use
    /// [`KycBatchOutcome::into_result`] to treat that as an error.
    pub async fn upload<G>(&mut self, wizard: &mut Wizard, gateway: &G) -> Result<KycBatchOutcome>
    where
        G: KycGateway + ?Sized,
    {
        self.prune(wizard);
        let items = self.build_batch(wizard)?;
        if items.is_empty() {
            return Ok(KycBatchOutcome::default());
        }

        let response = gateway.upload_batch(&items).await?;
        let outcome = self.reconcile(wizard, &items, response);

        for ((holder_index, document_type), document) in &outcome.attached {
            wizard.dispatch(DraftAction::AttachDocument {
                holder_index: *holder_index,
                document_type: *document_type,
                document: document.clone(),
            });
        }
        for ((holder_index, document_type), reason) in &outcome.rejected {
            wizard.dispatch(DraftAction::DocumentRejected {
                holder_index: *holder_index,
                document_type: *document_type,
                reason: reason.clone(),
            });
        }
        Ok(outcome)
    }

    /// Upload the document staged for one slot on its own.
    pub async fn upload_slot<G>(
        &mut self,
        wizard: &mut Wizard,
        gateway: &G,
        holder_index: usize,
        document_type: DocumentType,
    ) -> Result<UploadedDocument>
    where
        G: KycGateway + ?Sized,
    {
        let key = Self::key(wizard, holder_index, document_type)?;
        let item = self
            .build_batch(wizard)?
            .into_iter()
            .find(|i| i.holder_index == holder_index && i.document_type == document_type)
            .ok_or_else(|| OnboardError::InvalidArgument(format!("nothing staged for {document_type} of holder {holder_index}")))?;

        match gateway.upload_single(&item).await {
            Ok(document) => {
                self.staged.remove(&key);
                self.failures.remove(&key);
                wizard.dispatch(DraftAction::AttachDocument {
                    holder_index,
                    document_type,
                    document: document.clone(),
                });
                Ok(document)
            }
            Err(OnboardError::Api(body)) => {
                let reason = body.message.clone().unwrap_or_else(|| body.to_string());
                self.failures.insert(key, reason.clone());
                wizard.dispatch(DraftAction::DocumentRejected {
                    holder_index,
                    document_type,
                    reason,
                });
                Err(OnboardError::Api(body))
            }
            Err(e) => Err(e),
        }
    }
}

/// Remove and return the first pending slot a server entry refers to.
fn take_slot(
    pending: &mut Vec<SlotKey>,
    items: &[KycUploadItem],
    holder_index: Option<usize>,
    person_pan: Option<&str>,
    document_type: &str,
) -> Option<SlotKey> {
    let ty = DocumentType::from_server(document_type);
    let position = pending.iter().position(|&(holder, slot_ty)| {
        if slot_ty != ty {
            return false;
        }
        match (holder_index, person_pan) {
            (Some(index), _) => holder == index,
            (None, Some(pan)) => items
                .iter()
                .any(|i| i.holder_index == holder && i.document_type == slot_ty && i.person_pan.eq_ignore_ascii_case(pan)),
            (None, None) => true,
        }
    })?;
    Some(pending.remove(position))
}
