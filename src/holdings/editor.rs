//! Holdings editing session for one portfolio snapshot.
//!
//! Two change-sets live side by side: edits to persisted holdings and newly
//! staged rows. Both are summarized together, and both save operations
//! check the combined allocation before anything is sent, but each save is
//! its own request with its own outcome.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::linker::*;
use super::reconcile::{WeightageSummary, parse_weightage, round_weightage, summarize, weightage_or_zero};
use crate::error::{OnboardError, Result};
use crate::gateway::{HoldingsGateway, ReferenceGateway};
use crate::types::SecurityType;
use crate::types::holdings::*;
use crate::types::market_list::ReferenceEntry;

const NOT_A_WEIGHTAGE: &str = "must be a non-negative number";

/// An in-progress edit of a persisted holding. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HoldingEdit {
    /// Normalized replacement ISIN.
    pub isin_code: Option<String>,
    pub security_type: Option<SecurityType>,
    pub portfolio_weightage: Option<String>,
    /// Reference resolution of `isin_code`; unused while it is `None`.
    pub link: LinkState,
}

impl HoldingEdit {
    fn replaces_isin(&self) -> bool {
        self.isin_code.is_some()
    }
}

/// Field of a holding row being edited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldingField {
    IsinCode(String),
    SecurityType(SecurityType),
    Weightage(String),
}

#[derive(Debug, Clone)]
pub enum HoldingsAction {
    EditExisting { holding_id: String, field: HoldingField },
    /// Drop every pending edit of a persisted holding.
    RevertExisting(String),
    StageHolding,
    UnstageHolding(RowId),
    EditStaged { row_id: RowId, field: HoldingField },
    LookupCompleted { ticket: LookupTicket, found: Option<ReferenceEntry> },
    LookupFailed(LookupTicket),
    ReferenceSaved { target: LookupTarget, entry: ReferenceEntry },
    ExistingSaved(Vec<Holding>),
    StagedSaved(Vec<Holding>),
}

/// What the caller should do after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoldingsEffect {
    None,
    Ignored,
    Staged(RowId),
    Lookup(LookupTicket),
}

#[derive(Debug, Clone)]
pub struct HoldingsEditor {
    investment_id: String,
    as_on_date: NaiveDate,
    existing: Vec<Holding>,
    edits: BTreeMap<String, HoldingEdit>,
    staged: Vec<StagedHolding>,
    linker: SecurityLinker,
    next_row: u64,
}

impl HoldingsEditor {
    pub fn new(investment_id: impl Into<String>, as_on_date: NaiveDate, existing: Vec<Holding>) -> Self {
        Self {
            investment_id: investment_id.into(),
            as_on_date,
            existing,
            edits: BTreeMap::new(),
            staged: Vec::new(),
            linker: SecurityLinker::new(),
            next_row: 1,
        }
    }

    /// Start a session from a fetched snapshot.
    pub fn from_snapshot(investment_id: impl Into<String>, as_on_date: NaiveDate, snapshot: HoldingsSnapshot) -> Self {
        Self::new(
            investment_id,
            snapshot.holdings_as_on_date.unwrap_or(as_on_date),
            snapshot.holdings,
        )
    }

    /// Fetch the snapshot as on `as_on_date` and start a session from it.
    pub async fn load<G>(gateway: &G, investment_id: &str, as_on_date: NaiveDate) -> Result<Self>
    where
        G: HoldingsGateway + ?Sized,
    {
        let snapshot = gateway.holdings_snapshot(investment_id, as_on_date).await?;
        tracing::debug!(investment_id, count = snapshot.holdings.len(), "holdings loaded");
        Ok(Self::from_snapshot(investment_id, as_on_date, snapshot))
    }

    pub fn investment_id(&self) -> &str {
        &self.investment_id
    }

    pub fn as_on_date(&self) -> NaiveDate {
        self.as_on_date
    }

    pub fn existing(&self) -> &[Holding] {
        &self.existing
    }

    pub fn staged(&self) -> &[StagedHolding] {
        &self.staged
    }

    pub fn staged_row(&self, row_id: RowId) -> Option<&StagedHolding> {
        self.staged.iter().find(|r| r.row_id == row_id)
    }

    pub fn edit(&self, holding_id: &str) -> Option<&HoldingEdit> {
        self.edits.get(holding_id)
    }

    pub fn linker(&self) -> &SecurityLinker {
        &self.linker
    }

    // -----------------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------------

    /// Weightage of a persisted holding with its pending edit applied.
    pub fn effective_weightage(&self, holding: &Holding) -> Decimal {
        match self
            .edits
            .get(&holding.holding_id)
            .and_then(|e| e.portfolio_weightage.as_deref())
        {
            Some(raw) => weightage_or_zero(raw),
            None => holding
                .portfolio_weightage
                .filter(|w| *w >= Decimal::ZERO)
                .map(round_weightage)
                .unwrap_or(Decimal::ZERO),
        }
    }

    /// Allocation of the combined state: existing as edited plus staged.
    pub fn summary(&self) -> WeightageSummary {
        summarize(
            self.existing.iter().map(|h| self.effective_weightage(h)),
            self.staged.iter().map(|r| weightage_or_zero(&r.portfolio_weightage)),
        )
    }

    /// Every typed weightage parses and the combined allocation stays
    /// within 100 %.
    pub fn check_allocation(&self) -> Result<WeightageSummary> {
        let mut invalid = Vec::new();
        for (id, edit) in &self.edits {
            if let Some(raw) = edit.portfolio_weightage.as_deref() {
                if !raw.trim().is_empty() && parse_weightage(raw).is_none() {
                    invalid.push((format!("holdings.{id}.portfolioWeightage"), NOT_A_WEIGHTAGE.to_owned()));
                }
            }
        }
        for row in &self.staged {
            let raw = row.portfolio_weightage.trim();
            if !raw.is_empty() && parse_weightage(raw).is_none() {
                invalid.push((
                    format!("stagedHoldings.{}.portfolioWeightage", row.row_id.0),
                    NOT_A_WEIGHTAGE.to_owned(),
                ));
            }
        }
        if !invalid.is_empty() {
            return Err(OnboardError::Validation(invalid));
        }

        let summary = self.summary();
        summary.check()?;
        Ok(summary)
    }

    /// Every precondition of both save operations: the allocation checks
    /// plus a linked reference entry on each staged row and on each
    /// persisted holding whose ISIN was replaced.
    pub fn check_commit(&self) -> Result<WeightageSummary> {
        let summary = self.check_allocation()?;

        let mut row_ids = Vec::new();
        let mut holding_ids = Vec::new();
        let mut isins = Vec::new();
        for row in self.staged.iter().filter(|r| !r.is_ready()) {
            row_ids.push(row.row_id.0);
            isins.push(row.isin_code.clone());
        }
        for (id, edit) in &self.edits {
            if let Some(isin) = edit.isin_code.as_deref().filter(|_| edit.link.reference().is_none()) {
                holding_ids.push(id.clone());
                isins.push(isin.to_owned());
            }
        }
        if !isins.is_empty() {
            return Err(OnboardError::UnresolvedReference {
                row_ids,
                holding_ids,
                isins,
            });
        }
        Ok(summary)
    }

    /// Request for saving edits to persisted holdings. Only changed fields
    /// are included.
    pub fn prepare_update(&self) -> Result<UpdateHoldingsRequest> {
        self.check_commit()?;

        let holdings = self
            .existing
            .iter()
            .filter_map(|h| {
                let edit = self.edits.get(&h.holding_id)?;
                let isin_code = edit.isin_code.clone();
                let market_list_id = edit.link.reference().map(|r| r.market_list_id.clone());
                let security_type = edit.security_type.filter(|t| Some(*t) != h.security_type);
                let portfolio_weightage = edit
                    .portfolio_weightage
                    .as_deref()
                    .map(weightage_or_zero)
                    .filter(|w| Some(*w) != h.portfolio_weightage);

                let update = HoldingUpdate {
                    holding_id: h.holding_id.clone(),
                    isin_code,
                    security_type,
                    portfolio_weightage,
                    market_list_id,
                };
                let changed = edit.replaces_isin()
                    || update.security_type.is_some()
                    || update.portfolio_weightage.is_some();
                changed.then_some(update)
            })
            .collect();

        Ok(UpdateHoldingsRequest {
            holdings_as_on_date: self.as_on_date,
            holdings,
        })
    }

    /// Request for persisting every staged row.
    pub fn prepare_bulk_create(&self) -> Result<BulkCreateHoldingsRequest> {
        self.check_commit()?;

        let holdings = self
            .staged
            .iter()
            .filter_map(|row| {
                let reference = row.reference()?;
                Some(NewHoldingPayload {
                    isin_code: row.isin_code.clone(),
                    security_type: row.security_type,
                    portfolio_weightage: weightage_or_zero(&row.portfolio_weightage),
                    market_list_id: reference.market_list_id.clone(),
                })
            })
            .collect();

        Ok(BulkCreateHoldingsRequest {
            holdings_as_on_date: self.as_on_date,
            holdings,
        })
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    pub fn dispatch(&mut self, action: HoldingsAction) -> HoldingsEffect {
        match action {
            HoldingsAction::EditExisting { holding_id, field } => {
                let Some(stored_isin) = self
                    .existing
                    .iter()
                    .find(|h| h.holding_id == holding_id)
                    .map(|h| normalize_isin(&h.isin_code))
                else {
                    return HoldingsEffect::Ignored;
                };
                let edit = self.edits.entry(holding_id.clone()).or_default();
                match field {
                    HoldingField::IsinCode(raw) => {
                        let isin = normalize_isin(&raw);
                        if edit.isin_code.as_deref().unwrap_or(&stored_isin) == isin {
                            return HoldingsEffect::None;
                        }
                        if isin == stored_isin {
                            edit.isin_code = None;
                            edit.link = LinkState::Unlinked;
                            return HoldingsEffect::None;
                        }
                        let ticket = self
                            .linker
                            .relink(LookupTarget::Existing(holding_id), &isin, &mut edit.link);
                        edit.isin_code = Some(isin);
                        match ticket {
                            Some(ticket) => HoldingsEffect::Lookup(ticket),
                            None => HoldingsEffect::None,
                        }
                    }
                    HoldingField::SecurityType(t) => {
                        edit.security_type = Some(t);
                        HoldingsEffect::None
                    }
                    HoldingField::Weightage(w) => {
                        edit.portfolio_weightage = Some(w);
                        HoldingsEffect::None
                    }
                }
            }
            HoldingsAction::RevertExisting(holding_id) => match self.edits.remove(&holding_id) {
                Some(_) => HoldingsEffect::None,
                None => HoldingsEffect::Ignored,
            },
            HoldingsAction::StageHolding => {
                let row_id = RowId(self.next_row);
                self.next_row += 1;
                self.staged.push(StagedHolding::new(row_id));
                HoldingsEffect::Staged(row_id)
            }
            HoldingsAction::UnstageHolding(row_id) => {
                let before = self.staged.len();
                self.staged.retain(|r| r.row_id != row_id);
                if self.staged.len() < before {
                    HoldingsEffect::None
                } else {
                    HoldingsEffect::Ignored
                }
            }
            HoldingsAction::EditStaged { row_id, field } => {
                let Some(row) = self.staged.iter_mut().find(|r| r.row_id == row_id) else {
                    return HoldingsEffect::Ignored;
                };
                match field {
                    HoldingField::IsinCode(isin) => match self.linker.isin_changed(row, &isin) {
                        Some(ticket) => HoldingsEffect::Lookup(ticket),
                        None => HoldingsEffect::None,
                    },
                    HoldingField::SecurityType(t) => {
                        row.security_type = Some(t);
                        HoldingsEffect::None
                    }
                    HoldingField::Weightage(w) => {
                        row.portfolio_weightage = w;
                        HoldingsEffect::None
                    }
                }
            }
            HoldingsAction::LookupCompleted { ticket, found } => {
                let Some((isin, link)) = link_slot(&mut self.staged, &mut self.edits, &ticket.target) else {
                    return HoldingsEffect::Ignored;
                };
                if self.linker.lookup_completed(isin.as_deref(), link, &ticket, found) {
                    HoldingsEffect::None
                } else {
                    HoldingsEffect::Ignored
                }
            }
            HoldingsAction::LookupFailed(ticket) => {
                let Some((isin, link)) = link_slot(&mut self.staged, &mut self.edits, &ticket.target) else {
                    return HoldingsEffect::Ignored;
                };
                if self.linker.lookup_failed(isin.as_deref(), link, &ticket) {
                    HoldingsEffect::None
                } else {
                    HoldingsEffect::Ignored
                }
            }
            HoldingsAction::ReferenceSaved { target, entry } => {
                let Some((Some(isin), link)) = link_slot(&mut self.staged, &mut self.edits, &target) else {
                    return HoldingsEffect::Ignored;
                };
                self.linker.reference_saved(&target, &isin, link, entry);
                HoldingsEffect::None
            }
            HoldingsAction::ExistingSaved(saved) => {
                for holding in saved {
                    self.edits.remove(&holding.holding_id);
                    match self.existing.iter_mut().find(|h| h.holding_id == holding.holding_id) {
                        Some(slot) => *slot = holding,
                        None => self.existing.push(holding),
                    }
                }
                HoldingsEffect::None
            }
            HoldingsAction::StagedSaved(created) => {
                self.staged.clear();
                self.existing.extend(created);
                HoldingsEffect::None
            }
        }
    }

    // -----------------------------------------------------------------------
    // Network
    // -----------------------------------------------------------------------

    /// Run the lookup a ticket asks for and apply the result.
    pub async fn run_lookup<G>(&mut self, gateway: &G, ticket: LookupTicket) -> Result<bool>
    where
        G: ReferenceGateway + ?Sized,
    {
        let effect = match gateway.lookup_by_isin(&ticket.isin).await {
            Ok(found) => self.dispatch(HoldingsAction::LookupCompleted { ticket, found }),
            Err(e) => {
                self.dispatch(HoldingsAction::LookupFailed(ticket));
                return Err(e);
            }
        };
        Ok(effect != HoldingsEffect::Ignored)
    }

    /// Type an ISIN into a staged row and resolve it.
    pub async fn set_staged_isin<G>(&mut self, gateway: &G, row_id: RowId, isin: &str) -> Result<bool>
    where
        G: ReferenceGateway + ?Sized,
    {
        match self.dispatch(HoldingsAction::EditStaged {
            row_id,
            field: HoldingField::IsinCode(isin.to_owned()),
        }) {
            HoldingsEffect::Lookup(ticket) => self.run_lookup(gateway, ticket).await,
            _ => Ok(false),
        }
    }

    /// Type a replacement ISIN into a persisted holding and resolve it.
    pub async fn set_existing_isin<G>(&mut self, gateway: &G, holding_id: &str, isin: &str) -> Result<bool>
    where
        G: ReferenceGateway + ?Sized,
    {
        match self.dispatch(HoldingsAction::EditExisting {
            holding_id: holding_id.to_owned(),
            field: HoldingField::IsinCode(isin.to_owned()),
        }) {
            HoldingsEffect::Lookup(ticket) => self.run_lookup(gateway, ticket).await,
            _ => Ok(false),
        }
    }

    /// Create the reference entry for a staged row whose ISIN has none, or
    /// update the entry it is linked to, and merge the result back into
    /// that row.
    pub async fn save_reference<G>(
        &mut self,
        gateway: &G,
        row_id: RowId,
        details: ReferenceDetails,
    ) -> Result<ReferenceEntry>
    where
        G: ReferenceGateway + ?Sized,
    {
        self.save_reference_for(gateway, LookupTarget::Staged(row_id), details)
            .await
    }

    /// [`save_reference`](Self::save_reference) for the replacement ISIN of
    /// a persisted holding.
    pub async fn save_existing_reference<G>(
        &mut self,
        gateway: &G,
        holding_id: &str,
        details: ReferenceDetails,
    ) -> Result<ReferenceEntry>
    where
        G: ReferenceGateway + ?Sized,
    {
        self.save_reference_for(gateway, LookupTarget::Existing(holding_id.to_owned()), details)
            .await
    }

    async fn save_reference_for<G>(
        &mut self,
        gateway: &G,
        target: LookupTarget,
        details: ReferenceDetails,
    ) -> Result<ReferenceEntry>
    where
        G: ReferenceGateway + ?Sized,
    {
        let (isin, linked_id) = match &target {
            LookupTarget::Staged(row_id) => self
                .staged_row(*row_id)
                .map(|r| (r.isin_code.clone(), r.reference().map(|l| l.market_list_id.clone()))),
            LookupTarget::Existing(holding_id) => self.edits.get(holding_id).and_then(|e| {
                let isin = e.isin_code.clone()?;
                Some((isin, e.link.reference().map(|l| l.market_list_id.clone())))
            }),
        }
        .ok_or_else(|| OnboardError::InvalidArgument(format!("no ISIN typed at {target}")))?;
        let req = SecurityLinker::reference_request(&target, &isin, self.as_on_date, details)?;

        let entry = match linked_id {
            Some(id) => gateway.update_reference(&id, &req).await?,
            None => gateway.create_reference(&req).await?,
        };
        tracing::info!(row = %target, isin = %entry.isin, market_list_id = %entry.id, "reference entry saved");

        self.dispatch(HoldingsAction::ReferenceSaved {
            target,
            entry: entry.clone(),
        });
        Ok(entry)
    }

    /// Persist edits to existing holdings. Staged rows are untouched.
    pub async fn save_existing<G>(&mut self, gateway: &G) -> Result<usize>
    where
        G: HoldingsGateway + ?Sized,
    {
        let req = self.prepare_update()?;
        if req.holdings.is_empty() {
            return Ok(0);
        }
        let saved = gateway.update_holdings(&self.investment_id, &req).await?;
        let count = saved.len();
        tracing::info!(investment_id = %self.investment_id, count, "holdings updated");
        self.dispatch(HoldingsAction::ExistingSaved(saved));
        Ok(count)
    }

    /// Persist every staged row. Edits to existing holdings are untouched.
    pub async fn save_staged<G>(&mut self, gateway: &G) -> Result<usize>
    where
        G: HoldingsGateway + ?Sized,
    {
        let req = self.prepare_bulk_create()?;
        if req.holdings.is_empty() {
            return Ok(0);
        }
        let created = gateway.bulk_create_holdings(&self.investment_id, &req).await?;
        let count = created.len();
        tracing::info!(investment_id = %self.investment_id, count, "holdings created");
        self.dispatch(HoldingsAction::StagedSaved(created));
        Ok(count)
    }
}

/// ISIN and link state of the row a lookup targets. The ISIN is `None` for
/// a persisted holding whose ISIN is not being replaced.
fn link_slot<'a>(
    staged: &'a mut [StagedHolding],
    edits: &'a mut BTreeMap<String, HoldingEdit>,
    target: &LookupTarget,
) -> Option<(Option<String>, &'a mut LinkState)> {
    match target {
        LookupTarget::Staged(row_id) => staged
            .iter_mut()
            .find(|r| r.row_id == *row_id)
            .map(|r| (Some(r.isin_code.clone()), &mut r.link)),
        LookupTarget::Existing(holding_id) => edits
            .get_mut(holding_id)
            .map(|e| (e.isin_code.clone(), &mut e.link)),
    }
}
