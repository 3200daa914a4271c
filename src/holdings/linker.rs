//! Security reference linking for holding rows.
//!
//! A staged row, or a persisted holding whose ISIN was edited, is linked
//! once it carries a market-list reference, either from a server lookup or
//! from an earlier lookup of the same ISIN in this session. Lookups are deduplicated only by "did the ISIN change": every
//! change of at least [`MIN_ISIN_LOOKUP_LEN`] characters issues a fresh
//! [`LookupTicket`], and results are applied only while the row still
//! carries the ticket's ISIN.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::constants::MIN_ISIN_LOOKUP_LEN;
use crate::error::{OnboardError, Result};
use crate::types::SecurityType;
use crate::types::market_list::{ReferenceEntry, ReferenceEntryRequest};

/// Internal id of a staged row. Stable across ISIN edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId(pub u64);

/// Row an ISIN lookup was issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupTarget {
    Staged(RowId),
    /// A persisted holding, by holding id.
    Existing(String),
}

impl std::fmt::Display for LookupTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Staged(row_id) => write!(f, "stagedHoldings.{}", row_id.0),
            Self::Existing(holding_id) => write!(f, "holdings.{holding_id}"),
        }
    }
}

/// A pending ISIN lookup for one row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupTicket {
    pub target: LookupTarget,
    pub isin: String,
}

/// Reference data merged into a staged row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedReference {
    pub market_list_id: String,
    pub company_name: Option<String>,
    pub sector: Option<String>,
    pub category_id: Option<String>,
    pub category: Option<String>,
}

impl From<&ReferenceEntry> for LinkedReference {
    fn from(entry: &ReferenceEntry) -> Self {
        Self {
            market_list_id: entry.id.clone(),
            company_name: entry.company_name.clone(),
            sector: entry.sector.clone(),
            category_id: entry.category_id.clone(),
            category: entry.category.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LinkState {
    /// ISIN too short, or the last lookup failed in transport.
    #[default]
    Unlinked,
    Pending,
    Linked(LinkedReference),
    /// The server has no entry; the operator may create one.
    Missing,
}

/// A holding typed by the operator but not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedHolding {
    pub row_id: RowId,
    pub isin_code: String,
    pub security_type: Option<SecurityType>,
    pub portfolio_weightage: String,
    pub link: LinkState,
}

impl StagedHolding {
    pub fn new(row_id: RowId) -> Self {
        Self {
            row_id,
            isin_code: String::new(),
            security_type: None,
            portfolio_weightage: String::new(),
            link: LinkState::Unlinked,
        }
    }

    pub fn reference(&self) -> Option<&LinkedReference> {
        self.link.reference()
    }

    /// Ready to be persisted: linked to a reference entry.
    pub fn is_ready(&self) -> bool {
        self.isin_code.len() >= MIN_ISIN_LOOKUP_LEN && self.reference().is_some()
    }
}

impl LinkState {
    pub fn reference(&self) -> Option<&LinkedReference> {
        match self {
            LinkState::Linked(r) => Some(r),
            _ => None,
        }
    }
}

/// Operator-entered details for a new or corrected reference entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceDetails {
    pub company_name: String,
    pub sector: Option<String>,
    pub category_id: Option<String>,
}

pub fn normalize_isin(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Session-scoped ISIN resolution state.
#[derive(Debug, Clone, Default)]
pub struct SecurityLinker {
    resolved: HashMap<String, ReferenceEntry>,
}

impl SecurityLinker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entry resolved earlier in this session.
    pub fn cached(&self, isin: &str) -> Option<&ReferenceEntry> {
        self.resolved.get(&normalize_isin(isin))
    }

    /// Record a typed ISIN on `row`.
    ///
    /// Returns a ticket when a lookup should be issued. An unchanged ISIN
    /// issues nothing; a changed one always does, even when the session
    /// already knows the entry.
    pub fn isin_changed(&mut self, row: &mut StagedHolding, raw: &str) -> Option<LookupTicket> {
        let isin = normalize_isin(raw);
        if isin == row.isin_code {
            return None;
        }
        row.isin_code = isin;
        self.relink(LookupTarget::Staged(row.row_id), &row.isin_code, &mut row.link)
    }

    /// Reset `link` for a freshly typed, normalized `isin` and issue the
    /// lookup for it. Short ISINs are left unlinked with no lookup.
    pub fn relink(&self, target: LookupTarget, isin: &str, link: &mut LinkState) -> Option<LookupTicket> {
        if isin.len() < MIN_ISIN_LOOKUP_LEN {
            *link = LinkState::Unlinked;
            return None;
        }

        *link = match self.resolved.get(isin) {
            Some(entry) => LinkState::Linked(entry.into()),
            None => LinkState::Pending,
        };
        Some(LookupTicket {
            target,
            isin: isin.to_owned(),
        })
    }

    /// Apply a lookup result to the row that currently shows `current_isin`.
    /// Returns `false` if the row has moved on.
    pub fn lookup_completed(
        &mut self,
        current_isin: Option<&str>,
        link: &mut LinkState,
        ticket: &LookupTicket,
        found: Option<ReferenceEntry>,
    ) -> bool {
        if current_isin != Some(ticket.isin.as_str()) {
            tracing::debug!(row = %ticket.target, isin = %ticket.isin, "stale ISIN lookup ignored");
            return false;
        }

        match found {
            Some(entry) => {
                tracing::debug!(row = %ticket.target, isin = %ticket.isin, market_list_id = %entry.id, "ISIN linked");
                *link = LinkState::Linked((&entry).into());
                self.resolved.insert(ticket.isin.clone(), entry);
            }
            None => {
                tracing::debug!(row = %ticket.target, isin = %ticket.isin, "ISIN has no reference entry");
                *link = LinkState::Missing;
                self.resolved.remove(&ticket.isin);
            }
        }
        true
    }

    /// A lookup failed in transport; the row stays unlinked.
    pub fn lookup_failed(&self, current_isin: Option<&str>, link: &mut LinkState, ticket: &LookupTicket) -> bool {
        if current_isin != Some(ticket.isin.as_str()) {
            return false;
        }
        if *link == LinkState::Pending {
            *link = LinkState::Unlinked;
        }
        true
    }

    /// Merge a created or updated entry into the row that asked for it.
    pub fn reference_saved(&mut self, target: &LookupTarget, current_isin: &str, link: &mut LinkState, entry: ReferenceEntry) {
        let isin = normalize_isin(&entry.isin);
        if isin != current_isin {
            tracing::warn!(row = %target, saved = %isin, typed = %current_isin, "saved reference ISIN differs from row");
        }
        *link = LinkState::Linked((&entry).into());
        self.resolved.insert(isin, entry);
    }

    /// Request body for creating (or correcting) the entry of the row at
    /// `target`, seeded with its ISIN and the portfolio date.
    pub fn reference_request(
        target: &LookupTarget,
        isin: &str,
        as_on_date: NaiveDate,
        details: ReferenceDetails,
    ) -> Result<ReferenceEntryRequest> {
        if isin.len() < MIN_ISIN_LOOKUP_LEN {
            return Err(OnboardError::InvalidArgument(format!("ISIN {isin:?} is too short to register")));
        }
        if details.company_name.trim().is_empty() {
            return Err(OnboardError::Validation(vec![(
                format!("{target}.companyName"),
                "is required".to_owned(),
            )]));
        }
        Ok(ReferenceEntryRequest {
            isin: isin.to_owned(),
            company_name: details.company_name.trim().to_owned(),
            sector: details.sector,
            category_id: details.category_id,
            as_on_date,
        })
    }
}
