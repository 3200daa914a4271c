//! Field paths, wizard sections and the cascade table.
//!
//! A field path is a dot-separated address into the draft whose first
//! segment is the matching top-level key of the submission payload
//! (`investment.productId`, `holders.1.address.city`,
//! `nominees.0.guardian.name`). The first segment alone decides the
//! section a path belongs to.

use std::fmt;

use super::model::*;

/// A value written by [`DraftAction::SetField`](super::DraftAction::SetField).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Flag(v)
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// A wizard step ("tab").
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Section {
    Investment,
    CustomerProfile,
    Holders,
    Nominees,
    BankDemat,
    Documents,
    Drawdown,
}

impl Section {
    pub const ALL: [Section; 7] = [
        Self::Investment,
        Self::CustomerProfile,
        Self::Holders,
        Self::Nominees,
        Self::BankDemat,
        Self::Documents,
        Self::Drawdown,
    ];
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Investment => "Investment",
            Self::CustomerProfile => "Customer Profile",
            Self::Holders => "Holders",
            Self::Nominees => "Nominees",
            Self::BankDemat => "Bank & Demat",
            Self::Documents => "KYC Documents",
            Self::Drawdown => "Drawdown",
        };
        f.write_str(name)
    }
}

/// Top-level path segment → section.
const SECTION_TABLE: &[(&str, Section)] = &[
    ("investment", Section::Investment),
    ("internalMapping", Section::Investment),
    ("customerProfile", Section::CustomerProfile),
    ("portfolioAccount", Section::Holders),
    ("holders", Section::Holders),
    ("nominees", Section::Nominees),
    ("bankAccount", Section::BankDemat),
    ("dematAccount", Section::BankDemat),
    ("kycDocuments", Section::Documents),
    ("drawdown", Section::Drawdown),
];

/// Section a field path is highlighted under, if the path is known.
pub fn section_of(path: &str) -> Option<Section> {
    let head = path.split('.').next()?;
    SECTION_TABLE
        .iter()
        .find(|(prefix, _)| *prefix == head)
        .map(|(_, section)| *section)
}

// ---------------------------------------------------------------------------
// Cascades
// ---------------------------------------------------------------------------

pub const HOLDING_MODE: &str = "portfolioAccount.holdingMode";
pub const PRODUCT_ID: &str = "investment.productId";
pub const AMC_ID: &str = "investment.amcId";
pub const SCHEME_ID: &str = "investment.schemeId";
pub const CAPITAL_COMMITMENT: &str = "investment.capitalCommitment";
pub const CURRENCY: &str = "investment.currency";

/// Changing the key field clears every listed field.
pub const CASCADES: &[(&str, &[&str])] = &[(PRODUCT_ID, &[AMC_ID, SCHEME_ID]), (AMC_ID, &[SCHEME_ID])];

/// Cleared on a product change unless the new product requires them.
pub const COMMITMENT_FIELDS: &[&str] = &[CAPITAL_COMMITMENT, CURRENCY];

pub fn cascade_targets(path: &str) -> &'static [&'static str] {
    CASCADES
        .iter()
        .find(|(key, _)| *key == path)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn holder_path(index: usize, field: &str) -> String {
    format!("holders.{index}.{field}")
}

pub fn nominee_path(index: usize, field: &str) -> String {
    format!("nominees.{index}.{field}")
}

/// Rewrite a server path (`holders[0].pan`) into draft form (`holders.0.pan`).
pub fn normalize_server_path(raw: &str) -> String {
    raw.trim()
        .replace('[', ".")
        .replace(']', "")
        .split('.')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(".")
}

// ---------------------------------------------------------------------------
// Slot access
// ---------------------------------------------------------------------------

impl DraftApplication {
    /// Mutable text slot addressed by `path`, if the path names one.
    pub(crate) fn text_slot(&mut self, path: &str) -> Option<&mut String> {
        let parts: Vec<&str> = path.split('.').collect();
        match parts.as_slice() {
            ["investment", field] => {
                let inv = &mut self.investment;
                Some(match *field {
                    "productId" => &mut inv.product_id,
                    "amcId" => &mut inv.amc_id,
                    "schemeId" => &mut inv.scheme_id,
                    "currency" => &mut inv.currency,
                    "capitalCommitment" => &mut inv.capital_commitment,
                    "feeStructure" => &mut inv.fee_structure,
                    "inceptionDate" => &mut inv.inception_date,
                    _ => return None,
                })
            }
            ["customerProfile", field] => {
                let cp = &mut self.customer_profile;
                Some(match *field {
                    "investorCode" => &mut cp.investor_code,
                    "residentialStatus" => &mut cp.residential_status,
                    "subStatus" => &mut cp.sub_status,
                    _ => return None,
                })
            }
            ["holders", index, rest @ ..] => {
                let holder = self.holders.get_mut(index.parse::<usize>().ok()?)?;
                holder_text_slot(holder, rest)
            }
            ["nominees", index, rest @ ..] => {
                let nominee = self.nominees.get_mut(index.parse::<usize>().ok()?)?;
                nominee_text_slot(nominee, rest)
            }
            ["bankAccount", field] => {
                let bank = &mut self.bank;
                Some(match *field {
                    "bankName" => &mut bank.bank_name,
                    "accountNumber" => &mut bank.account_number,
                    "ifscCode" => &mut bank.ifsc_code,
                    _ => return None,
                })
            }
            ["dematAccount", field] => {
                let demat = &mut self.demat;
                Some(match *field {
                    "depository" => &mut demat.depository,
                    "dpId" => &mut demat.dp_id,
                    "clientId" => &mut demat.client_id,
                    _ => return None,
                })
            }
            ["internalMapping", field] => {
                let im = &mut self.internal_mapping;
                Some(match *field {
                    "relationshipManagerId" => &mut im.relationship_manager_id,
                    "branchCode" => &mut im.branch_code,
                    _ => return None,
                })
            }
            ["drawdown", field] => {
                let dd = &mut self.drawdown;
                Some(match *field {
                    "schedule" => &mut dd.schedule,
                    "amount" => &mut dd.amount,
                    "percentage" => &mut dd.percentage,
                    "firstDueDate" => &mut dd.first_due_date,
                    _ => return None,
                })
            }
            _ => None,
        }
    }

    /// Mutable boolean slot addressed by `path`.
    pub(crate) fn flag_slot(&mut self, path: &str) -> Option<&mut bool> {
        let parts: Vec<&str> = path.split('.').collect();
        match parts.as_slice() {
            ["holders", index, "isMinor"] => Some(&mut self.holders.get_mut(index.parse::<usize>().ok()?)?.is_minor),
            ["nominees", index, "isMinor"] => Some(&mut self.nominees.get_mut(index.parse::<usize>().ok()?)?.is_minor),
            _ => None,
        }
    }
}

fn holder_text_slot<'a>(holder: &'a mut Holder, rest: &[&str]) -> Option<&'a mut String> {
    Some(match rest {
        ["name"] => &mut holder.name,
        ["pan"] => &mut holder.pan,
        ["dob"] => &mut holder.dob,
        ["gender"] => &mut holder.gender,
        ["email"] => &mut holder.email,
        ["mobile"] => &mut holder.mobile,
        ["address", field] => address_text_slot(&mut holder.address, field)?,
        ["guardian", field] => guardian_text_slot(&mut holder.guardian, field)?,
        _ => return None,
    })
}

fn nominee_text_slot<'a>(nominee: &'a mut Nominee, rest: &[&str]) -> Option<&'a mut String> {
    Some(match rest {
        ["name"] => &mut nominee.name,
        ["relationship"] => &mut nominee.relationship,
        ["pan"] => &mut nominee.pan,
        ["dob"] => &mut nominee.dob,
        ["percentage"] => &mut nominee.percentage,
        ["guardian", field] => guardian_text_slot(&mut nominee.guardian, field)?,
        _ => return None,
    })
}

fn address_text_slot<'a>(address: &'a mut Address, field: &str) -> Option<&'a mut String> {
    Some(match field {
        "line1" => &mut address.line1,
        "line2" => &mut address.line2,
        "city" => &mut address.city,
        "state" => &mut address.state,
        "pincode" => &mut address.pincode,
        "country" => &mut address.country,
        _ => return None,
    })
}

fn guardian_text_slot<'a>(guardian: &'a mut Guardian, field: &str) -> Option<&'a mut String> {
    Some(match field {
        "name" => &mut guardian.name,
        "pan" => &mut guardian.pan,
        "relationship" => &mut guardian.relationship,
        "dob" => &mut guardian.dob,
        "mobile" => &mut guardian.mobile,
        _ => return None,
    })
}
