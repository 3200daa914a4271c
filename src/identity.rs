//! Identity resolution: turn a known investor code or holder PAN into a
//! normalized person profile that can pre-populate a draft holder.
//!
//! The resolver itself never touches a draft. Its output is fed to the
//! wizard as a [`DraftAction::ResolveIdentity`](crate::draft::DraftAction::ResolveIdentity),
//! which applies it only if the holder still carries the identifier that was
//! looked up.

use chrono::NaiveDate;

use crate::constants::DATE_FORMAT;
use crate::error::{OnboardError, Result};
use crate::gateway::IdentityGateway;
use crate::types::Gender;
use crate::types::investor::{AddressRecord, InvestorRecord, PersonSnapshot};

/// Which kind of identifier is being resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityRole {
    /// Investor-level unique code; resolves the primary holder.
    Primary,
    /// A joint holder's PAN.
    Secondary,
}

/// Guardian details carried by a minor's record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardianProfile {
    pub name: Option<String>,
    pub pan: Option<String>,
    pub relationship: Option<String>,
    pub dob: Option<String>,
    pub mobile: Option<String>,
}

/// Normalized person fields. `None` means the record had nothing usable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonProfile {
    pub name: Option<String>,
    pub pan: Option<String>,
    /// `YYYY-MM-DD`.
    pub dob: Option<String>,
    pub gender: Option<Gender>,
    pub email: Option<String>,
    pub mobile: Option<String>,
    /// First address of the record.
    pub address: Option<AddressRecord>,
    pub is_minor: bool,
    /// Present only when `is_minor`.
    pub guardian: Option<GuardianProfile>,
}

/// Investor-level fields returned only for [`IdentityRole::Primary`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvestorLink {
    pub investor_id: String,
    pub residential_status: Option<String>,
    pub sub_status: Option<String>,
    pub myalt_code: Option<String>,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub person: PersonProfile,
    pub investor: Option<InvestorLink>,
}

/// Resolve `unique_id` for the given role.
///
/// Returns `Ok(None)` when no record matches; transport failures are
/// returned as errors and should leave the draft untouched as well.
pub async fn resolve<G>(gateway: &G, unique_id: &str, role: IdentityRole) -> Result<Option<ResolvedIdentity>>
where
    G: IdentityGateway + ?Sized,
{
    let key = unique_id.trim();
    if key.is_empty() {
        return Ok(None);
    }

    let resolved = match role {
        IdentityRole::Primary => gateway.investor_by_code(key).await?.map(from_investor),
        IdentityRole::Secondary => gateway.holder_by_pan(&key.to_ascii_uppercase()).await?.map(|p| ResolvedIdentity {
            person: normalize_person(p),
            investor: None,
        }),
    };

    match &resolved {
        Some(r) => tracing::debug!(?role, unique_id = key, minor = r.person.is_minor, "identity resolved"),
        None => tracing::info!(?role, unique_id = key, "identity not found"),
    }
    Ok(resolved)
}

/// Like [`resolve`], but a miss is an [`OnboardError::IdentityNotFound`].
pub async fn resolve_existing<G>(gateway: &G, unique_id: &str, role: IdentityRole) -> Result<ResolvedIdentity>
where
    G: IdentityGateway + ?Sized,
{
    resolve(gateway, unique_id, role)
        .await?
        .ok_or_else(|| OnboardError::IdentityNotFound(unique_id.trim().to_owned()))
}

fn from_investor(record: InvestorRecord) -> ResolvedIdentity {
    ResolvedIdentity {
        person: record.primary_person.map(normalize_person).unwrap_or_default(),
        investor: Some(InvestorLink {
            investor_id: record.id,
            residential_status: clean(record.residential_status),
            sub_status: clean(record.sub_status),
            myalt_code: clean(record.myalt_code),
        }),
    }
}

/// Normalize a raw party record into a [`PersonProfile`].
pub fn normalize_person(raw: PersonSnapshot) -> PersonProfile {
    let guardian = raw.is_minor.then(|| GuardianProfile {
        name: clean(raw.guardian_name),
        pan: clean(raw.guardian_pan).map(|p| p.to_ascii_uppercase()),
        relationship: clean(raw.guardian_relationship),
        dob: raw.guardian_dob.as_deref().and_then(normalize_date),
        mobile: clean(raw.guardian_mobile),
    });

    PersonProfile {
        name: clean(raw.name),
        pan: clean(raw.pan).map(|p| p.to_ascii_uppercase()),
        dob: raw.dob.as_deref().and_then(normalize_date),
        gender: raw.gender.as_deref().and_then(Gender::parse),
        email: clean(raw.email).map(|e| e.to_ascii_lowercase()),
        mobile: clean(raw.mobile),
        address: raw.addresses.into_iter().next().map(clean_address),
        is_minor: raw.is_minor,
        guardian,
    }
}

fn clean_address(a: AddressRecord) -> AddressRecord {
    AddressRecord {
        line1: clean(a.line1),
        line2: clean(a.line2),
        city: clean(a.city),
        state: clean(a.state),
        pincode: clean(a.pincode),
        country: clean(a.country),
    }
}

fn clean(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty())
}

/// Accepts `YYYY-MM-DD`, an ISO timestamp, `DD-MM-YYYY` or `DD/MM/YYYY`.
pub(crate) fn normalize_date(raw: &str) -> Option<String> {
    let raw = raw.trim();
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), DATE_FORMAT))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d-%m-%Y"))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()?;
    Some(date.format(DATE_FORMAT).to_string())
}
