//! Field validation rules for the draft.
//!
//! [`validate`] is a pure selector: it derives the full set of field errors
//! from the current draft and rules. Nothing is cached between calls.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;

use super::field::{HOLDING_MODE, holder_path, nominee_path};
use super::model::*;
use crate::config::WizardRules;
use crate::constants::DATE_FORMAT;
use crate::holdings::reconcile::round_weightage;
use crate::types::Depository;

/// Field path → message.
pub type FieldErrors = BTreeMap<String, String>;

static PAN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("valid PAN regex"));
static IFSC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{4}0[A-Z0-9]{6}$").expect("valid IFSC regex"));
static MOBILE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?[0-9]{10,13}$").expect("valid mobile regex"));
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static ACCOUNT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]{9,18}$").expect("valid account regex"));

const REQUIRED: &str = "is required";

// ---------------------------------------------------------------------------
// Parsers shared with payload assembly
// ---------------------------------------------------------------------------

pub(crate) fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub(crate) fn parse_decimal(raw: &str) -> Option<Decimal> {
    raw.trim().replace(',', "").parse::<Decimal>().ok()
}

/// A percentage in `[0, 100]`, rounded to 2 dp.
pub(crate) fn parse_percentage(raw: &str) -> Option<Decimal> {
    parse_decimal(raw)
        .map(round_weightage)
        .filter(|p| *p >= Decimal::ZERO && *p <= Decimal::ONE_HUNDRED)
}

pub(crate) fn opt(raw: &str) -> Option<String> {
    let t = raw.trim();
    (!t.is_empty()).then(|| t.to_owned())
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Derive every field error of the draft.
pub fn validate(draft: &DraftApplication, rules: &WizardRules) -> FieldErrors {
    let mut errors = FieldErrors::new();
    investment(draft, rules, &mut errors);
    customer_profile(draft, &mut errors);
    holders(draft, &mut errors);
    nominees(draft, &mut errors);
    bank_and_demat(draft, &mut errors);
    drawdown(draft, rules, &mut errors);
    errors
}

fn err(errors: &mut FieldErrors, path: impl Into<String>, msg: impl Into<String>) {
    errors.entry(path.into()).or_insert_with(|| msg.into());
}

fn required(errors: &mut FieldErrors, path: impl Into<String>, value: &str) -> bool {
    if value.trim().is_empty() {
        err(errors, path, REQUIRED);
        false
    } else {
        true
    }
}

fn optional_date(errors: &mut FieldErrors, path: String, value: &str) {
    if !value.trim().is_empty() && parse_date(value).is_none() {
        err(errors, path, "must be a date (YYYY-MM-DD)");
    }
}

fn pan(errors: &mut FieldErrors, path: String, value: &str, mandatory: bool) {
    let v = value.trim();
    if v.is_empty() {
        if mandatory {
            err(errors, path, REQUIRED);
        }
    } else if !PAN_RE.is_match(&v.to_ascii_uppercase()) {
        err(errors, path, "must be a valid PAN (e.g. ABCDE1234F)");
    }
}

fn investment(draft: &DraftApplication, rules: &WizardRules, errors: &mut FieldErrors) {
    let inv = &draft.investment;
    required(errors, "investment.productId", &inv.product_id);
    required(errors, "investment.amcId", &inv.amc_id);
    required(errors, "investment.schemeId", &inv.scheme_id);
    optional_date(errors, "investment.inceptionDate".into(), &inv.inception_date);

    if rules.requires_commitment(inv.product_id.trim()) {
        required(errors, "investment.currency", &inv.currency);
        if required(errors, "investment.capitalCommitment", &inv.capital_commitment) {
            match parse_decimal(&inv.capital_commitment) {
                Some(amount) if amount > Decimal::ZERO => {}
                _ => err(errors, "investment.capitalCommitment", "must be a positive amount"),
            }
        }
    }
}

fn customer_profile(draft: &DraftApplication, errors: &mut FieldErrors) {
    required(
        errors,
        "customerProfile.residentialStatus",
        &draft.customer_profile.residential_status,
    );
}

fn holders(draft: &DraftApplication, errors: &mut FieldErrors) {
    let max = draft.holding_mode.max_holders();
    if draft.holders.is_empty() || draft.holders.len() > max {
        err(
            errors,
            HOLDING_MODE,
            format!("{:?} mode allows 1 to {max} holder(s)", draft.holding_mode),
        );
    }

    for (i, h) in draft.holders.iter().enumerate() {
        required(errors, holder_path(i, "name"), &h.name);
        pan(errors, holder_path(i, "pan"), &h.pan, true);
        if required(errors, holder_path(i, "dob"), &h.dob) {
            optional_date(errors, holder_path(i, "dob"), &h.dob);
        }
        if !h.email.trim().is_empty() && !EMAIL_RE.is_match(h.email.trim()) {
            err(errors, holder_path(i, "email"), "must be a valid email address");
        }
        if !h.mobile.trim().is_empty() && !MOBILE_RE.is_match(h.mobile.trim()) {
            err(errors, holder_path(i, "mobile"), "must be a valid mobile number");
        }
        for (field, value) in [
            ("line1", &h.address.line1),
            ("city", &h.address.city),
            ("state", &h.address.state),
            ("pincode", &h.address.pincode),
            ("country", &h.address.country),
        ] {
            required(errors, holder_path(i, &format!("address.{field}")), value);
        }
        if h.is_minor {
            guardian(errors, &format!("holders.{i}.guardian"), &h.guardian);
        }
    }
}

fn guardian(errors: &mut FieldErrors, prefix: &str, g: &Guardian) {
    required(errors, format!("{prefix}.name"), &g.name);
    required(errors, format!("{prefix}.relationship"), &g.relationship);
    pan(errors, format!("{prefix}.pan"), &g.pan, false);
    optional_date(errors, format!("{prefix}.dob"), &g.dob);
}

fn nominees(draft: &DraftApplication, errors: &mut FieldErrors) {
    if draft.nominees.is_empty() {
        return;
    }

    let mut total = Decimal::ZERO;
    for (i, n) in draft.nominees.iter().enumerate() {
        required(errors, nominee_path(i, "name"), &n.name);
        required(errors, nominee_path(i, "relationship"), &n.relationship);
        pan(errors, nominee_path(i, "pan"), &n.pan, false);
        optional_date(errors, nominee_path(i, "dob"), &n.dob);
        if required(errors, nominee_path(i, "percentage"), &n.percentage) {
            match parse_percentage(&n.percentage) {
                Some(p) => total += p,
                None => err(errors, nominee_path(i, "percentage"), "must be between 0 and 100"),
            }
        }
        if n.is_minor {
            guardian(errors, &format!("nominees.{i}.guardian"), &n.guardian);
        }
    }

    if round_weightage(total) != Decimal::ONE_HUNDRED {
        err(
            errors,
            "nominees",
            format!("nominee percentages must add up to 100 (currently {:.2})", round_weightage(total)),
        );
    }
}

fn bank_and_demat(draft: &DraftApplication, errors: &mut FieldErrors) {
    let bank = &draft.bank;
    if !bank.is_blank() {
        required(errors, "bankAccount.bankName", &bank.bank_name);
        if required(errors, "bankAccount.accountNumber", &bank.account_number)
            && !ACCOUNT_RE.is_match(bank.account_number.trim())
        {
            err(errors, "bankAccount.accountNumber", "must be 9 to 18 digits");
        }
        if required(errors, "bankAccount.ifscCode", &bank.ifsc_code)
            && !IFSC_RE.is_match(&bank.ifsc_code.trim().to_ascii_uppercase())
        {
            err(errors, "bankAccount.ifscCode", "must be a valid IFSC code");
        }
    }

    let demat = &draft.demat;
    if !demat.is_blank() {
        if required(errors, "dematAccount.depository", &demat.depository)
            && Depository::parse(&demat.depository).is_none()
        {
            err(errors, "dematAccount.depository", "must be NSDL or CDSL");
        }
        required(errors, "dematAccount.dpId", &demat.dp_id);
        required(errors, "dematAccount.clientId", &demat.client_id);
    }
}

fn drawdown(draft: &DraftApplication, rules: &WizardRules, errors: &mut FieldErrors) {
    if !rules.requires_drawdown(draft.investment.product_id.trim()) {
        return;
    }
    let dd = &draft.drawdown;
    required(errors, "drawdown.schedule", &dd.schedule);
    optional_date(errors, "drawdown.firstDueDate".into(), &dd.first_due_date);

    let amount = opt(&dd.amount);
    let percentage = opt(&dd.percentage);
    if amount.is_none() && percentage.is_none() {
        err(errors, "drawdown.amount", "enter a drawdown amount or percentage");
    }
    if let Some(a) = amount {
        if !parse_decimal(&a).is_some_and(|v| v > Decimal::ZERO) {
            err(errors, "drawdown.amount", "must be a positive amount");
        }
    }
    if let Some(p) = percentage {
        if !parse_percentage(&p).is_some_and(|v| v > Decimal::ZERO) {
            err(errors, "drawdown.percentage", "must be above 0 and at most 100");
        }
    }
}
