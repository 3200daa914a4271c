//! Final payload assembly and server-error mapping.

use rust_decimal::Decimal;

use super::field::{normalize_server_path, section_of};
use super::model::*;
use super::validate::{FieldErrors, opt, parse_date, parse_decimal, parse_percentage, validate};
use crate::config::WizardRules;
use crate::error::{ApiErrorBody, OnboardError, Result};
use crate::types::onboarding::*;
use crate::types::{Depository, Gender};

/// Build the submission payload from a draft.
///
/// Fails with [`OnboardError::Validation`] if any rule fails; the payload is
/// only produced for a fully valid draft. Hidden data (guardians of
/// non-minors, drawdown terms of non-drawdown products) is left out.
pub fn assemble_payload(draft: &DraftApplication, rules: &WizardRules) -> Result<OnboardingPayload> {
    let errors = validate(draft, rules);
    if !errors.is_empty() {
        return Err(OnboardError::Validation(errors.into_iter().collect()));
    }

    let inv = &draft.investment;
    let commitment = rules.requires_commitment(inv.product_id.trim());
    let investment = InvestmentPayload {
        product_id: inv.product_id.trim().to_owned(),
        amc_id: inv.amc_id.trim().to_owned(),
        scheme_id: inv.scheme_id.trim().to_owned(),
        currency: commitment.then(|| opt(&inv.currency)).flatten(),
        capital_commitment: commitment.then(|| parse_decimal(&inv.capital_commitment)).flatten(),
        fee_structure: opt(&inv.fee_structure),
        inception_date: parse_date(&inv.inception_date),
    };

    let cp = &draft.customer_profile;
    let customer_profile = CustomerProfilePayload {
        investor_id: cp.investor_id.clone(),
        investor_code: opt(&cp.investor_code),
        residential_status: cp.residential_status.trim().to_owned(),
        sub_status: opt(&cp.sub_status),
    };

    let holders = draft
        .holders
        .iter()
        .map(holder_payload)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| invalid("holders", "holder details could not be parsed"))?;

    let nominees = draft
        .nominees
        .iter()
        .map(nominee_payload)
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| invalid("nominees", "nominee details could not be parsed"))?;

    let kyc_documents = draft
        .kyc_documents
        .iter()
        .filter(|((holder_index, _), _)| *holder_index < draft.holders.len())
        .map(|((holder_index, document_type), doc)| KycDocumentRef {
            holder_index: *holder_index,
            document_type: *document_type,
            document_id: doc.id.clone(),
        })
        .collect();

    let drawdown = rules
        .requires_drawdown(inv.product_id.trim())
        .then(|| DrawdownPayload {
            schedule: draft.drawdown.schedule.trim().to_owned(),
            amount: parse_decimal(&draft.drawdown.amount),
            percentage: parse_percentage(&draft.drawdown.percentage),
            first_due_date: parse_date(&draft.drawdown.first_due_date),
        });

    Ok(OnboardingPayload {
        investment,
        customer_profile,
        portfolio_account: PortfolioAccountPayload {
            holding_mode: draft.holding_mode,
        },
        demat_account: demat_payload(&draft.demat),
        bank_account: bank_payload(&draft.bank),
        internal_mapping: InternalMappingPayload {
            relationship_manager_id: opt(&draft.internal_mapping.relationship_manager_id),
            branch_code: opt(&draft.internal_mapping.branch_code),
        },
        holders,
        nominees,
        kyc_documents,
        drawdown,
    })
}

fn invalid(path: &str, msg: &str) -> OnboardError {
    OnboardError::Validation(vec![(path.to_owned(), msg.to_owned())])
}

fn guardian_payload(g: &Guardian) -> GuardianPayload {
    GuardianPayload {
        name: g.name.trim().to_owned(),
        relationship: g.relationship.trim().to_owned(),
        pan: opt(&g.pan).map(|p| p.to_ascii_uppercase()),
        dob: parse_date(&g.dob),
        mobile: opt(&g.mobile),
    }
}

fn holder_payload(h: &Holder) -> Option<HolderPayload> {
    Some(HolderPayload {
        name: h.name.trim().to_owned(),
        pan: h.pan.trim().to_ascii_uppercase(),
        dob: parse_date(&h.dob)?,
        gender: Gender::parse(&h.gender),
        email: opt(&h.email),
        mobile: opt(&h.mobile),
        address: AddressPayload {
            line1: h.address.line1.trim().to_owned(),
            line2: opt(&h.address.line2),
            city: h.address.city.trim().to_owned(),
            state: h.address.state.trim().to_owned(),
            pincode: h.address.pincode.trim().to_owned(),
            country: h.address.country.trim().to_owned(),
        },
        is_minor: h.is_minor,
        guardian: h.is_minor.then(|| guardian_payload(&h.guardian)),
    })
}

fn nominee_payload(n: &Nominee) -> Option<NomineePayload> {
    Some(NomineePayload {
        name: n.name.trim().to_owned(),
        relationship: n.relationship.trim().to_owned(),
        pan: opt(&n.pan).map(|p| p.to_ascii_uppercase()),
        dob: parse_date(&n.dob),
        percentage: parse_percentage(&n.percentage)?,
        is_minor: n.is_minor,
        guardian: n.is_minor.then(|| guardian_payload(&n.guardian)),
    })
}

fn bank_payload(bank: &BankSnapshot) -> Option<BankAccountPayload> {
    (!bank.is_blank()).then(|| BankAccountPayload {
        bank_account_id: bank.bank_account_id.clone(),
        bank_name: bank.bank_name.trim().to_owned(),
        account_number: bank.account_number.trim().to_owned(),
        ifsc_code: bank.ifsc_code.trim().to_ascii_uppercase(),
        account_type: bank.account_type,
    })
}

fn demat_payload(demat: &DematDetails) -> Option<DematAccountPayload> {
    if demat.is_blank() {
        return None;
    }
    Some(DematAccountPayload {
        depository: Depository::parse(&demat.depository)?,
        dp_id: demat.dp_id.trim().to_owned(),
        client_id: demat.client_id.trim().to_owned(),
    })
}

/// Field errors that landed on a known section, plus everything else as
/// generic notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappedRejection {
    pub field_errors: FieldErrors,
    pub notifications: Vec<String>,
}

/// Map a server rejection back onto draft field paths.
pub fn map_rejection(body: &ApiErrorBody) -> MappedRejection {
    let mut mapped = MappedRejection::default();
    for fe in &body.errors {
        let path = normalize_server_path(&fe.field);
        if !path.is_empty() && section_of(&path).is_some() {
            mapped.field_errors.insert(path, fe.message.clone());
        } else {
            mapped.notifications.push(if fe.field.trim().is_empty() {
                fe.message.clone()
            } else {
                format!("{}: {}", fe.field.trim(), fe.message)
            });
        }
    }
    if mapped.field_errors.is_empty() && mapped.notifications.is_empty() {
        mapped
            .notifications
            .push(body.message.clone().unwrap_or_else(|| "The application was rejected".to_owned()));
    }
    mapped
}

/// Whether the drawdown step applies to the current product.
pub fn drawdown_applies(draft: &DraftApplication, rules: &WizardRules) -> bool {
    rules.requires_drawdown(draft.investment.product_id.trim())
}

/// Sum of nominee percentages, rounded to 2 dp; unparsable entries count as 0.
pub fn nominee_total(draft: &DraftApplication) -> Decimal {
    crate::holdings::reconcile::round_weightage(
        draft
            .nominees
            .iter()
            .filter_map(|n| parse_percentage(&n.percentage))
            .sum(),
    )
}

