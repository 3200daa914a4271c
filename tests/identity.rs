//! Identity resolution and its application to the draft.

mod common;

use common::*;
use wealth_onboard::draft::{DraftAction, Wizard};
use wealth_onboard::error::OnboardError;
use wealth_onboard::identity::{self, IdentityRole, normalize_person};
use wealth_onboard::types::Gender;
use wealth_onboard::types::bank::BankAccount;
use wealth_onboard::types::enums::{AccountType, HoldingMode};

fn set(wizard: &mut Wizard, path: &str, value: &str) {
    wizard.dispatch(DraftAction::SetField {
        path: path.into(),
        value: value.into(),
    });
}

fn account(id: &str) -> BankAccount {
    BankAccount {
        id: id.into(),
        bank_name: "HDFC Bank".into(),
        account_number: "50100012345678".into(),
        ifsc_code: "HDFC0000123".into(),
        account_type: Some(AccountType::SAVINGS),
    }
}

fn backoffice() -> FakeBackoffice {
    FakeBackoffice::new()
        .with_investor("MA0001", investor("inv-100", person("Anita Rao", "ABCDE1234F")))
        .with_person(person("Vikram Rao", "PQRSX6789K"))
        .with_bank_accounts("inv-100", vec![account("ba-1"), account("ba-2")])
}

// ===================================================================
// Resolver
// ===================================================================

#[tokio::test]
async fn test_primary_resolution_returns_investor_link() {
    let fake = backoffice();
    let resolved = identity::resolve(&fake, " MA0001 ", IdentityRole::Primary)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(resolved.person.name.as_deref(), Some("Anita Rao"));
    assert_eq!(resolved.person.gender, Some(Gender::MALE));
    let link = resolved.investor.unwrap();
    assert_eq!(link.investor_id, "inv-100");
    assert_eq!(link.residential_status.as_deref(), Some("RESIDENT"));
}

#[tokio::test]
async fn test_secondary_lookup_uppercases_pan_and_misses_cleanly() {
    let fake = backoffice();
    let resolved = identity::resolve(&fake, "pqrsx6789k", IdentityRole::Secondary).await.unwrap();
    assert!(resolved.unwrap().investor.is_none());

    let missing = identity::resolve(&fake, "ZZZZZ9999Z", IdentityRole::Secondary).await.unwrap();
    assert!(missing.is_none());

    let err = identity::resolve_existing(&fake, " ZZZZZ9999Z", IdentityRole::Secondary)
        .await
        .unwrap_err();
    assert!(matches!(err, OnboardError::IdentityNotFound(ref id) if id == "ZZZZZ9999Z"));
    assert!(!err.is_transport());
}

#[test]
fn test_normalize_person_cleans_record() {
    let mut raw = person("  Kiran Shah ", "abcde1234f");
    raw.dob = Some("15/08/2012".into());
    raw.email = Some(" Kiran@Example.COM ".into());
    raw.is_minor = true;
    raw.guardian_name = Some("Nisha Shah".into());
    raw.guardian_relationship = Some("MOTHER".into());
    raw.guardian_dob = Some("1984-02-29T00:00:00Z".into());

    let profile = normalize_person(raw);
    assert_eq!(profile.name.as_deref(), Some("Kiran Shah"));
    assert_eq!(profile.pan.as_deref(), Some("ABCDE1234F"));
    assert_eq!(profile.dob.as_deref(), Some("2012-08-15"));
    assert_eq!(profile.email.as_deref(), Some("kiran@example.com"));
    let guardian = profile.guardian.unwrap();
    assert_eq!(guardian.name.as_deref(), Some("Nisha Shah"));
    assert_eq!(guardian.dob.as_deref(), Some("1984-02-29"));
}

#[test]
fn test_adult_record_carries_no_guardian() {
    let mut raw = person("Anita Rao", "ABCDE1234F");
    raw.guardian_name = Some("stale".into());
    assert!(normalize_person(raw).guardian.is_none());
}

// ===================================================================
// Applying results to the draft
// ===================================================================

#[tokio::test]
async fn test_primary_resolution_fills_holder_and_profile() {
    let fake = backoffice();
    let mut wizard = Wizard::default();
    set(&mut wizard, "customerProfile.investorCode", "MA0001");

    assert!(wizard.resolve_holder(&fake, 0).await.unwrap());
    let draft = wizard.draft();
    assert_eq!(draft.customer_profile.investor_id.as_deref(), Some("inv-100"));
    assert_eq!(draft.customer_profile.residential_status, "RESIDENT");
    assert_eq!(draft.holders[0].name, "Anita Rao");
    assert_eq!(draft.holders[0].dob, "1985-04-12");
    assert_eq!(draft.holders[0].address.city, "Bengaluru");
}

#[tokio::test]
async fn test_secondary_miss_keeps_typed_values() {
    let fake = backoffice();
    let mut wizard = Wizard::default();
    wizard.dispatch(DraftAction::SetHoldingMode(HoldingMode::JOINT));
    wizard.dispatch(DraftAction::AddHolder);
    set(&mut wizard, "holders.1.name", "Rohan");
    set(&mut wizard, "holders.1.pan", "LMNOP4321Q");

    assert!(wizard.resolve_holder(&fake, 1).await.unwrap());
    assert_eq!(wizard.draft().holders[1].name, "Rohan");
    assert_eq!(wizard.draft().holders[1].pan, "LMNOP4321Q");
}

#[tokio::test]
async fn test_primary_miss_clears_previous_investor_link() {
    let fake = backoffice();
    let mut wizard = Wizard::default();
    set(&mut wizard, "customerProfile.investorCode", "MA0001");
    wizard.resolve_holder(&fake, 0).await.unwrap();
    wizard.load_bank_accounts(&fake).await.unwrap();
    wizard.dispatch(DraftAction::SelectBankAccount(Some("ba-1".into())));
    assert_eq!(wizard.draft().bank.bank_account_id.as_deref(), Some("ba-1"));

    set(&mut wizard, "customerProfile.investorCode", "MA9999");
    wizard.resolve_holder(&fake, 0).await.unwrap();

    let draft = wizard.draft();
    assert_eq!(draft.customer_profile.investor_id, None);
    assert_eq!(draft.bank.bank_account_id, None);
    assert!(wizard.bank_accounts().is_empty());
    assert_eq!(draft.holders[0].name, "Anita Rao", "person fields are never erased");
}

#[tokio::test]
async fn test_result_for_a_changed_identifier_is_dropped() {
    let fake = backoffice();
    let mut wizard = Wizard::default();
    set(&mut wizard, "customerProfile.investorCode", "MA0001");

    let request = wizard.identity_request(0).unwrap();
    let outcome = identity::resolve(&fake, &request.unique_id, request.role).await.unwrap();

    set(&mut wizard, "customerProfile.investorCode", "MA0002");
    assert!(!wizard.dispatch(DraftAction::ResolveIdentity {
        holder_index: request.holder_index,
        role: request.role,
        unique_id: request.unique_id,
        outcome,
    }));
    assert_eq!(wizard.draft().holders[0].name, "");
    assert!(wizard.draft().customer_profile.investor_id.is_none());
}

#[tokio::test]
async fn test_minor_flag_is_only_raised_by_resolution() {
    let mut minor = person("Kiran Shah", "KLMNO1234P");
    minor.is_minor = true;
    minor.guardian_name = Some("Nisha Shah".into());
    let fake = backoffice().with_person(minor);

    let mut wizard = Wizard::default();
    wizard.dispatch(DraftAction::SetHoldingMode(HoldingMode::JOINT));
    wizard.dispatch(DraftAction::AddHolder);
    set(&mut wizard, "holders.1.pan", "KLMNO1234P");
    wizard.resolve_holder(&fake, 1).await.unwrap();

    let holder = &wizard.draft().holders[1];
    assert!(holder.is_minor);
    assert_eq!(holder.guardian.name, "Nisha Shah");

    fake.persons
        .lock()
        .unwrap()
        .insert("KLMNO1234P".into(), person("Kiran Shah", "KLMNO1234P"));
    wizard.resolve_holder(&fake, 1).await.unwrap();
    assert!(wizard.draft().holders[1].is_minor);
}

#[tokio::test]
async fn test_resolve_all_runs_each_holder_once() {
    let fake = backoffice();
    let mut wizard = Wizard::default();
    wizard.dispatch(DraftAction::SetHoldingMode(HoldingMode::JOINT));
    wizard.dispatch(DraftAction::AddHolder);
    wizard.dispatch(DraftAction::AddHolder);
    set(&mut wizard, "customerProfile.investorCode", "MA0001");
    set(&mut wizard, "holders.1.pan", "PQRSX6789K");

    assert_eq!(wizard.resolve_all(&fake).await, 2);
    assert_eq!(fake.identity_calls.lock().unwrap().len(), 2);
    assert_eq!(wizard.draft().holders[0].name, "Anita Rao");
    assert_eq!(wizard.draft().holders[1].name, "Vikram Rao");
    assert_eq!(wizard.draft().holders[2].name, "");
}

#[tokio::test]
async fn test_transport_failure_leaves_draft_untouched() {
    let fake = backoffice();
    *fake.fail_transport.lock().unwrap() = true;
    let mut wizard = Wizard::default();
    set(&mut wizard, "customerProfile.investorCode", "MA0001");
    let before = wizard.draft().clone();

    let err = wizard.resolve_holder(&fake, 0).await.unwrap_err();
    assert!(err.is_transport());
    assert_eq!(wizard.draft(), &before);
}

// ===================================================================
// Bank accounts
// ===================================================================

#[tokio::test]
async fn test_selecting_a_bank_account_copies_a_snapshot() {
    let fake = backoffice();
    let mut wizard = Wizard::default();
    set(&mut wizard, "customerProfile.investorCode", "MA0001");
    wizard.resolve_holder(&fake, 0).await.unwrap();

    assert_eq!(wizard.load_bank_accounts(&fake).await.unwrap(), 2);
    assert!(wizard.dispatch(DraftAction::SelectBankAccount(Some("ba-2".into()))));
    let bank = &wizard.draft().bank;
    assert_eq!(bank.bank_account_id.as_deref(), Some("ba-2"));
    assert_eq!(bank.ifsc_code, "HDFC0000123");

    assert!(!wizard.dispatch(DraftAction::SelectBankAccount(Some("ba-404".into()))));
    assert!(!wizard.dispatch(DraftAction::BankAccountsLoaded {
        investor_id: "inv-other".into(),
        accounts: vec![account("ba-x")],
    }));
    assert_eq!(wizard.bank_accounts().len(), 2);
}
