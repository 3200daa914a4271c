//! Holdings reconciliation: allocation summary, commit checks, ISIN linking
//! and the two save operations.

mod common;

use common::*;
use rust_decimal::Decimal;
use wealth_onboard::error::OnboardError;
use wealth_onboard::holdings::*;
use wealth_onboard::types::SecurityType;

fn editor() -> HoldingsEditor {
    HoldingsEditor::new(
        "inv-1",
        date(2025, 3, 31),
        vec![holding("h1", "INE002A01018", "40"), holding("h2", "INE009A01021", "35")],
    )
}

fn stage(editor: &mut HoldingsEditor) -> RowId {
    match editor.dispatch(HoldingsAction::StageHolding) {
        HoldingsEffect::Staged(row_id) => row_id,
        other => panic!("expected a staged row, got {other:?}"),
    }
}

fn set_weightage(editor: &mut HoldingsEditor, row_id: RowId, value: &str) {
    editor.dispatch(HoldingsAction::EditStaged {
        row_id,
        field: HoldingField::Weightage(value.into()),
    });
}

fn set_isin(editor: &mut HoldingsEditor, row_id: RowId, isin: &str) -> HoldingsEffect {
    editor.dispatch(HoldingsAction::EditStaged {
        row_id,
        field: HoldingField::IsinCode(isin.into()),
    })
}

// ===================================================================
// Allocation summary
// ===================================================================

#[test]
fn test_cash_equivalent_fills_remaining_allocation() {
    let mut editor = editor();
    let row = stage(&mut editor);
    set_weightage(&mut editor, row, "20");

    let summary = editor.summary();
    assert_eq!(summary.stock, dec("75"));
    assert_eq!(summary.new, dec("20"));
    assert_eq!(summary.cash_equivalent, dec("5"));
    assert_eq!(summary.total, dec("100"));
    assert!(!summary.is_over_allocated());
}

#[test]
fn test_over_allocation_is_rejected_with_rounded_total() {
    let mut editor = editor();
    let row = stage(&mut editor);
    set_weightage(&mut editor, row, "30");

    let summary = editor.summary();
    assert_eq!(summary.cash_equivalent, Decimal::ZERO);
    assert_eq!(summary.total, dec("105"));

    let err = editor.check_commit().unwrap_err();
    assert!(matches!(err, OnboardError::WeightageExceeded { allocated } if allocated == dec("105")));
    assert!(err.to_string().contains("105.00%"), "got: {err}");
}

#[test]
fn test_sub_hundredth_drift_is_not_over_allocation() {
    let mut editor = HoldingsEditor::new("inv-1", date(2025, 3, 31), Vec::new());
    let a = stage(&mut editor);
    let b = stage(&mut editor);
    set_weightage(&mut editor, a, "50.004");
    set_weightage(&mut editor, b, "50.004");

    let summary = editor.summary();
    assert_eq!(summary.new, dec("100"));
    assert!(!summary.is_over_allocated());
}

#[test]
fn test_existing_edits_replace_persisted_weightage() {
    let mut editor = editor();
    editor.dispatch(HoldingsAction::EditExisting {
        holding_id: "h1".into(),
        field: HoldingField::Weightage("10".into()),
    });
    assert_eq!(editor.summary().stock, dec("45"));

    editor.dispatch(HoldingsAction::RevertExisting("h1".into()));
    assert_eq!(editor.summary().stock, dec("75"));
}

#[test]
fn test_negative_and_garbage_weightages_count_as_zero_but_block_commit() {
    let mut editor = editor();
    let a = stage(&mut editor);
    let b = stage(&mut editor);
    set_weightage(&mut editor, a, "-5");
    set_weightage(&mut editor, b, "abc");

    assert_eq!(editor.summary().new, Decimal::ZERO);
    match editor.check_commit() {
        Err(OnboardError::Validation(errors)) => assert_eq!(errors.len(), 2),
        other => panic!("expected validation errors, got {other:?}"),
    }
}

#[test]
fn test_summarize_rounds_half_away_from_zero() {
    let summary = summarize([dec("33.335")], [dec("0.005")]);
    assert_eq!(summary.stock, dec("33.34"));
    assert_eq!(summary.new, dec("0.01"));
    assert_eq!(summary.cash_equivalent, dec("66.65"));
}

#[test]
fn test_summary_fields_carry_two_decimal_places() {
    let mut editor = HoldingsEditor::new("inv-1", date(2025, 3, 31), vec![holding("h1", "INE002A01018", "15")]);
    let row = stage(&mut editor);
    set_weightage(&mut editor, row, "45");

    let summary = editor.summary();
    assert_eq!(summary.stock.to_string(), "15.00");
    assert_eq!(summary.new.to_string(), "45.00");
    assert_eq!(summary.cash_equivalent.to_string(), "40.00");
    assert_eq!(summary.total.to_string(), "100.00");
}

// ===================================================================
// ISIN linking
// ===================================================================

#[test]
fn test_short_isin_issues_no_lookup() {
    let mut editor = editor();
    let row = stage(&mut editor);
    assert_eq!(set_isin(&mut editor, row, "in"), HoldingsEffect::None);
    assert_eq!(editor.staged_row(row).unwrap().link, LinkState::Unlinked);
}

#[test]
fn test_stale_lookup_result_is_ignored() {
    let mut editor = editor();
    let row = stage(&mut editor);

    let HoldingsEffect::Lookup(first) = set_isin(&mut editor, row, "INE040A01034") else {
        panic!("expected a lookup");
    };
    let HoldingsEffect::Lookup(second) = set_isin(&mut editor, row, "INE467B01029") else {
        panic!("expected a lookup");
    };

    let effect = editor.dispatch(HoldingsAction::LookupCompleted {
        ticket: first,
        found: Some(reference("ml-hdfc", "INE040A01034", "HDFC Bank")),
    });
    assert_eq!(effect, HoldingsEffect::Ignored);
    assert_eq!(editor.staged_row(row).unwrap().link, LinkState::Pending);

    editor.dispatch(HoldingsAction::LookupCompleted {
        ticket: second,
        found: Some(reference("ml-tcs", "INE467B01029", "Tata Consultancy Services")),
    });
    let linked = editor.staged_row(row).unwrap().reference().unwrap();
    assert_eq!(linked.market_list_id, "ml-tcs");
    assert_eq!(linked.company_name.as_deref(), Some("Tata Consultancy Services"));
}

#[test]
fn test_every_isin_change_issues_a_fresh_lookup() {
    let mut editor = editor();
    let row = stage(&mut editor);

    let HoldingsEffect::Lookup(ticket) = set_isin(&mut editor, row, "INE040A01034") else {
        panic!("expected a lookup");
    };
    editor.dispatch(HoldingsAction::LookupCompleted {
        ticket,
        found: Some(reference("ml-hdfc", "INE040A01034", "HDFC Bank")),
    });

    assert!(matches!(set_isin(&mut editor, row, "INE040A0103"), HoldingsEffect::Lookup(_)));
    assert!(matches!(set_isin(&mut editor, row, "INE040A01034"), HoldingsEffect::Lookup(_)));
    // Known from this session, so linked before the new lookup returns.
    assert!(editor.staged_row(row).unwrap().is_ready());

    assert_eq!(set_isin(&mut editor, row, "ine040a01034"), HoldingsEffect::None);
}

#[tokio::test]
async fn test_each_isin_change_reaches_the_server() {
    let fake = FakeBackoffice::new().with_reference(reference("ml-ril", "INE002A01018", "Reliance Industries"));
    let mut editor = editor();
    let row = stage(&mut editor);

    assert!(editor.set_staged_isin(&fake, row, "INE002A01018").await.unwrap());
    assert!(editor.set_staged_isin(&fake, row, "INE002A0101").await.unwrap());
    assert!(editor.set_staged_isin(&fake, row, "INE002A01018").await.unwrap());

    assert_eq!(fake.lookups.lock().unwrap().len(), 3);
    assert_eq!(editor.staged_row(row).unwrap().reference().unwrap().market_list_id, "ml-ril");
}

#[test]
fn test_replacing_existing_isin_requires_a_resolved_reference() {
    let mut editor = editor();
    let HoldingsEffect::Lookup(ticket) = editor.dispatch(HoldingsAction::EditExisting {
        holding_id: "h1".into(),
        field: HoldingField::IsinCode("ine999z01019".into()),
    }) else {
        panic!("expected a lookup");
    };
    assert_eq!(ticket.target, LookupTarget::Existing("h1".into()));
    assert_eq!(ticket.isin, "INE999Z01019");
    assert_eq!(editor.edit("h1").unwrap().link, LinkState::Pending);

    match editor.prepare_update() {
        Err(OnboardError::UnresolvedReference {
            row_ids,
            holding_ids,
            isins,
        }) => {
            assert!(row_ids.is_empty());
            assert_eq!(holding_ids, vec!["h1".to_owned()]);
            assert_eq!(isins, vec!["INE999Z01019".to_owned()]);
        }
        other => panic!("expected unresolved reference, got {other:?}"),
    }

    editor.dispatch(HoldingsAction::LookupCompleted {
        ticket,
        found: Some(reference("ml-new", "INE999Z01019", "New Listing Ltd")),
    });
    let req = editor.prepare_update().unwrap();
    assert_eq!(req.holdings.len(), 1);
    assert_eq!(req.holdings[0].isin_code.as_deref(), Some("INE999Z01019"));
    assert_eq!(req.holdings[0].market_list_id.as_deref(), Some("ml-new"));
    assert_eq!(editor.linker().cached("ine999z01019").unwrap().id, "ml-new");
}

#[test]
fn test_existing_isin_lookup_for_a_reverted_edit_is_ignored() {
    let mut editor = editor();
    let HoldingsEffect::Lookup(ticket) = editor.dispatch(HoldingsAction::EditExisting {
        holding_id: "h1".into(),
        field: HoldingField::IsinCode("INE040A01034".into()),
    }) else {
        panic!("expected a lookup");
    };

    // Typing the stored ISIN back drops the replacement without a lookup.
    let effect = editor.dispatch(HoldingsAction::EditExisting {
        holding_id: "h1".into(),
        field: HoldingField::IsinCode(" ine002a01018 ".into()),
    });
    assert_eq!(effect, HoldingsEffect::None);
    assert_eq!(editor.edit("h1").unwrap().isin_code, None);

    let effect = editor.dispatch(HoldingsAction::LookupCompleted {
        ticket,
        found: Some(reference("ml-hdfc", "INE040A01034", "HDFC Bank")),
    });
    assert_eq!(effect, HoldingsEffect::Ignored);
    assert!(editor.check_commit().is_ok());
    assert!(editor.prepare_update().unwrap().holdings.is_empty());
}

#[tokio::test]
async fn test_existing_isin_edit_saves_with_new_reference() {
    let fake = FakeBackoffice::new().with_reference(reference("ml-infy", "INE009A01021", "Infosys"));
    let mut editor = editor();

    assert!(editor.set_existing_isin(&fake, "h1", "ine009a01021").await.unwrap());
    assert_eq!(fake.lookups.lock().unwrap().clone(), vec!["INE009A01021".to_owned()]);
    assert_eq!(editor.save_existing(&fake).await.unwrap(), 1);

    let sent = fake.updates.lock().unwrap()[0].clone();
    assert_eq!(sent.holdings[0].isin_code.as_deref(), Some("INE009A01021"));
    assert_eq!(sent.holdings[0].market_list_id.as_deref(), Some("ml-infy"));
    assert_eq!(editor.existing()[0].market_list_id.as_deref(), Some("ml-infy"));
}

#[tokio::test]
async fn test_missing_reference_for_existing_isin_can_be_created() {
    let fake = FakeBackoffice::new();
    let mut editor = editor();
    editor.set_existing_isin(&fake, "h2", "INE777Q01015").await.unwrap();
    assert_eq!(editor.edit("h2").unwrap().link, LinkState::Missing);
    assert!(editor.save_existing(&fake).await.is_err());

    let entry = editor
        .save_existing_reference(
            &fake,
            "h2",
            ReferenceDetails {
                company_name: "Quiet Growth Ltd".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(fake.reference_writes.lock().unwrap()[0].1.isin, "INE777Q01015");

    assert_eq!(editor.save_existing(&fake).await.unwrap(), 1);
    let sent = fake.updates.lock().unwrap()[0].clone();
    assert_eq!(sent.holdings[0].holding_id, "h2");
    assert_eq!(sent.holdings[0].market_list_id.as_deref(), Some(entry.id.as_str()));
}

#[tokio::test]
async fn test_transport_failure_leaves_row_unlinked() {
    let fake = FakeBackoffice::new();
    *fake.fail_transport.lock().unwrap() = true;
    let mut editor = editor();
    let row = stage(&mut editor);

    assert!(editor.set_staged_isin(&fake, row, "INE002A01018").await.is_err());
    assert_eq!(editor.staged_row(row).unwrap().link, LinkState::Unlinked);
}

// ===================================================================
// Commit
// ===================================================================

#[tokio::test]
async fn test_unresolved_reference_blocks_save_until_created() {
    let fake = FakeBackoffice::new();
    let mut editor = editor();
    let row = stage(&mut editor);
    set_weightage(&mut editor, row, "20");
    editor.set_staged_isin(&fake, row, "INE999Z01011").await.unwrap();
    assert_eq!(editor.staged_row(row).unwrap().link, LinkState::Missing);

    match editor.save_staged(&fake).await {
        Err(OnboardError::UnresolvedReference {
            row_ids,
            holding_ids,
            isins,
        }) => {
            assert_eq!(row_ids, vec![row.0]);
            assert!(holding_ids.is_empty());
            assert_eq!(isins, vec!["INE999Z01011".to_owned()]);
        }
        other => panic!("expected unresolved reference, got {other:?}"),
    }
    assert!(fake.creates.lock().unwrap().is_empty());

    let entry = editor
        .save_reference(
            &fake,
            row,
            ReferenceDetails {
                company_name: "Example Microcap".into(),
                sector: Some("Chemicals".into()),
                category_id: None,
            },
        )
        .await
        .unwrap();

    let writes = fake.reference_writes.lock().unwrap().clone();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, None);
    assert_eq!(writes[0].1.isin, "INE999Z01011");
    assert_eq!(writes[0].1.as_on_date, date(2025, 3, 31));

    let linked = editor.staged_row(row).unwrap().reference().unwrap();
    assert_eq!(linked.market_list_id, entry.id);

    assert_eq!(editor.save_staged(&fake).await.unwrap(), 1);
    let creates = fake.creates.lock().unwrap().clone();
    assert_eq!(creates[0].holdings[0].market_list_id, entry.id);
    assert!(editor.staged().is_empty());
    assert_eq!(editor.existing().len(), 3);
}

#[tokio::test]
async fn test_save_reference_updates_linked_entry() {
    let fake = FakeBackoffice::new().with_reference(reference("ml-ril", "INE002A01018", "Reliance"));
    let mut editor = editor();
    let row = stage(&mut editor);
    editor.set_staged_isin(&fake, row, "INE002A01018").await.unwrap();

    editor
        .save_reference(
            &fake,
            row,
            ReferenceDetails {
                company_name: "Reliance Industries Ltd".into(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let writes = fake.reference_writes.lock().unwrap().clone();
    assert_eq!(writes[0].0.as_deref(), Some("ml-ril"));
    let linked = editor.staged_row(row).unwrap().reference().unwrap();
    assert_eq!(linked.company_name.as_deref(), Some("Reliance Industries Ltd"));
}

#[tokio::test]
async fn test_unlinked_staged_row_blocks_update_of_existing() {
    let fake = FakeBackoffice::new();
    let mut editor = editor();
    let row = stage(&mut editor);
    set_isin(&mut editor, row, "INE999Z01011");
    editor.dispatch(HoldingsAction::EditExisting {
        holding_id: "h1".into(),
        field: HoldingField::Weightage("45".into()),
    });

    assert!(matches!(
        editor.save_existing(&fake).await,
        Err(OnboardError::UnresolvedReference { .. })
    ));
    assert!(fake.updates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_over_allocation_blocks_both_saves() {
    let fake = FakeBackoffice::new();
    let mut editor = editor();
    editor.dispatch(HoldingsAction::EditExisting {
        holding_id: "h1".into(),
        field: HoldingField::Weightage("70".into()),
    });

    assert!(matches!(
        editor.save_existing(&fake).await,
        Err(OnboardError::WeightageExceeded { .. })
    ));
    assert!(matches!(
        editor.save_staged(&fake).await,
        Err(OnboardError::WeightageExceeded { .. })
    ));
    assert!(fake.updates.lock().unwrap().is_empty());
    assert!(fake.creates.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_save_existing_sends_only_changed_fields() {
    let fake = FakeBackoffice::new();
    let mut editor = editor();
    let row = stage(&mut editor);
    set_weightage(&mut editor, row, "5");
    let HoldingsEffect::Lookup(ticket) = set_isin(&mut editor, row, "INE040A01034") else {
        panic!("expected a lookup");
    };
    editor.dispatch(HoldingsAction::LookupCompleted {
        ticket,
        found: Some(reference("ml-hdfc", "INE040A01034", "HDFC Bank")),
    });

    editor.dispatch(HoldingsAction::EditExisting {
        holding_id: "h1".into(),
        field: HoldingField::Weightage("45".into()),
    });
    editor.dispatch(HoldingsAction::EditExisting {
        holding_id: "h2".into(),
        field: HoldingField::Weightage("35".into()),
    });
    editor.dispatch(HoldingsAction::EditExisting {
        holding_id: "h2".into(),
        field: HoldingField::SecurityType(SecurityType::EQUITY),
    });

    assert_eq!(editor.save_existing(&fake).await.unwrap(), 2);

    let sent = fake.updates.lock().unwrap()[0].clone();
    assert_eq!(sent.holdings_as_on_date, date(2025, 3, 31));
    assert_eq!(sent.holdings[0].holding_id, "h1");
    assert_eq!(sent.holdings[0].portfolio_weightage, Some(dec("45")));
    assert_eq!(sent.holdings[1].portfolio_weightage, None);
    assert_eq!(sent.holdings[1].security_type, Some(SecurityType::EQUITY));

    assert!(editor.edit("h1").is_none());
    assert_eq!(editor.staged().len(), 1, "staged rows are saved separately");
}

#[tokio::test]
async fn test_load_starts_from_snapshot() {
    let fake = FakeBackoffice::new();
    fake.snapshots.lock().unwrap().insert(
        "inv-9".into(),
        wealth_onboard::types::holdings::HoldingsSnapshot {
            holdings_as_on_date: Some(date(2024, 12, 31)),
            holdings: vec![holding("h1", "INE002A01018", "60")],
        },
    );

    let editor = HoldingsEditor::load(&fake, "inv-9", date(2025, 1, 1)).await.unwrap();
    assert_eq!(editor.as_on_date(), date(2024, 12, 31));
    assert_eq!(editor.summary().cash_equivalent, dec("40"));
}
