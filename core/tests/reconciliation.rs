//! Integration tests for the reconciliation matcher.
//!
//! 1. One-sided identifiers are Unmatched with the missing side absent
//! 2. Equal amounts match, a one-cent difference does not
//! 3. Summary counts and percentages add up (including the empty case)
//! 4. Duplicate identifiers produce every combination
//! 5. Malformed uploads reject the whole comparison
//! 6. Export writes the filtered rows back out as CSV

use banktech_core::{
    config::SuiteConfig,
    error::SuiteError,
    reconciliation::{
        reconcile, reconcile_tables, LedgerEntry, ReconStatus, StatusFilter,
    },
    table::CsvTable,
};
use proptest::prelude::*;

fn tables(bank: &str, customer: &str) -> (CsvTable, CsvTable) {
    (
        CsvTable::from_csv_str("Bank ledger", bank).unwrap(),
        CsvTable::from_csv_str("Customer records", customer).unwrap(),
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 1: the canonical two-row example
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn customer_only_row_is_unmatched_with_bank_side_absent() {
    let cfg = SuiteConfig::default_test();
    let (bank, customer) = tables(
        "Transaction_ID,Transactions_Amount\n1,100.00\n",
        "Transaction_ID,Transaction_Amount\n1,100.00\n2,50.00\n",
    );
    let report = reconcile_tables(&bank, &customer, &cfg.reconciliation).unwrap();

    assert_eq!(report.rows.len(), 2);
    assert_eq!(report.rows[0].status, ReconStatus::Matched);
    assert_eq!(report.rows[1].transaction_id, "2");
    assert_eq!(report.rows[1].bank_amount, None);
    assert_eq!(report.rows[1].customer_amount, Some(50.0));
    assert_eq!(report.rows[1].status, ReconStatus::Unmatched);

    assert_eq!(report.summary.matched.count, 1);
    assert_eq!(report.summary.unmatched.count, 1);
    assert_eq!(report.summary.matched.percentage, 50.0);
    assert_eq!(report.summary.unmatched.percentage, 50.0);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 2: exact equality, no tolerance
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn one_cent_difference_is_unmatched() {
    let bank = vec![LedgerEntry::new("7", 250.00)];
    let customer = vec![LedgerEntry::new("7", 250.01)];
    let report = reconcile(&bank, &customer);
    assert_eq!(report.rows[0].status, ReconStatus::Unmatched);
    let diff = report.rows[0].amount_difference().unwrap();
    assert!((diff + 0.01).abs() < 1e-9, "{diff}");
}

#[test]
fn empty_amount_cell_counts_as_absent() {
    let cfg = SuiteConfig::default_test();
    let (bank, customer) = tables(
        "Transaction_ID,Transactions_Amount\n3,\n",
        "Transaction_ID,Transaction_Amount\n3,10\n",
    );
    let report = reconcile_tables(&bank, &customer, &cfg.reconciliation).unwrap();
    assert_eq!(report.rows[0].bank_amount, None);
    assert_eq!(report.rows[0].status, ReconStatus::Unmatched);
    assert_eq!(report.rows[0].amount_difference(), None);
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 3: summary arithmetic
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn empty_inputs_give_zero_percentages() {
    let report = reconcile(&[], &[]);
    assert_eq!(report.summary.total_records, 0);
    assert_eq!(report.summary.matched.percentage, 0.0);
    assert_eq!(report.summary.unmatched.percentage, 0.0);
}

fn ledger() -> impl Strategy<Value = Vec<LedgerEntry>> {
    prop::collection::vec(
        (0u8..12, prop::option::of(0u32..5)).prop_map(|(id, tens)| LedgerEntry {
            transaction_id: id.to_string(),
            amount: tens.map(|t| t as f64 * 10.0),
        }),
        0..15,
    )
}

proptest! {
    #[test]
    fn counts_always_add_up(bank in ledger(), customer in ledger()) {
        let report = reconcile(&bank, &customer);
        let s = &report.summary;
        prop_assert_eq!(s.matched.count + s.unmatched.count, s.total_records);
        prop_assert_eq!(s.total_records, report.rows.len());
        if s.total_records > 0 {
            prop_assert!((s.matched.percentage + s.unmatched.percentage - 100.0).abs() < 1e-9);
        }
        for row in &report.rows {
            let both_equal = matches!(
                (row.bank_amount, row.customer_amount),
                (Some(b), Some(c)) if b == c
            );
            prop_assert_eq!(row.status == ReconStatus::Matched, both_equal);
        }
    }

    #[test]
    fn every_input_id_appears_in_the_output(bank in ledger(), customer in ledger()) {
        let report = reconcile(&bank, &customer);
        for entry in bank.iter().chain(customer.iter()) {
            prop_assert!(report.rows.iter().any(|r| r.transaction_id == entry.transaction_id));
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 4: duplicates
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn duplicate_ids_produce_all_combinations() {
    let bank = vec![LedgerEntry::new("5", 1.0), LedgerEntry::new("5", 2.0)];
    let customer = vec![
        LedgerEntry::new("5", 2.0),
        LedgerEntry::new("5", 3.0),
        LedgerEntry::new("5", 1.0),
    ];
    let report = reconcile(&bank, &customer);
    assert_eq!(report.rows.len(), 6);
    assert_eq!(report.summary.matched.count, 2);
    // Bank order, then customer order.
    let pairs: Vec<_> = report
        .rows
        .iter()
        .map(|r| (r.bank_amount.unwrap(), r.customer_amount.unwrap()))
        .collect();
    assert_eq!(
        pairs,
        vec![(1.0, 2.0), (1.0, 3.0), (1.0, 1.0), (2.0, 2.0), (2.0, 3.0), (2.0, 1.0)]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 5: malformed input
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn missing_amount_column_rejects_the_comparison() {
    let cfg = SuiteConfig::default_test();
    let (bank, customer) = tables(
        "Transaction_ID,Amount\n1,100\n",
        "Transaction_ID,Transaction_Amount\n1,100\n",
    );
    let err = reconcile_tables(&bank, &customer, &cfg.reconciliation).unwrap_err();
    assert!(matches!(err, SuiteError::MissingColumn { ref column, .. } if column == "Transactions_Amount"));
}

#[test]
fn unparseable_amount_names_the_row() {
    let cfg = SuiteConfig::default_test();
    let (bank, customer) = tables(
        "Transaction_ID,Transactions_Amount\n1,100\n2,twelve\n",
        "Transaction_ID,Transaction_Amount\n1,100\n",
    );
    let err = reconcile_tables(&bank, &customer, &cfg.reconciliation).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Bank ledger, row 2: cannot parse Transactions_Amount value 'twelve'"
    );
}

#[test]
fn empty_identifier_is_malformed() {
    let cfg = SuiteConfig::default_test();
    let (bank, customer) = tables(
        "Transaction_ID,Transactions_Amount\n,100\n",
        "Transaction_ID,Transaction_Amount\n1,100\n",
    );
    let err = reconcile_tables(&bank, &customer, &cfg.reconciliation).unwrap_err();
    assert!(matches!(err, SuiteError::EmptyIdentifier { row: 1, .. }), "{err}");
}

#[test]
fn zero_padded_numeric_ids_join_with_plain_ones() {
    let cfg = SuiteConfig::default_test();
    let (bank, customer) = tables(
        "Transaction_ID,Transactions_Amount\n01,100\nTX9,5\n",
        "Transaction_ID,Transaction_Amount\n1,100\nTX09,5\n",
    );
    let report = reconcile_tables(&bank, &customer, &cfg.reconciliation).unwrap();
    assert_eq!(report.rows.len(), 3);
    assert_eq!(report.rows[0].transaction_id, "1");
    assert_eq!(report.rows[0].status, ReconStatus::Matched);
    // Non-numeric ids are compared as written.
    assert!(report.rows[1..].iter().all(|r| r.status == ReconStatus::Unmatched));
}

// ─────────────────────────────────────────────────────────────────────────────
// Test 6: filter and export
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn export_writes_only_unmatched_rows() {
    let bank = vec![LedgerEntry::new("1", 100.0), LedgerEntry::new("2", 75.5)];
    let customer = vec![LedgerEntry::new("1", 100.0), LedgerEntry::new("3", 20.0)];
    let report = reconcile(&bank, &customer);
    assert_eq!(report.filtered(StatusFilter::Matched).len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unmatched.csv");
    let written = report
        .export_csv(std::fs::File::create(&path).unwrap(), StatusFilter::Unmatched)
        .unwrap();
    assert_eq!(written, 2);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "Transaction_ID,Bank_Amount,Customer_Amount,Amount_Difference,Reconciliation_Status\n\
         2,75.50,,,Unmatched\n\
         3,,20.00,,Unmatched\n"
    );
}
