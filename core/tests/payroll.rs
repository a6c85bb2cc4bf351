//! Bulk payroll desk: upload, select-all gate, authorization, confirmation
//! and reset.

use banktech_core::{
    config::SuiteConfig,
    error::{SuiteError, SuiteResult},
    payroll::{
        Credentials, PaymentAuthorizer, PayrollDesk, PayrollStage, SalaryBatch,
        SimulatedAuthorizer,
    },
    table::CsvTable,
};
use chrono::NaiveDate;

const SALARIES: &str = "\
Employee ID,Employee Name,Bank Account Number,IFSC Code,Salary Amount (INR)
EMP001,Kavya Menon,12345678901,HDFC0001234,55000
EMP002,Arjun Das,23456789012,SBIN0004321,72000.50
EMP003,Neha Kapoor,34567890123,ICIC0000999,48000
";

fn uploaded() -> PayrollDesk {
    let cfg = SuiteConfig::default_test();
    let table = CsvTable::from_csv_str("Salary file", SALARIES).unwrap();
    let mut desk = PayrollDesk::default();
    desk.upload(&table, &cfg.payroll).unwrap();
    desk
}

fn creds(username: &str, password: &str) -> Credentials {
    Credentials {
        username: username.into(),
        password: password.into(),
    }
}

fn noon() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 4, 7)
        .unwrap()
        .and_hms_opt(14, 5, 9)
        .unwrap()
}

#[test]
fn upload_totals_the_batch() {
    let desk = uploaded();
    let batch = desk.batch().unwrap();
    assert_eq!(batch.employees(), 3);
    assert_eq!(batch.total_amount, 175_000.5);
    assert_eq!(desk.stage, PayrollStage::Uploaded);

    let selection = desk.selection().unwrap();
    assert_eq!(selection.selected_records, 0);
    assert_eq!(selection.selected_amount, 0.0);
}

#[test]
fn processing_requires_select_all() {
    let mut desk = uploaded();
    assert!(matches!(desk.request_processing(), Err(SuiteError::Payroll(_))));

    let selection = desk.set_select_all(true).unwrap();
    assert_eq!(selection.selected_records, 3);
    assert_eq!(selection.selected_amount, 175_000.5);
    assert_eq!(desk.request_processing().unwrap(), PayrollStage::AuthRequired);
}

#[test]
fn blank_credentials_are_rejected_and_desk_keeps_waiting() {
    let mut desk = uploaded();
    desk.set_select_all(true).unwrap();
    desk.request_processing().unwrap();

    let err = desk
        .authenticate(&SimulatedAuthorizer, &creds("ops", ""), 0.0, noon())
        .unwrap_err();
    assert!(matches!(err, SuiteError::Authentication(_)));
    assert_eq!(desk.stage, PayrollStage::AuthRequired);
    assert!(desk.confirmation.is_none());
}

#[test]
fn successful_authorization_confirms_the_payment() {
    let mut desk = uploaded();
    desk.set_select_all(true).unwrap();
    desk.request_processing().unwrap();

    let confirmation = desk
        .authenticate(&SimulatedAuthorizer, &creds("ops", "secret"), 0.0, noon())
        .unwrap();
    assert_eq!(confirmation.reference, "TXN20250407140509");
    assert_eq!(confirmation.processed_at, "07-Apr-2025 14:05:09");
    assert_eq!(confirmation.employees, 3);
    assert_eq!(confirmation.processing_fee, 0.0);
    assert_eq!(confirmation.total_debited, 175_000.5);
    assert_eq!(desk.stage, PayrollStage::Processed);

    // Selection is locked once processed.
    assert!(desk.set_select_all(false).is_err());
}

#[test]
fn cancel_and_new_transaction_reset_the_flow() {
    let mut desk = uploaded();
    desk.set_select_all(true).unwrap();
    desk.request_processing().unwrap();
    assert_eq!(desk.cancel_authentication().unwrap(), PayrollStage::Uploaded);
    assert!(desk.selected_all);

    desk.request_processing().unwrap();
    desk.authenticate(&SimulatedAuthorizer, &creds("a", "b"), 0.0, noon())
        .unwrap();
    assert_eq!(desk.new_transaction().unwrap(), PayrollStage::Uploaded);
    assert!(!desk.selected_all);
    assert!(desk.confirmation.is_none());
    assert_eq!(desk.batch().unwrap().employees(), 3);
}

struct RejectAll;

impl PaymentAuthorizer for RejectAll {
    fn authorize(&self, _: &Credentials, batch: &SalaryBatch) -> SuiteResult<()> {
        Err(SuiteError::Authentication(format!(
            "limit exceeded for {} employees",
            batch.employees()
        )))
    }
}

#[test]
fn authorizer_is_pluggable() {
    let mut desk = uploaded();
    desk.set_select_all(true).unwrap();
    desk.request_processing().unwrap();
    let err = desk
        .authenticate(&RejectAll, &creds("ops", "secret"), 0.0, noon())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Authentication failed: limit exceeded for 3 employees"
    );
}

#[test]
fn missing_amount_column_rejects_the_file() {
    let cfg = SuiteConfig::default_test();
    let table = CsvTable::from_csv_str(
        "Salary file",
        "Employee ID,Employee Name,Bank Account Number,IFSC Code,Salary\nE1,A,1,X,10\n",
    )
    .unwrap();
    let mut desk = PayrollDesk::default();
    assert!(matches!(
        desk.upload(&table, &cfg.payroll),
        Err(SuiteError::MissingColumn { .. })
    ));
    assert_eq!(desk.stage, PayrollStage::Empty);
}
