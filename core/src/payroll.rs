//! Bulk payroll desk: salary file upload, selection, authorization and
//! payment confirmation.
//!
//! Stage flow:
//!   Empty → Uploaded → AuthRequired → Processed
//!   AuthRequired --cancel--> Uploaded
//!   Processed --new transaction--> Uploaded (same file, selection cleared)
//!
//! Authorization goes through `PaymentAuthorizer`. The bundled
//! `SimulatedAuthorizer` only checks that both fields are filled in; a real
//! settlement integration replaces it without touching the desk.

use crate::{
    config::{PayrollColumns, PayrollConfig},
    error::{SuiteError, SuiteResult},
    table::CsvTable,
    types::Amount,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub employee_id: String,
    pub employee_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryBatch {
    pub records: Vec<SalaryRecord>,
    pub total_amount: Amount,
}

impl SalaryBatch {
    pub fn employees(&self) -> usize {
        self.records.len()
    }
}

pub fn load_salary_file(table: &CsvTable, columns: &PayrollColumns) -> SuiteResult<SalaryBatch> {
    let id = table.column(&columns.employee_id)?;
    let name = table.column(&columns.employee_name)?;
    let account = table.column(&columns.account_number)?;
    let ifsc = table.column(&columns.ifsc_code)?;
    let amount = table.column(&columns.amount)?;

    let records = (0..table.len())
        .map(|row| {
            Ok(SalaryRecord {
                employee_id: table.text(row, &id)?,
                employee_name: table.text(row, &name)?,
                account_number: table.text(row, &account)?,
                ifsc_code: table.text(row, &ifsc)?,
                amount: table.decimal(row, &amount)?,
            })
        })
        .collect::<SuiteResult<Vec<_>>>()?;

    let total_amount = records.iter().map(|r| r.amount).sum();
    Ok(SalaryBatch {
        records,
        total_amount,
    })
}

// ── Authorization boundary ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

pub trait PaymentAuthorizer {
    /// Approve or reject releasing `batch`. No partial approval.
    fn authorize(&self, credentials: &Credentials, batch: &SalaryBatch) -> SuiteResult<()>;
}

/// Accepts any non-empty username/password pair.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedAuthorizer;

impl PaymentAuthorizer for SimulatedAuthorizer {
    fn authorize(&self, credentials: &Credentials, _batch: &SalaryBatch) -> SuiteResult<()> {
        if credentials.username.is_empty() || credentials.password.is_empty() {
            return Err(SuiteError::Authentication(
                "Please fill in all authentication fields".into(),
            ));
        }
        Ok(())
    }
}

// ── Desk ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayrollStage {
    #[default]
    Empty,
    Uploaded,
    AuthRequired,
    Processed,
}

impl PayrollStage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Uploaded => "uploaded",
            Self::AuthRequired => "auth_required",
            Self::Processed => "processed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionSummary {
    pub total_records: usize,
    pub selected_records: usize,
    pub selected_amount: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentConfirmation {
    pub reference: String,
    pub processed_at: String,
    pub employees: usize,
    pub total_amount: Amount,
    pub processing_fee: Amount,
    pub total_debited: Amount,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PayrollDesk {
    batch: Option<SalaryBatch>,
    pub selected_all: bool,
    pub stage: PayrollStage,
    pub confirmation: Option<PaymentConfirmation>,
}

impl PayrollDesk {
    pub fn batch(&self) -> Option<&SalaryBatch> {
        self.batch.as_ref()
    }

    /// A new upload replaces the batch and starts the flow over.
    pub fn upload(&mut self, table: &CsvTable, config: &PayrollConfig) -> SuiteResult<&SalaryBatch> {
        let batch = load_salary_file(table, &config.columns)?;
        log::info!(
            "payroll: uploaded {} employees totaling {:.2}",
            batch.employees(),
            batch.total_amount
        );
        self.selected_all = false;
        self.stage = PayrollStage::Uploaded;
        self.confirmation = None;
        Ok(self.batch.insert(batch))
    }

    fn require_batch(&self) -> SuiteResult<&SalaryBatch> {
        self.batch.as_ref().ok_or(SuiteError::NotLoaded {
            what: "Salary file",
        })
    }

    pub fn set_select_all(&mut self, selected: bool) -> SuiteResult<SelectionSummary> {
        self.require_batch()?;
        if self.stage != PayrollStage::Uploaded {
            return Err(SuiteError::Payroll(format!(
                "selection is locked while {}",
                self.stage.name()
            )));
        }
        self.selected_all = selected;
        self.selection()
    }

    pub fn selection(&self) -> SuiteResult<SelectionSummary> {
        let batch = self.require_batch()?;
        Ok(SelectionSummary {
            total_records: batch.employees(),
            selected_records: if self.selected_all { batch.employees() } else { 0 },
            selected_amount: if self.selected_all { batch.total_amount } else { 0.0 },
        })
    }

    /// "Process Selected Payments": requires every record selected.
    pub fn request_processing(&mut self) -> SuiteResult<PayrollStage> {
        self.require_batch()?;
        if self.stage != PayrollStage::Uploaded {
            return Err(SuiteError::Payroll(format!(
                "cannot process payments while {}",
                self.stage.name()
            )));
        }
        if !self.selected_all {
            return Err(SuiteError::Payroll(
                "Please select all records to continue with payment processing.".into(),
            ));
        }
        self.stage = PayrollStage::AuthRequired;
        Ok(self.stage)
    }

    pub fn cancel_authentication(&mut self) -> SuiteResult<PayrollStage> {
        if self.stage != PayrollStage::AuthRequired {
            return Err(SuiteError::Payroll("no authentication pending".into()));
        }
        self.stage = PayrollStage::Uploaded;
        Ok(self.stage)
    }

    /// Authorize and release the batch. A rejected authorization leaves the
    /// desk waiting for credentials.
    pub fn authenticate(
        &mut self,
        authorizer: &dyn PaymentAuthorizer,
        credentials: &Credentials,
        processing_fee: Amount,
        now: NaiveDateTime,
    ) -> SuiteResult<PaymentConfirmation> {
        if self.stage != PayrollStage::AuthRequired {
            return Err(SuiteError::Payroll("no authentication pending".into()));
        }
        let batch = self.require_batch()?;
        authorizer.authorize(credentials, batch)?;

        let confirmation = PaymentConfirmation {
            reference: format!("TXN{}", now.format("%Y%m%d%H%M%S")),
            processed_at: now.format("%d-%b-%Y %H:%M:%S").to_string(),
            employees: batch.employees(),
            total_amount: batch.total_amount,
            processing_fee,
            total_debited: batch.total_amount + processing_fee,
        };
        log::info!(
            "payroll: processed {} ({} employees, {:.2} debited)",
            confirmation.reference,
            confirmation.employees,
            confirmation.total_debited
        );
        self.stage = PayrollStage::Processed;
        self.confirmation = Some(confirmation.clone());
        Ok(confirmation)
    }

    /// "New Transaction": keep the file, clear selection and flags.
    pub fn new_transaction(&mut self) -> SuiteResult<PayrollStage> {
        self.require_batch()?;
        self.selected_all = false;
        self.confirmation = None;
        self.stage = PayrollStage::Uploaded;
        Ok(self.stage)
    }
}
