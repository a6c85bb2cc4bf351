//! Session event log.
//!
//! Every command a desk handles emits one or more `SuiteEvent`s. The engine
//! serializes them into the session's own `event_log` table so a session's
//! history can be inspected without keeping the views around.

use crate::{
    reconciliation::StatusFilter,
    risk::RiskCategory,
    types::{Amount, SessionId},
};
use serde::{Deserialize, Serialize};

/// Variants are added per desk, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SuiteEvent {
    // ── Session ────────────────────────────────────
    SessionOpened {
        session_id: SessionId,
    },
    CommandFailed {
        command: String,
        error: String,
    },

    // ── Reconciliation ─────────────────────────────
    BankLedgerUploaded {
        records: usize,
    },
    CustomerRecordsUploaded {
        records: usize,
    },
    ReconciliationCompleted {
        total_records: usize,
        matched: usize,
        unmatched: usize,
    },
    ReconciliationFiltered {
        filter: StatusFilter,
        rows: usize,
    },

    // ── Credit risk ────────────────────────────────
    RiskPortfolioLoaded {
        records: usize,
        unique_customers: usize,
    },
    CustomerAssessed {
        customer_id: String,
        score: u32,
        category: RiskCategory,
    },

    // ── Transactions ───────────────────────────────
    TransactionsLoaded {
        records: usize,
    },
    TransactionsQueried {
        search_key: String,
        matches: usize,
        page: usize,
    },
    ReportGenerated {
        customer_name: String,
        placeholder: bool,
    },

    // ── Payroll ────────────────────────────────────
    SalaryFileUploaded {
        employees: usize,
        total_amount: Amount,
    },
    PayrollStageChanged {
        stage: String,
    },
    PaymentProcessed {
        reference: String,
        employees: usize,
        total_debited: Amount,
    },
}

impl SuiteEvent {
    /// Stable string name for the `event_type` column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SessionOpened { .. }            => "session_opened",
            Self::CommandFailed { .. }            => "command_failed",
            Self::BankLedgerUploaded { .. }       => "bank_ledger_uploaded",
            Self::CustomerRecordsUploaded { .. }  => "customer_records_uploaded",
            Self::ReconciliationCompleted { .. }  => "reconciliation_completed",
            Self::ReconciliationFiltered { .. }   => "reconciliation_filtered",
            Self::RiskPortfolioLoaded { .. }      => "risk_portfolio_loaded",
            Self::CustomerAssessed { .. }         => "customer_assessed",
            Self::TransactionsLoaded { .. }       => "transactions_loaded",
            Self::TransactionsQueried { .. }      => "transactions_queried",
            Self::ReportGenerated { .. }          => "report_generated",
            Self::SalaryFileUploaded { .. }       => "salary_file_uploaded",
            Self::PayrollStageChanged { .. }      => "payroll_stage_changed",
            Self::PaymentProcessed { .. }         => "payment_processed",
        }
    }
}

/// The event log entry as persisted to SQLite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id: Option<i64>,
    pub session_id: SessionId,
    /// Command sequence number within the session.
    pub seq: u64,
    pub desk: String,
    pub event_type: String,
    pub payload: String, // JSON-serialized SuiteEvent
}
