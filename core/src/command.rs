use crate::{
    reconciliation::StatusFilter,
    risk::CustomerSearchField,
    transactions::{SearchField, SortKey},
    types::SessionId,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where an uploaded table comes from: a file on disk or CSV text inline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableInput {
    Path { path: PathBuf },
    Inline { csv: String },
}

/// Every action a desk accepts.
/// Variants are added per desk, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum DeskCommand {
    // ── Session ───────────────────────────────────
    OpenSession,
    CloseSession,
    SessionEvents,
    Quit,

    // ── Reconciliation ────────────────────────────
    UploadBankLedger {
        file: TableInput,
    },
    UploadCustomerRecords {
        file: TableInput,
    },
    CompareLedgers,
    FilterReconciliation {
        filter: StatusFilter,
    },
    ExportReconciliation {
        path: PathBuf,
        #[serde(default)]
        filter: StatusFilter,
    },

    // ── Credit risk ───────────────────────────────
    UploadRiskProfiles {
        file: TableInput,
    },
    PortfolioOverview,
    AssessCustomer {
        term: String,
        #[serde(default)]
        field: CustomerSearchField,
    },

    // ── Transactions ──────────────────────────────
    UploadTransactions {
        file: TableInput,
    },
    QueryTransactions {
        #[serde(default)]
        term: String,
        #[serde(default)]
        field: SearchField,
        #[serde(default)]
        sort: SortKey,
    },
    NextPage,
    PreviousPage,
    TransactionCharts,
    GenerateReport,
    HideReport,

    // ── Payroll ───────────────────────────────────
    UploadSalaryFile {
        file: TableInput,
    },
    SelectAllEmployees {
        selected: bool,
    },
    ProcessPayments,
    Authenticate {
        username: String,
        password: String,
    },
    CancelAuthentication,
    NewTransaction,

    // ── Dashboard ─────────────────────────────────
    Dashboard,
}

impl DeskCommand {
    /// Desk name recorded alongside the command's events.
    pub fn desk(&self) -> &'static str {
        match self {
            Self::OpenSession | Self::CloseSession | Self::SessionEvents | Self::Quit => "session",
            Self::UploadBankLedger { .. }
            | Self::UploadCustomerRecords { .. }
            | Self::CompareLedgers
            | Self::FilterReconciliation { .. }
            | Self::ExportReconciliation { .. } => "reconciliation",
            Self::UploadRiskProfiles { .. }
            | Self::PortfolioOverview
            | Self::AssessCustomer { .. } => "risk",
            Self::UploadTransactions { .. }
            | Self::QueryTransactions { .. }
            | Self::NextPage
            | Self::PreviousPage
            | Self::TransactionCharts
            | Self::GenerateReport
            | Self::HideReport => "transactions",
            Self::UploadSalaryFile { .. }
            | Self::SelectAllEmployees { .. }
            | Self::ProcessPayments
            | Self::Authenticate { .. }
            | Self::CancelAuthentication
            | Self::NewTransaction => "payroll",
            Self::Dashboard => "dashboard",
        }
    }

    /// Short name for logs. Never includes credentials.
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenSession => "open_session",
            Self::CloseSession => "close_session",
            Self::SessionEvents => "session_events",
            Self::Quit => "quit",
            Self::UploadBankLedger { .. } => "upload_bank_ledger",
            Self::UploadCustomerRecords { .. } => "upload_customer_records",
            Self::CompareLedgers => "compare_ledgers",
            Self::FilterReconciliation { .. } => "filter_reconciliation",
            Self::ExportReconciliation { .. } => "export_reconciliation",
            Self::UploadRiskProfiles { .. } => "upload_risk_profiles",
            Self::PortfolioOverview => "portfolio_overview",
            Self::AssessCustomer { .. } => "assess_customer",
            Self::UploadTransactions { .. } => "upload_transactions",
            Self::QueryTransactions { .. } => "query_transactions",
            Self::NextPage => "next_page",
            Self::PreviousPage => "previous_page",
            Self::TransactionCharts => "transaction_charts",
            Self::GenerateReport => "generate_report",
            Self::HideReport => "hide_report",
            Self::UploadSalaryFile { .. } => "upload_salary_file",
            Self::SelectAllEmployees { .. } => "select_all_employees",
            Self::ProcessPayments => "process_payments",
            Self::Authenticate { .. } => "authenticate",
            Self::CancelAuthentication => "cancel_authentication",
            Self::NewTransaction => "new_transaction",
            Self::Dashboard => "dashboard",
        }
    }
}

/// One line of the IPC protocol: a command, optionally addressed to a
/// session other than the runner's default one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeskRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionId>,
    #[serde(flatten)]
    pub command: DeskCommand,
}
