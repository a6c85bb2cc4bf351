use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ── Reconciliation ─────────────────────────────────────────────────

/// Column names that normalize one uploaded ledger to (identifier, amount).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerColumns {
    pub id_column: String,
    pub amount_column: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    pub bank: LedgerColumns,
    pub customer: LedgerColumns,
}

// ── Credit risk ────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskColumns {
    pub customer_id: String,
    pub name: String,
    pub age: String,
    pub income: String,
    pub credit_score: String,
    pub credit_utilization: String,
    pub default_history: String,
    /// Display-only column; absent files simply show nothing.
    #[serde(default)]
    pub existing_loan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskConfig {
    pub columns: RiskColumns,
    /// Shown on the portfolio overview as-is. Not derived from data.
    pub approval_ratio_percent: u32,
}

// ── Transactions ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionsConfig {
    pub rows_per_page: usize,
    /// Maximum distinct locations in the location chart before "Other".
    pub top_locations: usize,
}

// ── Report generator ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    pub model: String,
    pub endpoint: String,
    pub api_key_env: String,
    pub timeout_secs: u64,
}

// ── Payroll ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollColumns {
    pub employee_id: String,
    pub employee_name: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayrollConfig {
    pub columns: PayrollColumns,
    pub processing_fee: f64,
}

// ── Dashboard ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    pub seed: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub volume_mean: f64,
    pub volume_std: f64,
    /// Multipliers applied by day position, cycling every 7 days.
    pub weekly_factors: Vec<f64>,
    pub value_per_txn_min: f64,
    pub value_per_txn_max: f64,
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteConfig {
    pub reconciliation: ReconciliationConfig,
    pub risk: RiskConfig,
    pub transactions: TransactionsConfig,
    pub report: ReportConfig,
    pub payroll: PayrollConfig,
    pub dashboard: DashboardConfig,
}

impl SuiteConfig {
    /// Load from the data/ directory.
    /// In tests, use SuiteConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/config/suite.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: SuiteConfig = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but a missing file falls back to the built-in defaults.
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/config/suite.json");
        if std::path::Path::new(&path).exists() {
            Self::load(data_dir)
        } else {
            log::info!("config: {path} not found, using built-in defaults");
            Ok(Self::default_test())
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.transactions.rows_per_page == 0 {
            anyhow::bail!("transactions.rows_per_page must be > 0");
        }
        if self.dashboard.weekly_factors.is_empty() {
            anyhow::bail!("dashboard.weekly_factors must not be empty");
        }
        if self.dashboard.end_date < self.dashboard.start_date {
            anyhow::bail!("dashboard.end_date is before dashboard.start_date");
        }
        if self.dashboard.value_per_txn_max < self.dashboard.value_per_txn_min {
            anyhow::bail!("dashboard.value_per_txn_max is below value_per_txn_min");
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            reconciliation: ReconciliationConfig {
                bank: LedgerColumns {
                    id_column: "Transaction_ID".into(),
                    amount_column: "Transactions_Amount".into(),
                },
                customer: LedgerColumns {
                    id_column: "Transaction_ID".into(),
                    amount_column: "Transaction_Amount".into(),
                },
            },
            risk: RiskConfig {
                columns: RiskColumns {
                    customer_id: "Customer_ID".into(),
                    name: "Name".into(),
                    age: "Age".into(),
                    income: "Income".into(),
                    credit_score: "Credit_Score".into(),
                    credit_utilization: "Credit_Utilization".into(),
                    default_history: "Default_History".into(),
                    existing_loan: Some("Existing_Loan".into()),
                },
                approval_ratio_percent: 65,
            },
            transactions: TransactionsConfig {
                rows_per_page: 100,
                top_locations: 6,
            },
            report: ReportConfig {
                model: "gemini-1.5-pro".into(),
                endpoint: "https://generativelanguage.googleapis.com/v1beta/models".into(),
                api_key_env: "GEMINI_API_KEY".into(),
                timeout_secs: 60,
            },
            payroll: PayrollConfig {
                columns: PayrollColumns {
                    employee_id: "Employee ID".into(),
                    employee_name: "Employee Name".into(),
                    account_number: "Bank Account Number".into(),
                    ifsc_code: "IFSC Code".into(),
                    amount: "Salary Amount (INR)".into(),
                },
                processing_fee: 0.0,
            },
            dashboard: DashboardConfig {
                seed: 42,
                start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap_or_default(),
                end_date: NaiveDate::from_ymd_opt(2025, 4, 11).unwrap_or_default(),
                volume_mean: 500.0,
                volume_std: 50.0,
                weekly_factors: vec![1.0, 1.1, 1.05, 1.2, 1.3, 0.8, 0.7],
                value_per_txn_min: 100.0,
                value_per_txn_max: 150.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_round_trips_through_json() {
        let cfg = SuiteConfig::default_test();
        let json = serde_json::to_string(&cfg).unwrap();
        let back: SuiteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.transactions.rows_per_page, 100);
        assert_eq!(back.risk.approval_ratio_percent, 65);
        assert_eq!(back.dashboard.start_date.to_string(), "2025-03-01");
    }

    #[test]
    fn load_reads_data_dir_and_rejects_zero_page_size() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("config")).unwrap();

        let mut cfg = SuiteConfig::default_test();
        cfg.transactions.rows_per_page = 25;
        std::fs::write(
            dir.path().join("config/suite.json"),
            serde_json::to_string_pretty(&cfg).unwrap(),
        )
        .unwrap();
        let data_dir = dir.path().to_str().unwrap();
        assert_eq!(SuiteConfig::load(data_dir).unwrap().transactions.rows_per_page, 25);

        cfg.transactions.rows_per_page = 0;
        std::fs::write(
            dir.path().join("config/suite.json"),
            serde_json::to_string(&cfg).unwrap(),
        )
        .unwrap();
        assert!(SuiteConfig::load(data_dir).is_err());
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = SuiteConfig::load_or_default(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(cfg.report.api_key_env, "GEMINI_API_KEY");
    }
}
