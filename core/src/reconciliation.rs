//! Reconciliation desk: matches the bank ledger against customer records.
//!
//! Design:
//!   - Each upload is normalized to (transaction_id, amount) through the
//!     configured column names before joining.
//!   - Full outer join on transaction_id. Duplicate ids inside one source
//!     produce every bank × customer combination; nothing is deduplicated.
//!   - Matched iff both amounts are present and exactly equal. No epsilon,
//!     no rounding.
//!   - Any missing column or unparseable amount rejects the whole comparison.

use crate::{
    config::{LedgerColumns, ReconciliationConfig},
    error::SuiteResult,
    table::CsvTable,
    types::{Amount, TransactionId},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::io::Write;

// ── Types ────────────────────────────────────────────────────────────────────

/// One normalized ledger line. `amount` is `None` when the cell was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub transaction_id: TransactionId,
    pub amount: Option<Amount>,
}

impl LedgerEntry {
    pub fn new(transaction_id: impl Into<TransactionId>, amount: Amount) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            amount: Some(amount),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReconStatus {
    Matched,
    Unmatched,
}

impl std::fmt::Display for ReconStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Matched => write!(f, "Matched"),
            Self::Unmatched => write!(f, "Unmatched"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconRow {
    pub transaction_id: TransactionId,
    pub bank_amount: Option<Amount>,
    pub customer_amount: Option<Amount>,
    pub status: ReconStatus,
}

impl ReconRow {
    /// Bank minus customer; absent unless both sides carry an amount.
    pub fn amount_difference(&self) -> Option<Amount> {
        match (self.bank_amount, self.customer_amount) {
            (Some(bank), Some(customer)) => Some(bank - customer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusShare {
    pub count: usize,
    pub percentage: f64,
}

impl StatusShare {
    fn of(count: usize, total: usize) -> Self {
        let percentage = if total > 0 {
            count as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self { count, percentage }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconSummary {
    pub total_records: usize,
    pub matched: StatusShare,
    pub unmatched: StatusShare,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconReport {
    pub rows: Vec<ReconRow>,
    pub summary: ReconSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Matched,
    Unmatched,
}

impl StatusFilter {
    pub fn accepts(self, status: ReconStatus) -> bool {
        match self {
            Self::All => true,
            Self::Matched => status == ReconStatus::Matched,
            Self::Unmatched => status == ReconStatus::Unmatched,
        }
    }
}

// ── Normalization ────────────────────────────────────────────────────────────

/// Project an uploaded table onto (transaction_id, amount).
pub fn normalize_ledger(table: &CsvTable, columns: &LedgerColumns) -> SuiteResult<Vec<LedgerEntry>> {
    let id_col = table.column(&columns.id_column)?;
    let amount_col = table.column(&columns.amount_column)?;

    (0..table.len())
        .map(|row| {
            Ok(LedgerEntry {
                transaction_id: table.identifier(row, &id_col)?,
                amount: table.optional_decimal(row, &amount_col)?,
            })
        })
        .collect()
}

// ── Matching ─────────────────────────────────────────────────────────────────

pub fn determine_status(bank: Option<Amount>, customer: Option<Amount>) -> ReconStatus {
    match (bank, customer) {
        (Some(b), Some(c)) if b == c => ReconStatus::Matched,
        _ => ReconStatus::Unmatched,
    }
}

/// Full outer join of the two ledgers on transaction_id.
pub fn reconcile(bank: &[LedgerEntry], customer: &[LedgerEntry]) -> ReconReport {
    let mut groups: BTreeMap<IdKey<'_>, (Vec<Option<Amount>>, Vec<Option<Amount>>)> =
        BTreeMap::new();

    for entry in bank {
        groups
            .entry(IdKey(&entry.transaction_id))
            .or_default()
            .0
            .push(entry.amount);
    }
    for entry in customer {
        groups
            .entry(IdKey(&entry.transaction_id))
            .or_default()
            .1
            .push(entry.amount);
    }

    let mut rows = Vec::with_capacity(groups.len());
    for (key, (bank_side, customer_side)) in &groups {
        let bank_side: &[Option<Amount>] = if bank_side.is_empty() { &[None] } else { bank_side };
        let customer_side: &[Option<Amount>] =
            if customer_side.is_empty() { &[None] } else { customer_side };

        for &bank_amount in bank_side {
            for &customer_amount in customer_side {
                rows.push(ReconRow {
                    transaction_id: key.0.to_string(),
                    bank_amount,
                    customer_amount,
                    status: determine_status(bank_amount, customer_amount),
                });
            }
        }
    }

    let summary = summarize(&rows);
    ReconReport { rows, summary }
}

pub fn summarize(rows: &[ReconRow]) -> ReconSummary {
    let total = rows.len();
    let matched = rows
        .iter()
        .filter(|r| r.status == ReconStatus::Matched)
        .count();
    ReconSummary {
        total_records: total,
        matched: StatusShare::of(matched, total),
        unmatched: StatusShare::of(total - matched, total),
    }
}

/// Normalize both uploads and reconcile them. Fails before joining if
/// either table is malformed.
pub fn reconcile_tables(
    bank: &CsvTable,
    customer: &CsvTable,
    config: &ReconciliationConfig,
) -> SuiteResult<ReconReport> {
    let bank_entries = normalize_ledger(bank, &config.bank)?;
    let customer_entries = normalize_ledger(customer, &config.customer)?;
    let report = reconcile(&bank_entries, &customer_entries);

    log::info!(
        "recon: bank={} customer={} joined={} matched={} unmatched={}",
        bank_entries.len(),
        customer_entries.len(),
        report.summary.total_records,
        report.summary.matched.count,
        report.summary.unmatched.count,
    );
    Ok(report)
}

impl ReconReport {
    pub fn filtered(&self, filter: StatusFilter) -> Vec<&ReconRow> {
        self.rows.iter().filter(|r| filter.accepts(r.status)).collect()
    }

    /// Write the rows accepted by `filter` as CSV. Absent amounts are empty
    /// cells so the export loads back through `normalize_ledger`.
    pub fn export_csv<W: Write>(&self, writer: W, filter: StatusFilter) -> SuiteResult<usize> {
        let mut out = csv::Writer::from_writer(writer);
        out.write_record([
            "Transaction_ID",
            "Bank_Amount",
            "Customer_Amount",
            "Amount_Difference",
            "Reconciliation_Status",
        ])?;

        let mut written = 0;
        for row in self.filtered(filter) {
            out.write_record([
                row.transaction_id.clone(),
                fmt_amount(row.bank_amount),
                fmt_amount(row.customer_amount),
                fmt_amount(row.amount_difference()),
                row.status.to_string(),
            ])?;
            written += 1;
        }
        out.flush()?;
        Ok(written)
    }
}

fn fmt_amount(amount: Option<Amount>) -> String {
    amount.map(|a| format!("{a:.2}")).unwrap_or_default()
}

// ── Ordering ─────────────────────────────────────────────────────────────────

/// Join key ordering: integer ids in numeric order first, then everything
/// else lexicographically. Equality stays plain text equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct IdKey<'a>(&'a str);

impl Ord for IdKey<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<i64>(), other.0.parse::<i64>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(other.0)),
            (Ok(_), Err(_)) => Ordering::Less,
            (Err(_), Ok(_)) => Ordering::Greater,
            (Err(_), Err(_)) => self.0.cmp(other.0),
        }
    }
}

impl PartialOrd for IdKey<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_sort_numerically() {
        let bank = vec![LedgerEntry::new("10", 1.0), LedgerEntry::new("2", 1.0)];
        let report = reconcile(&bank, &[]);
        let ids: Vec<_> = report.rows.iter().map(|r| r.transaction_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "10"]);
    }

    #[test]
    fn mixed_ids_put_numbers_first() {
        let bank = vec![LedgerEntry::new("TX-1", 1.0), LedgerEntry::new("7", 1.0)];
        let report = reconcile(&bank, &[]);
        assert_eq!(report.rows[0].transaction_id, "7");
        assert_eq!(report.rows[1].transaction_id, "TX-1");
    }

    #[test]
    fn absent_amount_on_both_sides_is_unmatched() {
        assert_eq!(determine_status(None, None), ReconStatus::Unmatched);
        assert_eq!(determine_status(Some(5.0), None), ReconStatus::Unmatched);
        assert_eq!(determine_status(Some(5.0), Some(5.0)), ReconStatus::Matched);
    }
}
