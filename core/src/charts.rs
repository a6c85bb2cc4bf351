//! Chart series. Rendering happens in the front end; this module only
//! shapes the numbers each chart plots.

use crate::{
    reconciliation::{ReconReport, ReconStatus},
    transactions::{count_descending, TransactionRecord},
    types::Amount,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSlice {
    pub status: ReconStatus,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedAmount {
    pub date: NaiveDate,
    pub amount: Amount,
}

/// Credit vs debit (or whatever types the file carries), most frequent first.
pub fn transaction_types(rows: &[TransactionRecord]) -> Vec<Slice> {
    count_descending(rows.iter().map(|r| r.transaction_type.as_str()))
        .into_iter()
        .map(|(label, count)| Slice { label, count })
        .collect()
}

/// One bar per transaction, ordered by date. Same-day rows keep file order.
pub fn amount_by_date(rows: &[TransactionRecord]) -> Vec<DatedAmount> {
    let mut points: Vec<DatedAmount> = rows
        .iter()
        .map(|r| DatedAmount {
            date: r.transaction_date,
            amount: r.transaction_amount,
        })
        .collect();
    points.sort_by_key(|p| p.date);
    points
}

/// The `top` most frequent locations, with the rest folded into "Other".
pub fn locations(rows: &[TransactionRecord], top: usize) -> Vec<Slice> {
    let counts = count_descending(rows.iter().map(|r| r.transaction_location.as_str()));
    let mut slices: Vec<Slice> = counts
        .iter()
        .take(top)
        .map(|(label, count)| Slice {
            label: label.clone(),
            count: *count,
        })
        .collect();
    let other: usize = counts.iter().skip(top).map(|(_, n)| n).sum();
    if other > 0 {
        slices.push(Slice {
            label: "Other".into(),
            count: other,
        });
    }
    slices
}

/// Matched / Unmatched donut.
pub fn reconciliation_status(report: &ReconReport) -> Vec<StatusSlice> {
    let s = &report.summary;
    vec![
        StatusSlice {
            status: ReconStatus::Matched,
            count: s.matched.count,
            percentage: s.matched.percentage,
        },
        StatusSlice {
            status: ReconStatus::Unmatched,
            count: s.unmatched.count,
            percentage: s.unmatched.percentage,
        },
    ]
}
