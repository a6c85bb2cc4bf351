//! Dashboard desk. Headline figures and the fixed tables are display
//! constants; the activity series is drawn from the seeded dashboard stream.

use crate::{
    config::DashboardConfig,
    rng::{RngBank, StreamSlot},
    types::Amount,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadlineMetrics {
    pub transactions_today: u64,
    pub reconciliation_accuracy_percent: f64,
    pub pending_approvals: u32,
    pub fraud_alerts: u32,
}

pub const HEADLINE: HeadlineMetrics = HeadlineMetrics {
    transactions_today: 4_328,
    reconciliation_accuracy_percent: 99.8,
    pending_approvals: 12,
    fraud_alerts: 1,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub transaction_count: u64,
    pub total_value: Amount,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FraudCategory {
    pub category: &'static str,
    pub count: u32,
    pub blocked: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditBucket {
    pub range: &'static str,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityEntry {
    pub time: &'static str,
    pub user: &'static str,
    pub activity: &'static str,
    pub status: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub headline: HeadlineMetrics,
    pub activity: Vec<DailyActivity>,
    pub fraud_categories: Vec<FraudCategory>,
    pub credit_distribution: Vec<CreditBucket>,
    pub recent_activity: Vec<ActivityEntry>,
}

/// One point per day, start and end inclusive. Day position within the
/// range picks the weekly factor, not the calendar weekday.
pub fn activity_series(config: &DashboardConfig) -> Vec<DailyActivity> {
    let mut rng = RngBank::new(config.seed).for_slot(StreamSlot::Dashboard);
    let factors = &config.weekly_factors;

    let volumes: Vec<(NaiveDate, f64)> = config
        .start_date
        .iter_days()
        .take_while(|d| *d <= config.end_date)
        .enumerate()
        .map(|(i, date)| {
            let base = rng.normal(config.volume_mean, config.volume_std);
            (date, base * factors[i % factors.len()])
        })
        .collect();

    // Values are drawn after all volumes so each quantity has its own
    // contiguous run of the stream.
    volumes
        .into_iter()
        .map(|(date, volume)| {
            let per_txn = rng.uniform(config.value_per_txn_min, config.value_per_txn_max);
            DailyActivity {
                date,
                transaction_count: volume.max(0.0) as u64,
                total_value: volume * per_txn,
            }
        })
        .collect()
}

pub fn fraud_categories() -> Vec<FraudCategory> {
    [
        ("Card Fraud", 23, 3),
        ("Identity Theft", 15, 2),
        ("Account Takeover", 8, 1),
        ("Loan Fraud", 12, 2),
        ("Wire Fraud", 5, 1),
    ]
    .into_iter()
    .map(|(category, count, blocked)| FraudCategory {
        category,
        count,
        blocked,
    })
    .collect()
}

pub fn credit_distribution() -> Vec<CreditBucket> {
    [
        ("300-500", 5),
        ("501-600", 15),
        ("601-700", 35),
        ("701-800", 38),
        ("801-850", 7),
    ]
    .into_iter()
    .map(|(range, percentage)| CreditBucket { range, percentage })
    .collect()
}

pub fn recent_activity() -> Vec<ActivityEntry> {
    [
        ("10:45 AM", "John Smith", "Approved loan application #4528", "Completed"),
        ("09:32 AM", "System", "Flagged unusual transaction pattern for review", "Needs Review"),
        ("09:15 AM", "Mary Johnson", "Completed monthly reconciliation report", "Completed"),
        ("08:53 AM", "System", "Detected 3 potential fraud attempts", "In Progress"),
        ("08:22 AM", "David Chen", "Updated customer credit score model", "Completed"),
    ]
    .into_iter()
    .map(|(time, user, activity, status)| ActivityEntry {
        time,
        user,
        activity,
        status,
    })
    .collect()
}

pub fn build(config: &DashboardConfig) -> DashboardView {
    let activity = activity_series(config);
    log::debug!(
        "dashboard: {} days from {} (seed={})",
        activity.len(),
        config.start_date,
        config.seed
    );
    DashboardView {
        headline: HEADLINE,
        activity,
        fraud_categories: fraud_categories(),
        credit_distribution: credit_distribution(),
        recent_activity: recent_activity(),
    }
}
