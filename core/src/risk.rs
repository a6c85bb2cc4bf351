//! Credit risk desk: rule-based scoring of customer profiles.
//!
//! The score is the sum of four independent sub-scores:
//!
//! | factor              | max | bands                                          |
//! |---------------------|-----|------------------------------------------------|
//! | credit score        | 40  | ≥750 40, ≥700 30, ≥650 20, ≥600 10, else 0     |
//! | income              | 25  | ≥100k 25, ≥75k 20, ≥50k 15, ≥30k 10, else 5    |
//! | credit utilization  | 15  | ≤0.10 15, ≤0.30 12, ≤0.50 8, ≤0.70 4, else 0   |
//! | default history     | 20  | no prior default 20, else 0                    |
//!
//! Because the income band floors at 5 the total lives in [5, 100].

use crate::{
    config::{RiskColumns, RiskConfig},
    error::{SuiteError, SuiteResult},
    table::CsvTable,
    types::{Amount, CustomerId},
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ── Constants ────────────────────────────────────────────────────────────────

pub const LOW_RISK_THRESHOLD: u32 = 80;
pub const MEDIUM_RISK_THRESHOLD: u32 = 60;

/// Credit score below which a customer counts toward the portfolio's
/// high-risk share.
const HIGH_RISK_CREDIT_SCORE: i64 = 600;
const LOW_CREDIT_SCORE_FACTOR: i64 = 650;
const HIGH_UTILIZATION_FACTOR: f64 = 0.7;
const LOW_INCOME_FACTOR: Amount = 30_000.0;

/// Loan ceiling multiple applied to score-weighted income.
const MAX_LOAN_INCOME_MULTIPLE: f64 = 3.0;

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,
    pub name: String,
    pub age: i64,
    pub income: Amount,
    pub credit_score: i64,
    pub credit_utilization: f64,
    pub default_history: bool,
    pub existing_loan: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Medium Risk")]
    Medium,
    #[serde(rename = "High Risk")]
    High,
}

impl RiskCategory {
    pub fn from_score(score: u32) -> Self {
        if score >= LOW_RISK_THRESHOLD {
            Self::Low
        } else if score >= MEDIUM_RISK_THRESHOLD {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Medium => "Medium Risk",
            Self::High => "High Risk",
        }
    }
}

impl std::fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditBand {
    Excellent,
    Good,
    Fair,
    Poor,
    #[serde(rename = "Very Poor")]
    VeryPoor,
}

impl CreditBand {
    pub fn from_credit_score(credit_score: i64) -> Self {
        match credit_score {
            s if s >= 750 => Self::Excellent,
            s if s >= 700 => Self::Good,
            s if s >= 650 => Self::Fair,
            s if s >= 600 => Self::Poor,
            _ => Self::VeryPoor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubScores {
    pub credit_score: u32,
    pub income: u32,
    pub utilization: u32,
    pub default_history: u32,
}

impl SubScores {
    pub fn total(&self) -> u32 {
        self.credit_score + self.income + self.utilization + self.default_history
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    LowCreditScore,
    HighCreditUtilization,
    PreviousDefault,
    LowIncome,
}

impl RiskFactor {
    pub fn description(&self) -> &'static str {
        match self {
            Self::LowCreditScore => "Low credit score",
            Self::HighCreditUtilization => "High credit utilization",
            Self::PreviousDefault => "Previous default history",
            Self::LowIncome => "Low income",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub customer_id: CustomerId,
    pub score: u32,
    pub category: RiskCategory,
    pub sub_scores: SubScores,
    pub credit_band: CreditBand,
    /// Display heuristic, `100 - score`. Not a probability model.
    pub default_probability: u32,
    pub recommended_max_loan: Amount,
    /// Empty means no significant risk factors.
    pub risk_factors: Vec<RiskFactor>,
}

// ── Sub-scores ───────────────────────────────────────────────────────────────

pub fn credit_score_points(credit_score: i64) -> u32 {
    match credit_score {
        s if s >= 750 => 40,
        s if s >= 700 => 30,
        s if s >= 650 => 20,
        s if s >= 600 => 10,
        _ => 0,
    }
}

pub fn income_points(income: Amount) -> u32 {
    if income >= 100_000.0 {
        25
    } else if income >= 75_000.0 {
        20
    } else if income >= 50_000.0 {
        15
    } else if income >= 30_000.0 {
        10
    } else {
        5
    }
}

pub fn utilization_points(utilization: f64) -> u32 {
    if utilization <= 0.10 {
        15
    } else if utilization <= 0.30 {
        12
    } else if utilization <= 0.50 {
        8
    } else if utilization <= 0.70 {
        4
    } else {
        0
    }
}

pub fn default_history_points(has_defaulted: bool) -> u32 {
    if has_defaulted {
        0
    } else {
        20
    }
}

pub fn sub_scores(profile: &CustomerProfile) -> SubScores {
    SubScores {
        credit_score: credit_score_points(profile.credit_score),
        income: income_points(profile.income),
        utilization: utilization_points(profile.credit_utilization),
        default_history: default_history_points(profile.default_history),
    }
}

pub fn risk_score(profile: &CustomerProfile) -> u32 {
    sub_scores(profile).total()
}

/// `round(score / 100 * income * 3)`, ties to even.
pub fn recommended_max_loan(score: u32, income: Amount) -> Amount {
    (score as f64 / 100.0 * income * MAX_LOAN_INCOME_MULTIPLE).round_ties_even()
}

pub fn risk_factors(profile: &CustomerProfile) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    if profile.credit_score < LOW_CREDIT_SCORE_FACTOR {
        factors.push(RiskFactor::LowCreditScore);
    }
    if profile.credit_utilization > HIGH_UTILIZATION_FACTOR {
        factors.push(RiskFactor::HighCreditUtilization);
    }
    if profile.default_history {
        factors.push(RiskFactor::PreviousDefault);
    }
    if profile.income < LOW_INCOME_FACTOR {
        factors.push(RiskFactor::LowIncome);
    }
    factors
}

pub fn assess(profile: &CustomerProfile) -> RiskAssessment {
    let sub_scores = sub_scores(profile);
    let score = sub_scores.total();
    RiskAssessment {
        customer_id: profile.customer_id.clone(),
        score,
        category: RiskCategory::from_score(score),
        sub_scores,
        credit_band: CreditBand::from_credit_score(profile.credit_score),
        default_probability: 100 - score,
        recommended_max_loan: recommended_max_loan(score, profile.income),
        risk_factors: risk_factors(profile),
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

/// Parse every row of an uploaded customer file. Any malformed field
/// rejects the whole upload.
pub fn load_profiles(table: &CsvTable, columns: &RiskColumns) -> SuiteResult<Vec<CustomerProfile>> {
    let id = table.column(&columns.customer_id)?;
    let name = table.column(&columns.name)?;
    let age = table.column(&columns.age)?;
    let income = table.column(&columns.income)?;
    let credit_score = table.column(&columns.credit_score)?;
    let utilization = table.column(&columns.credit_utilization)?;
    let default_history = table.column(&columns.default_history)?;
    let existing_loan = columns
        .existing_loan
        .as_deref()
        .and_then(|c| table.optional_column(c));

    (0..table.len())
        .map(|row| {
            Ok(CustomerProfile {
                customer_id: table.identifier(row, &id)?,
                name: table.text(row, &name)?,
                age: table.integer(row, &age)?,
                income: table.decimal(row, &income)?,
                credit_score: table.integer(row, &credit_score)?,
                credit_utilization: table.decimal(row, &utilization)?,
                default_history: table.yes_no(row, &default_history)?,
                existing_loan: existing_loan
                    .as_ref()
                    .map(|c| table.cell(row, c).to_string())
                    .filter(|v| !v.is_empty()),
            })
        })
        .collect()
}

/// Keep the first row seen for each customer id.
pub fn unique_customers(profiles: Vec<CustomerProfile>) -> Vec<CustomerProfile> {
    let mut seen = HashSet::new();
    profiles
        .into_iter()
        .filter(|p| seen.insert(p.customer_id.clone()))
        .collect()
}

// ── Portfolio ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioOverview {
    pub customers: usize,
    pub average_credit_score: i64,
    pub default_rate_percent: i64,
    pub high_risk_percent: i64,
    pub average_utilization_percent: f64,
    pub approval_ratio_percent: u32,
}

/// Headline metrics over unique customers. Whole-number metrics are
/// truncated, utilization is rounded to one decimal.
pub fn portfolio_overview(customers: &[CustomerProfile], config: &RiskConfig) -> PortfolioOverview {
    let n = customers.len();
    if n == 0 {
        return PortfolioOverview {
            customers: 0,
            average_credit_score: 0,
            default_rate_percent: 0,
            high_risk_percent: 0,
            average_utilization_percent: 0.0,
            approval_ratio_percent: config.approval_ratio_percent,
        };
    }

    let total_credit: f64 = customers.iter().map(|c| c.credit_score as f64).sum();
    let defaults = customers.iter().filter(|c| c.default_history).count();
    let high_risk = customers
        .iter()
        .filter(|c| c.credit_score < HIGH_RISK_CREDIT_SCORE)
        .count();
    let total_util: f64 = customers.iter().map(|c| c.credit_utilization).sum();

    PortfolioOverview {
        customers: n,
        average_credit_score: (total_credit / n as f64) as i64,
        default_rate_percent: (defaults as f64 / n as f64 * 100.0) as i64,
        high_risk_percent: (high_risk as f64 / n as f64 * 100.0) as i64,
        average_utilization_percent: round_one_decimal(total_util / n as f64 * 100.0),
        approval_ratio_percent: config.approval_ratio_percent,
    }
}

/// One decimal place, exact ties to the even digit.
fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round_ties_even() / 10.0
}

// ── Search ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerSearchField {
    #[default]
    CustomerId,
    Name,
}

/// Customers whose id contains `term` (case-sensitive) or whose name
/// contains it (case-insensitive). An empty term matches everyone.
pub fn search_customers<'a>(
    customers: &'a [CustomerProfile],
    term: &str,
    field: CustomerSearchField,
) -> Vec<&'a CustomerProfile> {
    let needle = term.to_lowercase();
    customers
        .iter()
        .filter(|c| match field {
            _ if term.is_empty() => true,
            CustomerSearchField::CustomerId => c.customer_id.contains(term),
            CustomerSearchField::Name => c.name.to_lowercase().contains(&needle),
        })
        .collect()
}

/// Assess the first customer matching the search.
pub fn lookup(
    customers: &[CustomerProfile],
    term: &str,
    field: CustomerSearchField,
) -> SuiteResult<(CustomerProfile, RiskAssessment)> {
    let customer = search_customers(customers, term, field)
        .into_iter()
        .next()
        .ok_or_else(|| SuiteError::CustomerNotFound {
            term: term.to_string(),
        })?;
    Ok((customer.clone(), assess(customer)))
}
