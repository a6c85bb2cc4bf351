//! Demo upload files.
//!
//! Every file is a pure function of (seed, rows): each file draws from its
//! own RNG stream, so regenerating one never shifts another.

use crate::{
    config::SuiteConfig,
    error::SuiteResult,
    name_generator::NameGenerator,
    rng::{RngBank, SampleRng, StreamSlot},
};
use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};

const DESCRIPTIONS: &[&str] = &[
    "Grocery purchase",
    "Salary credit",
    "Utility bill",
    "Online shopping",
    "Fuel",
    "Restaurant",
    "Rent payment",
    "ATM withdrawal",
    "Insurance premium",
    "Fund transfer",
];

const LOAN_TYPES: &[&str] = &["None", "Home Loan", "Car Loan", "Personal Loan", "Education Loan"];

/// Paths of one generated set.
#[derive(Debug, Clone, Serialize)]
pub struct SampleFiles {
    pub bank_ledger: PathBuf,
    pub customer_records: PathBuf,
    pub risk_profiles: PathBuf,
    pub transactions: PathBuf,
    pub salary_file: PathBuf,
}

fn money(value: f64) -> String {
    format!("{value:.2}")
}

/// Whole rupees, rounded down to a multiple of `step`.
fn rounded(value: f64, step: f64) -> String {
    format!("{:.0}", (value / step).floor() * step)
}

// ── Reconciliation pair ──────────────────────────────────────────────────────

/// Bank ledger and customer records sharing most ids. About one id in ten
/// disagrees on amount, and each side holds a few ids the other lacks.
pub fn write_ledgers<B: Write, C: Write>(
    seed: u64,
    rows: usize,
    config: &SuiteConfig,
    bank: B,
    customer: C,
) -> SuiteResult<()> {
    let mut rng = RngBank::new(seed).for_slot(StreamSlot::Ledger);
    let cols = &config.reconciliation;

    let mut bank_out = csv::Writer::from_writer(bank);
    let mut customer_out = csv::Writer::from_writer(customer);
    bank_out.write_record([cols.bank.id_column.as_str(), cols.bank.amount_column.as_str()])?;
    customer_out.write_record([
        cols.customer.id_column.as_str(),
        cols.customer.amount_column.as_str(),
    ])?;

    for id in 1..=rows {
        let amount = (rng.uniform(100.0, 5000.0) * 100.0).round() / 100.0;
        let roll = rng.next_f64();
        let id = id.to_string();
        if roll < 0.05 {
            bank_out.write_record([id.as_str(), money(amount).as_str()])?;
        } else if roll < 0.10 {
            customer_out.write_record([id.as_str(), money(amount).as_str()])?;
        } else if roll < 0.20 {
            let drift = (rng.uniform(0.01, 50.0) * 100.0).round() / 100.0;
            bank_out.write_record([id.as_str(), money(amount).as_str()])?;
            customer_out.write_record([id.as_str(), money(amount + drift).as_str()])?;
        } else {
            bank_out.write_record([id.as_str(), money(amount).as_str()])?;
            customer_out.write_record([id.as_str(), money(amount).as_str()])?;
        }
    }
    bank_out.flush()?;
    customer_out.flush()?;
    Ok(())
}

// ── Credit risk ──────────────────────────────────────────────────────────────

pub fn write_risk_profiles<W: Write>(
    seed: u64,
    rows: usize,
    config: &SuiteConfig,
    writer: W,
) -> SuiteResult<()> {
    let mut rng = RngBank::new(seed).for_slot(StreamSlot::RiskProfiles);
    let cols = &config.risk.columns;

    let mut out = csv::Writer::from_writer(writer);
    let mut header = vec![
        cols.customer_id.as_str(),
        cols.name.as_str(),
        cols.age.as_str(),
        cols.income.as_str(),
        cols.credit_score.as_str(),
        cols.credit_utilization.as_str(),
        cols.default_history.as_str(),
    ];
    if let Some(loan) = cols.existing_loan.as_deref() {
        header.push(loan);
    }
    out.write_record(&header)?;

    for i in 1..=rows {
        let mut record = vec![
            format!("CUST{i:04}"),
            NameGenerator::full_name(&mut rng),
            (21 + rng.next_u64_below(50)).to_string(),
            rounded(rng.uniform(8_000.0, 160_000.0), 500.0),
            (300 + rng.next_u64_below(551)).to_string(),
            format!("{:.2}", rng.next_f64()),
            if rng.chance(0.15) { "Yes" } else { "No" }.to_string(),
        ];
        if cols.existing_loan.is_some() {
            record.push(rng.pick(LOAN_TYPES).to_string());
        }
        out.write_record(&record)?;
    }
    out.flush()?;
    Ok(())
}

// ── Transactions ─────────────────────────────────────────────────────────────

struct DemoCustomer {
    id: u64,
    name: String,
    age: u64,
    income: String,
    credit_score: u64,
}

fn demo_customers(rng: &mut SampleRng, count: usize) -> Vec<DemoCustomer> {
    (1..=count as u64)
        .map(|id| DemoCustomer {
            id,
            name: NameGenerator::full_name(rng),
            age: 21 + rng.next_u64_below(50),
            income: rounded(rng.uniform(8_000.0, 160_000.0), 500.0),
            credit_score: 300 + rng.next_u64_below(551),
        })
        .collect()
}

/// `rows` transactions spread over roughly one customer per five rows,
/// dated within the first quarter of 2025.
pub fn write_transactions<W: Write>(seed: u64, rows: usize, writer: W) -> SuiteResult<()> {
    let mut rng = RngBank::new(seed).for_slot(StreamSlot::Transactions);
    let customers = demo_customers(&mut rng, (rows / 5).max(1));
    let first_day = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default();

    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        "Transaction_ID",
        "Customer_ID",
        "Name",
        "Age",
        "Income",
        "Credit_Score",
        "Transaction_Date",
        "Transaction_Amount",
        "Transaction_Type",
        "Description",
        "Transaction_Location",
    ])?;

    for i in 0..rows {
        let customer = rng.pick(&customers);
        let date = first_day + Duration::days(rng.next_u64_below(90) as i64);
        let kind = if rng.chance(0.35) { "Credit" } else { "Debit" };
        let amount = (rng.uniform(50.0, 50_000.0) * 100.0).round() / 100.0;
        out.write_record([
            (100_001 + i).to_string(),
            customer.id.to_string(),
            customer.name.clone(),
            customer.age.to_string(),
            customer.income.clone(),
            customer.credit_score.to_string(),
            date.format("%Y-%m-%d").to_string(),
            money(amount),
            kind.to_string(),
            rng.pick(DESCRIPTIONS).to_string(),
            NameGenerator::city(&mut rng).to_string(),
        ])?;
    }
    out.flush()?;
    Ok(())
}

// ── Payroll ──────────────────────────────────────────────────────────────────

pub fn write_salary_file<W: Write>(
    seed: u64,
    rows: usize,
    config: &SuiteConfig,
    writer: W,
) -> SuiteResult<()> {
    let mut rng = RngBank::new(seed).for_slot(StreamSlot::Payroll);
    let cols = &config.payroll.columns;

    let mut out = csv::Writer::from_writer(writer);
    out.write_record([
        cols.employee_id.as_str(),
        cols.employee_name.as_str(),
        cols.account_number.as_str(),
        cols.ifsc_code.as_str(),
        cols.amount.as_str(),
    ])?;

    for i in 1..=rows {
        let account = 10_000_000_000u64 + rng.next_u64_below(90_000_000_000);
        let ifsc = format!(
            "{}0{:06}",
            NameGenerator::bank_code(&mut rng),
            rng.next_u64_below(1_000_000)
        );
        out.write_record([
            format!("EMP{i:03}"),
            NameGenerator::full_name(&mut rng),
            account.to_string(),
            ifsc,
            rounded(rng.uniform(25_000.0, 150_000.0), 100.0),
        ])?;
    }
    out.flush()?;
    Ok(())
}

/// Write the full demo set into `dir`, creating it if needed.
pub fn write_samples(dir: &Path, seed: u64, rows: usize, config: &SuiteConfig) -> SuiteResult<SampleFiles> {
    std::fs::create_dir_all(dir)?;
    let files = SampleFiles {
        bank_ledger: dir.join("bank_ledger.csv"),
        customer_records: dir.join("customer_records.csv"),
        risk_profiles: dir.join("customer_risk_profiles.csv"),
        transactions: dir.join("transactions.csv"),
        salary_file: dir.join("salary_file.csv"),
    };

    write_ledgers(
        seed,
        rows,
        config,
        std::fs::File::create(&files.bank_ledger)?,
        std::fs::File::create(&files.customer_records)?,
    )?;
    write_risk_profiles(seed, rows, config, std::fs::File::create(&files.risk_profiles)?)?;
    write_transactions(seed, rows, std::fs::File::create(&files.transactions)?)?;
    write_salary_file(seed, rows, config, std::fs::File::create(&files.salary_file)?)?;

    log::info!("sample: wrote {rows}-row demo set to {} (seed={seed})", dir.display());
    Ok(files)
}
