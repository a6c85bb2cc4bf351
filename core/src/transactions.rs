//! Transactions desk: search, sort and page through uploaded transactions.
//!
//! Rows live in the session's SQLite store. The desk itself only keeps the
//! cursor state: the active query, the page number and whether the AI report
//! panel is open. The report panel closes whenever the search key changes.

use crate::{
    error::{SuiteError, SuiteResult},
    store::SuiteStore,
    table::CsvTable,
    types::Amount,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub transaction_id: i64,
    pub customer_id: i64,
    pub name: String,
    pub age: i64,
    pub income: Amount,
    pub credit_score: i64,
    pub transaction_date: NaiveDate,
    pub transaction_amount: Amount,
    pub transaction_type: String,
    pub description: String,
    pub transaction_location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchField {
    TransactionId,
    #[default]
    CustomerId,
    Name,
}

impl SearchField {
    pub fn label(&self) -> &'static str {
        match self {
            Self::TransactionId => "Transaction ID",
            Self::CustomerId => "Customer ID",
            Self::Name => "Name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Age,
    Income,
    CreditScore,
    TransactionDate,
    #[default]
    TransactionAmount,
}

impl SortKey {
    /// Column name in the `txn` table. Static so it can be spliced into SQL.
    pub fn column(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Income => "income",
            Self::CreditScore => "credit_score",
            Self::TransactionDate => "transaction_date",
            Self::TransactionAmount => "transaction_amount",
        }
    }
}

/// A validated search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TxnFilter {
    All,
    TransactionId(i64),
    CustomerId(i64),
    Name(String),
}

/// Turn a raw search term into a filter. Id searches need an integer term.
pub fn parse_filter(term: &str, field: SearchField) -> SuiteResult<TxnFilter> {
    let term = term.trim();
    if term.is_empty() {
        return Ok(TxnFilter::All);
    }
    let as_id = || {
        term.parse::<i64>().map_err(|_| SuiteError::InvalidSearchTerm {
            field: field.label().to_string(),
            term: term.to_string(),
        })
    };
    Ok(match field {
        SearchField::TransactionId => TxnFilter::TransactionId(as_id()?),
        SearchField::CustomerId => TxnFilter::CustomerId(as_id()?),
        SearchField::Name => TxnFilter::Name(term.to_string()),
    })
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TxnQuery {
    pub term: String,
    pub field: SearchField,
    pub sort: SortKey,
}

impl TxnQuery {
    /// "field:term", the key that decides whether the report panel resets.
    pub fn search_key(&self) -> String {
        format!("{}:{}", self.field.label(), self.term)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub rows: Vec<TransactionRecord>,
    pub page: usize,
    pub total_pages: usize,
    pub total_records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerSummary {
    pub customer_id: i64,
    pub name: String,
    pub age: i64,
}

pub fn total_pages(records: usize, rows_per_page: usize) -> usize {
    records.div_ceil(rows_per_page.max(1)).max(1)
}

// ── Loading ──────────────────────────────────────────────────────────────────

pub fn load_transactions(table: &CsvTable) -> SuiteResult<Vec<TransactionRecord>> {
    let transaction_id = table.column("Transaction_ID")?;
    let customer_id = table.column("Customer_ID")?;
    let name = table.column("Name")?;
    let age = table.column("Age")?;
    let income = table.column("Income")?;
    let credit_score = table.column("Credit_Score")?;
    let date = table.column("Transaction_Date")?;
    let amount = table.column("Transaction_Amount")?;
    let kind = table.column("Transaction_Type")?;
    let location = table.column("Transaction_Location")?;
    let description = table.optional_column("Description");

    (0..table.len())
        .map(|row| {
            let raw_date = table.cell(row, &date);
            let transaction_date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d").map_err(|_| {
                SuiteError::InvalidField {
                    table: table.name.clone(),
                    row: row + 1,
                    column: date.name.clone(),
                    value: raw_date.to_string(),
                }
            })?;
            Ok(TransactionRecord {
                transaction_id: table.integer(row, &transaction_id)?,
                customer_id: table.integer(row, &customer_id)?,
                name: table.text(row, &name)?,
                age: table.integer(row, &age)?,
                income: table.decimal(row, &income)?,
                credit_score: table.integer(row, &credit_score)?,
                transaction_date,
                transaction_amount: table.decimal(row, &amount)?,
                transaction_type: table.text(row, &kind)?,
                description: description
                    .as_ref()
                    .map(|c| table.cell(row, c).to_string())
                    .unwrap_or_default(),
                transaction_location: table.cell(row, &location).to_string(),
            })
        })
        .collect()
}

// ── Desk state ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct TransactionsDesk {
    pub query: TxnQuery,
    filter: TxnFilter,
    pub page: usize,
    pub show_report: bool,
    previous_search: Option<String>,
    pub loaded: bool,
}

impl Default for TransactionsDesk {
    fn default() -> Self {
        Self {
            query: TxnQuery::default(),
            filter: TxnFilter::All,
            page: 1,
            show_report: false,
            previous_search: None,
            loaded: false,
        }
    }
}

impl TransactionsDesk {
    /// Replace the session's transactions with a freshly uploaded table.
    pub fn load(&mut self, store: &mut SuiteStore, table: &CsvTable) -> SuiteResult<usize> {
        let rows = load_transactions(table)?;
        store.replace_transactions(&rows)?;
        self.loaded = true;
        self.page = 1;
        self.show_report = false;
        self.previous_search = None;
        log::info!("transactions: loaded {} rows", rows.len());
        Ok(rows.len())
    }

    fn require_loaded(&self) -> SuiteResult<()> {
        if self.loaded {
            Ok(())
        } else {
            Err(SuiteError::NotLoaded {
                what: "Transaction data",
            })
        }
    }

    /// Apply a new search/sort. An invalid id term is rejected and the
    /// previous query stays active.
    pub fn set_query(&mut self, query: TxnQuery) -> SuiteResult<()> {
        let filter = parse_filter(&query.term, query.field)?;
        let key = query.search_key();
        if self.previous_search.as_deref() != Some(key.as_str()) {
            self.show_report = false;
            self.previous_search = Some(key);
        }
        self.filter = filter;
        self.query = query;
        Ok(())
    }

    /// The current page. A cursor beyond the last page snaps back to 1.
    pub fn current_page(&mut self, store: &SuiteStore, rows_per_page: usize) -> SuiteResult<Page> {
        self.require_loaded()?;
        let total_records = store.count_transactions(&self.filter)?;
        let total_pages = total_pages(total_records, rows_per_page);
        if self.page > total_pages || self.page == 0 {
            self.page = 1;
        }
        let offset = (self.page - 1) * rows_per_page;
        let rows = store.query_transactions(&self.filter, self.query.sort, rows_per_page, offset)?;
        Ok(Page {
            rows,
            page: self.page,
            total_pages,
            total_records,
        })
    }

    pub fn next_page(&mut self, store: &SuiteStore, rows_per_page: usize) -> SuiteResult<Page> {
        self.require_loaded()?;
        let total = total_pages(store.count_transactions(&self.filter)?, rows_per_page);
        if self.page < total {
            self.page += 1;
        }
        self.current_page(store, rows_per_page)
    }

    pub fn previous_page(&mut self, store: &SuiteStore, rows_per_page: usize) -> SuiteResult<Page> {
        if self.page > 1 {
            self.page -= 1;
        }
        self.current_page(store, rows_per_page)
    }

    pub fn filtered(&self, store: &SuiteStore) -> SuiteResult<Vec<TransactionRecord>> {
        self.require_loaded()?;
        store.filtered_transactions(&self.filter)
    }

    /// Identity of the first row in the filtered set.
    pub fn customer_summary(&self, store: &SuiteStore) -> SuiteResult<Option<CustomerSummary>> {
        Ok(self.filtered(store)?.first().map(|r| CustomerSummary {
            customer_id: r.customer_id,
            name: r.name.clone(),
            age: r.age,
        }))
    }
}

// ── Statistics ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionStats {
    pub total_transactions: usize,
    pub total_amount: Amount,
    pub average_amount: Amount,
    pub max_transaction: Amount,
    pub credit_count: usize,
    pub credit_sum: Amount,
    pub debit_count: usize,
    pub debit_sum: Amount,
    pub net_balance: Amount,
    /// (location, count), most frequent first, ties by name.
    pub locations: Vec<(String, usize)>,
}

pub fn transaction_stats(rows: &[TransactionRecord]) -> TransactionStats {
    let total_transactions = rows.len();
    let total_amount: Amount = rows.iter().map(|r| r.transaction_amount).sum();
    let average_amount = if total_transactions > 0 {
        total_amount / total_transactions as f64
    } else {
        0.0
    };
    let max_transaction = rows
        .iter()
        .map(|r| r.transaction_amount)
        .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.max(v))))
        .unwrap_or(0.0);

    let of_type = |kind: &str| -> (usize, Amount) {
        rows.iter()
            .filter(|r| r.transaction_type == kind)
            .fold((0, 0.0), |(n, s), r| (n + 1, s + r.transaction_amount))
    };
    let (credit_count, credit_sum) = of_type("Credit");
    let (debit_count, debit_sum) = of_type("Debit");

    TransactionStats {
        total_transactions,
        total_amount,
        average_amount,
        max_transaction,
        credit_count,
        credit_sum,
        debit_count,
        debit_sum,
        net_balance: credit_sum - debit_sum,
        locations: count_descending(rows.iter().map(|r| r.transaction_location.as_str())),
    }
}

/// Value counts, most frequent first, ties by value.
pub(crate) fn count_descending<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    let mut out: Vec<(String, usize)> = counts
        .into_iter()
        .map(|(k, n)| (k.to_string(), n))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    out
}
