//! Uploaded CSV tables.
//!
//! Every desk receives its input as a header-row CSV. A `CsvTable` keeps the
//! raw text cells; desks resolve the columns they need up front (so a missing
//! column fails before any row is touched) and then parse typed values per
//! row, reporting the table, row and column of the first bad cell.

use crate::error::{SuiteError, SuiteResult};
use std::io::Read;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct CsvTable {
    /// Label used in error messages ("bank ledger", "salary file", ...).
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn from_reader<R: Read>(name: &str, reader: R) -> SuiteResult<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .flexible(false)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(|c| c.to_string()).collect());
        }

        log::debug!("table: loaded '{name}' with {} rows, {} columns", rows.len(), headers.len());
        Ok(Self {
            name: name.to_string(),
            headers,
            rows,
        })
    }

    pub fn from_csv_str(name: &str, data: &str) -> SuiteResult<Self> {
        Self::from_reader(name, data.as_bytes())
    }

    pub fn from_path(name: &str, path: &Path) -> SuiteResult<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(name, file)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Resolve a column by exact header name.
    pub fn column(&self, name: &str) -> SuiteResult<Column> {
        self.headers
            .iter()
            .position(|h| h == name)
            .map(|index| Column {
                index,
                name: name.to_string(),
            })
            .ok_or_else(|| SuiteError::MissingColumn {
                table: self.name.clone(),
                column: name.to_string(),
            })
    }

    /// Resolve a column that may legitimately be absent.
    pub fn optional_column(&self, name: &str) -> Option<Column> {
        self.column(name).ok()
    }

    pub fn cell<'a>(&'a self, row: usize, column: &Column) -> &'a str {
        self.rows
            .get(row)
            .and_then(|r| r.get(column.index))
            .map(String::as_str)
            .unwrap_or("")
    }

    /// Join key cell. Integer-looking ids are canonicalized so `01` and `1`
    /// name the same record; anything else is kept verbatim.
    pub fn identifier(&self, row: usize, column: &Column) -> SuiteResult<String> {
        let value = self.cell(row, column);
        if value.is_empty() {
            return Err(SuiteError::EmptyIdentifier {
                table: self.name.clone(),
                row: row + 1,
            });
        }
        Ok(match value.parse::<i64>() {
            Ok(n) => n.to_string(),
            Err(_) => value.to_string(),
        })
    }

    /// Text cell that must be non-empty.
    pub fn text(&self, row: usize, column: &Column) -> SuiteResult<String> {
        let value = self.cell(row, column);
        if value.is_empty() {
            return Err(self.invalid(row, column, value));
        }
        Ok(value.to_string())
    }

    /// Decimal cell; empty cells are an error.
    pub fn decimal(&self, row: usize, column: &Column) -> SuiteResult<f64> {
        self.optional_decimal(row, column)?
            .ok_or_else(|| self.invalid(row, column, ""))
    }

    /// Decimal cell where an empty cell means "no value".
    pub fn optional_decimal(&self, row: usize, column: &Column) -> SuiteResult<Option<f64>> {
        let value = self.cell(row, column);
        if value.is_empty() {
            return Ok(None);
        }
        match value.replace(',', "").parse::<f64>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(self.invalid(row, column, value)),
        }
    }

    /// Integer cell. Accepts a trailing ".0" the way spreadsheet exports
    /// tend to write whole numbers.
    pub fn integer(&self, row: usize, column: &Column) -> SuiteResult<i64> {
        let value = self.cell(row, column);
        if let Ok(v) = value.parse::<i64>() {
            return Ok(v);
        }
        match value.parse::<f64>() {
            Ok(v) if v.is_finite() && v.fract() == 0.0 => Ok(v as i64),
            _ => Err(self.invalid(row, column, value)),
        }
    }

    /// Yes/No cell, case-insensitive.
    pub fn yes_no(&self, row: usize, column: &Column) -> SuiteResult<bool> {
        let value = self.cell(row, column);
        if value.eq_ignore_ascii_case("yes") {
            Ok(true)
        } else if value.eq_ignore_ascii_case("no") {
            Ok(false)
        } else {
            Err(self.invalid(row, column, value))
        }
    }

    fn invalid(&self, row: usize, column: &Column, value: &str) -> SuiteError {
        SuiteError::InvalidField {
            table: self.name.clone(),
            // 1-based data row, header excluded.
            row: row + 1,
            column: column.name.clone(),
            value: value.to_string(),
        }
    }
}

/// A resolved column position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub index: usize,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Transaction_ID,Amount,Flag\n1, 100.50 ,Yes\n2,,no\n3,\"1,250.00\",maybe\n";

    #[test]
    fn loads_headers_and_trimmed_cells() {
        let t = CsvTable::from_csv_str("bank ledger", SAMPLE).unwrap();
        assert_eq!(t.headers, vec!["Transaction_ID", "Amount", "Flag"]);
        assert_eq!(t.len(), 3);
        let amount = t.column("Amount").unwrap();
        assert_eq!(t.cell(0, &amount), "100.50");
    }

    #[test]
    fn missing_column_names_table_and_column() {
        let t = CsvTable::from_csv_str("bank ledger", SAMPLE).unwrap();
        let err = t.column("Transactions_Amount").unwrap_err();
        assert_eq!(
            err.to_string(),
            "bank ledger: missing column 'Transactions_Amount'"
        );
    }

    #[test]
    fn optional_decimal_treats_empty_as_absent() {
        let t = CsvTable::from_csv_str("bank ledger", SAMPLE).unwrap();
        let amount = t.column("Amount").unwrap();
        assert_eq!(t.optional_decimal(0, &amount).unwrap(), Some(100.5));
        assert_eq!(t.optional_decimal(1, &amount).unwrap(), None);
        assert_eq!(t.optional_decimal(2, &amount).unwrap(), Some(1250.0));
        assert!(t.decimal(1, &amount).is_err());
    }

    #[test]
    fn yes_no_rejects_other_values() {
        let t = CsvTable::from_csv_str("risk", SAMPLE).unwrap();
        let flag = t.column("Flag").unwrap();
        assert!(t.yes_no(0, &flag).unwrap());
        assert!(!t.yes_no(1, &flag).unwrap());
        let err = t.yes_no(2, &flag).unwrap_err();
        assert!(err.to_string().contains("row 3"), "{err}");
    }

    #[test]
    fn integer_accepts_whole_floats_only() {
        let t = CsvTable::from_csv_str("t", "n\n42\n42.0\n42.5\n").unwrap();
        let n = t.column("n").unwrap();
        assert_eq!(t.integer(0, &n).unwrap(), 42);
        assert_eq!(t.integer(1, &n).unwrap(), 42);
        assert!(t.integer(2, &n).is_err());
    }

    #[test]
    fn identifiers_are_canonical_when_numeric() {
        let t = CsvTable::from_csv_str("t", "id\n007\nCUST01\n-3\n").unwrap();
        let id = t.column("id").unwrap();
        assert_eq!(t.identifier(0, &id).unwrap(), "7");
        assert_eq!(t.identifier(1, &id).unwrap(), "CUST01");
        assert_eq!(t.identifier(2, &id).unwrap(), "-3");
    }

    #[test]
    fn ragged_rows_are_rejected() {
        assert!(CsvTable::from_csv_str("t", "a,b\n1,2\n3\n").is_err());
    }
}
