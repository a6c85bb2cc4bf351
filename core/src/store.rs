//! Session-scoped SQLite layer.
//!
//! RULE: Only store.rs talks to the database.
//! Desks call store methods; they never execute SQL directly.
//! Every session owns one in-memory connection; nothing is shared.

use crate::{
    error::SuiteResult,
    event::EventLogEntry,
    transactions::{SortKey, TransactionRecord, TxnFilter},
};
use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, types::Value, Connection, Row};

pub struct SuiteStore {
    conn: Connection,
}

const TXN_COLUMNS: &str = "transaction_id, customer_id, name, age, income, credit_score,
     transaction_date, transaction_amount, transaction_type, description,
     transaction_location";

impl SuiteStore {
    /// Open a private in-memory database for one session.
    pub fn in_memory() -> SuiteResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn })
    }

    /// Apply all schema migrations in order.
    pub fn migrate(&self) -> SuiteResult<()> {
        self.conn
            .execute_batch(include_str!("../../migrations/001_session.sql"))?;
        Ok(())
    }

    /// `in_memory()` + `migrate()`.
    pub fn open_session() -> SuiteResult<Self> {
        let store = Self::in_memory()?;
        store.migrate()?;
        Ok(store)
    }

    // ── Transactions ───────────────────────────────────────────

    /// Replace the session's transaction table. All-or-nothing.
    pub fn replace_transactions(&mut self, rows: &[TransactionRecord]) -> SuiteResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM txn", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO txn (
                    transaction_id, customer_id, name, age, income, credit_score,
                    transaction_date, transaction_amount, transaction_type, description,
                    transaction_location
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for r in rows {
                stmt.execute(params![
                    r.transaction_id,
                    r.customer_id,
                    &r.name,
                    r.age,
                    r.income,
                    r.credit_score,
                    r.transaction_date.format("%Y-%m-%d").to_string(),
                    r.transaction_amount,
                    &r.transaction_type,
                    &r.description,
                    &r.transaction_location,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn count_transactions(&self, filter: &TxnFilter) -> SuiteResult<usize> {
        let (clause, args) = where_clause(filter);
        let sql = format!("SELECT COUNT(*) FROM txn {clause}");
        let n: i64 = self
            .conn
            .query_row(&sql, params_from_iter(args.iter()), |row| row.get(0))?;
        Ok(n as usize)
    }

    /// One page of filtered rows, ascending by `sort`, ties in upload order.
    pub fn query_transactions(
        &self,
        filter: &TxnFilter,
        sort: SortKey,
        limit: usize,
        offset: usize,
    ) -> SuiteResult<Vec<TransactionRecord>> {
        let (clause, mut args) = where_clause(filter);
        let sql = format!(
            "SELECT {TXN_COLUMNS} FROM txn {clause}
             ORDER BY {} ASC, seq ASC
             LIMIT ? OFFSET ?",
            sort.column()
        );
        args.push(Value::Integer(limit as i64));
        args.push(Value::Integer(offset as i64));
        self.select_transactions(&sql, args)
    }

    /// Every filtered row in upload order.
    pub fn filtered_transactions(&self, filter: &TxnFilter) -> SuiteResult<Vec<TransactionRecord>> {
        let (clause, args) = where_clause(filter);
        let sql = format!("SELECT {TXN_COLUMNS} FROM txn {clause} ORDER BY seq ASC");
        self.select_transactions(&sql, args)
    }

    fn select_transactions(&self, sql: &str, args: Vec<Value>) -> SuiteResult<Vec<TransactionRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), row_to_transaction)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    // ── Event log ──────────────────────────────────────────────

    pub fn append_event(&self, entry: &EventLogEntry) -> SuiteResult<()> {
        self.conn.execute(
            "INSERT INTO event_log (session_id, seq, desk, event_type, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                entry.session_id,
                entry.seq as i64,
                entry.desk,
                entry.event_type,
                entry.payload,
            ],
        )?;
        Ok(())
    }

    pub fn events_for_session(&self, session_id: &str) -> SuiteResult<Vec<EventLogEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, session_id, seq, desk, event_type, payload
             FROM event_log WHERE session_id = ?1
             ORDER BY id ASC",
        )?;
        let entries = stmt
            .query_map(params![session_id], |row| {
                Ok(EventLogEntry {
                    id: Some(row.get(0)?),
                    session_id: row.get(1)?,
                    seq: row.get::<_, i64>(2)? as u64,
                    desk: row.get(3)?,
                    event_type: row.get(4)?,
                    payload: row.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

fn where_clause(filter: &TxnFilter) -> (&'static str, Vec<Value>) {
    match filter {
        TxnFilter::All => ("", Vec::new()),
        TxnFilter::TransactionId(id) => ("WHERE transaction_id = ?", vec![Value::Integer(*id)]),
        TxnFilter::CustomerId(id) => ("WHERE customer_id = ?", vec![Value::Integer(*id)]),
        // instr() rather than LIKE so '%' and '_' in the term match literally.
        TxnFilter::Name(term) => (
            "WHERE instr(lower(name), lower(?)) > 0",
            vec![Value::Text(term.clone())],
        ),
    }
}

fn row_to_transaction(row: &Row<'_>) -> rusqlite::Result<TransactionRecord> {
    let date: String = row.get(6)?;
    let transaction_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(6, rusqlite::types::Type::Text, Box::new(e))
    })?;
    Ok(TransactionRecord {
        transaction_id: row.get(0)?,
        customer_id: row.get(1)?,
        name: row.get(2)?,
        age: row.get(3)?,
        income: row.get(4)?,
        credit_score: row.get(5)?,
        transaction_date,
        transaction_amount: row.get(7)?,
        transaction_type: row.get(8)?,
        description: row.get(9)?,
        transaction_location: row.get(10)?,
    })
}
