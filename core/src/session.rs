//! Per-session working set.
//!
//! RULE: desks never reach outside the `SessionContext` they are handed.
//! Each context owns its own SQLite connection, so two sessions cannot
//! observe each other's uploads, cursors or event logs.

use crate::{
    error::{SuiteError, SuiteResult},
    event::{EventLogEntry, SuiteEvent},
    payroll::PayrollDesk,
    reconciliation::{ReconReport, StatusFilter},
    report::CustomerReport,
    risk::CustomerProfile,
    store::SuiteStore,
    table::CsvTable,
    transactions::TransactionsDesk,
    types::SessionId,
};
use std::collections::HashMap;
use uuid::Uuid;

pub struct SessionContext {
    pub id: SessionId,
    pub store: SuiteStore,
    /// Number of commands recorded so far.
    seq: u64,

    // Reconciliation
    pub bank_ledger: Option<CsvTable>,
    pub customer_records: Option<CsvTable>,
    pub recon_report: Option<ReconReport>,
    pub comparison_done: bool,
    pub status_filter: StatusFilter,

    // Credit risk
    pub risk_customers: Option<Vec<CustomerProfile>>,

    // Transactions
    pub transactions: TransactionsDesk,
    pub last_report: Option<CustomerReport>,

    // Payroll
    pub payroll: PayrollDesk,
}

impl SessionContext {
    /// New session with a fresh v4 id.
    pub fn open() -> SuiteResult<Self> {
        Self::with_id(Uuid::new_v4().to_string())
    }

    pub fn with_id(id: SessionId) -> SuiteResult<Self> {
        let mut session = Self {
            store: SuiteStore::open_session()?,
            seq: 0,
            bank_ledger: None,
            customer_records: None,
            recon_report: None,
            comparison_done: false,
            status_filter: StatusFilter::All,
            risk_customers: None,
            transactions: TransactionsDesk::default(),
            last_report: None,
            payroll: PayrollDesk::default(),
            id,
        };
        let opened = SuiteEvent::SessionOpened {
            session_id: session.id.clone(),
        };
        session.record("session", &[opened])?;
        log::info!("session={} opened", session.id);
        Ok(session)
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Persist the events of one command under the next sequence number.
    pub fn record(&mut self, desk: &str, events: &[SuiteEvent]) -> SuiteResult<u64> {
        let seq = self.seq;
        for event in events {
            let entry = EventLogEntry {
                id: None,
                session_id: self.id.clone(),
                seq,
                desk: desk.to_string(),
                event_type: event.type_name().to_string(),
                payload: serde_json::to_string(event)?,
            };
            self.store.append_event(&entry)?;
        }
        self.seq += 1;
        Ok(seq)
    }

    pub fn events(&self) -> SuiteResult<Vec<EventLogEntry>> {
        self.store.events_for_session(&self.id)
    }

    /// A new bank upload invalidates any earlier comparison.
    pub fn set_bank_ledger(&mut self, table: CsvTable) {
        self.bank_ledger = Some(table);
        self.clear_comparison();
    }

    pub fn set_customer_records(&mut self, table: CsvTable) {
        self.customer_records = Some(table);
        self.clear_comparison();
    }

    fn clear_comparison(&mut self) {
        self.recon_report = None;
        self.comparison_done = false;
        self.status_filter = StatusFilter::All;
    }
}

/// All live sessions of one process, keyed by session id.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: HashMap<SessionId, SessionContext>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) -> SuiteResult<SessionId> {
        let session = SessionContext::open()?;
        let id = session.id.clone();
        self.sessions.insert(id.clone(), session);
        Ok(id)
    }

    pub fn get(&self, session_id: &str) -> SuiteResult<&SessionContext> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| SuiteError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    pub fn get_mut(&mut self, session_id: &str) -> SuiteResult<&mut SessionContext> {
        self.sessions
            .get_mut(session_id)
            .ok_or_else(|| SuiteError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    /// Drop a session and everything it uploaded.
    pub fn close(&mut self, session_id: &str) -> SuiteResult<()> {
        self.sessions
            .remove(session_id)
            .map(|_| log::info!("session={session_id} closed"))
            .ok_or_else(|| SuiteError::SessionNotFound {
                session_id: session_id.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
