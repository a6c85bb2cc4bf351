//! The suite engine: routes `DeskCommand`s to the desk that owns them.
//!
//! RULES:
//!   - Every command runs against exactly one `SessionContext`.
//!   - Every command is recorded in that session's event log, failures
//!     included (as `CommandFailed`).
//!   - External collaborators (report generation, payment authorization,
//!     the wall clock) are injected; the engine never constructs them ad hoc.

use crate::{
    charts::{self, DatedAmount, Slice, StatusSlice},
    command::{DeskCommand, DeskRequest, TableInput},
    config::SuiteConfig,
    dashboard::{self, DashboardView},
    error::{SuiteError, SuiteResult},
    event::{EventLogEntry, SuiteEvent},
    payroll::{
        Credentials, PaymentAuthorizer, PaymentConfirmation, PayrollDesk, PayrollStage,
        SelectionSummary, SimulatedAuthorizer,
    },
    reconciliation::{self, ReconRow, ReconSummary, StatusFilter},
    report::{self, CustomerReport, GeminiReportGenerator, ReportGenerator},
    risk::{self, CustomerProfile, PortfolioOverview, RiskAssessment},
    session::{SessionContext, SessionRegistry},
    table::CsvTable,
    transactions::{self, CustomerSummary, Page, TransactionStats, TxnQuery},
    types::SessionId,
};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::path::PathBuf;

/// What a command hands back to the front end.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum DeskView {
    Session {
        session_id: SessionId,
    },
    SessionClosed {
        session_id: SessionId,
    },
    Events {
        events: Vec<EventLogEntry>,
    },
    Uploaded {
        table: &'static str,
        records: usize,
    },
    Reconciliation {
        filter: StatusFilter,
        summary: ReconSummary,
        rows: Vec<ReconRow>,
        chart: Vec<StatusSlice>,
    },
    Exported {
        path: PathBuf,
        rows: usize,
    },
    Portfolio {
        overview: PortfolioOverview,
    },
    Assessment {
        customer: CustomerProfile,
        assessment: RiskAssessment,
        /// Human-readable `assessment.risk_factors`; empty means no
        /// significant risk factors.
        factors: Vec<&'static str>,
    },
    TransactionsPage {
        page: Page,
        customer: Option<CustomerSummary>,
        show_report: bool,
        /// The open report panel's contents; `None` while it is hidden.
        report: Option<CustomerReport>,
    },
    TransactionCharts {
        stats: TransactionStats,
        types: Vec<Slice>,
        amount_by_date: Vec<DatedAmount>,
        locations: Vec<Slice>,
    },
    Report {
        report: CustomerReport,
    },
    Payroll {
        stage: PayrollStage,
        selection: Option<SelectionSummary>,
        confirmation: Option<PaymentConfirmation>,
    },
    Dashboard {
        dashboard: DashboardView,
    },
}

pub type Clock = Box<dyn Fn() -> NaiveDateTime>;

pub struct SuiteEngine {
    pub config: SuiteConfig,
    reporter: Box<dyn ReportGenerator>,
    authorizer: Box<dyn PaymentAuthorizer>,
    clock: Clock,
}

impl SuiteEngine {
    /// Engine wired with the production collaborators: the Gemini client,
    /// the simulated authorizer and the local wall clock.
    pub fn new(config: SuiteConfig) -> Self {
        let reporter = GeminiReportGenerator::from_config(&config.report);
        Self {
            config,
            reporter: Box::new(reporter),
            authorizer: Box::new(SimulatedAuthorizer),
            clock: Box::new(|| chrono::Local::now().naive_local()),
        }
    }

    pub fn with_report_generator(mut self, reporter: Box<dyn ReportGenerator>) -> Self {
        self.reporter = reporter;
        self
    }

    pub fn with_authorizer(mut self, authorizer: Box<dyn PaymentAuthorizer>) -> Self {
        self.authorizer = authorizer;
        self
    }

    pub fn with_clock(mut self, clock: impl Fn() -> NaiveDateTime + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Route one IPC request. Session lifecycle commands act on the
    /// registry; everything else runs against the addressed session, or
    /// `default_session` when the request names none.
    pub fn handle_request(
        &self,
        registry: &mut SessionRegistry,
        default_session: &str,
        request: DeskRequest,
    ) -> SuiteResult<DeskView> {
        match request.command {
            DeskCommand::OpenSession => {
                let session_id = registry.open()?;
                Ok(DeskView::Session { session_id })
            }
            DeskCommand::CloseSession => {
                let session_id = request.session.ok_or_else(|| {
                    SuiteError::Other(anyhow::anyhow!("close_session needs a session id"))
                })?;
                registry.close(&session_id)?;
                Ok(DeskView::SessionClosed { session_id })
            }
            command => {
                let session_id = request.session.as_deref().unwrap_or(default_session);
                let session = registry.get_mut(session_id)?;
                self.handle(session, command)
            }
        }
    }

    /// Run one command against `session` and record what happened.
    pub fn handle(&self, session: &mut SessionContext, command: DeskCommand) -> SuiteResult<DeskView> {
        let desk = command.desk();
        let name = command.name();
        log::debug!("session={} cmd={name}", session.id);

        let mut events = Vec::new();
        match self.dispatch(session, command, &mut events) {
            Ok(view) => {
                session.record(desk, &events)?;
                Ok(view)
            }
            Err(e) => {
                log::warn!("session={} cmd={name} failed: {e}", session.id);
                events.push(SuiteEvent::CommandFailed {
                    command: name.to_string(),
                    error: e.to_string(),
                });
                session.record(desk, &events)?;
                Err(e)
            }
        }
    }

    fn dispatch(
        &self,
        session: &mut SessionContext,
        command: DeskCommand,
        events: &mut Vec<SuiteEvent>,
    ) -> SuiteResult<DeskView> {
        let cfg = &self.config;
        match command {
            // ── Session ───────────────────────────────────
            DeskCommand::OpenSession | DeskCommand::CloseSession => Err(SuiteError::Other(
                anyhow::anyhow!("session lifecycle commands go through the registry"),
            )),
            DeskCommand::Quit => Ok(DeskView::Session {
                session_id: session.id.clone(),
            }),
            DeskCommand::SessionEvents => Ok(DeskView::Events {
                events: session.events()?,
            }),

            // ── Reconciliation ────────────────────────────
            DeskCommand::UploadBankLedger { file } => {
                let table = load_table(&file, "Bank ledger")?;
                let records = reconciliation::normalize_ledger(&table, &cfg.reconciliation.bank)?.len();
                session.set_bank_ledger(table);
                events.push(SuiteEvent::BankLedgerUploaded { records });
                Ok(DeskView::Uploaded {
                    table: "bank_ledger",
                    records,
                })
            }
            DeskCommand::UploadCustomerRecords { file } => {
                let table = load_table(&file, "Customer records")?;
                let records =
                    reconciliation::normalize_ledger(&table, &cfg.reconciliation.customer)?.len();
                session.set_customer_records(table);
                events.push(SuiteEvent::CustomerRecordsUploaded { records });
                Ok(DeskView::Uploaded {
                    table: "customer_records",
                    records,
                })
            }
            DeskCommand::CompareLedgers => {
                let bank = session.bank_ledger.as_ref().ok_or(SuiteError::NotLoaded {
                    what: "Bank ledger",
                })?;
                let customer = session
                    .customer_records
                    .as_ref()
                    .ok_or(SuiteError::NotLoaded {
                        what: "Customer records",
                    })?;
                let report = reconciliation::reconcile_tables(bank, customer, &cfg.reconciliation)?;
                events.push(SuiteEvent::ReconciliationCompleted {
                    total_records: report.summary.total_records,
                    matched: report.summary.matched.count,
                    unmatched: report.summary.unmatched.count,
                });
                session.recon_report = Some(report);
                session.comparison_done = true;
                reconciliation_view(session)
            }
            DeskCommand::FilterReconciliation { filter } => {
                session.recon_report.as_ref().ok_or(SuiteError::NotCompared)?;
                session.status_filter = filter;
                let view = reconciliation_view(session)?;
                if let DeskView::Reconciliation { rows, .. } = &view {
                    events.push(SuiteEvent::ReconciliationFiltered {
                        filter,
                        rows: rows.len(),
                    });
                }
                Ok(view)
            }
            DeskCommand::ExportReconciliation { path, filter } => {
                let report = session.recon_report.as_ref().ok_or(SuiteError::NotCompared)?;
                // Nothing touches disk until the whole CSV is rendered.
                let mut buffer = Vec::new();
                let rows = report.export_csv(&mut buffer, filter)?;
                std::fs::write(&path, buffer)?;
                log::info!("session={} recon: exported {rows} rows to {}", session.id, path.display());
                Ok(DeskView::Exported { path, rows })
            }

            // ── Credit risk ───────────────────────────────
            DeskCommand::UploadRiskProfiles { file } => {
                let table = load_table(&file, "Customer data")?;
                let profiles = risk::load_profiles(&table, &cfg.risk.columns)?;
                let records = profiles.len();
                let customers = risk::unique_customers(profiles);
                events.push(SuiteEvent::RiskPortfolioLoaded {
                    records,
                    unique_customers: customers.len(),
                });
                let overview = risk::portfolio_overview(&customers, &cfg.risk);
                session.risk_customers = Some(customers);
                Ok(DeskView::Portfolio { overview })
            }
            DeskCommand::PortfolioOverview => {
                let customers = risk_customers(session)?;
                Ok(DeskView::Portfolio {
                    overview: risk::portfolio_overview(customers, &cfg.risk),
                })
            }
            DeskCommand::AssessCustomer { term, field } => {
                let (customer, assessment) = risk::lookup(risk_customers(session)?, &term, field)?;
                log::info!(
                    "session={} risk: customer={} score={} category={}",
                    session.id,
                    customer.customer_id,
                    assessment.score,
                    assessment.category
                );
                events.push(SuiteEvent::CustomerAssessed {
                    customer_id: customer.customer_id.clone(),
                    score: assessment.score,
                    category: assessment.category,
                });
                let factors = assessment
                    .risk_factors
                    .iter()
                    .map(|f| f.description())
                    .collect();
                Ok(DeskView::Assessment {
                    customer,
                    assessment,
                    factors,
                })
            }

            // ── Transactions ──────────────────────────────
            DeskCommand::UploadTransactions { file } => {
                let table = load_table(&file, "Transaction data")?;
                let records = session.transactions.load(&mut session.store, &table)?;
                session.last_report = None;
                events.push(SuiteEvent::TransactionsLoaded { records });
                let page = session
                    .transactions
                    .current_page(&session.store, cfg.transactions.rows_per_page)?;
                transactions_view(session, page)
            }
            DeskCommand::QueryTransactions { term, field, sort } => {
                if !session.transactions.loaded {
                    return Err(SuiteError::NotLoaded {
                        what: "Transaction data",
                    });
                }
                session.transactions.set_query(TxnQuery { term, field, sort })?;
                if !session.transactions.show_report {
                    session.last_report = None;
                }
                let page = session
                    .transactions
                    .current_page(&session.store, cfg.transactions.rows_per_page)?;
                events.push(SuiteEvent::TransactionsQueried {
                    search_key: session.transactions.query.search_key(),
                    matches: page.total_records,
                    page: page.page,
                });
                transactions_view(session, page)
            }
            DeskCommand::NextPage => {
                let page = session
                    .transactions
                    .next_page(&session.store, cfg.transactions.rows_per_page)?;
                transactions_view(session, page)
            }
            DeskCommand::PreviousPage => {
                let page = session
                    .transactions
                    .previous_page(&session.store, cfg.transactions.rows_per_page)?;
                transactions_view(session, page)
            }
            DeskCommand::TransactionCharts => {
                let rows = session.transactions.filtered(&session.store)?;
                Ok(DeskView::TransactionCharts {
                    stats: transactions::transaction_stats(&rows),
                    types: charts::transaction_types(&rows),
                    amount_by_date: charts::amount_by_date(&rows),
                    locations: charts::locations(&rows, cfg.transactions.top_locations),
                })
            }
            DeskCommand::GenerateReport => {
                let rows = session.transactions.filtered(&session.store)?;
                let first = rows.first().ok_or_else(|| SuiteError::CustomerNotFound {
                    term: session.transactions.query.term.clone(),
                })?;
                let stats = transactions::transaction_stats(&rows);
                let report = report::generate_report(self.reporter.as_ref(), &first.name, &stats);
                events.push(SuiteEvent::ReportGenerated {
                    customer_name: report.customer_name.clone(),
                    placeholder: report.placeholder,
                });
                session.transactions.show_report = true;
                session.last_report = Some(report.clone());
                Ok(DeskView::Report { report })
            }
            DeskCommand::HideReport => {
                session.transactions.show_report = false;
                session.last_report = None;
                let page = session
                    .transactions
                    .current_page(&session.store, cfg.transactions.rows_per_page)?;
                transactions_view(session, page)
            }

            // ── Payroll ───────────────────────────────────
            DeskCommand::UploadSalaryFile { file } => {
                let table = load_table(&file, "Salary file")?;
                let batch = session.payroll.upload(&table, &cfg.payroll)?;
                events.push(SuiteEvent::SalaryFileUploaded {
                    employees: batch.employees(),
                    total_amount: batch.total_amount,
                });
                events.push(stage_changed(PayrollStage::Uploaded));
                Ok(payroll_view(&session.payroll))
            }
            DeskCommand::SelectAllEmployees { selected } => {
                session.payroll.set_select_all(selected)?;
                Ok(payroll_view(&session.payroll))
            }
            DeskCommand::ProcessPayments => {
                let stage = session.payroll.request_processing()?;
                events.push(stage_changed(stage));
                Ok(payroll_view(&session.payroll))
            }
            DeskCommand::Authenticate { username, password } => {
                let credentials = Credentials { username, password };
                let confirmation = session.payroll.authenticate(
                    self.authorizer.as_ref(),
                    &credentials,
                    cfg.payroll.processing_fee,
                    (self.clock)(),
                )?;
                events.push(SuiteEvent::PaymentProcessed {
                    reference: confirmation.reference,
                    employees: confirmation.employees,
                    total_debited: confirmation.total_debited,
                });
                events.push(stage_changed(PayrollStage::Processed));
                Ok(payroll_view(&session.payroll))
            }
            DeskCommand::CancelAuthentication => {
                let stage = session.payroll.cancel_authentication()?;
                events.push(stage_changed(stage));
                Ok(payroll_view(&session.payroll))
            }
            DeskCommand::NewTransaction => {
                let stage = session.payroll.new_transaction()?;
                events.push(stage_changed(stage));
                Ok(payroll_view(&session.payroll))
            }

            // ── Dashboard ─────────────────────────────────
            DeskCommand::Dashboard => Ok(DeskView::Dashboard {
                dashboard: dashboard::build(&cfg.dashboard),
            }),
        }
    }
}

fn load_table(input: &TableInput, name: &str) -> SuiteResult<CsvTable> {
    match input {
        TableInput::Path { path } => CsvTable::from_path(name, path),
        TableInput::Inline { csv } => CsvTable::from_csv_str(name, csv),
    }
}

fn reconciliation_view(session: &SessionContext) -> SuiteResult<DeskView> {
    let report = session.recon_report.as_ref().ok_or(SuiteError::NotCompared)?;
    Ok(DeskView::Reconciliation {
        filter: session.status_filter,
        summary: report.summary.clone(),
        rows: report
            .filtered(session.status_filter)
            .into_iter()
            .cloned()
            .collect(),
        chart: charts::reconciliation_status(report),
    })
}

fn risk_customers(session: &SessionContext) -> SuiteResult<&[CustomerProfile]> {
    session
        .risk_customers
        .as_deref()
        .ok_or(SuiteError::NotLoaded {
            what: "Customer data",
        })
}

fn transactions_view(session: &SessionContext, page: Page) -> SuiteResult<DeskView> {
    Ok(DeskView::TransactionsPage {
        customer: session.transactions.customer_summary(&session.store)?,
        show_report: session.transactions.show_report,
        report: session
            .last_report
            .clone()
            .filter(|_| session.transactions.show_report),
        page,
    })
}

fn payroll_view(desk: &PayrollDesk) -> DeskView {
    DeskView::Payroll {
        stage: desk.stage,
        selection: desk.selection().ok(),
        confirmation: desk.confirmation.clone(),
    }
}

fn stage_changed(stage: PayrollStage) -> SuiteEvent {
    SuiteEvent::PayrollStageChanged {
        stage: stage.name().to_string(),
    }
}
