//! desk-runner: headless front end for the BankTech back-office desks.
//!
//! Usage:
//!   desk-runner reconcile --bank bank.csv --customer customer.csv
//!   desk-runner risk --file customers.csv --search CUST0007
//!   desk-runner sample --out ./demo --rows 200
//!   desk-runner ipc            (JSON lines on stdin/stdout)

use anyhow::Result;
use banktech_core::{
    command::{DeskCommand, DeskRequest, TableInput},
    config::SuiteConfig,
    engine::{DeskView, SuiteEngine},
    reconciliation::StatusFilter,
    risk::CustomerSearchField,
    sample,
    session::{SessionContext, SessionRegistry},
    transactions::{SearchField, SortKey},
};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "desk-runner")]
#[command(about = "Reconciliation, credit risk, transactions and payroll desks (headless)")]
#[command(version)]
struct Cli {
    /// Directory holding config/suite.json
    #[arg(long, global = true, default_value = "./data")]
    data_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare a bank ledger against customer records
    Reconcile {
        #[arg(long)]
        bank: PathBuf,
        #[arg(long)]
        customer: PathBuf,
        /// Rows to show
        #[arg(long, value_enum, default_value = "all")]
        status: StatusArg,
        /// Write the shown rows as CSV
        #[arg(long)]
        export: Option<PathBuf>,
    },

    /// Portfolio overview, optionally with one customer's assessment
    Risk {
        #[arg(long)]
        file: PathBuf,
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value = "id")]
        by: CustomerFieldArg,
    },

    /// Search and page through transactions
    Transactions {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, default_value = "")]
        search: String,
        #[arg(long, value_enum, default_value = "customer-id")]
        by: SearchFieldArg,
        #[arg(long, value_enum, default_value = "transaction-amount")]
        sort: SortArg,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Also generate the customer report
        #[arg(long)]
        report: bool,
    },

    /// Upload a salary file, select everything and release the payments
    Payroll {
        #[arg(long)]
        file: PathBuf,
        #[arg(long, env = "PAYROLL_USERNAME")]
        username: String,
        #[arg(long, env = "PAYROLL_PASSWORD")]
        password: String,
    },

    /// Print the dashboard
    Dashboard,

    /// Write a demo set of upload files
    Sample {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 100)]
        rows: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },

    /// Serve desk commands as JSON lines on stdin/stdout
    Ipc,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    All,
    Matched,
    Unmatched,
}

#[derive(Clone, Copy, ValueEnum)]
enum CustomerFieldArg {
    Id,
    Name,
}

#[derive(Clone, Copy, ValueEnum)]
enum SearchFieldArg {
    TransactionId,
    CustomerId,
    Name,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Age,
    Income,
    CreditScore,
    TransactionDate,
    TransactionAmount,
}

impl From<StatusArg> for StatusFilter {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::All => Self::All,
            StatusArg::Matched => Self::Matched,
            StatusArg::Unmatched => Self::Unmatched,
        }
    }
}

impl From<CustomerFieldArg> for CustomerSearchField {
    fn from(arg: CustomerFieldArg) -> Self {
        match arg {
            CustomerFieldArg::Id => Self::CustomerId,
            CustomerFieldArg::Name => Self::Name,
        }
    }
}

impl From<SearchFieldArg> for SearchField {
    fn from(arg: SearchFieldArg) -> Self {
        match arg {
            SearchFieldArg::TransactionId => Self::TransactionId,
            SearchFieldArg::CustomerId => Self::CustomerId,
            SearchFieldArg::Name => Self::Name,
        }
    }
}

impl From<SortArg> for SortKey {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Age => Self::Age,
            SortArg::Income => Self::Income,
            SortArg::CreditScore => Self::CreditScore,
            SortArg::TransactionDate => Self::TransactionDate,
            SortArg::TransactionAmount => Self::TransactionAmount,
        }
    }
}

fn main() -> Result<()> {
    // .env is optional; it only ever supplies GEMINI_API_KEY and friends.
    dotenv::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let config = SuiteConfig::load_or_default(&cli.data_dir)?;

    if let Commands::Sample { out, rows, seed } = &cli.command {
        let files = sample::write_samples(out, *seed, *rows, &config)?;
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    let engine = SuiteEngine::new(config);
    match cli.command {
        Commands::Ipc => run_ipc_loop(&engine),
        command => run_once(&engine, command),
    }
}

/// One-shot subcommands: a throwaway session, a fixed command script, every
/// view printed as pretty JSON.
fn run_once(engine: &SuiteEngine, command: Commands) -> Result<()> {
    let mut session = SessionContext::open()?;
    let script = match command {
        Commands::Reconcile {
            bank,
            customer,
            status,
            export,
        } => {
            let filter = StatusFilter::from(status);
            let mut script = vec![
                DeskCommand::UploadBankLedger {
                    file: TableInput::Path { path: bank },
                },
                DeskCommand::UploadCustomerRecords {
                    file: TableInput::Path { path: customer },
                },
                DeskCommand::CompareLedgers,
                DeskCommand::FilterReconciliation { filter },
            ];
            if let Some(path) = export {
                script.push(DeskCommand::ExportReconciliation { path, filter });
            }
            script
        }
        Commands::Risk { file, search, by } => {
            let mut script = vec![DeskCommand::UploadRiskProfiles {
                file: TableInput::Path { path: file },
            }];
            if let Some(term) = search {
                script.push(DeskCommand::AssessCustomer {
                    term,
                    field: by.into(),
                });
            }
            script
        }
        Commands::Transactions {
            file,
            search,
            by,
            sort,
            page,
            report,
        } => {
            let mut script = vec![
                DeskCommand::UploadTransactions {
                    file: TableInput::Path { path: file },
                },
                DeskCommand::QueryTransactions {
                    term: search,
                    field: by.into(),
                    sort: sort.into(),
                },
            ];
            script.extend((1..page).map(|_| DeskCommand::NextPage));
            script.push(DeskCommand::TransactionCharts);
            if report {
                script.push(DeskCommand::GenerateReport);
            }
            script
        }
        Commands::Payroll {
            file,
            username,
            password,
        } => vec![
            DeskCommand::UploadSalaryFile {
                file: TableInput::Path { path: file },
            },
            DeskCommand::SelectAllEmployees { selected: true },
            DeskCommand::ProcessPayments,
            DeskCommand::Authenticate { username, password },
        ],
        Commands::Dashboard => vec![DeskCommand::Dashboard],
        Commands::Sample { .. } | Commands::Ipc => Vec::new(),
    };

    for command in script {
        let view = engine.handle(&mut session, command)?;
        print_view(&view)?;
    }
    log::info!("session={} finished after {} commands", session.id, session.seq());
    Ok(())
}

fn print_view(view: &DeskView) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(view)?);
    Ok(())
}

fn run_ipc_loop(engine: &SuiteEngine) -> Result<()> {
    let mut registry = SessionRegistry::new();
    let default_session = registry.open()?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let request: DeskRequest = match serde_json::from_str(&buffer) {
            Ok(r) => r,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
                stdout.flush()?;
                continue;
            }
        };
        if request.command == DeskCommand::Quit {
            break;
        }

        match engine.handle_request(&mut registry, &default_session, request) {
            Ok(view) => writeln!(stdout, "{}", serde_json::to_string(&view)?)?,
            Err(e) => {
                let err_json = serde_json::json!({ "error": e.to_string() });
                writeln!(stdout, "{}", err_json)?;
            }
        }
        stdout.flush()?;
    }
    log::info!("ipc: closing {} session(s)", registry.len());
    Ok(())
}
