use thiserror::Error;

#[derive(Error, Debug)]
pub enum SuiteError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{table}: missing column '{column}'")]
    MissingColumn { table: String, column: String },

    #[error("{table}, row {row}: cannot parse {column} value '{value}'")]
    InvalidField {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("{table}, row {row}: empty identifier")]
    EmptyIdentifier { table: String, row: usize },

    #[error("{field} should be a number, got '{term}'")]
    InvalidSearchTerm { field: String, term: String },

    #[error("{what} has not been uploaded")]
    NotLoaded { what: &'static str },

    #[error("Ledgers have not been compared yet")]
    NotCompared,

    #[error("No customers found matching '{term}'")]
    CustomerNotFound { term: String },

    #[error("Payroll: {0}")]
    Payroll(String),

    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Report generation failed: {0}")]
    Report(String),

    #[error("Session '{session_id}' not found")]
    SessionNotFound { session_id: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SuiteResult<T> = Result<T, SuiteError>;
