use thiserror::Error;

/// Failures that stop a conversion before any document is produced.
#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("{table} table is missing required column {column:?}")]
    MissingColumn { table: &'static str, column: String },
    #[error("stores {first:?} and {second:?} would both be written to {file_name}")]
    DuplicateFileName {
        file_name: String,
        first: String,
        second: String,
    },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Problems with a single deposit row. Depending on the variant the row is skipped, or the whole
/// store the row belongs to is dropped from the output (see `BuildOutput`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RowError {
    #[error("line {line}: store {store:?} has date {value:?}, expected MM/DD/YYYY")]
    InvalidDate {
        store: String,
        line: usize,
        value: String,
    },
    #[error("line {line}: store {store:?} has non-numeric {column:?} amount {value:?}")]
    InvalidAmount {
        store: String,
        line: usize,
        column: String,
        value: String,
    },
    #[error("line {line}: store {store:?} tender total is out of range")]
    AmountOverflow { store: String, line: usize },
    #[error("line {line}: row has no store name")]
    MissingStore { line: usize },
}

impl RowError {
    pub fn line(&self) -> usize {
        match self {
            RowError::InvalidDate { line, .. }
            | RowError::InvalidAmount { line, .. }
            | RowError::AmountOverflow { line, .. }
            | RowError::MissingStore { line } => *line,
        }
    }
}
