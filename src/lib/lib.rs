mod errors;
mod iif;
mod io;
mod memo;
mod transactions;
mod types;
mod utils;

use std::{error::Error, path::PathBuf};

use log::info;

pub use errors::{ConversionError, RowError};
pub use iif::{DepositBlock, IifDocument, LineKind, TransactionLine};
pub use io::{bank_mapping, deposit_rows, gl_mapping, write_documents, Table};
pub use memo::{memo_rule, resolve_memo, MemoContext, MemoRule, MemoSource};
pub use transactions::{build, build_block, build_with_layout, BuildOutput};
pub use types::{
    BankMapping, ColumnLayout, DepositRow, GlMapping, MonetaryAmount, StoreName, TenderFields,
    DEFAULT_CUSTOMER_COUNT_COLUMN, DEFAULT_DEPOSIT_COLUMN, DEFAULT_DATE_COLUMN,
    DEFAULT_STORE_COLUMN, DEFAULT_TENDER_COLUMNS, TENDER_COUNT,
};

/// Input files and options of one conversion run.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub deposits: PathBuf,
    pub gl_mapping: PathBuf,
    /// Without a bank mapping every TRNS line has an empty account.
    pub bank_mapping: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub layout: ColumnLayout,
}

#[derive(Debug)]
pub struct ConversionReport {
    pub written: Vec<PathBuf>,
    pub output: BuildOutput,
}

/// Builds documents from tables already in memory. Nothing is written.
pub fn convert_tables(
    deposits: &Table,
    gl: &Table,
    bank: Option<&Table>,
    layout: &ColumnLayout,
) -> Result<BuildOutput, ConversionError> {
    let rows = deposit_rows(deposits, layout)?;
    let gl = gl_mapping(gl)?;
    let bank = match bank {
        Some(table) => bank_mapping(table)?,
        None => BankMapping::default(),
    };
    Ok(build_with_layout(&rows, &gl, &bank, layout))
}

pub fn convert_deposits(request: &ConversionRequest) -> Result<ConversionReport, Box<dyn Error>> {
    let deposits = Table::from_path(&request.deposits)?;
    let gl = Table::from_path(&request.gl_mapping)?;
    let bank = request
        .bank_mapping
        .as_ref()
        .map(Table::from_path)
        .transpose()?;

    let output = convert_tables(&deposits, &gl, bank.as_ref(), &request.layout)?;
    let written = write_documents(&request.output_dir, &output.documents)?;
    info!(
        "wrote {} documents to {}",
        written.len(),
        request.output_dir.display()
    );

    Ok(ConversionReport { written, output })
}
