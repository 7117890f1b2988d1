use std::{path::PathBuf, process};

use clap::Parser;
use iif_deposits_lib::{
    convert_deposits, ColumnLayout, ConversionRequest, DEFAULT_CUSTOMER_COUNT_COLUMN,
    DEFAULT_DEPOSIT_COLUMN,
};

/// Convert point-of-sale deposit rows into QuickBooks IIF files, one per store.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// CSV export of deposit rows
    deposits: PathBuf,
    /// CSV with original_name,new_name columns
    gl_mapping: PathBuf,
    /// CSV with new_col_name,store_name,mapped_col_name columns
    #[arg(long)]
    bank_mapping: Option<PathBuf>,
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,
    /// Column whose account selects the bank account of each deposit
    #[arg(long, default_value = DEFAULT_DEPOSIT_COLUMN)]
    deposit_column: String,
    #[arg(long, default_value = DEFAULT_CUSTOMER_COUNT_COLUMN)]
    customer_count_column: String,
}

impl Args {
    fn into_request(self) -> ConversionRequest {
        ConversionRequest {
            deposits: self.deposits,
            gl_mapping: self.gl_mapping,
            bank_mapping: self.bank_mapping,
            output_dir: self.output_dir,
            layout: ColumnLayout {
                deposit: self.deposit_column,
                customer_count: self.customer_count_column,
                ..ColumnLayout::default()
            },
        }
    }
}

fn main() {
    env_logger::init();
    let request = Args::parse().into_request();

    match convert_deposits(&request) {
        Ok(report) => {
            for path in &report.written {
                println!("{}", path.display());
            }
            for err in report
                .output
                .failed_stores
                .iter()
                .chain(report.output.skipped_rows.iter())
            {
                eprintln!("{}", err);
            }
            process::exit(0);
        }
        Err(e) => {
            eprintln!("an error occurred: {:#?}", e);
            process::exit(1);
        }
    }
}
