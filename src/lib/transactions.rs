use chrono::NaiveDate;
use im::Vector;
use log::{debug, info, warn};

use crate::errors::RowError;
use crate::iif::{DepositBlock, IifDocument, LineKind, TransactionLine, DATE_FORMAT};
use crate::memo::{always_emitted, resolve_memo, MemoContext};
use crate::types::{
    BankMapping, ColumnLayout, DepositRow, GlMapping, MonetaryAmount, StoreName, TenderFields,
    TENDER_COUNT,
};
use crate::utils::PushImmut;

/// Documents in first-seen store order, plus everything that was left out of them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuildOutput {
    pub documents: Vector<IifDocument>,
    /// Rows dropped for a bad amount or a missing store name, including rows of stores that
    /// later failed.
    pub skipped_rows: Vector<RowError>,
    /// Errors that kept a whole store from being written.
    pub failed_stores: Vector<RowError>,
}

impl BuildOutput {
    pub fn document(&self, store: &str) -> Option<&IifDocument> {
        self.documents.iter().find(|doc| doc.store().value() == store)
    }

    pub fn is_clean(&self) -> bool {
        self.skipped_rows.is_empty() && self.failed_stores.is_empty()
    }
}

#[derive(Clone)]
struct StoreRows<'a> {
    store: StoreName,
    rows: Vector<&'a DepositRow>,
}

impl<'a> StoreRows<'a> {
    fn with_row(&self, row: &'a DepositRow) -> Self {
        Self {
            store: self.store.clone(),
            rows: self.rows.push(row),
        }
    }
}

// Stores keep the order they are first seen in, rows keep input order within a store.
fn group_by_store(rows: &[DepositRow]) -> (Vector<StoreRows<'_>>, Vector<RowError>) {
    rows.iter().fold(
        (Vector::new(), Vector::new()),
        |(groups, unassigned): (Vector<StoreRows>, Vector<RowError>), row| {
            if row.store.value().is_empty() {
                let err = RowError::MissingStore { line: row.line };
                warn!("skipping row: {}", err);
                return (groups, unassigned.push(err));
            }
            match groups.iter().position(|group| group.store == row.store) {
                Some(idx) => (groups.update(idx, groups[idx].with_row(row)), unassigned),
                None => (
                    groups.push(StoreRows {
                        store: row.store.clone(),
                        rows: Vector::unit(row),
                    }),
                    unassigned,
                ),
            }
        },
    )
}

fn parse_date(row: &DepositRow) -> Result<NaiveDate, RowError> {
    NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT).map_err(|_| RowError::InvalidDate {
        store: row.store.value().to_string(),
        line: row.line,
        value: row.date.clone(),
    })
}

fn parse_amount(row: &DepositRow, column: &str, raw: &str) -> Result<MonetaryAmount, RowError> {
    MonetaryAmount::parse(raw).ok_or_else(|| RowError::InvalidAmount {
        store: row.store.value().to_string(),
        line: row.line,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

// Tenders are required, a blank one is as bad as a non-numeric one.
fn parse_tenders(row: &DepositRow, layout: &ColumnLayout) -> Result<TenderFields, RowError> {
    let mut amounts = [MonetaryAmount::default(); TENDER_COUNT];
    for (slot, (column, raw)) in amounts
        .iter_mut()
        .zip(layout.tenders.iter().zip(row.tenders.iter()))
    {
        *slot = parse_amount(row, column, raw)?;
    }
    Ok(TenderFields::new(amounts))
}

fn parse_split_amount(row: &DepositRow, column: &str, raw: &str) -> Result<MonetaryAmount, RowError> {
    if raw.trim().is_empty() {
        return Ok(MonetaryAmount::default());
    }
    parse_amount(row, column, raw)
}

/// Turns one deposit row into its TRNS line and split lines.
///
/// The TRNS line carries the rounded tender total and lands in the bank account mapped for the
/// store's deposit column. Every remaining amount column becomes a split on its GL account when
/// non-zero, or unconditionally when the memo table says so.
pub fn build_block(
    row: &DepositRow,
    date: NaiveDate,
    gl_mapping: &GlMapping,
    bank_mapping: &BankMapping,
    layout: &ColumnLayout,
) -> Result<DepositBlock, RowError> {
    let tenders = parse_tenders(row, layout)?;
    let tender_display = tenders.display();
    let total = tenders.total().ok_or_else(|| RowError::AmountOverflow {
        store: row.store.value().to_string(),
        line: row.line,
    })?;

    let deposit_account = gl_mapping.map_column(&layout.deposit);
    let trns = TransactionLine {
        kind: LineKind::Trns,
        date,
        account: bank_mapping.account_for(&deposit_account, &row.store),
        amount: total,
        docnum: String::new(),
        memo: tender_display.clone(),
    };

    let amounts = row
        .amounts
        .iter()
        .map(|(column, raw)| parse_split_amount(row, column, raw).map(|amount| (column, amount)))
        .collect::<Result<Vec<_>, RowError>>()?;

    let context = MemoContext {
        customer_count: row.customer_count.as_deref(),
        tender_display: &tender_display,
    };
    let splits = amounts
        .into_iter()
        .filter(|(column, amount)| !amount.is_zero() || always_emitted(column))
        .map(|(column, amount)| TransactionLine {
            kind: LineKind::Spl,
            date,
            account: gl_mapping.map_column(column),
            amount,
            docnum: String::new(),
            memo: resolve_memo(column, &context),
        })
        .collect();

    Ok(DepositBlock { trns, splits })
}

// Rows skipped so far and the error that stopped the store.
type StoreFailure = (RowError, Vector<RowError>);

// A bad date aborts the store, a bad amount only drops its row.
fn build_store(
    group: &StoreRows,
    gl_mapping: &GlMapping,
    bank_mapping: &BankMapping,
    layout: &ColumnLayout,
) -> Result<(IifDocument, Vector<RowError>), StoreFailure> {
    let (blocks, skipped) = group.rows.iter().try_fold(
        (Vector::<DepositBlock>::new(), Vector::<RowError>::new()),
        |(blocks, skipped), row| -> Result<_, StoreFailure> {
            let date = match parse_date(row) {
                Ok(date) => date,
                Err(err) => return Err((err, skipped)),
            };
            Ok(match build_block(row, date, gl_mapping, bank_mapping, layout) {
                Ok(block) => (blocks.push(block), skipped),
                Err(err) => {
                    warn!("skipping row: {}", err);
                    (blocks, skipped.push(err))
                }
            })
        },
    )?;
    Ok((IifDocument::from_blocks(group.store.clone(), blocks.iter()), skipped))
}

/// Builds one IIF document per store using explicit structural column names.
pub fn build_with_layout(
    rows: &[DepositRow],
    gl_mapping: &GlMapping,
    bank_mapping: &BankMapping,
    layout: &ColumnLayout,
) -> BuildOutput {
    debug!(
        "building from {} rows, {} gl mappings, {} bank mappings",
        rows.len(),
        gl_mapping.len(),
        bank_mapping.len()
    );
    let (groups, unassigned) = group_by_store(rows);

    groups.iter().fold(
        BuildOutput {
            skipped_rows: unassigned,
            ..BuildOutput::default()
        },
        |output, group| match build_store(group, gl_mapping, bank_mapping, layout) {
            Ok((document, skipped)) => {
                info!(
                    "store {:?}: {} of {} rows written",
                    group.store.value(),
                    document.block_count(),
                    group.rows.len()
                );
                let mut skipped_rows = output.skipped_rows;
                skipped_rows.append(skipped);
                BuildOutput {
                    documents: output.documents.push(document),
                    skipped_rows,
                    ..output
                }
            }
            Err((err, skipped)) => {
                warn!("store {:?} not written: {}", group.store.value(), err);
                let mut skipped_rows = output.skipped_rows;
                skipped_rows.append(skipped);
                BuildOutput {
                    failed_stores: output.failed_stores.push(err),
                    skipped_rows,
                    ..output
                }
            }
        },
    )
}

// public interface
pub fn build(rows: &[DepositRow], gl_mapping: &GlMapping, bank_mapping: &BankMapping) -> BuildOutput {
    build_with_layout(rows, gl_mapping, bank_mapping, &ColumnLayout::default())
}
