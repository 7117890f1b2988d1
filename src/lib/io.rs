use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};

use ::serde::Deserialize;
use csv::{ByteRecord, StringRecord};
use im::{HashMap, Vector};
use log::{debug, warn};

use crate::errors::ConversionError;
use crate::iif::IifDocument;
use crate::types::{BankMapping, ColumnLayout, DepositRow, GlMapping, StoreName};

pub const DEPOSITS_TABLE: &str = "deposits";
pub const GL_MAPPING_TABLE: &str = "gl mapping";
pub const BANK_MAPPING_TABLE: &str = "bank mapping";

/// A row-set with named columns. Header names and cells are trimmed, and every record is padded to
/// the header width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: StringRecord,
    records: Vec<StringRecord>,
}

// Exports from the point-of-sale system are not always UTF-8; those fields are read as Latin-1.
fn decode(record: &ByteRecord) -> StringRecord {
    record
        .iter()
        .map(|field| match std::str::from_utf8(field) {
            Ok(text) => text.trim().to_string(),
            Err(_) => field
                .iter()
                .map(|&b| char::from(b))
                .collect::<String>()
                .trim()
                .to_string(),
        })
        .collect()
}

fn pad(mut record: StringRecord, width: usize) -> StringRecord {
    while record.len() < width {
        record.push_field("");
    }
    record
}

impl Table {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, ConversionError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers = decode(reader.byte_headers()?);
        let width = headers.len();
        let mut records = Vec::new();
        for record in reader.byte_records() {
            // fail if a record cannot be read, a partial table would silently lose deposits
            records.push(pad(decode(&record?), width));
        }

        Ok(Self { headers, records })
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConversionError> {
        let table = Self::from_reader(File::open(path.as_ref())?)?;
        debug!("read {} rows from {}", table.len(), path.as_ref().display());
        Ok(table)
    }

    /// Builds a table from rows already in memory, e.g. a parsed upload.
    pub fn from_rows<S: AsRef<str>>(headers: &[S], rows: &[Vec<S>]) -> Self {
        let headers: StringRecord = headers.iter().map(|h| h.as_ref().trim()).collect();
        let width = headers.len();
        let records = rows
            .iter()
            .map(|row| pad(row.iter().map(|cell| cell.as_ref().trim()).collect(), width))
            .collect();
        Self { headers, records }
    }

    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == column)
    }

    fn require(&self, table: &'static str, column: &str) -> Result<usize, ConversionError> {
        self.column_index(column)
            .ok_or_else(|| ConversionError::MissingColumn {
                table,
                column: column.to_string(),
            })
    }

    fn deserialize<'de, T: Deserialize<'de>>(&'de self) -> Result<Vec<T>, ConversionError> {
        let mut rows = Vec::with_capacity(self.records.len());
        for record in &self.records {
            rows.push(record.deserialize::<T>(Some(&self.headers))?);
        }
        Ok(rows)
    }
}

fn cell(record: &StringRecord, idx: usize) -> &str {
    record.get(idx).unwrap_or_default()
}

/// Splits a deposit export into rows. The store, date and tender columns must all be present;
/// the customer count column is optional.
pub fn deposit_rows(table: &Table, layout: &ColumnLayout) -> Result<Vec<DepositRow>, ConversionError> {
    let store = table.require(DEPOSITS_TABLE, &layout.store)?;
    let date = table.require(DEPOSITS_TABLE, &layout.date)?;
    let tenders = layout
        .tenders
        .iter()
        .map(|column| table.require(DEPOSITS_TABLE, column))
        .collect::<Result<Vec<_>, _>>()?;
    let customer_count = table.column_index(&layout.customer_count);
    let amount_columns: Vec<(usize, &str)> = table
        .headers
        .iter()
        .enumerate()
        .filter(|(_, name)| !name.is_empty() && !layout.is_structural(name))
        .collect();

    Ok(table
        .records
        .iter()
        .enumerate()
        .map(|(idx, record)| DepositRow {
            line: idx + 2,
            store: StoreName::new(cell(record, store)),
            date: cell(record, date).to_string(),
            tenders: std::array::from_fn(|i| cell(record, tenders[i]).to_string()),
            customer_count: customer_count.map(|i| cell(record, i).to_string()),
            amounts: amount_columns
                .iter()
                .map(|(i, name)| (name.to_string(), cell(record, *i).to_string()))
                .collect(),
        })
        .collect())
}

#[derive(Debug, Deserialize)]
struct GlMappingRowEntity {
    original_name: String,
    new_name: String,
}

#[derive(Debug, Deserialize)]
struct BankMappingRowEntity {
    new_col_name: String,
    store_name: String,
    mapped_col_name: String,
}

impl BankMappingRowEntity {
    fn into_domain(self) -> ((String, String), String) {
        ((self.new_col_name, self.store_name), self.mapped_col_name)
    }
}

fn require_all(table: &Table, name: &'static str, columns: &[&str]) -> Result<(), ConversionError> {
    columns
        .iter()
        .try_for_each(|column| table.require(name, column).map(|_| ()))
}

/// Reads `original_name,new_name` rows. Rows without an original name are ignored; when a name
/// repeats, the last row wins.
pub fn gl_mapping(table: &Table) -> Result<GlMapping, ConversionError> {
    require_all(table, GL_MAPPING_TABLE, &["original_name", "new_name"])?;
    let mapping = table
        .deserialize::<GlMappingRowEntity>()?
        .into_iter()
        .filter(|entity| !entity.original_name.is_empty())
        .fold(HashMap::new(), |acc, entity| {
            if acc.contains_key(&entity.original_name) {
                warn!("gl mapping for {:?} given more than once", entity.original_name);
            }
            acc.update(entity.original_name, entity.new_name)
        });
    Ok(GlMapping::new(mapping))
}

/// Reads `new_col_name,store_name,mapped_col_name` rows.
pub fn bank_mapping(table: &Table) -> Result<BankMapping, ConversionError> {
    require_all(
        table,
        BANK_MAPPING_TABLE,
        &["new_col_name", "store_name", "mapped_col_name"],
    )?;
    Ok(table
        .deserialize::<BankMappingRowEntity>()?
        .into_iter()
        .filter(|entity| !entity.new_col_name.is_empty() && !entity.store_name.is_empty())
        .map(BankMappingRowEntity::into_domain)
        .collect())
}

// Compared case-insensitively, some filesystems do not tell `A.iif` from `a.iif`.
fn check_file_names(documents: &Vector<IifDocument>) -> Result<(), ConversionError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    for document in documents {
        let file_name = document.file_name();
        if let Some(first) = seen.get(&file_name.to_lowercase()) {
            return Err(ConversionError::DuplicateFileName {
                file_name,
                first: first.to_string(),
                second: document.store().value().to_string(),
            });
        }
        seen.insert(file_name.to_lowercase(), document.store().value());
    }
    Ok(())
}

/// Writes each document as `<store>.iif` into `dir`, creating it when needed. Nothing is written
/// when two stores map to the same file name.
pub fn write_documents<P: AsRef<Path>>(
    dir: P,
    documents: &Vector<IifDocument>,
) -> Result<Vec<PathBuf>, ConversionError> {
    check_file_names(documents)?;
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(documents.len());
    for document in documents {
        let path = dir.join(document.file_name());
        fs::write(&path, document.as_bytes())?;
        written.push(path);
    }
    Ok(written)
}
