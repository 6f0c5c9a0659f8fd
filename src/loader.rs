//! Reads measurement CSV files into a [`Table`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::{debug, info};

use crate::error::DataLoadError;
use crate::measurement::{Measurement, Table, REQUIRED_COLUMNS};

/// Loads every row of `path`.
///
/// The header must name all of [`REQUIRED_COLUMNS`] (any order, exact case).
/// Loading is all-or-nothing: the first bad row aborts with
/// [`DataLoadError::Malformed`]. A header-only file yields an empty table.
pub fn load_table(path: impl AsRef<Path>) -> Result<Table, DataLoadError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DataLoadError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let table = read_table(file, path)?;
    info!(path = %path.display(), rows = table.len(), "loaded measurements");
    Ok(table)
}

/// Parses measurements from any reader; `origin` only labels errors.
pub fn read_table<R: Read>(reader: R, origin: &Path) -> Result<Table, DataLoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|source| DataLoadError::Csv {
            path: origin.to_path_buf(),
            source,
        })?
        .clone();
    check_columns(&headers, origin)?;
    debug!(columns = headers.len(), "measurement header accepted");

    let mut rows = Vec::new();
    for (idx, record) in reader.deserialize::<Measurement>().enumerate() {
        let row = record.map_err(|source| DataLoadError::Malformed {
            path: origin.to_path_buf(),
            row: idx + 1,
            source,
        })?;
        rows.push(row);
    }
    Ok(Table::new(rows))
}

fn check_columns(headers: &StringRecord, origin: &Path) -> Result<(), DataLoadError> {
    let missing: Vec<&'static str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|name| !headers.iter().any(|h| h == *name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(DataLoadError::MissingColumns {
            path: origin.to_path_buf(),
            columns: missing,
        })
    }
}
