//! Error taxonomy of the report pipeline.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Result alias used by the report pipeline.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Top-level failure of a report run. Every variant is terminal.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The measurement file could not be loaded.
    #[error(transparent)]
    DataLoad(#[from] DataLoadError),
    /// A derived value could not be computed for some row.
    #[error(transparent)]
    InvalidMeasurement(#[from] InvalidMeasurementError),
    /// The chart could not be drawn or written.
    #[error(transparent)]
    Render(#[from] RenderError),
    /// Summary statistics could not be computed.
    #[error(transparent)]
    Summary(#[from] SummaryError),
    /// Configuration could not be loaded or is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors raised while reading the measurement CSV.
#[derive(Debug, Error)]
pub enum DataLoadError {
    /// The input file could not be opened.
    #[error("failed to open measurements {path}: {source}")]
    Open {
        /// Input path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// The CSV header could not be read.
    #[error("failed to read CSV header of {path}: {source}")]
    Csv {
        /// Input path.
        path: PathBuf,
        /// Underlying CSV error.
        source: csv::Error,
    },
    /// One or more required columns are absent from the header.
    #[error("{path} is missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        /// Input path.
        path: PathBuf,
        /// Names of the absent columns, in canonical order.
        columns: Vec<&'static str>,
    },
    /// A data row could not be parsed.
    #[error("malformed row {row} in {path}: {source}")]
    Malformed {
        /// Input path.
        path: PathBuf,
        /// 1-based data row number (the header is not counted).
        row: usize,
        /// Underlying CSV error.
        source: csv::Error,
    },
}

/// Errors raised while deriving labels and efficiency ratios.
#[derive(Debug, Error, PartialEq)]
pub enum InvalidMeasurementError {
    /// `TotalLogicalIO` is zero so the efficiency ratio is undefined.
    #[error("row {row} ({label}) has TotalLogicalIO = 0; efficiency is undefined")]
    ZeroLogicalIo {
        /// 1-based data row number.
        row: usize,
        /// Workload label of the row.
        label: String,
    },
    /// A derived value came out as NaN or infinite.
    #[error("row {row} ({label}) produced a non-finite efficiency ({value})")]
    NonFinite {
        /// 1-based data row number.
        row: usize,
        /// Workload label of the row.
        label: String,
        /// The offending value.
        value: f64,
    },
}

/// Errors raised while drawing or persisting the chart.
#[derive(Debug, Error)]
pub enum RenderError {
    /// There are no rows, hence no categories to plot.
    #[error("cannot render an empty measurement table")]
    EmptyTable,
    /// The derived columns do not line up with the table.
    #[error("derived columns cover {derived} rows but the table has {rows}")]
    MisalignedColumns {
        /// Rows in the table.
        rows: usize,
        /// Rows covered by the derived columns.
        derived: usize,
    },
    /// The drawing backend reported an error.
    #[error("drawing failed: {0}")]
    Drawing(String),
    /// The rendered image could not be moved into place.
    #[error("failed to write chart to {path}: {source}")]
    Persist {
        /// Final output path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Generic I/O error (temporary file creation and similar).
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors raised while computing summary statistics.
#[derive(Debug, Error, PartialEq)]
pub enum SummaryError {
    /// No rows to aggregate.
    #[error("cannot summarise an empty measurement table")]
    EmptyTable,
    /// `TotalLogicalIO` differs between workloads.
    #[error(
        "TotalLogicalIO is not constant: row {row} ({label}) has {found}, first row has {expected}"
    )]
    InconsistentLogicalIo {
        /// 1-based data row number of the first deviating row.
        row: usize,
        /// Workload label of that row.
        label: String,
        /// Value of the first row.
        expected: u64,
        /// Value found in the deviating row.
        found: u64,
    },
}
