//! Buffer-pool measurement reports.
//!
//! Reads a CSV of per-workload buffer counters, renders a five-panel PNG
//! chart and computes the summary statistics printed next to it.

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod derive;
pub mod error;
pub mod loader;
pub mod logging;
pub mod measurement;
pub mod pipeline;
pub mod render;
pub mod summary;

pub use config::{ConfigOverrides, LogicalIoCheck, ReportConfig, Strategy};
pub use error::{
    DataLoadError, InvalidMeasurementError, RenderError, ReportError, Result, SummaryError,
};
pub use measurement::{Measurement, Table};
pub use pipeline::{Report, ReportGenerator, RunOutcome};
pub use summary::Summary;
