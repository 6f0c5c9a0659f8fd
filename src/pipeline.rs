//! The linear load, derive, summarise, render sequence.

use std::path::PathBuf;

use tracing::info;

use crate::config::ReportConfig;
use crate::derive::{derive, Derived};
use crate::error::Result;
use crate::loader::load_table;
use crate::measurement::Table;
use crate::render::Figure;
use crate::summary::Summary;

/// Everything computed for one report, before anything is written.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    /// Loaded measurements.
    pub table: Table,
    /// Labels and efficiency ratios.
    pub derived: Derived,
    /// Chart contents.
    pub figure: Figure,
    /// Console statistics.
    pub summary: Summary,
}

/// A report whose chart has been written.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// The computed report.
    pub report: Report,
    /// Where the chart was written.
    pub image: PathBuf,
}

/// Runs the report pipeline for one configuration.
#[derive(Debug, Clone)]
pub struct ReportGenerator {
    config: ReportConfig,
}

impl ReportGenerator {
    /// Creates a generator for `config`.
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Effective configuration.
    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Loads the input and computes figure and summary without writing anything.
    pub fn prepare(&self) -> Result<Report> {
        let table = load_table(&self.config.input_path)?;
        let derived = derive(&table)?;
        let figure = Figure::build(
            &table,
            &derived,
            &self.config.experiment,
            &self.config.figure,
        )?;
        let summary = Summary::compute(
            &table,
            self.config.experiment.request_count,
            self.config.logical_io_check,
        )?;
        Ok(Report {
            table,
            derived,
            figure,
            summary,
        })
    }

    /// Full run: prepares the report, then writes the chart.
    pub fn run(&self) -> Result<RunOutcome> {
        let report = self.prepare()?;
        let image = report.figure.save_png(&self.config.output_path)?;
        info!(
            rows = report.table.len(),
            image = %image.display(),
            "report complete"
        );
        Ok(RunOutcome { report, image })
    }

    /// Loads and summarises the input; no image is produced.
    pub fn summarize(&self) -> Result<Summary> {
        let table = load_table(&self.config.input_path)?;
        derive(&table)?;
        let summary = Summary::compute(
            &table,
            self.config.experiment.request_count,
            self.config.logical_io_check,
        )?;
        Ok(summary)
    }
}
