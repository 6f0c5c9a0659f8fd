//! Report configuration: file paths, experiment captions and figure geometry.
//!
//! Values are layered: built-in defaults, then an optional TOML file, then
//! explicit overrides (usually command-line flags).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Default measurement file, relative to the working directory.
pub const DEFAULT_INPUT: &str = "pf_stats_results.csv";
/// Default chart file, relative to the working directory.
pub const DEFAULT_OUTPUT: &str = "pf_layer_performance_graph.png";

/// Complete configuration of one report run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReportConfig {
    /// CSV file to read.
    pub input_path: PathBuf,
    /// PNG file to (over)write.
    pub output_path: PathBuf,
    /// How to treat a `TotalLogicalIO` that differs between rows.
    pub logical_io_check: LogicalIoCheck,
    /// Parameters of the experiment that produced the data.
    pub experiment: ExperimentParams,
    /// Raster geometry.
    pub figure: FigureParams,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            logical_io_check: LogicalIoCheck::Strict,
            experiment: ExperimentParams::default(),
            figure: FigureParams::default(),
        }
    }
}

/// Fixed parameters of the buffer-pool experiment. These are captions and
/// constants, never derived from the measurements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExperimentParams {
    /// Buffer pool capacity in pages.
    pub buffer_size: u32,
    /// Pages in the test file.
    pub total_pages: u32,
    /// Requests issued per workload.
    pub request_count: u64,
    /// Page replacement strategy of the pool.
    pub strategy: Strategy,
}

impl Default for ExperimentParams {
    fn default() -> Self {
        Self {
            buffer_size: 10,
            total_pages: 50,
            request_count: 1000,
            strategy: Strategy::Lru,
        }
    }
}

impl ExperimentParams {
    /// Figure title.
    pub fn title(&self) -> String {
        format!(
            "PF Layer Buffer Performance Analysis with {} Strategy",
            self.strategy
        )
    }

    /// Figure subtitle listing the experiment parameters.
    pub fn subtitle(&self) -> String {
        format!(
            "(Buffer Size: {} pages, Total Pages: {}, Requests: {})",
            self.buffer_size, self.total_pages, self.request_count
        )
    }
}

/// Output raster geometry, expressed the way print figures are.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FigureParams {
    /// Width in inches.
    pub width_in: f64,
    /// Height in inches.
    pub height_in: f64,
    /// Dots per inch.
    pub dpi: u32,
}

impl Default for FigureParams {
    fn default() -> Self {
        Self {
            width_in: 16.0,
            height_in: 10.0,
            dpi: 300,
        }
    }
}

impl FigureParams {
    /// Raster size in pixels.
    pub fn pixel_size(&self) -> (u32, u32) {
        let dpi = f64::from(self.dpi);
        (
            (self.width_in * dpi).round() as u32,
            (self.height_in * dpi).round() as u32,
        )
    }

    /// Pixels per typographic point.
    pub fn scale(&self) -> f64 {
        f64::from(self.dpi) / 72.0
    }
}

/// Page replacement strategy named in the title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strategy {
    /// Least recently used.
    #[serde(rename = "LRU", alias = "lru")]
    Lru,
    /// Most recently used.
    #[serde(rename = "MRU", alias = "mru")]
    Mru,
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strategy::Lru => f.write_str("LRU"),
            Strategy::Mru => f.write_str("MRU"),
        }
    }
}

/// Policy for the "TotalLogicalIO is constant across workloads" assumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogicalIoCheck {
    /// Fail the run when rows disagree.
    Strict,
    /// Log a warning and report the observed range instead.
    Warn,
}

/// Explicit values that take precedence over file and defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Replaces [`ReportConfig::input_path`].
    pub input_path: Option<PathBuf>,
    /// Replaces [`ReportConfig::output_path`].
    pub output_path: Option<PathBuf>,
    /// Replaces [`ExperimentParams::buffer_size`].
    pub buffer_size: Option<u32>,
    /// Replaces [`ExperimentParams::total_pages`].
    pub total_pages: Option<u32>,
    /// Replaces [`ExperimentParams::request_count`].
    pub request_count: Option<u64>,
    /// Replaces [`ExperimentParams::strategy`].
    pub strategy: Option<Strategy>,
    /// Replaces [`FigureParams::dpi`].
    pub dpi: Option<u32>,
    /// Replaces [`ReportConfig::logical_io_check`].
    pub logical_io_check: Option<LogicalIoCheck>,
}

impl ReportConfig {
    /// Loads defaults layered with a TOML file.
    ///
    /// An `explicit` path must exist. Without one, the per-user default file
    /// is read when present and ignored otherwise.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let config = match explicit {
            Some(path) => read_file(&path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => read_file(&path)?,
                _ => ReportConfig::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document; absent keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Serialises the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|source| ConfigError::Serialize { source })
    }

    /// Applies overrides, then re-validates.
    pub fn apply(&mut self, update: ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(path) = update.input_path {
            self.input_path = path;
        }
        if let Some(path) = update.output_path {
            self.output_path = path;
        }
        if let Some(buffer_size) = update.buffer_size {
            self.experiment.buffer_size = buffer_size;
        }
        if let Some(total_pages) = update.total_pages {
            self.experiment.total_pages = total_pages;
        }
        if let Some(request_count) = update.request_count {
            self.experiment.request_count = request_count;
        }
        if let Some(strategy) = update.strategy {
            self.experiment.strategy = strategy;
        }
        if let Some(dpi) = update.dpi {
            self.figure.dpi = dpi;
        }
        if let Some(check) = update.logical_io_check {
            self.logical_io_check = check;
        }
        self.validate()
    }

    /// Rejects values that cannot produce a meaningful report.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.experiment.request_count == 0 {
            return Err(ConfigError::Invalid("request_count must be positive".into()));
        }
        if self.figure.dpi == 0 {
            return Err(ConfigError::Invalid("figure.dpi must be positive".into()));
        }
        if !(self.figure.width_in > 0.0 && self.figure.height_in > 0.0) {
            return Err(ConfigError::Invalid(
                "figure.width_in and figure.height_in must be positive".into(),
            ));
        }
        if self.input_path.as_os_str().is_empty() || self.output_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("input and output paths must be set".into()));
        }
        Ok(())
    }
}

fn read_file(path: &Path) -> Result<ReportConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ReportConfig::from_toml_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(path = %path.display(), "loaded report config");
    Ok(config)
}

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read report config {path}: {source}")]
    Read {
        /// Config path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse report config {path}: {source}")]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
    /// The configuration could not be rendered as TOML.
    #[error("failed to serialize report config: {source}")]
    Serialize {
        /// Underlying TOML error.
        source: toml::ser::Error,
    },
    /// A value is out of range.
    #[error("invalid report config: {0}")]
    Invalid(String),
}

/// Per-user config location, e.g. `~/.config/bufreport/report.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("bufreport").join("report.toml"))
}
