//! Per-row values computed from the raw counters.

use std::fmt;

use tracing::debug;

use crate::error::InvalidMeasurementError;
use crate::measurement::Table;

/// Efficiency below this value is [`EfficiencyBand::Good`].
pub const GOOD_BELOW: f64 = 50.0;
/// Efficiency above this value is [`EfficiencyBand::Bad`].
pub const BAD_ABOVE: f64 = 60.0;

/// Labels and physical/logical ratios, index-aligned with the source table.
#[derive(Debug, Clone, PartialEq)]
pub struct Derived {
    /// `"<read>/<write>"` per row.
    pub labels: Vec<String>,
    /// `TotalPhysicalIO / TotalLogicalIO * 100` per row.
    pub efficiency: Vec<f64>,
}

impl Derived {
    /// Number of rows covered.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether no rows are covered.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Band of every efficiency value, in row order.
    pub fn bands(&self) -> Vec<EfficiencyBand> {
        self.efficiency
            .iter()
            .copied()
            .map(EfficiencyBand::classify)
            .collect()
    }
}

/// Computes labels and efficiency for every row.
///
/// A row with `TotalLogicalIO = 0` fails with
/// [`InvalidMeasurementError::ZeroLogicalIo`]; no sentinel is substituted.
pub fn derive(table: &Table) -> Result<Derived, InvalidMeasurementError> {
    let mut labels = Vec::with_capacity(table.len());
    let mut efficiency = Vec::with_capacity(table.len());

    for (idx, row) in table.iter().enumerate() {
        let label = row.label();
        let ratio = efficiency_percent(row.total_physical_io, row.total_logical_io).ok_or_else(
            || InvalidMeasurementError::ZeroLogicalIo {
                row: idx + 1,
                label: label.clone(),
            },
        )?;
        if !ratio.is_finite() {
            return Err(InvalidMeasurementError::NonFinite {
                row: idx + 1,
                label,
                value: ratio,
            });
        }
        labels.push(label);
        efficiency.push(ratio);
    }

    debug!(rows = labels.len(), "derived labels and efficiency");
    Ok(Derived { labels, efficiency })
}

/// Physical share of logical I/O in percent, `None` when there was no logical I/O.
pub fn efficiency_percent(physical: u64, logical: u64) -> Option<f64> {
    if logical == 0 {
        return None;
    }
    Some(physical as f64 / logical as f64 * 100.0)
}

/// Colour class of an efficiency bar. Lower efficiency is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EfficiencyBand {
    /// Below 50%.
    Good,
    /// 50% to 60%, both inclusive.
    Warning,
    /// Above 60%.
    Bad,
}

impl EfficiencyBand {
    /// Classifies a percentage.
    pub fn classify(percent: f64) -> Self {
        if percent < GOOD_BELOW {
            EfficiencyBand::Good
        } else if percent <= BAD_ABOVE {
            EfficiencyBand::Warning
        } else {
            EfficiencyBand::Bad
        }
    }
}

impl fmt::Display for EfficiencyBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EfficiencyBand::Good => "good",
            EfficiencyBand::Warning => "warning",
            EfficiencyBand::Bad => "bad",
        };
        f.write_str(name)
    }
}
