//! Aggregate statistics printed after the chart is written.

use std::fmt;

use tracing::warn;

use crate::config::LogicalIoCheck;
use crate::error::SummaryError;
use crate::measurement::{Measurement, Table};

/// Smallest and largest value of a counter column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// Minimum over all rows.
    pub min: u64,
    /// Maximum over all rows.
    pub max: u64,
}

impl Span {
    fn of<F>(table: &Table, select: F) -> Option<Self>
    where
        F: Fn(&Measurement) -> u64,
    {
        table.iter().map(select).fold(None, |acc, value| match acc {
            None => Some(Span {
                min: value,
                max: value,
            }),
            Some(span) => Some(Span {
                min: span.min.min(value),
                max: span.max.max(value),
            }),
        })
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

/// A hit rate together with the workload it was observed at.
#[derive(Debug, Clone, PartialEq)]
pub struct HitRateAt {
    /// Hit rate in percent.
    pub hit_rate: f64,
    /// Workload label, e.g. `50/50`.
    pub label: String,
}

/// Statistics over a whole measurement table.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Arithmetic mean of `HitRate`.
    pub mean_hit_rate: f64,
    /// Highest hit rate; the first row wins ties.
    pub best: HitRateAt,
    /// Lowest hit rate; the first row wins ties.
    pub worst: HitRateAt,
    /// Range of `PhysicalReads`.
    pub physical_reads: Span,
    /// Range of `PhysicalWrites`.
    pub physical_writes: Span,
    /// `TotalLogicalIO` of the first row.
    pub total_logical_io: u64,
    /// Range of `TotalLogicalIO`; `min == max` when it is constant.
    pub logical_io: Span,
    /// Range of `TotalPhysicalIO`.
    pub physical_io: Span,
    /// `request_count - mean(TotalPhysicalIO)`, rounded half away from zero.
    pub io_saved: i64,
}

impl Summary {
    /// Computes the summary.
    ///
    /// `request_count` is the number of requests each workload issued.
    /// With [`LogicalIoCheck::Strict`] a `TotalLogicalIO` differing from the
    /// first row fails with [`SummaryError::InconsistentLogicalIo`].
    pub fn compute(
        table: &Table,
        request_count: u64,
        check: LogicalIoCheck,
    ) -> Result<Self, SummaryError> {
        let first = table.rows().first().ok_or(SummaryError::EmptyTable)?;
        let n = table.len() as f64;

        let mut best = first;
        let mut worst = first;
        let mut hit_rate_sum = 0.0;
        let mut physical_io_sum = 0.0;
        for row in table {
            hit_rate_sum += row.hit_rate;
            physical_io_sum += row.total_physical_io as f64;
            if row.hit_rate > best.hit_rate {
                best = row;
            }
            if row.hit_rate < worst.hit_rate {
                worst = row;
            }
        }

        let logical_io = Span::of(table, |m| m.total_logical_io).ok_or(SummaryError::EmptyTable)?;
        if logical_io.min != logical_io.max {
            let (idx, deviant) = table
                .iter()
                .enumerate()
                .find(|(_, m)| m.total_logical_io != first.total_logical_io)
                .ok_or(SummaryError::EmptyTable)?;
            match check {
                LogicalIoCheck::Strict => {
                    return Err(SummaryError::InconsistentLogicalIo {
                        row: idx + 1,
                        label: deviant.label(),
                        expected: first.total_logical_io,
                        found: deviant.total_logical_io,
                    });
                }
                LogicalIoCheck::Warn => {
                    warn!(
                        row = idx + 1,
                        expected = first.total_logical_io,
                        found = deviant.total_logical_io,
                        "TotalLogicalIO differs across workloads"
                    );
                }
            }
        }

        Ok(Summary {
            mean_hit_rate: hit_rate_sum / n,
            best: HitRateAt {
                hit_rate: best.hit_rate,
                label: best.label(),
            },
            worst: HitRateAt {
                hit_rate: worst.hit_rate,
                label: worst.label(),
            },
            physical_reads: Span::of(table, |m| m.physical_reads).ok_or(SummaryError::EmptyTable)?,
            physical_writes: Span::of(table, |m| m.physical_writes)
                .ok_or(SummaryError::EmptyTable)?,
            total_logical_io: first.total_logical_io,
            logical_io,
            physical_io: Span::of(table, |m| m.total_physical_io).ok_or(SummaryError::EmptyTable)?,
            io_saved: (request_count as f64 - physical_io_sum / n).round() as i64,
        })
    }

    /// Whether every row reported the same `TotalLogicalIO`.
    pub fn logical_io_is_constant(&self) -> bool {
        self.logical_io.min == self.logical_io.max
    }

    /// The eight report lines as `(key, value)` pairs, in print order.
    pub fn rows(&self) -> [(&'static str, String); 8] {
        let logical = if self.logical_io_is_constant() {
            format!("{} (constant across all workloads)", self.total_logical_io)
        } else {
            format!(
                "{} (varies across workloads: {})",
                self.total_logical_io, self.logical_io
            )
        };
        [
            ("Average Buffer Hit Rate", format!("{:.2}%", self.mean_hit_rate)),
            (
                "Best Hit Rate",
                format!("{:.2}% (at {})", self.best.hit_rate, self.best.label),
            ),
            (
                "Worst Hit Rate",
                format!("{:.2}% (at {})", self.worst.hit_rate, self.worst.label),
            ),
            ("Physical Reads Range", self.physical_reads.to_string()),
            ("Physical Writes Range", self.physical_writes.to_string()),
            ("Total Logical I/O", logical),
            ("Physical I/O Range", self.physical_io.to_string()),
            ("Avg. I/O Saved", format!("{} operations", self.io_saved)),
        ]
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self.rows() {
            writeln!(f, "{key}: {value}")?;
        }
        Ok(())
    }
}
