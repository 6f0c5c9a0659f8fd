//! Measurement rows as produced by the buffer-pool statistics harness.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

/// Column names every measurement file must carry, in canonical order.
pub const REQUIRED_COLUMNS: [&str; 9] = [
    "ReadPercent",
    "WritePercent",
    "LogicalReads",
    "PhysicalReads",
    "LogicalWrites",
    "PhysicalWrites",
    "HitRate",
    "TotalLogicalIO",
    "TotalPhysicalIO",
];

/// Buffer-pool counters for one workload mixture.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Measurement {
    /// Share of read requests in the workload.
    pub read_percent: u32,
    /// Share of write requests in the workload.
    pub write_percent: u32,
    /// Read requests issued to the buffer layer.
    pub logical_reads: u64,
    /// Reads that reached the backing file.
    pub physical_reads: u64,
    /// Write requests issued to the buffer layer.
    pub logical_writes: u64,
    /// Writes that reached the backing file.
    pub physical_writes: u64,
    /// Percentage of logical accesses served from the pool.
    #[serde(deserialize_with = "finite")]
    pub hit_rate: f64,
    /// All logical accesses.
    #[serde(rename = "TotalLogicalIO")]
    pub total_logical_io: u64,
    /// All physical accesses.
    #[serde(rename = "TotalPhysicalIO")]
    pub total_physical_io: u64,
}

impl Measurement {
    /// Display label of the workload mixture, e.g. `70/30`.
    pub fn label(&self) -> String {
        workload_label(self.read_percent, self.write_percent)
    }
}

fn finite<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(D::Error::custom(format!("expected a finite number, got {value}")))
    }
}

/// Formats a read/write mixture as `<read>/<write>`.
pub fn workload_label(read_percent: u32, write_percent: u32) -> String {
    format!("{read_percent}/{write_percent}")
}

/// Ordered measurement rows. Row order fixes the x-axis order of every panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Measurement>,
}

impl Table {
    /// Wraps rows, keeping their order.
    pub fn new(rows: Vec<Measurement>) -> Self {
        Self { rows }
    }

    /// Rows in source order.
    pub fn rows(&self) -> &[Measurement] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterator over rows in source order.
    pub fn iter(&self) -> std::slice::Iter<'_, Measurement> {
        self.rows.iter()
    }

    /// Projects one numeric column as `f64` values, in row order.
    pub fn column<F>(&self, select: F) -> Vec<f64>
    where
        F: Fn(&Measurement) -> f64,
    {
        self.rows.iter().map(select).collect()
    }
}

impl FromIterator<Measurement> for Table {
    fn from_iter<I: IntoIterator<Item = Measurement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Measurement;
    type IntoIter = std::slice::Iter<'a, Measurement>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
