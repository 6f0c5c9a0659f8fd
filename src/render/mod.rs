//! Chart rendering.
//!
//! A [`Figure`] owns everything that ends up in the image: captions, the
//! shared category axis and the five panels. It is built once from the table
//! and then drawn onto any plotters backend, so two figures built from the
//! same input compare equal.

mod palette;
mod panel;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::config::{ExperimentParams, FigureParams};
use crate::derive::{Derived, GOOD_BELOW};
use crate::error::RenderError;
use crate::measurement::Table;

pub use panel::{LegendCorner, Marker, Panel, PanelKind, ReferenceLine, Series};

const X_DESC: &str = "Read/Write Ratio (%)";
const OPERATIONS: &str = "Number of Operations";
const HIT_RATE_REFERENCE: f64 = 50.0;

/// The complete chart, independent of any drawing backend.
#[derive(Debug, Clone, PartialEq)]
pub struct Figure {
    /// First caption line.
    pub title: String,
    /// Second caption line with the experiment parameters.
    pub subtitle: String,
    /// X axis labels shared by every panel.
    pub categories: Vec<String>,
    /// Panels A to E in layout order.
    pub panels: Vec<Panel>,
    /// Raster geometry.
    pub geometry: FigureParams,
}

impl Figure {
    /// Assembles the five panels from the table and its derived columns.
    pub fn build(
        table: &Table,
        derived: &Derived,
        experiment: &ExperimentParams,
        geometry: &FigureParams,
    ) -> Result<Self, RenderError> {
        if table.is_empty() {
            return Err(RenderError::EmptyTable);
        }
        if derived.len() != table.len() || derived.efficiency.len() != table.len() {
            return Err(RenderError::MisalignedColumns {
                rows: table.len(),
                derived: derived.len(),
            });
        }

        let reads = Panel {
            title: "Read Operations: Logical vs Physical".into(),
            x_desc: X_DESC.into(),
            y_desc: OPERATIONS.into(),
            y_range: None,
            x_grid: false,
            kind: PanelKind::GroupedBars {
                series: [
                    Series::new(
                        "Logical Reads",
                        table.column(|m| m.logical_reads as f64),
                        palette::LOGICAL_READS,
                    ),
                    Series::new(
                        "Physical Reads",
                        table.column(|m| m.physical_reads as f64),
                        palette::PHYSICAL_READS,
                    ),
                ],
            },
        };

        let writes = Panel {
            title: "Write Operations: Logical vs Physical".into(),
            x_desc: X_DESC.into(),
            y_desc: OPERATIONS.into(),
            y_range: None,
            x_grid: false,
            kind: PanelKind::GroupedBars {
                series: [
                    Series::new(
                        "Logical Writes",
                        table.column(|m| m.logical_writes as f64),
                        palette::LOGICAL_WRITES,
                    ),
                    Series::new(
                        "Physical Writes",
                        table.column(|m| m.physical_writes as f64),
                        palette::PHYSICAL_WRITES,
                    ),
                ],
            },
        };

        let hit_rate = Panel {
            title: "Buffer Hit Rate Across Different Workload Mixtures".into(),
            x_desc: X_DESC.into(),
            y_desc: "Hit Rate (%)".into(),
            y_range: Some((0.0, 100.0)),
            x_grid: true,
            kind: PanelKind::AnnotatedArea {
                series: Series::new(
                    "Buffer Hit Rate",
                    table.column(|m| m.hit_rate),
                    palette::HIT_RATE,
                ),
                reference: ReferenceLine {
                    y: HIT_RATE_REFERENCE,
                    label: Some("50% Hit Rate".into()),
                    alpha: 0.5,
                },
            },
        };

        let totals = Panel {
            title: "Total I/O Operations Comparison".into(),
            x_desc: X_DESC.into(),
            y_desc: OPERATIONS.into(),
            y_range: None,
            x_grid: true,
            kind: PanelKind::Lines {
                series: [
                    (
                        Series::new(
                            "Total Logical I/O",
                            table.column(|m| m.total_logical_io as f64),
                            palette::TOTAL_LOGICAL,
                        ),
                        Marker::Square,
                    ),
                    (
                        Series::new(
                            "Total Physical I/O",
                            table.column(|m| m.total_physical_io as f64),
                            palette::TOTAL_PHYSICAL,
                        ),
                        Marker::Triangle,
                    ),
                ],
            },
        };

        let efficiency = Panel {
            title: "I/O Efficiency (Lower is Better)".into(),
            x_desc: X_DESC.into(),
            y_desc: "Physical I/O Ratio (%)".into(),
            y_range: None,
            x_grid: false,
            kind: PanelKind::BandedBars {
                values: derived.efficiency.clone(),
                bands: derived.bands(),
                reference: ReferenceLine {
                    y: GOOD_BELOW,
                    label: None,
                    alpha: 0.7,
                },
            },
        };

        Ok(Figure {
            title: experiment.title(),
            subtitle: experiment.subtitle(),
            categories: derived.labels.clone(),
            panels: vec![reads, writes, hit_rate, totals, efficiency],
            geometry: geometry.clone(),
        })
    }

    /// Draws the figure: captions on top, then a 3x2 grid whose middle row
    /// is a single full-width panel.
    pub fn draw<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<(), RenderError>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let scale = self.geometry.scale();
        let pt = |size: f64| (size * scale).round() as i32;

        root.fill(&WHITE).map_err(drawing)?;
        let body = root
            .titled(
                &self.title,
                (palette::FONT, pt(palette::TITLE_PT))
                    .into_font()
                    .style(FontStyle::Bold),
            )
            .map_err(drawing)?;
        let body = body
            .titled(
                &self.subtitle,
                (palette::FONT, pt(palette::SUBTITLE_PT))
                    .into_font()
                    .style(FontStyle::Bold),
            )
            .map_err(drawing)?;

        let rows = body.split_evenly((3, 1));
        let top = rows[0].split_evenly((1, 2));
        let bottom = rows[2].split_evenly((1, 2));
        let areas = [&top[0], &top[1], &rows[1], &bottom[0], &bottom[1]];

        for (panel, area) in self.panels.iter().zip(areas) {
            panel.draw(area, &self.categories, scale)?;
        }
        Ok(())
    }

    /// Renders to a PNG at `output`, replacing any existing file.
    ///
    /// The image is drawn into a temporary file next to `output` and renamed
    /// over it only after drawing succeeded, so a failed render leaves the
    /// previous file (or no file) in place.
    pub fn save_png(&self, output: &Path) -> Result<PathBuf, RenderError> {
        let dir = match output.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&dir)?;
        let staging = tempfile::Builder::new()
            .prefix(".bufreport-")
            .suffix(".png")
            .tempfile_in(&dir)?;
        let size = self.geometry.pixel_size();
        debug!(staging = %staging.path().display(), width = size.0, height = size.1, "drawing figure");

        {
            let root = BitMapBackend::new(staging.path(), size).into_drawing_area();
            self.draw(&root)?;
            root.present().map_err(drawing)?;
        }
        if let Some(permissions) = target_permissions(output)? {
            fs::set_permissions(staging.path(), permissions)?;
        }

        staging
            .persist(output)
            .map_err(|err| RenderError::Persist {
                path: output.to_path_buf(),
                source: err.error,
            })?;
        info!(path = %output.display(), width = size.0, height = size.1, "chart written");
        Ok(output.to_path_buf())
    }
}

/// Mode for the chart: that of the file being replaced, else `0644` for a
/// new file on unix. The staging file itself is created owner-only.
fn target_permissions(output: &Path) -> Result<Option<fs::Permissions>, RenderError> {
    match fs::metadata(output) {
        Ok(meta) => Ok(Some(meta.permissions())),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(err) => Err(RenderError::Io(err)),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

fn drawing<E: std::fmt::Display>(err: E) -> RenderError {
    RenderError::Drawing(err.to_string())
}
