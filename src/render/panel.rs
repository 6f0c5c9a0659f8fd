//! Panel data and drawing.

use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use tracing::debug;

use crate::derive::EfficiencyBand;
use crate::error::RenderError;

use super::{drawing, palette};

const GROUPED_BAR_WIDTH: f64 = 0.35;
const SINGLE_BAR_WIDTH: f64 = 0.8;
const HEADROOM: f64 = 1.15;
// Extra room under the top edge for the legend box.
const LEGEND_HEADROOM: f64 = 1.3;

/// Point marker drawn on line series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Filled circle.
    Circle,
    /// Filled square.
    Square,
    /// Filled upward triangle.
    Triangle,
}

/// Where a panel's legend box sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendCorner {
    /// Top left of the plotting area.
    UpperLeft,
    /// Top right of the plotting area.
    UpperRight,
}

/// One named value per category.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Legend text.
    pub name: String,
    /// Values in category order.
    pub values: Vec<f64>,
    /// Stroke/fill colour.
    pub color: RGBColor,
}

impl Series {
    pub(crate) fn new(name: &str, values: Vec<f64>, color: RGBColor) -> Self {
        Self {
            name: name.to_string(),
            values,
            color,
        }
    }
}

/// Horizontal dashed line at a fixed y value.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceLine {
    /// Y value.
    pub y: f64,
    /// Legend text, if the line appears in the legend.
    pub label: Option<String>,
    /// Opacity of the line.
    pub alpha: f64,
}

/// What a panel plots.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelKind {
    /// Two bars side by side per category, with a legend.
    GroupedBars {
        /// Left and right series.
        series: [Series; 2],
    },
    /// A marked line over a filled area, each point annotated.
    AnnotatedArea {
        /// The plotted series.
        series: Series,
        /// Reference threshold.
        reference: ReferenceLine,
    },
    /// Two marked lines with a legend.
    Lines {
        /// Both series with their markers.
        series: [(Series, Marker); 2],
    },
    /// One bar per category coloured by band, each bar annotated.
    BandedBars {
        /// Bar heights.
        values: Vec<f64>,
        /// Band of each bar.
        bands: Vec<EfficiencyBand>,
        /// Reference threshold.
        reference: ReferenceLine,
    },
}

/// A single chart of the figure.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    /// Caption above the chart.
    pub title: String,
    /// X axis description.
    pub x_desc: String,
    /// Y axis description.
    pub y_desc: String,
    /// Fixed y range; derived from the data when `None`.
    pub y_range: Option<(f64, f64)>,
    /// Whether vertical grid lines are drawn.
    pub x_grid: bool,
    /// Plotted data.
    pub kind: PanelKind,
}

impl Panel {
    /// Y axis range: fixed, or zero to the largest plotted value plus headroom.
    pub fn y_bounds(&self) -> (f64, f64) {
        if let Some(range) = self.y_range {
            return range;
        }
        let (peak, reference) = match &self.kind {
            PanelKind::GroupedBars { series } => (max_of(series.iter()), None),
            PanelKind::AnnotatedArea { series, reference } => {
                (max_of(std::iter::once(series)), Some(reference.y))
            }
            PanelKind::Lines { series } => (max_of(series.iter().map(|(s, _)| s)), None),
            PanelKind::BandedBars {
                values, reference, ..
            } => (values.iter().copied().fold(0.0, f64::max), Some(reference.y)),
        };
        let headroom = match self.kind {
            PanelKind::GroupedBars { .. } | PanelKind::Lines { .. } => LEGEND_HEADROOM,
            _ => HEADROOM,
        };
        let top = peak.max(reference.unwrap_or(0.0)) * headroom;
        (0.0, if top > 0.0 { top } else { 1.0 })
    }

    /// Largest plotted value at each category.
    fn category_peaks(&self) -> Vec<f64> {
        let columns: Vec<&[f64]> = match &self.kind {
            PanelKind::GroupedBars { series } => series.iter().map(|s| s.values.as_slice()).collect(),
            PanelKind::AnnotatedArea { series, .. } => vec![series.values.as_slice()],
            PanelKind::Lines { series } => series.iter().map(|(s, _)| s.values.as_slice()).collect(),
            PanelKind::BandedBars { values, .. } => vec![values.as_slice()],
        };
        let n = columns.iter().map(|c| c.len()).max().unwrap_or(0);
        (0..n)
            .map(|i| {
                columns
                    .iter()
                    .filter_map(|c| c.get(i).copied())
                    .fold(0.0, f64::max)
            })
            .collect()
    }

    /// Upper corner over the lower half of the data.
    pub fn legend_corner(&self) -> LegendCorner {
        let peaks = self.category_peaks();
        let half = peaks.len() / 2;
        let left = peaks[..half].iter().copied().fold(0.0, f64::max);
        let right = peaks[peaks.len() - half..].iter().copied().fold(0.0, f64::max);
        if right > left {
            LegendCorner::UpperLeft
        } else {
            LegendCorner::UpperRight
        }
    }

    pub(crate) fn draw<DB>(
        &self,
        area: &DrawingArea<DB, Shift>,
        categories: &[String],
        scale: f64,
    ) -> Result<(), RenderError>
    where
        DB: DrawingBackend,
        DB::ErrorType: 'static,
    {
        let n = categories.len();
        let px = |pt: f64| (pt * scale).round() as i32;
        let size = |pt: f64| (pt * scale).round() as u32;
        let stroke = |pt: f64| ((pt * scale).round() as u32).max(1);
        let glyph = px(14.0);
        let (y_min, y_max) = self.y_bounds();
        let x_min = -0.5;
        let x_max = n as f64 - 0.5;

        let mut chart = ChartBuilder::on(area)
            .caption(
                &self.title,
                (palette::FONT, px(palette::PANEL_TITLE_PT))
                    .into_font()
                    .style(FontStyle::Bold),
            )
            .margin(size(10.0))
            .x_label_area_size(size(56.0))
            .y_label_area_size(size(48.0))
            .build_cartesian_2d(x_min..x_max, y_min..y_max)
            .map_err(drawing)?;

        let label_at = |x: &f64| category_label(categories, *x);
        let tick_font = (palette::FONT, px(palette::TICK_PT)).into_font();
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(self.x_desc.as_str())
            .y_desc(self.y_desc.as_str())
            .x_labels(n)
            .x_label_formatter(&label_at)
            .x_label_style(tick_font.clone().transform(FontTransform::Rotate90))
            .y_label_style(tick_font)
            .axis_desc_style(
                (palette::FONT, px(palette::AXIS_DESC_PT))
                    .into_font()
                    .style(FontStyle::Bold),
            )
            .light_line_style(TRANSPARENT)
            .bold_line_style(BLACK.mix(0.15).stroke_width(stroke(0.8)));
        if !self.x_grid {
            mesh.disable_x_mesh();
        }
        mesh.draw().map_err(drawing)?;

        let has_legend = match &self.kind {
            PanelKind::GroupedBars { series } => {
                for (side, s) in [-1.0, 1.0].into_iter().zip(series.iter()) {
                    let offset = side * GROUPED_BAR_WIDTH / 2.0;
                    let color = s.color;
                    let swatch = px(5.0);
                    chart
                        .draw_series(s.values.iter().enumerate().map(|(i, v)| {
                            let center = i as f64 + offset;
                            Rectangle::new(
                                [
                                    (center - GROUPED_BAR_WIDTH / 2.0, 0.0),
                                    (center + GROUPED_BAR_WIDTH / 2.0, *v),
                                ],
                                color.mix(0.9).filled(),
                            )
                        }))
                        .map_err(drawing)?
                        .label(s.name.as_str())
                        .legend(move |(x, y)| {
                            Rectangle::new([(x, y - swatch), (x + 2 * swatch, y + swatch)], color.filled())
                        });
                }
                true
            }
            PanelKind::AnnotatedArea { series, reference } => {
                let color = series.color;
                let points = points_of(&series.values);
                let width = stroke(3.0);
                chart
                    .draw_series(
                        AreaSeries::new(points.clone(), 0.0, color.mix(0.3))
                            .border_style(color.stroke_width(width)),
                    )
                    .map_err(drawing)?
                    .label(series.name.as_str())
                    .legend(move |(x, y)| {
                        PathElement::new(vec![(x, y), (x + glyph, y)], color.stroke_width(width))
                    });
                draw_markers(&mut chart, &points, Marker::Circle, color, stroke(5.0))?;
                draw_reference(&mut chart, reference, (x_min, x_max), stroke(1.5), glyph)?;
                let font = annotation_font(px(palette::ANNOTATION_PT));
                let lift = px(10.0);
                chart
                    .draw_series(points.iter().map(|&(x, y)| {
                        EmptyElement::at((x, y))
                            + Text::new(format!("{y:.1}%"), (0, -lift), font.clone())
                    }))
                    .map_err(drawing)?;
                true
            }
            PanelKind::Lines { series } => {
                for (s, marker) in series {
                    let color = s.color;
                    let width = stroke(2.5);
                    let points = points_of(&s.values);
                    chart
                        .draw_series(LineSeries::new(points.clone(), color.stroke_width(width)))
                        .map_err(drawing)?
                        .label(s.name.as_str())
                        .legend(move |(x, y)| {
                            PathElement::new(vec![(x, y), (x + glyph, y)], color.stroke_width(width))
                        });
                    draw_markers(&mut chart, &points, *marker, color, stroke(4.0))?;
                }
                true
            }
            PanelKind::BandedBars {
                values,
                bands,
                reference,
            } => {
                let half = SINGLE_BAR_WIDTH / 2.0;
                chart
                    .draw_series(values.iter().zip(bands.iter()).enumerate().map(
                        |(i, (v, band))| {
                            let x = i as f64;
                            Rectangle::new(
                                [(x - half, 0.0), (x + half, *v)],
                                palette::band_color(*band).mix(0.8).filled(),
                            )
                        },
                    ))
                    .map_err(drawing)?;
                let edge = stroke(1.5);
                chart
                    .draw_series(values.iter().enumerate().map(|(i, v)| {
                        let x = i as f64;
                        Rectangle::new([(x - half, 0.0), (x + half, *v)], BLACK.stroke_width(edge))
                    }))
                    .map_err(drawing)?;
                draw_reference(&mut chart, reference, (x_min, x_max), stroke(2.0), glyph)?;
                let font = annotation_font(px(palette::ANNOTATION_PT));
                let lift = px(3.0);
                chart
                    .draw_series(values.iter().enumerate().map(|(i, v)| {
                        EmptyElement::at((i as f64, *v))
                            + Text::new(format!("{v:.1}%"), (0, -lift), font.clone())
                    }))
                    .map_err(drawing)?;
                reference.label.is_some()
            }
        };

        if has_legend {
            chart
                .configure_series_labels()
                .position(match self.legend_corner() {
                    LegendCorner::UpperLeft => SeriesLabelPosition::UpperLeft,
                    LegendCorner::UpperRight => SeriesLabelPosition::UpperRight,
                })
                .label_font((palette::FONT, px(palette::LEGEND_PT)))
                .background_style(WHITE.mix(0.85))
                .border_style(BLACK.mix(0.3))
                .draw()
                .map_err(drawing)?;
        }
        debug!(title = %self.title, categories = n, "drew panel");
        Ok(())
    }
}

type PanelChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

fn draw_reference<DB>(
    chart: &mut PanelChart<'_, DB>,
    reference: &ReferenceLine,
    (x_min, x_max): (f64, f64),
    width: u32,
    glyph: i32,
) -> Result<(), RenderError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let style = palette::REFERENCE.mix(reference.alpha).stroke_width(width);
    let anno = chart
        .draw_series(dashes(x_min, x_max).map(|(a, b)| {
            PathElement::new(vec![(a, reference.y), (b, reference.y)], style)
        }))
        .map_err(drawing)?;
    if let Some(label) = &reference.label {
        anno.label(label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + glyph, y)], style));
    }
    Ok(())
}

fn draw_markers<DB>(
    chart: &mut PanelChart<'_, DB>,
    points: &[(f64, f64)],
    marker: Marker,
    color: RGBColor,
    size: u32,
) -> Result<(), RenderError>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let style = color.filled();
    let drawn = match marker {
        Marker::Circle => chart
            .draw_series(points.iter().map(|p| Circle::new(*p, size, style)))
            .map(|_| ()),
        Marker::Square => {
            let half = size as i32;
            chart
                .draw_series(points.iter().map(|p| {
                    EmptyElement::at(*p) + Rectangle::new([(-half, -half), (half, half)], style)
                }))
                .map(|_| ())
        }
        Marker::Triangle => chart
            .draw_series(points.iter().map(|p| TriangleMarker::new(*p, size as i32, style)))
            .map(|_| ()),
    };
    drawn.map_err(drawing)
}

fn annotation_font(size: i32) -> TextStyle<'static> {
    TextStyle::from(
        (palette::FONT, size)
            .into_font()
            .style(FontStyle::Bold),
    )
    .pos(Pos::new(HPos::Center, VPos::Bottom))
}

/// Category label for an axis position; empty between categories.
pub(crate) fn category_label(categories: &[String], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    categories.get(idx as usize).cloned().unwrap_or_default()
}

/// Splits `[from, to]` into dash segments.
pub(crate) fn dashes(from: f64, to: f64) -> impl Iterator<Item = (f64, f64)> {
    const SEGMENTS: usize = 48;
    let step = (to - from) / SEGMENTS as f64;
    (0..SEGMENTS)
        .step_by(2)
        .map(move |i| (from + i as f64 * step, from + (i + 1) as f64 * step))
}

fn points_of(values: &[f64]) -> Vec<(f64, f64)> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| (i as f64, *v))
        .collect()
}

fn max_of<'a>(series: impl Iterator<Item = &'a Series>) -> f64 {
    series
        .flat_map(|s| s.values.iter().copied())
        .fold(0.0, f64::max)
}
