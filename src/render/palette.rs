//! Colours and type sizes shared by every panel.

use plotters::style::RGBColor;

use crate::derive::EfficiencyBand;

pub const LOGICAL_READS: RGBColor = RGBColor(0x34, 0x98, 0xdb);
pub const PHYSICAL_READS: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
pub const LOGICAL_WRITES: RGBColor = RGBColor(0x2e, 0xcc, 0x71);
pub const PHYSICAL_WRITES: RGBColor = RGBColor(0xf3, 0x9c, 0x12);
pub const HIT_RATE: RGBColor = RGBColor(0x9b, 0x59, 0xb6);
pub const TOTAL_LOGICAL: RGBColor = RGBColor(0x34, 0x98, 0xdb);
pub const TOTAL_PHYSICAL: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);
pub const REFERENCE: RGBColor = RGBColor(0xff, 0x00, 0x00);

pub const BAND_GOOD: RGBColor = RGBColor(0x27, 0xae, 0x60);
pub const BAND_WARNING: RGBColor = RGBColor(0xe6, 0x7e, 0x22);
pub const BAND_BAD: RGBColor = RGBColor(0xe7, 0x4c, 0x3c);

pub const FONT: &str = "sans-serif";

// Sizes in points; scaled to pixels by the figure DPI.
pub const TITLE_PT: f64 = 16.0;
pub const SUBTITLE_PT: f64 = 13.0;
pub const PANEL_TITLE_PT: f64 = 12.0;
pub const AXIS_DESC_PT: f64 = 11.0;
pub const TICK_PT: f64 = 9.0;
pub const LEGEND_PT: f64 = 10.0;
pub const ANNOTATION_PT: f64 = 8.0;

/// Bar fill for an efficiency band.
pub fn band_color(band: EfficiencyBand) -> RGBColor {
    match band {
        EfficiencyBand::Good => BAND_GOOD,
        EfficiencyBand::Warning => BAND_WARNING,
        EfficiencyBand::Bad => BAND_BAD,
    }
}
