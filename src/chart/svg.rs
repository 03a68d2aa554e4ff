//! Static SVG bar chart

use plotters::prelude::*;

use super::ChartData;
use crate::error::{CleanError, CleanResult};

pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_HEIGHT: u32 = 400;

const SERIES_COLORS: [RGBColor; 2] = [RGBColor(91, 155, 213), RGBColor(237, 125, 49)];

/// Share of each row slot covered by bars
const GROUP_WIDTH: f64 = 0.8;

fn draw_error(e: impl std::fmt::Display) -> CleanError {
    CleanError::Export(format!("Failed to render chart: {}", e))
}

/// Render grouped bars (one group per row, one bar per series) as an SVG document
pub fn render_svg(chart: &ChartData, width: u32, height: u32) -> CleanResult<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (width, height)).into_drawing_area();
        root.fill(&WHITE).map_err(draw_error)?;

        let rows = chart.row_count.max(1) as f64;
        let (lo, hi) = chart.value_range().unwrap_or((0.0, 1.0));
        let y_min = lo.min(0.0);
        let y_max = if hi.max(0.0) > y_min { hi.max(0.0) } else { y_min + 1.0 };

        let mut plot = ChartBuilder::on(&root)
            .margin(16)
            .build_cartesian_2d(0.0..rows, y_min..y_max)
            .map_err(draw_error)?;

        let bar_width = GROUP_WIDTH / chart.series.len().max(1) as f64;
        let offset = (1.0 - GROUP_WIDTH) / 2.0;

        for (idx, series) in chart.series.iter().enumerate() {
            let style = SERIES_COLORS[idx % SERIES_COLORS.len()].filled();
            let bars = series
                .values
                .iter()
                .enumerate()
                .filter_map(|(row, value)| {
                    let v = value.filter(|v| v.is_finite())?;
                    let x0 = row as f64 + offset + idx as f64 * bar_width;
                    Some(Rectangle::new(
                        [(x0, v.max(0.0)), (x0 + bar_width, v.min(0.0))],
                        style,
                    ))
                });
            plot.draw_series(bars).map_err(draw_error)?;
        }

        root.present().map_err(draw_error)?;
    }
    Ok(svg)
}
