//! Bar-chart rendering for one month of the gold table.

use crate::aggregate::TrendRow;
use crate::month::Month;
use anyhow::{anyhow, Context, Result};
use plotters::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const CHART_WIDTH: u32 = 900;
const CHART_HEIGHT: u32 = 560;

/// Where the chart for `month` is written. The name is stable (`top10_` even
/// for other k) because the HTML index swaps images by month only.
pub fn chart_path(charts_dir: &Path, month: Month) -> PathBuf {
    charts_dir.join(format!("top10_{month}.png"))
}

/// Renders a horizontal bar chart of `rows` (already sorted descending by
/// points) into `charts_dir`. Bars are drawn bottom-up so the leading
/// constructor sits at the top.
pub fn render_month_chart(
    rows: &[&TrendRow],
    month: Month,
    k: usize,
    charts_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(charts_dir)
        .with_context(|| format!("creating charts directory {}", charts_dir.display()))?;
    let out = chart_path(charts_dir, month);

    // Ascending, so index 0 (the bottom row) holds the smallest bar.
    let mut bars: Vec<(String, f64)> = rows
        .iter()
        .map(|r| (r.constructor_name.clone(), r.points))
        .collect();
    bars.reverse();

    let max_points = bars.iter().map(|(_, p)| *p).fold(0.0_f64, f64::max).max(1.0);
    let names: Vec<String> = bars.iter().map(|(n, _)| n.clone()).collect();

    {
        let root = BitMapBackend::new(&out, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();
        root.fill(&WHITE)
            .map_err(|e| anyhow!("filling chart background: {e}"))?;

        let mut chart = ChartBuilder::on(&root)
            .caption(
                format!("Top {k} Constructors — {month}"),
                ("sans-serif", 28),
            )
            .margin(12)
            .x_label_area_size(44)
            .y_label_area_size(150)
            .build_cartesian_2d(
                0.0..max_points * 1.15,
                (0..bars.len() as i32).into_segmented(),
            )
            .map_err(|e| anyhow!("building chart axes: {e}"))?;

        chart
            .configure_mesh()
            .disable_y_mesh()
            .y_labels(bars.len())
            .y_label_formatter(&|seg: &SegmentValue<i32>| match seg {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => names
                    .get(*i as usize)
                    .cloned()
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            })
            .x_desc("Points in Month")
            .label_style(("sans-serif", 15))
            .draw()
            .map_err(|e| anyhow!("drawing chart mesh: {e}"))?;

        chart
            .draw_series(bars.iter().enumerate().map(|(i, (_, points))| {
                let mut bar = Rectangle::new(
                    [
                        (0.0, SegmentValue::Exact(i as i32)),
                        (*points, SegmentValue::Exact(i as i32 + 1)),
                    ],
                    BLUE.mix(0.7).filled(),
                );
                bar.set_margin(6, 6, 0, 0);
                bar
            }))
            .map_err(|e| anyhow!("drawing bars: {e}"))?;

        // Point totals at the end of each bar.
        chart
            .draw_series(bars.iter().enumerate().map(|(i, (_, points))| {
                Text::new(
                    format!("{points:.0}"),
                    (*points + max_points * 0.01, SegmentValue::CenterOf(i as i32)),
                    ("sans-serif", 15),
                )
            }))
            .map_err(|e| anyhow!("labelling bars: {e}"))?;

        root.present()
            .map_err(|e| anyhow!("writing {}: {e}", out.display()))?;
    }

    info!(chart = %out.display(), rows = rows.len(), "rendered month chart");
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_path_is_stable_per_month() {
        let dir = Path::new("reports/charts");
        assert_eq!(
            chart_path(dir, Month::new(2012, 8).unwrap()),
            dir.join("top10_2012-08.png")
        );
    }
}
