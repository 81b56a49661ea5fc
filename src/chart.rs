use std::path::Path;

use plotters::prelude::*;
use plotters::style::FontTransform;

use crate::codec::Algorithm;
use crate::error::{Error, Result};
use crate::stats::UnitStats;


const SIZE: (u32, u32) = (1500, 1000);

/// Share of a unit's slot taken by its bars.
const GROUP_WIDTH: f64 = 0.8;

// matplotlib's default cycle
const COLORS: [RGBColor; 5] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
    RGBColor(148, 103, 189),
];


fn chart_error(err: impl std::fmt::Display) -> Error {
    Error::Chart(err.to_string())
}


/// Grouped bar chart: one group per row, one bar per algorithm, rows left to right.
pub fn render_png(path: &Path, title: &str, algorithms: &[Algorithm], rows: &[&UnitStats]) -> Result<()> {

    if rows.is_empty() || algorithms.is_empty() {
        return Err(Error::NothingToPlot);
    }

    // plotters' fallback font backend panics on the first piece of text
    if !cfg!(feature = "ttf") {
        return Err(Error::Chart("built without the `ttf` feature, chart text cannot be drawn".into()));
    }

    let y_max = rows.iter()
        .flat_map(|row| algorithms.iter().filter_map(|&a| row.ratio(a)))
        .fold(1.0_f64, f64::max) * 1.05;

    let root = BitMapBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{title} (Lower is Better)"), ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(180)
        .y_label_area_size(70)
        .build_cartesian_2d(-0.5_f64..(rows.len() as f64 - 0.5), 0.0_f64..y_max)
        .map_err(chart_error)?;

    let label_at = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        rows.get(i as usize).map(|row| row.label.clone()).unwrap_or_default()
    };

    chart.configure_mesh()
        .disable_x_mesh()
        .x_labels(rows.len())
        .x_label_formatter(&label_at)
        .x_label_style(("sans-serif", 12).into_font().transform(FontTransform::Rotate90))
        .y_desc("Compression Ratio")
        .draw()
        .map_err(chart_error)?;

    let bar_width = GROUP_WIDTH / algorithms.len() as f64;

    for (k, &algorithm) in algorithms.iter().enumerate() {

        let color = COLORS[k % COLORS.len()];

        let bars = rows.iter().enumerate().filter_map(|(i, row)| {
            let x0 = i as f64 - GROUP_WIDTH / 2.0 + k as f64 * bar_width;
            row.ratio(algorithm)
                .map(|ratio| Rectangle::new([(x0, 0.0), (x0 + bar_width, ratio)], color.filled()))
        });

        chart.draw_series(bars)
            .map_err(chart_error)?
            .label(algorithm.name())
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_error)?;

    root.present().map_err(chart_error)?;

    tracing::debug!(path = %path.display(), bars = rows.len() * algorithms.len(), "rendered chart");
    Ok(())
}
