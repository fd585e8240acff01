use plotters::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistogramError {
    #[error("failed to render histogram: {0}")]
    Render(String),
}

/// A vertical reference line, e.g. the median wait.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramMarker {
    pub label: String,
    pub years: f64,
    pub color: RGBColor,
}

pub fn write_histogram_png(
    output_path: &str,
    results: &[f64],
    markers: &[HistogramMarker],
) -> Result<(), HistogramError> {
    render_histogram_png(output_path, results, markers)
}

fn render_histogram_png(
    output_path: &str,
    results: &[f64],
    markers: &[HistogramMarker],
) -> Result<(), HistogramError> {
    if results.is_empty() {
        return Ok(());
    }

    let min_value = results.iter().cloned().fold(f64::INFINITY, f64::min);
    let max_value = results.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    let range = max_value - min_value;
    let square_root_of_n = (results.len() as f64).sqrt();
    let bin_width = if range < f64::EPSILON {
        1.0
    } else {
        range / square_root_of_n
    };
    let bucket_of = |value: f64| (value / bin_width).round() as i32;

    let mut counts: std::collections::BTreeMap<i32, usize> = std::collections::BTreeMap::new();
    for value in results {
        *counts.entry(bucket_of(*value)).or_insert(0usize) += 1;
    }
    let max_count = *counts.values().max().unwrap_or(&1);

    let root = BitMapBackend::new(output_path, (1000, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| HistogramError::Render(e.to_string()))?;

    let min_bucket = (*counts.keys().next().unwrap_or(&0)) - 1;
    let max_bucket = (*counts.keys().next_back().unwrap_or(&0)) + 1;
    let max_x = if range < f64::EPSILON {
        min_bucket + 2
    } else {
        max_bucket
    };
    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption("Visa Wait Simulation", ("sans-serif", 30))
        .x_label_area_size(55)
        .y_label_area_size(65)
        .build_cartesian_2d(min_bucket..max_x, 0..(max_count + 1))
        .map_err(|e| HistogramError::Render(e.to_string()))?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Wait in years")
        .y_desc("Trials")
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 22))
        .x_label_formatter(&|value| format!("{:.1}", *value as f64 * bin_width))
        .draw()
        .map_err(|e| HistogramError::Render(e.to_string()))?;

    let bar_color = RGBColor(59, 130, 246);
    let bar_style = ShapeStyle::from(&bar_color).filled();
    chart
        .draw_series(counts.iter().map(|(value, count)| {
            Rectangle::new([(*value, 0), (*value + 1, *count)], bar_style)
        }))
        .map_err(|e| HistogramError::Render(e.to_string()))?;

    for marker in markers {
        let x = bucket_of(marker.years);
        let color = marker.color;
        chart
            .draw_series(LineSeries::new(
                vec![(x, 0), (x, max_count + 1)],
                color.stroke_width(2),
            ))
            .map_err(|e| HistogramError::Render(e.to_string()))?
            .label(format!("{}: {:.1} years", marker.label, marker.years))
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    if !markers.is_empty() {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(("sans-serif", 18))
            .draw()
            .map_err(|e| HistogramError::Render(e.to_string()))?;
    }

    root.present()
        .map_err(|e| HistogramError::Render(e.to_string()))?;
    Ok(())
}
