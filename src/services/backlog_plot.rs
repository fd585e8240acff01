use plotters::prelude::*;
use thiserror::Error;

use crate::domain::backlog::BacklogQueue;

#[derive(Error, Debug)]
pub enum BacklogPlotError {
    #[error("backlog queue is empty")]
    EmptyQueue,
    #[error("failed to render backlog plot: {0}")]
    Plot(String),
}

/// Bar chart of pending applicants per priority month; projected months are
/// drawn in a second colour.
pub fn write_backlog_plot_png(
    output_path: &str,
    queue: &BacklogQueue,
    title: &str,
) -> Result<(), BacklogPlotError> {
    if queue.is_empty() {
        return Err(BacklogPlotError::EmptyQueue);
    }
    render_plot_png(output_path, queue, title)
}

fn render_plot_png(
    output_path: &str,
    queue: &BacklogQueue,
    title: &str,
) -> Result<(), BacklogPlotError> {
    let buckets = queue.buckets();
    let max_pending = buckets
        .iter()
        .map(|bucket| bucket.pending_count)
        .fold(0.0_f64, f64::max);
    let max_y = (max_pending * 1.1).max(1.0);
    let max_x = buckets.len().max(1) as i32;

    let root = BitMapBackend::new(output_path, (1200, 600)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|e| BacklogPlotError::Plot(e.to_string()))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(title, ("sans-serif", 30))
        .x_label_area_size(55)
        .y_label_area_size(75)
        .build_cartesian_2d(0..max_x, 0.0..max_y)
        .map_err(|e| BacklogPlotError::Plot(e.to_string()))?;

    let label_count = buckets.len().clamp(1, 12);
    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc("Priority date")
        .y_desc("Applicants waiting")
        .label_style(("sans-serif", 18))
        .axis_desc_style(("sans-serif", 22))
        .x_labels(label_count)
        .x_label_formatter(&|index| {
            if *index < 0 {
                return String::new();
            }
            buckets
                .get(*index as usize)
                .map(|bucket| bucket.date.format("%Y-%m").to_string())
                .unwrap_or_default()
        })
        .y_label_formatter(&|value| format!("{value:.0}"))
        .draw()
        .map_err(|e| BacklogPlotError::Plot(e.to_string()))?;

    let visible_style = ShapeStyle::from(&RGBColor(255, 159, 0)).filled();
    let projected_style = ShapeStyle::from(&RGBColor(40, 167, 69)).filled();
    chart
        .draw_series(buckets.iter().enumerate().map(|(idx, bucket)| {
            let style = if bucket.is_projected() {
                projected_style
            } else {
                visible_style
            };
            Rectangle::new(
                [(idx as i32, 0.0), (idx as i32 + 1, bucket.pending_count)],
                style,
            )
        }))
        .map_err(|e| BacklogPlotError::Plot(e.to_string()))?;

    root.present()
        .map_err(|e| BacklogPlotError::Plot(e.to_string()))?;
    Ok(())
}
