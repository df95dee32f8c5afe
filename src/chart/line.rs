//! Line charts for range query results
//!
//! The x axis is the sample index rather than absolute time. Tick labels are
//! the wall-clock times of the first series' samples at evenly spaced indices.

use chrono::{DateTime, Local};
use ratatui::{
    layout::Constraint,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType},
};

use crate::chart::{format_value, ChartBuffer, ChartSpec, SERIES_COLORS};
use crate::series::Series;

/// Most tick labels placed on the time axis
pub const MAX_TICKS: usize = 8;

/// Placeholder for timestamps that cannot be shown as a clock time
const UNKNOWN_TIME: &str = "--:--:--";

/// One labelled position on the time axis
#[derive(Debug, Clone, PartialEq)]
pub struct TimeTick {
    pub index: usize,
    pub label: String,
}

/// Index distance between ticks for `count` samples
pub fn tick_step(count: usize) -> usize {
    count.div_ceil(MAX_TICKS).max(1)
}

/// Ticks at indices `0, step, 2*step, ...` labelled with local `HH:MM:SS`
pub fn time_ticks(timestamps: &[f64]) -> Vec<TimeTick> {
    let step = tick_step(timestamps.len());
    (0..timestamps.len())
        .step_by(step)
        .map(|index| TimeTick {
            index,
            label: clock_label(timestamps[index]),
        })
        .collect()
}

/// Local wall-clock time of a unix timestamp
pub fn clock_label(timestamp: f64) -> String {
    if !timestamp.is_finite() {
        return UNKNOWN_TIME.to_string();
    }
    let secs = timestamp.floor();
    let nanos = ((timestamp - secs) * 1e9) as u32;
    DateTime::from_timestamp(secs as i64, nanos)
        .map(|utc| utc.with_timezone(&Local).format("%H:%M:%S").to_string())
        .unwrap_or_else(|| UNKNOWN_TIME.to_string())
}

/// Draw every series as a polyline into a fresh buffer
pub(crate) fn draw(series: &[Series], spec: &ChartSpec) -> ChartBuffer {
    // (index, value) points; non-finite values leave a gap
    let points: Vec<Vec<(f64, f64)>> = series
        .iter()
        .map(|s| {
            s.samples()
                .iter()
                .enumerate()
                .filter(|(_, sample)| sample.value.is_finite())
                .map(|(i, sample)| (i as f64, sample.value))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = series
        .iter()
        .zip(&points)
        .enumerate()
        .map(|(i, (s, data))| {
            Dataset::default()
                .name(s.label.clone())
                .marker(Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
                .data(data)
        })
        .collect();

    let (x_max, x_labels) = x_axis_layout(series);
    let (y_min, y_max) = y_bounds(&points);
    let y_labels = vec![
        Span::raw(format_value(y_min)),
        Span::raw(format_value((y_min + y_max) / 2.0)),
        Span::raw(format_value(y_max)),
    ];

    let chart = Chart::new(datasets)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Line::from(Span::styled(
                    spec.title.clone(),
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                )).centered()),
        )
        .x_axis(
            Axis::default()
                .title("Time")
                .style(Style::default().fg(Color::Gray))
                .bounds([0.0, x_max])
                .labels(x_labels),
        )
        .y_axis(
            Axis::default()
                .title("Value")
                .style(Style::default().fg(Color::Gray))
                .bounds([y_min, y_max])
                .labels(y_labels),
        )
        .hidden_legend_constraints((Constraint::Ratio(1, 1), Constraint::Ratio(1, 1)));

    let mut buffer = ChartBuffer::new(spec);
    buffer.draw(chart);
    buffer
}

/// Upper x bound and the evenly spread axis labels
///
/// ratatui spaces labels evenly from the lower to the upper bound, so the
/// bound is chosen as a whole number of tick steps: label `k` then sits
/// exactly at index `k * step`. The final slot past the last tick is blank.
fn x_axis_layout(series: &[Series]) -> (f64, Vec<Span<'static>>) {
    let longest = series.iter().map(Series::len).max().unwrap_or(0);
    let ticks = series
        .first()
        .map(|s| time_ticks(&s.timestamps()))
        .unwrap_or_default();

    let step = match series.first() {
        Some(first) if !first.is_empty() => tick_step(first.len()),
        _ => tick_step(longest),
    };
    let slots = ticks.len().max(longest.div_ceil(step)).max(1);

    let labels = (0..=slots)
        .map(|slot| {
            ticks
                .get(slot)
                .map(|tick| Span::raw(tick.label.clone()))
                .unwrap_or_else(|| Span::raw(""))
        })
        .collect();

    ((slots * step) as f64, labels)
}

/// Value range over finite points, padded so flat lines stay visible
fn y_bounds(points: &[Vec<(f64, f64)>]) -> (f64, f64) {
    let (min, max) = points
        .iter()
        .flatten()
        .map(|&(_, v)| v)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });

    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    if min == max {
        return (min - 1.0, max + 1.0);
    }
    let margin = (max - min) * 0.05;
    (min - margin, max + margin)
}
