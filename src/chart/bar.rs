//! Bar charts for instant query results

use ratatui::{
    layout::{Direction, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Block, Borders},
};

use crate::chart::{format_value, ChartBuffer, ChartSpec, SERIES_COLORS};
use crate::series::{truncate_label, Series, BAR_LABEL_WIDTH};

/// Height units of the tallest bar; heights are integers in ratatui
const BAR_RESOLUTION: u64 = 1000;

const BAR_GAP: u16 = 1;

/// One bar: its (possibly truncated) label and the sample value it shows
#[derive(Debug, Clone, PartialEq)]
pub struct BarEntry {
    pub label: String,
    pub value: f64,
}

/// Latest value of every non-empty series with its bar label
pub fn bar_entries(series: &[Series]) -> Vec<BarEntry> {
    series
        .iter()
        .filter_map(|s| {
            s.latest().map(|sample| BarEntry {
                label: truncate_label(&s.label),
                value: sample.value,
            })
        })
        .collect()
}

/// Integer bar height relative to the largest positive value
///
/// Negative and non-finite values get no height.
fn bar_height(value: f64, max: f64) -> u64 {
    if !value.is_finite() || value <= 0.0 || max <= 0.0 {
        return 0;
    }
    ((value / max) * BAR_RESOLUTION as f64).round() as u64
}

/// Widest bars that still fit `count` of them side by side
fn bar_width(inner_width: u16, count: usize) -> u16 {
    let count = u16::try_from(count.max(1)).unwrap_or(u16::MAX);
    let gaps = BAR_GAP.saturating_mul(count - 1);
    (inner_width.saturating_sub(gaps) / count).max(1)
}

fn text_width(text: &str) -> u16 {
    u16::try_from(text.chars().count()).unwrap_or(u16::MAX)
}

/// How the bars are laid out inside the chart block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BarLayout {
    /// Bars stand side by side; value and label rows sit under each bar
    Vertical { bar_width: u16 },
    /// One bar per row; label on the left, value on the right
    Horizontal { label_width: u16, value_width: u16 },
}

/// Vertical when every label and value fits under its own bar, else horizontal
fn choose_layout(inner: Rect, labels: &[String], values: &[String]) -> BarLayout {
    let label_width = labels
        .iter()
        .map(|l| text_width(l))
        .max()
        .unwrap_or(0)
        .min(BAR_LABEL_WIDTH as u16);
    let value_width = values.iter().map(|v| text_width(v)).max().unwrap_or(0);

    // value row + label row + at least one row of bar
    let width = bar_width(inner.width, labels.len());
    if width >= label_width.max(value_width) && inner.height >= 3 {
        BarLayout::Vertical { bar_width: width }
    } else {
        BarLayout::Horizontal {
            label_width,
            value_width,
        }
    }
}

/// Draw one bar per series into a fresh buffer
///
/// Values and labels are written by hand rather than through ratatui's bar
/// text, so every bar shows its number even when it has no height.
pub(crate) fn draw(series: &[Series], spec: &ChartSpec) -> ChartBuffer {
    let entries = bar_entries(series);
    let max = entries
        .iter()
        .map(|e| e.value)
        .filter(|v| v.is_finite())
        .fold(0.0_f64, f64::max);
    let labels: Vec<String> = entries.iter().map(|e| e.label.clone()).collect();
    let values: Vec<String> = entries.iter().map(|e| format_value(e.value)).collect();

    let bars: Vec<Bar> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            Bar::default()
                .value(bar_height(entry.value, max))
                .text_value(String::new())
                .style(Style::default().fg(SERIES_COLORS[i % SERIES_COLORS.len()]))
        })
        .collect();

    let block = Block::default()
        .borders(Borders::ALL)
        .title(
            Line::from(Span::styled(
                spec.title.clone(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ))
            .centered(),
        )
        .title(Line::from(Span::styled("Value", Style::default().fg(Color::Gray))).left_aligned())
        .title_bottom(Line::from(Span::styled("Metrics", Style::default().fg(Color::Gray))).centered());

    let mut buffer = ChartBuffer::new(spec);
    let inner = block.inner(buffer.area());
    buffer.draw(block);

    let label_style = Style::default().fg(Color::Gray);
    let value_style = Style::default().add_modifier(Modifier::BOLD);

    match choose_layout(inner, &labels, &values) {
        BarLayout::Vertical { bar_width } => {
            let bars_area = Rect {
                height: inner.height.saturating_sub(2),
                ..inner
            };
            let value_row = inner.bottom().saturating_sub(2);
            let label_row = inner.bottom().saturating_sub(1);

            buffer.draw_in(
                bars_area,
                BarChart::default()
                    .bar_width(bar_width)
                    .bar_gap(BAR_GAP)
                    .data(BarGroup::default().bars(&bars))
                    .max(BAR_RESOLUTION),
            );

            for (i, (label, value)) in labels.iter().zip(&values).enumerate() {
                let x = inner.x + (bar_width + BAR_GAP).saturating_mul(i as u16);
                buffer.put_centered(x, value_row, bar_width, value, value_style);
                buffer.put_centered(x, label_row, bar_width, label, label_style);
            }
        }
        BarLayout::Horizontal {
            label_width,
            value_width,
        } => {
            let gap = if labels.len() * 2 <= usize::from(inner.height) + 1 {
                BAR_GAP
            } else {
                0
            };
            let bars_x = inner.x + label_width + 1;
            let bars_area = Rect {
                x: bars_x,
                width: inner
                    .width
                    .saturating_sub(label_width + 1)
                    .saturating_sub(value_width + 1),
                ..inner
            };

            buffer.draw_in(
                bars_area,
                BarChart::default()
                    .direction(Direction::Horizontal)
                    .bar_width(1)
                    .bar_gap(gap)
                    .data(BarGroup::default().bars(&bars))
                    .max(BAR_RESOLUTION),
            );

            for (i, (label, value)) in labels.iter().zip(&values).enumerate() {
                let y = inner.y + (1 + gap).saturating_mul(i as u16);
                if y >= inner.bottom() {
                    break;
                }
                buffer.put(inner.x, y, label_width, label, label_style);
                // right-aligned so digits line up
                let pad = value_width.saturating_sub(text_width(value));
                buffer.put(bars_area.right() + 1 + pad, y, value_width, value, value_style);
            }
        }
    }

    buffer
}
