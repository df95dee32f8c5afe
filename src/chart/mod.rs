//! Terminal charts for query results
//!
//! Range results become line charts and instant results become bar charts.
//! Every render call starts from an empty [`ChartBuffer`] sized by its
//! [`ChartSpec`] and hands that buffer back to the caller, so nothing drawn in
//! one refresh can leak into the next.

pub mod bar;
pub mod buffer;
pub mod line;

use ratatui::style::Color;
use std::io::Write;

use crate::error::{Error, Result};
use crate::series::QueryResult;

pub use buffer::ChartBuffer;

/// Notice printed instead of a chart when a query matched nothing
pub const NO_DATA: &str = "No data returned from query";

/// Colors assigned to series in order, wrapping around
pub const SERIES_COLORS: [Color; 8] = [
    Color::Cyan,
    Color::Yellow,
    Color::Green,
    Color::Magenta,
    Color::LightRed,
    Color::LightBlue,
    Color::LightGreen,
    Color::White,
];

/// Which chart a spec describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Line,
    Bar,
}

/// Size, title and kind of one chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartSpec {
    width: u16,
    height: u16,
    pub title: String,
    pub kind: ChartKind,
}

impl ChartSpec {
    /// Create a spec; both dimensions are terminal cells and must be positive
    pub fn new(width: u16, height: u16, title: impl Into<String>, kind: ChartKind) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::Render(format!(
                "chart size must be positive, got {}x{}",
                width, height
            )));
        }
        Ok(Self {
            width,
            height,
            title: title.into(),
            kind,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }
}

/// What one render call produced
#[derive(Debug, Clone)]
pub enum Rendered {
    /// A drawn chart
    Chart(ChartBuffer),
    /// A message shown instead of a chart (query error or no data)
    Notice(String),
}

impl Rendered {
    pub fn is_chart(&self) -> bool {
        matches!(self, Self::Chart(_))
    }

    /// Write the chart or notice to `out`
    ///
    /// With `styled` set, colors are emitted and the cursor is hidden while
    /// the chart is written, then shown again.
    pub fn write_to<W: Write>(&self, out: &mut W, styled: bool) -> Result<()> {
        match self {
            Self::Chart(buffer) => buffer.write_to(out, styled),
            Self::Notice(message) => {
                writeln!(out, "{}", message)?;
                out.flush()?;
                Ok(())
            }
        }
    }
}

/// Render `result` with the chart kind named by `spec`
pub fn render(result: &QueryResult, spec: &ChartSpec) -> Result<Rendered> {
    match spec.kind {
        ChartKind::Line => render_line(result, spec),
        ChartKind::Bar => render_bar(result, spec),
    }
}

/// Draw one polyline per series of a range result
pub fn render_line(result: &QueryResult, spec: &ChartSpec) -> Result<Rendered> {
    if let Some(notice) = notice_for(result) {
        return Ok(Rendered::Notice(notice));
    }
    Ok(Rendered::Chart(line::draw(&result.series, spec)))
}

/// Draw one bar per series of an instant result
pub fn render_bar(result: &QueryResult, spec: &ChartSpec) -> Result<Rendered> {
    if let Some(notice) = notice_for(result) {
        return Ok(Rendered::Notice(notice));
    }
    Ok(Rendered::Chart(bar::draw(&result.series, spec)))
}

/// Message to show instead of a chart, if any
fn notice_for(result: &QueryResult) -> Option<String> {
    if result.is_error() {
        let message = result.error.as_deref().unwrap_or("Unknown error");
        return Some(format!("Error: {}", message));
    }
    if result.series.iter().all(|s| s.is_empty()) {
        return Some(NO_DATA.to_string());
    }
    None
}

/// Format a sample value for axis and bar labels
pub fn format_value(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let abs = value.abs();
    if value.fract() == 0.0 && abs < 1e15 {
        format!("{:.0}", value)
    } else if abs >= 1e6 || abs < 1e-3 {
        format!("{:.2e}", value)
    } else {
        let fixed = format!("{:.3}", value);
        fixed.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{Sample, Series};

    fn spec(kind: ChartKind) -> ChartSpec {
        ChartSpec::new(80, 20, "Test", kind).unwrap()
    }

    #[test]
    fn test_spec_rejects_zero_size() {
        assert!(matches!(
            ChartSpec::new(0, 30, "t", ChartKind::Line),
            Err(Error::Render(_))
        ));
        assert!(matches!(
            ChartSpec::new(120, 0, "t", ChartKind::Bar),
            Err(Error::Render(_))
        ));
    }

    #[test]
    fn test_error_result_prints_message_only() {
        let result = QueryResult::failure("query timed out in expression evaluation");
        for kind in [ChartKind::Line, ChartKind::Bar] {
            match render(&result, &spec(kind)).unwrap() {
                Rendered::Notice(message) => {
                    assert_eq!(message, "Error: query timed out in expression evaluation")
                }
                Rendered::Chart(_) => panic!("error result must not be drawn"),
            }
        }
    }

    #[test]
    fn test_empty_result_prints_no_data() {
        let result = QueryResult::success(vec![]);
        for kind in [ChartKind::Line, ChartKind::Bar] {
            match render(&result, &spec(kind)).unwrap() {
                Rendered::Notice(message) => assert_eq!(message, NO_DATA),
                Rendered::Chart(_) => panic!("empty result must not be drawn"),
            }
        }
    }

    #[test]
    fn test_series_without_samples_prints_no_data() {
        let result = QueryResult::success(vec![Series::new("up", vec![])]);
        let rendered = render_line(&result, &spec(ChartKind::Line)).unwrap();
        assert!(!rendered.is_chart());
    }

    #[test]
    fn test_notice_is_written_as_a_line() {
        let mut out = Vec::new();
        Rendered::Notice(NO_DATA.to_string())
            .write_to(&mut out, true)
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{}\n", NO_DATA));
    }

    #[test]
    fn test_render_dispatches_on_kind() {
        let result = QueryResult::success(vec![Series::new(
            "up",
            vec![Sample {
                timestamp: 1700000000.0,
                value: 1.0,
            }],
        )]);

        let Rendered::Chart(line) = render(&result, &spec(ChartKind::Line)).unwrap() else {
            panic!("expected a chart");
        };
        assert!(line.contains("Time"));

        let Rendered::Chart(bar) = render(&result, &spec(ChartKind::Bar)).unwrap() else {
            panic!("expected a chart");
        };
        assert!(bar.contains("Metrics"));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(-0.0), "0");
        assert_eq!(format_value(1.0), "1");
        assert_eq!(format_value(-42.0), "-42");
        assert_eq!(format_value(0.25), "0.25");
        assert_eq!(format_value(1234.5), "1234.5");
        assert_eq!(format_value(2.0 / 3.0), "0.667");
        assert_eq!(format_value(0.0001), "1.00e-4");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "inf");
    }
}
