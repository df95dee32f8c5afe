//! Owned cell grid that one chart is drawn into

use crossterm::{
    cursor::{Hide, Show},
    queue,
    style::{Attribute, Color as TermColor, Print, ResetColor, SetAttribute, SetForegroundColor},
};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use std::io::Write;

use crate::chart::ChartSpec;
use crate::error::Result;

/// Draw buffer for a single chart, exactly `width` x `height` cells
#[derive(Debug, Clone, PartialEq)]
pub struct ChartBuffer {
    buffer: Buffer,
}

impl ChartBuffer {
    /// Create an empty buffer sized by `spec`
    pub fn new(spec: &ChartSpec) -> Self {
        Self {
            buffer: Buffer::empty(Rect::new(0, 0, spec.width(), spec.height())),
        }
    }

    pub fn area(&self) -> Rect {
        self.buffer.area
    }

    /// Draw a widget over the whole buffer
    pub fn draw<W: Widget>(&mut self, widget: W) {
        let area = self.buffer.area;
        self.draw_in(area, widget);
    }

    /// Draw a widget into `area`, clipped to the buffer
    pub fn draw_in<W: Widget>(&mut self, area: Rect, widget: W) {
        let area = area.intersection(self.buffer.area);
        if area.is_empty() {
            return;
        }
        widget.render(area, &mut self.buffer);
    }

    /// Write `text` at `(x, y)`, at most `max_width` cells, centered in that span
    pub fn put_centered(&mut self, x: u16, y: u16, max_width: u16, text: &str, style: Style) {
        let width = u16::try_from(text.chars().count()).unwrap_or(u16::MAX);
        let offset = max_width.saturating_sub(width) / 2;
        self.put(x.saturating_add(offset), y, max_width, text, style);
    }

    /// Write `text` at `(x, y)`, at most `max_width` cells; off-buffer writes are dropped
    pub fn put(&mut self, x: u16, y: u16, max_width: u16, text: &str, style: Style) {
        let area = self.buffer.area;
        if x >= area.right() || y >= area.bottom() || max_width == 0 {
            return;
        }
        let room = usize::from(max_width.min(area.right() - x));
        self.buffer.set_stringn(x, y, text, room, style);
    }

    /// Rows as plain text with trailing blanks removed
    pub fn lines(&self) -> Vec<String> {
        self.rows()
            .map(|row| {
                let text: String = row.iter().map(|cell| cell.symbol()).collect();
                text.trim_end().to_string()
            })
            .collect()
    }

    /// Whether any row contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }

    /// Write the buffer to `out`, one terminal row per line
    pub fn write_to<W: Write>(&self, out: &mut W, styled: bool) -> Result<()> {
        if !styled {
            for line in self.lines() {
                writeln!(out, "{}", line)?;
            }
            out.flush()?;
            return Ok(());
        }

        queue!(out, Hide)?;
        let drawn = self.write_styled_rows(out);
        // the cursor comes back even when a row failed to write
        let restored = queue!(out, Show).and_then(|_| out.flush());
        drawn?;
        restored?;
        Ok(())
    }

    fn write_styled_rows<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for row in self.rows() {
            let mut fg = Color::Reset;
            let mut bold = false;
            for cell in row {
                if cell.fg != fg {
                    fg = cell.fg;
                    queue!(out, SetForegroundColor(term_color(fg)))?;
                }
                let cell_bold = cell.modifier.contains(Modifier::BOLD);
                if cell_bold != bold {
                    bold = cell_bold;
                    let attribute = if bold {
                        Attribute::Bold
                    } else {
                        Attribute::NormalIntensity
                    };
                    queue!(out, SetAttribute(attribute))?;
                }
                queue!(out, Print(cell.symbol()))?;
            }
            queue!(out, SetAttribute(Attribute::Reset), ResetColor, Print("\n"))?;
        }
        Ok(())
    }

    fn rows(&self) -> std::slice::Chunks<'_, ratatui::buffer::Cell> {
        let width = usize::from(self.buffer.area.width.max(1));
        self.buffer.content.chunks(width)
    }
}

/// Map a ratatui color to the crossterm color the terminal understands
fn term_color(color: Color) -> TermColor {
    match color {
        Color::Reset => TermColor::Reset,
        Color::Black => TermColor::Black,
        Color::Red => TermColor::DarkRed,
        Color::Green => TermColor::DarkGreen,
        Color::Yellow => TermColor::DarkYellow,
        Color::Blue => TermColor::DarkBlue,
        Color::Magenta => TermColor::DarkMagenta,
        Color::Cyan => TermColor::DarkCyan,
        Color::Gray => TermColor::Grey,
        Color::DarkGray => TermColor::DarkGrey,
        Color::LightRed => TermColor::Red,
        Color::LightGreen => TermColor::Green,
        Color::LightYellow => TermColor::Yellow,
        Color::LightBlue => TermColor::Blue,
        Color::LightMagenta => TermColor::Magenta,
        Color::LightCyan => TermColor::Cyan,
        Color::White => TermColor::White,
        Color::Rgb(r, g, b) => TermColor::Rgb { r, g, b },
        Color::Indexed(i) => TermColor::AnsiValue(i),
    }
}
