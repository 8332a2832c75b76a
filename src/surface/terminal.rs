//! Terminal surface — queues changed handles to a crossterm writer.
//!
//! Writes from the output buffer only mark handles dirty; nothing reaches the
//! terminal until [`TerminalSurface::flush`]. A row whose handle count changed
//! is repainted whole, since every handle after the change moved.

use std::io::{self, Write};

use crossterm::{cursor, queue, style};

use crate::compositor::OutputSink;
use crate::style::Style;
use crate::types::{Color, DrawId, FontStyle, FontWeight, NamedColor, TextDecoration};

#[derive(Debug, Clone, Default)]
struct Handle {
    text: String,
    style: Style,
    dirty: bool,
}

#[derive(Debug)]
pub struct TerminalSurface {
    /// Top-left terminal cell of the grid.
    origin: (u16, u16),
    rows: Vec<Vec<Handle>>,
    reflow: Vec<bool>,
}

impl TerminalSurface {
    pub fn new(height: usize, origin: (u16, u16)) -> Self {
        TerminalSurface {
            origin,
            rows: vec![Vec::new(); height],
            reflow: vec![true; height],
        }
    }

    /// Mark everything for repaint, e.g. after a terminal resize.
    pub fn invalidate(&mut self) {
        self.reflow.fill(true);
    }

    /// Queue every dirty handle to `out` and flush it.
    pub fn flush(&mut self, out: &mut impl Write) -> io::Result<()> {
        let (ox, oy) = self.origin;
        for (y, row) in self.rows.iter_mut().enumerate() {
            let whole = std::mem::take(&mut self.reflow[y]);
            let mut x = 0u16;
            for handle in row.iter_mut() {
                let width = handle.text.chars().count() as u16;
                if whole || handle.dirty {
                    queue!(
                        out,
                        cursor::MoveTo(ox + x, oy + y as u16),
                        style::PrintStyledContent(style::StyledContent::new(
                            to_content_style(&handle.style),
                            handle.text.as_str(),
                        )),
                    )?;
                    handle.dirty = false;
                }
                x += width;
            }
        }
        out.flush()
    }

    fn touch(&mut self, row: usize, cell: usize) -> Option<&mut Handle> {
        let handle = self.rows.get_mut(row)?.get_mut(cell)?;
        handle.dirty = true;
        Some(handle)
    }
}

impl OutputSink for TerminalSurface {
    fn set_row_len(&mut self, row: usize, cells: usize) {
        if let Some(handles) = self.rows.get_mut(row) {
            handles.resize_with(cells, Handle::default);
            self.reflow[row] = true;
        }
    }

    fn set_cell_text(&mut self, row: usize, cell: usize, text: &str) {
        let Some(handle) = self.touch(row, cell) else {
            return;
        };
        let moved = handle.text.chars().count() != text.chars().count();
        handle.text = text.to_owned();
        if moved {
            self.reflow[row] = true;
        }
    }

    fn set_cell_style(&mut self, row: usize, cell: usize, style: &Style) {
        if let Some(handle) = self.touch(row, cell) {
            handle.style = style.clone();
        }
    }

    // Pointer routing reads the compositor's own record of bound tags.
    fn set_cell_event_tag(&mut self, _row: usize, _cell: usize, _tag: Option<DrawId>) {}
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

/// `cursor` has no terminal equivalent and is not translated.
pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = &s.color {
        cs.foreground_color = Some(to_ct_color(fg));
    }
    if let Some(bg) = &s.background_color {
        cs.background_color = Some(to_ct_color(bg));
    }
    match s.font_weight {
        Some(FontWeight::Bold) => cs.attributes.set(style::Attribute::Bold),
        Some(FontWeight::Light) => cs.attributes.set(style::Attribute::Dim),
        Some(FontWeight::Normal) | None => {}
    }
    if s.font_style == Some(FontStyle::Italic) {
        cs.attributes.set(style::Attribute::Italic);
    }
    match s.text_decoration {
        Some(TextDecoration::Underline) => cs.attributes.set(style::Attribute::Underlined),
        Some(TextDecoration::LineThrough) => cs.attributes.set(style::Attribute::CrossedOut),
        Some(TextDecoration::None) | None => {}
    }
    cs
}

pub fn to_ct_color(c: &Color) -> style::Color {
    match c {
        Color::Named(n) => match n {
            NamedColor::Reset => style::Color::Reset,
            NamedColor::Black => style::Color::Black,
            NamedColor::Red => style::Color::Red,
            NamedColor::Green => style::Color::Green,
            NamedColor::Yellow => style::Color::Yellow,
            NamedColor::Blue => style::Color::Blue,
            NamedColor::Magenta => style::Color::Magenta,
            NamedColor::Cyan => style::Color::Cyan,
            NamedColor::White => style::Color::White,
            NamedColor::Grey => style::Color::Grey,
        },
        Color::Rgb { r, g, b } => style::Color::Rgb {
            r: *r,
            g: *g,
            b: *b,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flush_repaints_only_dirty_handles() {
        let mut surface = TerminalSurface::new(1, (0, 0));
        surface.set_row_len(0, 2);
        surface.set_cell_text(0, 0, "ab");
        surface.set_cell_text(0, 1, "cd");

        let mut first = Vec::new();
        surface.flush(&mut first).unwrap();
        let first = String::from_utf8(first).unwrap();
        assert!(first.contains("ab") && first.contains("cd"));

        surface.set_cell_style(0, 1, &Style::new());
        let mut second = Vec::new();
        surface.flush(&mut second).unwrap();
        let second = String::from_utf8(second).unwrap();
        assert!(second.contains("cd"));
        assert!(!second.contains("ab"));
    }

    #[test]
    fn light_weight_maps_to_dim() {
        let cs = to_content_style(&Style::new().with_font_weight(FontWeight::Light));
        assert!(cs.attributes.has(style::Attribute::Dim));
        assert!(!cs.attributes.has(style::Attribute::Bold));
    }
}
