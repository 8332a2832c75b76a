use crate::compositor::OutputSink;
use crate::style::Style;
use crate::types::DrawId;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Handle {
    text: String,
    style: Style,
    tag: Option<DrawId>,
}

/// An in-memory surface that records every write.
#[derive(Debug, Clone)]
pub struct MemorySurface {
    width: usize,
    rows: Vec<Vec<Handle>>,
    writes: usize,
}

impl MemorySurface {
    pub fn new(width: usize, height: usize) -> Self {
        MemorySurface {
            width,
            rows: vec![Vec::new(); height],
            writes: 0,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Total number of text, style and tag writes received.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    pub fn reset_write_count(&mut self) {
        self.writes = 0;
    }

    /// Handles bound in row `y`.
    pub fn handle_count(&self, y: usize) -> usize {
        self.rows.get(y).map_or(0, Vec::len)
    }

    /// The row as displayed: every handle's text, left to right.
    pub fn row_text(&self, y: usize) -> String {
        self.rows
            .get(y)
            .map(|row| row.iter().map(|h| h.text.as_str()).collect())
            .unwrap_or_default()
    }

    /// All rows joined with newlines.
    pub fn text(&self) -> String {
        (0..self.rows.len())
            .map(|y| self.row_text(y))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn handle_at(&self, x: usize, y: usize) -> Option<&Handle> {
        let mut start = 0;
        for handle in self.rows.get(y)? {
            let end = start + handle.text.chars().count();
            if x < end {
                return Some(handle);
            }
            start = end;
        }
        None
    }

    pub fn cell_style(&self, x: usize, y: usize) -> Option<&Style> {
        self.handle_at(x, y).map(|h| &h.style)
    }

    pub fn cell_tag(&self, x: usize, y: usize) -> Option<DrawId> {
        self.handle_at(x, y).and_then(|h| h.tag)
    }

    fn handle_mut(&mut self, row: usize, cell: usize) -> Option<&mut Handle> {
        self.writes += 1;
        self.rows.get_mut(row)?.get_mut(cell)
    }
}

impl OutputSink for MemorySurface {
    fn set_row_len(&mut self, row: usize, cells: usize) {
        if let Some(handles) = self.rows.get_mut(row) {
            handles.resize_with(cells, Handle::default);
        }
    }

    fn set_cell_text(&mut self, row: usize, cell: usize, text: &str) {
        if let Some(h) = self.handle_mut(row, cell) {
            h.text = text.to_owned();
        }
    }

    fn set_cell_style(&mut self, row: usize, cell: usize, style: &Style) {
        if let Some(h) = self.handle_mut(row, cell) {
            h.style = style.clone();
        }
    }

    fn set_cell_event_tag(&mut self, row: usize, cell: usize, tag: Option<DrawId>) {
        if let Some(h) = self.handle_mut(row, cell) {
            h.tag = tag;
        }
    }
}
