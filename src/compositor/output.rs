//! Output binding — reconciles a composited frame with a persistent surface.
//!
//! The surface holds a pool of cell handles per row, one per run. Binding a
//! frame reuses the handles already present, grows or shrinks the pool to the
//! new run count, and writes only the text, style and event tag values that
//! differ from what the handle already shows.

use tracing::debug;

use crate::style::Style;
use crate::types::DrawId;

use super::draw_buffer::DrawBuffer;

/// A surface made of per-row pools of cell handles.
///
/// Handles in a row are laid out left to right, each as wide as its text.
pub trait OutputSink {
    /// Grow or shrink row `row` to exactly `cells` handles. Handles below
    /// `cells` keep their contents.
    fn set_row_len(&mut self, row: usize, cells: usize);
    fn set_cell_text(&mut self, row: usize, cell: usize, text: &str);
    fn set_cell_style(&mut self, row: usize, cell: usize, style: &Style);
    /// Tag used to route pointer events on this handle back to its draw.
    fn set_cell_event_tag(&mut self, row: usize, cell: usize, tag: Option<DrawId>);
}

/// What a handle currently shows, as last written.
#[derive(Debug, Clone, PartialEq, Eq)]
struct OutputCell {
    x: usize,
    width: usize,
    text: String,
    style: Style,
    tag: Option<DrawId>,
}

impl OutputCell {
    fn unwritten(x: usize) -> Self {
        OutputCell {
            x,
            width: 0,
            text: String::new(),
            style: Style::new(),
            tag: None,
        }
    }
}

/// Write counts of a single [`OutputBuffer::bind`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindStats {
    pub runs: usize,
    pub text_writes: usize,
    pub style_writes: usize,
    pub tag_writes: usize,
}

impl BindStats {
    pub fn writes(&self) -> usize {
        self.text_writes + self.style_writes + self.tag_writes
    }
}

#[derive(Debug)]
pub struct OutputBuffer {
    background: Style,
    rows: Vec<Vec<OutputCell>>,
}

impl OutputBuffer {
    pub fn new(height: usize, background: Style) -> Self {
        OutputBuffer {
            background,
            rows: vec![Vec::new(); height],
        }
    }

    /// Push the composited frame in `draw` to `sink`.
    pub fn bind(&mut self, draw: &DrawBuffer, sink: &mut impl OutputSink) -> BindStats {
        let mut stats = BindStats::default();

        for (y, pool) in self.rows.iter_mut().enumerate() {
            let Some(row) = draw.row(y) else {
                continue;
            };

            let mut wanted = Vec::new();
            let mut x = 0;
            while x < row.width() {
                let len = row.segment_length_at(x);
                let Some(computed) = row.style_at(x) else {
                    break;
                };
                let tag = computed.front_id();
                let text = match tag.and_then(|id| draw.layer(id)) {
                    Some(layer) => layer.text_at(x, y, len),
                    None => " ".repeat(len),
                };
                wanted.push(OutputCell {
                    x,
                    width: len,
                    text,
                    style: computed.style().filled(Some(&self.background)),
                    tag,
                });
                x += len.max(1);
            }
            stats.runs += wanted.len();

            if wanted.len() != pool.len() {
                sink.set_row_len(y, wanted.len());
                pool.truncate(wanted.len());
                while pool.len() < wanted.len() {
                    pool.push(OutputCell::unwritten(wanted[pool.len()].x));
                }
            }

            for (i, (have, want)) in pool.iter_mut().zip(wanted).enumerate() {
                if have.text != want.text {
                    sink.set_cell_text(y, i, &want.text);
                    stats.text_writes += 1;
                }
                if !have.style.same_as(&want.style) {
                    sink.set_cell_style(y, i, &want.style);
                    stats.style_writes += 1;
                }
                if have.tag != want.tag {
                    sink.set_cell_event_tag(y, i, want.tag);
                    stats.tag_writes += 1;
                }
                *have = want;
            }
        }

        debug!(
            runs = stats.runs,
            text = stats.text_writes,
            style = stats.style_writes,
            tag = stats.tag_writes,
            "bound frame"
        );
        stats
    }

    /// Event tag of the handle currently covering `(x, y)`.
    pub fn tag_at(&self, x: usize, y: usize) -> Option<DrawId> {
        let pool = self.rows.get(y)?;
        let i = pool.partition_point(|c| c.x <= x).checked_sub(1)?;
        let cell = &pool[i];
        (x < cell.x + cell.width).then_some(cell.tag).flatten()
    }

    /// Number of handles currently bound in row `y`.
    pub fn cells_in_row(&self, y: usize) -> usize {
        self.rows.get(y).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::sprite::Sprite;
    use crate::surface::MemorySurface;
    use crate::types::{Color, Location, NamedColor};

    const RED: Color = Color::Named(NamedColor::Red);

    fn draw(buf: &mut DrawBuffer, text: &str, x: i32, depth: i32, id: u64) {
        buf.draw(
            Rc::new(Sprite::transparent(text)),
            Location::new(x, 0, depth),
            &Style::new(),
            DrawId(id),
        );
    }

    #[test]
    fn unchanged_frame_writes_nothing() {
        let mut buf = DrawBuffer::new(6, 1);
        let mut out = OutputBuffer::new(1, Style::new());
        let mut sink = MemorySurface::new(6, 1);

        draw(&mut buf, "ab", 1, 0, 1);
        let first = out.bind(&buf, &mut sink);
        assert_eq!(first.runs, 3);
        assert!(first.writes() > 0);

        let again = out.bind(&buf, &mut sink);
        assert_eq!(again.writes(), 0);
        assert_eq!(sink.row_text(0), " ab   ");
    }

    #[test]
    fn only_changed_runs_are_rewritten() {
        let mut buf = DrawBuffer::new(6, 1);
        let mut out = OutputBuffer::new(1, Style::new());
        let mut sink = MemorySurface::new(6, 1);

        draw(&mut buf, "ab", 1, 0, 1);
        out.bind(&buf, &mut sink);

        buf.clear();
        draw(&mut buf, "xy", 1, 0, 1);
        let stats = out.bind(&buf, &mut sink);
        assert_eq!(stats.text_writes, 1);
        assert_eq!(stats.style_writes, 0);
        assert_eq!(stats.tag_writes, 0);
        assert_eq!(sink.row_text(0), " xy   ");
    }

    #[test]
    fn pool_shrinks_with_run_count() {
        let mut buf = DrawBuffer::new(6, 1);
        let mut out = OutputBuffer::new(1, Style::new());
        let mut sink = MemorySurface::new(6, 1);

        draw(&mut buf, "a b c", 0, 0, 1);
        out.bind(&buf, &mut sink);
        assert_eq!(out.cells_in_row(0), 6);

        buf.clear();
        out.bind(&buf, &mut sink);
        assert_eq!(out.cells_in_row(0), 1);
        assert_eq!(sink.row_text(0), "      ");
    }

    #[test]
    fn styles_are_filled_from_background() {
        let mut buf = DrawBuffer::new(2, 1);
        let mut out = OutputBuffer::new(1, Style::new().with_background(RED));
        let mut sink = MemorySurface::new(2, 1);
        out.bind(&buf, &mut sink);
        let style = sink.cell_style(0, 0).unwrap();
        assert_eq!(style.background_color, Some(RED));
        assert!(style.is_complete());

        draw(&mut buf, "q", 1, 0, 9);
        out.bind(&buf, &mut sink);
        assert_eq!(out.tag_at(1, 0), Some(DrawId(9)));
        assert_eq!(out.tag_at(0, 0), None);
        assert_eq!(sink.cell_tag(1, 0), Some(DrawId(9)));
    }
}
