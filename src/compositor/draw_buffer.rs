//! The layered draw buffer.
//!
//! Every row keeps a sparse, singly linked set of boundaries. A boundary at
//! `i` owns the [`ComputedStyle`] of the run `[i, next[i])`. Draws only ever
//! splice in the two boundaries at their own ends and then visit the
//! boundaries in between, so a wide draw over an untouched row costs two
//! insertions rather than one write per cell.
//!
//! Reads and insertions find the run covering a cell by scanning backward to
//! the nearest boundary. That scan is linear in the distance to the previous
//! boundary (worst case the row width on a row with few boundaries).

use std::collections::HashMap;
use std::rc::Rc;

use crate::sprite::Sprite;
use crate::style::{Style, StyleProperty};
use crate::types::{DrawId, Location};

/// Depth bookkeeping for one run: the depth at which each property was last
/// set, and the front contributor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriorityLedger {
    depths: [Option<i32>; StyleProperty::COUNT],
    front: Option<(i32, DrawId)>,
}

impl PriorityLedger {
    pub fn depth_of(&self, property: StyleProperty) -> Option<i32> {
        self.depths[property.index()]
    }

    /// The lowest depth seen in this run and the draw that owns it.
    pub fn front(&self) -> Option<(i32, DrawId)> {
        self.front
    }

    fn claims(&mut self, property: StyleProperty, depth: i32) -> bool {
        let slot = &mut self.depths[property.index()];
        if slot.is_none_or(|d| depth < d) {
            *slot = Some(depth);
            true
        } else {
            false
        }
    }

    fn offer_front(&mut self, depth: i32, id: DrawId) {
        if self.front.is_none_or(|(d, _)| depth < d) {
            self.front = Some((depth, id));
        }
    }
}

/// The merged result of every draw covering a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    style: Style,
    ledger: PriorityLedger,
}

impl ComputedStyle {
    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn ledger(&self) -> &PriorityLedger {
        &self.ledger
    }

    /// The draw supplying this run's characters and hit-test identity.
    pub fn front_id(&self) -> Option<DrawId> {
        self.ledger.front.map(|(_, id)| id)
    }

    /// Merge one layer. Each property the layer sets wins only if the layer is
    /// in front of whoever set it before; the front id follows the lowest
    /// depth. Equal depths keep the earlier draw.
    pub fn add_style(&mut self, style: &Style, depth: i32, id: DrawId) {
        for (property, value) in style.set_properties() {
            if self.ledger.claims(property, depth) {
                self.style.set(property, value);
            }
        }
        self.ledger.offer_front(depth, id);
    }
}

/// One grid row's run structure.
#[derive(Debug, Clone)]
pub struct RowSegmentBuffer {
    width: usize,
    computed: Vec<ComputedStyle>,
    /// `None`: not a boundary. `Some(n)`: boundary whose run ends at `n`.
    next: Vec<Option<usize>>,
}

impl RowSegmentBuffer {
    pub fn new(width: usize) -> Self {
        let mut next = vec![None; width];
        if width > 0 {
            next[0] = Some(width);
        }
        RowSegmentBuffer {
            width,
            computed: vec![ComputedStyle::default(); width],
            next,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn is_boundary(&self, x: usize) -> bool {
        self.next.get(x).is_some_and(Option::is_some)
    }

    /// Boundaries in order, each with the end of its run.
    pub fn boundaries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut at = (self.width > 0).then_some(0);
        std::iter::from_fn(move || {
            let start = at?;
            let end = self.next[start]?;
            at = (end < self.width).then_some(end);
            Some((start, end))
        })
    }

    /// The boundary owning cell `x`.
    fn boundary_at_or_before(&self, x: usize) -> usize {
        (0..=x).rev().find(|&i| self.next[i].is_some()).unwrap_or(0)
    }

    fn in_bounds(&self, x: usize) -> bool {
        debug_assert!(x < self.width, "column {x} outside row of width {}", self.width);
        x < self.width
    }

    /// The merged style of the run covering `x`.
    pub fn style_at(&self, x: usize) -> Option<&ComputedStyle> {
        if !self.in_bounds(x) {
            return None;
        }
        Some(&self.computed[self.boundary_at_or_before(x)])
    }

    /// Cells from `x` to the end of its run; 0 outside the row.
    pub fn segment_length_at(&self, x: usize) -> usize {
        if !self.in_bounds(x) {
            return 0;
        }
        let b = self.boundary_at_or_before(x);
        self.next[b].map_or(0, |end| end - x)
    }

    /// Make `b` a boundary, copying the style of the run it splits.
    fn insert_segment_start(&mut self, b: usize) {
        if b >= self.width || self.next[b].is_some() {
            return;
        }
        let p = self.boundary_at_or_before(b);
        self.computed[b] = self.computed[p].clone();
        self.next[b] = self.next[p];
        self.next[p] = Some(b);
    }

    /// Merge `style` into `[start_x, start_x + length)`.
    pub fn load_segment(&mut self, length: usize, start_x: usize, style: &Style, depth: i32, id: DrawId) {
        let end = (start_x + length).min(self.width);
        if start_x >= end {
            return;
        }
        self.insert_segment_start(start_x);
        self.insert_segment_start(end);

        let mut at = start_x;
        while at < end {
            self.computed[at].add_style(style, depth, id);
            at = self.next[at].unwrap_or(self.width);
        }

        self.coalesce(start_x, end);
    }

    /// Drop boundaries in `[start_x, end]` whose run now equals the previous
    /// run, starting from the run just before `start_x`.
    fn coalesce(&mut self, start_x: usize, end: usize) {
        let mut cur = if start_x > 0 {
            self.boundary_at_or_before(start_x - 1)
        } else {
            0
        };
        while let Some(next) = self.next[cur] {
            if next > end || next >= self.width {
                break;
            }
            if self.computed[cur] == self.computed[next] {
                self.next[cur] = self.next[next].take();
                self.computed[next] = ComputedStyle::default();
            } else {
                cur = next;
            }
        }
    }

    /// Reset to one empty run covering the row.
    pub fn clear(&mut self) {
        let mut at = 0;
        while at < self.width {
            let next = self.next[at].take().unwrap_or(self.width);
            self.computed[at] = ComputedStyle::default();
            at = next;
        }
        if self.width > 0 {
            self.next[0] = Some(self.width);
        }
    }
}

/// Where a draw's sprite sits on the grid.
#[derive(Debug, Clone)]
pub struct Layer {
    pub sprite: Rc<Sprite>,
    pub x: i32,
    pub y: i32,
}

impl Layer {
    /// The text this layer shows in `[x, x + len)` of grid row `y`.
    pub fn text_at(&self, x: usize, y: usize, len: usize) -> String {
        let (Ok(lx), Ok(ly)) = (
            usize::try_from(x as i64 - i64::from(self.x)),
            usize::try_from(y as i64 - i64::from(self.y)),
        ) else {
            return " ".repeat(len);
        };
        let mut text = self.sprite.segment_at(lx, ly, len);
        let shown = text.chars().count();
        text.extend(std::iter::repeat_n(' ', len - shown));
        text
    }
}

/// All draws of the frame being built.
#[derive(Debug)]
pub struct DrawBuffer {
    width: usize,
    height: usize,
    rows: Vec<RowSegmentBuffer>,
    layers: HashMap<DrawId, Layer>,
}

impl DrawBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        DrawBuffer {
            width,
            height,
            rows: (0..height).map(|_| RowSegmentBuffer::new(width)).collect(),
            layers: HashMap::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row(&self, y: usize) -> Option<&RowSegmentBuffer> {
        debug_assert!(y < self.height, "row {y} outside grid of height {}", self.height);
        self.rows.get(y)
    }

    pub fn layer(&self, id: DrawId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Load every visible segment of `sprite` placed at `location`, clipped to
    /// the grid.
    pub fn draw(&mut self, sprite: Rc<Sprite>, location: Location, style: &Style, id: DrawId) {
        let (w, h) = (self.width as i64, self.height as i64);
        let (ox, oy) = (i64::from(location.x), i64::from(location.y));

        for sy in 0..sprite.height() {
            let gy = oy + sy as i64;
            if gy < 0 {
                continue;
            }
            if gy >= h {
                break;
            }
            let row = &mut self.rows[gy as usize];

            let mut sx = (-ox).max(0) as usize;
            while sx < sprite.width() {
                let gx = ox + sx as i64;
                if gx >= w {
                    break;
                }
                let len = sprite.segment_length_at(sx, sy);
                if len == 0 {
                    sx += 1;
                    continue;
                }
                let clipped = len.min((w - gx) as usize);
                row.load_segment(clipped, gx as usize, style, location.depth, id);
                sx += len;
            }
        }

        self.layers.insert(
            id,
            Layer {
                sprite,
                x: location.x,
                y: location.y,
            },
        );
    }

    /// Forget every draw of the frame.
    pub fn clear(&mut self) {
        for row in &mut self.rows {
            row.clear();
        }
        self.layers.clear();
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::types::{Color, NamedColor};

    const RED: Color = Color::Named(NamedColor::Red);
    const BLUE: Color = Color::Named(NamedColor::Blue);

    fn runs(row: &RowSegmentBuffer) -> Vec<(usize, usize)> {
        row.boundaries().collect()
    }

    fn assert_consistent(row: &RowSegmentBuffer) {
        let mut x = 0;
        while x < row.width() {
            let len = row.segment_length_at(x);
            assert!(len > 0, "empty run at {x}");
            x += len;
        }
        assert_eq!(x, row.width());

        let list = runs(row);
        for pair in list.windows(2) {
            assert_ne!(
                row.style_at(pair[0].0),
                row.style_at(pair[1].0),
                "adjacent runs {pair:?} are identical"
            );
        }
        for x in 0..row.width() {
            assert_eq!(row.is_boundary(x), list.iter().any(|(s, _)| *s == x));
        }
    }

    #[test]
    fn fresh_row_is_one_run() {
        let row = RowSegmentBuffer::new(8);
        assert_eq!(runs(&row), vec![(0, 8)]);
        assert_eq!(row.segment_length_at(3), 5);
        assert_eq!(row.style_at(7), Some(&ComputedStyle::default()));
    }

    #[test]
    fn load_segment_splits_at_both_ends() {
        let mut row = RowSegmentBuffer::new(10);
        row.load_segment(3, 4, &Style::new().with_color(RED), 1, DrawId(1));
        assert_eq!(runs(&row), vec![(0, 4), (4, 7), (7, 10)]);
        assert_eq!(row.segment_length_at(5), 2);
        assert_eq!(row.style_at(6).unwrap().front_id(), Some(DrawId(1)));
        assert_eq!(row.style_at(7).unwrap().front_id(), None);
        assert_consistent(&row);
    }

    #[test]
    fn front_id_follows_lowest_depth() {
        let mut row = RowSegmentBuffer::new(5);
        row.load_segment(5, 0, &Style::new(), 5, DrawId(1));
        row.load_segment(2, 1, &Style::new(), 1, DrawId(2));
        row.load_segment(5, 0, &Style::new(), 3, DrawId(3));

        let fronts: Vec<_> = (0..5).map(|x| row.style_at(x).unwrap().front_id()).collect();
        assert_eq!(
            fronts,
            vec![
                Some(DrawId(3)),
                Some(DrawId(2)),
                Some(DrawId(2)),
                Some(DrawId(3)),
                Some(DrawId(3))
            ]
        );
        assert_consistent(&row);
    }

    #[test]
    fn equal_depth_keeps_first_draw() {
        let mut row = RowSegmentBuffer::new(3);
        row.load_segment(3, 0, &Style::new().with_color(RED), 2, DrawId(1));
        row.load_segment(3, 0, &Style::new().with_color(BLUE), 2, DrawId(2));
        let cs = row.style_at(1).unwrap();
        assert_eq!(cs.front_id(), Some(DrawId(1)));
        assert_eq!(cs.style().color, Some(RED));
    }

    #[test]
    fn back_layer_properties_show_through_unset_front_properties() {
        let mut row = RowSegmentBuffer::new(4);
        row.load_segment(4, 0, &Style::new().with_background(BLUE), 1, DrawId(1));
        row.load_segment(4, 0, &Style::new().with_color(RED).with_background(RED), 2, DrawId(2));

        let cs = row.style_at(0).unwrap();
        assert_eq!(cs.style().background_color, Some(BLUE));
        assert_eq!(cs.style().color, Some(RED));
        assert_eq!(cs.front_id(), Some(DrawId(1)));
        assert_eq!(cs.ledger().depth_of(StyleProperty::Color), Some(2));
        assert_eq!(cs.ledger().depth_of(StyleProperty::BackgroundColor), Some(1));
    }

    #[test]
    fn identical_neighbours_are_coalesced() {
        let mut row = RowSegmentBuffer::new(6);
        let s = Style::new().with_color(RED);
        row.load_segment(2, 0, &s, 1, DrawId(1));
        row.load_segment(2, 4, &s, 1, DrawId(1));
        assert_eq!(runs(&row), vec![(0, 2), (2, 4), (4, 6)]);

        row.load_segment(2, 2, &s, 1, DrawId(1));
        assert_eq!(runs(&row), vec![(0, 6)]);
        assert_consistent(&row);
    }

    #[test]
    fn hidden_draw_leaves_no_extra_boundaries() {
        let mut row = RowSegmentBuffer::new(6);
        row.load_segment(6, 0, &Style::new().with_color(RED), 0, DrawId(1));
        // Behind the red layer and only setting an already claimed property.
        row.load_segment(2, 2, &Style::new().with_color(BLUE), 4, DrawId(2));
        assert_eq!(runs(&row), vec![(0, 6)]);
        assert_consistent(&row);
    }

    #[rstest]
    #[case(vec![(3, 0), (2, 5), (4, 2), (10, 0), (1, 9)])]
    #[case(vec![(1, 0), (1, 1), (1, 2), (1, 3), (1, 4)])]
    #[case(vec![(5, 5), (5, 0), (3, 3), (2, 8)])]
    fn runs_always_cover_the_row(#[case] draws: Vec<(usize, usize)>) {
        let mut row = RowSegmentBuffer::new(10);
        for (i, (len, start)) in draws.into_iter().enumerate() {
            let style = if i % 2 == 0 {
                Style::new().with_color(RED)
            } else {
                Style::new().with_background(BLUE)
            };
            row.load_segment(len, start, &style, (i % 3) as i32, DrawId(i as u64));
            assert_consistent(&row);
        }
    }

    #[test]
    fn clear_restores_single_empty_run() {
        let mut row = RowSegmentBuffer::new(7);
        row.load_segment(3, 2, &Style::new().with_color(RED), 0, DrawId(1));
        row.clear();
        assert_eq!(runs(&row), vec![(0, 7)]);
        assert!((0..7).all(|x| row.style_at(x) == Some(&ComputedStyle::default())));
    }

    #[test]
    fn draw_clips_to_the_grid() {
        let mut buf = DrawBuffer::new(4, 2);
        let sprite = Rc::new(Sprite::new("abcdef\nghijkl\nmnopqr"));
        buf.draw(sprite, Location::new(-2, 1, 0), &Style::new(), DrawId(7));

        assert_eq!(buf.row(0).unwrap().style_at(0).unwrap().front_id(), None);
        let row = buf.row(1).unwrap();
        assert_eq!(row.segment_length_at(0), 4);
        assert_eq!(row.style_at(3).unwrap().front_id(), Some(DrawId(7)));
        assert_eq!(buf.layer(DrawId(7)).unwrap().text_at(0, 1, 4), "cdef");
    }

    #[test]
    fn fully_offscreen_draw_touches_nothing() {
        let mut buf = DrawBuffer::new(3, 3);
        let sprite = Rc::new(Sprite::new("xx\nxx"));
        buf.draw(Rc::clone(&sprite), Location::new(5, 0, 0), &Style::new(), DrawId(1));
        buf.draw(sprite, Location::new(0, -4, 0), &Style::new(), DrawId(2));
        for y in 0..3 {
            assert_eq!(buf.row(y).unwrap().segment_length_at(0), 3);
        }
    }

    #[test]
    fn transparent_cells_are_not_loaded() {
        let mut buf = DrawBuffer::new(5, 1);
        buf.draw(Rc::new(Sprite::transparent("a b")), Location::new(1, 0, 0), &Style::new(), DrawId(1));
        let row = buf.row(0).unwrap();
        let fronts: Vec<_> = (0..5).map(|x| row.style_at(x).unwrap().front_id()).collect();
        assert_eq!(fronts, vec![None, Some(DrawId(1)), None, Some(DrawId(1)), None]);
    }
}
