//! Sprites — immutable rectangular blocks of text.
//!
//! A sprite is parsed once from its text. Rows are indexed up front so that
//! any cell can be looked up without rescanning the string, and the leading
//! space run of every row is measured so `ignore_leading_spaces` costs nothing
//! at draw time.
//!
//! Visibility rules, in order:
//! 1. Cells outside the sprite or past the end of their row are not visible.
//! 2. With `ignore_leading_spaces`, the leading run of spaces of each row is
//!    not visible.
//! 3. Characters in `blank_chars` are visible and render as a space.
//! 4. With `space_is_transparent`, a plain space is not visible.

use std::ops::Range;

use serde::Deserialize;

/// Construction-time flags for a [`Sprite`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpriteOptions {
    /// Characters drawn as an opaque space.
    pub blank_chars: Vec<char>,
    /// Plain spaces let whatever is behind them show through.
    pub space_is_transparent: bool,
    /// The leading space run of every row is always transparent.
    pub ignore_leading_spaces: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    text: String,
    glyphs: Vec<char>,
    /// Row -> range into `glyphs` (newline excluded).
    row_index: Vec<Range<usize>>,
    /// Row -> number of leading spaces.
    leading: Vec<usize>,
    width: usize,
    options: SpriteOptions,
}

impl Sprite {
    /// A sprite with every character opaque.
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_options(text, SpriteOptions::default())
    }

    pub fn with_options(text: impl Into<String>, options: SpriteOptions) -> Self {
        let text = text.into();
        let glyphs: Vec<char> = text.chars().collect();

        let mut row_index = Vec::new();
        let mut start = 0;
        for (i, &ch) in glyphs.iter().enumerate() {
            if ch == '\n' {
                row_index.push(start..i);
                start = i + 1;
            }
        }
        row_index.push(start..glyphs.len());

        let leading = row_index
            .iter()
            .map(|row| glyphs[row.clone()].iter().take_while(|&&c| c == ' ').count())
            .collect();
        let width = row_index.iter().map(|r| r.len()).max().unwrap_or(0);

        Sprite {
            text,
            glyphs,
            row_index,
            leading,
            width,
            options,
        }
    }

    /// Shorthand for a sprite whose plain spaces are transparent.
    pub fn transparent(text: impl Into<String>) -> Self {
        Self::with_options(
            text,
            SpriteOptions {
                space_is_transparent: true,
                ..SpriteOptions::default()
            },
        )
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.row_index.len()
    }

    fn row(&self, y: usize) -> Option<&[char]> {
        self.row_index.get(y).map(|r| &self.glyphs[r.clone()])
    }

    fn is_blank(&self, ch: char) -> bool {
        self.options.blank_chars.contains(&ch)
    }

    /// The raw character at `(x, y)` if it is visible.
    fn visible_raw(&self, x: usize, y: usize) -> Option<char> {
        let row = self.row(y)?;
        let ch = *row.get(x)?;
        if self.options.ignore_leading_spaces && x < self.leading[y] {
            return None;
        }
        if self.is_blank(ch) {
            return Some(ch);
        }
        if ch == ' ' && self.options.space_is_transparent {
            return None;
        }
        Some(ch)
    }

    /// The character drawn at `(x, y)`, or `None` when the cell is not visible.
    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        self.visible_raw(x, y)
            .map(|ch| if self.is_blank(ch) { ' ' } else { ch })
    }

    /// Length of the visible run starting at `(x, y)`; 0 if `(x, y)` itself is
    /// not visible. Runs never cross a row end or a transparent cell.
    pub fn segment_length_at(&self, x: usize, y: usize) -> usize {
        let Some(row) = self.row(y) else {
            return 0;
        };
        (x..row.len())
            .take_while(|&i| self.visible_raw(i, y).is_some())
            .count()
    }

    /// The text of the visible run at `(x, y)`, capped at `max_len` characters,
    /// with blank characters replaced by spaces.
    pub fn segment_at(&self, x: usize, y: usize, max_len: usize) -> String {
        let len = self.segment_length_at(x, y).min(max_len);
        let Some(row) = self.row(y).filter(|_| len > 0) else {
            return String::new();
        };
        row[x..x + len]
            .iter()
            .map(|&ch| if self.is_blank(ch) { ' ' } else { ch })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn opts(blank: &[char], transparent: bool, leading: bool) -> SpriteOptions {
        SpriteOptions {
            blank_chars: blank.to_vec(),
            space_is_transparent: transparent,
            ignore_leading_spaces: leading,
        }
    }

    #[test]
    fn dimensions_are_measured_from_text() {
        let s = Sprite::new("ab\nabcd\n\nx");
        assert_eq!(s.width(), 4);
        assert_eq!(s.height(), 4);

        let empty = Sprite::new("");
        assert_eq!(empty.width(), 0);
        assert_eq!(empty.height(), 1);
    }

    #[test]
    fn multibyte_characters_count_as_one_cell() {
        let s = Sprite::new("┌─┐\n│é│");
        assert_eq!(s.width(), 3);
        assert_eq!(s.char_at(1, 1), Some('é'));
        assert_eq!(s.segment_at(0, 0, 10), "┌─┐");
    }

    #[rstest]
    #[case(0, 0, Some('a'))]
    #[case(2, 0, None)] // past the row's content
    #[case(3, 1, Some('d'))]
    #[case(4, 1, None)] // outside the sprite
    #[case(0, 9, None)]
    fn char_at_respects_bounds(#[case] x: usize, #[case] y: usize, #[case] expected: Option<char>) {
        let s = Sprite::new("ab\nabcd");
        assert_eq!(s.char_at(x, y), expected);
    }

    #[test]
    fn spaces_are_opaque_by_default() {
        let s = Sprite::new("a b");
        assert_eq!(s.char_at(1, 0), Some(' '));
        assert_eq!(s.segment_length_at(0, 0), 3);
    }

    #[test]
    fn transparent_spaces_split_segments() {
        let s = Sprite::transparent("ab  cd");
        assert_eq!(s.char_at(2, 0), None);
        assert_eq!(s.segment_length_at(0, 0), 2);
        assert_eq!(s.segment_length_at(2, 0), 0);
        assert_eq!(s.segment_length_at(4, 0), 2);
        assert_eq!(s.segment_at(4, 0, 10), "cd");
    }

    #[test]
    fn leading_spaces_are_ignored_even_when_spaces_are_opaque() {
        let s = Sprite::with_options("  a b\n c", opts(&[], false, true));
        assert_eq!(s.char_at(0, 0), None);
        assert_eq!(s.char_at(1, 0), None);
        assert_eq!(s.char_at(3, 0), Some(' '));
        assert_eq!(s.segment_length_at(2, 0), 3);
        assert_eq!(s.segment_at(2, 0, 10), "a b");
        assert_eq!(s.char_at(0, 1), None);
        assert_eq!(s.char_at(1, 1), Some('c'));
    }

    #[test]
    fn blank_chars_render_as_opaque_spaces() {
        let s = Sprite::with_options("a.b c", opts(&['.'], true, false));
        assert_eq!(s.char_at(1, 0), Some(' '));
        assert_eq!(s.segment_length_at(0, 0), 3);
        assert_eq!(s.segment_at(0, 0, 10), "a b");
        assert_eq!(s.char_at(3, 0), None);
    }

    #[test]
    fn segment_is_capped_at_max_len() {
        let s = Sprite::new("abcdef");
        assert_eq!(s.segment_at(1, 0, 3), "bcd");
        assert_eq!(s.segment_at(1, 0, 0), "");
    }

    #[test]
    fn identical_text_and_flags_compare_equal() {
        assert_eq!(Sprite::transparent("x y"), Sprite::transparent("x y"));
        assert_ne!(Sprite::transparent("x y"), Sprite::new("x y"));
    }
}
