//! Scene source types — the human-authored JSON format.
//!
//! A scene names its sprites and styles once and places entities that refer to
//! them by name. The engine resolves the names and turns the entities alive on
//! a frame into draw calls.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::sprite::SpriteOptions;
use crate::style::Style;

#[derive(Debug, Clone, Deserialize)]
pub struct SceneSource {
    pub width: u16,
    pub height: u16,
    pub frame_count: usize,
    #[serde(default)]
    pub background: Style,
    #[serde(default)]
    pub sprites: BTreeMap<String, SpriteSource>,
    #[serde(default)]
    pub styles: BTreeMap<String, Style>,
    #[serde(default)]
    pub entities: Vec<EntitySource>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpriteSource {
    pub text: String,
    #[serde(flatten)]
    pub options: SpriteOptions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntitySource {
    /// Hit-test name. Unnamed entities are drawn but never targeted.
    #[serde(default)]
    pub name: Option<String>,
    pub sprite: String,
    #[serde(default)]
    pub style: Option<String>,
    pub position: Position,
    #[serde(default)]
    pub depth: i32,
    /// Frames the entity is drawn on; every frame when absent.
    #[serde(default)]
    pub frames: Option<FrameRange>,
}

// ---------------------------------------------------------------------------
// Shared geometry primitives
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct Position {
    #[serde(deserialize_with = "deserialize_coord_compat")]
    pub x: Coordinate,
    #[serde(deserialize_with = "deserialize_coord_compat")]
    pub y: Coordinate,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Coordinate {
    /// Rendered by flooring to the nearest integer.
    Fixed(f64),
    Animated {
        from: i32,
        to: i32,
        start_frame: usize,
        end_frame: usize,
    },
}

/// Serde deserializer that accepts either a plain number (`5`, `-3` or `5.5`)
/// or a full `Coordinate` object (`{"fixed":5}` / `{"animated":{…}}`).
pub fn deserialize_coord_compat<'de, D>(d: D) -> Result<Coordinate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{Error, MapAccess, Visitor};
    use std::fmt;

    struct CoordVisitor;

    impl<'de> Visitor<'de> for CoordVisitor {
        type Value = Coordinate;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a number or a coordinate object")
        }

        fn visit_u64<E: Error>(self, v: u64) -> Result<Coordinate, E> {
            Ok(Coordinate::Fixed(v as f64))
        }

        fn visit_i64<E: Error>(self, v: i64) -> Result<Coordinate, E> {
            Ok(Coordinate::Fixed(v as f64))
        }

        fn visit_f64<E: Error>(self, v: f64) -> Result<Coordinate, E> {
            Ok(Coordinate::Fixed(v))
        }

        fn visit_map<A: MapAccess<'de>>(self, map: A) -> Result<Coordinate, A::Error> {
            Coordinate::deserialize(serde::de::value::MapAccessDeserializer::new(map))
        }
    }

    d.deserialize_any(CoordVisitor)
}

impl Coordinate {
    /// Evaluate to a grid column/row, which may lie off the grid. Fixed
    /// coordinates are floored; animated coordinates are linearly
    /// interpolated and rounded.
    pub fn evaluate(&self, frame: usize) -> i32 {
        match self {
            Coordinate::Fixed(v) => v.floor() as i32,
            Coordinate::Animated {
                from,
                to,
                start_frame,
                end_frame,
            } => {
                if frame <= *start_frame {
                    return *from;
                }
                if frame >= *end_frame {
                    return *to;
                }
                let progress = (frame - start_frame) as f64 / (end_frame - start_frame) as f64;
                let span = (i64::from(*to) - i64::from(*from)) as f64;
                (f64::from(*from) + span * progress).round() as i32
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FrameRange {
    pub start: usize,
    pub end: usize,
}

impl FrameRange {
    pub fn contains(&self, frame: usize) -> bool {
        frame >= self.start && frame < self.end
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, -4)]
    #[case(5, 3)]
    #[case(10, 10)]
    #[case(20, 10)]
    fn animated_coordinates_interpolate(#[case] frame: usize, #[case] expected: i32) {
        let c = Coordinate::Animated {
            from: -4,
            to: 10,
            start_frame: 0,
            end_frame: 10,
        };
        assert_eq!(c.evaluate(frame), expected);
    }

    #[test]
    fn animation_across_the_whole_i32_range_does_not_overflow() {
        let c = Coordinate::Animated {
            from: i32::MIN,
            to: i32::MAX,
            start_frame: 0,
            end_frame: 2,
        };
        assert_eq!(c.evaluate(1), -1);
        assert_eq!(c.evaluate(2), i32::MAX);
    }

    #[test]
    fn position_accepts_plain_numbers() {
        let p: Position = serde_json::from_str(r#"{"x": -2, "y": 3.7}"#).unwrap();
        assert_eq!(p.x.evaluate(0), -2);
        assert_eq!(p.y.evaluate(0), 3);
    }

    #[test]
    fn sprite_source_flattens_options() {
        let s: SpriteSource =
            serde_json::from_str(r#"{"text": " a.", "blank_chars": ["."], "ignore_leading_spaces": true}"#)
                .unwrap();
        assert_eq!(s.options.blank_chars, vec!['.']);
        assert!(s.options.ignore_leading_spaces);
        assert!(!s.options.space_is_transparent);
    }
}
