//! Styles — partially specified sets of display properties.
//!
//! Every property is either unset or set. Unset properties fall through to
//! whatever is behind them when layers are merged, and finally to the
//! background style and the default table via [`Style::fill_remainder`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::warn;

use crate::types::{Color, Cursor, FontStyle, FontWeight, NamedColor, TextDecoration};

/// The fixed set of style properties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StyleProperty {
    Color,
    BackgroundColor,
    FontWeight,
    FontStyle,
    TextDecoration,
    Cursor,
}

impl StyleProperty {
    pub const ALL: [StyleProperty; 6] = [
        StyleProperty::Color,
        StyleProperty::BackgroundColor,
        StyleProperty::FontWeight,
        StyleProperty::FontStyle,
        StyleProperty::TextDecoration,
        StyleProperty::Cursor,
    ];

    pub const COUNT: usize = Self::ALL.len();

    /// Dense index, used by per-property tables.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn name(self) -> &'static str {
        match self {
            StyleProperty::Color => "color",
            StyleProperty::BackgroundColor => "backgroundColor",
            StyleProperty::FontWeight => "fontWeight",
            StyleProperty::FontStyle => "fontStyle",
            StyleProperty::TextDecoration => "textDecoration",
            StyleProperty::Cursor => "cursor",
        }
    }
}

impl FromStr for StyleProperty {
    type Err = String;

    /// Accepts the camelCase name as well as the kebab-case and snake_case
    /// spellings (`background-color`, `background_color`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        StyleProperty::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(&folded))
            .ok_or_else(|| format!("unknown style property `{s}`"))
    }
}

impl fmt::Display for StyleProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single property value, used by the generic accessors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleValue {
    Color(Color),
    FontWeight(FontWeight),
    FontStyle(FontStyle),
    TextDecoration(TextDecoration),
    Cursor(Cursor),
}

impl StyleValue {
    /// Parse `raw` as a value for `property`.
    pub fn parse(property: StyleProperty, raw: &str) -> Result<Self, String> {
        Ok(match property {
            StyleProperty::Color | StyleProperty::BackgroundColor => StyleValue::Color(raw.parse()?),
            StyleProperty::FontWeight => StyleValue::FontWeight(raw.parse()?),
            StyleProperty::FontStyle => StyleValue::FontStyle(raw.parse()?),
            StyleProperty::TextDecoration => StyleValue::TextDecoration(raw.parse()?),
            StyleProperty::Cursor => StyleValue::Cursor(raw.parse()?),
        })
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Color(v) => v.fmt(f),
            StyleValue::FontWeight(v) => v.fmt(f),
            StyleValue::FontStyle(v) => v.fmt(f),
            StyleValue::TextDecoration(v) => v.fmt(f),
            StyleValue::Cursor(v) => v.fmt(f),
        }
    }
}

/// Values used for any property still unset after layering and the
/// background style.
pub const DEFAULT_STYLE: Style = Style {
    color: Some(Color::Named(NamedColor::Reset)),
    background_color: Some(Color::Named(NamedColor::Reset)),
    font_weight: Some(FontWeight::Normal),
    font_style: Some(FontStyle::Normal),
    text_decoration: Some(TextDecoration::None),
    cursor: Some(Cursor::Default),
};

/// Deserializes from a map of property names to value strings, with the same
/// leniency as [`Style::set_named`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "BTreeMap<String, serde_json::Value>")]
pub struct Style {
    pub color: Option<Color>,
    pub background_color: Option<Color>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub text_decoration: Option<TextDecoration>,
    pub cursor: Option<Cursor>,
}

impl Style {
    pub const fn new() -> Self {
        Style {
            color: None,
            background_color: None,
            font_weight: None,
            font_style: None,
            text_decoration: None,
            cursor: None,
        }
    }

    pub const fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub const fn with_background(mut self, color: Color) -> Self {
        self.background_color = Some(color);
        self
    }

    pub const fn with_font_weight(mut self, weight: FontWeight) -> Self {
        self.font_weight = Some(weight);
        self
    }

    pub const fn with_font_style(mut self, style: FontStyle) -> Self {
        self.font_style = Some(style);
        self
    }

    pub const fn with_text_decoration(mut self, decoration: TextDecoration) -> Self {
        self.text_decoration = Some(decoration);
        self
    }

    pub const fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = Some(cursor);
        self
    }

    pub fn get(&self, property: StyleProperty) -> Option<StyleValue> {
        match property {
            StyleProperty::Color => self.color.map(StyleValue::Color),
            StyleProperty::BackgroundColor => self.background_color.map(StyleValue::Color),
            StyleProperty::FontWeight => self.font_weight.map(StyleValue::FontWeight),
            StyleProperty::FontStyle => self.font_style.map(StyleValue::FontStyle),
            StyleProperty::TextDecoration => self.text_decoration.map(StyleValue::TextDecoration),
            StyleProperty::Cursor => self.cursor.map(StyleValue::Cursor),
        }
    }

    pub fn has(&self, property: StyleProperty) -> bool {
        match property {
            StyleProperty::Color => self.color.is_some(),
            StyleProperty::BackgroundColor => self.background_color.is_some(),
            StyleProperty::FontWeight => self.font_weight.is_some(),
            StyleProperty::FontStyle => self.font_style.is_some(),
            StyleProperty::TextDecoration => self.text_decoration.is_some(),
            StyleProperty::Cursor => self.cursor.is_some(),
        }
    }

    /// Set `property` to `value`. A value of the wrong kind for the property
    /// is logged and ignored.
    pub fn set(&mut self, property: StyleProperty, value: StyleValue) {
        match (property, value) {
            (StyleProperty::Color, StyleValue::Color(c)) => self.color = Some(c),
            (StyleProperty::BackgroundColor, StyleValue::Color(c)) => self.background_color = Some(c),
            (StyleProperty::FontWeight, StyleValue::FontWeight(v)) => self.font_weight = Some(v),
            (StyleProperty::FontStyle, StyleValue::FontStyle(v)) => self.font_style = Some(v),
            (StyleProperty::TextDecoration, StyleValue::TextDecoration(v)) => {
                self.text_decoration = Some(v);
            }
            (StyleProperty::Cursor, StyleValue::Cursor(v)) => self.cursor = Some(v),
            (property, value) => warn!(%property, %value, "style value does not fit property; ignored"),
        }
    }

    /// String-keyed setter. Unknown property names and unparsable values are
    /// logged and ignored; the rest of the style is unaffected.
    pub fn set_named(&mut self, name: &str, value: &str) {
        let property = match name.parse::<StyleProperty>() {
            Ok(p) => p,
            Err(e) => {
                warn!("{e}; ignored");
                return;
            }
        };
        match StyleValue::parse(property, value) {
            Ok(v) => self.set(property, v),
            Err(e) => warn!(%property, "{e}; ignored"),
        }
    }

    /// Copy `property` from `other`, leaving it untouched if `other` has it
    /// unset.
    pub fn copy_from(&mut self, other: &Style, property: StyleProperty) {
        if let Some(v) = other.get(property) {
            self.set(property, v);
        }
    }

    /// Set every unset property from `base`, or from [`DEFAULT_STYLE`] where
    /// `base` leaves it unset too. Afterwards every property is set, so a
    /// second call does nothing.
    pub fn fill_remainder(&mut self, base: Option<&Style>) {
        for property in StyleProperty::ALL {
            if self.has(property) {
                continue;
            }
            match base.and_then(|b| b.get(property)) {
                Some(v) => self.set(property, v),
                None => self.copy_from(&DEFAULT_STYLE, property),
            }
        }
    }

    /// Like [`Style::fill_remainder`], returning the filled copy.
    pub fn filled(&self, base: Option<&Style>) -> Style {
        let mut s = self.clone();
        s.fill_remainder(base);
        s
    }

    /// `true` once every property is set.
    pub fn is_complete(&self) -> bool {
        StyleProperty::ALL.into_iter().all(|p| self.has(p))
    }

    pub fn is_empty(&self) -> bool {
        !StyleProperty::ALL.into_iter().any(|p| self.has(p))
    }

    /// Structural equality over all properties.
    pub fn same_as(&self, other: &Style) -> bool {
        self == other
    }

    /// Properties that are set, in declaration order.
    pub fn set_properties(&self) -> impl Iterator<Item = (StyleProperty, StyleValue)> + '_ {
        StyleProperty::ALL
            .into_iter()
            .filter_map(|p| self.get(p).map(|v| (p, v)))
    }
}

impl From<BTreeMap<String, serde_json::Value>> for Style {
    fn from(map: BTreeMap<String, serde_json::Value>) -> Self {
        let mut style = Style::new();
        for (name, value) in &map {
            match value.as_str() {
                Some(value) => style.set_named(name, value),
                None => warn!(property = %name, %value, "style value is not a string; ignored"),
            }
        }
        style
    }
}
