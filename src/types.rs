//! Shared boundary types for the sprite compositor.
//!
//! Colors and the enumerated style values live here, together with the small
//! coordinate and identity types that flow between the draw side (producers
//! calling `draw`) and the output side (surfaces and pointer input).

use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Style values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedColor {
    /// The surface's own default color.
    Reset,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Grey,
}

impl FromStr for Color {
    type Err = String;

    /// Accepts named colors (`red`, `reset`, `default`) and `#rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(hex) = s.strip_prefix('#') {
            if hex.len() != 6 || !hex.is_ascii() {
                return Err(format!("invalid hex color `{s}`"));
            }
            let channel = |i: usize| {
                u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("invalid hex color `{s}`"))
            };
            return Ok(Color::Rgb {
                r: channel(0)?,
                g: channel(2)?,
                b: channel(4)?,
            });
        }
        let named = match s.to_ascii_lowercase().as_str() {
            "reset" | "default" | "inherit" => NamedColor::Reset,
            "black" => NamedColor::Black,
            "red" => NamedColor::Red,
            "green" => NamedColor::Green,
            "yellow" => NamedColor::Yellow,
            "blue" => NamedColor::Blue,
            "magenta" => NamedColor::Magenta,
            "cyan" => NamedColor::Cyan,
            "white" => NamedColor::White,
            "grey" | "gray" => NamedColor::Grey,
            _ => return Err(format!("unknown color `{s}`")),
        };
        Ok(Color::Named(named))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::Named(n) => write!(f, "{}", format!("{n:?}").to_ascii_lowercase()),
            Color::Rgb { r, g, b } => write!(f, "#{r:02x}{g:02x}{b:02x}"),
        }
    }
}

/// Generates a string-keyed enum with `FromStr` and `Display` matching its
/// keyword spelling.
macro_rules! keyword_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $kw:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($kw => Ok($name::$variant),)+
                    other => Err(format!("invalid {} `{other}`", stringify!($name))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(match self {
                    $($name::$variant => $kw),+
                })
            }
        }
    };
}

keyword_enum!(
    /// `light` renders dim on terminals.
    FontWeight {
        Normal => "normal",
        Bold => "bold",
        Light => "light",
    }
);

keyword_enum!(FontStyle {
    Normal => "normal",
    Italic => "italic",
});

keyword_enum!(TextDecoration {
    None => "none",
    Underline => "underline",
    LineThrough => "line-through",
});

keyword_enum!(
    /// Pointer cursor shape requested while hovering a cell.
    Cursor {
        Default => "default",
        Pointer => "pointer",
        Text => "text",
        Move => "move",
        NotAllowed => "not-allowed",
    }
);

// ---------------------------------------------------------------------------
// Geometry and identity
// ---------------------------------------------------------------------------

/// Placement of a draw call. `x`/`y` may be negative or past the grid; the
/// draw is clipped. Lower `depth` is closer to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub x: i32,
    pub y: i32,
    pub depth: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32, depth: i32) -> Self {
        Location { x, y, depth }
    }
}

impl From<[i32; 3]> for Location {
    fn from([x, y, depth]: [i32; 3]) -> Self {
        Location { x, y, depth }
    }
}

/// A grid cell, column then row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CellCoords {
    pub x: u16,
    pub y: u16,
}

impl CellCoords {
    pub const fn new(x: u16, y: u16) -> Self {
        CellCoords { x, y }
    }
}

/// Identity of a single draw call within one frame. Allocated by the
/// compositor; doubles as the event tag written to output cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DrawId(pub u64);

impl fmt::Display for DrawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
