//! The player's top-row key legend.
//!
//! Each entry reads like `[Right] next`: bracketed keys are drawn bold and
//! the labels around them dim.

use std::io::{self, Write};

use crossterm::{cursor, queue, style, terminal};

use crate::config::KeyBindings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emphasis {
    Key,
    Label,
}

impl Emphasis {
    fn attribute(self) -> style::Attribute {
        match self {
            Emphasis::Key => style::Attribute::Bold,
            Emphasis::Label => style::Attribute::Dim,
        }
    }
}

/// Legend entries for `bindings`, in display order.
pub fn legend(bindings: &KeyBindings) -> Vec<String> {
    vec![
        format!("[{}] prev", bindings.prev_frame),
        format!("[{}] next", bindings.next_frame),
        format!("[{}] play/pause", bindings.toggle_autoplay),
        format!("[{}][Esc] quit", bindings.quit),
    ]
}

/// Split an entry into bracketed key spans and label spans. An unclosed `[`
/// is part of the trailing label.
pub fn spans(entry: &str) -> Vec<(Emphasis, &str)> {
    let mut out = Vec::new();
    let mut rest = entry;
    while !rest.is_empty() {
        let key = rest
            .find('[')
            .and_then(|open| rest[open..].find(']').map(|close| (open, open + close + 1)));
        let Some((open, end)) = key else {
            out.push((Emphasis::Label, rest));
            break;
        };
        if open > 0 {
            out.push((Emphasis::Label, &rest[..open]));
        }
        out.push((Emphasis::Key, &rest[open..end]));
        rest = &rest[end..];
    }
    out
}

/// Redraw the legend on row 0.
pub fn render(out: &mut impl Write, bindings: &KeyBindings) -> io::Result<()> {
    queue!(
        out,
        cursor::MoveTo(0, 0),
        terminal::Clear(terminal::ClearType::CurrentLine),
        style::Print(" "),
    )?;
    for (i, entry) in legend(bindings).iter().enumerate() {
        if i > 0 {
            queue!(out, style::Print("  "))?;
        }
        for (emphasis, text) in spans(entry) {
            queue!(
                out,
                style::SetAttribute(emphasis.attribute()),
                style::Print(text),
                style::SetAttribute(style::Attribute::Reset),
            )?;
        }
    }
    out.flush()
}
