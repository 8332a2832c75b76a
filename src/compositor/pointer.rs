//! Pointer dispatch — turns raw pointer input into targeted events.
//!
//! The tracker remembers one hover target and one press target. Targets are
//! logical names, not draw ids: an entity is redrawn with a fresh id every
//! frame, and hovering it across frames must not re-fire enter/leave.

use std::fmt;

use crate::types::CellCoords;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    Left,
    Right,
    Middle,
}

/// Raw pointer input, already mapped to grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerAction {
    Move,
    Down(PointerButton),
    Up(PointerButton),
    /// The pointer left the surface.
    Leave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerInput {
    pub action: PointerAction,
    /// `None` when the pointer is outside the grid.
    pub cell: Option<CellCoords>,
}

impl PointerInput {
    pub const fn new(action: PointerAction, cell: Option<CellCoords>) -> Self {
        PointerInput { action, cell }
    }

    pub const fn at(action: PointerAction, x: u16, y: u16) -> Self {
        PointerInput {
            action,
            cell: Some(CellCoords::new(x, y)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventType {
    MouseMove,
    MouseEnter,
    MouseLeave,
    MouseEnterCanvas,
    MouseLeaveCanvas,
    MouseDown,
    MouseUp,
    Click,
    ContextMenu,
}

impl PointerEventType {
    pub const fn as_str(self) -> &'static str {
        match self {
            PointerEventType::MouseMove => "mousemove",
            PointerEventType::MouseEnter => "mouseenter",
            PointerEventType::MouseLeave => "mouseleave",
            PointerEventType::MouseEnterCanvas => "mouseentercanvas",
            PointerEventType::MouseLeaveCanvas => "mouseleavecanvas",
            PointerEventType::MouseDown => "mousedown",
            PointerEventType::MouseUp => "mouseup",
            PointerEventType::Click => "click",
            PointerEventType::ContextMenu => "contextmenu",
        }
    }
}

impl fmt::Display for PointerEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dispatched pointer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointerEvent {
    pub raw: PointerInput,
    pub kind: PointerEventType,
    /// Name of the draw under the pointer, if it was named.
    pub target: Option<String>,
    pub cell: Option<CellCoords>,
}

#[derive(Debug, Default)]
pub(crate) struct PointerTracker {
    in_canvas: bool,
    hover: Option<String>,
    /// Target at the last primary press, until its release.
    press: Option<Option<String>>,
}

impl PointerTracker {
    /// Emit the events caused by `input`, given the resolved `target` under
    /// the pointer.
    pub(crate) fn dispatch(&mut self, input: PointerInput, target: Option<String>) -> Vec<PointerEvent> {
        let mut events = Vec::new();
        let mut emit = |kind, target: Option<String>| {
            events.push(PointerEvent {
                raw: input,
                kind,
                target,
                cell: input.cell,
            });
        };

        if input.cell.is_none() || input.action == PointerAction::Leave {
            if let Some(old) = self.hover.take() {
                emit(PointerEventType::MouseLeave, Some(old));
            }
            if self.in_canvas {
                emit(PointerEventType::MouseLeaveCanvas, None);
                self.in_canvas = false;
            }
            if let PointerAction::Up(PointerButton::Left) = input.action {
                self.press = None;
            }
            return events;
        }

        if !self.in_canvas {
            self.in_canvas = true;
            emit(PointerEventType::MouseEnterCanvas, None);
        }
        if self.hover != target {
            if let Some(old) = self.hover.take() {
                emit(PointerEventType::MouseLeave, Some(old));
            }
            if target.is_some() {
                emit(PointerEventType::MouseEnter, target.clone());
            }
            self.hover.clone_from(&target);
        }

        match input.action {
            PointerAction::Move => emit(PointerEventType::MouseMove, target),
            PointerAction::Down(button) => {
                emit(PointerEventType::MouseDown, target.clone());
                match button {
                    PointerButton::Left => self.press = Some(target),
                    PointerButton::Right => emit(PointerEventType::ContextMenu, target),
                    PointerButton::Middle => {}
                }
            }
            PointerAction::Up(button) => {
                emit(PointerEventType::MouseUp, target.clone());
                if button == PointerButton::Left {
                    if let Some(pressed) = self.press.take() {
                        if pressed == target {
                            emit(PointerEventType::Click, target);
                        }
                    }
                }
            }
            PointerAction::Leave => {}
        }
        events
    }

    pub(crate) fn hover(&self) -> Option<&str> {
        self.hover.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn kinds(events: &[PointerEvent]) -> Vec<(PointerEventType, Option<&str>)> {
        events.iter().map(|e| (e.kind, e.target.as_deref())).collect()
    }

    fn name(s: &str) -> Option<String> {
        Some(s.to_owned())
    }

    use PointerEventType::*;

    #[test]
    fn first_move_enters_canvas_then_target() {
        let mut t = PointerTracker::default();
        let events = t.dispatch(PointerInput::at(PointerAction::Move, 1, 1), name("a"));
        assert_eq!(
            kinds(&events),
            vec![(MouseEnterCanvas, None), (MouseEnter, Some("a")), (MouseMove, Some("a"))]
        );
    }

    #[test]
    fn enter_and_leave_fire_only_on_change() {
        let mut t = PointerTracker::default();
        t.dispatch(PointerInput::at(PointerAction::Move, 1, 1), name("a"));

        let same = t.dispatch(PointerInput::at(PointerAction::Move, 2, 1), name("a"));
        assert_eq!(kinds(&same), vec![(MouseMove, Some("a"))]);

        let other = t.dispatch(PointerInput::at(PointerAction::Move, 3, 1), name("b"));
        assert_eq!(
            kinds(&other),
            vec![(MouseLeave, Some("a")), (MouseEnter, Some("b")), (MouseMove, Some("b"))]
        );

        let empty = t.dispatch(PointerInput::at(PointerAction::Move, 4, 1), None);
        assert_eq!(kinds(&empty), vec![(MouseLeave, Some("b")), (MouseMove, None)]);
        assert_eq!(t.hover(), None);
    }

    #[test]
    fn click_requires_same_target_on_release() {
        let mut t = PointerTracker::default();
        t.dispatch(PointerInput::at(PointerAction::Down(PointerButton::Left), 0, 0), name("a"));
        let up = t.dispatch(PointerInput::at(PointerAction::Up(PointerButton::Left), 0, 0), name("a"));
        assert_eq!(kinds(&up), vec![(MouseUp, Some("a")), (Click, Some("a"))]);

        t.dispatch(PointerInput::at(PointerAction::Down(PointerButton::Left), 0, 0), name("a"));
        let moved = t.dispatch(PointerInput::at(PointerAction::Up(PointerButton::Left), 3, 0), name("b"));
        assert_eq!(
            kinds(&moved),
            vec![(MouseLeave, Some("a")), (MouseEnter, Some("b")), (MouseUp, Some("b"))]
        );
    }

    #[test]
    fn right_press_opens_context_menu_without_click() {
        let mut t = PointerTracker::default();
        let down = t.dispatch(PointerInput::at(PointerAction::Down(PointerButton::Right), 0, 0), name("a"));
        assert_eq!(
            kinds(&down),
            vec![
                (MouseEnterCanvas, None),
                (MouseEnter, Some("a")),
                (MouseDown, Some("a")),
                (ContextMenu, Some("a"))
            ]
        );
        let up = t.dispatch(PointerInput::at(PointerAction::Up(PointerButton::Right), 0, 0), name("a"));
        assert_eq!(kinds(&up), vec![(MouseUp, Some("a"))]);
    }

    #[test]
    fn leaving_the_surface_clears_hover() {
        let mut t = PointerTracker::default();
        t.dispatch(PointerInput::at(PointerAction::Move, 0, 0), name("a"));
        let left = t.dispatch(PointerInput::new(PointerAction::Move, None), None);
        assert_eq!(kinds(&left), vec![(MouseLeave, Some("a")), (MouseLeaveCanvas, None)]);

        let back = t.dispatch(PointerInput::at(PointerAction::Move, 0, 0), name("a"));
        assert_eq!(
            kinds(&back),
            vec![(MouseEnterCanvas, None), (MouseEnter, Some("a")), (MouseMove, Some("a"))]
        );
    }
}
