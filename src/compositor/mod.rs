//! Compositor — the public rendering instance.
//!
//! Producers call [`Compositor::draw`] any number of times and then
//! [`Compositor::render`] once per frame. Rendering pushes the composited frame
//! to an [`OutputSink`] and starts a fresh frame.
//!
//! Names given to draws are recorded in one of two slots. The *building* slot
//! collects names for the frame being drawn; the *active* slot holds the names
//! of the frame last rendered, which is what the surface shows. Pointer input
//! always resolves against the active slot, so hit-testing matches the screen
//! even while the next frame is half drawn.

mod draw_buffer;
mod output;
mod pointer;

use std::collections::HashMap;
use std::rc::Rc;

use tracing::trace;

use crate::error::CompositorError;
use crate::sprite::Sprite;
use crate::style::Style;
use crate::types::{CellCoords, DrawId, Location};

pub use draw_buffer::{ComputedStyle, DrawBuffer, Layer, PriorityLedger, RowSegmentBuffer};
pub use output::{BindStats, OutputBuffer, OutputSink};
pub use pointer::{PointerAction, PointerButton, PointerEvent, PointerEventType, PointerInput};

use pointer::PointerTracker;

/// One of the two name-buffer slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameSlot {
    A,
    B,
}

impl FrameSlot {
    pub const fn other(self) -> Self {
        match self {
            FrameSlot::A => FrameSlot::B,
            FrameSlot::B => FrameSlot::A,
        }
    }

    const fn index(self) -> usize {
        match self {
            FrameSlot::A => 0,
            FrameSlot::B => 1,
        }
    }
}

/// Draw id -> name maps for the frame being built and the frame on screen.
#[derive(Debug)]
pub struct NameBuffers {
    slots: [HashMap<DrawId, String>; 2],
    building: FrameSlot,
}

impl Default for NameBuffers {
    fn default() -> Self {
        NameBuffers {
            slots: [HashMap::new(), HashMap::new()],
            building: FrameSlot::A,
        }
    }
}

impl NameBuffers {
    pub fn building_slot(&self) -> FrameSlot {
        self.building
    }

    pub fn active_slot(&self) -> FrameSlot {
        self.building.other()
    }

    pub fn record(&mut self, id: DrawId, name: String) {
        self.slots[self.building.index()].insert(id, name);
    }

    /// Name of `id` in the last rendered frame.
    pub fn active_name(&self, id: DrawId) -> Option<&str> {
        self.slots[self.active_slot().index()].get(&id).map(String::as_str)
    }

    /// Name of `id` in the frame being built.
    pub fn building_name(&self, id: DrawId) -> Option<&str> {
        self.slots[self.building.index()].get(&id).map(String::as_str)
    }

    /// Drop the names of the frame that is about to leave the screen and make
    /// the frame just built the active one.
    pub fn flip(&mut self) {
        self.slots[self.active_slot().index()].clear();
        self.building = self.building.other();
    }
}

/// Monotonic draw id source owned by one compositor.
#[derive(Debug, Default)]
struct IdAllocator {
    next: u64,
}

impl IdAllocator {
    fn allocate(&mut self) -> DrawId {
        let id = DrawId(self.next);
        self.next += 1;
        id
    }
}

#[derive(Debug)]
pub struct Compositor {
    width: u16,
    height: u16,
    draw_buffer: DrawBuffer,
    output: OutputBuffer,
    names: NameBuffers,
    ids: IdAllocator,
    pointer: PointerTracker,
    frames: u64,
}

impl Compositor {
    /// A compositor for a `width` x `height` grid. Cells no draw or style
    /// covers fall back to `background`.
    pub fn new(width: u16, height: u16, background: Style) -> Result<Self, CompositorError> {
        if width == 0 || height == 0 {
            return Err(CompositorError::InvalidDimensions { width, height });
        }
        let (w, h) = (usize::from(width), usize::from(height));
        Ok(Compositor {
            width,
            height,
            draw_buffer: DrawBuffer::new(w, h),
            output: OutputBuffer::new(h, background),
            names: NameBuffers::default(),
            ids: IdAllocator::default(),
            pointer: PointerTracker::default(),
            frames: 0,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn draw_buffer(&self) -> &DrawBuffer {
        &self.draw_buffer
    }

    pub fn names(&self) -> &NameBuffers {
        &self.names
    }

    /// Add `sprite` to the frame being built. Parts outside the grid are
    /// clipped. Returns the id tagging the cells this draw ends up owning.
    pub fn draw(
        &mut self,
        sprite: &Rc<Sprite>,
        location: impl Into<Location>,
        style: &Style,
        name: Option<&str>,
    ) -> DrawId {
        let location = location.into();
        let id = self.ids.allocate();
        self.draw_buffer.draw(Rc::clone(sprite), location, style, id);
        if let Some(name) = name {
            self.names.record(id, name.to_owned());
        }
        id
    }

    /// Push the frame to `sink` and start the next one.
    pub fn render(&mut self, sink: &mut impl OutputSink) -> BindStats {
        let stats = self.output.bind(&self.draw_buffer, sink);
        trace!(frame = self.frames, layers = self.draw_buffer.layer_count(), "rendered");
        self.draw_buffer.clear();
        self.names.flip();
        self.frames += 1;
        stats
    }

    /// Draw id shown at `cell` in the last rendered frame.
    pub fn id_at(&self, cell: CellCoords) -> Option<DrawId> {
        if cell.x >= self.width || cell.y >= self.height {
            return None;
        }
        self.output.tag_at(usize::from(cell.x), usize::from(cell.y))
    }

    /// Name of the draw shown at `cell` in the last rendered frame.
    pub fn target_at(&self, cell: CellCoords) -> Option<&str> {
        self.id_at(cell).and_then(|id| self.names.active_name(id))
    }

    /// Resolve `input` against the last rendered frame and return the events
    /// it causes, in dispatch order.
    pub fn dispatch_pointer(&mut self, input: PointerInput) -> Vec<PointerEvent> {
        let target = input
            .cell
            .and_then(|cell| self.target_at(cell))
            .map(str::to_owned);
        self.pointer.dispatch(input, target)
    }

    /// Name currently under the pointer.
    pub fn hover_target(&self) -> Option<&str> {
        self.pointer.hover()
    }
}
