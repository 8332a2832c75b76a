//! Output surfaces implementing [`OutputSink`](crate::compositor::OutputSink).
//!
//! - [`MemorySurface`] keeps handles in memory; used for snapshots and tests.
//! - [`TerminalSurface`] queues changed handles to a terminal via crossterm.

mod memory;
mod terminal;

pub use memory::MemorySurface;
pub use terminal::{TerminalSurface, to_content_style, to_ct_color};
