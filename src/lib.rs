//! Layered text-sprite compositor.
//!
//! Many z-ordered sprites are merged per grid row into coalesced character
//! runs, bound to a persistent output surface with minimal churn, and pointer
//! input on that surface is routed back to the named draw that shows the
//! topmost character.
//!
//! - [`sprite`] and [`style`]: the value types producers draw with.
//! - [`compositor`]: the draw buffer, output binding and pointer dispatch.
//! - [`surface`]: in-memory and terminal output surfaces.
//! - [`engine`], [`player`]: the scene driver and terminal player.

pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod menubar;
pub mod player;
pub mod sprite;
pub mod style;
pub mod surface;
pub mod types;

pub use compositor::Compositor;
pub use error::{CompositorError, SceneError};
pub use sprite::{Sprite, SpriteOptions};
pub use style::{Style, StyleProperty, StyleValue};
pub use types::{CellCoords, Color, DrawId, Location, NamedColor};
