//! Error types for the compositor and the scene driver.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised when a compositor cannot be initialized.
#[derive(Debug, Error)]
pub enum CompositorError {
    /// The grid must be at least one cell wide and one cell high.
    #[error("invalid grid dimensions {width}x{height}: both must be positive")]
    InvalidDimensions { width: u16, height: u16 },
}

/// Errors that can occur while loading or resolving a scene file.
#[derive(Debug, Error)]
pub enum SceneError {
    /// The scene file could not be read.
    #[error("failed to read scene {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The scene file is not valid JSON for the scene format.
    #[error("failed to parse scene: {0}")]
    Json(#[from] serde_json::Error),

    /// An entity references a sprite that is not defined in `sprites`.
    #[error("entity {entity} references unknown sprite `{sprite}`")]
    UnknownSprite { entity: usize, sprite: String },

    /// An entity references a style that is not defined in `styles`.
    #[error("entity {entity} references unknown style `{style}`")]
    UnknownStyle { entity: usize, style: String },

    /// The scene's grid is unusable.
    #[error(transparent)]
    Compositor(#[from] CompositorError),
}
