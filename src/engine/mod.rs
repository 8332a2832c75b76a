//! Engine — turns a scene source into per-frame draw calls.
//!
//! The engine resolves sprite and style references once, sharing each sprite
//! between every entity that uses it, and then replays the entities alive on a
//! frame into a [`Compositor`]. It plays the part of the per-tick scheduler
//! that decides what is drawn; it never touches surfaces or pointer input.

pub mod source;

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use tracing::debug;

use crate::compositor::Compositor;
use crate::error::{CompositorError, SceneError};
use crate::sprite::Sprite;
use crate::style::Style;
use crate::types::Location;
use source::{FrameRange, Position, SceneSource};

#[derive(Debug, Clone)]
pub struct Entity {
    pub name: Option<String>,
    pub sprite: Rc<Sprite>,
    pub style: Style,
    pub position: Position,
    pub depth: i32,
    pub frames: Option<FrameRange>,
}

impl Entity {
    pub fn is_alive(&self, frame: usize) -> bool {
        self.frames.is_none_or(|r| r.contains(frame))
    }

    pub fn location(&self, frame: usize) -> Location {
        Location::new(
            self.position.x.evaluate(frame),
            self.position.y.evaluate(frame),
            self.depth,
        )
    }
}

/// A scene with every reference resolved.
#[derive(Debug, Clone)]
pub struct Scene {
    pub width: u16,
    pub height: u16,
    pub frame_count: usize,
    pub background: Style,
    pub entities: Vec<Entity>,
}

impl Scene {
    /// Read and resolve a scene file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SceneError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, SceneError> {
        let source: SceneSource = serde_json::from_str(json)?;
        Self::resolve(&source)
    }

    pub fn resolve(source: &SceneSource) -> Result<Self, SceneError> {
        let sprites: BTreeMap<&str, Rc<Sprite>> = source
            .sprites
            .iter()
            .map(|(name, s)| {
                let sprite = Sprite::with_options(s.text.as_str(), s.options.clone());
                (name.as_str(), Rc::new(sprite))
            })
            .collect();

        let entities = source
            .entities
            .iter()
            .enumerate()
            .map(|(i, e)| {
                let sprite = sprites.get(e.sprite.as_str()).ok_or_else(|| SceneError::UnknownSprite {
                    entity: i,
                    sprite: e.sprite.clone(),
                })?;
                let style = match &e.style {
                    Some(name) => source
                        .styles
                        .get(name)
                        .cloned()
                        .ok_or_else(|| SceneError::UnknownStyle {
                            entity: i,
                            style: name.clone(),
                        })?,
                    None => Style::new(),
                };
                Ok(Entity {
                    name: e.name.clone(),
                    sprite: Rc::clone(sprite),
                    style,
                    position: e.position.clone(),
                    depth: e.depth,
                    frames: e.frames,
                })
            })
            .collect::<Result<Vec<_>, SceneError>>()?;

        debug!(
            sprites = sprites.len(),
            entities = entities.len(),
            "resolved scene"
        );
        Ok(Scene {
            width: source.width,
            height: source.height,
            frame_count: source.frame_count,
            background: source.background.clone(),
            entities,
        })
    }

    /// A compositor sized for this scene.
    pub fn compositor(&self) -> Result<Compositor, CompositorError> {
        Compositor::new(self.width, self.height, self.background.clone())
    }

    /// Issue the draw calls for `frame`. Returns how many entities were drawn.
    pub fn draw_frame(&self, frame: usize, compositor: &mut Compositor) -> usize {
        let mut drawn = 0;
        for entity in self.entities.iter().filter(|e| e.is_alive(frame)) {
            compositor.draw(
                &entity.sprite,
                entity.location(frame),
                &entity.style,
                entity.name.as_deref(),
            );
            drawn += 1;
        }
        drawn
    }
}
