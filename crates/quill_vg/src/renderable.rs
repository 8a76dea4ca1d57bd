//! Recorded renderables
//!
//! Each draw call materializes one [`Renderable`]: a drawable payload bound
//! to the render configuration and clip region that were current at call
//! time. Later state mutations never affect entries already recorded.

use std::sync::Arc;

use quill_core::{Color, Point, RectI};

use crate::backend::{ClipRegion, RenderConfig, TransformBinding};
use crate::font::FontHandle;
use crate::geometry::Geometry;

/// Horizontal text anchor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical text anchor
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VAlign {
    #[default]
    Bottom,
    Center,
    Top,
}

/// Text anchoring relative to its position
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextAlign {
    pub horizontal: HAlign,
    pub vertical: VAlign,
}

/// A run of text bound to a font handle
///
/// Layout and rasterization happen downstream; the recorder only carries the
/// string, its baked position, and the font that was active.
#[derive(Clone, Debug)]
pub struct TextSpan {
    pub text: String,
    pub position: Point,
    pub align: TextAlign,
    pub font: Arc<FontHandle>,
}

/// A viewport clear operation
///
/// The rectangle is in viewport coordinates and is not affected by the
/// current matrix; `None` means the whole viewport.
#[derive(Clone, Debug)]
pub struct ClearOp {
    pub color: Option<Color>,
    pub stencil: Option<i32>,
    pub rect: Option<RectI>,
}

/// Payload of a renderable
#[derive(Clone, Debug)]
pub enum Drawable {
    Shape(Geometry),
    Text(TextSpan),
    Clear(ClearOp),
}

/// One entry of the output collection
#[derive(Clone, Debug)]
pub struct Renderable {
    drawable: Drawable,
    config: Arc<RenderConfig>,
    clip: Option<Arc<ClipRegion>>,
    transform: Option<Arc<TransformBinding>>,
}

impl Renderable {
    pub fn new(drawable: Drawable, config: Arc<RenderConfig>) -> Self {
        Self {
            drawable,
            config,
            clip: None,
            transform: None,
        }
    }

    pub fn drawable(&self) -> &Drawable {
        &self.drawable
    }

    /// The shape payload, if this renderable carries one
    pub fn geometry(&self) -> Option<&Geometry> {
        match &self.drawable {
            Drawable::Shape(geometry) => Some(geometry),
            _ => None,
        }
    }

    pub fn config(&self) -> &Arc<RenderConfig> {
        &self.config
    }

    pub fn set_config(&mut self, config: Arc<RenderConfig>) {
        self.config = config;
    }

    pub fn clip(&self) -> Option<&Arc<ClipRegion>> {
        self.clip.as_ref()
    }

    pub fn set_clip(&mut self, clip: Option<Arc<ClipRegion>>) {
        self.clip = clip;
    }

    pub fn transform(&self) -> Option<&Arc<TransformBinding>> {
        self.transform.as_ref()
    }

    pub fn set_transform(&mut self, transform: Option<Arc<TransformBinding>>) {
        self.transform = transform;
    }
}
