//! Immediate-mode 2D vector graphics recording
//!
//! This crate wraps a retained output collection behind an immediate-mode
//! drawing API. A [`Canvas`] holds the current draw state (color, texture,
//! stipples, blending, font, transform, scissor); every `draw_*`/`fill_*`
//! call snapshots that state, resolves it to shared resources through a
//! deduplicating cache, and appends one [`Renderable`] to the session
//! output.
//!
//! ```
//! use quill_vg::{Canvas, TextAlign};
//! use quill_core::Color;
//!
//! let mut canvas = Canvas::headless();
//! canvas.start_drawing();
//! canvas.set_color(Color::RED);
//! canvas.translate(50.0, 50.0);
//! canvas.fill_ellipse(0.0, 0.0, 40.0, 20.0, 64)?;
//! canvas.draw_text(0.0, 30.0, "hello", TextAlign::default());
//! canvas.end_drawing(true);
//! assert_eq!(canvas.renderables().len(), 2);
//! # Ok::<(), quill_vg::CanvasError>(())
//! ```

pub mod backend;
pub mod cache;
pub mod canvas;
pub mod error;
pub mod font;
pub mod geometry;
pub mod renderable;
pub mod state;

pub use backend::{
    BlendState, ClipRegion, ConfigDescriptor, HeadlessBackend, RenderBackend, RenderConfig,
    StencilState, TextureResource, TransformBinding,
};
pub use cache::ResourceCache;
pub use canvas::Canvas;
pub use error::{CanvasError, Result};
pub use font::{FontHandle, FontLibrary, FontProvider, FontSpec};
pub use geometry::{build_geometry, Geometry, Topology};
pub use renderable::{ClearOp, Drawable, HAlign, Renderable, TextAlign, TextSpan, VAlign};
pub use state::{
    BlendEquation, BlendFactor, CompareFunc, DrawState, LineStipplePattern, LogicOp,
    PolygonStipplePattern, StencilOp, POLYGON_STIPPLE_BYTES,
};
