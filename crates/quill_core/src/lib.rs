//! Quill Core
//!
//! Shared value types for the Quill 2D vector graphics recorder:
//!
//! - 2D points and integer rectangles
//! - 4x4 column-major transform matrices
//! - RGBA color
//! - CPU-side images and texture wrap modes

pub mod color;
pub mod image;
pub mod math;

pub use color::Color;
pub use image::{Image, WrapMode};
pub use math::{Mat4, Point, RectI};
