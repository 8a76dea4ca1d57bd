//! Backend seam and shared rendering resources
//!
//! The recorder never draws. It translates draw state into descriptors and
//! asks a [`RenderBackend`] to turn them into shared resources: a
//! [`RenderConfig`] per distinct state, a [`TextureResource`] per
//! (image, wrap mode) pair, a [`ClipRegion`] per scissor rectangle. Cached
//! resources are logically immutable once created and are aliased by many
//! renderables; callers must never mutate one in place.

use std::sync::Arc;

use quill_core::{Color, Image, Mat4, RectI, WrapMode};

use crate::font::FontHandle;
use crate::state::{
    BlendEquation, BlendFactor, CompareFunc, DrawState, LogicOp, StencilOp, POLYGON_STIPPLE_BYTES,
};

/// Blend settings of a resolved configuration
#[derive(Clone, Copy, Debug)]
pub struct BlendState {
    pub equation_rgb: BlendEquation,
    pub equation_alpha: BlendEquation,
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

/// Stencil settings of a resolved configuration
#[derive(Clone, Copy, Debug)]
pub struct StencilState {
    pub write_mask: u32,
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub depth_pass_op: StencilOp,
    pub function: CompareFunc,
    pub reference: i32,
    pub function_mask: u32,
}

/// Everything a backend needs to build one render configuration
///
/// Built from a [`DrawState`] snapshot with the texture already resolved;
/// the backend sees no raw images.
#[derive(Clone, Debug)]
pub struct ConfigDescriptor {
    pub color: Color,
    pub point_size: i32,
    pub texture: Option<Arc<TextureResource>>,
    pub logic_op: LogicOp,
    pub line_width: f32,
    pub point_smoothing: bool,
    pub line_smoothing: bool,
    pub polygon_smoothing: bool,
    pub line_stipple: u16,
    pub polygon_stipple: [u8; POLYGON_STIPPLE_BYTES],
    pub blend: BlendState,
    pub alpha_func: CompareFunc,
    pub alpha_ref: f32,
    pub color_mask: [bool; 4],
    /// Present only when the stencil test is enabled
    pub stencil: Option<StencilState>,
    pub font: Arc<FontHandle>,
}

impl ConfigDescriptor {
    /// Translate a draw state snapshot into a backend request
    pub fn from_state(state: &DrawState, texture: Option<Arc<TextureResource>>) -> Self {
        Self {
            color: state.color,
            point_size: state.point_size,
            texture,
            logic_op: state.logic_op,
            line_width: state.line_width,
            point_smoothing: state.point_smoothing,
            line_smoothing: state.line_smoothing,
            polygon_smoothing: state.polygon_smoothing,
            line_stipple: state.line_stipple,
            polygon_stipple: state.polygon_stipple,
            blend: BlendState {
                equation_rgb: state.blend_equation_rgb,
                equation_alpha: state.blend_equation_alpha,
                src_rgb: state.blend_src_rgb,
                dst_rgb: state.blend_dst_rgb,
                src_alpha: state.blend_src_alpha,
                dst_alpha: state.blend_dst_alpha,
            },
            alpha_func: state.alpha_func,
            alpha_ref: state.alpha_ref,
            color_mask: state.color_mask,
            stencil: state.stencil_test_enabled.then(|| StencilState {
                write_mask: state.stencil_mask,
                fail_op: state.stencil_fail_op,
                depth_fail_op: state.stencil_depth_fail_op,
                depth_pass_op: state.stencil_depth_pass_op,
                function: state.stencil_func,
                reference: state.stencil_ref,
                function_mask: state.stencil_func_mask,
            }),
            font: state.font.clone(),
        }
    }
}

/// Backend-resolved rendering configuration
#[derive(Debug)]
pub struct RenderConfig {
    id: u64,
    desc: ConfigDescriptor,
}

impl RenderConfig {
    pub fn new(id: u64, desc: ConfigDescriptor) -> Self {
        Self { id, desc }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn descriptor(&self) -> &ConfigDescriptor {
        &self.desc
    }
}

/// Backend-resolved texture
#[derive(Debug)]
pub struct TextureResource {
    id: u64,
    image: Arc<Image>,
    wrap: WrapMode,
}

impl TextureResource {
    pub fn new(id: u64, image: Arc<Image>, wrap: WrapMode) -> Self {
        Self { id, image, wrap }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn image(&self) -> &Arc<Image> {
        &self.image
    }

    pub fn wrap(&self) -> WrapMode {
        self.wrap
    }
}

/// Backend-resolved scissor region
#[derive(Debug)]
pub struct ClipRegion {
    id: u64,
    rect: RectI,
}

impl ClipRegion {
    pub fn new(id: u64, rect: RectI) -> Self {
        Self { id, rect }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn rect(&self) -> RectI {
        self.rect
    }
}

/// External transform node a caller can bind to recorded renderables
#[derive(Clone, Debug, Default)]
pub struct TransformBinding {
    matrix: Mat4,
}

impl TransformBinding {
    pub fn new(matrix: Mat4) -> Self {
        Self { matrix }
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }
}

/// Constructs shared rendering resources from recorder descriptors
pub trait RenderBackend {
    fn create_config(&mut self, desc: ConfigDescriptor) -> Arc<RenderConfig>;

    fn create_texture(&mut self, image: &Arc<Image>, wrap: WrapMode) -> Arc<TextureResource>;

    fn create_clip(&mut self, rect: RectI) -> Arc<ClipRegion>;
}

/// Descriptor-only backend
///
/// Builds resources that carry their descriptors and a monotonic id but no
/// device state. Used by tests and as the default for headless recording.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_config(&mut self, desc: ConfigDescriptor) -> Arc<RenderConfig> {
        Arc::new(RenderConfig::new(self.next_id(), desc))
    }

    fn create_texture(&mut self, image: &Arc<Image>, wrap: WrapMode) -> Arc<TextureResource> {
        Arc::new(TextureResource::new(self.next_id(), image.clone(), wrap))
    }

    fn create_clip(&mut self, rect: RectI) -> Arc<ClipRegion> {
        Arc::new(ClipRegion::new(self.next_id(), rect))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::FontSpec;

    fn test_state() -> DrawState {
        DrawState::new(Arc::new(FontHandle::new(FontSpec {
            family: "monospace".into(),
            size: 10,
            smooth: false,
        })))
    }

    #[test]
    fn test_stencil_absent_when_disabled() {
        let desc = ConfigDescriptor::from_state(&test_state(), None);
        assert!(desc.stencil.is_none());
    }

    #[test]
    fn test_stencil_present_when_enabled() {
        let mut state = test_state();
        state.stencil_test_enabled = true;
        state.stencil_ref = 7;
        let desc = ConfigDescriptor::from_state(&state, None);
        let stencil = desc.stencil.expect("stencil state");
        assert_eq!(stencil.reference, 7);
    }

    #[test]
    fn test_headless_ids_are_monotonic() {
        let mut backend = HeadlessBackend::new();
        let a = backend.create_clip(RectI::new(0, 0, 1, 1));
        let b = backend.create_clip(RectI::new(0, 0, 2, 2));
        assert!(b.id() > a.id());
    }
}
