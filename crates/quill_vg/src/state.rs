//! Drawing state
//!
//! [`DrawState`] is the full set of attributes affecting how a shape is
//! configured for drawing. It is a pure value: two states with identical
//! fields are interchangeable, hash identically, and resolve to the same
//! cached render configuration. Float fields compare and hash by bit
//! pattern; image and font references by `Arc` identity.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use quill_core::{Color, Image, WrapMode};

use crate::font::FontHandle;

/// Byte length of a 32x32 polygon stipple bitmap
pub const POLYGON_STIPPLE_BYTES: usize = 32 * 32 / 8;

/// Framebuffer logic operation applied to incoming fragments
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LogicOp {
    Clear,
    And,
    AndReverse,
    #[default]
    Copy,
    AndInverted,
    Noop,
    Xor,
    Or,
    Nor,
    Equiv,
    Invert,
    OrReverse,
    CopyInverted,
    OrInverted,
    Nand,
    Set,
}

/// Blend equation for one channel group
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BlendEquation {
    #[default]
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Blend factor for a source or destination term
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
}

/// Comparison function for alpha and stencil tests
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CompareFunc {
    Never,
    Less,
    Equal,
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    #[default]
    Always,
}

/// Stencil buffer update operation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StencilOp {
    #[default]
    Keep,
    Zero,
    Replace,
    Increment,
    IncrementWrap,
    Decrement,
    DecrementWrap,
    Invert,
}

/// Named line stipple presets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LineStipplePattern {
    /// The line is completely filled (default)
    #[default]
    Solid,
    Dot,
    Dash,
    Dash4,
    Dash8,
    DashDot,
    DashDotDot,
}

impl LineStipplePattern {
    /// The 16-bit stipple mask for this preset
    pub fn mask(&self) -> u16 {
        match self {
            LineStipplePattern::Solid => 0xFFFF,
            LineStipplePattern::Dot => 0xAAAA,
            LineStipplePattern::Dash => 0xCCCC,
            LineStipplePattern::Dash4 => 0xF0F0,
            LineStipplePattern::Dash8 => 0xFF00,
            LineStipplePattern::DashDot => 0xF840,
            LineStipplePattern::DashDotDot => 0xF888,
        }
    }
}

/// Named polygon stipple presets
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PolygonStipplePattern {
    /// The polygon is completely filled (default)
    #[default]
    Solid,
    Dot,
    Chain,
    HLine,
    VLine,
}

impl PolygonStipplePattern {
    /// The 32x32 stipple bitmap for this preset, one bit per pixel
    pub fn bitmap(&self) -> [u8; POLYGON_STIPPLE_BYTES] {
        let mut bits = [0u8; POLYGON_STIPPLE_BYTES];
        for row in 0..32 {
            let byte = match self {
                PolygonStipplePattern::Solid => 0xFF,
                PolygonStipplePattern::Dot => {
                    if row % 2 == 0 {
                        0xAA
                    } else {
                        0x55
                    }
                }
                PolygonStipplePattern::Chain => {
                    if row % 2 == 0 {
                        0xFF
                    } else {
                        0xAA
                    }
                }
                PolygonStipplePattern::HLine => {
                    if row % 2 == 0 {
                        0xFF
                    } else {
                        0x00
                    }
                }
                PolygonStipplePattern::VLine => 0xAA,
            };
            for b in &mut bits[row * 4..row * 4 + 4] {
                *b = byte;
            }
        }
        bits
    }
}

/// The complete drawing state of a canvas at one instant
///
/// Pushed and popped on the canvas state stack, and used by value as the
/// key of the render-configuration cache.
#[derive(Clone, Debug)]
pub struct DrawState {
    /// Current color; also modulates the active image
    pub color: Color,
    pub point_size: i32,
    /// Image used to texture rendered shapes
    pub image: Option<Arc<Image>>,
    pub wrap_mode: WrapMode,
    pub logic_op: LogicOp,
    pub line_width: f32,
    pub point_smoothing: bool,
    pub line_smoothing: bool,
    pub polygon_smoothing: bool,
    pub line_stipple: u16,
    pub polygon_stipple: [u8; POLYGON_STIPPLE_BYTES],
    pub blend_equation_rgb: BlendEquation,
    pub blend_equation_alpha: BlendEquation,
    pub blend_src_rgb: BlendFactor,
    pub blend_dst_rgb: BlendFactor,
    pub blend_src_alpha: BlendFactor,
    pub blend_dst_alpha: BlendFactor,
    pub alpha_func: CompareFunc,
    pub alpha_ref: f32,
    /// Active font, compared by handle identity
    pub font: Arc<FontHandle>,
    pub color_mask: [bool; 4],
    pub stencil_test_enabled: bool,
    pub stencil_mask: u32,
    pub stencil_fail_op: StencilOp,
    pub stencil_depth_fail_op: StencilOp,
    pub stencil_depth_pass_op: StencilOp,
    pub stencil_func: CompareFunc,
    pub stencil_ref: i32,
    pub stencil_func_mask: u32,
}

impl DrawState {
    /// Documented default state: white color, point size 5, no image,
    /// clamp wrapping, solid stipples, standard alpha blending, always-pass
    /// alpha/stencil functions, all-enabled color mask, stencil disabled.
    pub fn new(font: Arc<FontHandle>) -> Self {
        Self {
            color: Color::WHITE,
            point_size: 5,
            image: None,
            wrap_mode: WrapMode::Clamp,
            logic_op: LogicOp::Copy,
            line_width: 1.0,
            point_smoothing: true,
            line_smoothing: true,
            polygon_smoothing: false,
            line_stipple: 0xFFFF,
            polygon_stipple: [0xFF; POLYGON_STIPPLE_BYTES],
            blend_equation_rgb: BlendEquation::Add,
            blend_equation_alpha: BlendEquation::Add,
            blend_src_rgb: BlendFactor::SrcAlpha,
            blend_dst_rgb: BlendFactor::OneMinusSrcAlpha,
            blend_src_alpha: BlendFactor::SrcAlpha,
            blend_dst_alpha: BlendFactor::OneMinusSrcAlpha,
            alpha_func: CompareFunc::Always,
            alpha_ref: 0.0,
            font,
            color_mask: [true; 4],
            stencil_test_enabled: false,
            stencil_mask: u32::MAX,
            stencil_fail_op: StencilOp::Keep,
            stencil_depth_fail_op: StencilOp::Keep,
            stencil_depth_pass_op: StencilOp::Keep,
            stencil_func: CompareFunc::Always,
            stencil_ref: 0,
            stencil_func_mask: u32::MAX,
        }
    }
}

fn image_ptr(image: &Option<Arc<Image>>) -> *const Image {
    image.as_ref().map_or(std::ptr::null(), Arc::as_ptr)
}

impl PartialEq for DrawState {
    fn eq(&self, other: &Self) -> bool {
        self.color.to_bits() == other.color.to_bits()
            && self.point_size == other.point_size
            && image_ptr(&self.image) == image_ptr(&other.image)
            && self.wrap_mode == other.wrap_mode
            && self.logic_op == other.logic_op
            && self.line_width.to_bits() == other.line_width.to_bits()
            && self.point_smoothing == other.point_smoothing
            && self.line_smoothing == other.line_smoothing
            && self.polygon_smoothing == other.polygon_smoothing
            && self.line_stipple == other.line_stipple
            && self.polygon_stipple == other.polygon_stipple
            && self.blend_equation_rgb == other.blend_equation_rgb
            && self.blend_equation_alpha == other.blend_equation_alpha
            && self.blend_src_rgb == other.blend_src_rgb
            && self.blend_dst_rgb == other.blend_dst_rgb
            && self.blend_src_alpha == other.blend_src_alpha
            && self.blend_dst_alpha == other.blend_dst_alpha
            && self.alpha_func == other.alpha_func
            && self.alpha_ref.to_bits() == other.alpha_ref.to_bits()
            && Arc::ptr_eq(&self.font, &other.font)
            && self.color_mask == other.color_mask
            && self.stencil_test_enabled == other.stencil_test_enabled
            && self.stencil_mask == other.stencil_mask
            && self.stencil_fail_op == other.stencil_fail_op
            && self.stencil_depth_fail_op == other.stencil_depth_fail_op
            && self.stencil_depth_pass_op == other.stencil_depth_pass_op
            && self.stencil_func == other.stencil_func
            && self.stencil_ref == other.stencil_ref
            && self.stencil_func_mask == other.stencil_func_mask
    }
}

impl Eq for DrawState {}

impl Hash for DrawState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.color.to_bits().hash(state);
        self.point_size.hash(state);
        (image_ptr(&self.image) as usize).hash(state);
        self.wrap_mode.hash(state);
        self.logic_op.hash(state);
        self.line_width.to_bits().hash(state);
        self.point_smoothing.hash(state);
        self.line_smoothing.hash(state);
        self.polygon_smoothing.hash(state);
        self.line_stipple.hash(state);
        self.polygon_stipple.hash(state);
        self.blend_equation_rgb.hash(state);
        self.blend_equation_alpha.hash(state);
        self.blend_src_rgb.hash(state);
        self.blend_dst_rgb.hash(state);
        self.blend_src_alpha.hash(state);
        self.blend_dst_alpha.hash(state);
        self.alpha_func.hash(state);
        self.alpha_ref.to_bits().hash(state);
        (Arc::as_ptr(&self.font) as usize).hash(state);
        self.color_mask.hash(state);
        self.stencil_test_enabled.hash(state);
        self.stencil_mask.hash(state);
        self.stencil_fail_op.hash(state);
        self.stencil_depth_fail_op.hash(state);
        self.stencil_depth_pass_op.hash(state);
        self.stencil_func.hash(state);
        self.stencil_ref.hash(state);
        self.stencil_func_mask.hash(state);
    }
}
