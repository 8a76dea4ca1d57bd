//! Immediate-mode canvas over retained renderables
//!
//! [`Canvas`] is the drawing façade: callers mutate its current state
//! (color, stipple, blend, texture, font, transform, scissor) and issue
//! draw/fill calls; each call bakes a [`Renderable`] bound to the resources
//! resolved for the state current at that instant, and appends it to the
//! output collection. Renderables are drawn downstream in recorded order.
//!
//! A canvas is designed for exclusive use by one logical drawing session at
//! a time. It is not thread-safe, and draw calls are only meaningful between
//! [`Canvas::start_drawing`] and [`Canvas::end_drawing`]; issuing them
//! outside a session is a caller contract violation and is not guarded.

use smallvec::SmallVec;
use std::sync::Arc;

use quill_core::{Color, Image, Mat4, Point, RectI, WrapMode};

use crate::backend::{ClipRegion, HeadlessBackend, RenderBackend, RenderConfig, TransformBinding};
use crate::cache::ResourceCache;
use crate::error::Result;
use crate::font::{FontHandle, FontLibrary, FontProvider};
use crate::geometry::{build_geometry, Topology};
use crate::renderable::{ClearOp, Drawable, Renderable, TextAlign, TextSpan};
use crate::state::{
    BlendEquation, BlendFactor, CompareFunc, DrawState, LineStipplePattern, LogicOp,
    PolygonStipplePattern, StencilOp, POLYGON_STIPPLE_BYTES,
};
use crate::CanvasError;

/// The immediate-mode 2D drawing façade
pub struct Canvas {
    backend: Box<dyn RenderBackend>,
    fonts: Box<dyn FontProvider>,
    cache: ResourceCache,
    default_font: Arc<FontHandle>,
    state: DrawState,
    matrix: Mat4,
    scissor: Option<Arc<ClipRegion>>,
    state_stack: Vec<DrawState>,
    matrix_stack: Vec<Mat4>,
    scissor_stack: Vec<Option<Arc<ClipRegion>>>,
    renderables: Vec<Renderable>,
}

impl Canvas {
    pub fn new(backend: Box<dyn RenderBackend>, mut fonts: Box<dyn FontProvider>) -> Self {
        let default_font = fonts.default_font();
        Self {
            backend,
            fonts,
            cache: ResourceCache::new(),
            state: DrawState::new(default_font.clone()),
            default_font,
            matrix: Mat4::IDENTITY,
            scissor: None,
            state_stack: Vec::new(),
            matrix_stack: Vec::new(),
            scissor_stack: Vec::new(),
            renderables: Vec::new(),
        }
    }

    /// A canvas recording against descriptor-only resources
    pub fn headless() -> Self {
        Self::new(
            Box::new(HeadlessBackend::new()),
            Box::new(FontLibrary::new()),
        )
    }

    // === Session lifecycle ===

    /// Start a drawing session, erasing all previously recorded content
    pub fn start_drawing(&mut self) {
        self.clear();
    }

    /// Reset state, matrix and scissor to defaults but keep recorded
    /// renderables
    pub fn continue_drawing(&mut self) {
        self.reset_state();
        self.reset_matrix();
        self.remove_scissor();
    }

    /// End the session. With `release_cache` the shared resources built
    /// during recording are dropped; without it they stay warm for a
    /// following session.
    pub fn end_drawing(&mut self, release_cache: bool) {
        tracing::debug!(
            renderables = self.renderables.len(),
            release_cache,
            "ending drawing session"
        );
        if release_cache {
            self.cache.clear();
        }
    }

    /// Remove all recorded renderables and reset every piece of state
    pub fn clear(&mut self) {
        self.renderables.clear();
        self.reset_state();
        self.reset_matrix();
        self.remove_scissor();
    }

    // === Output collection ===

    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }

    /// Take ownership of the recorded renderables
    pub fn take_renderables(&mut self) -> Vec<Renderable> {
        std::mem::take(&mut self.renderables)
    }

    /// Bind one external transform to every renderable recorded so far
    pub fn bind_transform(&mut self, transform: &Arc<TransformBinding>) {
        for renderable in &mut self.renderables {
            renderable.set_transform(Some(transform.clone()));
        }
    }

    // === State stack ===

    /// Push the current state (including the current matrix) for a later
    /// [`Canvas::pop_state`]
    pub fn push_state(&mut self) {
        self.state_stack.push(self.state.clone());
        self.push_matrix();
    }

    pub fn pop_state(&mut self) -> Result<()> {
        // both stacks are checked before either is touched so a failed
        // call leaves state and matrix as they were
        if self.state_stack.is_empty() {
            return Err(CanvasError::EmptyStack("state"));
        }
        self.pop_matrix()?;
        if let Some(state) = self.state_stack.pop() {
            self.state = state;
        }
        Ok(())
    }

    /// Reinitialize the draw state to documented defaults and clear all
    /// three stacks
    pub fn reset_state(&mut self) {
        self.state = DrawState::new(self.default_font.clone());
        self.state_stack.clear();
        self.matrix_stack.clear();
        self.scissor_stack.clear();
    }

    pub fn state(&self) -> &DrawState {
        &self.state
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Resolve and return the configuration for the present state
    pub fn current_config(&mut self) -> Arc<RenderConfig> {
        self.cache.resolve_config(self.backend.as_mut(), &self.state)
    }

    // === Transform ===

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    pub fn set_matrix(&mut self, matrix: Mat4) {
        self.matrix = matrix;
    }

    pub fn reset_matrix(&mut self) {
        self.matrix = Mat4::IDENTITY;
    }

    /// Rotate by `degrees` around the Z axis. Transform calls compose
    /// left-to-right in issue order.
    pub fn rotate(&mut self, degrees: f32) {
        self.matrix = self.matrix.mul(&Mat4::rotation_z(degrees.to_radians()));
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.matrix = self.matrix.mul(&Mat4::translation(x, y, 0.0));
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.matrix = self.matrix.mul(&Mat4::scale(x, y, 1.0));
    }

    pub fn push_matrix(&mut self) {
        self.matrix_stack.push(self.matrix);
    }

    pub fn pop_matrix(&mut self) -> Result<()> {
        self.matrix = self
            .matrix_stack
            .pop()
            .ok_or(CanvasError::EmptyStack("matrix"))?;
        Ok(())
    }

    // === Scissor ===

    /// Activate a scissor rectangle in output-space coordinates, intersected
    /// against the currently active one (no active clip means an infinite
    /// rectangle)
    pub fn set_scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        let mut rect = RectI::new(x, y, width, height);
        if let Some(current) = &self.scissor {
            rect = rect.intersect(&current.rect());
        }
        self.scissor = Some(self.cache.resolve_clip(self.backend.as_mut(), rect));
    }

    pub fn scissor(&self) -> Option<&Arc<ClipRegion>> {
        self.scissor.as_ref()
    }

    /// Disable scissor clipping
    pub fn remove_scissor(&mut self) {
        self.scissor = None;
    }

    /// Push the active scissor and activate a new one clipped against it
    pub fn push_scissor(&mut self, x: i32, y: i32, width: i32, height: i32) {
        self.scissor_stack.push(self.scissor.clone());
        self.set_scissor(x, y, width, height);
    }

    pub fn pop_scissor(&mut self) -> Result<()> {
        self.scissor = self
            .scissor_stack
            .pop()
            .ok_or(CanvasError::EmptyStack("scissor"))?;
        Ok(())
    }

    // === Color / raster state accessors ===

    /// The current color; also modulates the active image
    pub fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    pub fn color(&self) -> Color {
        self.state.color
    }

    pub fn set_point_size(&mut self, size: i32) {
        self.state.point_size = size;
    }

    pub fn point_size(&self) -> i32 {
        self.state.point_size
    }

    /// The image used to texture rendered shapes
    pub fn set_image(&mut self, image: Option<Arc<Image>>) {
        self.state.image = image;
    }

    pub fn image(&self) -> Option<&Arc<Image>> {
        self.state.image.as_ref()
    }

    /// Utility equivalent to setting the image and taking the point size
    /// from its width
    pub fn set_point(&mut self, image: Arc<Image>) {
        self.state.point_size = image.width() as i32;
        self.state.image = Some(image);
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        self.state.wrap_mode = mode;
    }

    pub fn wrap_mode(&self) -> WrapMode {
        self.state.wrap_mode
    }

    pub fn set_logic_op(&mut self, op: LogicOp) {
        self.state.logic_op = op;
    }

    pub fn logic_op(&self) -> LogicOp {
        self.state.logic_op
    }

    pub fn set_line_width(&mut self, width: f32) {
        self.state.line_width = width;
    }

    pub fn line_width(&self) -> f32 {
        self.state.line_width
    }

    pub fn set_point_smoothing(&mut self, smooth: bool) {
        self.state.point_smoothing = smooth;
    }

    pub fn point_smoothing(&self) -> bool {
        self.state.point_smoothing
    }

    pub fn set_line_smoothing(&mut self, smooth: bool) {
        self.state.line_smoothing = smooth;
    }

    pub fn line_smoothing(&self) -> bool {
        self.state.line_smoothing
    }

    pub fn set_polygon_smoothing(&mut self, smooth: bool) {
        self.state.polygon_smoothing = smooth;
    }

    pub fn polygon_smoothing(&self) -> bool {
        self.state.polygon_smoothing
    }

    pub fn set_line_stipple(&mut self, stipple: u16) {
        self.state.line_stipple = stipple;
    }

    pub fn set_line_stipple_pattern(&mut self, pattern: LineStipplePattern) {
        self.state.line_stipple = pattern.mask();
    }

    pub fn line_stipple(&self) -> u16 {
        self.state.line_stipple
    }

    pub fn set_polygon_stipple(&mut self, stipple: [u8; POLYGON_STIPPLE_BYTES]) {
        self.state.polygon_stipple = stipple;
    }

    pub fn set_polygon_stipple_pattern(&mut self, pattern: PolygonStipplePattern) {
        self.state.polygon_stipple = pattern.bitmap();
    }

    pub fn polygon_stipple(&self) -> &[u8; POLYGON_STIPPLE_BYTES] {
        &self.state.polygon_stipple
    }

    pub fn set_alpha_func(&mut self, func: CompareFunc, reference: f32) {
        self.state.alpha_func = func;
        self.state.alpha_ref = reference;
    }

    pub fn alpha_func(&self) -> (CompareFunc, f32) {
        (self.state.alpha_func, self.state.alpha_ref)
    }

    pub fn set_blend_func(
        &mut self,
        src_rgb: BlendFactor,
        dst_rgb: BlendFactor,
        src_alpha: BlendFactor,
        dst_alpha: BlendFactor,
    ) {
        self.state.blend_src_rgb = src_rgb;
        self.state.blend_dst_rgb = dst_rgb;
        self.state.blend_src_alpha = src_alpha;
        self.state.blend_dst_alpha = dst_alpha;
    }

    pub fn blend_func(&self) -> (BlendFactor, BlendFactor, BlendFactor, BlendFactor) {
        (
            self.state.blend_src_rgb,
            self.state.blend_dst_rgb,
            self.state.blend_src_alpha,
            self.state.blend_dst_alpha,
        )
    }

    pub fn set_blend_equation(&mut self, rgb: BlendEquation, alpha: BlendEquation) {
        self.state.blend_equation_rgb = rgb;
        self.state.blend_equation_alpha = alpha;
    }

    pub fn blend_equation(&self) -> (BlendEquation, BlendEquation) {
        (
            self.state.blend_equation_rgb,
            self.state.blend_equation_alpha,
        )
    }

    pub fn set_color_mask(&mut self, r: bool, g: bool, b: bool, a: bool) {
        self.state.color_mask = [r, g, b, a];
    }

    pub fn color_mask(&self) -> [bool; 4] {
        self.state.color_mask
    }

    // === Stencil accessors ===

    pub fn set_stencil_test_enabled(&mut self, enabled: bool) {
        self.state.stencil_test_enabled = enabled;
    }

    pub fn stencil_test_enabled(&self) -> bool {
        self.state.stencil_test_enabled
    }

    pub fn set_stencil_mask(&mut self, mask: u32) {
        self.state.stencil_mask = mask;
    }

    pub fn stencil_mask(&self) -> u32 {
        self.state.stencil_mask
    }

    pub fn set_stencil_op(&mut self, fail: StencilOp, depth_fail: StencilOp, depth_pass: StencilOp) {
        self.state.stencil_fail_op = fail;
        self.state.stencil_depth_fail_op = depth_fail;
        self.state.stencil_depth_pass_op = depth_pass;
    }

    pub fn stencil_op(&self) -> (StencilOp, StencilOp, StencilOp) {
        (
            self.state.stencil_fail_op,
            self.state.stencil_depth_fail_op,
            self.state.stencil_depth_pass_op,
        )
    }

    pub fn set_stencil_func(&mut self, func: CompareFunc, reference: i32, mask: u32) {
        self.state.stencil_func = func;
        self.state.stencil_ref = reference;
        self.state.stencil_func_mask = mask;
    }

    pub fn stencil_func(&self) -> (CompareFunc, i32, u32) {
        (
            self.state.stencil_func,
            self.state.stencil_ref,
            self.state.stencil_func_mask,
        )
    }

    // === Font ===

    pub fn set_font(&mut self, family: &str, size: u32, smooth: bool) {
        self.state.font = self.fonts.acquire_font(family, size, smooth);
    }

    pub fn set_default_font(&mut self) {
        self.state.font = self.default_font.clone();
    }

    pub fn font(&self) -> &Arc<FontHandle> {
        &self.state.font
    }

    // === Draw / fill entry points ===

    pub fn draw_line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Result<&mut Renderable> {
        let pts: SmallVec<[Point; 2]> =
            SmallVec::from_buf([Point::new(x1, y1), Point::new(x2, y2)]);
        self.push_shape(&pts, Topology::Lines)
    }

    /// Draw a set of segments; `points` holds pairs of endpoints
    pub fn draw_lines(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::Lines)
    }

    pub fn draw_line_strip(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::LineStrip)
    }

    pub fn draw_line_loop(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::LineLoop)
    }

    /// Fill a convex polygon. Non-convex point sets produce an undefined
    /// shape.
    pub fn fill_polygon(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::Polygon)
    }

    /// Fill a set of triangles; `points` holds triplets of corners
    pub fn fill_triangles(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::Triangles)
    }

    pub fn fill_triangle_fan(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::TriangleFan)
    }

    pub fn fill_triangle_strip(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::TriangleStrip)
    }

    /// Fill a set of quads; `points` holds quadruplets of corners
    pub fn fill_quads(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::Quads)
    }

    pub fn fill_quad_strip(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::QuadStrip)
    }

    pub fn draw_point(&mut self, x: f32, y: f32) -> Result<&mut Renderable> {
        let pts: SmallVec<[Point; 1]> = SmallVec::from_buf([Point::new(x, y)]);
        self.push_shape(&pts, Topology::Points)
    }

    pub fn draw_points(&mut self, points: &[Point]) -> Result<&mut Renderable> {
        self.push_shape(points, Topology::Points)
    }

    /// Outline of an ellipse sampled with `segments` points.
    /// `x_axis`/`y_axis` are full axis lengths.
    pub fn draw_ellipse(
        &mut self,
        cx: f32,
        cy: f32,
        x_axis: f32,
        y_axis: f32,
        segments: usize,
    ) -> Result<&mut Renderable> {
        let pts = ellipse_points(cx, cy, x_axis, y_axis, segments);
        self.push_shape(&pts, Topology::LineLoop)
    }

    /// Filled ellipse sampled with `segments` points
    pub fn fill_ellipse(
        &mut self,
        cx: f32,
        cy: f32,
        x_axis: f32,
        y_axis: f32,
        segments: usize,
    ) -> Result<&mut Renderable> {
        let pts = ellipse_points(cx, cy, x_axis, y_axis, segments);
        self.push_shape(&pts, Topology::Polygon)
    }

    /// Outline of an axis-aligned rectangle
    pub fn draw_quad(
        &mut self,
        left: f32,
        bottom: f32,
        right: f32,
        top: f32,
    ) -> Result<&mut Renderable> {
        let pts = quad_points(left, bottom, right, top);
        self.push_shape(&pts, Topology::LineLoop)
    }

    /// Filled axis-aligned rectangle
    pub fn fill_quad(
        &mut self,
        left: f32,
        bottom: f32,
        right: f32,
        top: f32,
    ) -> Result<&mut Renderable> {
        let pts = quad_points(left, bottom, right, top);
        self.push_shape(&pts, Topology::Quads)
    }

    /// Record a text run at `(x, y)` using the active font. The current
    /// matrix affects the final position.
    pub fn draw_text(&mut self, x: f32, y: f32, text: &str, align: TextAlign) -> &mut Renderable {
        let span = TextSpan {
            text: text.to_owned(),
            position: self.matrix.transform_point(Point::new(x, y)),
            align,
            font: self.state.font.clone(),
        };
        self.push_drawable(Drawable::Text(span))
    }

    /// Clear a viewport region to a color. The rectangle is in viewport
    /// coordinates, unaffected by the current matrix; `None` clears the
    /// whole viewport.
    pub fn clear_color(&mut self, color: Color, rect: Option<RectI>) -> &mut Renderable {
        self.push_drawable(Drawable::Clear(ClearOp {
            color: Some(color),
            stencil: None,
            rect,
        }))
    }

    /// Clear a viewport region's stencil values
    pub fn clear_stencil(&mut self, value: i32, rect: Option<RectI>) -> &mut Renderable {
        self.push_drawable(Drawable::Clear(ClearOp {
            color: None,
            stencil: Some(value),
            rect,
        }))
    }

    /// Append an externally built renderable. Unless `keep_config` is set
    /// its configuration is overwritten with the one resolved from current
    /// state; `transform` is bound when given.
    pub fn draw_renderable(
        &mut self,
        mut renderable: Renderable,
        transform: Option<Arc<TransformBinding>>,
        keep_config: bool,
    ) -> &mut Renderable {
        if let Some(transform) = transform {
            renderable.set_transform(Some(transform));
        }
        if !keep_config {
            let config = self.current_config();
            renderable.set_config(config);
        }
        self.push_renderable(renderable)
    }

    /// Like [`Canvas::draw_renderable`] but appends a copy, leaving the
    /// original untouched. Useful for instancing one geometry many times.
    pub fn draw_renderable_copy(
        &mut self,
        renderable: &Renderable,
        transform: Option<Arc<TransformBinding>>,
    ) -> &mut Renderable {
        self.draw_renderable(renderable.clone(), transform, false)
    }

    // === Internal ===

    fn push_shape(&mut self, points: &[Point], topology: Topology) -> Result<&mut Renderable> {
        let texture = self.state.image.as_ref().map(|_| self.state.wrap_mode);
        let geometry = build_geometry(points, topology, &self.matrix, texture)?;
        Ok(self.push_drawable(Drawable::Shape(geometry)))
    }

    fn push_drawable(&mut self, drawable: Drawable) -> &mut Renderable {
        let config = self.cache.resolve_config(self.backend.as_mut(), &self.state);
        let mut renderable = Renderable::new(drawable, config);
        renderable.set_clip(self.scissor.clone());
        self.push_renderable(renderable)
    }

    fn push_renderable(&mut self, renderable: Renderable) -> &mut Renderable {
        let index = self.renderables.len();
        self.renderables.push(renderable);
        &mut self.renderables[index]
    }
}

fn ellipse_points(cx: f32, cy: f32, x_axis: f32, y_axis: f32, segments: usize) -> Vec<Point> {
    let mut pts = Vec::with_capacity(segments);
    for i in 0..segments {
        let angle = i as f32 / segments as f32 * std::f32::consts::TAU;
        pts.push(Point::new(
            cx + angle.cos() * x_axis * 0.5,
            cy + angle.sin() * y_axis * 0.5,
        ));
    }
    pts
}

fn quad_points(left: f32, bottom: f32, right: f32, top: f32) -> SmallVec<[Point; 4]> {
    SmallVec::from_buf([
        Point::new(left, bottom),
        Point::new(right, bottom),
        Point::new(right, top),
        Point::new(left, top),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CanvasError;

    #[test]
    fn test_state_stack_round_trip() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        let before = canvas.state().clone();
        canvas.push_state();
        canvas.push_state();
        canvas.set_color(Color::RED);
        canvas.set_line_width(4.0);
        canvas.translate(10.0, 0.0);
        canvas.pop_state().unwrap();
        canvas.pop_state().unwrap();
        assert_eq!(*canvas.state(), before);
        assert_eq!(*canvas.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_pop_empty_state_stack_fails() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        assert!(matches!(
            canvas.pop_state(),
            Err(CanvasError::EmptyStack("state"))
        ));
    }

    #[test]
    fn test_failed_pop_state_leaves_state_untouched() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        canvas.push_state();
        canvas.set_color(Color::RED);
        // drain the matrix stack so pop_state cannot restore both
        canvas.pop_matrix().unwrap();
        let before = canvas.state().clone();
        assert!(matches!(
            canvas.pop_state(),
            Err(CanvasError::EmptyStack("matrix"))
        ));
        assert_eq!(*canvas.state(), before);
        assert_eq!(canvas.color(), Color::RED);
        assert_eq!(canvas.state_stack.len(), 1);
    }

    #[test]
    fn test_failed_pop_state_leaves_matrix_untouched() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        canvas.push_matrix();
        canvas.translate(3.0, 0.0);
        let saved = *canvas.matrix();
        assert!(matches!(
            canvas.pop_state(),
            Err(CanvasError::EmptyStack("state"))
        ));
        assert_eq!(*canvas.matrix(), saved);
        assert_eq!(canvas.matrix_stack.len(), 1);
    }

    #[test]
    fn test_pop_empty_matrix_stack_fails() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        assert!(matches!(
            canvas.pop_matrix(),
            Err(CanvasError::EmptyStack("matrix"))
        ));
    }

    #[test]
    fn test_matrix_stack_round_trip() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        canvas.translate(3.0, 4.0);
        let saved = *canvas.matrix();
        canvas.push_matrix();
        canvas.rotate(45.0);
        canvas.pop_matrix().unwrap();
        assert_eq!(*canvas.matrix(), saved);
    }

    #[test]
    fn test_transform_order_is_observable() {
        let mut a = Canvas::headless();
        a.start_drawing();
        a.translate(5.0, 0.0);
        a.rotate(90.0);
        let pa = a.matrix().transform_point(Point::new(1.0, 0.0));

        let mut b = Canvas::headless();
        b.start_drawing();
        b.rotate(90.0);
        b.translate(5.0, 0.0);
        let pb = b.matrix().transform_point(Point::new(1.0, 0.0));

        // translate-then-rotate leaves the point near (5, 1),
        // rotate-then-translate near (0, 6)
        assert!((pa.x - 5.0).abs() < 1e-4 && (pa.y - 1.0).abs() < 1e-4);
        assert!(pb.x.abs() < 1e-4 && (pb.y - 6.0).abs() < 1e-4);
    }

    #[test]
    fn test_scissor_intersection() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        canvas.push_scissor(0, 0, 100, 100);
        canvas.push_scissor(50, 50, 100, 100);
        let rect = canvas.scissor().unwrap().rect();
        assert_eq!(rect, RectI::new(50, 50, 50, 50));
        canvas.pop_scissor().unwrap();
        assert_eq!(canvas.scissor().unwrap().rect(), RectI::new(0, 0, 100, 100));
        canvas.pop_scissor().unwrap();
        assert!(canvas.scissor().is_none());
    }

    #[test]
    fn test_pop_empty_scissor_stack_fails() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        assert!(matches!(
            canvas.pop_scissor(),
            Err(CanvasError::EmptyStack("scissor"))
        ));
    }

    #[test]
    fn test_scissor_identical_rects_share_a_region() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        canvas.set_scissor(0, 0, 10, 10);
        let a = canvas.scissor().unwrap().clone();
        canvas.remove_scissor();
        canvas.set_scissor(0, 0, 10, 10);
        let b = canvas.scissor().unwrap().clone();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_failed_draw_leaves_no_renderable() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        let err = canvas
            .fill_polygon(&[Point::new(0.0, 0.0), Point::new(1.0, 0.0)])
            .unwrap_err();
        assert!(matches!(err, CanvasError::InvalidGeometry { .. }));
        assert!(canvas.renderables().is_empty());
        assert_eq!(canvas.cache().config_count(), 0);
    }

    #[test]
    fn test_draw_binds_active_scissor() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        canvas.draw_line(0.0, 0.0, 1.0, 1.0).unwrap();
        canvas.set_scissor(0, 0, 10, 10);
        canvas.draw_line(0.0, 0.0, 2.0, 2.0).unwrap();
        assert!(canvas.renderables()[0].clip().is_none());
        let clip = canvas.renderables()[1].clip().unwrap();
        assert_eq!(clip.rect(), RectI::new(0, 0, 10, 10));
    }

    #[test]
    fn test_ellipse_segment_count() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        let r = canvas.draw_ellipse(0.0, 0.0, 10.0, 6.0, 32).unwrap();
        let geom = r.geometry().unwrap();
        assert_eq!(geom.topology(), Topology::LineLoop);
        assert_eq!(geom.positions().len(), 32);
    }

    #[test]
    fn test_set_point_takes_size_from_image() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        let image = Arc::new(Image::solid(16, 16, [255; 4]));
        canvas.set_point(image);
        assert_eq!(canvas.point_size(), 16);
        assert!(canvas.image().is_some());
    }

    #[test]
    fn test_set_font_dedupes_handles() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        canvas.set_font("Inter", 12, false);
        let first = canvas.font().clone();
        canvas.set_default_font();
        canvas.set_font("Inter", 12, false);
        assert!(Arc::ptr_eq(&first, canvas.font()));
    }

    #[test]
    fn test_draw_text_bakes_position() {
        let mut canvas = Canvas::headless();
        canvas.start_drawing();
        canvas.translate(100.0, 0.0);
        let r = canvas.draw_text(5.0, 5.0, "hello", TextAlign::default());
        match r.drawable() {
            Drawable::Text(span) => {
                assert_eq!(span.position, Point::new(105.0, 5.0));
                assert_eq!(span.text, "hello");
            }
            other => panic!("expected text payload, got {other:?}"),
        }
    }
}
