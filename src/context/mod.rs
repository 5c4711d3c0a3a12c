//! Owning rendering context.
//!
//! A [`RenderingContext`] attaches to caller-owned RGBA memory and wires the
//! whole pipeline once: path storage behind a curve flattener, the dash and
//! stroke generators, the rasterizer, a scanline, a span buffer and the
//! compositing renderer. Drawing calls reuse those pieces, so nothing is
//! allocated per draw once buffers have grown to the working size.
//!
//! The operations are split by concern:
//! - [`path_ops`]: building the current path
//! - [`transform`]: the world to device matrix
//! - [`gradient`]: gradient paints
//! - [`drawing`]: filling and stroking
//! - [`image_ops`]: transformed and copied images

mod drawing;
mod gradient;
mod image_ops;
mod path_ops;
mod transform;

use crate::basics::{FillingRule, RectI};
use crate::color::{Rgba8, RgbaColor};
use crate::comp_op::CompOp;
use crate::conv_curve::ConvCurve;
use crate::drawing_state::{DashPattern, DrawingState, ImageFilter, ImageResample, Paint};
use crate::error::Result;
use crate::gradient_lut::GradientLut;
use crate::image_filters::ImageFilterLut;
use crate::math_stroke::{LineCap, LineJoin};
use crate::path_storage::PathStorage;
use crate::pixfmt_rgba::{Blender, BlenderRgba, BlenderRgbaPre, PixelFormat, PixfmtRgba};
use crate::rasterizer_scanline_aa::RasterizerScanlineAa;
use crate::renderer_base::RendererBase;
use crate::rendering_buffer::RenderingBuffer;
use crate::scanline_u::ScanlineU8;
use crate::span_allocator::SpanAllocator;
use crate::vcgen_dash::VcgenDash;
use crate::vcgen_stroke::VcgenStroke;

const LOG_TARGET: &str = "agg::context";

/// Allowed anti-aliasing gamma range.
pub const GAMMA_MIN: f64 = 0.1;
pub const GAMMA_MAX: f64 = 3.0;

/// Straight-alpha RGBA context.
pub type Context<'a> = RenderingContext<'a, BlenderRgba>;
/// Premultiplied RGBA context.
pub type ContextPre<'a> = RenderingContext<'a, BlenderRgbaPre>;

/// Drawing surface over a borrowed RGBA buffer.
///
/// Colors passed in are always straight [`Rgba8`]; they are converted to
/// the buffer's storage convention at draw time. Images drawn into the
/// context must use the same convention as the buffer.
pub struct RenderingContext<'a, B: Blender> {
    ren: RendererBase<PixfmtRgba<'a, B>>,
    ras: RasterizerScanlineAa,
    sl: ScanlineU8,
    alloc: SpanAllocator<B::Color>,
    path: ConvCurve<PathStorage>,
    stroker: VcgenStroke,
    dasher: VcgenDash,
    gradient_lut: GradientLut<B::Color>,
    image_lut: Option<ImageFilterLut>,
    state: DrawingState,
}

impl<'a, B: Blender> RenderingContext<'a, B> {
    /// Attach to `buf`, a row-major buffer of `height` rows of `stride`
    /// bytes with 4 bytes per pixel. The buffer is left untouched.
    pub fn attach(buf: &'a mut [u8], width: u32, height: u32, stride: usize) -> Result<Self> {
        let rbuf = RenderingBuffer::new(buf, width, height, stride)?;
        log::debug!(target: LOG_TARGET, "attach {}x{} stride {}", width, height, stride);
        let state = DrawingState::default();
        let mut ctx = Self {
            ren: RendererBase::new(PixfmtRgba::new(rbuf)),
            ras: RasterizerScanlineAa::new(),
            sl: ScanlineU8::new(),
            alloc: SpanAllocator::new(),
            path: ConvCurve::new(PathStorage::new()),
            stroker: VcgenStroke::new(),
            dasher: VcgenDash::new(),
            gradient_lut: GradientLut::new(),
            image_lut: state.image_filter.lut(),
            state: DrawingState::default(),
        };
        ctx.apply_state(state);
        Ok(ctx)
    }

    pub fn width(&self) -> u32 {
        self.ren.width()
    }

    pub fn height(&self) -> u32 {
        self.ren.height()
    }

    /// Current configuration.
    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    /// Replace the whole configuration. Values are validated the same way
    /// the individual setters validate them.
    pub fn with_state(&mut self, state: DrawingState) -> &mut Self {
        self.apply_state(state);
        self
    }

    fn apply_state(&mut self, state: DrawingState) {
        self.state.fill = state.fill;
        self.state.line = state.line;
        self.set_line_width(state.line_width);
        self.set_line_cap(state.line_cap);
        self.set_line_join(state.line_join);
        self.set_miter_limit(state.miter_limit);
        self.set_dash_pattern(state.dash);
        self.set_fill_rule(state.fill_rule);
        self.set_blend_mode(state.comp_op);
        self.set_image_filter(state.image_filter);
        self.set_image_resample(state.image_resample);
        self.state.master_alpha = clamp_logged("master alpha", state.master_alpha, 0.0, 1.0);
        self.state.gamma = clamp_logged("gamma", state.gamma, GAMMA_MIN, GAMMA_MAX);
        self.update_cover_params();
        match state.clip_box {
            Some(cb) => self.set_clip_box(cb.x1, cb.y1, cb.x2, cb.y2),
            None => self.reset_clip_box(),
        }
        self.set_transform(state.transform);
    }

    // ========================================================================
    // Paint and stroke configuration
    // ========================================================================

    pub fn set_fill_color(&mut self, c: Rgba8) {
        self.state.fill = Paint::Solid(c);
    }

    pub fn set_line_color(&mut self, c: Rgba8) {
        self.state.line = Paint::Solid(c);
    }

    /// Remove any fill; same as a fully transparent fill color.
    pub fn no_fill(&mut self) {
        self.set_fill_color(Rgba8::TRANSPARENT);
    }

    pub fn no_line(&mut self) {
        self.set_line_color(Rgba8::TRANSPARENT);
    }

    /// Stroke width in world units. Negative or non-finite widths become 0.
    pub fn set_line_width(&mut self, w: f64) {
        let w = if w.is_finite() && w >= 0.0 {
            w
        } else {
            log::warn!(target: LOG_TARGET, "line width {} replaced by 0", w);
            0.0
        };
        self.state.line_width = w;
        self.stroker.set_width(w);
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
        self.stroker.set_line_cap(cap);
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
        self.stroker.set_line_join(join);
    }

    pub fn set_miter_limit(&mut self, limit: f64) {
        self.state.miter_limit = limit;
        self.stroker.set_miter_limit(limit);
    }

    /// Dash subsequent strokes with `(dash, gap)` pairs, starting `start`
    /// units into the pattern.
    pub fn set_dash(&mut self, pairs: &[(f64, f64)], start: f64) {
        self.set_dash_pattern(DashPattern::new(pairs, start));
    }

    pub fn remove_dash(&mut self) {
        self.set_dash_pattern(DashPattern::default());
    }

    fn set_dash_pattern(&mut self, dash: DashPattern) {
        self.dasher.remove_all_dashes();
        for &(d, g) in dash.pairs() {
            self.dasher.add_dash(d, g);
        }
        self.dasher.dash_start(dash.start());
        self.state.dash = dash;
    }

    pub fn set_fill_rule(&mut self, rule: FillingRule) {
        self.state.fill_rule = rule;
    }

    // ========================================================================
    // Compositing configuration
    // ========================================================================

    pub fn set_blend_mode(&mut self, op: CompOp) {
        self.state.comp_op = op;
        self.ren.ren_mut().set_comp_op(op);
    }

    /// Opacity applied to everything drawn, clamped to `[0, 1]`.
    pub fn set_master_alpha(&mut self, alpha: f64) {
        self.state.master_alpha = clamp_logged("master alpha", alpha, 0.0, 1.0);
        self.update_cover_params();
    }

    /// Gamma applied to anti-aliasing coverage, clamped to `[0.1, 3]`.
    pub fn set_antialias_gamma(&mut self, gamma: f64) {
        self.state.gamma = clamp_logged("gamma", gamma, GAMMA_MIN, GAMMA_MAX);
        self.update_cover_params();
    }

    fn update_cover_params(&mut self) {
        let (gamma, alpha) = (self.state.gamma, self.state.master_alpha);
        if self.ren.ren_mut().set_cover_params(gamma, alpha) {
            log::debug!(target: LOG_TARGET, "cover table gamma {} alpha {}", gamma, alpha);
        }
    }

    /// Restrict drawing to the inclusive device rectangle
    /// `(x1, y1)..=(x2, y2)`, intersected with the buffer.
    pub fn set_clip_box(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let mut cb = RectI::new(x1, y1, x2, y2);
        cb.normalize();
        if !self.ren.clip_box(cb.x1, cb.y1, cb.x2, cb.y2) {
            log::debug!(target: LOG_TARGET, "clip box {:?} is outside the buffer", cb);
        }
        self.ras.clip_box(
            cb.x1 as f64,
            cb.y1 as f64,
            cb.x2 as f64 + 1.0,
            cb.y2 as f64 + 1.0,
        );
        self.state.clip_box = Some(cb);
    }

    /// Clip to the whole buffer.
    pub fn reset_clip_box(&mut self) {
        self.ren.reset_clipping(true);
        self.ras
            .clip_box(0.0, 0.0, self.width() as f64, self.height() as f64);
        self.state.clip_box = None;
    }

    /// Effective inclusive clip box in device pixels.
    pub fn clip_box(&self) -> RectI {
        *self.ren.bounding_clip_box()
    }

    pub fn set_image_filter(&mut self, filter: ImageFilter) {
        if filter != self.state.image_filter {
            self.image_lut = filter.lut();
        }
        self.state.image_filter = filter;
    }

    pub fn set_image_resample(&mut self, policy: ImageResample) {
        self.state.image_resample = policy;
    }

    // ========================================================================
    // Direct pixel access
    // ========================================================================

    /// Fill the whole buffer with `c`, ignoring clip box and blend mode.
    pub fn clear_all(&mut self, c: Rgba8) {
        self.ren.clear(&B::Color::from_straight(c));
    }

    /// Overwrite the clip box with `c`.
    pub fn clear_clip_box(&mut self, c: Rgba8) {
        let cb = self.clip_box();
        self.ren
            .copy_bar(cb.x1, cb.y1, cb.x2, cb.y2, &B::Color::from_straight(c));
    }

    /// Straight-alpha color of the pixel at `(x, y)`, or `None` outside
    /// the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba8> {
        if x < 0 || y < 0 || x >= self.width() as i32 || y >= self.height() as i32 {
            return None;
        }
        Some(self.ren.ren().pixel(x, y).to_straight())
    }
}

fn clamp_logged(what: &str, v: f64, lo: f64, hi: f64) -> f64 {
    let c = if v.is_nan() { hi } else { v.clamp(lo, hi) };
    if c != v {
        log::warn!(target: LOG_TARGET, "{} {} clamped to {}", what, v, c);
    }
    c
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_attach_validates_layout() {
        let mut buf = vec![0u8; 10 * 10 * 4];
        assert!(Context::attach(&mut buf, 10, 10, 40).is_ok());
        assert_eq!(
            Context::attach(&mut buf, 10, 10, 30).err(),
            Some(Error::InvalidStride { stride: 30, min: 40 })
        );
        assert_eq!(
            Context::attach(&mut buf, 0, 10, 40).err(),
            Some(Error::InvalidDimensions { width: 0, height: 10 })
        );
        let mut short = vec![0u8; 100];
        assert!(matches!(
            Context::attach(&mut short, 10, 10, 40),
            Err(Error::BufferTooSmall { .. })
        ));
    }

    #[test]
    fn test_attach_leaves_buffer_untouched() {
        let mut buf = vec![7u8; 4 * 4 * 4];
        {
            let ctx = Context::attach(&mut buf, 4, 4, 16).unwrap();
            assert_eq!(ctx.pixel(0, 0), Some(Rgba8::new(7, 7, 7, 7)));
            assert_eq!(ctx.pixel(4, 0), None);
        }
        assert!(buf.iter().all(|&b| b == 7));
    }

    #[test]
    fn test_clamped_settings() {
        let mut buf = vec![0u8; 16];
        let mut ctx = Context::attach(&mut buf, 2, 2, 8).unwrap();
        ctx.set_master_alpha(1.5);
        assert_eq!(ctx.state().master_alpha, 1.0);
        ctx.set_master_alpha(-0.5);
        assert_eq!(ctx.state().master_alpha, 0.0);
        ctx.set_antialias_gamma(10.0);
        assert_eq!(ctx.state().gamma, GAMMA_MAX);
        ctx.set_antialias_gamma(0.0);
        assert_eq!(ctx.state().gamma, GAMMA_MIN);
        ctx.set_line_width(-3.0);
        assert_eq!(ctx.state().line_width, 0.0);
    }

    #[test]
    fn test_clip_box_is_intersected() {
        let mut buf = vec![0u8; 10 * 10 * 4];
        let mut ctx = Context::attach(&mut buf, 10, 10, 40).unwrap();
        ctx.set_clip_box(8, 8, 2, 2);
        assert_eq!(ctx.clip_box(), RectI::new(2, 2, 8, 8));
        ctx.set_clip_box(-5, -5, 50, 50);
        assert_eq!(ctx.clip_box(), RectI::new(0, 0, 9, 9));
        ctx.reset_clip_box();
        assert!(ctx.state().clip_box.is_none());
    }

    #[test]
    fn test_clear_clip_box() {
        let mut buf = vec![0u8; 4 * 4 * 4];
        let mut ctx = Context::attach(&mut buf, 4, 4, 16).unwrap();
        ctx.clear_all(Rgba8::WHITE);
        ctx.set_clip_box(1, 1, 2, 2);
        ctx.clear_clip_box(Rgba8::BLACK);
        assert_eq!(ctx.pixel(0, 0), Some(Rgba8::WHITE));
        assert_eq!(ctx.pixel(1, 1), Some(Rgba8::BLACK));
        assert_eq!(ctx.pixel(2, 2), Some(Rgba8::BLACK));
        assert_eq!(ctx.pixel(3, 3), Some(Rgba8::WHITE));
    }

    #[test]
    fn test_with_state_round_trips() {
        let mut buf = vec![0u8; 4 * 4 * 4];
        let mut ctx = Context::attach(&mut buf, 4, 4, 16).unwrap();
        let mut s = DrawingState::default();
        s.line_width = 3.0;
        s.comp_op = CompOp::Multiply;
        s.dash = DashPattern::new(&[(2.0, 1.0)], 0.0);
        s.clip_box = Some(RectI::new(0, 0, 1, 1));
        s.image_filter = ImageFilter::NoFilter;
        ctx.with_state(s.clone());
        assert_eq!(ctx.state(), &s);
        assert_eq!(ctx.clip_box(), RectI::new(0, 0, 1, 1));
    }

    #[test]
    fn test_premultiplied_context_pixel_is_straight() {
        let mut buf = vec![0u8; 4];
        let mut ctx = ContextPre::attach(&mut buf, 1, 1, 4).unwrap();
        ctx.clear_all(Rgba8::new(255, 0, 0, 128));
        let p = ctx.pixel(0, 0).unwrap();
        assert_eq!(p.a, 128);
        assert!(p.r >= 253, "{:?}", p);
        drop(ctx);
        assert_eq!(buf[0], 128);
    }
}
