//! State shared by the image span generators.
//!
//! Every image generator reads texels through an [`ImageAccessorClip`],
//! maps device pixels into image space with a [`SpanInterpolatorLinear`]
//! and optionally weights taps with an [`ImageFilterLut`]. The resampling
//! generator additionally widens its kernel when the image is minified;
//! [`SpanImageResampleAffine`] works out by how much.

use crate::basics::uround;
use crate::image_accessors::ImageAccessorClip;
use crate::image_filters::{ImageFilterLut, IMAGE_SUBPIXEL_SCALE};
use crate::span_interpolator_linear::SpanInterpolatorLinear;
use crate::trans_affine::TransAffine;

// ============================================================================
// SpanImageFilter
// ============================================================================

/// Source, interpolator, kernel and sampling offset of an image generator.
///
/// The offset shifts sample points before filtering; the default of half a
/// pixel puts kernels on texel centers.
pub struct SpanImageFilter<'a> {
    source: ImageAccessorClip<'a>,
    interpolator: SpanInterpolatorLinear,
    filter: Option<&'a ImageFilterLut>,
    dx: f64,
    dy: f64,
    dx_int: i32,
    dy_int: i32,
}

impl<'a> SpanImageFilter<'a> {
    pub fn new(
        source: ImageAccessorClip<'a>,
        interpolator: SpanInterpolatorLinear,
        filter: Option<&'a ImageFilterLut>,
    ) -> Self {
        let mut s = Self {
            source,
            interpolator,
            filter,
            dx: 0.0,
            dy: 0.0,
            dx_int: 0,
            dy_int: 0,
        };
        s.set_filter_offset(0.5, 0.5);
        s
    }

    pub fn source(&self) -> &ImageAccessorClip<'a> {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut ImageAccessorClip<'a> {
        &mut self.source
    }

    pub fn interpolator(&self) -> &SpanInterpolatorLinear {
        &self.interpolator
    }

    pub fn interpolator_mut(&mut self) -> &mut SpanInterpolatorLinear {
        &mut self.interpolator
    }

    pub fn filter(&self) -> Option<&'a ImageFilterLut> {
        self.filter
    }

    pub fn set_filter(&mut self, filter: &'a ImageFilterLut) {
        self.filter = Some(filter);
    }

    pub fn set_filter_offset(&mut self, dx: f64, dy: f64) {
        self.dx = dx;
        self.dy = dy;
        self.dx_int = uround(dx * IMAGE_SUBPIXEL_SCALE as f64) as i32;
        self.dy_int = uround(dy * IMAGE_SUBPIXEL_SCALE as f64) as i32;
    }

    pub fn filter_dx(&self) -> f64 {
        self.dx
    }

    pub fn filter_dy(&self) -> f64 {
        self.dy
    }

    /// Offsets in 1/256 pixel.
    pub fn filter_dx_int(&self) -> i32 {
        self.dx_int
    }

    pub fn filter_dy_int(&self) -> i32 {
        self.dy_int
    }

    /// Start interpolating a run of `len` pixels on row `y`.
    #[inline]
    pub fn begin(&mut self, x: i32, y: i32, len: usize) {
        self.interpolator
            .begin(x as f64 + self.dx, y as f64 + self.dy, len as u32);
    }

    /// Split borrow used by the per-pixel loops.
    #[inline]
    pub(crate) fn parts(&mut self) -> (&mut ImageAccessorClip<'a>, &mut SpanInterpolatorLinear) {
        (&mut self.source, &mut self.interpolator)
    }
}

// ============================================================================
// SpanImageResampleAffine
// ============================================================================

/// Kernel widening for affine resampling.
///
/// When the image→device transform shrinks the image, a fixed-size kernel
/// would skip texels and alias. [`prepare`](Self::prepare) reads the
/// transform's per-axis scale once per draw and stretches the kernel by it,
/// limited to `scale_limit` and multiplied by the blur factors.
#[derive(Debug, Clone, Copy)]
pub struct SpanImageResampleAffine {
    scale_limit: f64,
    blur_x: f64,
    blur_y: f64,
    rx: i32,
    ry: i32,
    rx_inv: i32,
    ry_inv: i32,
}

impl Default for SpanImageResampleAffine {
    fn default() -> Self {
        let one = IMAGE_SUBPIXEL_SCALE as i32;
        Self {
            scale_limit: 200.0,
            blur_x: 1.0,
            blur_y: 1.0,
            rx: one,
            ry: one,
            rx_inv: one,
            ry_inv: one,
        }
    }
}

impl SpanImageResampleAffine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scale_limit(&self) -> f64 {
        self.scale_limit
    }

    pub fn set_scale_limit(&mut self, v: f64) {
        self.scale_limit = v.max(1.0);
    }

    pub fn blur_x(&self) -> f64 {
        self.blur_x
    }

    pub fn blur_y(&self) -> f64 {
        self.blur_y
    }

    pub fn set_blur(&mut self, bx: f64, by: f64) {
        self.blur_x = bx;
        self.blur_y = by;
    }

    /// Kernel scale per axis in 1/256 units.
    pub fn radii(&self) -> (i32, i32) {
        (self.rx, self.ry)
    }

    /// Reciprocal kernel scale per axis in 1/256 units.
    pub fn radii_inv(&self) -> (i32, i32) {
        (self.rx_inv, self.ry_inv)
    }

    /// Derive the kernel scale from `trans`, which maps device space to
    /// image space.
    pub fn prepare(&mut self, trans: &TransAffine) {
        let (mut sx, mut sy) = trans.scaling();
        if !sx.is_finite() || !sy.is_finite() {
            sx = 1.0;
            sy = 1.0;
        }
        let area = sx * sy;
        if area > self.scale_limit {
            sx = sx * self.scale_limit / area;
            sy = sy * self.scale_limit / area;
        }
        let limit = self.scale_limit;
        let sx = (sx.clamp(1.0, limit) * self.blur_x).max(1.0);
        let sy = (sy.clamp(1.0, limit) * self.blur_y).max(1.0);

        let sub = IMAGE_SUBPIXEL_SCALE as f64;
        self.rx = uround(sx * sub) as i32;
        self.ry = uround(sy * sub) as i32;
        self.rx_inv = uround(sub / sx) as i32;
        self.ry_inv = uround(sub / sy) as i32;
    }
}

// ============================================================================
// Tests
// ============================================================================
