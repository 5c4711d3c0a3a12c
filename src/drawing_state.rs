//! Configuration carried by a rendering context.
//!
//! Everything that changes how a path turns into pixels lives here, so a
//! whole configuration can be inspected, cloned and re-applied at once.

use crate::basics::{FillingRule, RectI};
use crate::color::Rgba8;
use crate::comp_op::CompOp;
use crate::image_filters::{
    ImageFilterBicubic, ImageFilterBilinear, ImageFilterBlackman, ImageFilterCatrom,
    ImageFilterFunction, ImageFilterHanning, ImageFilterHermite, ImageFilterLut,
    ImageFilterQuadric, ImageFilterSpline16, ImageFilterSpline36,
};
use crate::math_stroke::{LineCap, LineJoin};
use crate::trans_affine::TransAffine;
use crate::vcgen_dash::MAX_DASH_PAIRS;

// ============================================================================
// Paint
// ============================================================================

/// Two-color gradient. `matrix` maps gradient space to device space; the
/// ramp runs from distance `d1` to `d2` along the gradient function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GradientPaint {
    pub c1: Rgba8,
    pub c2: Rgba8,
    pub profile: f64,
    pub matrix: TransAffine,
    pub d1: f64,
    pub d2: f64,
    pub spread: GradientSpread,
}

/// What a gradient does past the end of its ramp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientSpread {
    /// Hold the end colors.
    #[default]
    Pad,
    Repeat,
    /// Run the ramp back and forth.
    Reflect,
}

/// How a fill or a stroke is colored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Paint {
    Solid(Rgba8),
    LinearGradient(GradientPaint),
    RadialGradient(GradientPaint),
    /// Radial gradient seen from `(fx, fy)`, relative to the center in
    /// gradient space and strictly inside the radius.
    FocalGradient { gradient: GradientPaint, fx: f64, fy: f64 },
}

impl Default for Paint {
    fn default() -> Self {
        Paint::Solid(Rgba8::BLACK)
    }
}

// ============================================================================
// Images
// ============================================================================

/// Reconstruction kernel for transformed images.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ImageFilter {
    /// Nearest texel.
    NoFilter,
    #[default]
    Bilinear,
    Hanning,
    Hermite,
    Quadric,
    Bicubic,
    Catrom,
    Spline16,
    Spline36,
    /// Blackman-windowed sinc with the given radius (at least 2).
    Blackman(f64),
}

impl ImageFilter {
    /// Normalised weight table for this kernel, or `None` for [`NoFilter`](Self::NoFilter).
    pub fn lut(&self) -> Option<ImageFilterLut> {
        fn build<F: ImageFilterFunction>(f: F) -> Option<ImageFilterLut> {
            Some(ImageFilterLut::with_filter(&f, true))
        }
        match *self {
            ImageFilter::NoFilter => None,
            ImageFilter::Bilinear => build(ImageFilterBilinear),
            ImageFilter::Hanning => build(ImageFilterHanning),
            ImageFilter::Hermite => build(ImageFilterHermite),
            ImageFilter::Quadric => build(ImageFilterQuadric),
            ImageFilter::Bicubic => build(ImageFilterBicubic),
            ImageFilter::Catrom => build(ImageFilterCatrom),
            ImageFilter::Spline16 => build(ImageFilterSpline16),
            ImageFilter::Spline36 => build(ImageFilterSpline36),
            ImageFilter::Blackman(r) => build(ImageFilterBlackman::new(r)),
        }
    }
}

/// When images are drawn with a minification-aware kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageResample {
    #[default]
    NoResample,
    Always,
    /// Only when the image is drawn noticeably smaller than its source.
    OnZoomOut,
}

// ============================================================================
// Paths
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DrawPathFlag {
    FillOnly,
    StrokeOnly,
    #[default]
    FillAndStroke,
    /// Fill the path with the line paint.
    FillWithLineColor,
}

/// `(dash, gap)` lengths in world units, starting `start` units into the
/// pattern. At most 16 pairs; pairs with a negative or non-finite length
/// are dropped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashPattern {
    pairs: Vec<(f64, f64)>,
    start: f64,
}

impl DashPattern {
    pub fn new(pairs: &[(f64, f64)], start: f64) -> Self {
        let valid = |v: f64| v.is_finite() && v >= 0.0;
        let pairs = pairs
            .iter()
            .copied()
            .filter(|&(d, g)| valid(d) && valid(g))
            .take(MAX_DASH_PAIRS)
            .collect();
        Self {
            pairs,
            start: if start.is_finite() { start } else { 0.0 },
        }
    }

    pub fn pairs(&self) -> &[(f64, f64)] {
        &self.pairs
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    /// Whether the pattern breaks the line at all. A pattern whose total
    /// length is zero draws as a solid line.
    pub fn is_dashed(&self) -> bool {
        self.pairs.iter().map(|&(d, g)| d + g).sum::<f64>() > 0.0
    }
}

// ============================================================================
// DrawingState
// ============================================================================

/// Defaults: black fill and line, width 1, butt caps, miter joins with
/// limit 4, solid lines, non-zero winding, `CompOp::Alpha`, master alpha
/// 1, gamma 1, bilinear images without resampling, padded gradients, no clip box (the whole
/// buffer) and the identity transform.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawingState {
    pub fill: Paint,
    pub line: Paint,
    pub line_width: f64,
    pub line_cap: LineCap,
    pub line_join: LineJoin,
    pub miter_limit: f64,
    pub dash: DashPattern,
    pub fill_rule: FillingRule,
    pub comp_op: CompOp,
    /// In `[0, 1]`.
    pub master_alpha: f64,
    /// Anti-aliasing gamma in `[0.1, 3]`.
    pub gamma: f64,
    /// Inclusive device-pixel clip box; `None` is the whole buffer.
    pub clip_box: Option<RectI>,
    pub image_filter: ImageFilter,
    pub image_resample: ImageResample,
    /// Captured by gradients when they are set.
    pub gradient_spread: GradientSpread,
    /// World to device.
    pub transform: TransAffine,
}

impl Default for DrawingState {
    fn default() -> Self {
        Self {
            fill: Paint::default(),
            line: Paint::default(),
            line_width: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            miter_limit: 4.0,
            dash: DashPattern::default(),
            fill_rule: FillingRule::NonZero,
            comp_op: CompOp::Alpha,
            master_alpha: 1.0,
            gamma: 1.0,
            clip_box: None,
            image_filter: ImageFilter::Bilinear,
            image_resample: ImageResample::NoResample,
            gradient_spread: GradientSpread::Pad,
            transform: TransAffine::new(),
        }
    }
}
