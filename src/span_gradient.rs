//! Gradient span generator and gradient shape functions.
//!
//! A [`GradientFunction`] maps a point in gradient space (1/16-pixel units)
//! to a distance; [`SpanGradient`] maps each device pixel into gradient
//! space, measures it, clamps to `[d1, d2]` and reads the color ramp.

use crate::basics::{iround, uround};
use crate::gradient_lut::ColorFunction;
use crate::renderer_scanline::SpanGenerator;
use crate::span_interpolator_linear::{SpanInterpolatorLinear, SUBPIXEL_SHIFT};

pub const GRADIENT_SUBPIXEL_SHIFT: u32 = 4;
pub const GRADIENT_SUBPIXEL_SCALE: i32 = 1 << GRADIENT_SUBPIXEL_SHIFT;

const DOWNSCALE_SHIFT: u32 = SUBPIXEL_SHIFT - GRADIENT_SUBPIXEL_SHIFT;

// ============================================================================
// Gradient functions
// ============================================================================

/// Distance of `(x, y)` along the gradient. `d` is the far end of the
/// gradient range, for shapes that wrap or normalise against it.
pub trait GradientFunction {
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32;
}

/// Linear along x.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientX;

impl GradientFunction for GradientX {
    #[inline]
    fn calculate(&self, x: i32, _y: i32, _d: i32) -> i32 {
        x
    }
}

/// Euclidean distance from the origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRadial;

impl GradientFunction for GradientRadial {
    #[inline]
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let (x, y) = (x as f64, y as f64);
        uround((x * x + y * y).sqrt()) as i32
    }
}

/// Radial gradient of radius `r` seen from a focal point `(fx, fy)`
/// relative to its center.
#[derive(Debug, Clone, Copy)]
pub struct GradientRadialFocus {
    r: i32,
    fx: i32,
    fy: i32,
    r2: f64,
    mul: f64,
}

impl GradientRadialFocus {
    pub fn new(r: f64, fx: f64, fy: f64) -> Self {
        let sub = |v: f64| iround(v * GRADIENT_SUBPIXEL_SCALE as f64);
        let mut g = Self {
            r: sub(r),
            fx: sub(fx),
            fy: sub(fy),
            r2: 0.0,
            mul: 0.0,
        };
        g.update_values();
        g
    }

    pub fn radius(&self) -> f64 {
        self.r as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn focus_x(&self) -> f64 {
        self.fx as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn focus_y(&self) -> f64 {
        self.fy as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    fn update_values(&mut self) {
        self.r2 = self.r as f64 * self.r as f64;
        let mut d = self.r2 - self.focus_sq();
        // A focus on the circle makes the divisor vanish; pull it one
        // subpixel toward the center.
        if d == 0.0 {
            self.fx -= self.fx.signum();
            self.fy -= self.fy.signum();
            d = self.r2 - self.focus_sq();
        }
        self.mul = if d == 0.0 { 0.0 } else { self.r as f64 / d };
    }

    fn focus_sq(&self) -> f64 {
        let (fx, fy) = (self.fx as f64, self.fy as f64);
        fx * fx + fy * fy
    }
}

impl GradientFunction for GradientRadialFocus {
    fn calculate(&self, x: i32, y: i32, _d: i32) -> i32 {
        let (fx, fy) = (self.fx as f64, self.fy as f64);
        let dx = x as f64 - fx;
        let dy = y as f64 - fy;
        let d2 = dx * fy - dy * fx;
        let d3 = self.r2 * (dx * dx + dy * dy) - d2 * d2;
        iround((dx * fx + dy * fy + d3.abs().sqrt()) * self.mul)
    }
}

/// Repeats the wrapped gradient with period `d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientRepeatAdaptor<G>(pub G);

impl<G: GradientFunction> GradientFunction for GradientRepeatAdaptor<G> {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        let v = self.0.calculate(x, y, d);
        if d <= 0 {
            return v;
        }
        v.rem_euclid(d)
    }
}

/// Mirrors the wrapped gradient back and forth with period `2 * d`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GradientReflectAdaptor<G>(pub G);

impl<G: GradientFunction> GradientFunction for GradientReflectAdaptor<G> {
    #[inline]
    fn calculate(&self, x: i32, y: i32, d: i32) -> i32 {
        let v = self.0.calculate(x, y, d);
        if d <= 0 {
            return v;
        }
        let d2 = d.saturating_mul(2);
        let v = v.rem_euclid(d2);
        if v >= d {
            d2 - v
        } else {
            v
        }
    }
}

// ============================================================================
// SpanGradient
// ============================================================================

/// `interpolator` maps device space to gradient space; `d1`/`d2` are the
/// gradient-space distances of the first and last ramp entries.
pub struct SpanGradient<'a, G, F> {
    interpolator: SpanInterpolatorLinear,
    gradient_function: G,
    color_function: &'a F,
    d1: i32,
    d2: i32,
}

impl<'a, G: GradientFunction, F: ColorFunction> SpanGradient<'a, G, F> {
    pub fn new(
        interpolator: SpanInterpolatorLinear,
        gradient_function: G,
        color_function: &'a F,
        d1: f64,
        d2: f64,
    ) -> Self {
        Self {
            interpolator,
            gradient_function,
            color_function,
            d1: iround(d1 * GRADIENT_SUBPIXEL_SCALE as f64),
            d2: iround(d2 * GRADIENT_SUBPIXEL_SCALE as f64),
        }
    }

    pub fn interpolator_mut(&mut self) -> &mut SpanInterpolatorLinear {
        &mut self.interpolator
    }

    pub fn d1(&self) -> f64 {
        self.d1 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }

    pub fn d2(&self) -> f64 {
        self.d2 as f64 / GRADIENT_SUBPIXEL_SCALE as f64
    }
}

impl<'a, G, F> SpanGenerator for SpanGradient<'a, G, F>
where
    G: GradientFunction,
    F: ColorFunction,
{
    type Color = F::Color;

    fn generate(&mut self, span: &mut [F::Color], x: i32, y: i32) {
        let dd = (self.d2 as i64 - self.d1 as i64).max(1);
        let size = self.color_function.size() as i64;
        self.interpolator
            .begin(x as f64 + 0.5, y as f64 + 0.5, span.len() as u32);
        for pixel in span.iter_mut() {
            let (ix, iy) = self.interpolator.coordinates();
            let d = self
                .gradient_function
                .calculate(ix >> DOWNSCALE_SHIFT, iy >> DOWNSCALE_SHIFT, self.d2);
            let index = ((d as i64 - self.d1 as i64) * size / dd).clamp(0, size - 1);
            *pixel = self.color_function.get(index as usize);
            self.interpolator.next();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
