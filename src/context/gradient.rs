//! Two-color gradient paints.
//!
//! Geometry is given in world units and frozen together with the transform
//! and spread current at the call, so later changes do not move an already
//! configured gradient.

use super::{RenderingContext, LOG_TARGET};
use crate::color::Rgba8;
use crate::drawing_state::{GradientPaint, GradientSpread, Paint};
use crate::pixfmt_rgba::Blender;
use crate::trans_affine::TransAffine;

/// How far inside the radius a focal point is pulled when it lies on or
/// outside the circle.
const FOCUS_LIMIT: f64 = 0.99;

impl<'a, B: Blender> RenderingContext<'a, B> {
    fn gradient(&self, matrix: TransAffine, c1: Rgba8, c2: Rgba8, profile: f64, d2: f64) -> GradientPaint {
        GradientPaint {
            c1,
            c2,
            profile,
            matrix,
            d1: 0.0,
            d2,
            spread: self.state.gradient_spread,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn linear_paint(&self, x1: f64, y1: f64, x2: f64, y2: f64, c1: Rgba8, c2: Rgba8, profile: f64) -> Paint {
        let (dx, dy) = (x2 - x1, y2 - y1);
        let len = (dx * dx + dy * dy).sqrt();
        if len == 0.0 {
            log::debug!(target: LOG_TARGET, "zero-length linear gradient at ({}, {})", x1, y1);
        }
        let mut matrix = TransAffine::new_rotation(dy.atan2(dx));
        matrix.multiply(&TransAffine::new_translation(x1, y1));
        matrix.multiply(&self.state.transform);
        Paint::LinearGradient(self.gradient(matrix, c1, c2, profile, len))
    }

    fn radial_gradient(&self, x: f64, y: f64, r: f64, c1: Rgba8, c2: Rgba8, profile: f64) -> GradientPaint {
        if r <= 0.0 {
            log::debug!(target: LOG_TARGET, "radial gradient with radius {}", r);
        }
        let mut matrix = TransAffine::new_translation(x, y);
        matrix.multiply(&self.state.transform);
        self.gradient(matrix, c1, c2, profile, r.max(0.0))
    }

    #[allow(clippy::too_many_arguments)]
    fn focal_paint(&self, x: f64, y: f64, r: f64, fx: f64, fy: f64, c1: Rgba8, c2: Rgba8, profile: f64) -> Paint {
        let gradient = self.radial_gradient(x, y, r, c1, c2, profile);
        let (mut fx, mut fy) = (fx - x, fy - y);
        let dist = (fx * fx + fy * fy).sqrt();
        let limit = gradient.d2 * FOCUS_LIMIT;
        if dist > limit {
            log::debug!(target: LOG_TARGET, "focal point {} from center pulled inside radius {}", dist, r);
            let k = limit / dist;
            fx *= k;
            fy *= k;
        }
        Paint::FocalGradient { gradient, fx, fy }
    }

    /// Spread used by gradients set after this call.
    pub fn set_gradient_spread(&mut self, spread: GradientSpread) {
        self.state.gradient_spread = spread;
    }

    /// Fill with a ramp from `c1` at `(x1, y1)` to `c2` at `(x2, y2)`,
    /// constant along lines perpendicular to the axis. `profile` in
    /// `(0, 1)` moves the midpoint of the ramp; 1 is linear.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_linear_gradient(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, c1: Rgba8, c2: Rgba8, profile: f64) {
        self.state.fill = self.linear_paint(x1, y1, x2, y2, c1, c2, profile);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn line_linear_gradient(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, c1: Rgba8, c2: Rgba8, profile: f64) {
        self.state.line = self.linear_paint(x1, y1, x2, y2, c1, c2, profile);
    }

    /// Fill with a ramp from `c1` at `(x, y)` to `c2` at distance `r`.
    pub fn fill_radial_gradient(&mut self, x: f64, y: f64, r: f64, c1: Rgba8, c2: Rgba8, profile: f64) {
        self.state.fill = Paint::RadialGradient(self.radial_gradient(x, y, r, c1, c2, profile));
    }

    pub fn line_radial_gradient(&mut self, x: f64, y: f64, r: f64, c1: Rgba8, c2: Rgba8, profile: f64) {
        self.state.line = Paint::RadialGradient(self.radial_gradient(x, y, r, c1, c2, profile));
    }

    /// Radial ramp whose `c1` end sits at the focal point `(fx, fy)`
    /// instead of the center. A focus on or outside the circle is moved
    /// just inside it.
    #[allow(clippy::too_many_arguments)]
    pub fn fill_focal_gradient(&mut self, x: f64, y: f64, r: f64, fx: f64, fy: f64, c1: Rgba8, c2: Rgba8, profile: f64) {
        self.state.fill = self.focal_paint(x, y, r, fx, fy, c1, c2, profile);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn line_focal_gradient(&mut self, x: f64, y: f64, r: f64, fx: f64, fy: f64, c1: Rgba8, c2: Rgba8, profile: f64) {
        self.state.line = self.focal_paint(x, y, r, fx, fy, c1, c2, profile);
    }
}
