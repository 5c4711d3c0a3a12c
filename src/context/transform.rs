//! The world to device transform.
//!
//! `rotate`, `scale`, `translate` and `skew` apply after the current
//! transform, i.e. in device space; `affine` applies its matrix before the
//! current transform, in world space.

use super::{RenderingContext, LOG_TARGET};
use crate::error::Result;
use crate::pixfmt_rgba::Blender;
use crate::trans_affine::TransAffine;

/// Curve flattening tolerance relative to one device pixel.
const APPROXIMATION_SCALE: f64 = 2.0;

impl<'a, B: Blender> RenderingContext<'a, B> {
    pub fn transform(&self) -> &TransAffine {
        &self.state.transform
    }

    pub fn set_transform(&mut self, m: TransAffine) {
        self.state.transform = m;
        self.update_approximation_scale();
    }

    pub fn reset_transform(&mut self) {
        self.set_transform(TransAffine::new());
    }

    /// Apply `m` in world space, before the current transform.
    pub fn affine(&mut self, m: &TransAffine) {
        self.state.transform.premultiply(m);
        self.update_approximation_scale();
    }

    /// Rotate by `angle` radians.
    pub fn rotate(&mut self, angle: f64) {
        self.state.transform.rotate(angle);
        self.update_approximation_scale();
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.state.transform.scale_xy(sx, sy);
        self.update_approximation_scale();
    }

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.state.transform.translate(dx, dy);
        self.update_approximation_scale();
    }

    /// Skew by angles `sx`, `sy` in radians.
    pub fn skew(&mut self, sx: f64, sy: f64) {
        self.state.transform.skew(sx, sy);
        self.update_approximation_scale();
    }

    pub fn world_to_screen(&self, x: f64, y: f64) -> (f64, f64) {
        self.state.transform.transformed(x, y)
    }

    /// Fails with [`Error::SingularTransform`](crate::Error::SingularTransform)
    /// when the transform collapses the plane.
    pub fn screen_to_world(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        Ok(self.state.transform.inverted()?.transformed(x, y))
    }

    /// Device length of a world length, averaged over both axes.
    pub fn world_to_screen_scalar(&self, v: f64) -> f64 {
        let (x1, y1) = self.world_to_screen(0.0, 0.0);
        let (x2, y2) = self.world_to_screen(v, v);
        ((x2 - x1) * (x2 - x1) + (y2 - y1) * (y2 - y1)).sqrt() * std::f64::consts::FRAC_1_SQRT_2
    }

    fn update_approximation_scale(&mut self) {
        let s = self.world_to_screen_scalar(1.0) * APPROXIMATION_SCALE;
        let s = if s.is_finite() && s > 0.0 {
            s
        } else {
            log::debug!(target: LOG_TARGET, "degenerate transform, approximation scale reset");
            APPROXIMATION_SCALE
        };
        self.path.set_approximation_scale(s);
        self.stroker.set_approximation_scale(s);
    }
}
