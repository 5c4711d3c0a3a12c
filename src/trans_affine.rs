//! 2×3 affine matrices for the world to device mapping and for the inverse
//! lookups done by gradients and image spans.

use crate::basics::is_equal_eps;
use crate::error::{Error, Result};

/// Below this determinant magnitude a matrix counts as singular.
pub const AFFINE_EPSILON: f64 = 1e-14;

/// An affine map `x' = sx·x + shx·y + tx`, `y' = shy·x + sy·y + ty`.
///
/// Composition reads left to right: `a * b` applies `a` first, then `b`.
#[derive(Debug, Clone, Copy)]
pub struct TransAffine {
    pub sx: f64,
    pub shy: f64,
    pub shx: f64,
    pub sy: f64,
    pub tx: f64,
    pub ty: f64,
}

/// The map that applies `a`, then `b`.
fn compose(a: &TransAffine, b: &TransAffine) -> TransAffine {
    TransAffine {
        sx: a.sx * b.sx + a.shy * b.shx,
        shy: a.sx * b.shy + a.shy * b.sy,
        shx: a.shx * b.sx + a.sy * b.shx,
        sy: a.shx * b.shy + a.sy * b.sy,
        tx: a.tx * b.sx + a.ty * b.shx + b.tx,
        ty: a.tx * b.shy + a.ty * b.sy + b.ty,
    }
}

impl TransAffine {
    pub fn new() -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)
    }

    pub fn new_custom(sx: f64, shy: f64, shx: f64, sy: f64, tx: f64, ty: f64) -> Self {
        Self { sx, shy, shx, sy, tx, ty }
    }

    pub fn new_rotation(a: f64) -> Self {
        let (sin, cos) = a.sin_cos();
        Self::new_custom(cos, sin, -sin, cos, 0.0, 0.0)
    }

    pub fn new_scaling(x: f64, y: f64) -> Self {
        Self::new_custom(x, 0.0, 0.0, y, 0.0, 0.0)
    }

    pub fn new_translation(x: f64, y: f64) -> Self {
        Self::new_custom(1.0, 0.0, 0.0, 1.0, x, y)
    }

    /// Shear by the angles `x` and `y`, in radians.
    pub fn new_skewing(x: f64, y: f64) -> Self {
        Self::new_custom(1.0, y.tan(), x.tan(), 1.0, 0.0, 0.0)
    }

    /// The map taking the unit square onto the parallelogram spanned by the
    /// three corners `[x1,y1, x2,y2, x3,y3]`.
    fn from_corners(p: &[f64; 6]) -> Self {
        Self::new_custom(p[2] - p[0], p[3] - p[1], p[4] - p[0], p[5] - p[1], p[0], p[1])
    }

    /// Replace `self` with the map taking parallelogram `src` onto `dst`.
    /// On a degenerate `src` the error is returned and `self` is kept.
    pub fn parl_to_parl(&mut self, src: &[f64; 6], dst: &[f64; 6]) -> Result<&mut Self> {
        let from = Self::from_corners(src).inverted()?;
        *self = compose(&from, &Self::from_corners(dst));
        Ok(self)
    }

    /// [`parl_to_parl`](Self::parl_to_parl) with the rectangle
    /// `(x1,y1)-(x2,y2)` as the source.
    pub fn rect_to_parl(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        parl: &[f64; 6],
    ) -> Result<&mut Self> {
        self.parl_to_parl(&[x1, y1, x2, y1, x2, y2], parl)
    }

    pub fn translate(&mut self, x: f64, y: f64) -> &mut Self {
        self.tx += x;
        self.ty += y;
        self
    }

    /// Rotate by `a` radians after the current map.
    pub fn rotate(&mut self, a: f64) -> &mut Self {
        self.multiply(&Self::new_rotation(a))
    }

    pub fn scale_xy(&mut self, x: f64, y: f64) -> &mut Self {
        self.multiply(&Self::new_scaling(x, y))
    }

    pub fn skew(&mut self, x: f64, y: f64) -> &mut Self {
        self.multiply(&Self::new_skewing(x, y))
    }

    /// Apply `m` after `self`.
    pub fn multiply(&mut self, m: &TransAffine) -> &mut Self {
        *self = compose(self, m);
        self
    }

    /// Apply `m` before `self`.
    pub fn premultiply(&mut self, m: &TransAffine) -> &mut Self {
        *self = compose(m, self);
        self
    }

    /// Fails with [`Error::SingularTransform`] when `|det|` is under
    /// [`AFFINE_EPSILON`] or not finite, leaving `self` unchanged.
    pub fn invert(&mut self) -> Result<&mut Self> {
        *self = self.inverted()?;
        Ok(self)
    }

    pub fn inverted(&self) -> Result<TransAffine> {
        let det = self.determinant();
        if !det.is_finite() || det.abs() < AFFINE_EPSILON {
            return Err(Error::SingularTransform { det });
        }
        let (sx, shy, shx, sy) = (self.sy / det, -self.shy / det, -self.shx / det, self.sx / det);
        Ok(Self::new_custom(
            sx,
            shy,
            shx,
            sy,
            -self.tx * sx - self.ty * shx,
            -self.tx * shy - self.ty * sy,
        ))
    }

    #[inline]
    pub fn transform(&self, x: &mut f64, y: &mut f64) {
        (*x, *y) = self.transformed(*x, *y);
    }

    #[inline]
    pub fn transformed(&self, x: f64, y: f64) -> (f64, f64) {
        (
            x * self.sx + y * self.shx + self.tx,
            x * self.shy + y * self.sy + self.ty,
        )
    }

    /// Direction vectors skip the translation part.
    #[inline]
    pub fn transform_2x2(&self, x: &mut f64, y: &mut f64) {
        (*x, *y) = (
            *x * self.sx + *y * self.shx,
            *x * self.shy + *y * self.sy,
        );
    }

    #[inline]
    pub fn determinant(&self) -> f64 {
        self.sx * self.sy - self.shy * self.shx
    }

    pub fn is_identity(&self, epsilon: f64) -> bool {
        self.is_equal(&TransAffine::new(), epsilon)
    }

    pub fn is_equal(&self, m: &TransAffine, epsilon: f64) -> bool {
        self.components()
            .iter()
            .zip(m.components())
            .all(|(&a, b)| is_equal_eps(a, b, epsilon))
    }

    fn components(&self) -> [f64; 6] {
        [self.sx, self.shy, self.shx, self.sy, self.tx, self.ty]
    }

    /// Angle of the mapped x axis, in radians.
    pub fn rotation(&self) -> f64 {
        let (mut dx, mut dy) = (1.0, 0.0);
        self.transform_2x2(&mut dx, &mut dy);
        dy.atan2(dx)
    }

    pub fn translation(&self) -> (f64, f64) {
        (self.tx, self.ty)
    }

    /// Lengths of the two rows, the stretch each axis undergoes.
    pub fn scaling(&self) -> (f64, f64) {
        (self.sx.hypot(self.shx), self.shy.hypot(self.sy))
    }
}

impl Default for TransAffine {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for TransAffine {
    fn eq(&self, other: &Self) -> bool {
        self.is_equal(other, AFFINE_EPSILON)
    }
}

impl std::ops::Mul for TransAffine {
    type Output = TransAffine;
    fn mul(self, rhs: TransAffine) -> TransAffine {
        compose(&self, &rhs)
    }
}

impl std::ops::MulAssign for TransAffine {
    fn mul_assign(&mut self, rhs: TransAffine) {
        self.multiply(&rhs);
    }
}
