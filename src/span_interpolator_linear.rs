//! Affine span interpolator.
//!
//! Only the two ends of a span go through the transform; the pixels in
//! between are stepped with integer DDAs in 1/256-pixel units.

use crate::basics::iround;
use crate::dda_line::Dda2LineInterpolator;
use crate::trans_affine::TransAffine;

pub const SUBPIXEL_SHIFT: u32 = 8;
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_SHIFT;

#[derive(Debug, Clone)]
pub struct SpanInterpolatorLinear {
    trans: TransAffine,
    li_x: Dda2LineInterpolator,
    li_y: Dda2LineInterpolator,
}

impl SpanInterpolatorLinear {
    /// `trans` maps device coordinates to source (gradient or image) space.
    pub fn new(trans: TransAffine) -> Self {
        Self {
            trans,
            li_x: Dda2LineInterpolator::default(),
            li_y: Dda2LineInterpolator::default(),
        }
    }

    pub fn transformer(&self) -> &TransAffine {
        &self.trans
    }

    pub fn set_transformer(&mut self, trans: TransAffine) {
        self.trans = trans;
    }

    /// Start a span of `len` pixels at device point `(x, y)`.
    pub fn begin(&mut self, x: f64, y: f64, len: u32) {
        let (x1, y1) = self.trans.transformed(x, y);
        let (x2, y2) = self.trans.transformed(x + len as f64, y);
        let sub = |v: f64| iround(v * SUBPIXEL_SCALE as f64);
        self.li_x = Dda2LineInterpolator::new(sub(x1), sub(x2), len as i32);
        self.li_y = Dda2LineInterpolator::new(sub(y1), sub(y2), len as i32);
    }

    #[inline]
    pub fn next(&mut self) {
        self.li_x.inc();
        self.li_y.inc();
    }

    /// Current source coordinates in 1/256 units.
    #[inline]
    pub fn coordinates(&self) -> (i32, i32) {
        (self.li_x.y(), self.li_y.y())
    }
}
