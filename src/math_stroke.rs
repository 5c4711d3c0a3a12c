//! Stroke geometry: caps and joins for offset outlines.
//!
//! [`MathStroke`] computes the outline points around one vertex of a
//! polyline, either a cap at an end point or a join between two segments.
//! Points are appended to a caller-owned `Vec<(f64, f64)>` so the stroke
//! generator can reuse its buffer across vertices.

use std::f64::consts::PI;

use crate::array::VertexDist;
use crate::math::{calc_distance, calc_intersection, cross_product};

/// Outline points produced for one cap or join.
pub type StrokePoints = Vec<(f64, f64)>;

// ============================================================================
// Styles
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineCap {
    #[default]
    Butt,
    Square,
    Round,
}

/// Outer join style.
///
/// `Miter` falls back to a clipped miter when the limit is exceeded,
/// `MiterRevert` to a bevel and `MiterRound` to a round join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineJoin {
    #[default]
    Miter,
    MiterRevert,
    Round,
    Bevel,
    MiterRound,
}

/// Treatment of the inside of a corner, where the offset edges overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InnerJoin {
    Bevel,
    #[default]
    Miter,
    Jag,
    Round,
}

// ============================================================================
// MathStroke
// ============================================================================

#[derive(Debug, Clone)]
pub struct MathStroke {
    /// Half the stroke width, signed.
    width: f64,
    width_abs: f64,
    width_eps: f64,
    width_sign: f64,
    miter_limit: f64,
    inner_miter_limit: f64,
    approx_scale: f64,
    line_cap: LineCap,
    line_join: LineJoin,
    inner_join: InnerJoin,
}

impl MathStroke {
    pub fn new() -> Self {
        Self {
            width: 0.5,
            width_abs: 0.5,
            width_eps: 0.5 / 1024.0,
            width_sign: 1.0,
            miter_limit: 4.0,
            inner_miter_limit: 1.01,
            approx_scale: 1.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            inner_join: InnerJoin::Miter,
        }
    }

    pub fn set_line_cap(&mut self, lc: LineCap) {
        self.line_cap = lc;
    }

    pub fn line_cap(&self) -> LineCap {
        self.line_cap
    }

    pub fn set_line_join(&mut self, lj: LineJoin) {
        self.line_join = lj;
    }

    pub fn line_join(&self) -> LineJoin {
        self.line_join
    }

    pub fn set_inner_join(&mut self, ij: InnerJoin) {
        self.inner_join = ij;
    }

    pub fn inner_join(&self) -> InnerJoin {
        self.inner_join
    }

    /// Full stroke width. A negative width flips the outline orientation.
    pub fn set_width(&mut self, w: f64) {
        self.width = w * 0.5;
        self.width_abs = self.width.abs();
        self.width_sign = if self.width < 0.0 { -1.0 } else { 1.0 };
        self.width_eps = self.width / 1024.0;
    }

    pub fn width(&self) -> f64 {
        self.width * 2.0
    }

    pub fn set_miter_limit(&mut self, ml: f64) {
        self.miter_limit = ml;
    }

    pub fn miter_limit(&self) -> f64 {
        self.miter_limit
    }

    /// Miter limit expressed as the smallest corner angle that still gets a
    /// full miter.
    pub fn set_miter_limit_theta(&mut self, t: f64) {
        self.miter_limit = 1.0 / (t * 0.5).sin();
    }

    pub fn set_inner_miter_limit(&mut self, ml: f64) {
        self.inner_miter_limit = ml;
    }

    pub fn inner_miter_limit(&self) -> f64 {
        self.inner_miter_limit
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.approx_scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.approx_scale
    }

    /// Angular step for round caps and joins at the current width and scale.
    #[inline]
    fn arc_step(&self) -> f64 {
        (self.width_abs / (self.width_abs + 0.125 / self.approx_scale)).acos() * 2.0
    }

    /// Cap at `v0`, whose neighbour along the path is `v1` at distance `len`.
    pub fn calc_cap(&self, out: &mut StrokePoints, v0: &VertexDist, v1: &VertexDist, len: f64) {
        out.clear();

        let dx1 = (v1.y - v0.y) / len * self.width;
        let dy1 = (v1.x - v0.x) / len * self.width;

        if self.line_cap == LineCap::Round {
            let da = self.arc_step();
            let n = (PI / da) as i32;
            let da = PI / (n + 1) as f64;

            out.push((v0.x - dx1, v0.y + dy1));
            let (mut a, step) = if self.width_sign > 0.0 {
                (dy1.atan2(-dx1) + da, da)
            } else {
                ((-dy1).atan2(dx1) - da, -da)
            };
            for _ in 0..n {
                out.push((v0.x + a.cos() * self.width, v0.y + a.sin() * self.width));
                a += step;
            }
            out.push((v0.x + dx1, v0.y - dy1));
            return;
        }

        let (dx2, dy2) = if self.line_cap == LineCap::Square {
            (dy1 * self.width_sign, dx1 * self.width_sign)
        } else {
            (0.0, 0.0)
        };
        out.push((v0.x - dx1 - dx2, v0.y + dy1 - dy2));
        out.push((v0.x + dx1 - dx2, v0.y - dy1 - dy2));
    }

    /// Join at `v1` between segments `v0→v1` (length `len1`) and `v1→v2`
    /// (length `len2`).
    pub fn calc_join(
        &self,
        out: &mut StrokePoints,
        v0: &VertexDist,
        v1: &VertexDist,
        v2: &VertexDist,
        len1: f64,
        len2: f64,
    ) {
        let dx1 = self.width * (v1.y - v0.y) / len1;
        let dy1 = self.width * (v1.x - v0.x) / len1;
        let dx2 = self.width * (v2.y - v1.y) / len2;
        let dy2 = self.width * (v2.x - v1.x) / len2;
        let off1 = (v1.x + dx1, v1.y - dy1);
        let off2 = (v1.x + dx2, v1.y - dy2);
        let seg = Segments {
            v0,
            v1,
            v2,
            dx1,
            dy1,
            dx2,
            dy2,
        };

        out.clear();

        let cp = cross_product(v0.x, v0.y, v1.x, v1.y, v2.x, v2.y);
        let inner = cp != 0.0 && (cp > 0.0) == (self.width > 0.0);

        if inner {
            let limit = (len1.min(len2) / self.width_abs).max(self.inner_miter_limit);
            match self.inner_join {
                InnerJoin::Bevel => {
                    out.push(off1);
                    out.push(off2);
                }
                InnerJoin::Miter => {
                    self.calc_miter(out, &seg, LineJoin::MiterRevert, limit, 0.0);
                }
                InnerJoin::Jag | InnerJoin::Round => {
                    let d = (dx1 - dx2) * (dx1 - dx2) + (dy1 - dy2) * (dy1 - dy2);
                    if d < len1 * len1 && d < len2 * len2 {
                        self.calc_miter(out, &seg, LineJoin::MiterRevert, limit, 0.0);
                    } else if self.inner_join == InnerJoin::Jag {
                        out.push(off1);
                        out.push((v1.x, v1.y));
                        out.push(off2);
                    } else {
                        out.push(off1);
                        out.push((v1.x, v1.y));
                        self.calc_arc(out, v1.x, v1.y, dx2, -dy2, dx1, -dy1);
                        out.push((v1.x, v1.y));
                        out.push(off2);
                    }
                }
            }
            return;
        }

        // Outer join. When the bevel is within tolerance of the full width a
        // single point suffices.
        let dx = (dx1 + dx2) / 2.0;
        let dy = (dy1 + dy2) / 2.0;
        let dbevel = (dx * dx + dy * dy).sqrt();

        if matches!(self.line_join, LineJoin::Round | LineJoin::Bevel)
            && self.approx_scale * (self.width_abs - dbevel) < self.width_eps
        {
            let p = seg.offset_intersection().unwrap_or(off1);
            out.push(p);
            return;
        }

        match self.line_join {
            LineJoin::Miter | LineJoin::MiterRevert | LineJoin::MiterRound => {
                self.calc_miter(out, &seg, self.line_join, self.miter_limit, dbevel);
            }
            LineJoin::Round => self.calc_arc(out, v1.x, v1.y, dx1, -dy1, dx2, -dy2),
            LineJoin::Bevel => {
                out.push(off1);
                out.push(off2);
            }
        }
    }

    /// Arc around `(x, y)` from offset `(dx1, dy1)` to `(dx2, dy2)`.
    #[allow(clippy::too_many_arguments)]
    fn calc_arc(
        &self,
        out: &mut StrokePoints,
        x: f64,
        y: f64,
        dx1: f64,
        dy1: f64,
        dx2: f64,
        dy2: f64,
    ) {
        let ws = self.width_sign;
        let mut a1 = (dy1 * ws).atan2(dx1 * ws);
        let mut a2 = (dy2 * ws).atan2(dx2 * ws);
        let da = self.arc_step();

        out.push((x + dx1, y + dy1));
        let (n, step) = if ws > 0.0 {
            if a1 > a2 {
                a2 += 2.0 * PI;
            }
            let n = ((a2 - a1) / da) as i32;
            (n, (a2 - a1) / (n + 1) as f64)
        } else {
            if a1 < a2 {
                a2 -= 2.0 * PI;
            }
            let n = ((a1 - a2) / da) as i32;
            (n, -(a1 - a2) / (n + 1) as f64)
        };
        a1 += step;
        for _ in 0..n {
            out.push((x + a1.cos() * self.width, y + a1.sin() * self.width));
            a1 += step;
        }
        out.push((x + dx2, y + dy2));
    }

    fn calc_miter(
        &self,
        out: &mut StrokePoints,
        seg: &Segments<'_>,
        lj: LineJoin,
        mlimit: f64,
        dbevel: f64,
    ) {
        let Segments {
            v0,
            v1,
            v2,
            dx1,
            dy1,
            dx2,
            dy2,
        } = *seg;
        let lim = self.width_abs * mlimit;

        let intersection = seg.offset_intersection();
        let within_limit = match intersection {
            Some((xi, yi)) => {
                let di = calc_distance(v1.x, v1.y, xi, yi);
                if di <= lim {
                    out.push((xi, yi));
                    return;
                }
                Some((xi, yi, di))
            }
            None => {
                // Parallel offset edges: the miter is the offset point
                // itself when both segments continue in the same direction.
                let (x2, y2) = (v1.x + dx1, v1.y - dy1);
                if (cross_product(v0.x, v0.y, v1.x, v1.y, x2, y2) < 0.0)
                    == (cross_product(v1.x, v1.y, v2.x, v2.y, x2, y2) < 0.0)
                {
                    out.push((x2, y2));
                    return;
                }
                None
            }
        };

        match lj {
            LineJoin::MiterRevert => {
                out.push((v1.x + dx1, v1.y - dy1));
                out.push((v1.x + dx2, v1.y - dy2));
            }
            LineJoin::MiterRound => self.calc_arc(out, v1.x, v1.y, dx1, -dy1, dx2, -dy2),
            _ => match within_limit {
                None => {
                    let ml = mlimit * self.width_sign;
                    out.push((v1.x + dx1 + dy1 * ml, v1.y - dy1 + dx1 * ml));
                    out.push((v1.x + dx2 - dy2 * ml, v1.y - dy2 - dx2 * ml));
                }
                Some((xi, yi, di)) => {
                    let (x1, y1) = (v1.x + dx1, v1.y - dy1);
                    let (x2, y2) = (v1.x + dx2, v1.y - dy2);
                    let k = (lim - dbevel) / (di - dbevel);
                    out.push((x1 + (xi - x1) * k, y1 + (yi - y1) * k));
                    out.push((x2 + (xi - x2) * k, y2 + (yi - y2) * k));
                }
            },
        }
    }
}

impl Default for MathStroke {
    fn default() -> Self {
        Self::new()
    }
}

/// The two segments meeting at a join plus their perpendicular offsets.
#[derive(Clone, Copy)]
struct Segments<'a> {
    v0: &'a VertexDist,
    v1: &'a VertexDist,
    v2: &'a VertexDist,
    dx1: f64,
    dy1: f64,
    dx2: f64,
    dy2: f64,
}

impl Segments<'_> {
    /// Intersection of the two offset edges, `None` when parallel.
    fn offset_intersection(&self) -> Option<(f64, f64)> {
        let Segments {
            v0,
            v1,
            v2,
            dx1,
            dy1,
            dx2,
            dy2,
        } = *self;
        calc_intersection(
            v0.x + dx1,
            v0.y - dy1,
            v1.x + dx1,
            v1.y - dy1,
            v1.x + dx2,
            v1.y - dy2,
            v2.x + dx2,
            v2.y - dy2,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
