//! Adaptive Bézier flattening by recursive subdivision.
//!
//! [`Curve3Div`] and [`Curve4Div`] split a curve at t = 0.5 until each piece
//! deviates from its chord by less than `0.5 / approximation_scale` pixels
//! (optionally also until the turning angle drops below a tolerance). The
//! flattened points are computed eagerly on `init` and replayed by the
//! [`VertexSource`] impl.

use std::f64::consts::PI;

use crate::basics::{PathCommand, Vertex, VertexSource};
use crate::math::calc_sq_distance;

const CURVE_COLLINEARITY_EPSILON: f64 = 1e-30;
const CURVE_ANGLE_TOLERANCE_EPSILON: f64 = 0.01;
const CURVE_RECURSION_LIMIT: u32 = 32;

type Point = (f64, f64);

/// Absolute turning angle between directions `a` and `b`, folded into [0, π].
#[inline]
fn turn(a: f64, b: f64) -> f64 {
    let da = (a - b).abs();
    if da >= PI {
        2.0 * PI - da
    } else {
        da
    }
}

#[inline]
fn dir(p: Point, q: Point) -> f64 {
    (q.1 - p.1).atan2(q.0 - p.0)
}

#[inline]
fn mid(p: Point, q: Point) -> Point {
    ((p.0 + q.0) / 2.0, (p.1 + q.1) / 2.0)
}

/// Squared distance from `p` to the chord `a`-`b`, measured to the nearest
/// end point when `p` projects outside the chord. `None` when `p` projects
/// strictly inside (the point adds nothing).
fn collinear_deviation(p: Point, a: Point, b: Point) -> Option<f64> {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let k = dx * dx + dy * dy;
    if k == 0.0 {
        return Some(calc_sq_distance(a.0, a.1, p.0, p.1));
    }
    let t = ((p.0 - a.0) * dx + (p.1 - a.1) * dy) / k;
    if t > 0.0 && t < 1.0 {
        return None;
    }
    Some(if t <= 0.0 {
        calc_sq_distance(p.0, p.1, a.0, a.1)
    } else {
        calc_sq_distance(p.0, p.1, b.0, b.1)
    })
}

// ============================================================================
// Shared tolerance state and point replay
// ============================================================================

#[derive(Debug, Clone)]
struct Flattening {
    approximation_scale: f64,
    distance_tolerance_square: f64,
    angle_tolerance: f64,
    points: Vec<Point>,
    count: usize,
}

impl Flattening {
    fn new() -> Self {
        Self {
            approximation_scale: 1.0,
            distance_tolerance_square: 0.25,
            angle_tolerance: 0.0,
            points: Vec::new(),
            count: 0,
        }
    }

    fn begin(&mut self) {
        self.points.clear();
        self.count = 0;
        let tol = 0.5 / self.approximation_scale;
        self.distance_tolerance_square = tol * tol;
    }

    /// `true` when the angle test is disabled.
    #[inline]
    fn ignores_angle(&self) -> bool {
        self.angle_tolerance < CURVE_ANGLE_TOLERANCE_EPSILON
    }

    fn next_vertex(&mut self) -> Vertex {
        let Some(&(x, y)) = self.points.get(self.count) else {
            return Vertex::stop();
        };
        self.count += 1;
        let cmd = if self.count == 1 {
            PathCommand::MoveTo
        } else {
            PathCommand::LineTo
        };
        Vertex::new(x, y, cmd)
    }
}

// ============================================================================
// Curve3Div
// ============================================================================

/// Quadratic Bézier flattener.
#[derive(Debug, Clone)]
pub struct Curve3Div {
    f: Flattening,
}

impl Curve3Div {
    pub fn new() -> Self {
        Self { f: Flattening::new() }
    }

    pub fn reset(&mut self) {
        self.f.points.clear();
        self.f.count = 0;
    }

    pub fn init(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64) {
        self.f.begin();
        self.f.points.push((x1, y1));
        self.subdivide((x1, y1), (x2, y2), (x3, y3), 0);
        self.f.points.push((x3, y3));
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.f.approximation_scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.f.approximation_scale
    }

    pub fn set_angle_tolerance(&mut self, a: f64) {
        self.f.angle_tolerance = a;
    }

    pub fn angle_tolerance(&self) -> f64 {
        self.f.angle_tolerance
    }

    pub fn num_points(&self) -> usize {
        self.f.points.len()
    }

    fn subdivide(&mut self, p1: Point, p2: Point, p3: Point, level: u32) {
        if level > CURVE_RECURSION_LIMIT {
            return;
        }
        let p12 = mid(p1, p2);
        let p23 = mid(p2, p3);
        let p123 = mid(p12, p23);

        let (dx, dy) = (p3.0 - p1.0, p3.1 - p1.1);
        let d = ((p2.0 - p3.0) * dy - (p2.1 - p3.1) * dx).abs();

        if d > CURVE_COLLINEARITY_EPSILON {
            if d * d <= self.f.distance_tolerance_square * (dx * dx + dy * dy) {
                if self.f.ignores_angle() || turn(dir(p2, p3), dir(p1, p2)) < self.f.angle_tolerance
                {
                    self.f.points.push(p123);
                    return;
                }
            }
        } else {
            match collinear_deviation(p2, p1, p3) {
                None => return,
                Some(dev) if dev < self.f.distance_tolerance_square => {
                    self.f.points.push(p2);
                    return;
                }
                Some(_) => {}
            }
        }

        self.subdivide(p1, p12, p123, level + 1);
        self.subdivide(p123, p23, p3, level + 1);
    }
}

impl Default for Curve3Div {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Curve3Div {
    fn rewind(&mut self, _path_id: u32) {
        self.f.count = 0;
    }

    fn next_vertex(&mut self) -> Vertex {
        self.f.next_vertex()
    }
}

// ============================================================================
// Curve4Div
// ============================================================================

/// Cubic Bézier flattener with optional cusp handling.
#[derive(Debug, Clone)]
pub struct Curve4Div {
    f: Flattening,
    cusp_limit: f64,
}

impl Curve4Div {
    pub fn new() -> Self {
        Self {
            f: Flattening::new(),
            cusp_limit: 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.f.points.clear();
        self.f.count = 0;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn init(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x3: f64, y3: f64, x4: f64, y4: f64) {
        self.f.begin();
        self.f.points.push((x1, y1));
        self.subdivide((x1, y1), (x2, y2), (x3, y3), (x4, y4), 0);
        self.f.points.push((x4, y4));
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.f.approximation_scale = s;
    }

    pub fn approximation_scale(&self) -> f64 {
        self.f.approximation_scale
    }

    pub fn set_angle_tolerance(&mut self, a: f64) {
        self.f.angle_tolerance = a;
    }

    pub fn angle_tolerance(&self) -> f64 {
        self.f.angle_tolerance
    }

    /// Turning angle above which a control point is emitted as a cusp.
    /// Zero disables the check.
    pub fn set_cusp_limit(&mut self, v: f64) {
        self.cusp_limit = if v == 0.0 { 0.0 } else { PI - v };
    }

    pub fn cusp_limit(&self) -> f64 {
        if self.cusp_limit == 0.0 {
            0.0
        } else {
            PI - self.cusp_limit
        }
    }

    pub fn num_points(&self) -> usize {
        self.f.points.len()
    }

    #[inline]
    fn is_cusp(&self, angle: f64) -> bool {
        self.cusp_limit != 0.0 && angle > self.cusp_limit
    }

    /// Handles the case where one control point is on the chord and the
    /// other (`sig`) is not. Returns `true` when the piece was emitted.
    #[allow(clippy::too_many_arguments)]
    fn flat_with_one_control(
        &mut self,
        d: f64,
        chord_sq: f64,
        angle: f64,
        p2: Point,
        p3: Point,
        fallback: Point,
        sig: Point,
    ) -> bool {
        if d * d > self.f.distance_tolerance_square * chord_sq {
            return false;
        }
        if self.f.ignores_angle() {
            self.f.points.push(fallback);
            return true;
        }
        if angle < self.f.angle_tolerance {
            self.f.points.push(p2);
            self.f.points.push(p3);
            return true;
        }
        if self.is_cusp(angle) {
            self.f.points.push(sig);
            return true;
        }
        false
    }

    fn subdivide(&mut self, p1: Point, p2: Point, p3: Point, p4: Point, level: u32) {
        if level > CURVE_RECURSION_LIMIT {
            return;
        }
        let p12 = mid(p1, p2);
        let p23 = mid(p2, p3);
        let p34 = mid(p3, p4);
        let p123 = mid(p12, p23);
        let p234 = mid(p23, p34);
        let p1234 = mid(p123, p234);

        let (dx, dy) = (p4.0 - p1.0, p4.1 - p1.1);
        let chord_sq = dx * dx + dy * dy;
        let d2 = ((p2.0 - p4.0) * dy - (p2.1 - p4.1) * dx).abs();
        let d3 = ((p3.0 - p4.0) * dy - (p3.1 - p4.1) * dx).abs();

        let emitted = match (d2 > CURVE_COLLINEARITY_EPSILON, d3 > CURVE_COLLINEARITY_EPSILON) {
            (false, false) => {
                // All four points collinear, or p1 == p4.
                let dev2 = collinear_deviation(p2, p1, p4);
                let dev3 = collinear_deviation(p3, p1, p4);
                match (dev2, dev3) {
                    (None, None) => return,
                    (dev2, dev3) => {
                        let dev2 = dev2.unwrap_or(0.0);
                        let dev3 = dev3.unwrap_or(0.0);
                        if dev2 > dev3 {
                            if dev2 < self.f.distance_tolerance_square {
                                self.f.points.push(p2);
                                true
                            } else {
                                false
                            }
                        } else if dev3 < self.f.distance_tolerance_square {
                            self.f.points.push(p3);
                            true
                        } else {
                            false
                        }
                    }
                }
            }
            (false, true) => {
                let angle = turn(dir(p3, p4), dir(p2, p3));
                self.flat_with_one_control(d3, chord_sq, angle, p2, p3, p23, p3)
            }
            (true, false) => {
                let angle = turn(dir(p2, p3), dir(p1, p2));
                self.flat_with_one_control(d2, chord_sq, angle, p2, p3, p23, p2)
            }
            (true, true) => {
                if (d2 + d3) * (d2 + d3) > self.f.distance_tolerance_square * chord_sq {
                    false
                } else if self.f.ignores_angle() {
                    self.f.points.push(p23);
                    true
                } else {
                    let k = dir(p2, p3);
                    let da1 = turn(k, dir(p1, p2));
                    let da2 = turn(dir(p3, p4), k);
                    if da1 + da2 < self.f.angle_tolerance {
                        self.f.points.push(p23);
                        true
                    } else if self.is_cusp(da1) {
                        self.f.points.push(p2);
                        true
                    } else if self.is_cusp(da2) {
                        self.f.points.push(p3);
                        true
                    } else {
                        false
                    }
                }
            }
        };
        if emitted {
            return;
        }

        self.subdivide(p1, p12, p123, p1234, level + 1);
        self.subdivide(p1234, p234, p34, p4, level + 1);
    }
}

impl Default for Curve4Div {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexSource for Curve4Div {
    fn rewind(&mut self, _path_id: u32) {
        self.f.count = 0;
    }

    fn next_vertex(&mut self) -> Vertex {
        self.f.next_vertex()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn collect<VS: VertexSource>(vs: &mut VS) -> Vec<Vertex> {
        vs.vertices(0).collect()
    }

    #[test]
    fn test_curve3_endpoints_exact() {
        let mut c = Curve3Div::new();
        c.init(0.0, 0.0, 50.0, 100.0, 100.0, 0.0);
        let pts = collect(&mut c);
        assert!(pts.len() > 3);
        assert_eq!(pts[0].cmd, PathCommand::MoveTo);
        assert_eq!((pts[0].x, pts[0].y), (0.0, 0.0));
        let last = pts[pts.len() - 1];
        assert_eq!((last.x, last.y), (100.0, 0.0));
        assert!(pts[1..].iter().all(|v| v.cmd == PathCommand::LineTo));
    }

    #[test]
    fn test_curve3_stays_within_tolerance() {
        let mut c = Curve3Div::new();
        c.init(0.0, 0.0, 50.0, 100.0, 100.0, 0.0);
        // Every flattened point lies close to the true curve y = 2x(1 - x/100).
        for v in collect(&mut c) {
            let t = v.x / 100.0;
            let y = 100.0 * 2.0 * t * (1.0 - t);
            assert!((v.y - y).abs() < 0.5, "x={} y={} expected {}", v.x, v.y, y);
        }
    }

    #[test]
    fn test_curve3_collinear_emits_two_points() {
        let mut c = Curve3Div::new();
        c.init(0.0, 0.0, 50.0, 0.0, 100.0, 0.0);
        assert_eq!(c.num_points(), 2);
    }

    #[test]
    fn test_higher_scale_gives_more_points() {
        let mut coarse = Curve4Div::new();
        coarse.init(0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 0.0);
        let mut fine = Curve4Div::new();
        fine.set_approximation_scale(10.0);
        fine.init(0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 0.0);
        assert!(fine.num_points() > coarse.num_points());
    }

    #[test]
    fn test_curve4_symmetric_arch() {
        let mut c = Curve4Div::new();
        c.init(0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 0.0);
        let pts = collect(&mut c);
        let top = pts.iter().map(|v| v.y).fold(f64::MIN, f64::max);
        // Peak of this cubic is 75 at t = 0.5.
        assert!((top - 75.0).abs() < 0.5, "top={}", top);
    }

    #[test]
    fn test_curve4_degenerate_point() {
        let mut c = Curve4Div::new();
        c.init(5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0, 5.0);
        let pts = collect(&mut c);
        assert!(pts.iter().all(|v| v.x == 5.0 && v.y == 5.0));
    }

    #[test]
    fn test_rewind_replays() {
        let mut c = Curve4Div::new();
        c.init(0.0, 0.0, 10.0, 40.0, 30.0, 40.0, 40.0, 0.0);
        let a = collect(&mut c);
        let b = collect(&mut c);
        assert_eq!(a, b);
    }

    #[test]
    fn test_cusp_limit_roundtrip() {
        let mut c = Curve4Div::new();
        assert_eq!(c.cusp_limit(), 0.0);
        c.set_cusp_limit(0.5);
        assert!((c.cusp_limit() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_angle_tolerance_adds_points() {
        let mut plain = Curve3Div::new();
        plain.init(0.0, 0.0, 5.0, 10.0, 10.0, 0.0);
        let mut angled = Curve3Div::new();
        angled.set_angle_tolerance(0.05);
        angled.init(0.0, 0.0, 5.0, 10.0, 10.0, 0.0);
        assert!(angled.num_points() >= plain.num_points());
    }
}
