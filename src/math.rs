//! Geometric helpers shared by the stroker, curve flattener and tests.

// ============================================================================
// Constants
// ============================================================================

/// Maximal distance at which two points are treated as coincident.
pub const VERTEX_DIST_EPSILON: f64 = 1e-14;

/// Denominator threshold below which two lines are considered parallel.
pub const INTERSECTION_EPSILON: f64 = 1.0e-30;

// ============================================================================
// Cross product
// ============================================================================

/// Cross product of vectors (x2-x1, y2-y1) and (x-x2, y-y2).
/// The sign tells which side of the line (x1,y1)→(x2,y2) the point (x,y) is on.
#[inline]
pub fn cross_product(x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> f64 {
    (x - x2) * (y2 - y1) - (y - y2) * (x2 - x1)
}

// ============================================================================
// Distances
// ============================================================================

#[inline]
pub fn calc_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    (dx * dx + dy * dy).sqrt()
}

#[inline]
pub fn calc_sq_distance(x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    dx * dx + dy * dy
}

/// Signed distance from (x, y) to the infinite line through (x1,y1)→(x2,y2).
/// Falls back to the point distance for a degenerate line.
#[inline]
pub fn calc_line_point_distance(x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> f64 {
    let dx = x2 - x1;
    let dy = y2 - y1;
    let d = (dx * dx + dy * dy).sqrt();
    if d < VERTEX_DIST_EPSILON {
        return calc_distance(x1, y1, x, y);
    }
    ((x - x2) * dy - (y - y2) * dx) / d
}

// ============================================================================
// Intersection
// ============================================================================

/// Intersection of the lines (ax,ay)→(bx,by) and (cx,cy)→(dx,dy).
/// Returns `None` when the lines are parallel.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn calc_intersection(
    ax: f64,
    ay: f64,
    bx: f64,
    by: f64,
    cx: f64,
    cy: f64,
    dx: f64,
    dy: f64,
) -> Option<(f64, f64)> {
    let num = (ay - cy) * (dx - cx) - (ax - cx) * (dy - cy);
    let den = (bx - ax) * (dy - cy) - (by - ay) * (dx - cx);
    if den.abs() < INTERSECTION_EPSILON {
        return None;
    }
    let r = num / den;
    Some((ax + r * (bx - ax), ay + r * (by - ay)))
}

// ============================================================================
// Polygons
// ============================================================================

/// Signed area of a closed polygon given as `(x, y)` pairs.
/// Positive for counter-clockwise order in a y-up system.
pub fn calc_polygon_area(points: &[(f64, f64)]) -> f64 {
    let Some(&(xs, ys)) = points.first() else {
        return 0.0;
    };
    let (mut x, mut y) = (xs, ys);
    let mut sum = 0.0;
    for &(px, py) in &points[1..] {
        sum += x * py - y * px;
        x = px;
        y = py;
    }
    (sum + x * ys - y * xs) * 0.5
}

/// Even-odd point-in-polygon test (ray casting). Edges are treated as
/// half-open so a point exactly on an edge belongs to at most one side.
pub fn point_in_polygon(points: &[(f64, f64)], x: f64, y: f64) -> bool {
    let n = points.len();
    if n < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = points[i];
        let (xj, yj) = points[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_product_sign() {
        // Point to the left of the x axis direction (y down) gives a negative value.
        assert!(cross_product(0.0, 0.0, 10.0, 0.0, 5.0, 5.0) < 0.0);
        assert!(cross_product(0.0, 0.0, 10.0, 0.0, 5.0, -5.0) > 0.0);
        assert_eq!(cross_product(0.0, 0.0, 10.0, 0.0, 20.0, 0.0), 0.0);
    }

    #[test]
    fn test_distances() {
        assert!((calc_distance(0.0, 0.0, 3.0, 4.0) - 5.0).abs() < 1e-12);
        assert!((calc_sq_distance(0.0, 0.0, 3.0, 4.0) - 25.0).abs() < 1e-12);
        let d = calc_line_point_distance(0.0, 0.0, 10.0, 0.0, 5.0, 3.0);
        assert!((d.abs() - 3.0).abs() < 1e-12, "d={}", d);
    }

    #[test]
    fn test_intersection() {
        let p = calc_intersection(0.0, 0.0, 10.0, 10.0, 0.0, 10.0, 10.0, 0.0);
        let (x, y) = p.unwrap();
        assert!((x - 5.0).abs() < 1e-12 && (y - 5.0).abs() < 1e-12);
        assert!(calc_intersection(0.0, 0.0, 10.0, 0.0, 0.0, 1.0, 10.0, 1.0).is_none());
    }

    #[test]
    fn test_polygon_area() {
        let square = [(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)];
        assert!((calc_polygon_area(&square) - 100.0).abs() < 1e-12);
        let reversed: Vec<_> = square.iter().rev().copied().collect();
        assert!((calc_polygon_area(&reversed) + 100.0).abs() < 1e-12);
        assert_eq!(calc_polygon_area(&[]), 0.0);
    }

    #[test]
    fn test_point_in_polygon() {
        let tri = [(0.0, 0.0), (10.0, 0.0), (0.0, 10.0)];
        assert!(point_in_polygon(&tri, 2.0, 2.0));
        assert!(!point_in_polygon(&tri, 8.0, 8.0));
        assert!(!point_in_polygon(&tri[..2], 1.0, 0.0));
    }
}
