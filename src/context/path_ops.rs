//! Building the current path. Coordinates are world units; the transform
//! is applied when the path is drawn, not when it is built.

use super::RenderingContext;
use crate::path_storage::PathStorage;
use crate::pixfmt_rgba::Blender;

impl<'a, B: Blender> RenderingContext<'a, B> {
    #[inline]
    fn storage(&mut self) -> &mut PathStorage {
        self.path.source_mut()
    }

    /// The current path.
    pub fn path(&self) -> &PathStorage {
        self.path.source()
    }

    pub fn reset_path(&mut self) {
        self.storage().remove_all();
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.storage().move_to(x, y);
    }

    pub fn move_rel(&mut self, dx: f64, dy: f64) {
        self.storage().move_rel(dx, dy);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.storage().line_to(x, y);
    }

    pub fn line_rel(&mut self, dx: f64, dy: f64) {
        self.storage().line_rel(dx, dy);
    }

    pub fn hor_line_to(&mut self, x: f64) {
        self.storage().hline_to(x);
    }

    pub fn ver_line_to(&mut self, y: f64) {
        self.storage().vline_to(y);
    }

    /// Quadratic Bézier to `(x, y)` with control point `(cx, cy)`.
    pub fn quad_curve_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.storage().curve3(cx, cy, x, y);
    }

    /// Cubic Bézier to `(x, y)` with control points `(c1x, c1y)` and
    /// `(c2x, c2y)`.
    pub fn cubic_curve_to(&mut self, c1x: f64, c1y: f64, c2x: f64, c2y: f64, x: f64, y: f64) {
        self.storage().curve4(c1x, c1y, c2x, c2y, x, y);
    }

    pub fn close_polygon(&mut self) {
        self.storage().close_polygon();
    }

    /// Append a polyline given as flat `x, y` pairs as a new sub-path. A
    /// trailing odd coordinate is ignored.
    pub fn add_polygon(&mut self, points: &[f64], closed: bool) {
        self.storage().concat_poly(points, closed);
    }
}

#[cfg(test)]
mod tests {
    use crate::basics::PathCommand;
    use crate::context::Context;

    #[test]
    fn test_path_building() {
        let mut buf = vec![0u8; 16];
        let mut ctx = Context::attach(&mut buf, 2, 2, 8).unwrap();
        ctx.move_to(1.0, 1.0);
        ctx.line_rel(2.0, 0.0);
        ctx.ver_line_to(5.0);
        ctx.hor_line_to(0.0);
        ctx.close_polygon();
        let p = ctx.path();
        assert_eq!(p.total_vertices(), 5);
        let v = p.vertex_at(1).unwrap();
        assert_eq!((v.x, v.y), (3.0, 1.0));
        let v = p.vertex_at(3).unwrap();
        assert_eq!((v.x, v.y), (0.0, 5.0));
        assert!(p.command(4).is_end_poly());

        ctx.reset_path();
        assert!(ctx.path().is_empty());
    }

    #[test]
    fn test_curves_store_control_points() {
        let mut buf = vec![0u8; 16];
        let mut ctx = Context::attach(&mut buf, 2, 2, 8).unwrap();
        ctx.move_to(0.0, 0.0);
        ctx.quad_curve_to(5.0, 5.0, 10.0, 0.0);
        ctx.cubic_curve_to(1.0, 1.0, 2.0, 2.0, 3.0, 3.0);
        let p = ctx.path();
        assert_eq!(p.total_vertices(), 6);
        assert_eq!(p.command(1), PathCommand::Curve3);
        assert_eq!(p.command(3), PathCommand::Curve4);
    }

    #[test]
    fn test_add_polygon() {
        let mut buf = vec![0u8; 16];
        let mut ctx = Context::attach(&mut buf, 2, 2, 8).unwrap();
        ctx.add_polygon(&[0.0, 0.0, 4.0, 0.0, 4.0, 4.0], true);
        let p = ctx.path();
        assert_eq!(p.command(0), PathCommand::MoveTo);
        assert!(p.command(p.total_vertices() - 1).is_close());
    }
}
