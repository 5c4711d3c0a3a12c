//! Curve flattening converter.
//!
//! Replaces `Curve3`/`Curve4` runs from the source with the `LineTo`
//! vertices of a [`Curve3Div`]/[`Curve4Div`] approximation; all other
//! commands pass through untouched.

use crate::basics::{PathCommand, Vertex, VertexSource};
use crate::curves::{Curve3Div, Curve4Div};

// ============================================================================
// ConvCurve
// ============================================================================

pub struct ConvCurve<VS> {
    source: VS,
    last_x: f64,
    last_y: f64,
    curve3: Curve3Div,
    curve4: Curve4Div,
}

impl<VS: VertexSource> ConvCurve<VS> {
    pub fn new(source: VS) -> Self {
        Self {
            source,
            last_x: 0.0,
            last_y: 0.0,
            curve3: Curve3Div::new(),
            curve4: Curve4Div::new(),
        }
    }

    pub fn source(&self) -> &VS {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut VS {
        &mut self.source
    }

    /// Scale factor from path units to device pixels; larger values give
    /// finer flattening.
    pub fn set_approximation_scale(&mut self, s: f64) {
        self.curve3.set_approximation_scale(s);
        self.curve4.set_approximation_scale(s);
    }

    pub fn approximation_scale(&self) -> f64 {
        self.curve4.approximation_scale()
    }

    pub fn set_angle_tolerance(&mut self, v: f64) {
        self.curve3.set_angle_tolerance(v);
        self.curve4.set_angle_tolerance(v);
    }

    pub fn angle_tolerance(&self) -> f64 {
        self.curve4.angle_tolerance()
    }

    /// Cubic curves only.
    pub fn set_cusp_limit(&mut self, v: f64) {
        self.curve4.set_cusp_limit(v);
    }

    pub fn cusp_limit(&self) -> f64 {
        self.curve4.cusp_limit()
    }

    /// Pull the next flattened point of an active curve, if any.
    fn pending(&mut self) -> Option<Vertex> {
        let v = self.curve3.next_vertex();
        if !v.cmd.is_stop() {
            return Some(v);
        }
        let v = self.curve4.next_vertex();
        if !v.cmd.is_stop() {
            return Some(v);
        }
        None
    }
}

impl<VS: VertexSource> VertexSource for ConvCurve<VS> {
    fn rewind(&mut self, path_id: u32) {
        self.source.rewind(path_id);
        self.last_x = 0.0;
        self.last_y = 0.0;
        self.curve3.reset();
        self.curve4.reset();
    }

    fn next_vertex(&mut self) -> Vertex {
        let mut v = match self.pending() {
            Some(p) => Vertex::new(p.x, p.y, PathCommand::LineTo),
            None => {
                let v = self.source.next_vertex();
                match v.cmd {
                    PathCommand::Curve3 => {
                        let end = self.source.next_vertex();
                        self.curve3
                            .init(self.last_x, self.last_y, v.x, v.y, end.x, end.y);
                        // Skip the MoveTo at the curve start.
                        self.curve3.next_vertex();
                        let p = self.curve3.next_vertex();
                        Vertex::new(p.x, p.y, PathCommand::LineTo)
                    }
                    PathCommand::Curve4 => {
                        let ctrl2 = self.source.next_vertex();
                        let end = self.source.next_vertex();
                        self.curve4.init(
                            self.last_x,
                            self.last_y,
                            v.x,
                            v.y,
                            ctrl2.x,
                            ctrl2.y,
                            end.x,
                            end.y,
                        );
                        self.curve4.next_vertex();
                        let p = self.curve4.next_vertex();
                        Vertex::new(p.x, p.y, PathCommand::LineTo)
                    }
                    _ => v,
                }
            }
        };
        if v.cmd.is_vertex() {
            self.last_x = v.x;
            self.last_y = v.y;
        } else {
            v.x = self.last_x;
            v.y = self.last_y;
        }
        v
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_storage::PathStorage;

    fn collect(cc: &mut ConvCurve<PathStorage>) -> Vec<Vertex> {
        cc.vertices(0).collect()
    }

    #[test]
    fn test_no_curves_passthrough() {
        let mut path = PathStorage::new();
        path.move_to(10.0, 20.0);
        path.line_to(30.0, 40.0);
        path.line_to(50.0, 60.0);
        path.close_polygon();

        let mut cc = ConvCurve::new(path);
        let verts = collect(&mut cc);
        assert_eq!(verts.len(), 4);
        assert_eq!(verts[0].cmd, PathCommand::MoveTo);
        assert_eq!(verts[2].x, 50.0);
        assert_eq!(verts[3].cmd, PathCommand::ClosePolygon);
    }

    #[test]
    fn test_curve3_flattening() {
        let mut path = PathStorage::new();
        path.move_to(0.0, 0.0);
        path.curve3(50.0, 100.0, 100.0, 0.0);

        let mut cc = ConvCurve::new(path);
        let verts = collect(&mut cc);
        assert!(verts.len() > 2, "got {} vertices", verts.len());
        assert_eq!(verts[0].cmd, PathCommand::MoveTo);
        assert!(verts[1..].iter().all(|v| v.cmd == PathCommand::LineTo));
        let last = verts[verts.len() - 1];
        assert_eq!((last.x, last.y), (100.0, 0.0));
    }

    #[test]
    fn test_curve4_flattening() {
        let mut path = PathStorage::new();
        path.move_to(0.0, 0.0);
        path.curve4(33.0, 100.0, 66.0, 100.0, 100.0, 0.0);

        let mut cc = ConvCurve::new(path);
        let verts = collect(&mut cc);
        assert!(verts.len() > 2);
        assert!(verts[1..].iter().all(|v| v.cmd == PathCommand::LineTo));
        let last = verts[verts.len() - 1];
        assert_eq!(last.x, 100.0);
    }

    #[test]
    fn test_mixed_lines_and_curves_keep_order() {
        let mut path = PathStorage::new();
        path.move_to(0.0, 0.0);
        path.line_to(50.0, 0.0);
        path.curve3(75.0, 50.0, 100.0, 0.0);
        path.line_to(150.0, 0.0);

        let mut cc = ConvCurve::new(path);
        let verts = collect(&mut cc);
        assert!(verts.len() > 4);
        let xs: Vec<f64> = verts.iter().map(|v| v.x).collect();
        assert!(xs.windows(2).all(|w| w[1] >= w[0]), "{:?}", xs);
        assert_eq!(verts[verts.len() - 1].x, 150.0);
    }

    #[test]
    fn test_approximation_scale_refines() {
        let mut path = PathStorage::new();
        path.move_to(0.0, 0.0);
        path.curve3(50.0, 100.0, 100.0, 0.0);

        let mut coarse = ConvCurve::new(path.clone());
        let n_coarse = collect(&mut coarse).len();
        let mut fine = ConvCurve::new(path);
        fine.set_approximation_scale(8.0);
        assert_eq!(fine.approximation_scale(), 8.0);
        assert!(collect(&mut fine).len() > n_coarse);
    }

    #[test]
    fn test_source_mut_edits_are_seen() {
        let mut cc = ConvCurve::new(PathStorage::new());
        cc.source_mut().move_to(1.0, 1.0);
        cc.source_mut().line_to(2.0, 2.0);
        assert_eq!(collect(&mut cc).len(), 2);
    }
}
