//! Turns one center-line sub-path into the polygon outline of its stroke.
//!
//! An open path becomes a single ring: start cap, left side, end cap, right
//! side. A closed path becomes two rings, outer and inner.

use crate::array::{shorten_path, VertexDist, VertexSequence};
use crate::basics::{PathCommand, Vertex, VertexSource};
use crate::conv_adaptor_vcgen::VertexGenerator;
use crate::math_stroke::{InnerJoin, LineCap, LineJoin, MathStroke, StrokePoints};

#[derive(Debug, Clone)]
pub struct VcgenStroke {
    stroker: MathStroke,
    src_vertices: VertexSequence,
    shorten: f64,
    closed: bool,
    prepared: bool,
    /// Points of the cap or join being appended.
    joint: StrokePoints,
    outline: Vec<Vertex>,
    pos: usize,
}

impl VcgenStroke {
    pub fn new() -> Self {
        Self {
            stroker: MathStroke::new(),
            src_vertices: VertexSequence::new(),
            shorten: 0.0,
            closed: false,
            prepared: false,
            joint: Vec::new(),
            outline: Vec::new(),
            pos: 0,
        }
    }

    pub fn set_line_cap(&mut self, lc: LineCap) {
        self.stroker.set_line_cap(lc);
    }

    pub fn line_cap(&self) -> LineCap {
        self.stroker.line_cap()
    }

    pub fn set_line_join(&mut self, lj: LineJoin) {
        self.stroker.set_line_join(lj);
    }

    pub fn line_join(&self) -> LineJoin {
        self.stroker.line_join()
    }

    pub fn set_inner_join(&mut self, ij: InnerJoin) {
        self.stroker.set_inner_join(ij);
    }

    pub fn inner_join(&self) -> InnerJoin {
        self.stroker.inner_join()
    }

    pub fn set_width(&mut self, w: f64) {
        self.stroker.set_width(w);
    }

    pub fn width(&self) -> f64 {
        self.stroker.width()
    }

    pub fn set_miter_limit(&mut self, ml: f64) {
        self.stroker.set_miter_limit(ml);
    }

    pub fn miter_limit(&self) -> f64 {
        self.stroker.miter_limit()
    }

    pub fn set_miter_limit_theta(&mut self, t: f64) {
        self.stroker.set_miter_limit_theta(t);
    }

    pub fn set_inner_miter_limit(&mut self, ml: f64) {
        self.stroker.set_inner_miter_limit(ml);
    }

    pub fn inner_miter_limit(&self) -> f64 {
        self.stroker.inner_miter_limit()
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.stroker.set_approximation_scale(s);
    }

    pub fn approximation_scale(&self) -> f64 {
        self.stroker.approximation_scale()
    }

    /// Length trimmed from the end of every open sub-path before stroking.
    pub fn set_shorten(&mut self, s: f64) {
        self.shorten = s;
    }

    pub fn shorten(&self) -> f64 {
        self.shorten
    }

    /// Finish the vertex sequence and apply `shorten`, once per set of input
    /// vertices. Under three points a path is stroked as open.
    fn prepare(&mut self) {
        self.src_vertices.close(self.closed);
        shorten_path(&mut self.src_vertices, self.shorten, self.closed);
        if self.src_vertices.len() < 3 {
            self.closed = false;
        }
        self.prepared = true;
    }

    fn cap(&mut self, at: usize, toward: usize) {
        let (v0, v1) = (self.src_vertices.cyclic(at), self.src_vertices.cyclic(toward));
        let len = if at < toward { v0.dist } else { v1.dist };
        self.stroker.calc_cap(&mut self.joint, &v0, &v1, len);
    }

    /// Join at vertex `i`, walking forward along the path or back.
    fn join(&mut self, i: usize, forward: bool) {
        let n = self.src_vertices.len();
        let prev = self.src_vertices.cyclic(i + n - 1);
        let curr = self.src_vertices.cyclic(i);
        let next = self.src_vertices.cyclic(i + 1);
        if forward {
            self.stroker
                .calc_join(&mut self.joint, &prev, &curr, &next, prev.dist, curr.dist);
        } else {
            self.stroker
                .calc_join(&mut self.joint, &next, &curr, &prev, curr.dist, prev.dist);
        }
    }

    /// Move the pending joint points onto the outline. The first point after
    /// `ring_start` is set opens a new ring.
    fn emit(&mut self, ring_start: &mut bool) {
        for &(x, y) in &self.joint {
            let cmd = if std::mem::take(ring_start) {
                PathCommand::MoveTo
            } else {
                PathCommand::LineTo
            };
            self.outline.push(Vertex::new(x, y, cmd));
        }
    }

    fn close_ring(&mut self, ring_start: &mut bool) {
        self.outline.push(Vertex::command(PathCommand::ClosePolygon));
        *ring_start = true;
    }

    fn build_outline(&mut self) {
        self.outline.clear();
        let n = self.src_vertices.len();
        if n < 2 + self.closed as usize {
            return;
        }
        let mut ring_start = true;
        if self.closed {
            for i in 0..n {
                self.join(i, true);
                self.emit(&mut ring_start);
            }
            self.close_ring(&mut ring_start);
            for i in (0..n).rev() {
                self.join(i, false);
                self.emit(&mut ring_start);
            }
        } else {
            self.cap(0, 1);
            self.emit(&mut ring_start);
            for i in 1..n - 1 {
                self.join(i, true);
                self.emit(&mut ring_start);
            }
            self.cap(n - 1, n - 2);
            self.emit(&mut ring_start);
            for i in (1..n - 1).rev() {
                self.join(i, false);
                self.emit(&mut ring_start);
            }
        }
        self.close_ring(&mut ring_start);
    }
}

impl Default for VcgenStroke {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexGenerator for VcgenStroke {
    fn remove_all(&mut self) {
        self.src_vertices.remove_all();
        self.closed = false;
        self.prepared = false;
        self.outline.clear();
    }

    fn add_vertex(&mut self, x: f64, y: f64, cmd: PathCommand) {
        self.prepared = false;
        if cmd.is_move_to() {
            self.src_vertices.modify_last(VertexDist::new(x, y));
        } else if cmd.is_vertex() {
            self.src_vertices.add(VertexDist::new(x, y));
        } else {
            self.closed = cmd.is_close();
        }
    }
}

impl VertexSource for VcgenStroke {
    /// Rebuilds the outline, so stroke settings changed since the last pass
    /// take effect.
    fn rewind(&mut self, _path_id: u32) {
        if !self.prepared {
            self.prepare();
        }
        self.build_outline();
        self.pos = 0;
    }

    fn next_vertex(&mut self) -> Vertex {
        if !self.prepared {
            self.rewind(0);
        }
        match self.outline.get(self.pos) {
            Some(&v) => {
                self.pos += 1;
                v
            }
            None => Vertex::stop(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(gen: &mut VcgenStroke) -> Vec<Vertex> {
        gen.vertices(0).collect()
    }

    fn segment(gen: &mut VcgenStroke) {
        gen.add_vertex(0.0, 0.0, PathCommand::MoveTo);
        gen.add_vertex(100.0, 0.0, PathCommand::LineTo);
    }

    #[test]
    fn test_empty_produces_stop() {
        let mut gen = VcgenStroke::new();
        assert!(collect(&mut gen).is_empty());
    }

    #[test]
    fn test_single_segment_is_one_closed_rectangle() {
        let mut gen = VcgenStroke::new();
        gen.set_width(10.0);
        segment(&mut gen);

        let verts = collect(&mut gen);
        assert_eq!(verts.len(), 5, "{:?}", verts);
        assert_eq!(verts[0].cmd, PathCommand::MoveTo);
        assert!(verts[1..4].iter().all(|v| v.cmd == PathCommand::LineTo));
        assert_eq!(verts[4].cmd, PathCommand::ClosePolygon);
        let max_y = verts[..4].iter().map(|v| v.y).fold(f64::MIN, f64::max);
        let min_y = verts[..4].iter().map(|v| v.y).fold(f64::MAX, f64::min);
        assert!((max_y - 5.0).abs() < 1e-9 && (min_y + 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_closed_triangle_two_rings() {
        let mut gen = VcgenStroke::new();
        gen.set_width(4.0);
        gen.add_vertex(10.0, 10.0, PathCommand::MoveTo);
        gen.add_vertex(50.0, 10.0, PathCommand::LineTo);
        gen.add_vertex(30.0, 40.0, PathCommand::LineTo);
        gen.add_vertex(0.0, 0.0, PathCommand::ClosePolygon);

        let verts = collect(&mut gen);
        let moves = verts.iter().filter(|v| v.cmd == PathCommand::MoveTo).count();
        let closes = verts
            .iter()
            .filter(|v| v.cmd == PathCommand::ClosePolygon)
            .count();
        assert_eq!(moves, 2);
        assert_eq!(closes, 2);
    }

    #[test]
    fn test_end_poly_keeps_path_open() {
        let mut gen = VcgenStroke::new();
        gen.add_vertex(0.0, 0.0, PathCommand::MoveTo);
        gen.add_vertex(10.0, 0.0, PathCommand::LineTo);
        gen.add_vertex(10.0, 10.0, PathCommand::LineTo);
        gen.add_vertex(0.0, 0.0, PathCommand::EndPoly);
        let verts = collect(&mut gen);
        let moves = verts.iter().filter(|v| v.cmd == PathCommand::MoveTo).count();
        assert_eq!(moves, 1);
    }

    #[test]
    fn test_rewind_replays() {
        let mut gen = VcgenStroke::new();
        gen.set_width(10.0);
        segment(&mut gen);
        let a = collect(&mut gen);
        let b = collect(&mut gen);
        assert_eq!(a, b);
    }

    #[test]
    fn test_remove_all() {
        let mut gen = VcgenStroke::new();
        segment(&mut gen);
        gen.remove_all();
        assert!(collect(&mut gen).is_empty());
    }

    #[test]
    fn test_round_cap_produces_more_vertices() {
        let mut butt = VcgenStroke::new();
        butt.set_width(20.0);
        segment(&mut butt);

        let mut round = VcgenStroke::new();
        round.set_width(20.0);
        round.set_line_cap(LineCap::Round);
        segment(&mut round);

        assert!(collect(&mut round).len() > collect(&mut butt).len());
    }

    #[test]
    fn test_shorten_trims_end() {
        let mut gen = VcgenStroke::new();
        gen.set_width(2.0);
        gen.set_shorten(30.0);
        segment(&mut gen);
        let max_x = collect(&mut gen).iter().map(|v| v.x).fold(f64::MIN, f64::max);
        assert!((max_x - 70.0).abs() < 1e-9, "max_x={}", max_x);
    }

    #[test]
    fn test_degenerate_single_point_emits_nothing() {
        let mut gen = VcgenStroke::new();
        gen.add_vertex(5.0, 5.0, PathCommand::MoveTo);
        gen.add_vertex(5.0, 5.0, PathCommand::LineTo);
        assert!(collect(&mut gen).is_empty());
    }

    #[test]
    fn test_width_change_applies_on_rewind() {
        let mut gen = VcgenStroke::new();
        gen.set_width(10.0);
        segment(&mut gen);
        let narrow = collect(&mut gen);
        gen.set_width(20.0);
        let wide = collect(&mut gen);
        assert_eq!(narrow.len(), wide.len());
        let max_y = |vs: &[Vertex]| vs.iter().map(|v| v.y).fold(f64::MIN, f64::max);
        assert!((max_y(&narrow) - 5.0).abs() < 1e-9);
        assert!((max_y(&wide) - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_polyline_walks_both_sides() {
        let mut gen = VcgenStroke::new();
        gen.set_width(2.0);
        gen.add_vertex(0.0, 0.0, PathCommand::MoveTo);
        gen.add_vertex(10.0, 0.0, PathCommand::LineTo);
        gen.add_vertex(10.0, 10.0, PathCommand::LineTo);
        let verts = collect(&mut gen);
        assert_eq!(verts[0].cmd, PathCommand::MoveTo);
        assert_eq!(verts.last().map(|v| v.cmd), Some(PathCommand::ClosePolygon));
        let moves = verts.iter().filter(|v| v.cmd == PathCommand::MoveTo).count();
        assert_eq!(moves, 1);
        // The outline reaches one half-width past the bend on the outer side.
        let max_x = verts.iter().map(|v| v.x).fold(f64::MIN, f64::max);
        assert!((max_x - 11.0).abs() < 1e-9, "max_x={}", max_x);
    }
}
