//! Path storage: the caller-facing vertex container.
//!
//! A flat `Vec<Vertex>` holding any number of sub-paths. Sub-paths start at
//! a `MoveTo` and end at `EndPoly`/`ClosePolygon`, or simply at the next
//! `MoveTo`. A `Stop` marker inserted by [`PathStorage::start_new_path`]
//! separates independently addressable paths; `rewind(id)` jumps to the
//! index returned there.

use crate::basics::{PathCommand, Vertex, VertexSource};
use crate::math::{calc_distance, VERTEX_DIST_EPSILON};
use crate::trans_affine::TransAffine;

#[derive(Debug, Clone, Default)]
pub struct PathStorage {
    vertices: Vec<Vertex>,
    iterator: usize,
}

impl PathStorage {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            iterator: 0,
        }
    }

    /// Remove all vertices, keeping the allocation for reuse.
    pub fn remove_all(&mut self) {
        self.vertices.clear();
        self.iterator = 0;
    }

    // ---------------------------------------------------------------
    // Path construction
    // ---------------------------------------------------------------

    /// Terminate the current path with `Stop` (unless it already ends in
    /// one) and return the id the next path will be reachable under.
    pub fn start_new_path(&mut self) -> u32 {
        if !self.last_command().is_stop() {
            self.vertices.push(Vertex::stop());
        }
        self.vertices.len() as u32
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.vertices.push(Vertex::new(x, y, PathCommand::MoveTo));
    }

    pub fn move_rel(&mut self, dx: f64, dy: f64) {
        let (x, y) = self.rel_to_abs(dx, dy);
        self.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.vertices.push(Vertex::new(x, y, PathCommand::LineTo));
    }

    pub fn line_rel(&mut self, dx: f64, dy: f64) {
        let (x, y) = self.rel_to_abs(dx, dy);
        self.line_to(x, y);
    }

    pub fn hline_to(&mut self, x: f64) {
        self.line_to(x, self.last_y());
    }

    pub fn hline_rel(&mut self, dx: f64) {
        let (x, y) = self.rel_to_abs(dx, 0.0);
        self.line_to(x, y);
    }

    pub fn vline_to(&mut self, y: f64) {
        self.line_to(self.last_x(), y);
    }

    pub fn vline_rel(&mut self, dy: f64) {
        let (x, y) = self.rel_to_abs(0.0, dy);
        self.line_to(x, y);
    }

    /// Quadratic Bézier: control point then end point, both tagged `Curve3`.
    pub fn curve3(&mut self, x_ctrl: f64, y_ctrl: f64, x_to: f64, y_to: f64) {
        self.vertices
            .push(Vertex::new(x_ctrl, y_ctrl, PathCommand::Curve3));
        self.vertices
            .push(Vertex::new(x_to, y_to, PathCommand::Curve3));
    }

    pub fn curve3_rel(&mut self, dx_ctrl: f64, dy_ctrl: f64, dx_to: f64, dy_to: f64) {
        let (x_ctrl, y_ctrl) = self.rel_to_abs(dx_ctrl, dy_ctrl);
        let (x_to, y_to) = self.rel_to_abs(dx_to, dy_to);
        self.curve3(x_ctrl, y_ctrl, x_to, y_to);
    }

    /// Quadratic Bézier whose control point mirrors the previous one.
    /// Ignored when there is no current point.
    pub fn curve3_smooth(&mut self, x_to: f64, y_to: f64) {
        if let Some((x_ctrl, y_ctrl)) = self.reflected_control() {
            self.curve3(x_ctrl, y_ctrl, x_to, y_to);
        }
    }

    /// Cubic Bézier: two control points then the end point, all `Curve4`.
    #[allow(clippy::too_many_arguments)]
    pub fn curve4(
        &mut self,
        x_ctrl1: f64,
        y_ctrl1: f64,
        x_ctrl2: f64,
        y_ctrl2: f64,
        x_to: f64,
        y_to: f64,
    ) {
        self.vertices
            .push(Vertex::new(x_ctrl1, y_ctrl1, PathCommand::Curve4));
        self.vertices
            .push(Vertex::new(x_ctrl2, y_ctrl2, PathCommand::Curve4));
        self.vertices
            .push(Vertex::new(x_to, y_to, PathCommand::Curve4));
    }

    /// Relative cubic Bézier. All three points are offsets from the current
    /// point as it was before the call.
    #[allow(clippy::too_many_arguments)]
    pub fn curve4_rel(
        &mut self,
        dx_ctrl1: f64,
        dy_ctrl1: f64,
        dx_ctrl2: f64,
        dy_ctrl2: f64,
        dx_to: f64,
        dy_to: f64,
    ) {
        let (x_ctrl1, y_ctrl1) = self.rel_to_abs(dx_ctrl1, dy_ctrl1);
        let (x_ctrl2, y_ctrl2) = self.rel_to_abs(dx_ctrl2, dy_ctrl2);
        let (x_to, y_to) = self.rel_to_abs(dx_to, dy_to);
        self.curve4(x_ctrl1, y_ctrl1, x_ctrl2, y_ctrl2, x_to, y_to);
    }

    pub fn curve4_smooth(&mut self, x_ctrl2: f64, y_ctrl2: f64, x_to: f64, y_to: f64) {
        if let Some((x_ctrl1, y_ctrl1)) = self.reflected_control() {
            self.curve4(x_ctrl1, y_ctrl1, x_ctrl2, y_ctrl2, x_to, y_to);
        }
    }

    fn reflected_control(&self) -> Option<(f64, f64)> {
        let last = self.last_vertex().filter(|v| v.cmd.is_vertex())?;
        match self.prev_vertex() {
            Some(prev) if prev.cmd.is_curve() => {
                Some((last.x + last.x - prev.x, last.y + last.y - prev.y))
            }
            _ => Some((last.x, last.y)),
        }
    }

    /// End the current sub-path as open. No-op unless the last command
    /// carries a coordinate.
    pub fn end_poly(&mut self) {
        if self.last_command().is_vertex() {
            self.vertices.push(Vertex::command(PathCommand::EndPoly));
        }
    }

    /// End the current sub-path as closed.
    pub fn close_polygon(&mut self) {
        if self.last_command().is_vertex() {
            self.vertices
                .push(Vertex::command(PathCommand::ClosePolygon));
        }
    }

    // ---------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------

    pub fn total_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Offset `(dx, dy)` by the last vertex when it carries a coordinate.
    pub fn rel_to_abs(&self, dx: f64, dy: f64) -> (f64, f64) {
        match self.last_vertex() {
            Some(v) if v.cmd.is_vertex() => (dx + v.x, dy + v.y),
            _ => (dx, dy),
        }
    }

    pub fn last_vertex(&self) -> Option<Vertex> {
        self.vertices.last().copied()
    }

    pub fn prev_vertex(&self) -> Option<Vertex> {
        let n = self.vertices.len();
        if n < 2 {
            return None;
        }
        Some(self.vertices[n - 2])
    }

    pub fn last_command(&self) -> PathCommand {
        self.vertices.last().map_or(PathCommand::Stop, |v| v.cmd)
    }

    pub fn last_x(&self) -> f64 {
        self.vertices.last().map_or(0.0, |v| v.x)
    }

    pub fn last_y(&self) -> f64 {
        self.vertices.last().map_or(0.0, |v| v.y)
    }

    pub fn vertex_at(&self, idx: usize) -> Option<Vertex> {
        self.vertices.get(idx).copied()
    }

    pub fn command(&self, idx: usize) -> PathCommand {
        self.vertices.get(idx).map_or(PathCommand::Stop, |v| v.cmd)
    }

    pub fn modify_vertex(&mut self, idx: usize, x: f64, y: f64) {
        if let Some(v) = self.vertices.get_mut(idx) {
            v.x = x;
            v.y = y;
        }
    }

    pub fn as_slice(&self) -> &[Vertex] {
        &self.vertices
    }

    // ---------------------------------------------------------------
    // Concatenation and joining
    // ---------------------------------------------------------------

    /// Append every vertex of `vs` unchanged.
    pub fn concat_path<VS: VertexSource + ?Sized>(&mut self, vs: &mut VS, path_id: u32) {
        vs.rewind(path_id);
        loop {
            let v = vs.next_vertex();
            if v.cmd.is_stop() {
                break;
            }
            self.vertices.push(v);
        }
    }

    /// Append `vs` with the pen down: its leading `MoveTo` becomes a
    /// `LineTo` when this path already has a current point.
    pub fn join_path<VS: VertexSource + ?Sized>(&mut self, vs: &mut VS, path_id: u32) {
        vs.rewind(path_id);
        let mut v = vs.next_vertex();
        if v.cmd.is_stop() {
            return;
        }
        if v.cmd.is_vertex() {
            let last = self.last_vertex();
            match last {
                Some(l) if l.cmd.is_vertex() => {
                    if calc_distance(v.x, v.y, l.x, l.y) > VERTEX_DIST_EPSILON {
                        if v.cmd.is_move_to() {
                            v.cmd = PathCommand::LineTo;
                        }
                        self.vertices.push(v);
                    }
                }
                _ => {
                    if self.last_command().is_stop() {
                        v.cmd = PathCommand::MoveTo;
                    } else if v.cmd.is_move_to() {
                        v.cmd = PathCommand::LineTo;
                    }
                    self.vertices.push(v);
                }
            }
        }
        loop {
            let mut v = vs.next_vertex();
            if v.cmd.is_stop() {
                break;
            }
            if v.cmd.is_move_to() {
                v.cmd = PathCommand::LineTo;
            }
            self.vertices.push(v);
        }
    }

    /// Append a polygon from flat `[x0, y0, x1, y1, ...]` data.
    pub fn concat_poly(&mut self, data: &[f64], closed: bool) {
        let mut adaptor = PolyPlainAdaptor::new(data, closed);
        self.concat_path(&mut adaptor, 0);
    }

    pub fn join_poly(&mut self, data: &[f64], closed: bool) {
        let mut adaptor = PolyPlainAdaptor::new(data, closed);
        self.join_path(&mut adaptor, 0);
    }

    // ---------------------------------------------------------------
    // Whole-path edits
    // ---------------------------------------------------------------

    pub fn translate_all_paths(&mut self, dx: f64, dy: f64) {
        for v in self.vertices.iter_mut().filter(|v| v.cmd.is_vertex()) {
            v.x += dx;
            v.y += dy;
        }
    }

    /// Apply `mtx` to every coordinate in place.
    pub fn transform_all_paths(&mut self, mtx: &TransAffine) {
        for v in self.vertices.iter_mut().filter(|v| v.cmd.is_vertex()) {
            mtx.transform(&mut v.x, &mut v.y);
        }
    }

    pub fn flip_x(&mut self, x1: f64, x2: f64) {
        for v in self.vertices.iter_mut().filter(|v| v.cmd.is_vertex()) {
            v.x = x2 - v.x + x1;
        }
    }

    pub fn flip_y(&mut self, y1: f64, y2: f64) {
        for v in self.vertices.iter_mut().filter(|v| v.cmd.is_vertex()) {
            v.y = y2 - v.y + y1;
        }
    }

    /// Bounding box `(x1, y1, x2, y2)` of all coordinates, `None` when the
    /// path has none.
    pub fn bounding_rect(&self) -> Option<(f64, f64, f64, f64)> {
        self.vertices
            .iter()
            .filter(|v| v.cmd.is_vertex())
            .fold(None, |acc, v| {
                Some(match acc {
                    None => (v.x, v.y, v.x, v.y),
                    Some((x1, y1, x2, y2)) => {
                        (x1.min(v.x), y1.min(v.y), x2.max(v.x), y2.max(v.y))
                    }
                })
            })
    }
}

impl VertexSource for PathStorage {
    fn rewind(&mut self, path_id: u32) {
        self.iterator = path_id as usize;
    }

    fn next_vertex(&mut self) -> Vertex {
        match self.vertices.get(self.iterator) {
            Some(&v) => {
                self.iterator += 1;
                v
            }
            None => Vertex::stop(),
        }
    }
}

// ===================================================================
// PolyPlainAdaptor
// ===================================================================

/// Flat coordinate slice `[x0, y0, x1, y1, ...]` as a vertex source.
/// A trailing odd value is ignored.
pub struct PolyPlainAdaptor<'a> {
    data: &'a [f64],
    index: usize,
    closed: bool,
    stop: bool,
}

impl<'a> PolyPlainAdaptor<'a> {
    pub fn new(data: &'a [f64], closed: bool) -> Self {
        Self {
            data,
            index: 0,
            closed,
            stop: false,
        }
    }
}

impl VertexSource for PolyPlainAdaptor<'_> {
    fn rewind(&mut self, _path_id: u32) {
        self.index = 0;
        self.stop = false;
    }

    fn next_vertex(&mut self) -> Vertex {
        if self.index + 1 < self.data.len() {
            let cmd = if self.index == 0 {
                PathCommand::MoveTo
            } else {
                PathCommand::LineTo
            };
            let v = Vertex::new(self.data[self.index], self.data[self.index + 1], cmd);
            self.index += 2;
            return v;
        }
        if self.closed && !self.stop && !self.data.is_empty() {
            self.stop = true;
            return Vertex::command(PathCommand::ClosePolygon);
        }
        Vertex::stop()
    }
}
