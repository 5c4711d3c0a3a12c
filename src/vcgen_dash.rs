//! Dash vertex generator.
//!
//! Walks the accumulated center line by arc length and emits the "on"
//! intervals of a repeating dash pattern as separate open sub-paths
//! (`MoveTo` at the start of every dash, `LineTo` along it).

use crate::array::{shorten_path, VertexDist, VertexSequence};
use crate::basics::{PathCommand, Vertex, VertexSource};
use crate::conv_adaptor_vcgen::VertexGenerator;

/// Maximum number of `(dash, gap)` pairs in one pattern.
pub const MAX_DASH_PAIRS: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    Ready,
    Polyline,
    Stop,
}

#[derive(Debug, Clone)]
pub struct VcgenDash {
    /// Alternating dash and gap lengths.
    dashes: Vec<f64>,
    total_dash_len: f64,
    dash_start: f64,
    shorten: f64,
    curr_dash_start: f64,
    curr_dash: usize,
    curr_rest: f64,
    v1_idx: usize,
    v2_idx: usize,
    src_vertices: VertexSequence,
    closed: bool,
    status: Status,
    src_vertex: usize,
}

impl VcgenDash {
    pub fn new() -> Self {
        Self {
            dashes: Vec::with_capacity(MAX_DASH_PAIRS * 2),
            total_dash_len: 0.0,
            dash_start: 0.0,
            shorten: 0.0,
            curr_dash_start: 0.0,
            curr_dash: 0,
            curr_rest: 0.0,
            v1_idx: 0,
            v2_idx: 0,
            src_vertices: VertexSequence::new(),
            closed: false,
            status: Status::Initial,
            src_vertex: 0,
        }
    }

    pub fn remove_all_dashes(&mut self) {
        self.dashes.clear();
        self.total_dash_len = 0.0;
        self.curr_dash_start = 0.0;
        self.curr_dash = 0;
    }

    /// Append a `(dash, gap)` pair. Pairs beyond [`MAX_DASH_PAIRS`] are
    /// ignored; returns whether the pair was stored.
    pub fn add_dash(&mut self, dash_len: f64, gap_len: f64) -> bool {
        if self.dashes.len() >= MAX_DASH_PAIRS * 2 {
            return false;
        }
        self.total_dash_len += dash_len + gap_len;
        self.dashes.push(dash_len);
        self.dashes.push(gap_len);
        true
    }

    pub fn num_dash_pairs(&self) -> usize {
        self.dashes.len() / 2
    }

    pub fn total_dash_len(&self) -> f64 {
        self.total_dash_len
    }

    /// Offset into the pattern at which every sub-path starts.
    pub fn dash_start(&mut self, ds: f64) {
        self.dash_start = ds;
        self.calc_dash_start(ds.abs());
    }

    fn calc_dash_start(&mut self, mut ds: f64) {
        self.curr_dash = 0;
        self.curr_dash_start = 0.0;
        if self.total_dash_len <= 0.0 {
            return;
        }
        ds %= self.total_dash_len;
        while ds > 0.0 {
            let len = self.dashes[self.curr_dash];
            if ds > len {
                ds -= len;
                self.curr_dash = (self.curr_dash + 1) % self.dashes.len();
                self.curr_dash_start = 0.0;
            } else {
                self.curr_dash_start = ds;
                ds = 0.0;
            }
        }
    }

    pub fn set_shorten(&mut self, s: f64) {
        self.shorten = s;
    }

    pub fn shorten(&self) -> f64 {
        self.shorten
    }

    /// Advance to the target vertex after `v1_idx`, wrapping once for
    /// closed paths.
    fn advance_segment(&mut self) {
        self.src_vertex += 1;
        self.v1_idx = self.v2_idx;
        self.curr_rest = self.src_vertices[self.v1_idx].dist;
        let n = self.src_vertices.len();
        if self.closed {
            if self.src_vertex > n {
                self.status = Status::Stop;
            } else {
                self.v2_idx = if self.src_vertex >= n {
                    0
                } else {
                    self.src_vertex
                };
            }
        } else if self.src_vertex >= n {
            self.status = Status::Stop;
        } else {
            self.v2_idx = self.src_vertex;
        }
    }
}

impl Default for VcgenDash {
    fn default() -> Self {
        Self::new()
    }
}

impl VertexGenerator for VcgenDash {
    fn remove_all(&mut self) {
        self.status = Status::Initial;
        self.src_vertices.remove_all();
        self.closed = false;
    }

    fn add_vertex(&mut self, x: f64, y: f64, cmd: PathCommand) {
        self.status = Status::Initial;
        if cmd.is_move_to() {
            self.src_vertices.modify_last(VertexDist::new(x, y));
        } else if cmd.is_vertex() {
            self.src_vertices.add(VertexDist::new(x, y));
        } else {
            self.closed = cmd.is_close();
        }
    }
}

impl VertexSource for VcgenDash {
    fn rewind(&mut self, _path_id: u32) {
        if self.status == Status::Initial {
            self.src_vertices.close(self.closed);
            shorten_path(&mut self.src_vertices, self.shorten, self.closed);
        }
        self.status = Status::Ready;
        self.src_vertex = 0;
    }

    fn next_vertex(&mut self) -> Vertex {
        loop {
            match self.status {
                Status::Initial => self.rewind(0),
                Status::Ready => {
                    if self.dashes.len() < 2
                        || self.total_dash_len <= 0.0
                        || self.src_vertices.len() < 2
                    {
                        self.status = Status::Stop;
                        continue;
                    }
                    self.status = Status::Polyline;
                    self.src_vertex = 1;
                    self.v1_idx = 0;
                    self.v2_idx = 1;
                    self.curr_rest = self.src_vertices[0].dist;
                    if self.dash_start >= 0.0 {
                        self.calc_dash_start(self.dash_start);
                    }
                    let v = self.src_vertices[0];
                    return Vertex::new(v.x, v.y, PathCommand::MoveTo);
                }
                Status::Polyline => {
                    let dash_rest = self.dashes[self.curr_dash] - self.curr_dash_start;
                    // Odd entries are gaps: the point that ends a gap starts a new dash.
                    let cmd = if self.curr_dash & 1 != 0 {
                        PathCommand::MoveTo
                    } else {
                        PathCommand::LineTo
                    };
                    let v1 = self.src_vertices[self.v1_idx];
                    let v2 = self.src_vertices[self.v2_idx];

                    if self.curr_rest > dash_rest {
                        self.curr_rest -= dash_rest;
                        self.curr_dash = (self.curr_dash + 1) % self.dashes.len();
                        self.curr_dash_start = 0.0;
                        let k = self.curr_rest / v1.dist;
                        return Vertex::new(v2.x - (v2.x - v1.x) * k, v2.y - (v2.y - v1.y) * k, cmd);
                    }
                    self.curr_dash_start += self.curr_rest;
                    self.advance_segment();
                    return Vertex::new(v2.x, v2.y, cmd);
                }
                Status::Stop => return Vertex::stop(),
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
