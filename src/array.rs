//! Vertex sequences with coincident-point filtering.
//!
//! The stroke and dash generators accumulate their input in a
//! [`VertexSequence`], which keeps the distance from every vertex to the next
//! one and drops points that coincide with their predecessor.

use crate::math::{calc_distance, VERTEX_DIST_EPSILON};

// ============================================================================
// VertexDist
// ============================================================================

/// A vertex plus the distance to the following vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexDist {
    pub x: f64,
    pub y: f64,
    pub dist: f64,
}

impl VertexDist {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, dist: 0.0 }
    }

    /// Store the distance to `val`. Returns `false` for coincident points,
    /// in which case `dist` is set to `1 / VERTEX_DIST_EPSILON`.
    pub fn calc_dist(&mut self, val: &VertexDist) -> bool {
        self.dist = calc_distance(self.x, self.y, val.x, val.y);
        let ret = self.dist > VERTEX_DIST_EPSILON;
        if !ret {
            self.dist = 1.0 / VERTEX_DIST_EPSILON;
        }
        ret
    }
}

// ============================================================================
// VertexSequence
// ============================================================================

/// Growable vertex list that removes coincident points lazily: a duplicate
/// is detected (and dropped) when the next vertex arrives or on `close`.
#[derive(Debug, Clone, Default)]
pub struct VertexSequence {
    vertices: Vec<VertexDist>,
}

impl VertexSequence {
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn add(&mut self, val: VertexDist) {
        let n = self.vertices.len();
        if n > 1 {
            let last = self.vertices[n - 1];
            if !self.vertices[n - 2].calc_dist(&last) {
                self.vertices.pop();
            }
        }
        self.vertices.push(val);
    }

    pub fn modify_last(&mut self, val: VertexDist) {
        self.vertices.pop();
        self.add(val);
    }

    /// Finish the sequence: drop trailing duplicates and, when `closed`,
    /// any tail vertices that coincide with the first one. Afterwards every
    /// `dist` is valid, including the closing edge's for closed paths.
    pub fn close(&mut self, closed: bool) {
        while self.vertices.len() > 1 {
            let n = self.vertices.len();
            let last = self.vertices[n - 1];
            if self.vertices[n - 2].calc_dist(&last) {
                break;
            }
            self.vertices.pop();
            self.modify_last(last);
        }

        if closed {
            while self.vertices.len() > 1 {
                let n = self.vertices.len();
                let first = self.vertices[0];
                if self.vertices[n - 1].calc_dist(&first) {
                    break;
                }
                self.vertices.pop();
            }
        }
    }

    pub fn remove_all(&mut self) {
        self.vertices.clear();
    }

    pub fn remove_last(&mut self) {
        self.vertices.pop();
    }

    pub fn as_slice(&self) -> &[VertexDist] {
        &self.vertices
    }

    /// Vertex `i` modulo the length; used to walk closed rings.
    #[inline]
    pub fn cyclic(&self, i: usize) -> VertexDist {
        self.vertices[i % self.vertices.len()]
    }
}

impl core::ops::Index<usize> for VertexSequence {
    type Output = VertexDist;

    fn index(&self, i: usize) -> &VertexDist {
        &self.vertices[i]
    }
}

impl core::ops::IndexMut<usize> for VertexSequence {
    fn index_mut(&mut self, i: usize) -> &mut VertexDist {
        &mut self.vertices[i]
    }
}

// ============================================================================
// shorten_path
// ============================================================================

/// Remove length `s` from the end of the path, cutting the last remaining
/// segment at the exact distance.
pub fn shorten_path(vs: &mut VertexSequence, mut s: f64, closed: bool) {
    if s <= 0.0 || vs.len() < 2 {
        return;
    }
    let mut n = vs.len() - 2;
    while n > 0 {
        let d = vs[n].dist;
        if d > s {
            break;
        }
        vs.remove_last();
        s -= d;
        n -= 1;
    }
    if vs.len() < 2 {
        vs.remove_all();
        return;
    }
    let n = vs.len() - 1;
    let prev = vs[n - 1];
    let d = (prev.dist - s) / prev.dist;
    let last = &mut vs[n];
    last.x = prev.x + (last.x - prev.x) * d;
    last.y = prev.y + (last.y - prev.y) * d;
    let last = vs[n];
    if !vs[n - 1].calc_dist(&last) {
        vs.remove_last();
    }
    vs.close(closed);
}

// ============================================================================
// Tests
// ============================================================================
