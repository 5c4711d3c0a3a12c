//! Applies an affine transform to every vertex of a source.

use crate::basics::{Vertex, VertexSource};
use crate::trans_affine::TransAffine;

/// Owns its source; wrap `&mut S` to borrow a long-lived one.
pub struct ConvTransform<VS> {
    source: VS,
    trans: TransAffine,
}

impl<VS: VertexSource> ConvTransform<VS> {
    pub fn new(source: VS, trans: TransAffine) -> Self {
        Self { source, trans }
    }

    pub fn set_transform(&mut self, trans: TransAffine) {
        self.trans = trans;
    }

    pub fn transform(&self) -> &TransAffine {
        &self.trans
    }

    pub fn source(&self) -> &VS {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut VS {
        &mut self.source
    }
}

impl<VS: VertexSource> VertexSource for ConvTransform<VS> {
    fn rewind(&mut self, path_id: u32) {
        self.source.rewind(path_id);
    }

    fn next_vertex(&mut self) -> Vertex {
        let mut v = self.source.next_vertex();
        if v.cmd.is_vertex() {
            self.trans.transform(&mut v.x, &mut v.y);
        }
        v
    }
}
