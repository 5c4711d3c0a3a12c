//! Dash converter: [`ConvAdaptorVcgen`] + [`VcgenDash`].

use std::borrow::BorrowMut;

use crate::basics::{Vertex, VertexSource};
use crate::conv_adaptor_vcgen::{ConvAdaptorVcgen, VertexGenerator};
use crate::vcgen_dash::VcgenDash;

/// Turns a continuous center line into a sequence of open dash sub-paths.
pub struct ConvDash<VS, G = VcgenDash> {
    base: ConvAdaptorVcgen<VS, G>,
}

impl<VS: VertexSource> ConvDash<VS> {
    pub fn new(source: VS) -> Self {
        Self::with_generator(source, VcgenDash::new())
    }
}

impl<VS, G> ConvDash<VS, G>
where
    VS: VertexSource,
    G: VertexGenerator + BorrowMut<VcgenDash>,
{
    pub fn with_generator(source: VS, generator: G) -> Self {
        Self {
            base: ConvAdaptorVcgen::new(source, generator),
        }
    }

    fn dasher(&self) -> &VcgenDash {
        self.base.generator().borrow()
    }

    fn dasher_mut(&mut self) -> &mut VcgenDash {
        self.base.generator_mut().borrow_mut()
    }

    pub fn remove_all_dashes(&mut self) {
        self.dasher_mut().remove_all_dashes();
    }

    pub fn add_dash(&mut self, dash_len: f64, gap_len: f64) -> bool {
        self.dasher_mut().add_dash(dash_len, gap_len)
    }

    pub fn dash_start(&mut self, ds: f64) {
        self.dasher_mut().dash_start(ds);
    }

    pub fn set_shorten(&mut self, s: f64) {
        self.dasher_mut().set_shorten(s);
    }

    pub fn shorten(&self) -> f64 {
        self.dasher().shorten()
    }

    pub fn source(&self) -> &VS {
        self.base.source()
    }

    pub fn source_mut(&mut self) -> &mut VS {
        self.base.source_mut()
    }
}

impl<VS, G> VertexSource for ConvDash<VS, G>
where
    VS: VertexSource,
    G: VertexGenerator,
{
    fn rewind(&mut self, path_id: u32) {
        self.base.rewind(path_id);
    }

    fn next_vertex(&mut self) -> Vertex {
        self.base.next_vertex()
    }
}
