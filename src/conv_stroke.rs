//! Stroke converter: [`ConvAdaptorVcgen`] + [`VcgenStroke`].
//!
//! The generator parameter defaults to an owned `VcgenStroke`; passing
//! `&mut VcgenStroke` lets a long-lived generator (and its buffers) be
//! reused across converters.

use std::borrow::BorrowMut;

use crate::basics::{Vertex, VertexSource};
use crate::conv_adaptor_vcgen::{ConvAdaptorVcgen, VertexGenerator};
use crate::math_stroke::{InnerJoin, LineCap, LineJoin};
use crate::vcgen_stroke::VcgenStroke;

pub struct ConvStroke<VS, G = VcgenStroke> {
    base: ConvAdaptorVcgen<VS, G>,
}

impl<VS: VertexSource> ConvStroke<VS> {
    pub fn new(source: VS) -> Self {
        Self::with_generator(source, VcgenStroke::new())
    }
}

impl<VS, G> ConvStroke<VS, G>
where
    VS: VertexSource,
    G: VertexGenerator + BorrowMut<VcgenStroke>,
{
    pub fn with_generator(source: VS, generator: G) -> Self {
        Self {
            base: ConvAdaptorVcgen::new(source, generator),
        }
    }

    fn stroker(&self) -> &VcgenStroke {
        self.base.generator().borrow()
    }

    fn stroker_mut(&mut self) -> &mut VcgenStroke {
        self.base.generator_mut().borrow_mut()
    }

    pub fn set_line_cap(&mut self, lc: LineCap) {
        self.stroker_mut().set_line_cap(lc);
    }

    pub fn line_cap(&self) -> LineCap {
        self.stroker().line_cap()
    }

    pub fn set_line_join(&mut self, lj: LineJoin) {
        self.stroker_mut().set_line_join(lj);
    }

    pub fn line_join(&self) -> LineJoin {
        self.stroker().line_join()
    }

    pub fn set_inner_join(&mut self, ij: InnerJoin) {
        self.stroker_mut().set_inner_join(ij);
    }

    pub fn inner_join(&self) -> InnerJoin {
        self.stroker().inner_join()
    }

    pub fn set_width(&mut self, w: f64) {
        self.stroker_mut().set_width(w);
    }

    pub fn width(&self) -> f64 {
        self.stroker().width()
    }

    pub fn set_miter_limit(&mut self, ml: f64) {
        self.stroker_mut().set_miter_limit(ml);
    }

    pub fn miter_limit(&self) -> f64 {
        self.stroker().miter_limit()
    }

    pub fn set_inner_miter_limit(&mut self, ml: f64) {
        self.stroker_mut().set_inner_miter_limit(ml);
    }

    pub fn set_approximation_scale(&mut self, s: f64) {
        self.stroker_mut().set_approximation_scale(s);
    }

    pub fn approximation_scale(&self) -> f64 {
        self.stroker().approximation_scale()
    }

    pub fn set_shorten(&mut self, s: f64) {
        self.stroker_mut().set_shorten(s);
    }

    pub fn source(&self) -> &VS {
        self.base.source()
    }

    pub fn source_mut(&mut self) -> &mut VS {
        self.base.source_mut()
    }
}

impl<VS, G> VertexSource for ConvStroke<VS, G>
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
