//! Filling and stroking the current path.

use super::{RenderingContext, LOG_TARGET};
use crate::basics::{FillingRule, Vertex, VertexSource};
use crate::color::RgbaColor;
use crate::comp_op::CompOp;
use crate::conv_curve::ConvCurve;
use crate::conv_dash::ConvDash;
use crate::conv_stroke::ConvStroke;
use crate::conv_transform::ConvTransform;
use crate::drawing_state::{DrawPathFlag, GradientPaint, GradientSpread, Paint};
use crate::path_storage::PathStorage;
use crate::pixfmt_rgba::Blender;
use crate::renderer_scanline::{render_scanlines_aa, render_scanlines_aa_solid};
use crate::span_gradient::{
    GradientFunction, GradientRadial, GradientRadialFocus, GradientReflectAdaptor,
    GradientRepeatAdaptor, GradientX, SpanGradient,
};
use crate::span_interpolator_linear::SpanInterpolatorLinear;
use crate::vcgen_dash::VcgenDash;
use crate::vcgen_stroke::VcgenStroke;

/// Outline of the current path, dashed or not.
enum StrokeChain<'c> {
    Solid(ConvStroke<&'c mut ConvCurve<PathStorage>, &'c mut VcgenStroke>),
    Dashed(ConvStroke<ConvDash<&'c mut ConvCurve<PathStorage>, &'c mut VcgenDash>, &'c mut VcgenStroke>),
}

impl VertexSource for StrokeChain<'_> {
    fn rewind(&mut self, path_id: u32) {
        match self {
            StrokeChain::Solid(s) => s.rewind(path_id),
            StrokeChain::Dashed(s) => s.rewind(path_id),
        }
    }

    fn next_vertex(&mut self) -> Vertex {
        match self {
            StrokeChain::Solid(s) => s.next_vertex(),
            StrokeChain::Dashed(s) => s.next_vertex(),
        }
    }
}

impl<'a, B: Blender> RenderingContext<'a, B> {
    /// Render the current path. The path is kept, so it can be drawn again
    /// with other settings.
    pub fn draw_path(&mut self, flag: DrawPathFlag) {
        if self.path.source().is_empty() {
            log::debug!(target: LOG_TARGET, "draw_path on an empty path");
            return;
        }
        match flag {
            DrawPathFlag::FillOnly => self.fill_path(self.state.fill),
            DrawPathFlag::StrokeOnly => self.stroke_path(),
            DrawPathFlag::FillAndStroke => {
                self.fill_path(self.state.fill);
                self.stroke_path();
            }
            DrawPathFlag::FillWithLineColor => self.fill_path(self.state.line),
        }
    }

    /// Replace the current path by the rectangle `(x1, y1)-(x2, y2)` and
    /// fill it.
    pub fn fill_rect(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.reset_path();
        self.move_to(x1, y1);
        self.line_to(x2, y1);
        self.line_to(x2, y2);
        self.line_to(x1, y2);
        self.close_polygon();
        self.draw_path(DrawPathFlag::FillOnly);
    }

    /// Transparent solid paint blended with `Alpha` or `SrcOver` leaves
    /// the buffer unchanged.
    fn paints_anything(&self, paint: &Paint) -> bool {
        match paint {
            Paint::Solid(c) => {
                c.a != 0 || !matches!(self.state.comp_op, CompOp::Alpha | CompOp::SrcOver)
            }
            _ => true,
        }
    }

    fn fill_path(&mut self, paint: Paint) {
        if !self.paints_anything(&paint) {
            return;
        }
        self.ras.reset();
        self.ras.filling_rule(self.state.fill_rule);
        {
            let mut shape = ConvTransform::new(&mut self.path, self.state.transform);
            self.ras.add_path(&mut shape, 0);
        }
        self.render_paint(paint);
    }

    /// Strokes always use the non-zero rule so overlapping segments do not
    /// cancel each other.
    fn stroke_path(&mut self) {
        let paint = self.state.line;
        if self.state.line_width <= 0.0 || !self.paints_anything(&paint) {
            return;
        }
        self.ras.reset();
        self.ras.filling_rule(FillingRule::NonZero);
        {
            let chain = if self.state.dash.is_dashed() {
                let dash = ConvDash::with_generator(&mut self.path, &mut self.dasher);
                StrokeChain::Dashed(ConvStroke::with_generator(dash, &mut self.stroker))
            } else {
                StrokeChain::Solid(ConvStroke::with_generator(&mut self.path, &mut self.stroker))
            };
            let mut shape = ConvTransform::new(chain, self.state.transform);
            self.ras.add_path(&mut shape, 0);
        }
        self.render_paint(paint);
    }

    fn render_paint(&mut self, paint: Paint) {
        match paint {
            Paint::Solid(c) => {
                let color = B::Color::from_straight(c);
                render_scanlines_aa_solid(&mut self.ras, &mut self.sl, &mut self.ren, &color);
            }
            Paint::LinearGradient(g) => self.render_spread(GradientX, &g),
            Paint::RadialGradient(g) => self.render_spread(GradientRadial, &g),
            Paint::FocalGradient { gradient, fx, fy } => {
                self.render_spread(GradientRadialFocus::new(gradient.d2, fx, fy), &gradient)
            }
        }
    }

    fn render_spread<G: GradientFunction>(&mut self, function: G, g: &GradientPaint) {
        match g.spread {
            GradientSpread::Pad => self.render_gradient(function, g),
            GradientSpread::Repeat => self.render_gradient(GradientRepeatAdaptor(function), g),
            GradientSpread::Reflect => self.render_gradient(GradientReflectAdaptor(function), g),
        }
    }

    fn render_gradient<G: GradientFunction>(&mut self, function: G, g: &GradientPaint) {
        if g.d2 <= g.d1 {
            log::debug!(target: LOG_TARGET, "degenerate gradient [{}, {}] skipped", g.d1, g.d2);
            return;
        }
        let inverse = match g.matrix.inverted() {
            Ok(m) => m,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "gradient skipped: {}", e);
                return;
            }
        };
        if self.gradient_lut.two_color(g.c1, g.c2, g.profile) {
            log::debug!(target: LOG_TARGET, "gradient ramp rebuilt");
        }
        let mut span_gen = SpanGradient::new(
            SpanInterpolatorLinear::new(inverse),
            function,
            &self.gradient_lut,
            g.d1,
            g.d2,
        );
        render_scanlines_aa(
            &mut self.ras,
            &mut self.sl,
            &mut self.ren,
            &mut self.alloc,
            &mut span_gen,
        );
    }
}
