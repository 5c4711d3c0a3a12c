//! Scanline rendering drivers.
//!
//! These tie the pipeline together: sweep the rasterizer into a scanline,
//! then hand every span to the renderer, either in one solid color or with
//! per-pixel colors from a [`SpanGenerator`].

use crate::pixfmt_rgba::PixelFormat;
use crate::rasterizer_scanline_aa::{RasterizerScanlineAa, Scanline};
use crate::renderer_base::RendererBase;
use crate::span_allocator::SpanAllocator;

// ============================================================================
// SpanGenerator
// ============================================================================

/// Produces one color per pixel for a horizontal run.
pub trait SpanGenerator {
    type Color;

    /// Called once per draw, before the first span.
    fn prepare(&mut self) {}

    /// Fill `span` with the colors of pixels `x..x + span.len()` on row `y`.
    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32);
}

impl<G: SpanGenerator + ?Sized> SpanGenerator for &mut G {
    type Color = G::Color;

    fn prepare(&mut self) {
        (**self).prepare();
    }

    fn generate(&mut self, span: &mut [Self::Color], x: i32, y: i32) {
        (**self).generate(span, x, y);
    }
}

// ============================================================================
// Solid color
// ============================================================================

/// Blend one swept scanline in a solid color.
pub fn render_scanline_aa_solid<SL, PF>(sl: &SL, ren: &mut RendererBase<PF>, color: &PF::Color)
where
    SL: Scanline,
    PF: PixelFormat,
{
    let y = sl.y();
    for span in sl.spans() {
        if span.is_solid() {
            ren.blend_hline(span.x, y, span.x + span.pixel_len() - 1, color, span.covers[0]);
        } else {
            ren.blend_solid_hspan(span.x, y, color, span.covers);
        }
    }
}

/// Sweep every scanline of `ras` and fill it with `color`.
pub fn render_scanlines_aa_solid<SL, PF>(
    ras: &mut RasterizerScanlineAa,
    sl: &mut SL,
    ren: &mut RendererBase<PF>,
    color: &PF::Color,
) where
    SL: Scanline,
    PF: PixelFormat,
{
    if !ras.rewind_scanlines() {
        return;
    }
    sl.reset(ras.min_x(), ras.max_x());
    while ras.sweep_scanline(sl) {
        render_scanline_aa_solid(sl, ren, color);
    }
}

// ============================================================================
// Span generator
// ============================================================================

/// Blend one swept scanline with colors from `span_gen`.
pub fn render_scanline_aa<SL, PF, SG>(
    sl: &SL,
    ren: &mut RendererBase<PF>,
    alloc: &mut SpanAllocator<PF::Color>,
    span_gen: &mut SG,
) where
    SL: Scanline,
    PF: PixelFormat,
    SG: SpanGenerator<Color = PF::Color>,
{
    let y = sl.y();
    for span in sl.spans() {
        let colors = alloc.allocate(span.pixel_len() as usize);
        span_gen.generate(colors, span.x, y);
        if span.is_solid() {
            ren.blend_color_hspan(span.x, y, colors, None, span.covers[0]);
        } else {
            ren.blend_color_hspan(span.x, y, colors, Some(span.covers), 0);
        }
    }
}

/// Sweep every scanline of `ras` and fill it with generated colors.
pub fn render_scanlines_aa<SL, PF, SG>(
    ras: &mut RasterizerScanlineAa,
    sl: &mut SL,
    ren: &mut RendererBase<PF>,
    alloc: &mut SpanAllocator<PF::Color>,
    span_gen: &mut SG,
) where
    SL: Scanline,
    PF: PixelFormat,
    SG: SpanGenerator<Color = PF::Color>,
{
    if !ras.rewind_scanlines() {
        return;
    }
    sl.reset(ras.min_x(), ras.max_x());
    span_gen.prepare();
    while ras.sweep_scanline(sl) {
        render_scanline_aa(sl, ren, alloc, span_gen);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::basics::POLY_SUBPIXEL_SCALE;
    use crate::color::Rgba8;
    use crate::path_storage::PathStorage;
    use crate::pixfmt_rgba::{PixfmtRgba, PixfmtRgba32};
    use crate::rendering_buffer::RenderingBuffer;
    use crate::scanline_p::ScanlineP8;
    use crate::scanline_u::ScanlineU8;

    const RED: Rgba8 = Rgba8::opaque(255, 0, 0);

    fn white_renderer(buf: &mut [u8], w: u32, h: u32) -> RendererBase<PixfmtRgba32<'_>> {
        let rbuf = RenderingBuffer::new(buf, w, h, w as usize * 4).unwrap();
        let mut ren = RendererBase::new(PixfmtRgba::new(rbuf));
        ren.clear(&Rgba8::WHITE);
        ren
    }

    fn rect_path(x1: f64, y1: f64, x2: f64, y2: f64) -> PathStorage {
        let mut path = PathStorage::new();
        path.move_to(x1, y1);
        path.line_to(x2, y1);
        path.line_to(x2, y2);
        path.line_to(x1, y2);
        path.close_polygon();
        path
    }

    /// Horizontal gradient in red, one step per pixel.
    struct RampX;

    impl SpanGenerator for RampX {
        type Color = Rgba8;

        fn generate(&mut self, span: &mut [Rgba8], x: i32, _y: i32) {
            for (i, c) in span.iter_mut().enumerate() {
                *c = Rgba8::opaque((x + i as i32) as u8, 0, 0);
            }
        }
    }

    #[test]
    fn test_red_rect_on_white() {
        let mut buf = vec![0u8; 10 * 10 * 4];
        let mut ren = white_renderer(&mut buf, 10, 10);
        let mut ras = RasterizerScanlineAa::new();
        let mut sl = ScanlineU8::new();
        ras.add_path(&mut rect_path(2.0, 2.0, 6.0, 6.0), 0);
        render_scanlines_aa_solid(&mut ras, &mut sl, &mut ren, &RED);
        assert_eq!(ren.pixel(4, 4), RED);
        assert_eq!(ren.pixel(1, 1), Rgba8::WHITE);
        assert_eq!(ren.pixel(6, 6), Rgba8::WHITE);
    }

    #[test]
    fn test_triangle_center_and_corner() {
        let mut buf = vec![0u8; 100 * 100 * 4];
        let mut ren = white_renderer(&mut buf, 100, 100);
        let mut ras = RasterizerScanlineAa::new();
        let mut sl = ScanlineU8::new();
        let s = POLY_SUBPIXEL_SCALE as i32;
        ras.move_to(20 * s, 20 * s);
        ras.line_to(80 * s, 20 * s);
        ras.line_to(50 * s, 80 * s);
        render_scanlines_aa_solid(&mut ras, &mut sl, &mut ren, &RED);
        assert_eq!(ren.pixel(50, 40), RED);
        assert_eq!(ren.pixel(0, 0), Rgba8::WHITE);
        let edge = ren.pixel(50, 79);
        assert!(edge.g > 0 && edge.g < 255, "edge should be partially covered: {:?}", edge);
    }

    #[test]
    fn test_packed_and_unpacked_scanlines_agree() {
        let draw = |packed: bool| {
            let mut buf = vec![0u8; 40 * 40 * 4];
            let mut ren = white_renderer(&mut buf, 40, 40);
            let mut ras = RasterizerScanlineAa::new();
            ras.move_to_d(3.3, 2.7);
            ras.line_to_d(37.1, 8.2);
            ras.line_to_d(20.5, 36.9);
            if packed {
                render_scanlines_aa_solid(&mut ras, &mut ScanlineP8::new(), &mut ren, &RED);
            } else {
                render_scanlines_aa_solid(&mut ras, &mut ScanlineU8::new(), &mut ren, &RED);
            }
            drop(ren);
            buf
        };
        assert_eq!(draw(true), draw(false));
    }

    #[test]
    fn test_span_generator_colors_per_pixel() {
        let mut buf = vec![0u8; 16 * 4 * 4];
        let mut ren = white_renderer(&mut buf, 16, 4);
        let mut ras = RasterizerScanlineAa::new();
        let mut sl = ScanlineP8::new();
        let mut alloc = SpanAllocator::new();
        ras.add_path(&mut rect_path(0.0, 0.0, 16.0, 4.0), 0);
        render_scanlines_aa(&mut ras, &mut sl, &mut ren, &mut alloc, &mut RampX);
        for x in 0..16 {
            assert_eq!(ren.pixel(x, 2), Rgba8::opaque(x as u8, 0, 0));
        }
    }

    #[test]
    fn test_empty_rasterizer_draws_nothing() {
        let mut buf = vec![0u8; 4 * 4 * 4];
        let mut ren = white_renderer(&mut buf, 4, 4);
        let mut ras = RasterizerScanlineAa::new();
        ras.move_to_d(1.0, 1.0);
        render_scanlines_aa_solid(&mut ras, &mut ScanlineU8::new(), &mut ren, &RED);
        drop(ren);
        assert!(buf.iter().all(|&b| b == 255));
    }
}
