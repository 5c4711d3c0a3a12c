//! Clipping renderer over a pixel format.
//!
//! Every operation is intersected with the clip box first; anything fully
//! outside is a silent no-op, so pixel formats never see an out-of-range
//! coordinate.

use crate::basics::{CoverType, RectI};
use crate::pixfmt_rgba::PixelFormat;

/// An empty clip box: `x1 > x2`, so nothing is inside.
const INVISIBLE: RectI = RectI {
    x1: 1,
    y1: 1,
    x2: 0,
    y2: 0,
};

pub struct RendererBase<PF: PixelFormat> {
    ren: PF,
    clip_box: RectI,
}

impl<PF: PixelFormat> RendererBase<PF> {
    /// The clip box starts as the full buffer.
    pub fn new(ren: PF) -> Self {
        let clip_box = RectI::new(0, 0, ren.width() as i32 - 1, ren.height() as i32 - 1);
        Self { ren, clip_box }
    }

    pub fn width(&self) -> u32 {
        self.ren.width()
    }

    pub fn height(&self) -> u32 {
        self.ren.height()
    }

    fn bounds(&self) -> RectI {
        RectI::new(0, 0, self.ren.width() as i32 - 1, self.ren.height() as i32 - 1)
    }

    /// Set the clip box in inclusive pixel coordinates, intersected with the
    /// buffer. Returns false (and clips everything) when the intersection is
    /// empty.
    pub fn clip_box(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> bool {
        let mut cb = RectI::new(x1, y1, x2, y2);
        cb.normalize();
        if cb.clip(&self.bounds()) {
            self.clip_box = cb;
            true
        } else {
            self.clip_box = INVISIBLE;
            false
        }
    }

    /// Clip to the whole buffer when `visible`, else to nothing.
    pub fn reset_clipping(&mut self, visible: bool) {
        self.clip_box = if visible { self.bounds() } else { INVISIBLE };
    }

    pub fn bounding_clip_box(&self) -> &RectI {
        &self.clip_box
    }

    #[inline]
    pub fn xmin(&self) -> i32 {
        self.clip_box.x1
    }
    #[inline]
    pub fn ymin(&self) -> i32 {
        self.clip_box.y1
    }
    #[inline]
    pub fn xmax(&self) -> i32 {
        self.clip_box.x2
    }
    #[inline]
    pub fn ymax(&self) -> i32 {
        self.clip_box.y2
    }

    #[inline]
    pub fn inbox(&self, x: i32, y: i32) -> bool {
        self.clip_box.hit_test(x, y)
    }

    pub fn ren(&self) -> &PF {
        &self.ren
    }

    pub fn ren_mut(&mut self) -> &mut PF {
        &mut self.ren
    }

    /// Clip `[x, x + len)` on row `y`; returns the first visible x and the
    /// number of leading elements to skip.
    #[inline]
    fn clip_span(&self, x: i32, y: i32, len: usize) -> Option<(i32, usize, usize)> {
        if y < self.ymin() || y > self.ymax() || len == 0 {
            return None;
        }
        let end = x.saturating_add(len.min(i32::MAX as usize) as i32);
        let x1 = x.max(self.xmin());
        let x2 = end.min(self.xmax().saturating_add(1));
        if x1 >= x2 {
            return None;
        }
        Some((x1, (x1 - x) as usize, (x2 - x1) as usize))
    }

    // ========================================================================
    // Drawing operations
    // ========================================================================

    /// Fill the whole buffer, ignoring the clip box and the blend mode.
    pub fn clear(&mut self, c: &PF::Color) {
        let w = self.ren.width();
        for y in 0..self.ren.height() as i32 {
            self.ren.copy_hline(0, y, w, c);
        }
    }

    /// Transparent default outside the clip box.
    pub fn pixel(&self, x: i32, y: i32) -> PF::Color {
        if self.inbox(x, y) {
            self.ren.pixel(x, y)
        } else {
            PF::Color::default()
        }
    }

    pub fn copy_pixel(&mut self, x: i32, y: i32, c: &PF::Color) {
        if self.inbox(x, y) {
            self.ren.copy_pixel(x, y, c);
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, c: &PF::Color, cover: CoverType) {
        if self.inbox(x, y) {
            self.ren.blend_pixel(x, y, c, cover);
        }
    }

    /// Inclusive horizontal run `x1..=x2` (either order).
    fn clip_hline(&self, x1: i32, y: i32, x2: i32) -> Option<(i32, u32)> {
        let (x1, x2) = if x1 > x2 { (x2, x1) } else { (x1, x2) };
        if y > self.ymax() || y < self.ymin() || x1 > self.xmax() || x2 < self.xmin() {
            return None;
        }
        let x1 = x1.max(self.xmin());
        let x2 = x2.min(self.xmax());
        Some((x1, (x2 - x1 + 1) as u32))
    }

    pub fn copy_hline(&mut self, x1: i32, y: i32, x2: i32, c: &PF::Color) {
        if let Some((x, len)) = self.clip_hline(x1, y, x2) {
            self.ren.copy_hline(x, y, len, c);
        }
    }

    pub fn blend_hline(&mut self, x1: i32, y: i32, x2: i32, c: &PF::Color, cover: CoverType) {
        if let Some((x, len)) = self.clip_hline(x1, y, x2) {
            self.ren.blend_hline(x, y, len, c, cover);
        }
    }

    /// Overwrite the inclusive rectangle `(x1, y1)..=(x2, y2)`.
    pub fn copy_bar(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, c: &PF::Color) {
        let mut rc = RectI::new(x1, y1, x2, y2);
        rc.normalize();
        if rc.clip(&self.clip_box) {
            for y in rc.y1..=rc.y2 {
                self.ren.copy_hline(rc.x1, y, (rc.x2 - rc.x1 + 1) as u32, c);
            }
        }
    }

    /// Blend the inclusive rectangle `(x1, y1)..=(x2, y2)` at a uniform cover.
    pub fn blend_bar(&mut self, x1: i32, y1: i32, x2: i32, y2: i32, c: &PF::Color, cover: CoverType) {
        let mut rc = RectI::new(x1, y1, x2, y2);
        rc.normalize();
        if rc.clip(&self.clip_box) {
            for y in rc.y1..=rc.y2 {
                self.ren.blend_hline(rc.x1, y, (rc.x2 - rc.x1 + 1) as u32, c, cover);
            }
        }
    }

    /// One color; one cover per pixel starting at `x`.
    pub fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &PF::Color, covers: &[CoverType]) {
        if let Some((x, skip, len)) = self.clip_span(x, y, covers.len()) {
            self.ren.blend_solid_hspan(x, y, c, &covers[skip..skip + len]);
        }
    }

    /// One color per pixel starting at `x`. `covers`, when given, must be
    /// at least as long as `colors`.
    pub fn blend_color_hspan(
        &mut self,
        x: i32,
        y: i32,
        colors: &[PF::Color],
        covers: Option<&[CoverType]>,
        cover: CoverType,
    ) {
        if let Some((x, skip, len)) = self.clip_span(x, y, colors.len()) {
            let covers = covers.map(|c| &c[skip..skip + len]);
            self.ren
                .blend_color_hspan(x, y, &colors[skip..skip + len], covers, cover);
        }
    }

    pub fn copy_color_hspan(&mut self, x: i32, y: i32, colors: &[PF::Color]) {
        if let Some((x, skip, len)) = self.clip_span(x, y, colors.len()) {
            self.ren.copy_color_hspan(x, y, &colors[skip..skip + len]);
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgba8;
    use crate::pixfmt_rgba::{PixfmtRgba, PixfmtRgba32};
    use crate::rendering_buffer::RenderingBuffer;

    fn renderer(buf: &mut [u8], w: u32, h: u32) -> RendererBase<PixfmtRgba32<'_>> {
        let rbuf = RenderingBuffer::new(buf, w, h, w as usize * 4).unwrap();
        RendererBase::new(PixfmtRgba::new(rbuf))
    }

    const RED: Rgba8 = Rgba8::opaque(255, 0, 0);

    #[test]
    fn test_new_clips_to_buffer() {
        let mut buf = vec![0u8; 100 * 80 * 4];
        let ren = renderer(&mut buf, 100, 80);
        assert_eq!((ren.width(), ren.height()), (100, 80));
        assert_eq!((ren.xmin(), ren.ymin(), ren.xmax(), ren.ymax()), (0, 0, 99, 79));
    }

    #[test]
    fn test_clip_box_intersects_buffer() {
        let mut buf = vec![0u8; 10 * 10 * 4];
        let mut ren = renderer(&mut buf, 10, 10);
        assert!(ren.clip_box(20, 20, -5, 3));
        assert_eq!(*ren.bounding_clip_box(), RectI::new(0, 3, 9, 9));
        assert!(!ren.clip_box(20, 20, 30, 30));
        assert!(!ren.inbox(0, 0));
        ren.reset_clipping(true);
        assert!(ren.inbox(9, 9));
    }

    #[test]
    fn test_outside_clip_is_noop() {
        let mut buf = vec![0u8; 10 * 10 * 4];
        let mut ren = renderer(&mut buf, 10, 10);
        ren.clip_box(2, 2, 5, 5);
        ren.blend_pixel(1, 1, &RED, 255);
        ren.copy_pixel(6, 6, &RED);
        ren.blend_hline(-100, 3, 1, &RED, 255);
        ren.blend_solid_hspan(0, 8, &RED, &[255; 10]);
        ren.copy_bar(6, 0, 9, 9, &RED);
        drop(ren);
        assert!(buf.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_hline_clipped_both_sides() {
        let mut buf = vec![0u8; 10 * 4];
        let mut ren = renderer(&mut buf, 10, 1);
        ren.clip_box(2, 0, 6, 0);
        ren.copy_hline(9, 0, -3, &RED);
        for x in 0..10 {
            let expected = if (2..=6).contains(&x) { RED } else { Rgba8::TRANSPARENT };
            assert_eq!(ren.ren().pixel(x, 0), expected, "x={}", x);
        }
    }

    #[test]
    fn test_solid_hspan_skips_clipped_covers() {
        let mut buf = vec![0u8; 6 * 4];
        let mut ren = renderer(&mut buf, 6, 1);
        ren.blend_solid_hspan(-2, 0, &RED, &[255, 255, 10, 20, 30]);
        assert_eq!(ren.pixel(0, 0).a, 10);
        assert_eq!(ren.pixel(1, 0).a, 20);
        assert_eq!(ren.pixel(2, 0).a, 30);
        assert_eq!(ren.pixel(3, 0).a, 0);
    }

    #[test]
    fn test_color_hspan_clipped_right() {
        let mut buf = vec![0u8; 4 * 4];
        let mut ren = renderer(&mut buf, 4, 1);
        let colors: Vec<Rgba8> = (1..=6).map(|i| Rgba8::opaque(i * 10, 0, 0)).collect();
        ren.blend_color_hspan(2, 0, &colors, None, 255);
        assert_eq!(ren.pixel(1, 0), Rgba8::TRANSPARENT);
        assert_eq!(ren.pixel(2, 0).r, 10);
        assert_eq!(ren.pixel(3, 0).r, 20);
    }

    #[test]
    fn test_copy_bar_and_clear() {
        let mut buf = vec![0u8; 5 * 5 * 4];
        let mut ren = renderer(&mut buf, 5, 5);
        ren.clear(&Rgba8::WHITE);
        ren.copy_bar(3, 3, 1, 1, &RED);
        assert_eq!(ren.pixel(0, 0), Rgba8::WHITE);
        assert_eq!(ren.pixel(1, 1), RED);
        assert_eq!(ren.pixel(3, 3), RED);
        assert_eq!(ren.pixel(4, 4), Rgba8::WHITE);
    }

    #[test]
    fn test_pixel_outside_clip_is_transparent() {
        let mut buf = vec![255u8; 4 * 4];
        let ren = renderer(&mut buf, 2, 2);
        assert_eq!(ren.pixel(-1, 0), Rgba8::TRANSPARENT);
        assert_eq!(ren.pixel(1, 1), Rgba8::WHITE);
    }
}
