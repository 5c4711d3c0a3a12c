//! RGBA32 pixel formats.
//!
//! [`PixfmtRgba`] reads and writes 4-byte RGBA pixels in a
//! [`RenderingBuffer`]. How a color lands on a pixel is decided at compile
//! time by the [`Blender`] parameter (straight or premultiplied storage) and
//! at run time by the active [`CompOp`]. Every incoming cover first passes
//! through the [`CoverLut`] (master alpha, then gamma).
//!
//! Coordinates are not checked here; `RendererBase` clips before calling in.

use core::marker::PhantomData;

use crate::basics::{CoverType, COVER_FULL};
use crate::color::{multiply, Rgba8, Rgba8Pre, RgbaColor};
use crate::comp_op::CompOp;
use crate::gamma::CoverLut;
use crate::rendering_buffer::{RenderingBuffer, PIX_WIDTH};

// ============================================================================
// PixelFormat trait
// ============================================================================

/// Pixel-level drawing surface used by `RendererBase`.
pub trait PixelFormat {
    type Color: RgbaColor;

    fn width(&self) -> u32;
    fn height(&self) -> u32;

    fn pixel(&self, x: i32, y: i32) -> Self::Color;

    /// Overwrite one pixel, ignoring the destination and the blend mode.
    fn copy_pixel(&mut self, x: i32, y: i32, c: &Self::Color);
    fn copy_hline(&mut self, x: i32, y: i32, len: u32, c: &Self::Color);
    fn copy_color_hspan(&mut self, x: i32, y: i32, colors: &[Self::Color]);

    fn blend_pixel(&mut self, x: i32, y: i32, c: &Self::Color, cover: CoverType);
    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &Self::Color, cover: CoverType);

    /// One color, one cover per pixel.
    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &Self::Color, covers: &[CoverType]);

    /// One color per pixel; covers per pixel when given, else `cover` for all.
    fn blend_color_hspan(
        &mut self,
        x: i32,
        y: i32,
        colors: &[Self::Color],
        covers: Option<&[CoverType]>,
        cover: CoverType,
    );
}

// ============================================================================
// Blenders
// ============================================================================

/// Per-pixel composition rule for one storage convention.
pub trait Blender {
    type Color: RgbaColor;

    /// Blend `c` into the 4-byte pixel `p` at an effective `cover > 0`.
    fn blend_pix(op: CompOp, p: &mut [u8], c: &Self::Color, cover: CoverType);
}

/// Straight-alpha storage; colors are [`Rgba8`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BlenderRgba;

/// Premultiplied storage; colors are [`Rgba8Pre`].
#[derive(Debug, Clone, Copy, Default)]
pub struct BlenderRgbaPre;

#[inline]
fn load(p: &[u8]) -> [u8; 4] {
    [p[0], p[1], p[2], p[3]]
}

#[inline]
fn store(p: &mut [u8], v: [u8; 4]) {
    p[..PIX_WIDTH].copy_from_slice(&v);
}

impl Blender for BlenderRgba {
    type Color = Rgba8;

    #[inline]
    fn blend_pix(op: CompOp, p: &mut [u8], c: &Rgba8, cover: CoverType) {
        match op {
            CompOp::Dst => {}
            CompOp::Alpha | CompOp::SrcOver if multiply(c.a, cover) == 255 => {
                store(p, [c.r, c.g, c.b, 255]);
            }
            // Straight pixels are premultiplied for the operator and
            // demultiplied on the way back out.
            _ => {
                let d = Rgba8::from_components(load(p)).premultiply();
                let s = c.premultiply();
                let out = Rgba8Pre::from_components(op.blend(d.components(), s.components(), cover));
                store(p, out.demultiply().components());
            }
        }
    }
}

impl Blender for BlenderRgbaPre {
    type Color = Rgba8Pre;

    #[inline]
    fn blend_pix(op: CompOp, p: &mut [u8], c: &Rgba8Pre, cover: CoverType) {
        if op == CompOp::Dst {
            return;
        }
        if op == CompOp::Alpha && cover == COVER_FULL && c.a == 255 {
            store(p, c.components());
            return;
        }
        store(p, op.blend(load(p), c.components(), cover));
    }
}

// ============================================================================
// PixfmtRgba
// ============================================================================

/// RGBA32 pixel format over a borrowed buffer.
pub struct PixfmtRgba<'a, B: Blender> {
    rbuf: RenderingBuffer<'a>,
    comp_op: CompOp,
    cover_lut: CoverLut,
    _blender: PhantomData<B>,
}

/// Straight-alpha RGBA32.
pub type PixfmtRgba32<'a> = PixfmtRgba<'a, BlenderRgba>;
/// Premultiplied RGBA32.
pub type PixfmtRgba32Pre<'a> = PixfmtRgba<'a, BlenderRgbaPre>;

impl<'a, B: Blender> PixfmtRgba<'a, B> {
    pub fn new(rbuf: RenderingBuffer<'a>) -> Self {
        Self {
            rbuf,
            comp_op: CompOp::default(),
            cover_lut: CoverLut::default(),
            _blender: PhantomData,
        }
    }

    pub fn rbuf(&self) -> &RenderingBuffer<'a> {
        &self.rbuf
    }

    pub fn rbuf_mut(&mut self) -> &mut RenderingBuffer<'a> {
        &mut self.rbuf
    }

    pub fn comp_op(&self) -> CompOp {
        self.comp_op
    }

    pub fn set_comp_op(&mut self, op: CompOp) {
        self.comp_op = op;
    }

    pub fn gamma(&self) -> f64 {
        self.cover_lut.gamma()
    }

    pub fn master_alpha(&self) -> f64 {
        self.cover_lut.master_alpha()
    }

    /// Set gamma and master alpha; returns whether the cover table changed.
    pub fn set_cover_params(&mut self, gamma: f64, master_alpha: f64) -> bool {
        self.cover_lut.set(gamma, master_alpha)
    }

    #[inline]
    fn effective(&self, cover: CoverType) -> CoverType {
        if self.cover_lut.is_identity() {
            cover
        } else {
            self.cover_lut.apply(cover)
        }
    }

    #[inline]
    fn pix_mut(&mut self, x: i32, y: i32) -> &mut [u8] {
        let off = x as usize * PIX_WIDTH;
        &mut self.rbuf.row_mut(y as u32)[off..off + PIX_WIDTH]
    }

    /// Fill every pixel with `c`, bypassing blending.
    pub fn clear(&mut self, c: &B::Color) {
        let v = c.components();
        for y in 0..self.rbuf.height() {
            for p in self.rbuf.row_mut(y).chunks_exact_mut(PIX_WIDTH) {
                store(p, v);
            }
        }
    }

    /// Convert the whole buffer from straight to premultiplied alpha.
    pub fn premultiply(&mut self) {
        self.map_pixels(|v| Rgba8::from_components(v).premultiply().components());
    }

    /// Convert the whole buffer from premultiplied to straight alpha.
    pub fn demultiply(&mut self) {
        self.map_pixels(|v| Rgba8Pre::from_components(v).demultiply().components());
    }

    fn map_pixels(&mut self, f: impl Fn([u8; 4]) -> [u8; 4]) {
        for y in 0..self.rbuf.height() {
            for p in self.rbuf.row_mut(y).chunks_exact_mut(PIX_WIDTH) {
                let v = f(load(p));
                store(p, v);
            }
        }
    }
}

impl<'a, B: Blender> PixelFormat for PixfmtRgba<'a, B> {
    type Color = B::Color;

    fn width(&self) -> u32 {
        self.rbuf.width()
    }

    fn height(&self) -> u32 {
        self.rbuf.height()
    }

    fn pixel(&self, x: i32, y: i32) -> B::Color {
        let off = x as usize * PIX_WIDTH;
        B::Color::from_components(load(&self.rbuf.row(y as u32)[off..]))
    }

    fn copy_pixel(&mut self, x: i32, y: i32, c: &B::Color) {
        store(self.pix_mut(x, y), c.components());
    }

    fn copy_hline(&mut self, x: i32, y: i32, len: u32, c: &B::Color) {
        let v = c.components();
        let start = x as usize * PIX_WIDTH;
        let end = start + len as usize * PIX_WIDTH;
        for p in self.rbuf.row_mut(y as u32)[start..end].chunks_exact_mut(PIX_WIDTH) {
            store(p, v);
        }
    }

    fn copy_color_hspan(&mut self, x: i32, y: i32, colors: &[B::Color]) {
        let start = x as usize * PIX_WIDTH;
        let end = start + colors.len() * PIX_WIDTH;
        let row = &mut self.rbuf.row_mut(y as u32)[start..end];
        for (p, c) in row.chunks_exact_mut(PIX_WIDTH).zip(colors) {
            store(p, c.components());
        }
    }

    fn blend_pixel(&mut self, x: i32, y: i32, c: &B::Color, cover: CoverType) {
        let cover = self.effective(cover);
        if cover > 0 {
            let op = self.comp_op;
            B::blend_pix(op, self.pix_mut(x, y), c, cover);
        }
    }

    fn blend_hline(&mut self, x: i32, y: i32, len: u32, c: &B::Color, cover: CoverType) {
        let cover = self.effective(cover);
        if cover == 0 {
            return;
        }
        let op = self.comp_op;
        let start = x as usize * PIX_WIDTH;
        let end = start + len as usize * PIX_WIDTH;
        for p in self.rbuf.row_mut(y as u32)[start..end].chunks_exact_mut(PIX_WIDTH) {
            B::blend_pix(op, p, c, cover);
        }
    }

    fn blend_solid_hspan(&mut self, x: i32, y: i32, c: &B::Color, covers: &[CoverType]) {
        let (op, lut) = (self.comp_op, &self.cover_lut);
        let start = x as usize * PIX_WIDTH;
        let end = start + covers.len() * PIX_WIDTH;
        let row = &mut self.rbuf.row_mut(y as u32)[start..end];
        for (p, &cover) in row.chunks_exact_mut(PIX_WIDTH).zip(covers) {
            let cover = lut.apply(cover);
            if cover > 0 {
                B::blend_pix(op, p, c, cover);
            }
        }
    }

    fn blend_color_hspan(
        &mut self,
        x: i32,
        y: i32,
        colors: &[B::Color],
        covers: Option<&[CoverType]>,
        cover: CoverType,
    ) {
        let (op, lut) = (self.comp_op, &self.cover_lut);
        let start = x as usize * PIX_WIDTH;
        let end = start + colors.len() * PIX_WIDTH;
        let row = &mut self.rbuf.row_mut(y as u32)[start..end];
        let pixels = row.chunks_exact_mut(PIX_WIDTH).zip(colors);
        match covers {
            Some(covers) => {
                for ((p, c), &cv) in pixels.zip(covers) {
                    let cv = lut.apply(cv);
                    if cv > 0 {
                        B::blend_pix(op, p, c, cv);
                    }
                }
            }
            None => {
                let cover = lut.apply(cover);
                if cover == 0 {
                    return;
                }
                for (p, c) in pixels {
                    B::blend_pix(op, p, c, cover);
                }
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
