//! RGBA image span generators.
//!
//! Each generator walks a device span through the inverse image matrix and
//! samples the source: nearest texel, a fixed bilinear blend, a 2×2 or N×N
//! kernel from an [`ImageFilterLut`], or a kernel stretched by the
//! minification factor. Texels outside the source are transparent.

use std::marker::PhantomData;

use crate::color::{demultiply, multiply, RgbaColor};
use crate::image_filters::{
    ImageFilterLut, IMAGE_FILTER_SCALE, IMAGE_FILTER_SHIFT, IMAGE_SUBPIXEL_MASK,
    IMAGE_SUBPIXEL_SCALE, IMAGE_SUBPIXEL_SHIFT,
};
use crate::renderer_scanline::SpanGenerator;
use crate::span_image_filter::{SpanImageFilter, SpanImageResampleAffine};

const SHIFT: u32 = IMAGE_SUBPIXEL_SHIFT;
const SCALE: i32 = IMAGE_SUBPIXEL_SCALE as i32;
const MASK: i32 = IMAGE_SUBPIXEL_MASK as i32;

/// Weight a texel into `acc`. Straight texels are premultiplied first so
/// transparent neighbours fade coverage instead of darkening the color.
#[inline]
fn accumulate<C: RgbaColor>(acc: &mut [i64; 4], texel: [u8; 4], weight: i64) {
    let a = texel[3];
    for (i, (sum, &t)) in acc.iter_mut().zip(texel.iter()).enumerate() {
        let t = if C::PREMULTIPLIED || i == 3 { t } else { multiply(t, a) };
        *sum += t as i64 * weight;
    }
}

/// Clamp premultiplied sums into a color. Sharpening kernels overshoot, so
/// channels are kept in `0..=255` and at or below alpha; straight colors
/// are demultiplied afterwards.
#[inline]
fn to_color<C: RgbaColor>(acc: [i64; 4]) -> C {
    let a = acc[3].clamp(0, 255) as u8;
    let ch = |v: i64| {
        let v = v.clamp(0, a as i64) as u8;
        if C::PREMULTIPLIED {
            v
        } else {
            demultiply(v, a)
        }
    };
    C::from_components([ch(acc[0]), ch(acc[1]), ch(acc[2]), a])
}

// ============================================================================
// Nearest neighbour
// ============================================================================

pub struct SpanImageFilterRgbaNn<'a, C> {
    base: SpanImageFilter<'a>,
    _color: PhantomData<C>,
}

impl<'a, C: RgbaColor> SpanImageFilterRgbaNn<'a, C> {
    pub fn new(base: SpanImageFilter<'a>) -> Self {
        Self {
            base,
            _color: PhantomData,
        }
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilter<'a> {
        &mut self.base
    }
}

impl<C: RgbaColor> SpanGenerator for SpanImageFilterRgbaNn<'_, C> {
    type Color = C;

    fn generate(&mut self, span: &mut [C], x: i32, y: i32) {
        self.base.begin(x, y, span.len());
        let (src, interp) = self.base.parts();
        for pixel in span.iter_mut() {
            let (sx, sy) = interp.coordinates();
            *pixel = C::from_components(src.span(sx >> SHIFT, sy >> SHIFT));
            interp.next();
        }
    }
}

// ============================================================================
// Bilinear
// ============================================================================

pub struct SpanImageFilterRgbaBilinear<'a, C> {
    base: SpanImageFilter<'a>,
    _color: PhantomData<C>,
}

impl<'a, C: RgbaColor> SpanImageFilterRgbaBilinear<'a, C> {
    pub fn new(base: SpanImageFilter<'a>) -> Self {
        Self {
            base,
            _color: PhantomData,
        }
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilter<'a> {
        &mut self.base
    }
}

impl<C: RgbaColor> SpanGenerator for SpanImageFilterRgbaBilinear<'_, C> {
    type Color = C;

    fn generate(&mut self, span: &mut [C], x: i32, y: i32) {
        self.base.begin(x, y, span.len());
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        let (src, interp) = self.base.parts();
        for pixel in span.iter_mut() {
            let (sx, sy) = interp.coordinates();
            let (xh, yh) = (sx - dx, sy - dy);
            let (fx, fy) = ((xh & MASK) as i64, (yh & MASK) as i64);
            let (ifx, ify) = (SCALE as i64 - fx, SCALE as i64 - fy);

            let mut acc = [(SCALE * SCALE / 2) as i64; 4];
            accumulate::<C>(&mut acc, src.span(xh >> SHIFT, yh >> SHIFT), ifx * ify);
            accumulate::<C>(&mut acc, src.next_x(), fx * ify);
            accumulate::<C>(&mut acc, src.next_y(), ifx * fy);
            accumulate::<C>(&mut acc, src.next_x(), fx * fy);

            *pixel = to_color(acc.map(|v| v >> (SHIFT * 2)));
            interp.next();
        }
    }
}

// ============================================================================
// 2×2 kernel
// ============================================================================

/// Bilinear-footprint generator weighted by a two-tap LUT (Bilinear,
/// Hanning, Hermite).
pub struct SpanImageFilterRgba2x2<'a, C> {
    base: SpanImageFilter<'a>,
    _color: PhantomData<C>,
}

impl<'a, C: RgbaColor> SpanImageFilterRgba2x2<'a, C> {
    pub fn new(base: SpanImageFilter<'a>) -> Self {
        Self {
            base,
            _color: PhantomData,
        }
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilter<'a> {
        &mut self.base
    }
}

impl<C: RgbaColor> SpanGenerator for SpanImageFilterRgba2x2<'_, C> {
    type Color = C;

    fn generate(&mut self, span: &mut [C], x: i32, y: i32) {
        let Some(lut) = self.base.filter() else {
            span.fill(C::transparent());
            return;
        };
        self.base.begin(x, y, span.len());
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        let offset = ((lut.diameter() as usize / 2).saturating_sub(1)) << SHIFT;
        let w = &lut.weight_array()[offset..];
        let weight = |wx: i16, wy: i16| {
            ((wx as i64 * wy as i64) + (IMAGE_FILTER_SCALE / 2) as i64) >> IMAGE_FILTER_SHIFT
        };
        let (src, interp) = self.base.parts();
        for pixel in span.iter_mut() {
            let (sx, sy) = interp.coordinates();
            let (xh, yh) = (sx - dx, sy - dy);
            let (fx, fy) = ((xh & MASK) as usize, (yh & MASK) as usize);
            let s = SCALE as usize;

            let mut acc = [0i64; 4];
            accumulate::<C>(&mut acc, src.span(xh >> SHIFT, yh >> SHIFT), weight(w[fx + s], w[fy + s]));
            accumulate::<C>(&mut acc, src.next_x(), weight(w[fx], w[fy + s]));
            accumulate::<C>(&mut acc, src.next_y(), weight(w[fx + s], w[fy]));
            accumulate::<C>(&mut acc, src.next_x(), weight(w[fx], w[fy]));

            *pixel = to_color(acc.map(|v| v >> IMAGE_FILTER_SHIFT));
            interp.next();
        }
    }
}

// ============================================================================
// N×N kernel
// ============================================================================

/// Separable convolution over `diameter × diameter` texels.
pub struct SpanImageFilterRgbaGen<'a, C> {
    base: SpanImageFilter<'a>,
    _color: PhantomData<C>,
}

impl<'a, C: RgbaColor> SpanImageFilterRgbaGen<'a, C> {
    pub fn new(base: SpanImageFilter<'a>) -> Self {
        Self {
            base,
            _color: PhantomData,
        }
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilter<'a> {
        &mut self.base
    }
}

impl<C: RgbaColor> SpanGenerator for SpanImageFilterRgbaGen<'_, C> {
    type Color = C;

    fn generate(&mut self, span: &mut [C], x: i32, y: i32) {
        let Some(lut) = self.base.filter() else {
            span.fill(C::transparent());
            return;
        };
        self.base.begin(x, y, span.len());
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        let diameter = lut.diameter() as usize;
        let start = lut.start();
        let w = lut.weight_array();
        let (src, interp) = self.base.parts();
        for pixel in span.iter_mut() {
            let (sx, sy) = interp.coordinates();
            let (xh, yh) = (sx - dx, sy - dy);
            let x_phase = (MASK - (xh & MASK)) as usize;
            let mut y_idx = (MASK - (yh & MASK)) as usize;

            let mut acc = [0i64; 4];
            let mut texel = src.span((xh >> SHIFT) + start, (yh >> SHIFT) + start);
            for row in 0..diameter {
                let wy = w[y_idx] as i64;
                let mut x_idx = x_phase;
                for col in 0..diameter {
                    let weight = (wy * w[x_idx] as i64 + (IMAGE_FILTER_SCALE / 2) as i64)
                        >> IMAGE_FILTER_SHIFT;
                    accumulate::<C>(&mut acc, texel, weight);
                    if col + 1 < diameter {
                        x_idx += SCALE as usize;
                        texel = src.next_x();
                    }
                }
                if row + 1 < diameter {
                    y_idx += SCALE as usize;
                    texel = src.next_y();
                }
            }

            *pixel = to_color(acc.map(|v| v >> IMAGE_FILTER_SHIFT));
            interp.next();
        }
    }
}

// ============================================================================
// Affine resampling
// ============================================================================

/// Convolution whose footprint grows with minification so every source
/// texel under a device pixel contributes.
pub struct SpanImageResampleRgbaAffine<'a, C> {
    base: SpanImageFilter<'a>,
    scale: SpanImageResampleAffine,
    _color: PhantomData<C>,
}

impl<'a, C: RgbaColor> SpanImageResampleRgbaAffine<'a, C> {
    pub fn new(base: SpanImageFilter<'a>) -> Self {
        Self {
            base,
            scale: SpanImageResampleAffine::new(),
            _color: PhantomData,
        }
    }

    pub fn base_mut(&mut self) -> &mut SpanImageFilter<'a> {
        &mut self.base
    }

    pub fn scale_mut(&mut self) -> &mut SpanImageResampleAffine {
        &mut self.scale
    }
}

impl<C: RgbaColor> SpanGenerator for SpanImageResampleRgbaAffine<'_, C> {
    type Color = C;

    fn prepare(&mut self) {
        let trans = *self.base.interpolator().transformer();
        self.scale.prepare(&trans);
    }

    fn generate(&mut self, span: &mut [C], x: i32, y: i32) {
        let Some(lut) = self.base.filter() else {
            span.fill(C::transparent());
            return;
        };
        self.base.begin(x, y, span.len());
        let (dx, dy) = (self.base.filter_dx_int(), self.base.filter_dy_int());
        let (rx, ry) = self.scale.radii();
        let (rx_inv, ry_inv) = self.scale.radii_inv();
        let diameter = lut.diameter() as i32;
        let extent = (diameter << (SHIFT - 1)) as usize;
        let radius_x = (diameter * rx) >> 1;
        let radius_y = (diameter * ry) >> 1;
        let w = lut.weight_array();
        let (src, interp) = self.base.parts();

        for pixel in span.iter_mut() {
            let (sx, sy) = interp.coordinates();
            let sx = sx + dx - radius_x;
            let sy = sy + dy - radius_y;
            let x_first = (((MASK - (sx & MASK)) * rx_inv) >> SHIFT) as usize;
            let mut y_idx = (((MASK - (sy & MASK)) * ry_inv) >> SHIFT) as usize;

            let mut acc = [0i64; 4];
            let mut total = 0i64;
            let mut texel = src.span(sx >> SHIFT, sy >> SHIFT);
            loop {
                let wy = w[y_idx] as i64;
                let mut x_idx = x_first;
                loop {
                    let weight = (wy * w[x_idx] as i64 + (IMAGE_FILTER_SCALE / 2) as i64)
                        >> IMAGE_FILTER_SHIFT;
                    accumulate::<C>(&mut acc, texel, weight);
                    total += weight;
                    x_idx += rx_inv as usize;
                    if x_idx >= extent {
                        break;
                    }
                    texel = src.next_x();
                }
                y_idx += ry_inv as usize;
                if y_idx >= extent {
                    break;
                }
                texel = src.next_y();
            }

            *pixel = if total == 0 {
                C::transparent()
            } else {
                to_color(acc.map(|v| v / total))
            };
            interp.next();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
