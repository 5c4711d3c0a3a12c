//! Drawing images.
//!
//! A source rectangle of the image (edge coordinates, `x2`/`y2`
//! exclusive) is mapped onto a destination parallelogram in world space.
//! Device pixels inside the destination are colored by sampling the image
//! through the inverse mapping with the configured [`ImageFilter`];
//! samples that fall outside the source rectangle read as transparent.

use super::{RenderingContext, LOG_TARGET};
use crate::basics::{iround, FillingRule, RectD, RectI};
use crate::color::RgbaColor;
use crate::conv_transform::ConvTransform;
use crate::drawing_state::{ImageFilter, ImageResample};
use crate::error::{Error, Result};
use crate::image_accessors::ImageAccessorClip;
use crate::pixfmt_rgba::Blender;
use crate::renderer_scanline::render_scanlines_aa;
use crate::rendering_buffer::ImageView;
use crate::span_image_filter::SpanImageFilter;
use crate::span_image_filter_rgba::{
    SpanImageFilterRgba2x2, SpanImageFilterRgbaBilinear, SpanImageFilterRgbaGen,
    SpanImageFilterRgbaNn, SpanImageResampleRgbaAffine,
};
use crate::span_interpolator_linear::SpanInterpolatorLinear;
use crate::trans_affine::TransAffine;

/// Inverse scale above which `OnZoomOut` switches to resampling.
const ZOOM_OUT_THRESHOLD: f64 = 1.125;

/// Area of the device covered by an image draw.
#[derive(Clone, Copy)]
enum Coverage<'p> {
    Parallelogram(&'p [f64; 6]),
    CurrentPath,
}

/// Source rectangle after validation: the part inside the image, and the
/// requested rectangle relative to that part.
struct SourceWindow<'i> {
    view: ImageView<'i>,
    rect: RectD,
}

fn source_window<'i>(img: &ImageView<'i>, src: RectI) -> Result<Option<SourceWindow<'i>>> {
    let mut src = src;
    src.normalize();
    if src.x1 == src.x2 || src.y1 == src.y2 {
        return Err(Error::EmptySourceRect {
            x1: src.x1,
            y1: src.y1,
            x2: src.x2,
            y2: src.y2,
        });
    }
    let x1 = src.x1.max(0);
    let y1 = src.y1.max(0);
    let x2 = src.x2.min(img.width() as i32);
    let y2 = src.y2.min(img.height() as i32);
    if x1 >= x2 || y1 >= y2 {
        log::debug!(target: LOG_TARGET, "source rectangle {:?} misses the image", src);
        return Ok(None);
    }
    let view = img.sub_view(x1 as u32, y1 as u32, (x2 - x1) as u32, (y2 - y1) as u32)?;
    let rect = RectD::new(
        (src.x1 - x1) as f64,
        (src.y1 - y1) as f64,
        (src.x2 - x1) as f64,
        (src.y2 - y1) as f64,
    );
    Ok(Some(SourceWindow { view, rect }))
}

impl<'a, B: Blender> RenderingContext<'a, B> {
    /// Draw `src` of `img` stretched onto the world rectangle `dst`.
    pub fn transform_image(&mut self, img: &ImageView<'_>, src: RectI, dst: RectD) -> Result<()> {
        let parl = [dst.x1, dst.y1, dst.x2, dst.y1, dst.x2, dst.y2];
        self.render_image(img, src, &parl, Coverage::Parallelogram(&parl))
    }

    /// Draw `src` of `img` onto a world parallelogram given as three
    /// corners `[x1, y1, x2, y2, x3, y3]`: the images of the source's
    /// top-left, top-right and bottom-right corners.
    pub fn transform_image_parl(&mut self, img: &ImageView<'_>, src: RectI, parl: &[f64]) -> Result<()> {
        let parl: &[f64; 6] = parl
            .try_into()
            .map_err(|_| Error::InvalidParallelogram(parl.len()))?;
        self.render_image(img, src, parl, Coverage::Parallelogram(parl))
    }

    /// Like [`transform_image`](Self::transform_image), but only pixels
    /// inside the current path are drawn.
    pub fn transform_image_path(&mut self, img: &ImageView<'_>, src: RectI, dst: RectD) -> Result<()> {
        let parl = [dst.x1, dst.y1, dst.x2, dst.y1, dst.x2, dst.y2];
        self.render_image(img, src, &parl, Coverage::CurrentPath)
    }

    /// Copy `src` of `img` unscaled so its top-left corner lands on the
    /// device position of world point `(dst_x, dst_y)`. Pixels are
    /// written as-is, ignoring blend mode, master alpha and gamma; the
    /// clip box still applies.
    pub fn copy_image(&mut self, img: &ImageView<'_>, src: RectI, dst_x: f64, dst_y: f64) -> Result<()> {
        let Some(window) = source_window(img, src)? else {
            return Ok(());
        };
        let (dx, dy) = self.world_to_screen(dst_x, dst_y);
        // Cropping the window moves its origin inside the requested rectangle.
        let x = iround(dx) - window.rect.x1 as i32;
        let y = iround(dy) - window.rect.y1 as i32;
        log::debug!(target: LOG_TARGET, "copy_image {:?} to ({}, {})", src, x, y);
        let view = window.view;
        for row in 0..view.height() {
            let span = self.alloc.allocate(view.width() as usize);
            for (c, texel) in span.iter_mut().zip(view.row(row).chunks_exact(4)) {
                *c = B::Color::from_components([texel[0], texel[1], texel[2], texel[3]]);
            }
            self.ren.copy_color_hspan(x, y + row as i32, span);
        }
        Ok(())
    }

    fn render_image(
        &mut self,
        img: &ImageView<'_>,
        src: RectI,
        parl: &[f64; 6],
        coverage: Coverage<'_>,
    ) -> Result<()> {
        let Some(window) = source_window(img, src)? else {
            return Ok(());
        };
        let r = window.rect;
        let mut mtx = TransAffine::new();
        if let Err(e) = mtx.rect_to_parl(r.x1, r.y1, r.x2, r.y2, parl) {
            log::debug!(target: LOG_TARGET, "image skipped: {}", e);
            return Ok(());
        }
        mtx.multiply(&self.state.transform);
        let inverse = match mtx.inverted() {
            Ok(m) => m,
            Err(e) => {
                log::debug!(target: LOG_TARGET, "image skipped: {}", e);
                return Ok(());
            }
        };

        self.ras.reset();
        match coverage {
            Coverage::Parallelogram(p) => {
                self.ras.filling_rule(FillingRule::NonZero);
                let t = &self.state.transform;
                let corners = [
                    (p[0], p[1]),
                    (p[2], p[3]),
                    (p[4], p[5]),
                    (p[0] + p[4] - p[2], p[1] + p[5] - p[3]),
                ];
                for (i, &(x, y)) in corners.iter().enumerate() {
                    let (x, y) = t.transformed(x, y);
                    if i == 0 {
                        self.ras.move_to_d(x, y);
                    } else {
                        self.ras.line_to_d(x, y);
                    }
                }
                self.ras.close_polygon();
            }
            Coverage::CurrentPath => {
                self.ras.filling_rule(self.state.fill_rule);
                let mut shape = ConvTransform::new(&mut self.path, self.state.transform);
                self.ras.add_path(&mut shape, 0);
            }
        }

        let resample = match self.state.image_resample {
            ImageResample::NoResample => false,
            ImageResample::Always => true,
            ImageResample::OnZoomOut => {
                let (sx, sy) = inverse.scaling();
                sx > ZOOM_OUT_THRESHOLD || sy > ZOOM_OUT_THRESHOLD
            }
        };
        let filter = self.state.image_filter;
        let Self {
            ras,
            sl,
            ren,
            alloc,
            image_lut,
            ..
        } = self;
        let lut = image_lut.as_ref();
        let base = SpanImageFilter::new(
            ImageAccessorClip::new(window.view),
            SpanInterpolatorLinear::new(inverse),
            lut,
        );
        match lut {
            None => {
                let mut sg = SpanImageFilterRgbaNn::<B::Color>::new(base);
                render_scanlines_aa(ras, sl, ren, alloc, &mut sg);
            }
            Some(_) if resample => {
                let mut sg = SpanImageResampleRgbaAffine::<B::Color>::new(base);
                render_scanlines_aa(ras, sl, ren, alloc, &mut sg);
            }
            Some(_) if filter == ImageFilter::Bilinear => {
                let mut sg = SpanImageFilterRgbaBilinear::<B::Color>::new(base);
                render_scanlines_aa(ras, sl, ren, alloc, &mut sg);
            }
            Some(l) if l.diameter() == 2 => {
                let mut sg = SpanImageFilterRgba2x2::<B::Color>::new(base);
                render_scanlines_aa(ras, sl, ren, alloc, &mut sg);
            }
            Some(_) => {
                let mut sg = SpanImageFilterRgbaGen::<B::Color>::new(base);
                render_scanlines_aa(ras, sl, ren, alloc, &mut sg);
            }
        }
        Ok(())
    }
}
