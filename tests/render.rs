use agg_raster::basics::{FillingRule, RectD, RectI};
use agg_raster::color::{Rgba8, Rgba8Pre};
use agg_raster::comp_op::CompOp;
use agg_raster::gradient_lut::GradientLut;
use agg_raster::math::{calc_polygon_area, point_in_polygon};
use agg_raster::math_stroke::LineCap;
use agg_raster::rendering_buffer::ImageView;
use agg_raster::trans_affine::TransAffine;
use agg_raster::{Context, ContextPre, DrawPathFlag, Error, ImageFilter, ImageResample};
use rstest::rstest;

const RED: Rgba8 = Rgba8::opaque(255, 0, 0);

fn buffer(w: u32, h: u32, fill: u8) -> Vec<u8> {
    vec![fill; (w * h * 4) as usize]
}

mod polygons {
    use super::*;

    fn seg_distance((x, y): (f64, f64), (ax, ay): (f64, f64), (bx, by): (f64, f64)) -> f64 {
        let (dx, dy) = (bx - ax, by - ay);
        let t = (((x - ax) * dx + (y - ay) * dy) / (dx * dx + dy * dy)).clamp(0.0, 1.0);
        ((x - ax - t * dx).powi(2) + (y - ay - t * dy).powi(2)).sqrt()
    }

    /// Every pixel whose four corners lie inside the polygon is fully
    /// covered; every pixel whose square cannot touch it is empty.
    #[rstest]
    #[case::triangle(&[4.0, 2.0, 28.0, 4.0, 10.0, 28.0])]
    #[case::square(&[4.0, 4.0, 24.0, 4.0, 24.0, 24.0, 4.0, 24.0])]
    #[case::hexagon(&[16.0, 2.0, 28.0, 9.0, 28.0, 23.0, 16.0, 30.0, 4.0, 23.0, 4.0, 9.0])]
    #[case::sliver(&[1.5, 3.25, 30.5, 5.75, 2.0, 7.5])]
    fn test_convex_polygon_coverage(
        #[case] points: &[f64],
        #[values(FillingRule::NonZero, FillingRule::EvenOdd)] rule: FillingRule,
    ) {
        let poly: Vec<(f64, f64)> = points.chunks(2).map(|p| (p[0], p[1])).collect();
        let mut buf = buffer(32, 32, 0);
        let mut ctx = Context::attach(&mut buf, 32, 32, 128).unwrap();
        ctx.set_fill_rule(rule);
        ctx.add_polygon(points, true);
        ctx.draw_path(DrawPathFlag::FillOnly);

        let (mut full, mut empty) = (0, 0);
        for y in 0..32 {
            for x in 0..32 {
                let (fx, fy) = (x as f64, y as f64);
                let corners = [(fx, fy), (fx + 1.0, fy), (fx, fy + 1.0), (fx + 1.0, fy + 1.0)];
                let alpha = ctx.pixel(x, y).map(|c| c.a);
                let center = (fx + 0.5, fy + 0.5);
                let near_edge = (0..poly.len())
                    .any(|i| seg_distance(center, poly[i], poly[(i + 1) % poly.len()]) <= 0.75);
                if corners.iter().all(|&(cx, cy)| point_in_polygon(&poly, cx, cy)) {
                    assert_eq!(alpha, Some(255), "pixel ({}, {}) is inside", x, y);
                    full += 1;
                } else if !near_edge && !point_in_polygon(&poly, center.0, center.1) {
                    assert_eq!(alpha, Some(0), "pixel ({}, {}) is outside", x, y);
                    empty += 1;
                }
            }
        }
        assert!(full > 0 && empty > 0, "{} full, {} empty", full, empty);

        // Total coverage equals the polygon's area.
        let covered: f64 = (0..32)
            .flat_map(|y| (0..32).map(move |x| (x, y)))
            .filter_map(|(x, y)| ctx.pixel(x, y))
            .map(|c| c.a as f64 / 255.0)
            .sum();
        let area = calc_polygon_area(&poly).abs();
        assert!((covered - area).abs() < 1.5, "covered {} vs area {}", covered, area);
    }

    /// Two overlapping squares wound the same way: the overlap has
    /// winding number 2.
    #[rstest]
    #[case::non_zero(FillingRule::NonZero, 255)]
    #[case::even_odd(FillingRule::EvenOdd, 0)]
    fn test_overlap_depends_on_fill_rule(#[case] rule: FillingRule, #[case] overlap_alpha: u8) {
        let mut buf = buffer(30, 30, 0);
        let mut ctx = Context::attach(&mut buf, 30, 30, 120).unwrap();
        ctx.set_fill_rule(rule);
        ctx.add_polygon(&[2.0, 2.0, 18.0, 2.0, 18.0, 18.0, 2.0, 18.0], true);
        ctx.add_polygon(&[10.0, 10.0, 26.0, 10.0, 26.0, 26.0, 10.0, 26.0], true);
        ctx.draw_path(DrawPathFlag::FillOnly);
        assert_eq!(ctx.pixel(14, 14).map(|c| c.a), Some(overlap_alpha));
        // Single winding agrees under both rules.
        assert_eq!(ctx.pixel(4, 4).map(|c| c.a), Some(255));
        assert_eq!(ctx.pixel(22, 22).map(|c| c.a), Some(255));
    }

    #[test]
    fn test_red_rect_on_white() {
        let mut buf = buffer(10, 10, 255);
        let mut ctx = Context::attach(&mut buf, 10, 10, 40).unwrap();
        ctx.set_fill_color(RED);
        ctx.fill_rect(2.0, 2.0, 6.0, 6.0);
        assert_eq!(ctx.pixel(4, 4), Some(RED));
        assert_eq!(ctx.pixel(1, 1), Some(Rgba8::WHITE));
        assert_eq!(ctx.pixel(6, 6), Some(Rgba8::WHITE));
    }

    #[test]
    fn test_partial_coverage_on_half_pixel_edge() {
        let mut buf = buffer(4, 1, 0);
        let mut ctx = Context::attach(&mut buf, 4, 1, 16).unwrap();
        ctx.fill_rect(0.0, 0.0, 2.5, 1.0);
        let a = ctx.pixel(2, 0).unwrap().a;
        assert!((120..=136).contains(&a), "{}", a);
        assert_eq!(ctx.pixel(3, 0).unwrap().a, 0);
    }

    #[test]
    fn test_straight_and_premultiplied_agree_on_opaque_fill() {
        let mut a = buffer(12, 12, 0);
        let mut b = buffer(12, 12, 0);
        {
            let mut ctx = Context::attach(&mut a, 12, 12, 48).unwrap();
            ctx.set_fill_color(RED);
            ctx.add_polygon(&[1.0, 1.0, 11.0, 3.0, 6.0, 11.0], true);
            ctx.draw_path(DrawPathFlag::FillOnly);
        }
        {
            let mut ctx = ContextPre::attach(&mut b, 12, 12, 48).unwrap();
            ctx.set_fill_color(RED);
            ctx.add_polygon(&[1.0, 1.0, 11.0, 3.0, 6.0, 11.0], true);
            ctx.draw_path(DrawPathFlag::FillOnly);
        }
        // Fully covered pixels are identical; alpha agrees everywhere.
        for (pa, pb) in a.chunks_exact(4).zip(b.chunks_exact(4)) {
            assert_eq!(pa[3], pb[3]);
            if pa[3] == 255 {
                assert_eq!(pa, pb);
            }
        }
    }
}

mod strokes {
    use super::*;

    #[rstest]
    #[case::butt(LineCap::Butt, false)]
    #[case::square(LineCap::Square, true)]
    #[case::round(LineCap::Round, true)]
    fn test_line_caps(#[case] cap: LineCap, #[case] extends: bool) {
        let mut buf = buffer(12, 10, 0);
        let mut ctx = Context::attach(&mut buf, 12, 10, 48).unwrap();
        ctx.set_line_width(4.0);
        ctx.set_line_cap(cap);
        ctx.move_to(3.0, 5.0);
        ctx.line_to(9.0, 5.0);
        ctx.draw_path(DrawPathFlag::StrokeOnly);
        assert_eq!(ctx.pixel(5, 5).map(|c| c.a), Some(255));
        let beyond = ctx.pixel(2, 5).map_or(0, |c| c.a);
        assert_eq!(beyond > 0, extends, "alpha {}", beyond);
    }

    #[test]
    fn test_stroke_width_scales_with_transform() {
        let mut buf = buffer(20, 20, 0);
        let mut ctx = Context::attach(&mut buf, 20, 20, 80).unwrap();
        ctx.scale(4.0, 4.0);
        ctx.set_line_width(1.0);
        ctx.move_to(0.0, 2.5);
        ctx.line_to(5.0, 2.5);
        ctx.draw_path(DrawPathFlag::StrokeOnly);
        // Device band is y in [8, 12].
        assert_eq!(ctx.pixel(10, 8).map(|c| c.a), Some(255));
        assert_eq!(ctx.pixel(10, 11).map(|c| c.a), Some(255));
        assert_eq!(ctx.pixel(10, 13).map(|c| c.a), Some(0));
    }
}

mod color_math {
    use super::*;

    #[rstest]
    fn test_premultiply_round_trip(#[values(64, 128, 200, 255)] a: u8) {
        for v in 0..=255u8 {
            let c = Rgba8::new(v, 255 - v, v / 2, a);
            let back = c.premultiply().demultiply();
            assert_eq!(back.a, a);
            for (x, y) in [(c.r, back.r), (c.g, back.g), (c.b, back.b)] {
                assert!((x as i32 - y as i32).abs() <= 2, "{:?} -> {:?}", c, back);
            }
        }
    }

    #[test]
    fn test_transparent_premultiplies_to_zero() {
        assert_eq!(Rgba8::new(9, 9, 9, 0).premultiply(), Rgba8Pre::default());
    }

    #[rstest]
    #[case(Rgba8::WHITE, Rgba8::BLACK)]
    #[case(Rgba8::opaque(10, 200, 30), Rgba8::new(250, 20, 100, 128))]
    fn test_gradient_ramp_endpoints_and_monotone(#[case] c1: Rgba8, #[case] c2: Rgba8) {
        let mut lut: GradientLut<Rgba8> = GradientLut::new();
        lut.two_color(c1, c2, 1.0);
        let ramp = lut.colors();
        let close = |a: Rgba8, b: Rgba8| {
            [(a.r, b.r), (a.g, b.g), (a.b, b.b), (a.a, b.a)]
                .iter()
                .all(|&(x, y)| (x as i32 - y as i32).abs() <= 1)
        };
        assert!(close(ramp[0], c1), "{:?}", ramp[0]);
        assert!(close(ramp[255], c2), "{:?}", ramp[255]);
        let channel = |c: &Rgba8| [c.r, c.g, c.b, c.a];
        for k in 0..4 {
            let rising = channel(&c2)[k] >= channel(&c1)[k];
            for w in ramp.windows(2) {
                let (p, q) = (channel(&w[0])[k], channel(&w[1])[k]);
                assert!(if rising { q >= p } else { q <= p }, "channel {} {} -> {}", k, p, q);
            }
        }
    }
}

mod transforms {
    use super::*;

    fn samples() -> [TransAffine; 3] {
        [
            TransAffine::new_custom(2.0, 0.3, -0.7, 1.5, 3.0, -4.0),
            TransAffine::new_rotation(0.7),
            TransAffine::new_custom(0.5, 0.0, 0.25, 3.0, -10.0, 8.0),
        ]
    }

    #[test]
    fn test_multiply_is_associative() {
        let [a, b, c] = samples();
        let left = (a * b) * c;
        let right = a * (b * c);
        assert!(left.is_equal(&right, 1e-9), "{:?} {:?}", left, right);
    }

    #[test]
    fn test_double_inverse() {
        for m in samples() {
            let back = m.inverted().unwrap().inverted().unwrap();
            assert!(back.is_equal(&m, 1e-9), "{:?} {:?}", m, back);
        }
    }

    #[test]
    fn test_zero_matrix_fails_to_invert() {
        let mut z = TransAffine::new_custom(0.0, 0.0, 0.0, 0.0, 1.0, 2.0);
        assert!(matches!(z.invert(), Err(Error::SingularTransform { .. })));
        assert_eq!(z.tx, 1.0);
    }
}

mod compositing {
    use super::*;

    fn pattern(w: u32, h: u32) -> Vec<u8> {
        (0..w * h * 4).map(|i| (i * 37 % 251) as u8).collect()
    }

    #[test]
    fn test_dst_leaves_buffer_identical() {
        let original = pattern(16, 16);
        let mut buf = original.clone();
        {
            let mut ctx = Context::attach(&mut buf, 16, 16, 64).unwrap();
            ctx.set_blend_mode(CompOp::Dst);
            ctx.set_fill_color(RED);
            ctx.add_polygon(&[1.0, 1.0, 15.0, 2.0, 8.0, 15.0], true);
            ctx.draw_path(DrawPathFlag::FillAndStroke);
        }
        assert_eq!(buf, original);
    }

    #[rstest]
    fn test_clear_makes_covered_pixels_transparent(#[values(false, true)] premultiplied: bool) {
        let mut buf = buffer(10, 10, 255);
        if premultiplied {
            let mut ctx = ContextPre::attach(&mut buf, 10, 10, 40).unwrap();
            ctx.set_blend_mode(CompOp::Clear);
            ctx.fill_rect(2.0, 2.0, 8.0, 8.0);
        } else {
            let mut ctx = Context::attach(&mut buf, 10, 10, 40).unwrap();
            ctx.set_blend_mode(CompOp::Clear);
            ctx.fill_rect(2.0, 2.0, 8.0, 8.0);
        }
        let at = |x: usize, y: usize| &buf[(y * 10 + x) * 4..(y * 10 + x) * 4 + 4];
        assert_eq!(at(5, 5), &[0, 0, 0, 0]);
        assert_eq!(at(0, 0), &[255, 255, 255, 255]);
    }

    #[rstest]
    fn test_every_operator_leaves_uncovered_pixels(
        #[values(
            CompOp::Alpha,
            CompOp::Src,
            CompOp::SrcIn,
            CompOp::DstOut,
            CompOp::Xor,
            CompOp::Multiply,
            CompOp::Overlay,
            CompOp::ColorBurn,
            CompOp::SoftLight,
            CompOp::Exclusion
        )]
        op: CompOp,
    ) {
        let original = pattern(8, 8);
        let mut buf = original.clone();
        {
            let mut ctx = Context::attach(&mut buf, 8, 8, 32).unwrap();
            ctx.set_blend_mode(op);
            ctx.set_fill_color(Rgba8::new(20, 200, 90, 180));
            ctx.fill_rect(2.0, 2.0, 6.0, 6.0);
        }
        for y in 0..8 {
            for x in 0..8 {
                if (2..6).contains(&x) && (2..6).contains(&y) {
                    continue;
                }
                let i = (y * 8 + x) * 4;
                assert_eq!(&buf[i..i + 4], &original[i..i + 4], "{:?} at ({}, {})", op, x, y);
            }
        }
    }

    #[test]
    fn test_master_alpha_halves_coverage() {
        let mut buf = buffer(4, 4, 0);
        let mut ctx = Context::attach(&mut buf, 4, 4, 16).unwrap();
        ctx.set_master_alpha(0.5);
        ctx.fill_rect(0.0, 0.0, 4.0, 4.0);
        let a = ctx.pixel(1, 1).unwrap().a;
        assert!((126..=129).contains(&a), "{}", a);
    }
}

mod gradients {
    use super::*;

    fn luminance(c: Rgba8) -> u32 {
        c.r as u32 + c.g as u32 + c.b as u32
    }

    #[test]
    fn test_radial_center_brighter_than_edge() {
        let mut buf = buffer(100, 100, 0);
        let mut ctx = Context::attach(&mut buf, 100, 100, 400).unwrap();
        ctx.fill_radial_gradient(50.0, 50.0, 40.0, Rgba8::WHITE, Rgba8::BLACK, 1.0);
        ctx.fill_rect(0.0, 0.0, 100.0, 100.0);
        let center = ctx.pixel(50, 50).unwrap();
        let edge = ctx.pixel(50, 88).unwrap();
        let outside = ctx.pixel(2, 2).unwrap();
        assert!(luminance(center) > luminance(edge), "{:?} {:?}", center, edge);
        assert_eq!(outside, Rgba8::BLACK);
    }

    #[test]
    fn test_linear_gradient_under_rotation() {
        let mut buf = buffer(20, 20, 0);
        let mut ctx = Context::attach(&mut buf, 20, 20, 80).unwrap();
        // World x axis maps to device y.
        ctx.rotate(std::f64::consts::FRAC_PI_2);
        ctx.translate(20.0, 0.0);
        ctx.fill_linear_gradient(0.0, 0.0, 20.0, 0.0, Rgba8::WHITE, Rgba8::BLACK, 1.0);
        ctx.reset_transform();
        ctx.fill_rect(0.0, 0.0, 20.0, 20.0);
        let top = ctx.pixel(10, 1).unwrap();
        let bottom = ctx.pixel(10, 18).unwrap();
        assert!(luminance(top) > luminance(bottom), "{:?} {:?}", top, bottom);
        let left = ctx.pixel(1, 10).unwrap();
        let right = ctx.pixel(18, 10).unwrap();
        assert!(luminance(left).abs_diff(luminance(right)) <= 3, "{:?} {:?}", left, right);
    }
}

mod images {
    use super::*;

    #[rstest]
    fn test_uniform_image_stays_uniform(
        #[values(
            ImageFilter::NoFilter,
            ImageFilter::Bilinear,
            ImageFilter::Hanning,
            ImageFilter::Hermite,
            ImageFilter::Quadric,
            ImageFilter::Bicubic,
            ImageFilter::Catrom,
            ImageFilter::Spline16,
            ImageFilter::Spline36,
            ImageFilter::Blackman(3.0)
        )]
        filter: ImageFilter,
    ) {
        let bytes: Vec<u8> = [90u8, 140, 200, 255].repeat(64);
        let img = ImageView::new(&bytes, 8, 8, 32).unwrap();
        let mut buf = buffer(8, 8, 0);
        let mut ctx = Context::attach(&mut buf, 8, 8, 32).unwrap();
        ctx.set_image_filter(filter);
        ctx.transform_image(&img, RectI::new(0, 0, 8, 8), RectD::new(0.0, 0.0, 8.0, 8.0))
            .unwrap();
        let p = ctx.pixel(4, 4).unwrap();
        for (got, want) in [(p.r, 90), (p.g, 140), (p.b, 200), (p.a, 255)] {
            assert!((got as i32 - want).abs() <= 2, "{:?}: {:?}", filter, p);
        }
    }

    /// Partially covered edge texels blend against transparency, so a white
    /// image on white must stay white all the way to its border.
    #[rstest]
    #[case::bilinear(ImageFilter::Bilinear, ImageResample::NoResample)]
    #[case::two_by_two(ImageFilter::Hanning, ImageResample::NoResample)]
    #[case::general(ImageFilter::Bicubic, ImageResample::NoResample)]
    #[case::resample(ImageFilter::Hanning, ImageResample::Always)]
    fn test_image_edges_do_not_darken(#[case] filter: ImageFilter, #[case] resample: ImageResample) {
        let bytes = vec![255u8; 4 * 4 * 4];
        let img = ImageView::new(&bytes, 4, 4, 16).unwrap();
        let mut buf = buffer(20, 20, 255);
        let mut ctx = Context::attach(&mut buf, 20, 20, 80).unwrap();
        ctx.set_image_filter(filter);
        ctx.set_image_resample(resample);
        ctx.transform_image(&img, RectI::new(0, 0, 4, 4), RectD::new(2.0, 2.0, 18.0, 18.0))
            .unwrap();
        for (x, y) in [(2, 10), (17, 10), (10, 2), (10, 17), (2, 2), (10, 10)] {
            assert_eq!(ctx.pixel(x, y), Some(Rgba8::WHITE), "{:?} at ({}, {})", filter, x, y);
        }
    }

    #[test]
    fn test_parallelogram_destination() {
        let bytes = vec![255u8; 4 * 4 * 4];
        let img = ImageView::new(&bytes, 4, 4, 16).unwrap();
        let mut buf = buffer(20, 20, 0);
        let mut ctx = Context::attach(&mut buf, 20, 20, 80).unwrap();
        ctx.set_image_filter(ImageFilter::NoFilter);
        // Sheared: top edge (2,2)-(12,2), right edge down to (18,12).
        ctx.transform_image_parl(&img, RectI::new(0, 0, 4, 4), &[2.0, 2.0, 12.0, 2.0, 18.0, 12.0])
            .unwrap();
        assert_eq!(ctx.pixel(7, 3), Some(Rgba8::WHITE));
        assert_eq!(ctx.pixel(15, 10), Some(Rgba8::WHITE));
        assert_eq!(ctx.pixel(3, 10), Some(Rgba8::TRANSPARENT));
    }
}
