use agg_raster::basics::{RectD, RectI};
use agg_raster::rendering_buffer::ImageView;
use agg_raster::{Context, DrawPathFlag, ImageFilter, ImageResample, Rgba8};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const W: u32 = 512;
const H: u32 = 512;

fn star(ctx: &mut Context<'_>, cx: f64, cy: f64, r: f64) {
    ctx.reset_path();
    for i in 0..10 {
        let a = std::f64::consts::PI * i as f64 / 5.0;
        let rr = if i % 2 == 0 { r } else { r * 0.4 };
        let (x, y) = (cx + rr * a.cos(), cy + rr * a.sin());
        if i == 0 {
            ctx.move_to(x, y);
        } else {
            ctx.line_to(x, y);
        }
    }
    ctx.close_polygon();
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut buf = vec![255u8; (W * H * 4) as usize];

    c.bench_function("fill star 512", |b| {
        let mut ctx = Context::attach(&mut buf, W, H, W as usize * 4).unwrap();
        ctx.set_fill_color(Rgba8::new(200, 30, 30, 200));
        b.iter(|| {
            star(&mut ctx, 256.0, 256.0, black_box(240.0));
            ctx.draw_path(DrawPathFlag::FillOnly);
        })
    });

    c.bench_function("stroke dashed curves 512", |b| {
        let mut ctx = Context::attach(&mut buf, W, H, W as usize * 4).unwrap();
        ctx.set_line_width(3.0);
        ctx.set_dash(&[(12.0, 6.0), (3.0, 6.0)], 0.0);
        b.iter(|| {
            ctx.reset_path();
            ctx.move_to(10.0, 256.0);
            for i in 0..8 {
                let x = 10.0 + 62.0 * i as f64;
                ctx.cubic_curve_to(x + 20.0, 20.0, x + 40.0, 490.0, x + 62.0, 256.0);
            }
            ctx.draw_path(DrawPathFlag::StrokeOnly);
        })
    });

    c.bench_function("radial gradient 512", |b| {
        let mut ctx = Context::attach(&mut buf, W, H, W as usize * 4).unwrap();
        ctx.fill_radial_gradient(256.0, 256.0, 200.0, Rgba8::WHITE, Rgba8::BLACK, 1.0);
        b.iter(|| ctx.fill_rect(0.0, 0.0, black_box(512.0), 512.0))
    });

    let texels: Vec<u8> = (0..256 * 256 * 4).map(|i| (i % 253) as u8).collect();
    let img = ImageView::new(&texels, 256, 256, 1024).unwrap();
    for (name, filter, resample) in [
        ("image bilinear", ImageFilter::Bilinear, ImageResample::NoResample),
        ("image bicubic", ImageFilter::Bicubic, ImageResample::NoResample),
        ("image resample", ImageFilter::Hanning, ImageResample::Always),
    ] {
        c.bench_function(name, |b| {
            let mut ctx = Context::attach(&mut buf, W, H, W as usize * 4).unwrap();
            ctx.set_image_filter(filter);
            ctx.set_image_resample(resample);
            ctx.rotate(0.3);
            b.iter(|| {
                ctx.transform_image(
                    &img,
                    RectI::new(0, 0, 256, 256),
                    RectD::new(100.0, 0.0, black_box(400.0), 300.0),
                )
                .unwrap()
            })
        });
    }
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
