//! # agg-raster
//!
//! Software 2D vector rendering in the Anti-Grain Geometry style. Paths made
//! of lines and Bézier curves are flattened, optionally dashed and stroked,
//! transformed, rasterized with exact anti-aliased coverage and composited
//! into an RGBA buffer as solid colors, gradients or resampled images.
//!
//! ## Architecture
//!
//! Rendering runs through a five-stage pipeline:
//!
//! 1. **Vertex Source**: [`path_storage::PathStorage`] or any [`basics::VertexSource`]
//! 2. **Coordinate Conversion**: curves, dashes, strokes, transforms (`conv_*`)
//! 3. **Scanline Rasterizer**: [`rasterizer_scanline_aa::RasterizerScanlineAa`]
//! 4. **Scanline Container**: [`scanline_u::ScanlineU8`], [`scanline_p::ScanlineP8`]
//! 5. **Renderer**: span generators blended by [`renderer_base::RendererBase`]
//!
//! [`context::Context`] wires all stages over a caller-owned buffer:
//!
//! ```
//! use agg_raster::{Context, Rgba8};
//!
//! let mut buf = vec![255u8; 10 * 10 * 4];
//! let mut ctx = Context::attach(&mut buf, 10, 10, 40)?;
//! ctx.set_fill_color(Rgba8::opaque(255, 0, 0));
//! ctx.fill_rect(2.0, 2.0, 6.0, 6.0);
//! assert_eq!(ctx.pixel(4, 4), Some(Rgba8::opaque(255, 0, 0)));
//! # Ok::<(), agg_raster::Error>(())
//! ```

// Foundation types & math
pub mod array;
pub mod basics;
pub mod color;
pub mod error;
pub mod gamma;
pub mod math;

// Geometry
pub mod curves;
pub mod dda_line;
pub mod math_stroke;
pub mod path_storage;
pub mod rendering_buffer;
pub mod trans_affine;

// Converters & generators
pub mod conv_adaptor_vcgen;
pub mod conv_curve;
pub mod conv_dash;
pub mod conv_stroke;
pub mod conv_transform;
pub mod vcgen_dash;
pub mod vcgen_stroke;

// Scanline rasterizer
pub mod rasterizer_cells_aa;
pub mod rasterizer_scanline_aa;
pub mod rasterizer_sl_clip;
pub mod scanline_p;
pub mod scanline_u;

// Pixel formats & renderers
pub mod comp_op;
pub mod pixfmt_rgba;
pub mod renderer_base;
pub mod renderer_scanline;

// Span generators
pub mod gradient_lut;
pub mod image_accessors;
pub mod image_filters;
pub mod span_allocator;
pub mod span_gradient;
pub mod span_image_filter;
pub mod span_image_filter_rgba;
pub mod span_interpolator_linear;

// High-level drawing
pub mod context;
pub mod drawing_state;

pub use color::{Rgba8, Rgba8Pre};
pub use context::{Context, ContextPre};
pub use drawing_state::{DrawPathFlag, DrawingState, GradientSpread, ImageFilter, ImageResample};
pub use error::{Error, Result};
