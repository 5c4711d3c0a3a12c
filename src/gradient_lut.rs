//! Gradient color ramps.
//!
//! A [`GradientLut`] holds a fixed 256-entry table built from color stops.
//! Entry 0 is exactly the first stop's color and entry 255 exactly the last
//! one's; the table is only rebuilt when its stops change.

use crate::basics::iround;
use crate::color::{Rgba8, RgbaColor};

pub const GRADIENT_LUT_SIZE: usize = 256;

// ============================================================================
// ColorFunction
// ============================================================================

/// Indexed color palette read by `SpanGradient`.
pub trait ColorFunction {
    type Color;

    fn size(&self) -> usize;
    fn get(&self, index: usize) -> Self::Color;
}

// ============================================================================
// GradientLut
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq)]
struct ColorStop {
    offset: f64,
    color: Rgba8,
}

/// Stops are straight-alpha colors; the table stores `C`, so a
/// premultiplied ramp interpolates in straight space and converts per entry.
#[derive(Debug, Clone)]
pub struct GradientLut<C: RgbaColor> {
    stops: Vec<ColorStop>,
    built: Vec<ColorStop>,
    lut: [C; GRADIENT_LUT_SIZE],
}

impl<C: RgbaColor> GradientLut<C> {
    pub fn new() -> Self {
        Self {
            stops: Vec::new(),
            built: Vec::new(),
            lut: [C::default(); GRADIENT_LUT_SIZE],
        }
    }

    pub fn remove_all(&mut self) {
        self.stops.clear();
    }

    /// Add a stop; `offset` is clamped to `[0, 1]`.
    pub fn add_color(&mut self, offset: f64, color: Rgba8) {
        let offset = if offset.is_nan() { 0.0 } else { offset.clamp(0.0, 1.0) };
        self.stops.push(ColorStop { offset, color });
    }

    /// Rebuild the table from the current stops. Stops are ordered by
    /// offset (stable for equal offsets); fewer than two leave the table
    /// as it was. Returns whether a rebuild happened.
    pub fn build_lut(&mut self) -> bool {
        self.stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        if self.stops.len() < 2 || self.stops == self.built {
            return false;
        }
        let last = GRADIENT_LUT_SIZE - 1;
        for (i, entry) in self.lut.iter_mut().enumerate() {
            let t = i as f64 / last as f64;
            *entry = C::from_straight(sample(&self.stops, t));
        }
        self.built.clone_from(&self.stops);
        true
    }

    /// Two-color ramp. `profile` in `[0, 1]` sets how much of the table
    /// the transition occupies, centered; outside it the ramp holds `c1`
    /// below and `c2` above. 1 spreads the transition over the whole table.
    pub fn two_color(&mut self, c1: Rgba8, c2: Rgba8, profile: f64) -> bool {
        let half = iround(profile.clamp(0.0, 1.0) * 127.0);
        let start = (128 - half).max(0) as f64 / (GRADIENT_LUT_SIZE - 1) as f64;
        let end = (128 + half).max(128 - half + 1) as f64 / (GRADIENT_LUT_SIZE - 1) as f64;
        self.remove_all();
        self.add_color(0.0, c1);
        self.add_color(start, c1);
        self.add_color(end, c2);
        self.add_color(1.0, c2);
        self.build_lut()
    }

    pub fn colors(&self) -> &[C; GRADIENT_LUT_SIZE] {
        &self.lut
    }
}

impl<C: RgbaColor> Default for GradientLut<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Color at `t` along sorted stops.
fn sample(stops: &[ColorStop], t: f64) -> Rgba8 {
    let upper = stops.partition_point(|s| s.offset <= t);
    match upper {
        0 => stops[0].color,
        n if n == stops.len() => stops[n - 1].color,
        n => {
            let (a, b) = (&stops[n - 1], &stops[n]);
            let span = b.offset - a.offset;
            if span <= 0.0 {
                b.color
            } else {
                a.color.gradient(&b.color, (t - a.offset) / span)
            }
        }
    }
}

impl<C: RgbaColor> ColorFunction for GradientLut<C> {
    type Color = C;

    #[inline]
    fn size(&self) -> usize {
        GRADIENT_LUT_SIZE
    }

    #[inline]
    fn get(&self, index: usize) -> C {
        self.lut[index]
    }
}

// ============================================================================
// Tests
// ============================================================================
