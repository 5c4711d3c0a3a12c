//! Image resampling kernels and their weight table.
//!
//! A kernel is a symmetric weight function of distance; [`ImageFilterLut`]
//! samples it at 1/256-pixel steps as 14-bit fixed-point weights so the
//! image span generators can filter without floating point.

use crate::basics::{iround, uceil};
use std::f64::consts::PI;

pub const IMAGE_FILTER_SHIFT: u32 = 14;
pub const IMAGE_FILTER_SCALE: i32 = 1 << IMAGE_FILTER_SHIFT;
pub const IMAGE_FILTER_MASK: i32 = IMAGE_FILTER_SCALE - 1;

pub const IMAGE_SUBPIXEL_SHIFT: u32 = 8;
pub const IMAGE_SUBPIXEL_SCALE: u32 = 1 << IMAGE_SUBPIXEL_SHIFT;
pub const IMAGE_SUBPIXEL_MASK: u32 = IMAGE_SUBPIXEL_SCALE - 1;

/// A symmetric resampling kernel, evaluated for `0 <= x <= radius`.
pub trait ImageFilterFunction {
    fn radius(&self) -> f64;
    fn calc_weight(&self, x: f64) -> f64;
}

// ============================================================================
// ImageFilterLut
// ============================================================================

/// Fixed-point kernel weights, `diameter * 256` entries. The weight of tap
/// `j` for a sample at subpixel fraction `f` is at `j * 256 + (255 - f)`.
#[derive(Debug, Clone, Default)]
pub struct ImageFilterLut {
    radius: f64,
    diameter: u32,
    start: i32,
    weights: Vec<i16>,
}

impl ImageFilterLut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter<F: ImageFilterFunction>(filter: &F, normalize: bool) -> Self {
        let mut lut = Self::new();
        lut.calculate(filter, normalize);
        lut
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Number of source taps per axis.
    pub fn diameter(&self) -> u32 {
        self.diameter
    }

    /// Offset of the first tap relative to the sample's integer position.
    pub fn start(&self) -> i32 {
        self.start
    }

    pub fn weight_array(&self) -> &[i16] {
        &self.weights
    }

    /// Sample `filter` into the table. With `normalize`, every subpixel
    /// phase is adjusted so its taps sum to exactly [`IMAGE_FILTER_SCALE`].
    pub fn calculate<F: ImageFilterFunction>(&mut self, filter: &F, normalize: bool) {
        let radius = filter.radius().max(0.5);
        self.radius = radius;
        self.diameter = uceil(radius) * 2;
        self.start = -(self.diameter as i32 / 2 - 1);
        let len = (self.diameter as usize) << IMAGE_SUBPIXEL_SHIFT;
        self.weights.clear();
        self.weights.resize(len, 0);

        let pivot = len / 2;
        for i in 0..pivot {
            let x = i as f64 / IMAGE_SUBPIXEL_SCALE as f64;
            let w = iround(filter.calc_weight(x) * IMAGE_FILTER_SCALE as f64) as i16;
            self.weights[pivot + i] = w;
            self.weights[pivot - i] = w;
        }
        self.weights[0] = self.weights[len - 1];

        if normalize {
            self.normalize();
        }
    }

    fn normalize(&mut self) {
        let phases = IMAGE_SUBPIXEL_SCALE as usize;
        let taps = self.diameter as usize;
        let mut toggle = false;

        for phase in 0..phases {
            let idx = |tap: usize| tap * phases + phase;
            loop {
                let sum: i32 = (0..taps).map(|t| self.weights[idx(t)] as i32).sum();
                if sum == IMAGE_FILTER_SCALE || sum == 0 {
                    break;
                }
                let k = IMAGE_FILTER_SCALE as f64 / sum as f64;
                let mut err = -IMAGE_FILTER_SCALE;
                for t in 0..taps {
                    let w = iround(self.weights[idx(t)] as f64 * k) as i16;
                    self.weights[idx(t)] = w;
                    err += w as i32;
                }
                // Push the rounding error into the taps nearest the center,
                // alternating sides.
                let step: i16 = if err > 0 { -1 } else { 1 };
                let mut j = 0;
                while j < taps && err != 0 {
                    toggle = !toggle;
                    let tap = if toggle { taps / 2 + j / 2 } else { taps / 2 - j / 2 };
                    let w = &mut self.weights[idx(tap.min(taps - 1))];
                    if (*w as i32) < IMAGE_FILTER_SCALE {
                        *w += step;
                        err += step as i32;
                    }
                    j += 1;
                }
                if err == 0 {
                    break;
                }
            }
        }

        let len = self.weights.len();
        let pivot = len / 2;
        for i in 0..pivot {
            self.weights[pivot + i] = self.weights[pivot - i];
        }
        self.weights[0] = self.weights[len - 1];
    }
}

// ============================================================================
// Kernels
// ============================================================================

/// Tent, radius 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilterBilinear;

impl ImageFilterFunction for ImageFilterBilinear {
    fn radius(&self) -> f64 {
        1.0
    }
    fn calc_weight(&self, x: f64) -> f64 {
        1.0 - x
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilterHanning;

impl ImageFilterFunction for ImageFilterHanning {
    fn radius(&self) -> f64 {
        1.0
    }
    fn calc_weight(&self, x: f64) -> f64 {
        0.5 + 0.5 * (PI * x).cos()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilterHermite;

impl ImageFilterFunction for ImageFilterHermite {
    fn radius(&self) -> f64 {
        1.0
    }
    fn calc_weight(&self, x: f64) -> f64 {
        (2.0 * x - 3.0) * x * x + 1.0
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilterQuadric;

impl ImageFilterFunction for ImageFilterQuadric {
    fn radius(&self) -> f64 {
        1.5
    }
    fn calc_weight(&self, x: f64) -> f64 {
        match x {
            x if x < 0.5 => 0.75 - x * x,
            x if x < 1.5 => 0.5 * (x - 1.5) * (x - 1.5),
            _ => 0.0,
        }
    }
}

/// Cubic B-spline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilterBicubic;

impl ImageFilterFunction for ImageFilterBicubic {
    fn radius(&self) -> f64 {
        2.0
    }
    fn calc_weight(&self, x: f64) -> f64 {
        let p3 = |v: f64| if v <= 0.0 { 0.0 } else { v * v * v };
        (p3(x + 2.0) - 4.0 * p3(x + 1.0) + 6.0 * p3(x) - 4.0 * p3(x - 1.0)) / 6.0
    }
}

/// Catmull-Rom.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilterCatrom;

impl ImageFilterFunction for ImageFilterCatrom {
    fn radius(&self) -> f64 {
        2.0
    }
    fn calc_weight(&self, x: f64) -> f64 {
        if x < 1.0 {
            0.5 * (2.0 + x * x * (3.0 * x - 5.0))
        } else if x < 2.0 {
            0.5 * (4.0 + x * (-8.0 + x * (5.0 - x)))
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilterSpline16;

impl ImageFilterFunction for ImageFilterSpline16 {
    fn radius(&self) -> f64 {
        2.0
    }
    fn calc_weight(&self, x: f64) -> f64 {
        if x < 1.0 {
            ((x - 9.0 / 5.0) * x - 1.0 / 5.0) * x + 1.0
        } else {
            let t = x - 1.0;
            ((-1.0 / 3.0 * t + 4.0 / 5.0) * t - 7.0 / 15.0) * t
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ImageFilterSpline36;

impl ImageFilterFunction for ImageFilterSpline36 {
    fn radius(&self) -> f64 {
        3.0
    }
    fn calc_weight(&self, x: f64) -> f64 {
        if x < 1.0 {
            ((13.0 / 11.0 * x - 453.0 / 209.0) * x - 3.0 / 209.0) * x + 1.0
        } else if x < 2.0 {
            let t = x - 1.0;
            ((-6.0 / 11.0 * t + 270.0 / 209.0) * t - 156.0 / 209.0) * t
        } else {
            let t = x - 2.0;
            ((1.0 / 11.0 * t - 45.0 / 209.0) * t + 26.0 / 209.0) * t
        }
    }
}

/// Blackman-windowed sinc; the radius is at least 2.
#[derive(Debug, Clone, Copy)]
pub struct ImageFilterBlackman {
    radius: f64,
}

impl ImageFilterBlackman {
    pub fn new(radius: f64) -> Self {
        Self {
            radius: if radius.is_nan() { 2.0 } else { radius.max(2.0) },
        }
    }
}

impl Default for ImageFilterBlackman {
    fn default() -> Self {
        Self::new(3.0)
    }
}

impl ImageFilterFunction for ImageFilterBlackman {
    fn radius(&self) -> f64 {
        self.radius
    }
    fn calc_weight(&self, x: f64) -> f64 {
        if x == 0.0 {
            return 1.0;
        }
        if x > self.radius {
            return 0.0;
        }
        let px = x * PI;
        let xr = px / self.radius;
        (px.sin() / px) * (0.42 + 0.5 * xr.cos() + 0.08 * (2.0 * xr).cos())
    }
}

// ============================================================================
// Tests
// ============================================================================
