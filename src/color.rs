//! Color types.
//!
//! [`Rgba`] is the floating-point working color. [`Rgba8`] (straight alpha)
//! and [`Rgba8Pre`] (premultiplied alpha) are the 8-bit storage colors; they
//! are distinct types and convert only explicitly.

use crate::basics::uround;

const BASE_SHIFT: u32 = 8;
const BASE_MASK: u32 = (1 << BASE_SHIFT) - 1;
const BASE_MSB: u32 = 1 << (BASE_SHIFT - 1);

// ============================================================================
// 8-bit channel arithmetic
// ============================================================================

/// `round(a * b / 255)`, exact for every `u8` pair.
#[inline]
pub fn multiply(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + BASE_MSB;
    (((t >> BASE_SHIFT) + t) >> BASE_SHIFT) as u8
}

/// Inverse of [`multiply`] for a channel `c` scaled by `a`, saturating.
#[inline]
pub fn demultiply(c: u8, a: u8) -> u8 {
    if a == 0 {
        0
    } else {
        ((c as u32 * BASE_MASK + (a as u32 >> 1)) / a as u32).min(BASE_MASK) as u8
    }
}

/// Interpolate `p` toward `q` by `a / 255`.
#[inline]
pub fn lerp(p: u8, q: u8, a: u8) -> u8 {
    let t = (q as i32 - p as i32) * a as i32 + BASE_MSB as i32 - (p > q) as i32;
    (p as i32 + (((t >> BASE_SHIFT) + t) >> BASE_SHIFT)) as u8
}

/// Interpolate `p` toward `q` by `a`, where `q` is already scaled by `a`.
#[inline]
pub fn prelerp(p: u8, q: u8, a: u8) -> u8 {
    p.wrapping_add(q).wrapping_sub(multiply(p, a))
}

// ============================================================================
// Rgba
// ============================================================================

/// Color with `f64` channels in `[0, 1]`, straight alpha.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Rgba {
    pub fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    pub fn new_rgb(r: f64, g: f64, b: f64) -> Self {
        Self::new(r, g, b, 1.0)
    }

    pub fn premultiply(mut self) -> Self {
        self.r *= self.a;
        self.g *= self.a;
        self.b *= self.a;
        self
    }

    pub fn demultiply(mut self) -> Self {
        if self.a == 0.0 {
            self.r = 0.0;
            self.g = 0.0;
            self.b = 0.0;
        } else {
            let inv = 1.0 / self.a;
            self.r *= inv;
            self.g *= inv;
            self.b *= inv;
        }
        self
    }

    pub fn gradient(&self, c: &Rgba, k: f64) -> Rgba {
        Rgba {
            r: self.r + (c.r - self.r) * k,
            g: self.g + (c.g - self.g) * k,
            b: self.b + (c.b - self.b) * k,
            a: self.a + (c.a - self.a) * k,
        }
    }
}

impl From<Rgba8> for Rgba {
    fn from(c: Rgba8) -> Self {
        let m = BASE_MASK as f64;
        Rgba::new(c.r as f64 / m, c.g as f64 / m, c.b as f64 / m, c.a as f64 / m)
    }
}

// ============================================================================
// RgbaColor
// ============================================================================

/// Behaviour shared by the 8-bit color types so gradients, span generators
/// and pixel formats can be generic over straight and premultiplied data.
pub trait RgbaColor: Copy + Default + PartialEq + core::fmt::Debug {
    /// Whether the color channels are scaled by alpha.
    const PREMULTIPLIED: bool;

    fn from_components(c: [u8; 4]) -> Self;
    fn components(&self) -> [u8; 4];

    /// Convert a straight color into this representation.
    fn from_straight(c: Rgba8) -> Self;
    fn to_straight(&self) -> Rgba8;

    #[inline]
    fn alpha(&self) -> u8 {
        self.components()[3]
    }

    #[inline]
    fn transparent() -> Self {
        Self::from_components([0; 4])
    }

    /// Channel-wise interpolation toward `c` by `k` in `[0, 1]`.
    fn gradient(&self, c: &Self, k: f64) -> Self {
        let ik = uround(k.clamp(0.0, 1.0) * BASE_MASK as f64) as u8;
        let (p, q) = (self.components(), c.components());
        Self::from_components([
            lerp(p[0], q[0], ik),
            lerp(p[1], q[1], ik),
            lerp(p[2], q[2], ik),
            lerp(p[3], q[3], ik),
        ])
    }
}

// ============================================================================
// Rgba8
// ============================================================================

/// 8-bit straight-alpha color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Rgba8 = Rgba8::new(0, 0, 0, 255);
    pub const WHITE: Rgba8 = Rgba8::new(255, 255, 255, 255);
    pub const TRANSPARENT: Rgba8 = Rgba8::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Scale alpha by `opacity` in `[0, 1]`.
    pub fn with_opacity(self, opacity: f64) -> Self {
        let a = uround(self.a as f64 * opacity.clamp(0.0, 1.0)) as u8;
        self.with_alpha(a)
    }

    pub fn is_transparent(&self) -> bool {
        self.a == 0
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 255
    }

    pub fn premultiply(self) -> Rgba8Pre {
        match self.a {
            255 => Rgba8Pre::new(self.r, self.g, self.b, 255),
            0 => Rgba8Pre::default(),
            a => Rgba8Pre::new(multiply(self.r, a), multiply(self.g, a), multiply(self.b, a), a),
        }
    }
}

impl From<Rgba> for Rgba8 {
    fn from(c: Rgba) -> Self {
        let q = |v: f64| uround(v.clamp(0.0, 1.0) * BASE_MASK as f64) as u8;
        Rgba8::new(q(c.r), q(c.g), q(c.b), q(c.a))
    }
}

impl From<Rgba8Pre> for Rgba8 {
    fn from(c: Rgba8Pre) -> Self {
        c.demultiply()
    }
}

impl RgbaColor for Rgba8 {
    const PREMULTIPLIED: bool = false;

    #[inline]
    fn from_components(c: [u8; 4]) -> Self {
        Rgba8::new(c[0], c[1], c[2], c[3])
    }

    #[inline]
    fn components(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    fn from_straight(c: Rgba8) -> Self {
        c
    }

    #[inline]
    fn to_straight(&self) -> Rgba8 {
        *self
    }
}

// ============================================================================
// Rgba8Pre
// ============================================================================

/// 8-bit premultiplied color: every channel is already scaled by `a`, so
/// `r, g, b <= a` for well-formed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rgba8Pre {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8Pre {
    /// Channels must already be premultiplied.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn demultiply(self) -> Rgba8 {
        match self.a {
            255 => Rgba8::new(self.r, self.g, self.b, 255),
            0 => Rgba8::TRANSPARENT,
            a => Rgba8::new(demultiply(self.r, a), demultiply(self.g, a), demultiply(self.b, a), a),
        }
    }

    /// Scale all channels by `cover / 255`.
    pub fn scaled(self, cover: u8) -> Self {
        if cover == 255 {
            return self;
        }
        Rgba8Pre::new(
            multiply(self.r, cover),
            multiply(self.g, cover),
            multiply(self.b, cover),
            multiply(self.a, cover),
        )
    }
}

impl From<Rgba8> for Rgba8Pre {
    fn from(c: Rgba8) -> Self {
        c.premultiply()
    }
}

impl RgbaColor for Rgba8Pre {
    const PREMULTIPLIED: bool = true;

    #[inline]
    fn from_components(c: [u8; 4]) -> Self {
        Rgba8Pre::new(c[0], c[1], c[2], c[3])
    }

    #[inline]
    fn components(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[inline]
    fn from_straight(c: Rgba8) -> Self {
        c.premultiply()
    }

    #[inline]
    fn to_straight(&self) -> Rgba8 {
        self.demultiply()
    }
}

// ============================================================================
// Tests
// ============================================================================
