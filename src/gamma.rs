//! Gamma shaping of anti-aliasing coverage.
//!
//! Gamma curves are plain `f64 -> f64` maps on `[0, 1]`. [`CoverLut`] bakes
//! a power curve together with a master alpha into a 256-entry table that the
//! pixel formats apply to every cover value.

use crate::basics::uround;

pub trait GammaFunction {
    fn call(&self, x: f64) -> f64;
}

/// `x^gamma`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GammaPower {
    gamma: f64,
}

impl GammaPower {
    pub fn new(gamma: f64) -> Self {
        Self { gamma }
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }
}

impl Default for GammaPower {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl GammaFunction for GammaPower {
    #[inline]
    fn call(&self, x: f64) -> f64 {
        x.powf(self.gamma)
    }
}

// ============================================================================
// CoverLut
// ============================================================================

/// `table[c] = round(255 * g(floor(c * alpha) / 255))` for a gamma curve
/// `g` and a master alpha in `[0, 1]`.
#[derive(Debug, Clone)]
pub struct CoverLut {
    table: [u8; 256],
    gamma: f64,
    master_alpha: f64,
    identity: bool,
}

impl CoverLut {
    /// Power-law table. `gamma` and `master_alpha` are taken as given;
    /// callers clamp them.
    pub fn new(gamma: f64, master_alpha: f64) -> Self {
        let mut lut = Self {
            table: [0; 256],
            gamma,
            master_alpha,
            identity: true,
        };
        lut.rebuild();
        lut
    }

    fn rebuild(&mut self) {
        let g = GammaPower::new(self.gamma);
        let power_applies = self.gamma != 1.0;
        for (i, t) in self.table.iter_mut().enumerate() {
            let c = (i as f64 * self.master_alpha).floor().clamp(0.0, 255.0);
            *t = if power_applies {
                uround(g.call(c / 255.0) * 255.0) as u8
            } else {
                c as u8
            };
        }
        self.identity = self.table.iter().enumerate().all(|(i, &t)| t as usize == i);
    }

    /// Update parameters; the table is rebuilt only when they change.
    /// Returns whether a rebuild happened.
    pub fn set(&mut self, gamma: f64, master_alpha: f64) -> bool {
        if gamma == self.gamma && master_alpha == self.master_alpha {
            return false;
        }
        self.gamma = gamma;
        self.master_alpha = master_alpha;
        self.rebuild();
        true
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    pub fn master_alpha(&self) -> f64 {
        self.master_alpha
    }

    /// `true` when the table maps every cover to itself.
    #[inline]
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    #[inline]
    pub fn apply(&self, cover: u8) -> u8 {
        self.table[cover as usize]
    }
}

impl Default for CoverLut {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
