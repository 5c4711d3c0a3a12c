//! Compositing operators.
//!
//! Every operator is a pure function of a premultiplied destination pixel,
//! a premultiplied source color and a coverage value. [`CompOp::Alpha`] is
//! the classic integer "lerp toward source" blend; the Porter-Duff and
//! separable blend modes follow the SVG compositing formulas and run in an
//! `f64` premultiplied working space.

use crate::basics::{uround, CoverType, COVER_FULL};
use crate::color::{multiply, prelerp};

// ============================================================================
// CompOp
// ============================================================================

/// Blend operator applied by the pixel format to every covered pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompOp {
    /// Integer source-over with coverage-scaled alpha.
    #[default]
    Alpha,
    Clear,
    Src,
    /// Leaves the destination untouched.
    Dst,
    SrcOver,
    DstOver,
    SrcIn,
    DstIn,
    SrcOut,
    DstOut,
    SrcAtop,
    DstAtop,
    Xor,
    Plus,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
    ColorDodge,
    ColorBurn,
    HardLight,
    SoftLight,
    Difference,
    Exclusion,
}

impl CompOp {
    pub const ALL: [CompOp; 25] = [
        CompOp::Alpha,
        CompOp::Clear,
        CompOp::Src,
        CompOp::Dst,
        CompOp::SrcOver,
        CompOp::DstOver,
        CompOp::SrcIn,
        CompOp::DstIn,
        CompOp::SrcOut,
        CompOp::DstOut,
        CompOp::SrcAtop,
        CompOp::DstAtop,
        CompOp::Xor,
        CompOp::Plus,
        CompOp::Multiply,
        CompOp::Screen,
        CompOp::Overlay,
        CompOp::Darken,
        CompOp::Lighten,
        CompOp::ColorDodge,
        CompOp::ColorBurn,
        CompOp::HardLight,
        CompOp::SoftLight,
        CompOp::Difference,
        CompOp::Exclusion,
    ];

    /// Operators whose result inside the source footprint also depends on
    /// erasing the destination. Partial coverage interpolates between the
    /// untouched destination and the full-coverage result.
    fn lerps_by_cover(self) -> bool {
        matches!(
            self,
            CompOp::Clear
                | CompOp::Src
                | CompOp::SrcIn
                | CompOp::DstIn
                | CompOp::SrcOut
                | CompOp::DstOut
                | CompOp::DstAtop
        )
    }

    /// Composite premultiplied `src` onto premultiplied `dst` at `cover`.
    pub fn blend(self, dst: [u8; 4], src: [u8; 4], cover: CoverType) -> [u8; 4] {
        if cover == 0 || self == CompOp::Dst {
            return dst;
        }
        if self == CompOp::Alpha {
            return blend_alpha_pre(dst, src, cover);
        }
        let d = Premul::from_bytes(dst);
        let s = Premul::from_bytes(src);
        let c = cover as f64 / COVER_FULL as f64;
        let out = if self.lerps_by_cover() {
            d.lerp(&self.composite(d, s), c)
        } else {
            self.composite(d, s.scale(c))
        };
        out.to_bytes()
    }

    /// Full-coverage result of the operator.
    fn composite(self, d: Premul, s: Premul) -> Premul {
        let s1a = 1.0 - s.a;
        let d1a = 1.0 - d.a;
        match self {
            CompOp::Alpha | CompOp::SrcOver => Premul::zip(d, s, |dc, sc| sc + dc * s1a, s.a + d.a * s1a),
            CompOp::Clear => Premul::default(),
            CompOp::Src => s,
            CompOp::Dst => d,
            CompOp::DstOver => Premul::zip(d, s, |dc, sc| dc + sc * d1a, d.a + s.a * d1a),
            CompOp::SrcIn => s.scale(d.a),
            CompOp::DstIn => d.scale(s.a),
            CompOp::SrcOut => s.scale(d1a),
            CompOp::DstOut => d.scale(s1a),
            CompOp::SrcAtop => Premul::zip(d, s, |dc, sc| sc * d.a + dc * s1a, d.a),
            CompOp::DstAtop => Premul::zip(d, s, |dc, sc| dc * s.a + sc * d1a, s.a),
            CompOp::Xor => Premul::zip(d, s, |dc, sc| sc * d1a + dc * s1a, s.a + d.a - 2.0 * s.a * d.a),
            CompOp::Plus => Premul::zip(d, s, |dc, sc| sc + dc, s.a + d.a),
            _ => separable(self, d, s),
        }
    }
}

/// Separable blend modes: `B(Sca, Dca) + Sca.(1 - Da) + Dca.(1 - Sa)`,
/// alpha `Sa + Da - Sa.Da`.
fn separable(op: CompOp, d: Premul, s: Premul) -> Premul {
    if s.a <= 0.0 {
        return d;
    }
    let sada = s.a * d.a;
    let mix = |dc: f64, sc: f64| {
        let b = match op {
            CompOp::Multiply => sc * dc,
            CompOp::Screen => sc * d.a + dc * s.a - sc * dc,
            CompOp::Overlay => hard_light(dc, d.a, sc, s.a),
            CompOp::Darken => (sc * d.a).min(dc * s.a),
            CompOp::Lighten => (sc * d.a).max(dc * s.a),
            CompOp::ColorDodge => {
                if sc * d.a + dc * s.a >= sada {
                    sada
                } else {
                    dc * s.a / (1.0 - sc / s.a)
                }
            }
            CompOp::ColorBurn => {
                if sc * d.a + dc * s.a <= sada {
                    0.0
                } else {
                    s.a * (sc * d.a + dc * s.a - sada) / sc
                }
            }
            CompOp::HardLight => hard_light(sc, s.a, dc, d.a),
            CompOp::SoftLight => soft_light(dc, d.a, sc, s.a),
            CompOp::Difference => sc * d.a + dc * s.a - 2.0 * (sc * d.a).min(dc * s.a),
            CompOp::Exclusion => sc * d.a + dc * s.a - 2.0 * sc * dc,
            // Normal.
            _ => sc * d.a,
        };
        b + sc * (1.0 - d.a) + dc * (1.0 - s.a)
    };
    Premul::zip(d, s, mix, s.a + d.a - sada)
}

/// Shared by HardLight and Overlay, which swap the roles of the layers;
/// layer `a` selects the branch.
#[inline]
fn hard_light(ac: f64, aa: f64, bc: f64, ba: f64) -> f64 {
    if 2.0 * ac <= aa {
        2.0 * ac * bc
    } else {
        aa * ba - 2.0 * (ba - bc) * (aa - ac)
    }
}

#[inline]
fn soft_light(dc: f64, da: f64, sc: f64, sa: f64) -> f64 {
    let m = if da > 0.0 { dc / da } else { 0.0 };
    if 2.0 * sc <= sa {
        dc * (sa + (2.0 * sc - sa) * (1.0 - m))
    } else if 4.0 * dc <= da {
        dc * sa + da * (2.0 * sc - sa) * (4.0 * m * (4.0 * m + 1.0) * (m - 1.0) + 7.0 * m)
    } else {
        dc * sa + da * (2.0 * sc - sa) * (m.sqrt() - m)
    }
}

/// `Alpha` on premultiplied data: `d = s.cover + d.(1 - sa.cover)`.
#[inline]
pub fn blend_alpha_pre(dst: [u8; 4], src: [u8; 4], cover: CoverType) -> [u8; 4] {
    let s = if cover == COVER_FULL {
        src
    } else {
        src.map(|v| multiply(v, cover))
    };
    match s[3] {
        0 => dst,
        255 => s,
        alpha => [
            prelerp(dst[0], s[0], alpha),
            prelerp(dst[1], s[1], alpha),
            prelerp(dst[2], s[2], alpha),
            prelerp(dst[3], s[3], alpha),
        ],
    }
}

// ============================================================================
// Premultiplied f64 working space
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Premul {
    r: f64,
    g: f64,
    b: f64,
    a: f64,
}

impl Premul {
    #[inline]
    fn from_bytes(p: [u8; 4]) -> Self {
        let f = |v: u8| v as f64 / 255.0;
        Self {
            r: f(p[0]),
            g: f(p[1]),
            b: f(p[2]),
            a: f(p[3]),
        }
    }

    /// Quantize, keeping every color channel at or below alpha.
    #[inline]
    fn to_bytes(self) -> [u8; 4] {
        let a = self.a.clamp(0.0, 1.0);
        let q = |v: f64| uround(v * 255.0) as u8;
        [
            q(self.r.clamp(0.0, a)),
            q(self.g.clamp(0.0, a)),
            q(self.b.clamp(0.0, a)),
            q(a),
        ]
    }

    #[inline]
    fn scale(self, k: f64) -> Self {
        Self {
            r: self.r * k,
            g: self.g * k,
            b: self.b * k,
            a: self.a * k,
        }
    }

    #[inline]
    fn lerp(&self, to: &Premul, k: f64) -> Self {
        Self {
            r: self.r + (to.r - self.r) * k,
            g: self.g + (to.g - self.g) * k,
            b: self.b + (to.b - self.b) * k,
            a: self.a + (to.a - self.a) * k,
        }
    }

    /// Apply `f(dc, sc)` to each color channel; alpha is given directly.
    #[inline]
    fn zip(d: Premul, s: Premul, f: impl Fn(f64, f64) -> f64, a: f64) -> Self {
        Self {
            r: f(d.r, s.r),
            g: f(d.g, s.g),
            b: f(d.b, s.b),
            a,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RED: [u8; 4] = [255, 0, 0, 255];
    const BLUE: [u8; 4] = [0, 0, 255, 255];
    const HALF_GREEN: [u8; 4] = [0, 128, 0, 128];

    fn assert_px(actual: [u8; 4], expected: [u8; 4]) {
        for i in 0..4 {
            assert!(
                (actual[i] as i32 - expected[i] as i32).abs() <= 1,
                "expected {:?}, got {:?}",
                expected,
                actual
            );
        }
    }

    #[test]
    fn test_dst_is_identity() {
        for dst in [RED, HALF_GREEN, [3, 2, 1, 7], [0; 4]] {
            for cover in [1u8, 128, 255] {
                assert_eq!(CompOp::Dst.blend(dst, BLUE, cover), dst);
            }
        }
    }

    #[test]
    fn test_clear_full_cover_is_transparent() {
        assert_eq!(CompOp::Clear.blend(RED, BLUE, 255), [0; 4]);
        let half = CompOp::Clear.blend(RED, BLUE, 128);
        assert_px(half, [127, 0, 0, 127]);
    }

    #[test]
    fn test_zero_cover_is_identity_for_every_operator() {
        for op in CompOp::ALL {
            assert_eq!(op.blend(HALF_GREEN, RED, 0), HALF_GREEN, "{:?}", op);
        }
    }

    #[test]
    fn test_alpha_and_src_over_agree() {
        for cover in [64u8, 128, 255] {
            let a = CompOp::Alpha.blend(BLUE, HALF_GREEN, cover);
            let b = CompOp::SrcOver.blend(BLUE, HALF_GREEN, cover);
            assert_px(a, b);
        }
    }

    #[test]
    fn test_opaque_src_over_replaces() {
        assert_eq!(CompOp::SrcOver.blend(BLUE, RED, 255), RED);
        assert_eq!(CompOp::Alpha.blend(BLUE, RED, 255), RED);
    }

    #[test]
    fn test_src_replaces_and_lerps_by_cover() {
        assert_eq!(CompOp::Src.blend(BLUE, HALF_GREEN, 255), HALF_GREEN);
        assert_px(CompOp::Src.blend(RED, [0; 4], 128), [127, 0, 0, 127]);
    }

    #[test]
    fn test_porter_duff_on_transparent_destination() {
        let empty = [0u8; 4];
        assert_eq!(CompOp::SrcIn.blend(empty, RED, 255), empty);
        assert_eq!(CompOp::SrcOut.blend(empty, RED, 255), RED);
        assert_eq!(CompOp::SrcAtop.blend(empty, RED, 255), empty);
        assert_eq!(CompOp::DstOver.blend(empty, RED, 255), RED);
        assert_eq!(CompOp::Xor.blend(empty, RED, 255), RED);
    }

    #[test]
    fn test_dst_in_out() {
        assert_eq!(CompOp::DstIn.blend(RED, BLUE, 255), RED);
        assert_eq!(CompOp::DstOut.blend(RED, BLUE, 255), [0; 4]);
        assert_px(CompOp::DstIn.blend(RED, HALF_GREEN, 255), [128, 0, 0, 128]);
    }

    #[test]
    fn test_xor_of_opaque_layers_is_empty() {
        assert_eq!(CompOp::Xor.blend(RED, BLUE, 255), [0; 4]);
    }

    #[test]
    fn test_plus_saturates() {
        assert_eq!(CompOp::Plus.blend(RED, RED, 255), RED);
        assert_eq!(CompOp::Plus.blend(RED, BLUE, 255), [255, 0, 255, 255]);
    }

    #[test]
    fn test_multiply_and_screen() {
        let grey = [128, 128, 128, 255];
        assert_px(CompOp::Multiply.blend(grey, grey, 255), [64, 64, 64, 255]);
        assert_px(CompOp::Screen.blend(grey, grey, 255), [192, 192, 192, 255]);
        // White is the identity of Multiply, black of Screen.
        assert_px(CompOp::Multiply.blend(grey, [255; 4], 255), grey);
        assert_px(CompOp::Screen.blend(grey, [0, 0, 0, 255], 255), grey);
    }

    #[test]
    fn test_darken_lighten_difference() {
        let a = [200, 50, 100, 255];
        let b = [100, 150, 100, 255];
        assert_px(CompOp::Darken.blend(a, b, 255), [100, 50, 100, 255]);
        assert_px(CompOp::Lighten.blend(a, b, 255), [200, 150, 100, 255]);
        assert_px(CompOp::Difference.blend(a, b, 255), [100, 100, 0, 255]);
    }

    #[test]
    fn test_results_stay_premultiplied() {
        let dsts = [RED, HALF_GREEN, [10, 20, 30, 40], [0; 4], [255; 4]];
        let srcs = [BLUE, HALF_GREEN, [90, 5, 60, 90], [255; 4]];
        for op in CompOp::ALL {
            for d in dsts {
                for s in srcs {
                    for cover in [37u8, 200, 255] {
                        let out = op.blend(d, s, cover);
                        assert!(
                            out[0] <= out[3] && out[1] <= out[3] && out[2] <= out[3],
                            "{:?} {:?} {:?} {} -> {:?}",
                            op,
                            d,
                            s,
                            cover,
                            out
                        );
                    }
                }
            }
        }
    }
}
