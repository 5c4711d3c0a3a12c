//! Edge clipping and fixed-point conversion in front of the cell store.
//!
//! World coordinates are converted to 24.8 with saturation, then each edge
//! is clipped against the clip box. Parts beyond the top or bottom are
//! dropped; parts left or right of the box are collapsed onto the box's
//! vertical edge so the winding seen by the pixels inside stays intact.

use crate::basics::{iround, saturation_iround, RectI, POLY_SUBPIXEL_SCALE};
use crate::rasterizer_cells_aa::RasterizerCellsAa;

/// Largest magnitude a 24.8 coordinate may take after conversion.
pub const POLY_MAX_COORD: i32 = (1 << 30) - 1;

const X_RIGHT: u8 = 1;
const Y_BELOW: u8 = 2;
const X_LEFT: u8 = 4;
const Y_ABOVE: u8 = 8;
const X_FLAGS: u8 = X_RIGHT | X_LEFT;
const Y_FLAGS: u8 = Y_BELOW | Y_ABOVE;

/// Convert a world coordinate to saturated 24.8 fixed point.
#[inline]
pub fn upscale(v: f64) -> i32 {
    saturation_iround(POLY_MAX_COORD, v * POLY_SUBPIXEL_SCALE as f64)
}

/// `round(a * b / c)` evaluated in floating point.
#[inline]
fn mul_div(a: i32, b: i32, c: i32) -> i32 {
    iround(a as f64 * b as f64 / c as f64)
}

#[inline]
fn clipping_flags(x: i32, y: i32, b: &RectI) -> u8 {
    clipping_flags_x(x, b) | clipping_flags_y(y, b)
}

#[inline]
fn clipping_flags_x(x: i32, b: &RectI) -> u8 {
    (if x > b.x2 { X_RIGHT } else { 0 }) | (if x < b.x1 { X_LEFT } else { 0 })
}

#[inline]
fn clipping_flags_y(y: i32, b: &RectI) -> u8 {
    (if y > b.y2 { Y_BELOW } else { 0 }) | (if y < b.y1 { Y_ABOVE } else { 0 })
}

#[derive(Debug, Clone)]
pub struct RasterizerSlClip {
    clip_box: RectI,
    x1: i32,
    y1: i32,
    f1: u8,
    clipping: bool,
}

impl RasterizerSlClip {
    pub fn new() -> Self {
        Self {
            clip_box: RectI::new(0, 0, 0, 0),
            x1: 0,
            y1: 0,
            f1: 0,
            clipping: false,
        }
    }

    pub fn reset_clipping(&mut self) {
        self.clipping = false;
    }

    /// Clip box in 24.8 units; corners may be given in any order.
    pub fn clip_box(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        self.clip_box = RectI::new(x1, y1, x2, y2);
        self.clip_box.normalize();
        self.clipping = true;
    }

    pub fn is_clipping(&self) -> bool {
        self.clipping
    }

    pub fn move_to(&mut self, x: i32, y: i32) {
        self.x1 = x;
        self.y1 = y;
        if self.clipping {
            self.f1 = clipping_flags(x, y, &self.clip_box);
        }
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        self.move_to(upscale(x), upscale(y));
    }

    pub fn line_to_d(&mut self, ras: &mut RasterizerCellsAa, x: f64, y: f64) {
        self.line_to(ras, upscale(x), upscale(y));
    }

    pub fn line_to(&mut self, ras: &mut RasterizerCellsAa, x2: i32, y2: i32) {
        if !self.clipping {
            ras.line(self.x1, self.y1, x2, y2);
            self.x1 = x2;
            self.y1 = y2;
            return;
        }

        let f2 = clipping_flags(x2, y2, &self.clip_box);
        let (x1, y1, f1) = (self.x1, self.y1, self.f1);
        self.x1 = x2;
        self.y1 = y2;
        self.f1 = f2;

        // Both ends beyond the same horizontal side.
        if f1 & Y_FLAGS == f2 & Y_FLAGS && f1 & Y_FLAGS != 0 {
            return;
        }

        let b = self.clip_box;
        let y_at = |x: i32| y1 + mul_div(x - x1, y2 - y1, x2 - x1);
        let flags_y = |y: i32| clipping_flags_y(y, &b);

        match ((f1 & X_FLAGS) << 1) | (f2 & X_FLAGS) {
            0 => self.line_clip_y(ras, x1, y1, x2, y2, f1, f2),
            // x2 right of the box
            1 => {
                let y3 = y_at(b.x2);
                let f3 = flags_y(y3);
                self.line_clip_y(ras, x1, y1, b.x2, y3, f1, f3);
                self.line_clip_y(ras, b.x2, y3, b.x2, y2, f3, f2);
            }
            // x1 right of the box
            2 => {
                let y3 = y_at(b.x2);
                let f3 = flags_y(y3);
                self.line_clip_y(ras, b.x2, y1, b.x2, y3, f1, f3);
                self.line_clip_y(ras, b.x2, y3, x2, y2, f3, f2);
            }
            3 => self.line_clip_y(ras, b.x2, y1, b.x2, y2, f1, f2),
            // x2 left of the box
            4 => {
                let y3 = y_at(b.x1);
                let f3 = flags_y(y3);
                self.line_clip_y(ras, x1, y1, b.x1, y3, f1, f3);
                self.line_clip_y(ras, b.x1, y3, b.x1, y2, f3, f2);
            }
            // x1 right, x2 left
            6 => {
                let y3 = y_at(b.x2);
                let y4 = y_at(b.x1);
                let (f3, f4) = (flags_y(y3), flags_y(y4));
                self.line_clip_y(ras, b.x2, y1, b.x2, y3, f1, f3);
                self.line_clip_y(ras, b.x2, y3, b.x1, y4, f3, f4);
                self.line_clip_y(ras, b.x1, y4, b.x1, y2, f4, f2);
            }
            // x1 left of the box
            8 => {
                let y3 = y_at(b.x1);
                let f3 = flags_y(y3);
                self.line_clip_y(ras, b.x1, y1, b.x1, y3, f1, f3);
                self.line_clip_y(ras, b.x1, y3, x2, y2, f3, f2);
            }
            // x1 left, x2 right
            9 => {
                let y3 = y_at(b.x1);
                let y4 = y_at(b.x2);
                let (f3, f4) = (flags_y(y3), flags_y(y4));
                self.line_clip_y(ras, b.x1, y1, b.x1, y3, f1, f3);
                self.line_clip_y(ras, b.x1, y3, b.x2, y4, f3, f4);
                self.line_clip_y(ras, b.x2, y4, b.x2, y2, f4, f2);
            }
            12 => self.line_clip_y(ras, b.x1, y1, b.x1, y2, f1, f2),
            // A point cannot be both left and right of the box.
            _ => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn line_clip_y(
        &self,
        ras: &mut RasterizerCellsAa,
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        f1: u8,
        f2: u8,
    ) {
        let f1 = f1 & Y_FLAGS;
        let f2 = f2 & Y_FLAGS;
        if f1 | f2 == 0 {
            ras.line(x1, y1, x2, y2);
            return;
        }
        if f1 == f2 {
            return;
        }

        let b = &self.clip_box;
        let x_at = |y: i32| x1 + mul_div(y - y1, x2 - x1, y2 - y1);
        let (mut tx1, mut ty1, mut tx2, mut ty2) = (x1, y1, x2, y2);
        if f1 & Y_ABOVE != 0 {
            tx1 = x_at(b.y1);
            ty1 = b.y1;
        }
        if f1 & Y_BELOW != 0 {
            tx1 = x_at(b.y2);
            ty1 = b.y2;
        }
        if f2 & Y_ABOVE != 0 {
            tx2 = x_at(b.y1);
            ty2 = b.y1;
        }
        if f2 & Y_BELOW != 0 {
            tx2 = x_at(b.y2);
            ty2 = b.y2;
        }
        ras.line(tx1, ty1, tx2, ty2);
    }
}

impl Default for RasterizerSlClip {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const S: i32 = POLY_SUBPIXEL_SCALE as i32;

    fn cover_sum(ras: &RasterizerCellsAa) -> i32 {
        (ras.min_y()..=ras.max_y())
            .map(|y| ras.scanline_cells(y).map(|c| c.cover).sum::<i32>())
            .sum()
    }

    #[test]
    fn test_upscale() {
        assert_eq!(upscale(0.0), 0);
        assert_eq!(upscale(1.0), S);
        assert_eq!(upscale(-1.0), -S);
        assert_eq!(upscale(10.5), 10 * S + S / 2);
    }

    #[test]
    fn test_upscale_saturates() {
        assert_eq!(upscale(1e30), POLY_MAX_COORD);
        assert_eq!(upscale(-1e30), -POLY_MAX_COORD);
    }

    #[test]
    fn test_mul_div_rounds() {
        assert_eq!(mul_div(10, 20, 5), 40);
        assert_eq!(mul_div(7, 3, 2), 11);
    }

    #[test]
    fn test_unclipped_passthrough() {
        let mut clip = RasterizerSlClip::new();
        let mut ras = RasterizerCellsAa::new();
        assert!(!clip.is_clipping());
        clip.move_to_d(0.0, 0.0);
        clip.line_to_d(&mut ras, 10.0, 10.0);
        ras.sort_cells();
        assert_eq!(cover_sum(&ras), 10 * S);
    }

    #[test]
    fn test_segment_above_box_dropped() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(0, 10 * S, 100 * S, 90 * S);
        let mut ras = RasterizerCellsAa::new();
        clip.move_to(10 * S, 0);
        clip.line_to(&mut ras, 50 * S, 5 * S);
        ras.sort_cells();
        assert_eq!(ras.total_cells(), 0);
    }

    #[test]
    fn test_segment_crossing_bottom_is_cut() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(0, 0, 100 * S, 20 * S);
        let mut ras = RasterizerCellsAa::new();
        clip.move_to(10 * S, 10 * S);
        clip.line_to(&mut ras, 10 * S, 50 * S);
        ras.sort_cells();
        assert_eq!(cover_sum(&ras), 10 * S);
        assert_eq!(ras.max_y(), 20);
    }

    #[test]
    fn test_right_overflow_collapses_to_edge() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(0, 0, 50 * S, 100 * S);
        let mut ras = RasterizerCellsAa::new();
        clip.move_to(10 * S, 10 * S);
        clip.line_to(&mut ras, 80 * S, 80 * S);
        ras.sort_cells();
        assert!(ras.max_x() <= 50);
        // The collapsed part still contributes its full dy.
        assert_eq!(cover_sum(&ras), 70 * S);
    }

    #[test]
    fn test_left_of_box_keeps_winding() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(10 * S, 0, 50 * S, 100 * S);
        let mut ras = RasterizerCellsAa::new();
        clip.move_to(0, 0);
        clip.line_to(&mut ras, 0, 30 * S);
        ras.sort_cells();
        assert_eq!(ras.min_x(), 10);
        assert_eq!(cover_sum(&ras), 30 * S);
    }

    #[test]
    fn test_reset_clipping() {
        let mut clip = RasterizerSlClip::new();
        clip.clip_box(10 * S, 10 * S, 0, 0);
        assert!(clip.is_clipping());
        clip.reset_clipping();
        assert!(!clip.is_clipping());
    }
}
