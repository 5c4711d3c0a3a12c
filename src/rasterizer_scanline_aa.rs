//! Anti-aliased polygon rasterizer.
//!
//! Accepts contours (`move_to`/`line_to`/`close_polygon` or whole vertex
//! sources), clips and accumulates them into cells, then sweeps the cells
//! row by row into a [`Scanline`] as 8-bit coverage.
//!
//! Coverage is raw (no gamma); cover shaping happens in the pixel format.

use crate::basics::{FillingRule, PathCommand, VertexSource, POLY_SUBPIXEL_SHIFT};
use crate::rasterizer_cells_aa::RasterizerCellsAa;
use crate::rasterizer_sl_clip::{upscale, RasterizerSlClip};

const AA_SHIFT: u32 = 8;
const AA_SCALE: i32 = 1 << AA_SHIFT;
const AA_MASK: i32 = AA_SCALE - 1;
const AA_SCALE2: i32 = AA_SCALE * 2;
const AA_MASK2: i32 = AA_SCALE2 - 1;

// ============================================================================
// Scanline
// ============================================================================

/// One horizontal run of a scanline.
///
/// `len > 0`: `covers` holds one value per pixel. `len < 0`: a solid run of
/// `-len` pixels sharing `covers[0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanlineSpan<'a> {
    pub x: i32,
    pub len: i32,
    pub covers: &'a [u8],
}

impl ScanlineSpan<'_> {
    #[inline]
    pub fn is_solid(&self) -> bool {
        self.len < 0
    }

    /// Number of pixels covered.
    #[inline]
    pub fn pixel_len(&self) -> i32 {
        self.len.abs()
    }

    /// Cover of the `i`-th pixel of the run.
    #[inline]
    pub fn cover(&self, i: usize) -> u8 {
        if self.len < 0 {
            self.covers[0]
        } else {
            self.covers[i]
        }
    }
}

/// Coverage container filled by the rasterizer sweep and read by the
/// scanline renderers.
///
/// Between `reset_spans` and `finalize` calls arrive in strictly increasing,
/// non-overlapping `x`.
pub trait Scanline {
    type Spans<'a>: Iterator<Item = ScanlineSpan<'a>>
    where
        Self: 'a;

    /// Size internal buffers for cells in `min_x..=max_x`.
    fn reset(&mut self, min_x: i32, max_x: i32);
    fn reset_spans(&mut self);
    fn add_cell(&mut self, x: i32, cover: u32);
    fn add_cells(&mut self, x: i32, covers: &[u8]);
    fn add_span(&mut self, x: i32, len: u32, cover: u32);
    fn finalize(&mut self, y: i32);
    fn y(&self) -> i32;
    fn num_spans(&self) -> usize;
    fn spans(&self) -> Self::Spans<'_>;
}

/// Scanline that only records whether one `x` is covered.
struct ScanlineHitTest {
    x: i32,
    hit: bool,
}

impl Scanline for ScanlineHitTest {
    type Spans<'a> = std::iter::Empty<ScanlineSpan<'a>>;

    fn reset(&mut self, _min_x: i32, _max_x: i32) {}

    fn reset_spans(&mut self) {}

    fn add_cell(&mut self, x: i32, _cover: u32) {
        self.hit |= x == self.x;
    }

    fn add_cells(&mut self, x: i32, covers: &[u8]) {
        self.hit |= self.x >= x && self.x < x + covers.len() as i32;
    }

    fn add_span(&mut self, x: i32, len: u32, _cover: u32) {
        self.hit |= self.x >= x && self.x < x + len as i32;
    }

    fn finalize(&mut self, _y: i32) {}

    fn y(&self) -> i32 {
        0
    }

    // Always one, so a sweep stops after the requested row.
    fn num_spans(&self) -> usize {
        1
    }

    fn spans(&self) -> Self::Spans<'_> {
        std::iter::empty()
    }
}

// ============================================================================
// RasterizerScanlineAa
// ============================================================================

/// Map accumulated `area` to an 8-bit alpha under `rule`.
///
/// Even-odd folds the magnitude modulo 512 and reflects it at 256, so odd
/// winding numbers are opaque and even ones transparent.
#[inline]
pub fn calculate_alpha(rule: FillingRule, area: i32) -> u32 {
    let mut cover = (area >> (POLY_SUBPIXEL_SHIFT * 2 + 1 - AA_SHIFT)).abs();
    if rule == FillingRule::EvenOdd {
        cover &= AA_MASK2;
        if cover > AA_SCALE {
            cover = AA_SCALE2 - cover;
        }
    }
    cover.min(AA_MASK) as u32
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Status {
    Initial,
    MoveTo,
    LineTo,
    Closed,
}

/// Build contours, then `rewind_scanlines` and repeat `sweep_scanline`
/// until it returns `false`. Adding geometry after a sweep started
/// discards the previous shape.
#[derive(Debug, Clone)]
pub struct RasterizerScanlineAa {
    outline: RasterizerCellsAa,
    clipper: RasterizerSlClip,
    filling_rule: FillingRule,
    auto_close: bool,
    start_x: i32,
    start_y: i32,
    status: Status,
    scan_y: i32,
}

impl RasterizerScanlineAa {
    pub fn new() -> Self {
        Self {
            outline: RasterizerCellsAa::new(),
            clipper: RasterizerSlClip::new(),
            filling_rule: FillingRule::NonZero,
            auto_close: true,
            start_x: 0,
            start_y: 0,
            status: Status::Initial,
            scan_y: 0,
        }
    }

    /// Drop all accumulated geometry. Clip box and fill rule persist.
    pub fn reset(&mut self) {
        self.outline.reset();
        self.status = Status::Initial;
    }

    pub fn filling_rule(&mut self, rule: FillingRule) {
        self.filling_rule = rule;
    }

    pub fn get_filling_rule(&self) -> FillingRule {
        self.filling_rule
    }

    /// Close open contours implicitly on `move_to` and before sweeping.
    pub fn auto_close(&mut self, flag: bool) {
        self.auto_close = flag;
    }

    /// Clip box in pixel units. Resets accumulated geometry.
    pub fn clip_box(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.reset();
        self.clipper
            .clip_box(upscale(x1), upscale(y1), upscale(x2), upscale(y2));
    }

    pub fn reset_clipping(&mut self) {
        self.reset();
        self.clipper.reset_clipping();
    }

    pub fn close_polygon(&mut self) {
        if self.status == Status::LineTo {
            self.clipper
                .line_to(&mut self.outline, self.start_x, self.start_y);
            self.status = Status::Closed;
        }
    }

    /// Start a contour at a 24.8 fixed-point position.
    pub fn move_to(&mut self, x: i32, y: i32) {
        if self.outline.sorted() {
            self.reset();
        }
        if self.auto_close {
            self.close_polygon();
        }
        self.start_x = x;
        self.start_y = y;
        self.clipper.move_to(x, y);
        self.status = Status::MoveTo;
    }

    pub fn line_to(&mut self, x: i32, y: i32) {
        self.clipper.line_to(&mut self.outline, x, y);
        self.status = Status::LineTo;
    }

    pub fn move_to_d(&mut self, x: f64, y: f64) {
        self.move_to(upscale(x), upscale(y));
    }

    pub fn line_to_d(&mut self, x: f64, y: f64) {
        self.line_to(upscale(x), upscale(y));
    }

    pub fn add_vertex(&mut self, x: f64, y: f64, cmd: PathCommand) {
        if cmd.is_move_to() {
            self.move_to_d(x, y);
        } else if cmd.is_vertex() {
            self.line_to_d(x, y);
        } else if cmd.is_close() {
            self.close_polygon();
        }
    }

    /// A single edge in 24.8 fixed point, independent of the open contour.
    pub fn edge(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        if self.outline.sorted() {
            self.reset();
        }
        self.clipper.move_to(x1, y1);
        self.clipper.line_to(&mut self.outline, x2, y2);
        self.status = Status::MoveTo;
    }

    pub fn edge_d(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.edge(upscale(x1), upscale(y1), upscale(x2), upscale(y2));
    }

    /// Rewind `vs` to `path_id` and consume it until `Stop`.
    pub fn add_path<VS: VertexSource + ?Sized>(&mut self, vs: &mut VS, path_id: u32) {
        vs.rewind(path_id);
        if self.outline.sorted() {
            self.reset();
        }
        loop {
            let v = vs.next_vertex();
            if v.cmd.is_stop() {
                break;
            }
            self.add_vertex(v.x, v.y, v.cmd);
        }
    }

    pub fn min_x(&self) -> i32 {
        self.outline.min_x()
    }
    pub fn min_y(&self) -> i32 {
        self.outline.min_y()
    }
    pub fn max_x(&self) -> i32 {
        self.outline.max_x()
    }
    pub fn max_y(&self) -> i32 {
        self.outline.max_y()
    }

    fn sort(&mut self) {
        if self.auto_close {
            self.close_polygon();
        }
        self.outline.sort_cells();
    }

    /// Sort the cells and position the sweep at the first row. `false`
    /// when nothing was accumulated.
    pub fn rewind_scanlines(&mut self) -> bool {
        self.sort();
        if self.outline.total_cells() == 0 {
            return false;
        }
        self.scan_y = self.outline.min_y();
        true
    }

    /// Position the sweep at row `y`.
    pub fn navigate_scanline(&mut self, y: i32) -> bool {
        self.sort();
        if self.outline.total_cells() == 0 || y < self.outline.min_y() || y > self.outline.max_y()
        {
            return false;
        }
        self.scan_y = y;
        true
    }

    #[inline]
    pub fn calculate_alpha(&self, area: i32) -> u32 {
        calculate_alpha(self.filling_rule, area)
    }

    /// Emit the next non-empty row into `sl`. Cells sharing an `x` are
    /// merged; the running cover fills the gap up to the next cell.
    pub fn sweep_scanline<SL: Scanline>(&mut self, sl: &mut SL) -> bool {
        let rule = self.filling_rule;
        loop {
            if self.scan_y > self.outline.max_y() {
                return false;
            }
            sl.reset_spans();

            let mut cells = self.outline.scanline_cells(self.scan_y).peekable();
            let mut cover = 0;
            while let Some(cell) = cells.next() {
                let mut x = cell.x;
                let mut area = cell.area;
                cover += cell.cover;
                while let Some(same) = cells.next_if(|c| c.x == x) {
                    area += same.area;
                    cover += same.cover;
                }

                if area != 0 {
                    let alpha = calculate_alpha(rule, (cover << (POLY_SUBPIXEL_SHIFT + 1)) - area);
                    if alpha != 0 {
                        sl.add_cell(x, alpha);
                    }
                    x += 1;
                }

                if let Some(next) = cells.peek() {
                    if next.x > x {
                        let alpha = calculate_alpha(rule, cover << (POLY_SUBPIXEL_SHIFT + 1));
                        if alpha != 0 {
                            sl.add_span(x, (next.x - x) as u32, alpha);
                        }
                    }
                }
            }

            if sl.num_spans() > 0 {
                break;
            }
            self.scan_y += 1;
        }

        sl.finalize(self.scan_y);
        self.scan_y += 1;
        true
    }

    /// Whether pixel `(tx, ty)` receives non-zero coverage.
    pub fn hit_test(&mut self, tx: i32, ty: i32) -> bool {
        if !self.navigate_scanline(ty) {
            return false;
        }
        let mut sl = ScanlineHitTest { x: tx, hit: false };
        self.sweep_scanline(&mut sl);
        sl.hit
    }
}

impl Default for RasterizerScanlineAa {
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
    use crate::path_storage::PathStorage;
    use crate::scanline_u::ScanlineU8;

    /// Coverage grid `w x h` produced by sweeping `ras`.
    fn coverage(ras: &mut RasterizerScanlineAa, w: usize, h: usize) -> Vec<Vec<u8>> {
        let mut grid = vec![vec![0u8; w]; h];
        if !ras.rewind_scanlines() {
            return grid;
        }
        let mut sl = ScanlineU8::new();
        sl.reset(ras.min_x(), ras.max_x());
        while ras.sweep_scanline(&mut sl) {
            let y = sl.y() as usize;
            for span in sl.spans() {
                for i in 0..span.pixel_len() as usize {
                    let x = span.x as usize + i;
                    if x < w && y < h {
                        grid[y][x] = span.cover(i);
                    }
                }
            }
        }
        grid
    }

    fn square(ras: &mut RasterizerScanlineAa, x1: f64, y1: f64, x2: f64, y2: f64) {
        ras.move_to_d(x1, y1);
        ras.line_to_d(x2, y1);
        ras.line_to_d(x2, y2);
        ras.line_to_d(x1, y2);
        ras.close_polygon();
    }

    #[test]
    fn test_calculate_alpha_non_zero() {
        assert_eq!(calculate_alpha(FillingRule::NonZero, 0), 0);
        assert_eq!(calculate_alpha(FillingRule::NonZero, 256 << 9), 255);
        assert_eq!(calculate_alpha(FillingRule::NonZero, -(128 << 9)), 128);
        assert_eq!(calculate_alpha(FillingRule::NonZero, 512 << 9), 255);
    }

    #[test]
    fn test_calculate_alpha_even_odd_folds() {
        assert_eq!(calculate_alpha(FillingRule::EvenOdd, 256 << 9), 255);
        assert_eq!(calculate_alpha(FillingRule::EvenOdd, 512 << 9), 0);
        assert_eq!(calculate_alpha(FillingRule::EvenOdd, 384 << 9), 128);
        assert_eq!(calculate_alpha(FillingRule::EvenOdd, 768 << 9), 255);
    }

    #[test]
    fn test_empty_rasterizer_has_no_scanlines() {
        let mut ras = RasterizerScanlineAa::new();
        assert!(!ras.rewind_scanlines());
    }

    #[test]
    fn test_move_to_only_has_no_scanlines() {
        let mut ras = RasterizerScanlineAa::new();
        ras.move_to_d(10.0, 10.0);
        assert!(!ras.rewind_scanlines());
    }

    #[test]
    fn test_pixel_aligned_square_is_opaque_inside() {
        let mut ras = RasterizerScanlineAa::new();
        square(&mut ras, 2.0, 2.0, 8.0, 8.0);
        let grid = coverage(&mut ras, 10, 10);
        for (y, row) in grid.iter().enumerate() {
            for (x, &c) in row.iter().enumerate() {
                let inside = (2..8).contains(&x) && (2..8).contains(&y);
                assert_eq!(c, if inside { 255 } else { 0 }, "pixel ({}, {})", x, y);
            }
        }
    }

    #[test]
    fn test_half_pixel_edge_gives_half_cover() {
        let mut ras = RasterizerScanlineAa::new();
        square(&mut ras, 1.5, 0.0, 4.0, 2.0);
        let grid = coverage(&mut ras, 5, 2);
        assert_eq!(grid[0][1], 128);
        assert_eq!(grid[0][2], 255);
    }

    #[test]
    fn test_winding_direction_is_irrelevant() {
        let mut cw = RasterizerScanlineAa::new();
        square(&mut cw, 1.0, 1.0, 5.0, 5.0);
        let mut ccw = RasterizerScanlineAa::new();
        square(&mut ccw, 5.0, 5.0, 1.0, 1.0);
        assert_eq!(coverage(&mut cw, 6, 6), coverage(&mut ccw, 6, 6));
    }

    #[test]
    fn test_even_odd_hole_in_overlap() {
        let mut ras = RasterizerScanlineAa::new();
        ras.filling_rule(FillingRule::EvenOdd);
        square(&mut ras, 0.0, 0.0, 10.0, 10.0);
        square(&mut ras, 2.0, 2.0, 8.0, 8.0);
        let grid = coverage(&mut ras, 10, 10);
        assert_eq!(grid[5][5], 0);
        assert_eq!(grid[1][1], 255);

        ras.reset();
        ras.filling_rule(FillingRule::NonZero);
        square(&mut ras, 0.0, 0.0, 10.0, 10.0);
        square(&mut ras, 2.0, 2.0, 8.0, 8.0);
        let grid = coverage(&mut ras, 10, 10);
        assert_eq!(grid[5][5], 255);
    }

    #[test]
    fn test_add_path_auto_closes() {
        let mut path = PathStorage::new();
        path.move_to(0.0, 0.0);
        path.line_to(4.0, 0.0);
        path.line_to(4.0, 4.0);
        path.line_to(0.0, 4.0);
        let mut ras = RasterizerScanlineAa::new();
        ras.add_path(&mut path, 0);
        let grid = coverage(&mut ras, 4, 4);
        assert!(grid.iter().flatten().all(|&c| c == 255));
    }

    #[test]
    fn test_clip_box_limits_coverage() {
        let mut ras = RasterizerScanlineAa::new();
        ras.clip_box(0.0, 0.0, 5.0, 5.0);
        square(&mut ras, 2.0, 2.0, 20.0, 20.0);
        let grid = coverage(&mut ras, 20, 20);
        assert_eq!(grid[3][3], 255);
        assert_eq!(grid[3][10], 0);
        assert_eq!(grid[10][3], 0);
        assert!(ras.max_x() <= 5);
    }

    #[test]
    fn test_far_geometry_saturates_without_panic() {
        let mut ras = RasterizerScanlineAa::new();
        ras.clip_box(0.0, 0.0, 10.0, 10.0);
        square(&mut ras, -1e12, -1e12, 1e12, 1e12);
        let grid = coverage(&mut ras, 10, 10);
        assert_eq!(grid[5][5], 255);
    }

    #[test]
    fn test_hit_test() {
        let mut ras = RasterizerScanlineAa::new();
        square(&mut ras, 10.0, 10.0, 20.0, 20.0);
        assert!(ras.hit_test(15, 15));
        assert!(!ras.hit_test(5, 15));
        assert!(!ras.hit_test(15, 25));
    }

    #[test]
    fn test_navigate_scanline() {
        let mut ras = RasterizerScanlineAa::new();
        square(&mut ras, 0.0, 0.0, 4.0, 6.0);
        assert!(ras.navigate_scanline(3));
        let mut sl = ScanlineU8::new();
        sl.reset(ras.min_x(), ras.max_x());
        assert!(ras.sweep_scanline(&mut sl));
        assert_eq!(sl.y(), 3);
        assert!(!ras.navigate_scanline(40));
    }

    #[test]
    fn test_new_geometry_after_sweep_resets() {
        let mut ras = RasterizerScanlineAa::new();
        square(&mut ras, 0.0, 0.0, 2.0, 2.0);
        assert!(ras.rewind_scanlines());
        square(&mut ras, 5.0, 5.0, 7.0, 7.0);
        assert!(ras.rewind_scanlines());
        assert_eq!(ras.min_x(), 5);
    }
}
