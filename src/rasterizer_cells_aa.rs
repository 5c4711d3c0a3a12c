//! Cell accumulation: turns 24.8 fixed-point edges into per-pixel signed
//! `cover` / `area` cells and sorts them for the scanline sweep.

use crate::basics::{POLY_SUBPIXEL_MASK, POLY_SUBPIXEL_SCALE, POLY_SUBPIXEL_SHIFT};

const SUBPIXEL_SCALE: i32 = POLY_SUBPIXEL_SCALE as i32;
const SUBPIXEL_MASK: i32 = POLY_SUBPIXEL_MASK as i32;

/// Edges wider than this (in 24.8 units) are bisected before rendering so
/// the `i64` intermediates in `render_hline` stay exact.
const DX_LIMIT: i64 = 16384 << POLY_SUBPIXEL_SHIFT;

/// Upper bound on stored cells per fill. Further cells are dropped.
pub const CELL_LIMIT: usize = 1 << 22;

/// One pixel's accumulated edge contribution.
///
/// `cover` is the summed signed `dy` crossing the pixel, `area` twice the
/// signed area of those fragments left of the pixel's right edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellAa {
    pub x: i32,
    pub y: i32,
    pub cover: i32,
    pub area: i32,
}

impl CellAa {
    const EMPTY: CellAa = CellAa {
        x: i32::MAX,
        y: i32::MAX,
        cover: 0,
        area: 0,
    };

    #[inline]
    fn is_at(&self, x: i32, y: i32) -> bool {
        self.x == x && self.y == y
    }

    #[inline]
    fn is_empty(&self) -> bool {
        self.cover == 0 && self.area == 0
    }
}

impl Default for CellAa {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SortedY {
    start: usize,
    num: usize,
}

/// Exact integer walk of `full / den` per step: yields `floor` or
/// `floor + 1` so the running sum never drifts from the true line.
/// `modulo` is the remainder left by the partial first step.
struct EdgeStep {
    lift: i32,
    rem: i64,
    modulo: i64,
    den: i64,
}

impl EdgeStep {
    fn new(full: i64, den: i64, modulo: i64) -> Self {
        Self {
            lift: full.div_euclid(den) as i32,
            rem: full.rem_euclid(den),
            modulo: modulo - den,
            den,
        }
    }

    #[inline]
    fn next(&mut self) -> i32 {
        self.modulo += self.rem;
        if self.modulo >= 0 {
            self.modulo -= self.den;
            self.lift + 1
        } else {
            self.lift
        }
    }
}

/// Cell store for one fill. Storage is kept across `reset` so repeated
/// fills reuse their allocations.
#[derive(Debug, Clone)]
pub struct RasterizerCellsAa {
    cells: Vec<CellAa>,
    sorted_cells: Vec<usize>,
    sorted_y: Vec<SortedY>,
    curr_cell: CellAa,
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
    sorted: bool,
    overflowed: bool,
}

impl RasterizerCellsAa {
    pub fn new() -> Self {
        Self {
            cells: Vec::new(),
            sorted_cells: Vec::new(),
            sorted_y: Vec::new(),
            curr_cell: CellAa::EMPTY,
            min_x: i32::MAX,
            min_y: i32::MAX,
            max_x: i32::MIN,
            max_y: i32::MIN,
            sorted: false,
            overflowed: false,
        }
    }

    pub fn reset(&mut self) {
        self.cells.clear();
        self.sorted_cells.clear();
        self.sorted_y.clear();
        self.curr_cell = CellAa::EMPTY;
        self.min_x = i32::MAX;
        self.min_y = i32::MAX;
        self.max_x = i32::MIN;
        self.max_y = i32::MIN;
        self.sorted = false;
        self.overflowed = false;
    }

    #[inline]
    pub fn min_x(&self) -> i32 {
        self.min_x
    }
    #[inline]
    pub fn min_y(&self) -> i32 {
        self.min_y
    }
    #[inline]
    pub fn max_x(&self) -> i32 {
        self.max_x
    }
    #[inline]
    pub fn max_y(&self) -> i32 {
        self.max_y
    }

    #[inline]
    pub fn total_cells(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn sorted(&self) -> bool {
        self.sorted
    }

    /// Cells of row `y` in ascending `x`. Duplicate `x` entries are still
    /// separate here; the sweep merges them. Only valid after
    /// [`sort_cells`](Self::sort_cells); rows outside the bounds are empty.
    pub fn scanline_cells(&self, y: i32) -> impl Iterator<Item = &CellAa> + '_ {
        let range = if self.sorted && y >= self.min_y && y <= self.max_y {
            let sy = self.sorted_y[(y - self.min_y) as usize];
            sy.start..sy.start + sy.num
        } else {
            0..0
        };
        self.sorted_cells[range]
            .iter()
            .map(move |&idx| &self.cells[idx])
    }

    pub fn scanline_num_cells(&self, y: i32) -> usize {
        if self.sorted && y >= self.min_y && y <= self.max_y {
            self.sorted_y[(y - self.min_y) as usize].num
        } else {
            0
        }
    }

    #[inline]
    fn add_curr_cell(&mut self) {
        if self.curr_cell.is_empty() {
            return;
        }
        if self.cells.len() >= CELL_LIMIT {
            if !self.overflowed {
                log::warn!(
                    target: "agg::raster",
                    "cell limit of {} reached, dropping further coverage",
                    CELL_LIMIT
                );
                self.overflowed = true;
            }
            return;
        }
        self.cells.push(self.curr_cell);
    }

    #[inline]
    fn set_curr_cell(&mut self, x: i32, y: i32) {
        if !self.curr_cell.is_at(x, y) {
            self.add_curr_cell();
            self.curr_cell = CellAa {
                x,
                y,
                cover: 0,
                area: 0,
            };
        }
    }

    #[inline]
    fn accumulate(&mut self, cover: i32, width2: i32) {
        self.curr_cell.cover += cover;
        self.curr_cell.area += width2 * cover;
    }

    /// Part of an edge inside pixel row `ey`. `x1`/`x2` are 24.8
    /// coordinates, `y1`/`y2` offsets within the row
    /// (`0..=POLY_SUBPIXEL_SCALE`).
    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let (ex1, ex2) = (x1 >> POLY_SUBPIXEL_SHIFT, x2 >> POLY_SUBPIXEL_SHIFT);
        let (fx1, fx2) = (x1 & SUBPIXEL_MASK, x2 & SUBPIXEL_MASK);

        if y1 == y2 {
            self.set_curr_cell(ex2, ey);
            return;
        }
        if ex1 == ex2 {
            self.accumulate(y2 - y1, fx1 + fx2);
            return;
        }

        let rise = (y2 - y1) as i64;
        let (run, first, incr, p) = if x2 < x1 {
            (x1 as i64 - x2 as i64, 0, -1, fx1 as i64 * rise)
        } else {
            (x2 as i64 - x1 as i64, SUBPIXEL_SCALE, 1, (SUBPIXEL_SCALE - fx1) as i64 * rise)
        };

        let delta = p.div_euclid(run) as i32;
        self.accumulate(delta, fx1 + first);
        let mut ex = ex1 + incr;
        self.set_curr_cell(ex, ey);
        let mut y = y1 + delta;

        if ex != ex2 {
            let mut step = EdgeStep::new(SUBPIXEL_SCALE as i64 * rise, run, p.rem_euclid(run));
            while ex != ex2 {
                let d = step.next();
                self.accumulate(d, SUBPIXEL_SCALE);
                y += d;
                ex += incr;
                self.set_curr_cell(ex, ey);
            }
        }
        self.accumulate(y2 - y, fx2 + SUBPIXEL_SCALE - first);
    }

    fn extend_bounds(&mut self, ex: i32, ey: i32) {
        self.min_x = self.min_x.min(ex);
        self.max_x = self.max_x.max(ex);
        self.min_y = self.min_y.min(ey);
        self.max_y = self.max_y.max(ey);
    }

    /// A vertical edge touches exactly one cell per row.
    fn vertical_line(&mut self, x: i32, mut ey: i32, ey2: i32, fy1: i32, fy2: i32, down: bool) {
        let two_fx = (x & SUBPIXEL_MASK) << 1;
        let (first, incr) = if down { (SUBPIXEL_SCALE, 1) } else { (0, -1) };
        let ex = x >> POLY_SUBPIXEL_SHIFT;

        self.accumulate(first - fy1, two_fx);
        ey += incr;
        self.set_curr_cell(ex, ey);

        let full = first + first - SUBPIXEL_SCALE;
        while ey != ey2 {
            self.accumulate(full, two_fx);
            ey += incr;
            self.set_curr_cell(ex, ey);
        }
        self.accumulate(fy2 - SUBPIXEL_SCALE + first, two_fx);
    }

    /// Accumulate the edge `(x1,y1) -> (x2,y2)` in 24.8 fixed point.
    pub fn line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 as i64 - x1 as i64;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = ((x1 as i64 + x2 as i64) >> 1) as i32;
            let cy = ((y1 as i64 + y2 as i64) >> 1) as i32;
            self.line(x1, y1, cx, cy);
            self.line(cx, cy, x2, y2);
            return;
        }

        let dy = y2 as i64 - y1 as i64;
        let (ex1, ex2) = (x1 >> POLY_SUBPIXEL_SHIFT, x2 >> POLY_SUBPIXEL_SHIFT);
        let (mut ey, ey2) = (y1 >> POLY_SUBPIXEL_SHIFT, y2 >> POLY_SUBPIXEL_SHIFT);
        let (fy1, fy2) = (y1 & SUBPIXEL_MASK, y2 & SUBPIXEL_MASK);

        self.extend_bounds(ex1, ey);
        self.extend_bounds(ex2, ey2);
        self.set_curr_cell(ex1, ey);

        if ey == ey2 {
            self.render_hline(ey, x1, fy1, x2, fy2);
            return;
        }
        if dx == 0 {
            self.vertical_line(x1, ey, ey2, fy1, fy2, dy > 0);
            return;
        }

        // Split at every row boundary the edge crosses.
        let (span, first, incr, p) = if dy < 0 {
            (-dy, 0, -1, fy1 as i64 * dx)
        } else {
            (dy, SUBPIXEL_SCALE, 1, (SUBPIXEL_SCALE - fy1) as i64 * dx)
        };

        let mut x_from = x1 + p.div_euclid(span) as i32;
        self.render_hline(ey, x1, fy1, x_from, first);
        ey += incr;
        self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey);

        if ey != ey2 {
            let mut step = EdgeStep::new(SUBPIXEL_SCALE as i64 * dx, span, p.rem_euclid(span));
            while ey != ey2 {
                let x_to = x_from + step.next();
                self.render_hline(ey, x_from, SUBPIXEL_SCALE - first, x_to, first);
                x_from = x_to;
                ey += incr;
                self.set_curr_cell(x_from >> POLY_SUBPIXEL_SHIFT, ey);
            }
        }
        self.render_hline(ey, x_from, SUBPIXEL_SCALE - first, x2, fy2);
    }

    /// Flush the pending cell and order everything by `(y, x)`: a
    /// y-histogram buckets cell indices per row, then each row is sorted by
    /// `x`. Idempotent until the next `line`/`reset`.
    pub fn sort_cells(&mut self) {
        if self.sorted {
            return;
        }

        self.add_curr_cell();
        self.curr_cell = CellAa::EMPTY;

        if self.cells.is_empty() {
            return;
        }

        let rows = (self.max_y - self.min_y + 1) as usize;
        self.sorted_y.clear();
        self.sorted_y.resize(rows, SortedY::default());
        self.sorted_cells.clear();
        self.sorted_cells.resize(self.cells.len(), 0);

        for cell in &self.cells {
            self.sorted_y[(cell.y - self.min_y) as usize].start += 1;
        }

        let mut start = 0;
        for sy in &mut self.sorted_y {
            let count = sy.start;
            sy.start = start;
            start += count;
        }

        for (i, cell) in self.cells.iter().enumerate() {
            let sy = &mut self.sorted_y[(cell.y - self.min_y) as usize];
            self.sorted_cells[sy.start + sy.num] = i;
            sy.num += 1;
        }

        let cells = &self.cells;
        for sy in &self.sorted_y {
            if sy.num > 1 {
                self.sorted_cells[sy.start..sy.start + sy.num]
                    .sort_unstable_by_key(|&idx| cells[idx].x);
            }
        }

        self.sorted = true;
    }
}

impl Default for RasterizerCellsAa {
    fn default() -> Self {
        Self::new()
    }
}
