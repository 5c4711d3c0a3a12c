//! Unpacked scanline: one cover byte per pixel, indexed by `x - min_x`.

use crate::rasterizer_scanline_aa::{Scanline, ScanlineSpan};

/// Span bookkeeping shared by the scanline containers. `len < 0` marks a
/// solid run whose single cover sits at `cover_offset`.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SpanRecord {
    pub x: i32,
    pub len: i32,
    pub cover_offset: usize,
}

/// Iterator over the spans of a finalized scanline.
#[derive(Debug, Clone)]
pub struct Spans<'a> {
    records: std::slice::Iter<'a, SpanRecord>,
    covers: &'a [u8],
}

impl<'a> Spans<'a> {
    pub(crate) fn new(records: &'a [SpanRecord], covers: &'a [u8]) -> Self {
        Self {
            records: records.iter(),
            covers,
        }
    }
}

impl<'a> Iterator for Spans<'a> {
    type Item = ScanlineSpan<'a>;

    fn next(&mut self) -> Option<ScanlineSpan<'a>> {
        let r = self.records.next()?;
        let n = if r.len < 0 { 1 } else { r.len as usize };
        Some(ScanlineSpan {
            x: r.x,
            len: r.len,
            covers: &self.covers[r.cover_offset..r.cover_offset + n],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.records.size_hint()
    }
}

impl ExactSizeIterator for Spans<'_> {}

#[derive(Debug, Clone, Default)]
pub struct ScanlineU8 {
    min_x: i32,
    /// Last covered `x`, relative to `min_x`; `None` before the first cell.
    last_x: Option<i32>,
    y: i32,
    covers: Vec<u8>,
    spans: Vec<SpanRecord>,
}

impl ScanlineU8 {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, xi: i32, x: i32, len: i32) {
        let adjacent = self.last_x == Some(xi - 1);
        match self.spans.last_mut() {
            Some(span) if adjacent => span.len += len,
            _ => self.spans.push(SpanRecord {
                x,
                len,
                cover_offset: xi as usize,
            }),
        }
        self.last_x = Some(xi + len - 1);
    }
}

impl Scanline for ScanlineU8 {
    type Spans<'a> = Spans<'a>;

    fn reset(&mut self, min_x: i32, max_x: i32) {
        let max_len = (max_x - min_x + 2).max(0) as usize;
        if max_len > self.covers.len() {
            self.covers.resize(max_len, 0);
        }
        self.min_x = min_x;
        self.reset_spans();
    }

    fn reset_spans(&mut self) {
        self.last_x = None;
        self.spans.clear();
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        let xi = x - self.min_x;
        self.covers[xi as usize] = cover as u8;
        self.push(xi, x, 1);
    }

    fn add_cells(&mut self, x: i32, covers: &[u8]) {
        let xi = x - self.min_x;
        let start = xi as usize;
        self.covers[start..start + covers.len()].copy_from_slice(covers);
        self.push(xi, x, covers.len() as i32);
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        let xi = x - self.min_x;
        let start = xi as usize;
        self.covers[start..start + len as usize].fill(cover as u8);
        self.push(xi, x, len as i32);
    }

    fn finalize(&mut self, y: i32) {
        self.y = y;
    }

    fn y(&self) -> i32 {
        self.y
    }

    fn num_spans(&self) -> usize {
        self.spans.len()
    }

    fn spans(&self) -> Spans<'_> {
        Spans::new(&self.spans, &self.covers)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(sl: &ScanlineU8) -> Vec<(i32, i32, Vec<u8>)> {
        sl.spans().map(|s| (s.x, s.len, s.covers.to_vec())).collect()
    }

    #[test]
    fn test_new_is_empty() {
        let sl = ScanlineU8::new();
        assert_eq!(sl.num_spans(), 0);
        assert_eq!(sl.spans().count(), 0);
    }

    #[test]
    fn test_adjacent_cells_merge() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 100);
        sl.add_cell(11, 200);
        sl.add_cell(12, 150);
        assert_eq!(collect(&sl), vec![(10, 3, vec![100, 200, 150])]);
    }

    #[test]
    fn test_gap_starts_new_span() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cell(10, 100);
        sl.add_cell(20, 200);
        assert_eq!(sl.num_spans(), 2);
        let xs: Vec<i32> = sl.spans().map(|s| s.x).collect();
        assert_eq!(xs, vec![10, 20]);
    }

    #[test]
    fn test_cell_then_span_merge() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 100);
        sl.add_cell(5, 64);
        sl.add_span(6, 3, 255);
        sl.add_cells(9, &[10, 20]);
        assert_eq!(collect(&sl), vec![(5, 6, vec![64, 255, 255, 255, 10, 20])]);
    }

    #[test]
    fn test_negative_min_x() {
        let mut sl = ScanlineU8::new();
        sl.reset(-10, 10);
        sl.add_span(-10, 4, 7);
        sl.finalize(3);
        assert_eq!(collect(&sl), vec![(-10, 4, vec![7; 4])]);
        assert_eq!(sl.y(), 3);
    }

    #[test]
    fn test_reset_spans_clears() {
        let mut sl = ScanlineU8::new();
        sl.reset(0, 10);
        sl.add_cell(1, 1);
        sl.reset_spans();
        assert_eq!(sl.num_spans(), 0);
        sl.add_cell(2, 9);
        assert_eq!(collect(&sl), vec![(2, 1, vec![9])]);
    }
}
