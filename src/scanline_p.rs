//! Packed scanline: runs of identical cover are stored once with a
//! negative length; individually covered pixels keep one byte each.

use crate::rasterizer_scanline_aa::Scanline;
use crate::scanline_u::{SpanRecord, Spans};

#[derive(Debug, Clone, Default)]
pub struct ScanlineP8 {
    last_x: Option<i32>,
    y: i32,
    covers: Vec<u8>,
    spans: Vec<SpanRecord>,
}

impl ScanlineP8 {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last span, if it ends right before `x` and satisfies `pred`.
    fn extendable(&mut self, x: i32, pred: impl Fn(&SpanRecord) -> bool) -> Option<&mut SpanRecord> {
        if self.last_x != Some(x - 1) {
            return None;
        }
        self.spans.last_mut().filter(|s| pred(s))
    }

    fn add_cover_run(&mut self, x: i32, covers: &[u8]) {
        let offset = self.covers.len();
        self.covers.extend_from_slice(covers);
        let len = covers.len() as i32;
        if let Some(span) = self.extendable(x, |s| s.len > 0) {
            span.len += len;
        } else {
            self.spans.push(SpanRecord {
                x,
                len,
                cover_offset: offset,
            });
        }
        self.last_x = Some(x + len - 1);
    }
}

impl Scanline for ScanlineP8 {
    type Spans<'a> = Spans<'a>;

    fn reset(&mut self, min_x: i32, max_x: i32) {
        let max_len = (max_x - min_x + 3).max(0) as usize;
        self.covers.reserve(max_len);
        self.reset_spans();
    }

    fn reset_spans(&mut self) {
        self.last_x = None;
        self.covers.clear();
        self.spans.clear();
    }

    fn add_cell(&mut self, x: i32, cover: u32) {
        self.add_cover_run(x, &[cover as u8]);
    }

    fn add_cells(&mut self, x: i32, covers: &[u8]) {
        self.add_cover_run(x, covers);
    }

    fn add_span(&mut self, x: i32, len: u32, cover: u32) {
        let len = len as i32;
        let cover = cover as u8;
        let last_cover = self
            .spans
            .last()
            .filter(|s| s.len < 0)
            .map(|s| self.covers[s.cover_offset]);
        if last_cover == Some(cover) {
            if let Some(span) = self.extendable(x, |s| s.len < 0) {
                span.len -= len;
                self.last_x = Some(x + len - 1);
                return;
            }
        }
        let offset = self.covers.len();
        self.covers.push(cover);
        self.spans.push(SpanRecord {
            x,
            len: -len,
            cover_offset: offset,
        });
        self.last_x = Some(x + len - 1);
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
