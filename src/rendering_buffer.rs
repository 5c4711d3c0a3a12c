//! Row access to caller-owned RGBA pixel memory.
//!
//! Both buffers are row-major with 4 bytes per pixel and a stride of at
//! least `width * 4`. Bytes past `width * 4` in a row are padding; row
//! accessors never expose them.

use crate::error::{Error, Result};

/// Bytes per pixel for every buffer in this crate.
pub const PIX_WIDTH: usize = 4;

/// Validate a buffer layout and return the byte length one row exposes.
fn check_layout(len: usize, width: u32, height: u32, stride: usize) -> Result<usize> {
    let row_bytes = (width as usize)
        .checked_mul(PIX_WIDTH)
        .ok_or(Error::InvalidDimensions { width, height })?;
    if stride < row_bytes {
        return Err(Error::InvalidStride {
            stride,
            min: row_bytes,
        });
    }
    let required = stride
        .checked_mul(height as usize - 1)
        .and_then(|n| n.checked_add(row_bytes))
        .ok_or(Error::InvalidDimensions { width, height })?;
    if len < required {
        return Err(Error::BufferTooSmall { len, required });
    }
    Ok(row_bytes)
}

// ============================================================================
// RenderingBuffer
// ============================================================================

/// Mutable view of the destination surface.
#[derive(Debug)]
pub struct RenderingBuffer<'a> {
    buf: &'a mut [u8],
    width: u32,
    height: u32,
    stride: usize,
    row_bytes: usize,
}

impl<'a> RenderingBuffer<'a> {
    pub fn new(buf: &'a mut [u8], width: u32, height: u32, stride: usize) -> Result<Self> {
        if width == 0 || height == 0 || width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let row_bytes = check_layout(buf.len(), width, height, stride)?;
        Ok(Self {
            buf,
            width,
            height,
            stride,
            row_bytes,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Pixel bytes of row `y` (no padding). `y` must be below `height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride;
        &self.buf[start..start + self.row_bytes]
    }

    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [u8] {
        let start = y as usize * self.stride;
        &mut self.buf[start..start + self.row_bytes]
    }

    /// Read-only view of the same memory.
    pub fn as_view(&self) -> ImageView<'_> {
        ImageView {
            buf: self.buf,
            width: self.width,
            height: self.height,
            stride: self.stride,
            row_bytes: self.row_bytes,
        }
    }
}

// ============================================================================
// ImageView
// ============================================================================

/// Read-only RGBA image used as a texture source.
#[derive(Debug, Clone, Copy)]
pub struct ImageView<'a> {
    buf: &'a [u8],
    width: u32,
    height: u32,
    stride: usize,
    row_bytes: usize,
}

impl<'a> ImageView<'a> {
    pub fn new(buf: &'a [u8], width: u32, height: u32, stride: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::EmptyImage);
        }
        if width > i32::MAX as u32 || height > i32::MAX as u32 {
            return Err(Error::InvalidDimensions { width, height });
        }
        let row_bytes = check_layout(buf.len(), width, height, stride)?;
        Ok(Self {
            buf,
            width,
            height,
            stride,
            row_bytes,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    #[inline]
    pub fn row(&self, y: u32) -> &'a [u8] {
        let start = y as usize * self.stride;
        &self.buf[start..start + self.row_bytes]
    }

    /// The `width × height` window whose top-left texel is `(x, y)`. The
    /// window must lie inside the image.
    pub fn sub_view(&self, x: u32, y: u32, width: u32, height: u32) -> Result<ImageView<'a>> {
        let fits = |o: u32, len: u32, max: u32| o.checked_add(len).is_some_and(|e| e <= max);
        if !fits(x, width, self.width) || !fits(y, height, self.height) {
            return Err(Error::InvalidDimensions { width, height });
        }
        let off = y as usize * self.stride + x as usize * PIX_WIDTH;
        ImageView::new(&self.buf[off..], width, height, self.stride)
    }

    /// Texel at `(x, y)`; both must be in range.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let off = y as usize * self.stride + x as usize * PIX_WIDTH;
        [
            self.buf[off],
            self.buf[off + 1],
            self.buf[off + 2],
            self.buf[off + 3],
        ]
    }
}

// ============================================================================
// Tests
// ============================================================================
