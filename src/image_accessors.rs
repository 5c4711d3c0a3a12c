//! Texel access for image span generators.
//!
//! Reads walk a window of the source: `span` positions the cursor, `next_x`
//! steps right and `next_y` moves to the start of the next row. Anything
//! outside the image reads as the background, which defaults to fully
//! transparent, so resampled edges fade out instead of smearing edge texels.

use crate::rendering_buffer::ImageView;

/// Bounds-checked accessor over an [`ImageView`].
#[derive(Debug, Clone, Copy)]
pub struct ImageAccessorClip<'a> {
    image: ImageView<'a>,
    background: [u8; 4],
    x: i32,
    x0: i32,
    y: i32,
}

impl<'a> ImageAccessorClip<'a> {
    pub fn new(image: ImageView<'a>) -> Self {
        Self {
            image,
            background: [0; 4],
            x: 0,
            x0: 0,
            y: 0,
        }
    }

    pub fn image(&self) -> &ImageView<'a> {
        &self.image
    }

    pub fn set_background(&mut self, rgba: [u8; 4]) {
        self.background = rgba;
    }

    pub fn background(&self) -> [u8; 4] {
        self.background
    }

    /// Texel at `(x, y)`, or the background outside the image.
    #[inline]
    pub fn texel(&self, x: i32, y: i32) -> [u8; 4] {
        if x < 0 || y < 0 || x >= self.image.width() as i32 || y >= self.image.height() as i32 {
            self.background
        } else {
            self.image.pixel(x as u32, y as u32)
        }
    }

    /// Start a run at `(x, y)` and return its first texel.
    #[inline]
    pub fn span(&mut self, x: i32, y: i32) -> [u8; 4] {
        self.x = x;
        self.x0 = x;
        self.y = y;
        self.texel(x, y)
    }

    #[inline]
    pub fn next_x(&mut self) -> [u8; 4] {
        self.x = self.x.saturating_add(1);
        self.texel(self.x, self.y)
    }

    #[inline]
    pub fn next_y(&mut self) -> [u8; 4] {
        self.y = self.y.saturating_add(1);
        self.x = self.x0;
        self.texel(self.x, self.y)
    }
}
