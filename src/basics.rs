//! Foundation types, constants, and the vertex source abstraction.
//!
//! Everything in the pipeline depends on this module: rounding helpers,
//! the 24.8 subpixel and coverage constants, rectangles, path commands,
//! and the restartable [`VertexSource`] iterator model.

// ============================================================================
// Rounding and conversion functions
// ============================================================================

/// Round a double to the nearest integer (round half away from zero).
#[inline]
pub fn iround(v: f64) -> i32 {
    if v < 0.0 {
        (v - 0.5) as i32
    } else {
        (v + 0.5) as i32
    }
}

/// Round a double to the nearest unsigned integer (round half up).
#[inline]
pub fn uround(v: f64) -> u32 {
    (v + 0.5) as u32
}

/// Floor a double toward negative infinity.
#[inline]
pub fn ifloor(v: f64) -> i32 {
    let i = v as i32;
    i - (i as f64 > v) as i32
}

/// Ceiling of a double as an unsigned integer.
#[inline]
pub fn uceil(v: f64) -> u32 {
    v.ceil() as u32
}

/// Round `v` to int, clamping to `[-limit, limit]`.
///
/// Used wherever world coordinates become fixed point, so that geometry far
/// outside the representable range saturates instead of overflowing.
#[inline]
pub fn saturation_iround(limit: i32, v: f64) -> i32 {
    if v < -(limit as f64) {
        return -limit;
    }
    if v > limit as f64 {
        return limit;
    }
    iround(v)
}

// ============================================================================
// Cover (anti-aliasing) constants
// ============================================================================

/// The type used for anti-aliasing coverage values.
pub type CoverType = u8;

pub const COVER_SHIFT: u32 = 8;
pub const COVER_SIZE: u32 = 1 << COVER_SHIFT;
pub const COVER_MASK: u32 = COVER_SIZE - 1;
pub const COVER_NONE: CoverType = 0;
pub const COVER_FULL: CoverType = COVER_MASK as CoverType;

// ============================================================================
// Subpixel constants
// ============================================================================

/// Number of fractional bits in rasterizer coordinates.
/// With 8 fractional bits and 32-bit integers the coordinate capacity is 24 bits.
pub const POLY_SUBPIXEL_SHIFT: u32 = 8;
pub const POLY_SUBPIXEL_SCALE: u32 = 1 << POLY_SUBPIXEL_SHIFT;
pub const POLY_SUBPIXEL_MASK: u32 = POLY_SUBPIXEL_SCALE - 1;

// ============================================================================
// Filling rule
// ============================================================================

/// Filling rule for polygon rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FillingRule {
    #[default]
    NonZero,
    EvenOdd,
}

// ============================================================================
// Rect
// ============================================================================

/// A rectangle defined by two corner points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect<T: Copy> {
    pub x1: T,
    pub y1: T,
    pub x2: T,
    pub y2: T,
}

impl<T: Copy + PartialOrd> Rect<T> {
    pub fn new(x1: T, y1: T, x2: T, y2: T) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Normalize so that x1 <= x2 and y1 <= y2, swapping if needed.
    pub fn normalize(&mut self) -> &Self {
        if self.x1 > self.x2 {
            core::mem::swap(&mut self.x1, &mut self.x2);
        }
        if self.y1 > self.y2 {
            core::mem::swap(&mut self.y1, &mut self.y2);
        }
        self
    }

    /// Clip this rectangle to the intersection with `r`.
    /// Returns `true` if the result is non-empty.
    pub fn clip(&mut self, r: &Self) -> bool {
        if self.x2 > r.x2 {
            self.x2 = r.x2;
        }
        if self.y2 > r.y2 {
            self.y2 = r.y2;
        }
        if self.x1 < r.x1 {
            self.x1 = r.x1;
        }
        if self.y1 < r.y1 {
            self.y1 = r.y1;
        }
        self.is_valid()
    }

    pub fn is_valid(&self) -> bool {
        self.x1 <= self.x2 && self.y1 <= self.y2
    }

    /// Inclusive point test.
    pub fn hit_test(&self, x: T, y: T) -> bool {
        x >= self.x1 && x <= self.x2 && y >= self.y1 && y <= self.y2
    }
}

/// Rectangle with `i32` coordinates (inclusive on both ends in the renderer).
pub type RectI = Rect<i32>;
/// Rectangle with `f64` coordinates.
pub type RectD = Rect<f64>;

// ============================================================================
// Path commands
// ============================================================================

/// Command attached to every vertex a [`VertexSource`] produces.
///
/// `Curve3` / `Curve4` tag the control points and end point of quadratic and
/// cubic Béziers. `EndPoly` terminates an open sub-path, `ClosePolygon`
/// terminates a ring. `Stop` ends iteration; the coordinates that accompany
/// `Stop`, `EndPoly` and `ClosePolygon` are meaningless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathCommand {
    #[default]
    Stop,
    MoveTo,
    LineTo,
    Curve3,
    Curve4,
    EndPoly,
    ClosePolygon,
}

impl PathCommand {
    /// `true` for commands that carry a coordinate (move, line, curve points).
    #[inline]
    pub fn is_vertex(self) -> bool {
        matches!(
            self,
            PathCommand::MoveTo | PathCommand::LineTo | PathCommand::Curve3 | PathCommand::Curve4
        )
    }

    /// `true` for commands that draw from the previous vertex.
    #[inline]
    pub fn is_drawing(self) -> bool {
        matches!(
            self,
            PathCommand::LineTo | PathCommand::Curve3 | PathCommand::Curve4
        )
    }

    #[inline]
    pub fn is_stop(self) -> bool {
        self == PathCommand::Stop
    }

    #[inline]
    pub fn is_move_to(self) -> bool {
        self == PathCommand::MoveTo
    }

    #[inline]
    pub fn is_curve(self) -> bool {
        matches!(self, PathCommand::Curve3 | PathCommand::Curve4)
    }

    /// `true` for both `EndPoly` and `ClosePolygon`.
    #[inline]
    pub fn is_end_poly(self) -> bool {
        matches!(self, PathCommand::EndPoly | PathCommand::ClosePolygon)
    }

    #[inline]
    pub fn is_close(self) -> bool {
        self == PathCommand::ClosePolygon
    }

    /// `true` for commands that start a new polygon (stop, move_to, end_poly).
    #[inline]
    pub fn is_next_poly(self) -> bool {
        self.is_stop() || self.is_move_to() || self.is_end_poly()
    }
}

// ============================================================================
// Vertex
// ============================================================================

/// A vertex with coordinates and a path command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vertex {
    pub x: f64,
    pub y: f64,
    pub cmd: PathCommand,
}

impl Vertex {
    #[inline]
    pub fn new(x: f64, y: f64, cmd: PathCommand) -> Self {
        Self { x, y, cmd }
    }

    /// The terminating vertex.
    #[inline]
    pub fn stop() -> Self {
        Self::new(0.0, 0.0, PathCommand::Stop)
    }

    /// A coordinate-less command (`EndPoly`, `ClosePolygon`, `Stop`).
    #[inline]
    pub fn command(cmd: PathCommand) -> Self {
        Self::new(0.0, 0.0, cmd)
    }
}

// ============================================================================
// VertexSource
// ============================================================================

/// A restartable, finite sequence of path vertices.
///
/// `rewind` resets iteration to the start of sub-path `path_id`, after which
/// `next_vertex` yields vertices until it returns a `Stop` command. Once
/// `Stop` has been returned every further call returns `Stop` again.
/// [`VertexSource::vertices`] wraps this protocol in an ordinary iterator.
pub trait VertexSource {
    fn rewind(&mut self, path_id: u32);
    fn next_vertex(&mut self) -> Vertex;

    /// Rewind to `path_id` and iterate until `Stop`.
    fn vertices(&mut self, path_id: u32) -> Vertices<'_, Self>
    where
        Self: Sized,
    {
        self.rewind(path_id);
        Vertices {
            source: self,
            done: false,
        }
    }
}

impl<T: VertexSource + ?Sized> VertexSource for &mut T {
    fn rewind(&mut self, path_id: u32) {
        (**self).rewind(path_id);
    }

    fn next_vertex(&mut self) -> Vertex {
        (**self).next_vertex()
    }
}

/// Iterator over a rewound [`VertexSource`]; ends at (and excludes) `Stop`.
pub struct Vertices<'a, VS: ?Sized> {
    source: &'a mut VS,
    done: bool,
}

impl<VS: VertexSource + ?Sized> Iterator for Vertices<'_, VS> {
    type Item = Vertex;

    fn next(&mut self) -> Option<Vertex> {
        if self.done {
            return None;
        }
        let v = self.source.next_vertex();
        if v.cmd.is_stop() {
            self.done = true;
            return None;
        }
        Some(v)
    }
}

impl<VS: VertexSource + ?Sized> core::iter::FusedIterator for Vertices<'_, VS> {}

// ============================================================================
// Approximate equality
// ============================================================================

/// Absolute-epsilon float comparison used by transform checks.
#[inline]
pub fn is_equal_eps(v1: f64, v2: f64, epsilon: f64) -> bool {
    (v1 - v2).abs() <= epsilon
}

// ============================================================================
// Tests
// ============================================================================
