//! Core geometry types: Offset, Size, Region.
//!
//! All coordinates are integer pixels. Screen space has its origin at the top-left
//! corner of the surface with `y` growing downward; atlas space uses the same
//! convention with the origin at the top-left texel of the canvas.

use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Offset
// ---------------------------------------------------------------------------

/// A 2D point or displacement in pixels.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    /// Create a new offset.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance to `other`.
    #[inline]
    pub fn manhattan_distance(self, other: Offset) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

impl Add for Offset {
    type Output = Offset;
    #[inline]
    fn add(self, rhs: Offset) -> Offset {
        Offset { x: self.x + rhs.x, y: self.y + rhs.y }
    }
}

impl Sub for Offset {
    type Output = Offset;
    #[inline]
    fn sub(self, rhs: Offset) -> Offset {
        Offset { x: self.x - rhs.x, y: self.y - rhs.y }
    }
}

// ---------------------------------------------------------------------------
// Size
// ---------------------------------------------------------------------------

/// A 2D size in pixels (width x height).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    /// A zero-sized size.
    pub const ZERO: Size = Size { width: 0, height: 0 };

    /// Create a new size.
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Total area in pixels. Widened so doubling canvases cannot overflow.
    #[inline]
    pub const fn area(self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Convert to a [`Region`] positioned at the origin.
    #[inline]
    pub const fn to_region(self) -> Region {
        Region { x: 0, y: 0, width: self.width, height: self.height }
    }
}

// ---------------------------------------------------------------------------
// Region
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle defined by its top-left corner and size.
///
/// Used both for widget bounds in screen space and for free/placed rectangles
/// in atlas space.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Region {
    /// An empty region at the origin.
    pub const EMPTY: Region = Region { x: 0, y: 0, width: 0, height: 0 };

    /// Create a new region.
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The right edge (exclusive): `x + width`.
    #[inline]
    pub const fn right(self) -> i32 {
        self.x + self.width
    }

    /// The bottom edge (exclusive): `y + height`.
    #[inline]
    pub const fn bottom(self) -> i32 {
        self.y + self.height
    }

    /// The top-left corner as an [`Offset`].
    #[inline]
    pub const fn offset(self) -> Offset {
        Offset { x: self.x, y: self.y }
    }

    /// The dimensions as a [`Size`].
    #[inline]
    pub const fn size(self) -> Size {
        Size { width: self.width, height: self.height }
    }

    /// Area in pixels.
    #[inline]
    pub const fn area(self) -> i64 {
        self.size().area()
    }

    /// Whether this region covers no pixels.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Whether the point (x, y) lies inside this region.
    #[inline]
    pub const fn contains(self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Whether `other` is entirely contained within this region.
    #[inline]
    pub const fn contains_region(self, other: Region) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether `other` overlaps this region (non-zero intersection area).
    #[inline]
    pub const fn overlaps(self, other: Region) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    /// Expand outward by `amount` pixels on every side.
    #[inline]
    pub const fn inflate(self, amount: i32) -> Region {
        Region {
            x: self.x - amount,
            y: self.y - amount,
            width: self.width + 2 * amount,
            height: self.height + 2 * amount,
        }
    }

    /// Merge with `other` if the two share one complete edge.
    ///
    /// Returns the bounding rectangle of the pair, which is exactly their union
    /// when the edge is shared in full.
    pub fn merge_full_edge(self, other: Region) -> Option<Region> {
        let (a, b) = (self, other);
        if a.y == b.y && a.height == b.height {
            if a.right() == b.x {
                return Some(Region::new(a.x, a.y, a.width + b.width, a.height));
            }
            if b.right() == a.x {
                return Some(Region::new(b.x, b.y, a.width + b.width, a.height));
            }
        }
        if a.x == b.x && a.width == b.width {
            if a.bottom() == b.y {
                return Some(Region::new(a.x, a.y, a.width, a.height + b.height));
            }
            if b.bottom() == a.y {
                return Some(Region::new(b.x, b.y, a.width, a.height + b.height));
            }
        }
        None
    }
}

// ===========================================================================
// Tests
// ===========================================================================
