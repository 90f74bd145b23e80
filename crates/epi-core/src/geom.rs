//! Integer grid geometry: points and half-open rectangles.
//!
//! All simulation space is a discrete grid of unit cells addressed by `i32`
//! coordinates.  Rectangles are half-open on both axes: a `Rect` with origin
//! `(x, y)` and size `w × h` covers the cells `x..x+w` × `y..y+h`.  Half-open
//! extents make "regions tile the grid without overlap or gaps" a matter of
//! adjacent origins, with no ±1 bookkeeping at shared edges.

use serde::{Deserialize, Serialize};
use std::fmt;

// ── Point ─────────────────────────────────────────────────────────────────────

/// A grid cell coordinate.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Component-wise sum — one movement step when `other` is a direction.
    #[inline]
    pub fn offset(self, other: Point) -> Point {
        Point::new(self.x + other.x, self.y + other.y)
    }

    /// Manhattan (L1) distance — the metric of the infection radius.
    #[inline]
    pub fn manhattan_dist(self, other: Point) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Rect ──────────────────────────────────────────────────────────────────────

/// An axis-aligned rectangle of grid cells, half-open on both axes.
///
/// A zero-width or zero-height `Rect` is empty: it contains no point and
/// overlaps nothing.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub width:  u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(origin: Point, width: u32, height: u32) -> Self {
        Self { origin, width, height }
    }

    /// One-past-the-end corner: the smallest point (component-wise) not
    /// covered on either axis.
    #[inline]
    pub fn bottom_right(&self) -> Point {
        Point::new(
            self.origin.x + self.width as i32,
            self.origin.y + self.height as i32,
        )
    }

    #[inline]
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `p` lies inside this rectangle.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        let br = self.bottom_right();
        self.origin.x <= p.x && p.x < br.x && self.origin.y <= p.y && p.y < br.y
    }

    /// Whether `other` lies entirely inside this rectangle.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        if other.is_empty() {
            return true;
        }
        let (br, obr) = (self.bottom_right(), other.bottom_right());
        self.origin.x <= other.origin.x
            && obr.x <= br.x
            && self.origin.y <= other.origin.y
            && obr.y <= br.y
    }

    /// Whether the two rectangles share at least one cell.
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.intersection(other).is_some()
    }

    /// The common cells of two rectangles, or `None` if there are none.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x0 = self.origin.x.max(other.origin.x);
        let y0 = self.origin.y.max(other.origin.y);
        let x1 = self.bottom_right().x.min(other.bottom_right().x);
        let y1 = self.bottom_right().y.min(other.bottom_right().y);
        if x0 < x1 && y0 < y1 {
            Some(Rect::new(Point::new(x0, y0), (x1 - x0) as u32, (y1 - y0) as u32))
        } else {
            None
        }
    }

    /// Grow by `margin` cells on every side, clamped to `clamp`.
    ///
    /// This is the halo construction: a patch's padded region is its main
    /// region expanded by the padding and clamped to the world grid.
    pub fn expand(&self, margin: u32, clamp: &Rect) -> Rect {
        let m = margin as i32;
        let x0 = (self.origin.x - m).max(clamp.origin.x);
        let y0 = (self.origin.y - m).max(clamp.origin.y);
        let x1 = (self.bottom_right().x + m).min(clamp.bottom_right().x);
        let y1 = (self.bottom_right().y + m).min(clamp.bottom_right().y);
        Rect::new(Point::new(x0, y0), (x1 - x0).max(0) as u32, (y1 - y0).max(0) as u32)
    }

    /// Iterate every cell in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Point> + '_ {
        let (origin, w, h) = (self.origin, self.width as i32, self.height as i32);
        (0..h).flat_map(move |dy| (0..w).map(move |dx| Point::new(origin.x + dx, origin.y + dy)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}x{}", self.origin, self.width, self.height)
    }
}
