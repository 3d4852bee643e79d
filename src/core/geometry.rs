//! Plain 2-D geometry shared by every engine component.
//!
//! Units are whatever the presentation layer uses (terminal cells for the
//! bundled front-end).  Document rects are laid out top-down with `y`
//! growing towards the end of the page.

use std::ops::{Add, Mul, Sub};

/// A point or displacement.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    pub fn distance(self, other: Vec2) -> f64 {
        (self - other).length()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x < self.right() && p.y >= self.y && p.y < self.bottom()
    }

    pub fn translate(&self, by: Vec2) -> Rect {
        Rect::new(self.x + by.x, self.y + by.y, self.width, self.height)
    }
}

/// Inclusive range of allowed offsets on both axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OffsetBounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl OffsetBounds {
    /// Offsets that keep `inner` inside `outer`.  When `inner` is larger
    /// than `outer` along an axis that axis collapses to a single value.
    pub fn keeping_inside(inner: &Rect, outer: &Rect) -> Self {
        let axis = |inner_lo: f64, inner_len: f64, outer_lo: f64, outer_len: f64| {
            let lo = outer_lo - inner_lo;
            let hi = lo + (outer_len - inner_len);
            if hi < lo {
                (lo, lo)
            } else {
                (lo, hi)
            }
        };
        let (min_x, max_x) = axis(inner.x, inner.width, outer.x, outer.width);
        let (min_y, max_y) = axis(inner.y, inner.height, outer.y, outer.height);
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    pub fn clamp(&self, p: Vec2) -> Vec2 {
        Vec2::new(p.x.clamp(self.min.x, self.max.x), p.y.clamp(self.min.y, self.max.y))
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Size of the allowed range along each axis.
    pub fn extent(&self) -> Vec2 {
        self.max - self.min
    }
}
