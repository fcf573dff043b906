//! Screen-space geometry primitives.
//!
//! Coordinates use a top-left origin with y growing downward.

use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self { Point { x, y } }

    pub fn distance_squared(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size { width: 0.0, height: 0.0 };

    pub const fn new(width: f64, height: f64) -> Self { Size { width, height } }

    pub fn scaled(&self, factor: f64) -> Self {
        Size::new(self.width * factor, self.height * factor)
    }

    pub fn min(&self, other: Size) -> Self {
        Size::new(self.width.min(other.width), self.height.min(other.height))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect { origin: Point::ZERO, size: Size::ZERO };

    pub const fn new(origin: Point, size: Size) -> Self { Rect { origin, size } }

    pub const fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Rect {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn min(&self) -> Point { self.origin }

    pub fn max(&self) -> Point {
        Point::new(self.origin.x + self.size.width, self.origin.y + self.size.height)
    }

    pub fn mid(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width * 0.5,
            self.origin.y + self.size.height * 0.5,
        )
    }

    pub fn top_center(&self) -> Point {
        Point::new(self.origin.x + self.size.width * 0.5, self.origin.y)
    }

    /// A rect of `size` whose top-center sits at `anchor`.
    pub fn anchored_top_center(anchor: Point, size: Size) -> Self {
        Rect::new(Point::new(anchor.x - size.width * 0.5, anchor.y), size)
    }

    /// A rect of `size` centered on `center`.
    pub fn centered_at(center: Point, size: Size) -> Self {
        Rect::new(
            Point::new(center.x - size.width * 0.5, center.y - size.height * 0.5),
            size,
        )
    }

    /// Grows the rect by `dx` on the left and right and `dy` on the top and
    /// bottom. Negative values shrink it.
    pub fn inflate(&self, dx: f64, dy: f64) -> Self {
        Rect::from_xywh(
            self.origin.x - dx,
            self.origin.y - dy,
            (self.size.width + 2.0 * dx).max(0.0),
            (self.size.height + 2.0 * dy).max(0.0),
        )
    }

    pub fn with_origin(&self, origin: Point) -> Self { Rect::new(origin, self.size) }
}

pub trait Round {
    fn round(&self) -> Self;
}

impl Round for Rect {
    fn round(&self) -> Self {
        let min_rounded = self.min().round();
        let max_rounded = self.max().round();
        Rect {
            origin: min_rounded,
            size: Size {
                width: max_rounded.x - min_rounded.x,
                height: max_rounded.y - min_rounded.y,
            },
        }
    }
}

impl Round for Point {
    fn round(&self) -> Self {
        Point { x: self.x.round(), y: self.y.round() }
    }
}

impl Round for Size {
    fn round(&self) -> Self {
        Size {
            width: self.width.round(),
            height: self.height.round(),
        }
    }
}

pub trait IsWithin {
    fn is_within(&self, how_much: f64, other: Self) -> bool;
}

impl IsWithin for Rect {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.origin.is_within(how_much, other.origin) && self.size.is_within(how_much, other.size)
    }
}

impl IsWithin for Point {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.x.is_within(how_much, other.x) && self.y.is_within(how_much, other.y)
    }
}

impl IsWithin for Size {
    fn is_within(&self, how_much: f64, other: Self) -> bool {
        self.width.is_within(how_much, other.width) && self.height.is_within(how_much, other.height)
    }
}

impl IsWithin for f64 {
    fn is_within(&self, how_much: f64, other: Self) -> bool { (self - other).abs() < how_much }
}

pub trait SameAs: IsWithin + Sized {
    fn same_as(&self, other: Self) -> bool { self.is_within(0.1, other) }
}

impl SameAs for Rect {}
impl SameAs for Point {}
impl SameAs for Size {}

pub trait RectExt {
    fn intersection(&self, other: &Self) -> Self;
    /// True when the interiors overlap. Rects that only share an edge do not
    /// intersect.
    fn intersects(&self, other: &Self) -> bool;
    fn contains(&self, point: Point) -> bool;
    fn contains_rect(&self, other: Self) -> bool;
    /// Moves the rect so it lies inside `bounds`, shrinking it first if it is
    /// larger than `bounds`.
    fn clamped_to(&self, bounds: &Self) -> Self;
}

impl RectExt for Rect {
    fn intersection(&self, other: &Self) -> Self {
        let min_x = f64::max(self.min().x, other.min().x);
        let max_x = f64::min(self.max().x, other.max().x);
        let min_y = f64::max(self.min().y, other.min().y);
        let max_y = f64::min(self.max().y, other.max().y);
        Rect {
            origin: Point::new(min_x, min_y),
            size: Size::new(f64::max(max_x - min_x, 0.), f64::max(max_y - min_y, 0.)),
        }
    }

    fn intersects(&self, other: &Self) -> bool {
        let inter = self.intersection(other);
        inter.size.width > 0.0 && inter.size.height > 0.0
    }

    fn contains(&self, point: Point) -> bool {
        (self.min().x..=self.max().x).contains(&point.x)
            && (self.min().y..=self.max().y).contains(&point.y)
    }

    fn contains_rect(&self, other: Self) -> bool {
        self.min().x <= other.min().x
            && self.min().y <= other.min().y
            && self.max().x >= other.max().x
            && self.max().y >= other.max().y
    }

    fn clamped_to(&self, bounds: &Self) -> Self {
        let size = self.size.min(bounds.size);
        let x = self.origin.x.min(bounds.max().x - size.width).max(bounds.min().x);
        let y = self.origin.y.min(bounds.max().y - size.height).max(bounds.min().y);
        Rect::new(Point::new(x, y), size)
    }
}
