//! Core geometry types
//!
//! Coordinates are stored as [`Fp`], a plain `f32` that stays compatible
//! with hosts that hand coordinates over as fixed-point values.

/// Numeric type used for every canvas coordinate
pub type Fp = f32;

// ─────────────────────────────────────────────────────────────────────────────
// Point
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: Fp,
    pub y: Fp,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: Fp, y: Fp) -> Self {
        Self { x, y }
    }

    /// Offset this point by another point's coordinates
    pub fn offset(self, by: Point) -> Self {
        Self::new(self.x + by.x, self.y + by.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(Fp, Fp)> for Point {
    fn from((x, y): (Fp, Fp)) -> Self {
        Self::new(x, y)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Size
// ─────────────────────────────────────────────────────────────────────────────

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: Fp,
    pub height: Fp,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: Fp, height: Fp) -> Self {
        Self { width, height }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Rect
// ─────────────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: Fp, y: Fp, width: Fp, height: Fp) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn x(&self) -> Fp {
        self.origin.x
    }

    pub fn y(&self) -> Fp {
        self.origin.y
    }

    pub fn width(&self) -> Fp {
        self.size.width
    }

    pub fn height(&self) -> Fp {
        self.size.height
    }

    /// Translate the rectangle without changing its size
    pub fn offset(self, by: Point) -> Self {
        Self::from_origin_size(self.origin.offset(by), self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_offset() {
        let p = Point::new(1.0, 2.0).offset(Point::new(10.0, 20.0));
        assert_eq!(p, Point::new(11.0, 22.0));
    }

    #[test]
    fn test_rect_offset_keeps_size() {
        let r = Rect::new(5.0, 5.0, 40.0, 30.0).offset(Point::new(-5.0, 1.0));
        assert_eq!(r, Rect::new(0.0, 6.0, 40.0, 30.0));
    }

    #[test]
    fn test_point_finite() {
        assert!(Point::new(0.0, -3.5).is_finite());
        assert!(!Point::new(Fp::NAN, 0.0).is_finite());
        assert!(!Point::new(0.0, Fp::INFINITY).is_finite());
    }
}
