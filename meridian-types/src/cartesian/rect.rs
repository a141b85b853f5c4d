use serde::{Deserialize, Serialize};

use super::Point2;

/// Axis aligned rectangle.
///
/// Bounds may be `NaN`, which marks the rectangle as unbounded on that side. Such rectangles
/// must be resolved (see [`Envelope::resolve`](crate::Envelope::resolve)) before they are used
/// for any calculations.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Minimum x coordinate.
    pub x_min: f64,
    /// Minimum y coordinate.
    pub y_min: f64,
    /// Maximum x coordinate.
    pub x_max: f64,
    /// Maximum y coordinate.
    pub y_max: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub const fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Minimum x coordinate.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Maximum x coordinate.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Minimum y coordinate.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Maximum y coordinate.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Width of the rectangle.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Height of the rectangle.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.x_min + self.x_max) / 2.0,
            (self.y_min + self.y_max) / 2.0,
        )
    }

    /// Returns true if all four bounds are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x_min.is_finite()
            && self.x_max.is_finite()
            && self.y_min.is_finite()
            && self.y_max.is_finite()
    }

    /// Returns true if the rectangle has zero or negative area.
    pub fn is_empty(&self) -> bool {
        !(self.width() > 0.0 && self.height() > 0.0)
    }

    /// Swaps bounds if some of the minimums are larger than the maximums.
    pub fn normalized(&self) -> Self {
        Self {
            x_min: self.x_min.min(self.x_max),
            x_max: self.x_min.max(self.x_max),
            y_min: self.y_min.min(self.y_max),
            y_max: self.y_min.max(self.y_max),
        }
    }

    /// Returns true if two rectangles have at least one common point.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x_max >= other.x_min
            && self.x_min <= other.x_max
            && self.y_max >= other.y_min
            && self.y_min <= other.y_max
    }

    /// Common part of two rectangles, or `None` if they do not intersect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        if !self.intersects(other) {
            return None;
        }

        Some(Self {
            x_min: self.x_min.max(other.x_min),
            y_min: self.y_min.max(other.y_min),
            x_max: self.x_max.min(other.x_max),
            y_max: self.y_max.min(other.y_max),
        })
    }

    /// Smallest rectangle that contains both `self` and `other`.
    pub fn merge(&self, other: &Rect) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Moves the rectangle along x axis.
    pub fn shift_x(&self, dx: f64) -> Self {
        Self {
            x_min: self.x_min + dx,
            x_max: self.x_max + dx,
            ..*self
        }
    }

    /// Returns true if the point is inside the rectangle or on its border.
    pub fn contains(&self, point: &Point2) -> bool {
        self.x_min <= point.x
            && self.x_max >= point.x
            && self.y_min <= point.y
            && self.y_max >= point.y
    }

    /// Corner points of the rectangle, counterclockwise starting from the minimum corner.
    pub fn into_quadrangle(self) -> [Point2; 4] {
        [
            Point2::new(self.x_min, self.y_min),
            Point2::new(self.x_max, self.y_min),
            Point2::new(self.x_max, self.y_max),
            Point2::new(self.x_min, self.y_max),
        ]
    }

    /// Bounding rectangle of a set of points. Returns `None` if the iterator is empty.
    pub fn from_points<'a>(mut points: impl Iterator<Item = &'a Point2>) -> Option<Self> {
        let first = points.next()?;
        let mut rect = Self::new(first.x, first.y, first.x, first.y);
        for p in points {
            rect.x_min = rect.x_min.min(p.x);
            rect.y_min = rect.y_min.min(p.y);
            rect.x_max = rect.x_max.max(p.x);
            rect.y_max = rect.y_max.max(p.y);
        }

        Some(rect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_overlapping_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 15.0, 5.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 0.0, 10.0, 5.0)));
        assert!(a.intersection(&Rect::new(11.0, 0.0, 12.0, 1.0)).is_none());
    }

    #[test]
    fn touching_rects_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 20.0, 10.0);
        assert!(a.intersects(&b));
        assert!(a.intersection(&b).is_some_and(|r| r.is_empty()));
    }

    #[test]
    fn nan_bounds_are_not_finite() {
        let rect = Rect::new(f64::NAN, 0.0, 1.0, 1.0);
        assert!(!rect.is_finite());
        assert!(Rect::new(0.0, 0.0, 1.0, 1.0).is_finite());
    }

    #[test]
    fn bbox_of_points() {
        let points = [
            Point2::new(1.0, 5.0),
            Point2::new(-3.0, 2.0),
            Point2::new(4.0, -1.0),
        ];
        assert_eq!(
            Rect::from_points(points.iter()),
            Some(Rect::new(-3.0, -1.0, 4.0, 5.0))
        );
        assert_eq!(Rect::from_points([].iter()), None);
    }

    #[test]
    fn normalized_swaps_bounds() {
        let rect = Rect::new(10.0, 5.0, 0.0, -5.0).normalized();
        assert_eq!(rect, Rect::new(0.0, -5.0, 10.0, 5.0));
    }
}
