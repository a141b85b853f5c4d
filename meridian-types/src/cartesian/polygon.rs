use serde::{Deserialize, Serialize};

use super::{Point2, Rect};
use crate::error::MeridianTypesError;

/// Closed sequence of points. The last point is implicitly connected to the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contour {
    points: Vec<Point2>,
}

impl Contour {
    /// Creates a new contour.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Creates a contour, checking that it has at least three points and all of them are finite.
    pub fn try_new(points: Vec<Point2>) -> Result<Self, MeridianTypesError> {
        if points.len() < 3 {
            return Err(MeridianTypesError::InvalidGeometry(format!(
                "contour must have at least 3 points, got {}",
                points.len()
            )));
        }

        if let Some(p) = points.iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(MeridianTypesError::InvalidGeometry(format!(
                "contour point ({}, {}) is not finite",
                p.x, p.y
            )));
        }

        Ok(Self { points })
    }

    /// Points of the contour.
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Bounding rectangle, `None` for an empty contour.
    pub fn bounding_rect(&self) -> Option<Rect> {
        Rect::from_points(self.points.iter())
    }

    /// Copy of the contour moved by `dx` along x axis.
    pub fn translate_x(&self, dx: f64) -> Self {
        Self {
            points: self
                .points
                .iter()
                .map(|p| Point2::new(p.x + dx, p.y))
                .collect(),
        }
    }

    /// Even-odd crossing test.
    fn crossings(&self, point: &Point2) -> bool {
        let mut inside = false;
        let n = self.points.len();
        if n < 3 {
            return false;
        }

        let mut j = n - 1;
        for i in 0..n {
            let a = self.points[i];
            let b = self.points[j];
            if (a.y > point.y) != (b.y > point.y)
                && point.x < (b.x - a.x) * (point.y - a.y) / (b.y - a.y) + a.x
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }
}

/// Polygon with one outer contour and any number of holes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    outer: Contour,
    inner: Vec<Contour>,
}

impl Polygon {
    /// Creates a new polygon.
    pub fn new(outer: Contour, inner: Vec<Contour>) -> Self {
        Self { outer, inner }
    }

    /// Outer contour.
    pub fn outer(&self) -> &Contour {
        &self.outer
    }

    /// Holes.
    pub fn inner(&self) -> &[Contour] {
        &self.inner
    }

    /// Bounding rectangle of the outer contour.
    pub fn bounding_rect(&self) -> Option<Rect> {
        self.outer.bounding_rect()
    }

    /// Copy of the polygon moved by `dx` along x axis.
    pub fn translate_x(&self, dx: f64) -> Self {
        Self {
            outer: self.outer.translate_x(dx),
            inner: self.inner.iter().map(|c| c.translate_x(dx)).collect(),
        }
    }

    /// Returns true if the point is inside the polygon (and not inside any of its holes).
    pub fn contains(&self, point: &Point2) -> bool {
        self.outer.crossings(point) && !self.inner.iter().any(|c| c.crossings(point))
    }

    /// Returns a copy of the polygon with every vertex mapped by `f`. Fails if `f` fails for
    /// any of the points.
    pub fn try_map_points<E>(
        &self,
        mut f: impl FnMut(&Point2) -> Result<Point2, E>,
    ) -> Result<Self, E> {
        let mut map_contour = |contour: &Contour| -> Result<Contour, E> {
            Ok(Contour::new(
                contour.points.iter().map(&mut f).collect::<Result<_, _>>()?,
            ))
        };

        let outer = map_contour(&self.outer)?;
        let inner = self
            .inner
            .iter()
            .map(&mut map_contour)
            .collect::<Result<_, _>>()?;

        Ok(Self { outer, inner })
    }
}

impl From<Rect> for Polygon {
    fn from(rect: Rect) -> Self {
        Self::new(Contour::new(rect.into_quadrangle().to_vec()), vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f64, y: f64, size: f64) -> Contour {
        Contour::new(vec![
            Point2::new(x, y),
            Point2::new(x + size, y),
            Point2::new(x + size, y + size),
            Point2::new(x, y + size),
        ])
    }

    #[test]
    fn contains_respects_holes() {
        let polygon = Polygon::new(square(0.0, 0.0, 10.0), vec![square(4.0, 4.0, 2.0)]);
        assert!(polygon.contains(&Point2::new(1.0, 1.0)));
        assert!(!polygon.contains(&Point2::new(5.0, 5.0)));
        assert!(!polygon.contains(&Point2::new(11.0, 5.0)));
    }

    #[test]
    fn degenerate_contours_are_rejected() {
        assert!(Contour::try_new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]).is_err());
        assert!(Contour::try_new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(f64::NAN, 1.0),
            Point2::new(1.0, 0.0),
        ])
        .is_err());
        assert_eq!(
            Contour::try_new(square(0.0, 0.0, 1.0).points().to_vec()).unwrap(),
            square(0.0, 0.0, 1.0)
        );
    }

    #[test]
    fn translate_moves_all_contours() {
        let polygon = Polygon::new(square(170.0, 0.0, 20.0), vec![square(175.0, 5.0, 1.0)]);
        let moved = polygon.translate_x(-360.0);
        assert_eq!(
            moved.bounding_rect(),
            Some(Rect::new(-190.0, 0.0, -170.0, 20.0))
        );
        assert_eq!(
            moved.inner()[0].bounding_rect(),
            Some(Rect::new(-185.0, 5.0, -184.0, 6.0))
        );
    }
}
