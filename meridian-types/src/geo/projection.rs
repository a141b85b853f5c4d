use super::crs::WGS84_SEMIMAJOR;
use crate::Point2;

/// Projection converts points from one coordinate system into another and back.
pub trait Projection {
    /// Type of the input point.
    type InPoint;
    /// Type of the projected point.
    type OutPoint;

    /// Projects the point. Returns `None` if the point cannot be projected.
    fn project(&self, input: &Self::InPoint) -> Option<Self::OutPoint>;
    /// Inverse of [`Projection::project`].
    fn unproject(&self, input: &Self::OutPoint) -> Option<Self::InPoint>;
}

/// Spherical Web Mercator. Input points are `(lon, lat)` in degrees, output points are
/// EPSG:3857 meters.
#[derive(Debug, Copy, Clone)]
pub struct WebMercator {
    semimajor: f64,
}

impl Default for WebMercator {
    fn default() -> Self {
        Self {
            semimajor: WGS84_SEMIMAJOR,
        }
    }
}

impl Projection for WebMercator {
    type InPoint = Point2;
    type OutPoint = Point2;

    fn project(&self, input: &Point2) -> Option<Point2> {
        if input.y.abs() >= 90.0 {
            return None;
        }

        let x = self.semimajor * input.x.to_radians();
        let y = self.semimajor
            * (std::f64::consts::FRAC_PI_4 + input.y.to_radians() / 2.0)
                .tan()
                .ln();

        if x.is_finite() && y.is_finite() {
            Some(Point2::new(x, y))
        } else {
            None
        }
    }

    fn unproject(&self, input: &Point2) -> Option<Point2> {
        let lat = std::f64::consts::FRAC_PI_2 - 2.0 * (-input.y / self.semimajor).exp().atan();
        let lon = input.x / self.semimajor;

        if lat.is_finite() && lon.is_finite() {
            Some(Point2::new(lon.to_degrees(), lat.to_degrees()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn projects_antimeridian() {
        let projection = WebMercator::default();
        let projected = projection.project(&Point2::new(180.0, 0.0)).unwrap();
        assert_abs_diff_eq!(projected.x, 20037508.342789244, epsilon = 1e-6);
        assert_abs_diff_eq!(projected.y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn unproject_is_inverse() {
        let projection = WebMercator::default();
        let point = Point2::new(37.6, 55.7);
        let back = projection
            .unproject(&projection.project(&point).unwrap())
            .unwrap();
        assert_abs_diff_eq!(back.x, point.x, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y, point.y, epsilon = 1e-9);
    }

    #[test]
    fn pole_cannot_be_projected() {
        assert!(WebMercator::default()
            .project(&Point2::new(0.0, 90.0))
            .is_none());
    }
}
