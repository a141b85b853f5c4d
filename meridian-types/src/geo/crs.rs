use serde::{Deserialize, Serialize};

/// Semi-major axis of the WGS84 ellipsoid, in meters.
pub(crate) const WGS84_SEMIMAJOR: f64 = 6_378_137.0;

/// Description of a cyclic coordinate axis, e.g. geographic longitude that wraps after
/// 360 degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodicAxis {
    period: f64,
    canonical_min: f64,
}

impl PeriodicAxis {
    /// Creates a new axis. Returns `None` if the period is zero, negative or not finite, in
    /// which case the axis must be treated as non-cyclic.
    pub fn new(period: f64, canonical_min: f64) -> Option<Self> {
        if period.is_finite() && period > 0.0 && canonical_min.is_finite() {
            Some(Self {
                period,
                canonical_min,
            })
        } else {
            None
        }
    }

    /// Length of one period in axis units.
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Lower bound of the canonical range `[canonical_min, canonical_min + period]`.
    pub fn canonical_min(&self) -> f64 {
        self.canonical_min
    }

    /// Upper bound of the canonical range.
    pub fn canonical_max(&self) -> f64 {
        self.canonical_min + self.period
    }
}

/// Coordinate reference system tag.
///
/// The engine does not do any coordinate math with a `Crs` itself: it only compares the tags
/// and reads the period of the x axis. Transformations between systems are delegated to an
/// external reprojection capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crs {
    code: u32,
    x_period: f64,
    x_canonical_min: f64,
}

impl Crs {
    /// Geographic WGS84 in degrees, longitude first. Longitude wraps around `[-180, 180]`.
    pub const EPSG4326: Crs = Crs {
        code: 4326,
        x_period: 360.0,
        x_canonical_min: -180.0,
    };

    /// Web Mercator projection in meters. X coordinate wraps around the equator length.
    pub const EPSG3857: Crs = Crs {
        code: 3857,
        x_period: 2.0 * std::f64::consts::PI * WGS84_SEMIMAJOR,
        x_canonical_min: -std::f64::consts::PI * WGS84_SEMIMAJOR,
    };

    /// Creates a non-cyclic reference system with the given authority code.
    pub const fn new(code: u32) -> Self {
        Self {
            code,
            x_period: 0.0,
            x_canonical_min: 0.0,
        }
    }

    /// Sets the period and canonical range start of the x axis.
    pub const fn with_x_period(self, period: f64, canonical_min: f64) -> Self {
        Self {
            x_period: period,
            x_canonical_min: canonical_min,
            ..self
        }
    }

    /// Authority (EPSG) code of the system.
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Cyclic description of the x axis, if the axis wraps.
    pub fn periodic_x(&self) -> Option<PeriodicAxis> {
        PeriodicAxis::new(self.x_period, self.x_canonical_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geographic_axis_is_cyclic() {
        let axis = Crs::EPSG4326.periodic_x().unwrap();
        assert_eq!(axis.period(), 360.0);
        assert_eq!(axis.canonical_min(), -180.0);
        assert_eq!(axis.canonical_max(), 180.0);
    }

    #[test]
    fn zero_period_means_non_cyclic() {
        assert!(Crs::new(32633).periodic_x().is_none());
        assert!(Crs::new(32633).with_x_period(0.0, 0.0).periodic_x().is_none());
        assert!(Crs::new(1).with_x_period(f64::NAN, 0.0).periodic_x().is_none());
        assert!(Crs::new(1).with_x_period(10.0, 0.0).periodic_x().is_some());
    }

    #[test]
    fn codes_distinguish_systems() {
        assert_ne!(Crs::EPSG4326, Crs::EPSG3857);
        assert_eq!(Crs::EPSG3857.code(), 3857);
    }
}
