//! Reprojection capability consumed by the renderer.

use meridian_types::geo::{Projection, WebMercator};
use meridian_types::{Crs, Point2, Rect};

use crate::error::MeridianError;

/// Maximum latitude representable in Web Mercator.
const WEB_MERCATOR_MAX_LAT: f64 = 85.051_128_779_806_59;

/// Transforms points and envelopes between reference systems.
pub trait Reproject: Send + Sync {
    /// Transforms a point from `from` into `to`.
    fn transform_point(
        &self,
        point: &Point2,
        from: &Crs,
        to: &Crs,
    ) -> Result<Point2, MeridianError>;

    /// Transforms a rectangle. The default implementation returns the bounding box of the
    /// transformed corner and edge middle points.
    fn transform_rect(&self, rect: &Rect, from: &Crs, to: &Crs) -> Result<Rect, MeridianError> {
        if from == to {
            return Ok(*rect);
        }

        let center = rect.center();
        let points = [
            Point2::new(rect.x_min, rect.y_min),
            Point2::new(rect.x_max, rect.y_min),
            Point2::new(rect.x_max, rect.y_max),
            Point2::new(rect.x_min, rect.y_max),
            Point2::new(center.x, rect.y_min),
            Point2::new(center.x, rect.y_max),
            Point2::new(rect.x_min, center.y),
            Point2::new(rect.x_max, center.y),
        ];
        let projected = points
            .iter()
            .map(|p| self.transform_point(p, from, to))
            .collect::<Result<Vec<_>, _>>()?;

        Rect::from_points(projected.iter())
            .ok_or_else(|| MeridianError::Projection("empty point set".into()))
    }
}

/// Reprojector that only accepts identical source and target systems.
#[derive(Debug, Default, Copy, Clone)]
pub struct IdentityReprojector;

impl Reproject for IdentityReprojector {
    fn transform_point(
        &self,
        point: &Point2,
        from: &Crs,
        to: &Crs,
    ) -> Result<Point2, MeridianError> {
        if from == to {
            Ok(*point)
        } else {
            Err(MeridianError::Projection(format!(
                "no transformation from EPSG:{} to EPSG:{}",
                from.code(),
                to.code()
            )))
        }
    }
}

/// Reprojector between geographic WGS84 (EPSG:4326) and Web Mercator (EPSG:3857).
#[derive(Debug, Default, Copy, Clone)]
pub struct WebMercatorReprojector {
    projection: WebMercator,
}

impl Reproject for WebMercatorReprojector {
    fn transform_point(
        &self,
        point: &Point2,
        from: &Crs,
        to: &Crs,
    ) -> Result<Point2, MeridianError> {
        let failed = || {
            MeridianError::Projection(format!(
                "point ({}, {}) cannot be transformed from EPSG:{} to EPSG:{}",
                point.x,
                point.y,
                from.code(),
                to.code()
            ))
        };

        match (from.code(), to.code()) {
            (a, b) if a == b => Ok(*point),
            (4326, 3857) => self.projection.project(point).ok_or_else(failed),
            (3857, 4326) => self.projection.unproject(point).ok_or_else(failed),
            _ => Err(failed()),
        }
    }

    fn transform_rect(&self, rect: &Rect, from: &Crs, to: &Crs) -> Result<Rect, MeridianError> {
        if from.code() == 4326 && to.code() == 3857 {
            let clamped = Rect::new(
                rect.x_min,
                rect.y_min.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT),
                rect.x_max,
                rect.y_max.clamp(-WEB_MERCATOR_MAX_LAT, WEB_MERCATOR_MAX_LAT),
            );
            let min = self.transform_point(&Point2::new(clamped.x_min, clamped.y_min), from, to)?;
            let max = self.transform_point(&Point2::new(clamped.x_max, clamped.y_max), from, to)?;
            return Ok(Rect::new(min.x, min.y, max.x, max.y));
        }

        if from == to {
            return Ok(*rect);
        }

        let min = self.transform_point(&Point2::new(rect.x_min, rect.y_min), from, to)?;
        let max = self.transform_point(&Point2::new(rect.x_max, rect.y_max), from, to)?;
        Ok(Rect::new(min.x, min.y, max.x, max.y))
    }
}
