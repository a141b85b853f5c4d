use std::sync::Arc;

use meridian_types::{Crs, Polygon, Rect};

use super::{Canvas, Paint, RenderRequest};
use crate::periodic::wrap_shifts;
use crate::reproject::{Reproject, WebMercatorReprojector};

/// Polygon with the paint it is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    /// Geometry of the feature.
    pub polygon: Polygon,
    /// Fill of the feature.
    pub paint: Paint,
}

impl Feature {
    /// Creates a new feature.
    pub fn new(polygon: Polygon, paint: Paint) -> Self {
        Self { polygon, paint }
    }
}

/// Summary of a feature render call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeatureReport {
    /// Number of polygon copies painted.
    pub painted: usize,
    /// Number of features that could not be projected or painted.
    pub failed: usize,
    /// True if the call was stopped by its monitor.
    pub cancelled: bool,
}

/// Draws vector features, duplicating them across the wrap of a cyclic axis.
///
/// Each feature is drawn once for every period offset at which it is visible in the viewport.
/// A feature that is a full period wide is drawn whole at each offset, never split at the
/// antimeridian.
pub struct FeatureRenderer {
    reprojector: Arc<dyn Reproject>,
}

impl Default for FeatureRenderer {
    fn default() -> Self {
        Self::new(Arc::new(WebMercatorReprojector::default()))
    }
}

impl std::fmt::Debug for FeatureRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeatureRenderer").finish_non_exhaustive()
    }
}

impl FeatureRenderer {
    /// Creates a renderer that uses `reprojector` for features in a reference system other than
    /// the target one.
    pub fn new(reprojector: Arc<dyn Reproject>) -> Self {
        Self { reprojector }
    }

    /// Paints `features`, given in `crs`, for the request viewport.
    ///
    /// Unbounded sides of the request envelope are resolved against the canonical range of the
    /// cyclic axis (when there is one) and the bounds of the features.
    pub fn render(
        &self,
        features: &[Feature],
        crs: &Crs,
        request: &RenderRequest,
        canvas: &mut dyn Canvas,
    ) -> FeatureReport {
        let target_crs = request.target_crs();
        let axis = target_crs.periodic_x();
        let mut report = FeatureReport::default();

        let projected: Vec<(Polygon, Paint, Rect)> = features
            .iter()
            .filter_map(|feature| {
                let polygon = if crs == target_crs {
                    feature.polygon.clone()
                } else {
                    match feature
                        .polygon
                        .try_map_points(|p| self.reprojector.transform_point(p, crs, target_crs))
                    {
                        Ok(polygon) => polygon,
                        Err(err) => {
                            log::warn!("Failed to project feature: {err}");
                            report.failed += 1;
                            return None;
                        }
                    }
                };

                let bbox = polygon.bounding_rect()?;
                Some((polygon, feature.paint, bbox))
            })
            .collect();

        let Some(viewport) = self.viewport(request, &projected) else {
            return report;
        };

        for (polygon, paint, bbox) in &projected {
            if request.monitor().is_cancelled() {
                report.cancelled = true;
                break;
            }

            for k in wrap_shifts(bbox, &viewport, axis.as_ref()) {
                let shifted = match &axis {
                    Some(axis) if k != 0 => polygon.translate_x(k as f64 * axis.period()),
                    _ => polygon.clone(),
                };

                match canvas.paint_polygon(&shifted, *paint) {
                    Ok(()) => report.painted += 1,
                    Err(err) => {
                        log::warn!("Failed to paint feature at offset {k}: {err}");
                        report.failed += 1;
                    }
                }
            }
        }

        log::debug!(
            "Painted {} feature copies, {} failed",
            report.painted,
            report.failed
        );

        report
    }

    fn viewport(
        &self,
        request: &RenderRequest,
        features: &[(Polygon, Paint, Rect)],
    ) -> Option<Rect> {
        let envelope = request.envelope();
        if !envelope.has_unbounded_side() {
            return Some(envelope.rect().normalized());
        }

        let data_bounds = features
            .iter()
            .map(|(_, _, bbox)| *bbox)
            .reduce(|a, b| a.merge(&b))?;
        let maximal_extent = match request.target_crs().periodic_x() {
            Some(axis) => Rect::new(
                axis.canonical_min(),
                data_bounds.y_min,
                axis.canonical_max(),
                data_bounds.y_max,
            ),
            None => data_bounds,
        };

        Some(*envelope.resolve(&maximal_extent).rect())
    }
}

#[cfg(test)]
mod tests {
    use meridian_types::{Envelope, Point2};

    use super::*;
    use crate::compositor::CancellationMonitor;
    use crate::error::MeridianError;
    use crate::pyramid::TileReference;
    use crate::Color;

    #[derive(Default)]
    struct Recorder {
        polygons: Vec<Rect>,
        fail: bool,
    }

    impl Canvas for Recorder {
        fn paint_tile(&mut self, _tile: &TileReference) -> Result<(), MeridianError> {
            Ok(())
        }

        fn paint_polygon(&mut self, polygon: &Polygon, _paint: Paint) -> Result<(), MeridianError> {
            if self.fail {
                return Err(MeridianError::Paint("broken surface".into()));
            }
            self.polygons.extend(polygon.bounding_rect());
            Ok(())
        }
    }

    fn feature(x_min: f64, x_max: f64) -> Feature {
        Feature::new(
            Rect::new(x_min, -10.0, x_max, 10.0).into(),
            Paint::fill(Color::RED),
        )
    }

    fn request(rect: Rect) -> RenderRequest {
        RenderRequest::builder("features", Envelope::new(rect, Crs::EPSG4326), 1.0).build()
    }

    #[test]
    fn feature_across_antimeridian_is_painted_twice() {
        let mut canvas = Recorder::default();
        let report = FeatureRenderer::default().render(
            &[feature(170.0, 190.0)],
            &Crs::EPSG4326,
            &request(Rect::new(-180.0, -90.0, 180.0, 90.0)),
            &mut canvas,
        );

        assert_eq!(report.painted, 2);
        assert_eq!(
            canvas.polygons,
            vec![
                Rect::new(-190.0, -10.0, -170.0, 10.0),
                Rect::new(170.0, -10.0, 190.0, 10.0)
            ]
        );
    }

    #[test]
    fn full_width_feature_is_painted_once() {
        let mut canvas = Recorder::default();
        let report = FeatureRenderer::default().render(
            &[feature(-180.0, 180.0)],
            &Crs::EPSG4326,
            &request(Rect::new(-180.0, -90.0, 180.0, 90.0)),
            &mut canvas,
        );

        assert_eq!(report.painted, 1);
        assert_eq!(canvas.polygons, vec![Rect::new(-180.0, -10.0, 180.0, 10.0)]);
    }

    #[test]
    fn unbounded_envelope_uses_canonical_range() {
        let mut canvas = Recorder::default();
        let report = FeatureRenderer::default().render(
            &[feature(10.0, 20.0)],
            &Crs::EPSG4326,
            &request(Rect::new(f64::NAN, f64::NAN, f64::NAN, f64::NAN)),
            &mut canvas,
        );

        assert_eq!(report.painted, 1);
    }

    #[test]
    fn paint_failures_are_counted() {
        let mut canvas = Recorder {
            fail: true,
            ..Default::default()
        };
        let report = FeatureRenderer::default().render(
            &[feature(0.0, 10.0), feature(20.0, 30.0)],
            &Crs::EPSG4326,
            &request(Rect::new(-180.0, -90.0, 180.0, 90.0)),
            &mut canvas,
        );

        assert_eq!(report.painted, 0);
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn features_are_projected_to_target() {
        let mut canvas = Recorder::default();
        let request = RenderRequest::builder(
            "features",
            Envelope::new(
                Rect::new(-20_037_508.0, -20_037_508.0, 20_037_508.0, 20_037_508.0),
                Crs::EPSG3857,
            ),
            1.0,
        )
        .build();
        let polygon = Polygon::from(Rect::new(0.0, 0.0, 10.0, 10.0));
        let report = FeatureRenderer::default().render(
            &[Feature::new(polygon, Paint::fill(Color::BLUE))],
            &Crs::EPSG4326,
            &request,
            &mut canvas,
        );

        assert_eq!(report.painted, 1);
        let bbox = canvas.polygons[0];
        assert!(bbox.x_max > 1_000_000.0);
        assert!(bbox.contains(&Point2::new(500_000.0, 500_000.0)));
    }

    #[test]
    fn cancelled_request_paints_nothing() {
        let monitor = CancellationMonitor::new();
        monitor.cancel();
        let request = RenderRequest::builder(
            "features",
            Envelope::new(Rect::new(-180.0, -90.0, 180.0, 90.0), Crs::EPSG4326),
            1.0,
        )
        .with_monitor(monitor)
        .build();

        let mut canvas = Recorder::default();
        let report = FeatureRenderer::default().render(
            &[feature(0.0, 10.0)],
            &Crs::EPSG4326,
            &request,
            &mut canvas,
        );
        assert!(report.cancelled);
        assert_eq!(report.painted, 0);
    }
}
