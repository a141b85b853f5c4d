use std::ops::RangeInclusive;
use std::sync::Arc;

use meridian_types::{Crs, PeriodicAxis, Rect};

use super::{Canvas, PaintedTile, RenderOutcome, RenderReport, RenderRequest, SkipReason};
use crate::compositor::{CompositorState, TileCompositor};
use crate::config::RenderConfig;
use crate::delivery::{admit, fetch_tiles, CachedTileSource, TileSource};
use crate::error::MeridianError;
use crate::messenger::Messenger;
use crate::periodic::{replica_at, replica_offsets, Replica};
use crate::pyramid::{Mosaic, Pyramid, PyramidCatalog, TileIndex, TileReference};
use crate::reproject::{Reproject, WebMercatorReprojector};
use crate::selector::{select_mosaic, select_pyramid};
use crate::tile_window::{compute_tile_window, TileWindow};

/// Renders tiled raster data of a source onto a [`Canvas`].
///
/// One render call selects the pyramid and the mosaics to use, splits a wrapping envelope into
/// replicas, checks the total tile count against the admission limit, then streams and paints
/// the tiles replica by replica in ascending wrap offset order.
pub struct RasterRenderer {
    catalog: Arc<dyn PyramidCatalog>,
    source: Arc<dyn TileSource>,
    loader: Arc<dyn TileSource>,
    reprojector: Arc<dyn Reproject>,
    messenger: Option<Arc<dyn Messenger>>,
    config: RenderConfig,
}

impl std::fmt::Debug for RasterRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterRenderer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Tiles of one replica, ready to be fetched.
struct ReplicaJob {
    replica: Replica,
    mosaic: Arc<Mosaic>,
    positions: Vec<TileIndex>,
}

/// Consecutive replicas sharing the same envelope, mosaic and tile window.
struct ReplicaGroup {
    envelope: Rect,
    offsets: RangeInclusive<i64>,
    mosaic: Arc<Mosaic>,
    window: TileWindow,
    tiles: usize,
}

impl ReplicaGroup {
    /// Number of tiles requested by all replicas of the group.
    fn tile_count(&self) -> usize {
        let replicas = self.offsets.end().abs_diff(*self.offsets.start());
        usize::try_from(replicas)
            .unwrap_or(usize::MAX)
            .saturating_add(1)
            .saturating_mul(self.tiles)
    }

    fn jobs(&self) -> impl Iterator<Item = ReplicaJob> + '_ {
        let offsets = if self.tiles == 0 {
            1..=0
        } else {
            self.offsets.clone()
        };

        offsets.map(move |wrap_offset| ReplicaJob {
            replica: Replica {
                envelope: self.envelope,
                wrap_offset,
            },
            mosaic: self.mosaic.clone(),
            positions: self.window.iter_available(&self.mosaic).collect(),
        })
    }
}

impl RasterRenderer {
    /// Creates a renderer with the default configuration and Web Mercator reprojection.
    pub fn new(catalog: Arc<dyn PyramidCatalog>, source: Arc<dyn TileSource>) -> Self {
        let loader = source.clone();
        Self {
            catalog,
            source,
            loader,
            reprojector: Arc::new(WebMercatorReprojector::default()),
            messenger: None,
            config: RenderConfig::default(),
        }
        .with_config(RenderConfig::default())
    }

    /// Replaces the configuration. A non-zero `cache_capacity` puts a fresh tile cache in front
    /// of the tile source.
    pub fn with_config(mut self, config: RenderConfig) -> Self {
        self.loader = if config.cache_capacity > 0 {
            Arc::new(CachedTileSource::new(
                self.source.clone(),
                config.cache_capacity,
            ))
        } else {
            self.source.clone()
        };
        self.config = config;
        self
    }

    /// Sets the reprojection capability.
    pub fn with_reprojector(mut self, reprojector: Arc<dyn Reproject>) -> Self {
        self.reprojector = reprojector;
        self
    }

    /// Sets the messenger notified after every painted tile.
    pub fn with_messenger(mut self, messenger: Arc<dyn Messenger>) -> Self {
        self.messenger = Some(messenger);
        self
    }

    /// Current configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Renders the request onto the canvas.
    ///
    /// Returns an error only if the pyramid catalog fails. Missing pyramids or mosaics, empty
    /// tile windows and admission control rejections end the call with a
    /// [skipped](RenderOutcome::Skipped) report. Tiles that fail to load or paint are logged and
    /// left out.
    pub async fn render(
        &self,
        request: &RenderRequest,
        canvas: &mut dyn Canvas,
    ) -> Result<RenderReport, MeridianError> {
        let pyramids = self.catalog.get_pyramids(request.source()).await?;
        let target_crs = request.target_crs();

        let Some(pyramid) = select_pyramid(&pyramids, target_crs, &*self.reprojector) else {
            log::debug!(
                "No pyramid of {} can be displayed in EPSG:{}",
                request.source(),
                target_crs.code()
            );
            return Ok(RenderReport::skipped(SkipReason::NoPyramid));
        };

        let maximal_extent =
            match self
                .reprojector
                .transform_rect(&pyramid.extent(), pyramid.crs(), target_crs)
            {
                Ok(extent) => extent,
                Err(err) => {
                    log::warn!("Failed to project extent of pyramid {}: {err}", pyramid.id());
                    return Ok(RenderReport::skipped(SkipReason::ProjectionFailed));
                }
            };

        let envelope = request.envelope().resolve(&maximal_extent);
        let axis = target_crs.periodic_x();
        let resolution = if pyramid.crs() == target_crs {
            request.wanted_resolution()
        } else {
            pyramid_resolution(
                request.wanted_resolution(),
                &pyramid.extent(),
                &maximal_extent,
            )
        };

        let groups = match self.plan(
            &pyramid,
            envelope.rect(),
            axis.as_ref(),
            target_crs,
            resolution,
            request,
        ) {
            Ok(groups) => groups,
            Err(reason) => return Ok(RenderReport::skipped(reason)),
        };

        let requested = groups
            .iter()
            .fold(0usize, |total, group| total.saturating_add(group.tile_count()));
        if let Err(rejected) = admit(requested, request.max_tiles()) {
            log::warn!("Skipping render of {}: {rejected}", request.source());
            return Ok(RenderReport::skipped(rejected.into()));
        }

        if requested == 0 {
            log::debug!("No tiles of {} intersect {:?}", request.source(), envelope.rect());
            return Ok(RenderReport::skipped(SkipReason::EmptyWindow));
        }

        let jobs: Vec<ReplicaJob> = groups.iter().flat_map(ReplicaGroup::jobs).collect();

        log::debug!(
            "Rendering {requested} tiles of {} in {} replicas",
            request.source(),
            jobs.len()
        );

        let mut report = RenderReport {
            outcome: RenderOutcome::Completed,
            painted: Vec::with_capacity(requested),
            failed_paints: 0,
            requested,
        };

        let compositor = TileCompositor::new(self.config.poll_interval());
        for job in jobs {
            if request.monitor().is_cancelled() {
                report.outcome = RenderOutcome::Cancelled;
                break;
            }

            let shift = job.replica.display_shift(axis.as_ref());
            let wrap_offset = job.replica.wrap_offset;
            let mut channel = fetch_tiles(
                self.loader.clone(),
                job.mosaic,
                job.positions,
                self.config.fetch_hints(),
            );

            let outcome = compositor
                .consume(
                    &mut channel,
                    |tile| {
                        let painted =
                            self.paint(&tile, pyramid.crs(), target_crs, shift, &mut *canvas);
                        if painted {
                            report.painted.push(PaintedTile {
                                wrap_offset,
                                mosaic_id: tile.mosaic_id().to_string(),
                                index: tile.index(),
                            });
                        } else {
                            report.failed_paints += 1;
                        }
                    },
                    request.monitor(),
                )
                .await;

            if outcome.state == CompositorState::Cancelled {
                report.outcome = RenderOutcome::Cancelled;
                break;
            }
        }

        log::debug!(
            "Render of {} finished with {:?}: {} tiles painted, {} failed",
            request.source(),
            report.outcome,
            report.painted.len(),
            report.failed_paints
        );

        Ok(report)
    }

    /// Selects the mosaic and the tile window of every replica of `envelope`.
    ///
    /// Replicas strictly between the first and the last one all cover the canonical range of the
    /// axis, so they share one group and are planned once.
    fn plan(
        &self,
        pyramid: &Pyramid,
        envelope: &Rect,
        axis: Option<&PeriodicAxis>,
        target_crs: &Crs,
        resolution: f64,
        request: &RenderRequest,
    ) -> Result<Vec<ReplicaGroup>, SkipReason> {
        let offsets = replica_offsets(envelope, axis);
        let (first, last) = (*offsets.start(), *offsets.end());
        let mut spans = vec![(first, first)];
        if last > first {
            if last.abs_diff(first) >= 2 {
                spans.push((first + 1, last - 1));
            }
            spans.push((last, last));
        }

        let mut groups = Vec::with_capacity(spans.len());
        let mut replicas = 0;
        for (from, to) in spans {
            let Some(replica) = replica_at(envelope, axis, from) else {
                continue;
            };
            replicas += 1;

            let bbox =
                match self
                    .reprojector
                    .transform_rect(&replica.envelope, target_crs, pyramid.crs())
                {
                    Ok(bbox) => bbox,
                    Err(err) => {
                        log::warn!(
                            "Failed to project replicas {from}..={to} of {envelope:?}: {err}"
                        );
                        continue;
                    }
                };

            let Some(mosaic) = select_mosaic(
                pyramid,
                resolution,
                request.tolerance(),
                Some(&bbox),
                self.config.max_mosaic_candidates,
            ) else {
                log::debug!(
                    "Pyramid {} has no mosaic for resolution {resolution}",
                    pyramid.id()
                );
                return Err(SkipReason::NoMosaic);
            };

            let window = compute_tile_window(mosaic, &bbox, request.epsilon());
            log::trace!(
                "Replicas {from}..={to} use mosaic {} with window {window:?}",
                mosaic.id()
            );

            groups.push(ReplicaGroup {
                envelope: replica.envelope,
                offsets: from..=to,
                tiles: window.available_count(mosaic),
                mosaic: mosaic.clone(),
                window,
            });
        }

        if groups.is_empty() && replicas > 0 {
            return Err(SkipReason::ProjectionFailed);
        }

        Ok(groups)
    }

    /// Moves the tile to its display position and paints it. Returns false if it could not be
    /// painted.
    fn paint(
        &self,
        tile: &TileReference,
        pyramid_crs: &Crs,
        target_crs: &Crs,
        shift: f64,
        canvas: &mut dyn Canvas,
    ) -> bool {
        let bbox = match self
            .reprojector
            .transform_rect(tile.bbox(), pyramid_crs, target_crs)
        {
            Ok(bbox) => bbox.shift_x(shift),
            Err(err) => {
                log::warn!("Failed to project tile {:?}: {err}", tile.index());
                return false;
            }
        };

        let placed = tile.clone().with_bbox(bbox);
        match canvas.paint_tile(&placed) {
            Ok(()) => {
                if let Some(messenger) = &self.messenger {
                    messenger.request_redraw();
                }
                true
            }
            Err(err) => {
                log::warn!("Failed to paint tile {:?}: {err}", tile.index());
                false
            }
        }
    }
}

/// Converts the wanted resolution from target system units into pyramid system units,
/// using the ratio of the pyramid extent widths in both systems.
fn pyramid_resolution(wanted: f64, pyramid_extent: &Rect, target_extent: &Rect) -> f64 {
    let target_width = target_extent.width();
    let pyramid_width = pyramid_extent.width();
    if target_width > 0.0 && pyramid_width > 0.0 {
        wanted * pyramid_width / target_width
    } else {
        wanted
    }
}
