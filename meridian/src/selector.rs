//! Level of detail selection: picks the pyramid and the mosaic that best match a requested
//! reference system and resolution.
//!
//! # Mosaic selection policy
//!
//! Mosaics are ordered by the absolute log-scale distance `|ln(scale / wanted)|` between their
//! scale and the wanted resolution, coarser mosaic first on ties. Then:
//!
//! 1. the closest mosaic with `|scale - wanted| / wanted <= tolerance` is selected;
//! 2. if no mosaic is within tolerance, the finest mosaic that is coarser than `wanted` is
//!    selected, so the data is never silently over-sampled;
//! 3. if every mosaic is finer than `wanted`, the closest one (the coarsest) is selected.
//!
//! Only mosaics whose extent intersects the requested envelope take part in the selection,
//! unless none of them does.

use std::cmp::Ordering;
use std::sync::Arc;

use meridian_types::{Crs, Rect};

use crate::pyramid::{Mosaic, Pyramid};
use crate::reproject::Reproject;

/// Default allowed relative difference between the wanted resolution and the mosaic scale.
pub const DEFAULT_TOLERANCE: f64 = 0.1;

/// Selects a pyramid that can be displayed in `target_crs`.
///
/// A pyramid in exactly the target reference system is preferred. Otherwise the first pyramid
/// whose extent can be reprojected into the target system is returned. `None` means that the
/// layer cannot be displayed in the target system and should be skipped.
pub fn select_pyramid(
    candidates: &[Arc<Pyramid>],
    target_crs: &Crs,
    reprojector: &dyn Reproject,
) -> Option<Arc<Pyramid>> {
    if let Some(exact) = candidates.iter().find(|p| p.crs() == target_crs) {
        return Some(exact.clone());
    }

    let compatible = candidates.iter().find(|p| {
        match reprojector.transform_rect(&p.extent(), p.crs(), target_crs) {
            Ok(_) => true,
            Err(err) => {
                log::debug!(
                    "Pyramid {} cannot be displayed in EPSG:{}: {err}",
                    p.id(),
                    target_crs.code()
                );
                false
            }
        }
    });

    compatible.cloned()
}

/// Selects the mosaic of the pyramid to render at `wanted_resolution` (world units per pixel).
///
/// See the [module documentation](self) for the policy. `max_candidates` limits the number of
/// closest mosaics considered, `0` means no limit. Returns `None` only when the wanted
/// resolution is not a finite positive number.
pub fn select_mosaic<'a>(
    pyramid: &'a Pyramid,
    wanted_resolution: f64,
    tolerance: f64,
    envelope: Option<&Rect>,
    max_candidates: usize,
) -> Option<&'a Arc<Mosaic>> {
    if !wanted_resolution.is_finite() || wanted_resolution <= 0.0 {
        return None;
    }

    let mut candidates: Vec<&Arc<Mosaic>> = pyramid.mosaics().iter().collect();
    if let Some(envelope) = envelope.filter(|e| e.is_finite()) {
        let intersecting: Vec<_> = candidates
            .iter()
            .copied()
            .filter(|m| m.extent().intersects(envelope))
            .collect();
        if !intersecting.is_empty() {
            candidates = intersecting;
        }
    }

    let distance = |m: &Mosaic| (m.scale() / wanted_resolution).ln().abs();
    candidates.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.scale().partial_cmp(&a.scale()).unwrap_or(Ordering::Equal))
    });

    if max_candidates > 0 {
        candidates.truncate(max_candidates);
    }

    if let Some(within) = candidates
        .iter()
        .find(|m| (m.scale() - wanted_resolution).abs() / wanted_resolution <= tolerance)
    {
        return Some(*within);
    }

    let finest_coarser = candidates
        .iter()
        .filter(|m| m.scale() > wanted_resolution)
        .min_by(|a, b| a.scale().partial_cmp(&b.scale()).unwrap_or(Ordering::Equal));

    finest_coarser.or_else(|| candidates.first()).copied()
}
