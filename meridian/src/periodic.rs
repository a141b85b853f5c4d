//! Replication of viewports and geometries along a cyclic axis.
//!
//! When a requested envelope is wider than one period of a cyclic axis (e.g. longitude), or
//! lies outside of the canonical range of the axis, the same data must appear several times
//! on the screen. [`expand`] splits such envelope into [`Replica`]s, each of which lies inside
//! the canonical range and can be tiled independently.

use std::ops::RangeInclusive;

use meridian_types::{PeriodicAxis, Rect};

/// One period-shifted part of a requested envelope.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Replica {
    /// Part of the envelope moved into the canonical range of the axis.
    pub envelope: Rect,
    /// Number of periods the part was moved by. The replica is displayed at
    /// `envelope + wrap_offset * period`.
    pub wrap_offset: i64,
}

impl Replica {
    /// Distance along the axis between the replica and its place on the screen.
    pub fn display_shift(&self, axis: Option<&PeriodicAxis>) -> f64 {
        axis.map_or(0.0, |axis| self.wrap_offset as f64 * axis.period())
    }
}

/// Splits the envelope into replicas, sorted by ascending wrap offset.
///
/// An envelope inside the canonical range (including one that covers exactly one full period)
/// is returned unchanged as a single replica with zero offset. Envelopes on a non-cyclic axis
/// are never split. Every replica is clipped to the canonical range; taken together and shifted
/// back by their offsets, the replicas cover the original envelope exactly.
///
/// One replica is built per period the envelope touches. Use [`replica_offsets`] and
/// [`replica_at`] to inspect a very wide envelope without building all of them.
pub fn expand(envelope: &Rect, axis: Option<&PeriodicAxis>) -> Vec<Replica> {
    let offsets = replica_offsets(envelope, axis);
    log::trace!("Splitting envelope {envelope:?} into periods {offsets:?}");

    offsets
        .filter_map(|k| replica_at(envelope, axis, k))
        .collect()
}

/// Range of wrap offsets of the replicas [`expand`] would produce for `envelope`.
///
/// All replicas strictly between the first and the last offset cover the whole canonical range.
pub fn replica_offsets(envelope: &Rect, axis: Option<&PeriodicAxis>) -> RangeInclusive<i64> {
    let Some(axis) = axis.filter(|axis| needs_split(envelope, axis)) else {
        return 0..=0;
    };

    let canonical_min = axis.canonical_min();
    let period = axis.period();
    let k_min = ((envelope.x_min - canonical_min) / period).floor() as i64;
    let k_max = (((envelope.x_max - canonical_min) / period).ceil() as i64 - 1).max(k_min);

    k_min..=k_max
}

/// Replica of `envelope` with the wrap offset `k`, or `None` if the envelope does not reach
/// the period `k`.
pub fn replica_at(envelope: &Rect, axis: Option<&PeriodicAxis>, k: i64) -> Option<Replica> {
    let Some(axis) = axis.filter(|axis| needs_split(envelope, axis)) else {
        return (k == 0).then_some(Replica {
            envelope: *envelope,
            wrap_offset: 0,
        });
    };

    let shift = k as f64 * axis.period();
    let x_min = (envelope.x_min - shift).max(axis.canonical_min());
    let x_max = (envelope.x_max - shift).min(axis.canonical_max());
    if x_min > x_max {
        return None;
    }

    Some(Replica {
        envelope: Rect::new(x_min, envelope.y_min, x_max, envelope.y_max),
        wrap_offset: k,
    })
}

fn needs_split(envelope: &Rect, axis: &PeriodicAxis) -> bool {
    envelope.is_finite()
        && (envelope.x_min < axis.canonical_min() || envelope.x_max > axis.canonical_max())
}

/// Lists the offsets (in periods) at which a geometry with the bounding box `geometry` must be
/// drawn to cover `viewport`.
///
/// A copy is drawn at every offset where the moved geometry overlaps the viewport with a
/// non-zero width. A geometry that only touches the viewport edge (like a ring spanning from
/// `-180` to `180` against a `[-180, 180]` viewport) is not duplicated. A geometry that is one
/// period wide or wider is drawn whole at each such offset, never split.
pub fn wrap_shifts(geometry: &Rect, viewport: &Rect, axis: Option<&PeriodicAxis>) -> Vec<i64> {
    if !geometry.is_finite() || !viewport.is_finite() {
        return vec![];
    }

    let Some(axis) = axis else {
        return if overlaps_x(geometry, viewport) {
            vec![0]
        } else {
            vec![]
        };
    };

    let period = axis.period();
    let first = ((viewport.x_min - geometry.x_max) / period).floor() as i64;
    let last = ((viewport.x_max - geometry.x_min) / period).ceil() as i64;

    (first..=last)
        .filter(|k| overlaps_x(&geometry.shift_x(*k as f64 * period), viewport))
        .collect()
}

/// Positive-width overlap along x. Zero-width geometries (points, vertical lines) overlap if
/// they lie inside the viewport, borders included.
fn overlaps_x(a: &Rect, viewport: &Rect) -> bool {
    if a.width() == 0.0 {
        return a.x_min >= viewport.x_min && a.x_min <= viewport.x_max;
    }

    a.x_min.max(viewport.x_min) < a.x_max.min(viewport.x_max)
}
