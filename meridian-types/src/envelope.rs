//! [`Envelope`] binds a rectangle to the reference system it is expressed in.

use serde::{Deserialize, Serialize};

use crate::{Crs, Rect};

/// Rectangle in a given reference system.
///
/// Any bound may be `NaN`, meaning "unbounded on that side". Unbounded envelopes must be
/// [resolved](Envelope::resolve) against the maximal extent of the data before tiling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    rect: Rect,
    crs: Crs,
}

impl Envelope {
    /// Creates a new envelope.
    pub fn new(rect: Rect, crs: Crs) -> Self {
        Self { rect, crs }
    }

    /// Bounds of the envelope.
    pub fn rect(&self) -> &Rect {
        &self.rect
    }

    /// Reference system of the envelope.
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Returns true if at least one of the bounds is `NaN`.
    pub fn has_unbounded_side(&self) -> bool {
        self.rect.x_min.is_nan()
            || self.rect.x_max.is_nan()
            || self.rect.y_min.is_nan()
            || self.rect.y_max.is_nan()
    }

    /// Replaces every `NaN` bound with the matching bound of `maximal_extent` and normalizes
    /// the result so that minimums do not exceed maximums.
    pub fn resolve(&self, maximal_extent: &Rect) -> Self {
        let pick = |value: f64, fallback: f64| if value.is_nan() { fallback } else { value };
        let rect = Rect::new(
            pick(self.rect.x_min, maximal_extent.x_min),
            pick(self.rect.y_min, maximal_extent.y_min),
            pick(self.rect.x_max, maximal_extent.x_max),
            pick(self.rect.y_max, maximal_extent.y_max),
        );

        Self {
            rect: rect.normalized(),
            crs: self.crs.clone(),
        }
    }
}
