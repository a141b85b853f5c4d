//! Render entry points and the paint capability they draw through.

use meridian_types::Polygon;

use crate::error::MeridianError;
use crate::pyramid::TileReference;
use crate::Color;

mod feature;
mod raster;
mod report;
mod request;

pub use feature::{Feature, FeatureRenderer, FeatureReport};
pub use raster::RasterRenderer;
pub use report::{PaintedTile, RenderOutcome, RenderReport, SkipReason};
pub use request::{RenderRequest, RenderRequestBuilder};

/// Surface the renderers draw to.
///
/// All coordinates given to a canvas are in the reference system and on the display position
/// of the render request: tiles and polygons from periodic replicas are already moved to the
/// place they must appear at.
pub trait Canvas {
    /// Draws a tile image stretched to `tile.bbox()`.
    fn paint_tile(&mut self, tile: &TileReference) -> Result<(), MeridianError>;

    /// Fills a polygon.
    fn paint_polygon(&mut self, polygon: &Polygon, paint: Paint) -> Result<(), MeridianError>;
}

/// Specifies the way a polygon should be filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    /// Fill color.
    pub color: Color,
}

impl Paint {
    /// Solid fill of the given color.
    pub const fn fill(color: Color) -> Self {
        Self { color }
    }
}
