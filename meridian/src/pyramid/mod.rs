//! Read-only model of the resolution levels available for one data source.
//!
//! A [`Pyramid`] is a set of [`Mosaic`]s (tile grids) covering the same data at different
//! resolutions. The engine never creates or modifies these objects during a render call: they
//! are obtained from a [`PyramidCatalog`] and dropped when the call ends.

use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::Arc;

use meridian_types::{Crs, Point2, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::error::MeridianError;

mod catalog;
mod tile;

pub use catalog::{InMemoryCatalog, PyramidCatalog};
pub use tile::{FileTileReader, TileInput, TileReader, TileReference};

/// Position of a tile in a mosaic grid.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Copy, Clone, Hash, Serialize, Deserialize)]
pub struct TileIndex {
    /// Column, counted from the left edge of the grid.
    pub col: u32,
    /// Row, counted from the top edge of the grid.
    pub row: u32,
}

impl TileIndex {
    /// Create a new index instance.
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

/// One resolution level of a pyramid: a regular grid of equally sized tiles.
///
/// Tiles are addressed by `(col, row)` in `[0, grid_width) x [0, grid_height)`, with row `0` at
/// the top. A grid may be sparse: tiles marked as missing are legal holes and are never
/// requested.
#[derive(Debug, Clone)]
pub struct Mosaic {
    id: String,
    upper_left: Point2,
    grid_size: Size,
    tile_size: Size,
    scale: f64,
    missing: BTreeSet<TileIndex>,
}

impl Mosaic {
    /// Creates a new mosaic.
    ///
    /// `scale` is the size of one pixel in world units. It must be a finite positive number, and
    /// tiles must have non-zero size.
    pub fn new(
        id: impl Into<String>,
        upper_left: Point2,
        grid_size: Size,
        tile_size: Size,
        scale: f64,
    ) -> Result<Self, MeridianError> {
        let id = id.into();
        if !scale.is_finite() || scale <= 0.0 {
            return Err(MeridianError::InvalidMosaic(format!(
                "mosaic {id} has invalid scale {scale}"
            )));
        }

        if tile_size.is_zero() {
            return Err(MeridianError::InvalidMosaic(format!(
                "mosaic {id} has zero tile size"
            )));
        }

        if !upper_left.x.is_finite() || !upper_left.y.is_finite() {
            return Err(MeridianError::InvalidMosaic(format!(
                "mosaic {id} has non-finite origin"
            )));
        }

        Ok(Self {
            id,
            upper_left,
            grid_size,
            tile_size,
            scale,
            missing: BTreeSet::new(),
        })
    }

    /// Marks the given tiles as missing.
    pub fn with_missing(mut self, missing: impl IntoIterator<Item = TileIndex>) -> Self {
        self.missing.extend(missing);
        self
    }

    /// Identifier of the mosaic, unique inside its pyramid.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// World position of the upper left corner of the tile `(0, 0)`.
    pub fn upper_left(&self) -> Point2 {
        self.upper_left
    }

    /// Number of tile columns and rows.
    pub fn grid_size(&self) -> Size {
        self.grid_size
    }

    /// Size of a single tile in pixels.
    pub fn tile_size(&self) -> Size {
        self.tile_size
    }

    /// World units per pixel.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Width of one tile in world units.
    pub fn tile_span_x(&self) -> f64 {
        self.scale * self.tile_size.width() as f64
    }

    /// Height of one tile in world units.
    pub fn tile_span_y(&self) -> f64 {
        self.scale * self.tile_size.height() as f64
    }

    /// Rectangle covered by the full grid.
    pub fn extent(&self) -> Rect {
        Rect::new(
            self.upper_left.x,
            self.upper_left.y - self.tile_span_y() * self.grid_size.height() as f64,
            self.upper_left.x + self.tile_span_x() * self.grid_size.width() as f64,
            self.upper_left.y,
        )
    }

    /// Returns true if the index lies inside the grid.
    pub fn contains(&self, index: TileIndex) -> bool {
        index.col < self.grid_size.width() && index.row < self.grid_size.height()
    }

    /// Returns true if the tile is a hole in a sparse grid.
    pub fn is_missing(&self, index: TileIndex) -> bool {
        self.missing.contains(&index)
    }

    /// Number of missing tiles with the column in `cols` and the row in `rows`.
    pub fn missing_count(&self, cols: Range<u32>, rows: Range<u32>) -> usize {
        if cols.is_empty() || rows.is_empty() {
            return 0;
        }

        self.missing
            .range(TileIndex::new(cols.start, 0)..TileIndex::new(cols.end, 0))
            .filter(|index| rows.contains(&index.row))
            .count()
    }

    /// World rectangle of the tile, or `None` if the index is outside of the grid.
    pub fn tile_bbox(&self, index: TileIndex) -> Option<Rect> {
        if !self.contains(index) {
            return None;
        }

        let x_min = self.upper_left.x + index.col as f64 * self.tile_span_x();
        let y_max = self.upper_left.y - index.row as f64 * self.tile_span_y();
        Some(Rect::new(
            x_min,
            y_max - self.tile_span_y(),
            x_min + self.tile_span_x(),
            y_max,
        ))
    }
}

/// Set of mosaics covering one data source at different resolutions.
#[derive(Debug, Clone)]
pub struct Pyramid {
    id: String,
    crs: Crs,
    mosaics: Vec<Arc<Mosaic>>,
}

impl Pyramid {
    /// Creates a new pyramid. Mosaics may be given in any order, but there must be at least one.
    pub fn new(
        id: impl Into<String>,
        crs: Crs,
        mosaics: Vec<Mosaic>,
    ) -> Result<Self, MeridianError> {
        let id = id.into();
        if mosaics.is_empty() {
            return Err(MeridianError::InvalidPyramid(format!(
                "pyramid {id} has no mosaics"
            )));
        }

        Ok(Self {
            id,
            crs,
            mosaics: mosaics.into_iter().map(Arc::new).collect(),
        })
    }

    /// Identifier of the pyramid.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Reference system of all mosaics of the pyramid.
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Mosaics in the order they were given.
    pub fn mosaics(&self) -> &[Arc<Mosaic>] {
        &self.mosaics
    }

    /// Mosaic with the smallest scale.
    pub fn finest(&self) -> &Arc<Mosaic> {
        self.extreme_by(|a, b| a < b)
    }

    /// Mosaic with the largest scale.
    pub fn coarsest(&self) -> &Arc<Mosaic> {
        self.extreme_by(|a, b| a > b)
    }

    /// Union of the extents of all mosaics.
    pub fn extent(&self) -> Rect {
        let first = self.mosaics[0].extent();
        self.mosaics
            .iter()
            .skip(1)
            .fold(first, |acc, mosaic| acc.merge(&mosaic.extent()))
    }

    fn extreme_by(&self, better: impl Fn(f64, f64) -> bool) -> &Arc<Mosaic> {
        let mut selected = &self.mosaics[0];
        for mosaic in &self.mosaics[1..] {
            if better(mosaic.scale(), selected.scale()) {
                selected = mosaic;
            }
        }

        selected
    }
}
