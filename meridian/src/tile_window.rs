//! Calculation of the range of tiles of a mosaic that intersect a requested envelope.

use meridian_types::Rect;

use crate::pyramid::{Mosaic, TileIndex};

/// Default tolerance (in tiles) used to ignore tiles that only touch the envelope because of
/// floating point errors.
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Half-open rectangular range of tile columns and rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TileWindow {
    /// First column of the window.
    pub col_min: u32,
    /// Column after the last column of the window.
    pub col_max: u32,
    /// First row of the window.
    pub row_min: u32,
    /// Row after the last row of the window.
    pub row_max: u32,
}

impl TileWindow {
    /// Window that contains no tiles.
    pub const EMPTY: TileWindow = TileWindow {
        col_min: 0,
        col_max: 0,
        row_min: 0,
        row_max: 0,
    };

    /// Returns true if the window contains no tiles.
    pub fn is_empty(&self) -> bool {
        self.col_min >= self.col_max || self.row_min >= self.row_max
    }

    /// Number of tiles in the window.
    pub fn tile_count(&self) -> usize {
        if self.is_empty() {
            return 0;
        }

        (self.col_max - self.col_min) as usize * (self.row_max - self.row_min) as usize
    }

    /// Number of tiles in the window that are not reported missing by the mosaic. Does not
    /// iterate over the window.
    pub fn available_count(&self, mosaic: &Mosaic) -> usize {
        if self.is_empty() {
            return 0;
        }

        self.tile_count()
            - mosaic.missing_count(self.col_min..self.col_max, self.row_min..self.row_max)
    }

    /// Iterates over all indices of the window, row by row.
    pub fn iter(&self) -> impl Iterator<Item = TileIndex> {
        let window = *self;
        let cols = if window.is_empty() {
            0..0
        } else {
            window.col_min..window.col_max
        };

        (window.row_min..window.row_max)
            .flat_map(move |row| cols.clone().map(move |col| TileIndex::new(col, row)))
    }

    /// Iterates over indices of the window that are not reported missing by the mosaic.
    pub fn iter_available<'a>(&self, mosaic: &'a Mosaic) -> impl Iterator<Item = TileIndex> + 'a {
        self.iter().filter(move |index| !mosaic.is_missing(*index))
    }
}

/// Computes the window of tiles of `mosaic` that cover `bbox`.
///
/// `epsilon` is a fraction of a tile: an envelope edge closer than that to a tile edge is
/// considered to lie exactly on it, so the tile behind the edge is not selected. A degenerate
/// (zero width or height) envelope still selects one column or row. An envelope outside of the
/// grid, or with non-finite bounds, yields an empty window.
pub fn compute_tile_window(mosaic: &Mosaic, bbox: &Rect, epsilon: f64) -> TileWindow {
    if !bbox.is_finite() || bbox.x_min > bbox.x_max || bbox.y_min > bbox.y_max {
        return TileWindow::EMPTY;
    }

    let origin = mosaic.upper_left();
    let span_x = mosaic.tile_span_x();
    let span_y = mosaic.tile_span_y();

    let (col_min, col_max) = axis_range(
        (bbox.x_min - origin.x) / span_x,
        (bbox.x_max - origin.x) / span_x,
        epsilon,
    );
    let (row_min, row_max) = axis_range(
        (origin.y - bbox.y_max) / span_y,
        (origin.y - bbox.y_min) / span_y,
        epsilon,
    );

    let grid = mosaic.grid_size();
    let clip = |value: f64, limit: u32| value.clamp(0.0, limit as f64) as u32;

    TileWindow {
        col_min: clip(col_min, grid.width()),
        col_max: clip(col_max, grid.width()),
        row_min: clip(row_min, grid.height()),
        row_max: clip(row_max, grid.height()),
    }
}

/// Converts a range in tile units (`near <= far`) into a half-open index range.
fn axis_range(near: f64, far: f64, epsilon: f64) -> (f64, f64) {
    let min = (near + epsilon).floor();
    let mut max = (far - epsilon).floor() + 1.0;
    if max <= min {
        max = min + 1.0;
    }

    (min, max)
}
