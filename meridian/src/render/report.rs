use crate::delivery::TooManyTiles;
use crate::pyramid::TileIndex;

/// Reason why a render call drew nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// No pyramid of the source can be displayed in the target reference system.
    NoPyramid,
    /// The selected pyramid has no usable mosaic for the wanted resolution.
    NoMosaic,
    /// The requested envelope does not intersect any available tile.
    EmptyWindow,
    /// The call would request more tiles than allowed.
    TooManyTiles {
        /// Number of tiles over all replicas.
        requested: usize,
        /// Configured limit.
        limit: usize,
    },
    /// The requested envelope cannot be transformed into the pyramid reference system.
    ProjectionFailed,
}

impl From<TooManyTiles> for SkipReason {
    fn from(value: TooManyTiles) -> Self {
        Self::TooManyTiles {
            requested: value.requested,
            limit: value.limit,
        }
    }
}

/// Terminal state of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// All tiles were delivered.
    Completed,
    /// The call was cancelled. Tiles painted before cancellation stay on the canvas.
    Cancelled,
    /// Nothing was drawn.
    Skipped(SkipReason),
}

/// A tile that was painted to the canvas.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PaintedTile {
    /// Periodic replica the tile was painted for.
    pub wrap_offset: i64,
    /// Mosaic of the tile.
    pub mosaic_id: String,
    /// Position of the tile in the mosaic.
    pub index: TileIndex,
}

/// Summary of a render call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderReport {
    /// How the call ended.
    pub outcome: RenderOutcome,
    /// Painted tiles, in paint order.
    pub painted: Vec<PaintedTile>,
    /// Number of tiles that were delivered but could not be painted.
    pub failed_paints: usize,
    /// Number of tiles requested over all replicas.
    pub requested: usize,
}

impl RenderReport {
    pub(crate) fn skipped(reason: SkipReason) -> Self {
        Self {
            outcome: RenderOutcome::Skipped(reason),
            painted: vec![],
            failed_paints: 0,
            requested: 0,
        }
    }

    /// Returns true if the call drew nothing because of a compatibility gap or admission control.
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, RenderOutcome::Skipped(_))
    }
}
