//! Error types used by the crate.

use meridian_types::MeridianTypesError;
use thiserror::Error;

#[cfg(feature = "image")]
use image::ImageError;

/// Meridian error type.
///
/// Only [`MeridianError::CatalogUnavailable`] ever crosses the boundary of a render call.
/// All other variants describe failures of a single tile or layer, which are logged and
/// contained by the renderer.
#[derive(Debug, Error)]
pub enum MeridianError {
    /// Pyramid catalog or its backing store cannot be reached.
    #[error("pyramid catalog is unavailable: {0}")]
    CatalogUnavailable(String),
    /// Point or envelope cannot be transformed between reference systems.
    #[error("projection failed: {0}")]
    Projection(String),
    /// Tile data cannot be decoded.
    #[error("failed to decode tile: {0}")]
    Decoding(String),
    /// Image decoding error.
    #[cfg(feature = "image")]
    #[error("image decode error: {0:?}")]
    ImageDecode(#[from] ImageError),
    /// Paint capability failed to paint a tile or a feature.
    #[error("failed to paint: {0}")]
    Paint(String),
    /// Mosaic parameters do not describe a valid tile grid.
    #[error("invalid mosaic: {0}")]
    InvalidMosaic(String),
    /// Pyramid has no levels.
    #[error("invalid pyramid: {0}")]
    InvalidPyramid(String),
    /// Item not found.
    #[error("item not found")]
    NotFound,
    /// Error from the geometry types.
    #[error(transparent)]
    Types(#[from] MeridianTypesError),
    /// Error reading tile data from the FS.
    #[error("failed to read tile data")]
    FsIo(#[from] std::io::Error),
}
