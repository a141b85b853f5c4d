use std::fmt::Debug;
use std::path::PathBuf;
use std::sync::Arc;

use meridian_types::Rect;

use super::TileIndex;
use crate::decoded_image::DecodedImage;
use crate::error::MeridianError;

/// Source of raw, still encoded bytes of a single tile.
pub trait TileReader: Debug + Send + Sync {
    /// Reads the encoded tile data.
    fn read(&self) -> Result<Vec<u8>, MeridianError>;
}

/// Reads encoded tile from a file.
#[derive(Debug, Clone)]
pub struct FileTileReader {
    path: PathBuf,
}

impl FileTileReader {
    /// Creates a reader for the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TileReader for FileTileReader {
    fn read(&self) -> Result<Vec<u8>, MeridianError> {
        Ok(std::fs::read(&self.path)?)
    }
}

/// Pixel content of a tile: either already decoded, or produced on demand by a reader.
#[derive(Debug, Clone)]
pub enum TileInput {
    /// Decoded RGBA pixels.
    Decoded(Arc<DecodedImage>),
    /// Encoded data that is decoded when first needed.
    Lazy(Arc<dyn TileReader>),
}

/// One delivered tile of a mosaic.
#[derive(Debug, Clone)]
pub struct TileReference {
    mosaic_id: String,
    index: TileIndex,
    bbox: Rect,
    input: TileInput,
}

impl TileReference {
    /// Creates a new tile reference.
    ///
    /// `bbox` is the world rectangle the tile pixels map to, which defines the local-to-world
    /// transform of the tile.
    pub fn new(
        mosaic_id: impl Into<String>,
        index: TileIndex,
        bbox: Rect,
        input: TileInput,
    ) -> Self {
        Self {
            mosaic_id: mosaic_id.into(),
            index,
            bbox,
            input,
        }
    }

    /// Id of the mosaic the tile belongs to.
    pub fn mosaic_id(&self) -> &str {
        &self.mosaic_id
    }

    /// Position of the tile in its mosaic.
    pub fn index(&self) -> TileIndex {
        self.index
    }

    /// World rectangle of the tile.
    pub fn bbox(&self) -> &Rect {
        &self.bbox
    }

    /// Pixel content of the tile.
    pub fn input(&self) -> &TileInput {
        &self.input
    }

    /// Returns a copy of the tile placed at a different world rectangle.
    pub fn with_bbox(self, bbox: Rect) -> Self {
        Self { bbox, ..self }
    }

    /// Returns a copy of the tile with different pixel content.
    pub fn with_input(self, input: TileInput) -> Self {
        Self { input, ..self }
    }

    /// Returns true if the pixels of the tile are already decoded.
    pub fn is_decoded(&self) -> bool {
        matches!(self.input, TileInput::Decoded(_))
    }

    /// Returns decoded pixels of the tile, decoding lazy input if necessary.
    #[cfg(feature = "image")]
    pub fn decode(&self) -> Result<Arc<DecodedImage>, MeridianError> {
        match &self.input {
            TileInput::Decoded(image) => Ok(image.clone()),
            TileInput::Lazy(reader) => {
                let bytes = reader.read()?;
                Ok(Arc::new(DecodedImage::decode(&bytes)?))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use meridian_types::Size;

    use super::*;

    #[derive(Debug)]
    struct BrokenReader;

    impl TileReader for BrokenReader {
        fn read(&self) -> Result<Vec<u8>, MeridianError> {
            Err(MeridianError::NotFound)
        }
    }

    #[cfg(feature = "image")]
    #[test]
    fn decoded_input_is_returned_as_is() {
        let image = Arc::new(DecodedImage::from_raw(vec![255; 4], Size::new(1, 1)).unwrap());
        let tile = TileReference::new(
            "m",
            TileIndex::new(0, 0),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            TileInput::Decoded(image.clone()),
        );
        assert!(Arc::ptr_eq(&tile.decode().unwrap(), &image));
    }

    #[cfg(feature = "image")]
    #[test]
    fn lazy_input_failure_is_reported() {
        let tile = TileReference::new(
            "m",
            TileIndex::new(0, 0),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            TileInput::Lazy(Arc::new(BrokenReader)),
        );
        assert!(tile.decode().is_err());

        let missing_file = TileReference::new(
            "m",
            TileIndex::new(0, 0),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            TileInput::Lazy(Arc::new(FileTileReader::new("/nonexistent/tile.png"))),
        );
        assert!(tile.decode().is_err());
        assert!(missing_file.decode().is_err());
    }

    #[test]
    fn moved_tile_keeps_identity() {
        let tile = TileReference::new(
            "m",
            TileIndex::new(2, 3),
            Rect::new(0.0, 0.0, 1.0, 1.0),
            TileInput::Lazy(Arc::new(BrokenReader)),
        );
        let moved = tile.with_bbox(Rect::new(360.0, 0.0, 361.0, 1.0));
        assert_eq!(moved.index(), TileIndex::new(2, 3));
        assert_eq!(moved.mosaic_id(), "m");
        assert_eq!(moved.bbox().x_min(), 360.0);
    }
}
