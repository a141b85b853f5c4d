//! Pixel data of a decoded tile.

use meridian_types::Size;

use crate::error::MeridianError;

/// An image that has been loaded into memory.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    bytes: Vec<u8>,
    size: Size,
}

impl DecodedImage {
    /// Decodes an image from a byte slice.
    ///
    /// Attempts to guess the format of the image from the data. Non-RGBA images
    /// will be converted to RGBA.
    #[cfg(feature = "image")]
    pub fn decode(bytes: &[u8]) -> Result<Self, MeridianError> {
        use image::GenericImageView;
        let decoded = image::load_from_memory(bytes)?;
        let (width, height) = decoded.dimensions();

        Ok(Self {
            bytes: decoded.to_rgba8().into_vec(),
            size: Size::new(width, height),
        })
    }

    /// Creates an image from raw RGBA bytes. Fails if the byte count does not match the size.
    pub fn from_raw(bytes: Vec<u8>, size: Size) -> Result<Self, MeridianError> {
        if bytes.len() as u64 != size.area() * 4 {
            return Err(MeridianError::Decoding(format!(
                "expected {} bytes for a {}x{} image, got {}",
                size.area() * 4,
                size.width(),
                size.height(),
                bytes.len()
            )));
        }

        Ok(Self { bytes, size })
    }

    /// Raw bytes of the image, in RGBA order.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Width and height of the image in pixels.
    pub fn size(&self) -> Size {
        self.size
    }
}
