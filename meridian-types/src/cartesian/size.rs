use serde::{Deserialize, Serialize};

/// Size of a rectangular area, e.g. a tile in pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    width: u32,
    height: u32,
}

impl Size {
    /// Creates a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// True if any of the dimensions is zero.
    pub fn is_zero(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of cells in the area (`width * height`).
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}
