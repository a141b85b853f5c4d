//! Cartesian geometry primitives.

mod polygon;
mod rect;
mod size;

pub use polygon::{Contour, Polygon};
pub use rect::Rect;
pub use size::Size;

/// 2d point with `f64` coordinates.
pub type Point2 = nalgebra::Point2<f64>;
