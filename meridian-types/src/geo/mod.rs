//! Reference systems and projections.

mod crs;
mod projection;

pub use crs::{Crs, PeriodicAxis};
pub use projection::{Projection, WebMercator};
