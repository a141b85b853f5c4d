//! Geometry primitives used by the `meridian` tile engine.
//!
//! The crate contains plain cartesian types ([`Rect`], [`Size`], [`Polygon`]), reference
//! system tags ([`Crs`]) with the description of their cyclic axis, and the [`Envelope`]
//! type that binds a rectangle to the system it is expressed in.

pub mod cartesian;
pub mod envelope;
pub mod error;
pub mod geo;

pub use cartesian::{Contour, Point2, Polygon, Rect, Size};
pub use envelope::Envelope;
pub use error::MeridianTypesError;
pub use geo::{Crs, PeriodicAxis};
