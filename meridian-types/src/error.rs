//! Error type used by the crate.

use thiserror::Error;

/// Error enum.
#[derive(Debug, Error)]
pub enum MeridianTypesError {
    /// Geometry cannot be constructed from the given input.
    #[error("invalid input geometry: {0}")]
    InvalidGeometry(String),
}
