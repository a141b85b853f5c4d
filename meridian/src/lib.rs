//! Meridian selects tiles of multi-resolution raster pyramids for a requested view and paints
//! them onto a caller supplied surface, correctly repeating the data across the antimeridian.
//!
//! # Rendering pipeline
//!
//! A call to [`RasterRenderer::render`] goes through these steps:
//!
//! * the [`PyramidCatalog`](pyramid::PyramidCatalog) returns the pyramids of the data source,
//!   and the [selector](selector) picks the pyramid matching the target reference system and
//!   the mosaic matching the wanted resolution;
//! * the requested envelope is split into [replicas](periodic::expand) when it crosses the wrap
//!   of a cyclic axis, and the [tile window](tile_window::compute_tile_window) of every replica
//!   is computed;
//! * the total tile count is checked against the admission limit once for the whole call;
//! * tiles are loaded on a separate task and [delivered](delivery::fetch_tiles) through a
//!   bounded channel, and the [`TileCompositor`] paints them in arrival order until the end
//!   marker arrives or the [`CancellationMonitor`] is tripped.
//!
//! Vector features take a shorter path through the [`FeatureRenderer`], which paints every
//! polygon at each period offset where it is visible.
//!
//! Compatibility gaps (no pyramid, no mosaic, nothing to draw) and admission rejections are
//! not errors: the call returns a [`RenderReport`] saying why nothing was drawn. The only error
//! that stops a call is a failure of the pyramid catalog.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub(crate) mod async_runtime;
mod color;
pub mod compositor;
pub mod config;
pub mod decoded_image;
pub mod delivery;
pub mod error;
mod messenger;
pub mod periodic;
pub mod pyramid;
pub mod render;
pub mod reproject;
pub mod selector;
pub mod tile_window;

pub use color::Color;
pub use compositor::{CancellationMonitor, TileCompositor};
pub use config::RenderConfig;
pub use error::MeridianError;
pub use messenger::Messenger;
pub use render::{Canvas, FeatureRenderer, RasterRenderer, RenderReport, RenderRequest};

// Reexport meridian_types
pub use meridian_types;
