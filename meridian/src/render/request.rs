use meridian_types::{Crs, Envelope};

use crate::compositor::CancellationMonitor;
use crate::config::RenderConfig;
use crate::delivery::DEFAULT_MAX_TILES;
use crate::selector::DEFAULT_TOLERANCE;
use crate::tile_window::DEFAULT_EPSILON;

/// Parameters of one render call.
///
/// The reference system of the envelope is the system the output is drawn in.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    source: String,
    envelope: Envelope,
    wanted_resolution: f64,
    tolerance: f64,
    max_tiles: usize,
    epsilon: f64,
    monitor: CancellationMonitor,
}

impl RenderRequest {
    /// Starts building a request for the data `source`, drawing `envelope` at
    /// `wanted_resolution` world units per pixel.
    pub fn builder(
        source: impl Into<String>,
        envelope: Envelope,
        wanted_resolution: f64,
    ) -> RenderRequestBuilder {
        RenderRequestBuilder {
            request: Self {
                source: source.into(),
                envelope,
                wanted_resolution,
                tolerance: DEFAULT_TOLERANCE,
                max_tiles: DEFAULT_MAX_TILES,
                epsilon: DEFAULT_EPSILON,
                monitor: CancellationMonitor::new(),
            },
        }
    }

    /// Name of the data source, as known to the pyramid catalog.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Requested area. Its bounds may be `NaN` for unbounded sides.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    /// Reference system of the output.
    pub fn target_crs(&self) -> &Crs {
        self.envelope.crs()
    }

    /// Wanted size of one output pixel in world units of the target system.
    pub fn wanted_resolution(&self) -> f64 {
        self.wanted_resolution
    }

    /// Allowed relative difference between the wanted resolution and a mosaic scale.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Maximum number of tiles this call may request over all replicas.
    pub fn max_tiles(&self) -> usize {
        self.max_tiles
    }

    /// Fraction of a tile within which an envelope edge is snapped to the tile edge.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Cancellation flag of the call.
    pub fn monitor(&self) -> &CancellationMonitor {
        &self.monitor
    }
}

/// Builder for a [`RenderRequest`].
#[derive(Debug, Clone)]
pub struct RenderRequestBuilder {
    request: RenderRequest,
}

impl RenderRequestBuilder {
    /// Applies the defaults of a configuration. Values set later on the builder override them.
    pub fn with_config(mut self, config: &RenderConfig) -> Self {
        self.request.tolerance = config.tolerance;
        self.request.max_tiles = config.max_tiles;
        self.request.epsilon = config.epsilon;
        self
    }

    /// Sets the resolution tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.request.tolerance = tolerance;
        self
    }

    /// Sets the tile admission limit.
    pub fn with_max_tiles(mut self, max_tiles: usize) -> Self {
        self.request.max_tiles = max_tiles;
        self
    }

    /// Sets the tile edge snapping distance, as a fraction of a tile.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.request.epsilon = epsilon;
        self
    }

    /// Uses the given monitor to cancel the call. Keep a clone of it to trip it from outside.
    pub fn with_monitor(mut self, monitor: CancellationMonitor) -> Self {
        self.request.monitor = monitor;
        self
    }

    /// Finishes the request.
    pub fn build(self) -> RenderRequest {
        self.request
    }
}
