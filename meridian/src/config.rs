//! Tunable parameters of the rendering pipeline.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::compositor::DEFAULT_POLL_INTERVAL;
use crate::delivery::{FetchHints, DEFAULT_MAX_TILES};
use crate::selector::DEFAULT_TOLERANCE;
use crate::tile_window::DEFAULT_EPSILON;

/// Configuration of a [`RasterRenderer`](crate::render::RasterRenderer).
///
/// Every field has a default, so a configuration file only needs to list the values it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Default allowed relative difference between the wanted resolution and a mosaic scale.
    pub tolerance: f64,
    /// Default tile admission limit of one render call.
    pub max_tiles: usize,
    /// Default tile edge snapping distance, as a fraction of a tile.
    pub epsilon: f64,
    /// How often the compositor checks for cancellation while waiting, in milliseconds.
    pub poll_interval_ms: u64,
    /// Maximum number of tiles loaded at the same time.
    pub fetch_concurrency: usize,
    /// Number of decoded tiles that may wait for painting.
    pub channel_capacity: usize,
    /// Capacity of the decoded tile cache. `0` disables caching.
    pub cache_capacity: usize,
    /// Maximum number of closest mosaics considered by the selector. `0` means all.
    pub max_mosaic_candidates: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let hints = FetchHints::default();
        Self {
            tolerance: DEFAULT_TOLERANCE,
            max_tiles: DEFAULT_MAX_TILES,
            epsilon: DEFAULT_EPSILON,
            poll_interval_ms: DEFAULT_POLL_INTERVAL.as_millis() as u64,
            fetch_concurrency: hints.concurrency,
            channel_capacity: hints.channel_capacity,
            cache_capacity: 1000,
            max_mosaic_candidates: 0,
        }
    }
}

impl RenderConfig {
    /// Producer side parameters of the tile channel.
    pub fn fetch_hints(&self) -> FetchHints {
        FetchHints {
            concurrency: self.fetch_concurrency.max(1),
            channel_capacity: self.channel_capacity.max(1),
        }
    }

    /// Compositor polling interval. Never zero.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_uses_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{"max_tiles": 64, "poll_interval_ms": 10}"#).unwrap();

        assert_eq!(config.max_tiles, 64);
        assert_eq!(config.poll_interval(), Duration::from_millis(10));
        assert_eq!(config.tolerance, DEFAULT_TOLERANCE);
        assert_eq!(config.fetch_hints(), FetchHints::default());
    }

    #[test]
    fn zero_values_are_clamped() {
        let config = RenderConfig {
            poll_interval_ms: 0,
            fetch_concurrency: 0,
            channel_capacity: 0,
            ..Default::default()
        };

        assert_eq!(config.poll_interval(), Duration::from_millis(1));
        assert_eq!(config.fetch_hints().concurrency, 1);
        assert_eq!(config.fetch_hints().channel_capacity, 1);
    }

    #[test]
    fn default_round_trips_through_json() {
        let config = RenderConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(serde_json::from_str::<RenderConfig>(&json).unwrap(), config);
    }
}
