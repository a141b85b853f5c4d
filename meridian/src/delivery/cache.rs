use std::sync::Arc;

use async_trait::async_trait;
use quick_cache::sync::Cache;

use super::TileSource;
use crate::error::MeridianError;
use crate::pyramid::{Mosaic, TileIndex, TileReference};

/// Tile source that keeps recently loaded tiles in memory.
///
/// Tiles are keyed by mosaic id and index, so mosaic ids must be unique among all mosaics
/// loaded through one cache. Concurrent requests for the same tile wait for a single load of
/// the inner source. Failed loads are not cached.
pub struct CachedTileSource {
    inner: Arc<dyn TileSource>,
    tiles: Cache<(String, TileIndex), TileReference>,
}

impl std::fmt::Debug for CachedTileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedTileSource")
            .field("cached", &self.tiles.len())
            .finish()
    }
}

impl CachedTileSource {
    /// Wraps `inner`, keeping up to `capacity` tiles.
    pub fn new(inner: Arc<dyn TileSource>, capacity: usize) -> Self {
        Self {
            inner,
            tiles: Cache::new(capacity.max(1)),
        }
    }

    /// Number of tiles currently in the cache.
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Returns true if no tiles are cached.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[async_trait]
impl TileSource for CachedTileSource {
    async fn load_tile(
        &self,
        mosaic: &Mosaic,
        index: TileIndex,
    ) -> Result<TileReference, MeridianError> {
        let key = (mosaic.id().to_string(), index);
        match self.tiles.get_value_or_guard_async(&key).await {
            Ok(tile) => Ok(tile),
            Err(guard) => {
                let tile = self.inner.load_tile(mosaic, index).await?;
                let _ = guard.insert(tile.clone());
                Ok(tile)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use meridian_types::{Point2, Rect, Size};

    use super::*;
    use crate::pyramid::TileInput;

    #[derive(Debug, Default)]
    struct CountingSource {
        loads: AtomicUsize,
        delay: Duration,
    }

    #[derive(Debug)]
    struct NoData;

    impl crate::pyramid::TileReader for NoData {
        fn read(&self) -> Result<Vec<u8>, MeridianError> {
            Err(MeridianError::NotFound)
        }
    }

    #[async_trait]
    impl TileSource for CountingSource {
        async fn load_tile(
            &self,
            mosaic: &Mosaic,
            index: TileIndex,
        ) -> Result<TileReference, MeridianError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if index.col > 5 {
                return Err(MeridianError::NotFound);
            }

            Ok(TileReference::new(
                mosaic.id(),
                index,
                Rect::new(0.0, 0.0, 1.0, 1.0),
                TileInput::Lazy(Arc::new(NoData)),
            ))
        }
    }

    #[tokio::test]
    async fn second_load_is_served_from_cache() {
        let inner = Arc::new(CountingSource::default());
        let cached = CachedTileSource::new(inner.clone(), 10);
        let mosaic =
            Mosaic::new("m", Point2::new(0.0, 0.0), Size::new(10, 1), Size::new(1, 1), 1.0)
                .unwrap();

        let first = cached.load_tile(&mosaic, TileIndex::new(1, 0)).await.unwrap();
        let second = cached.load_tile(&mosaic, TileIndex::new(1, 0)).await.unwrap();
        assert_eq!(first.index(), second.index());
        assert_eq!(inner.loads.load(Ordering::SeqCst), 1);
        assert_eq!(cached.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_share_one_load() {
        let inner = Arc::new(CountingSource {
            delay: Duration::from_millis(30),
            ..Default::default()
        });
        let cached = CachedTileSource::new(inner.clone(), 10);
        let mosaic =
            Mosaic::new("m", Point2::new(0.0, 0.0), Size::new(10, 1), Size::new(1, 1), 1.0)
                .unwrap();

        let (first, second, other) = tokio::join!(
            cached.load_tile(&mosaic, TileIndex::new(2, 0)),
            cached.load_tile(&mosaic, TileIndex::new(2, 0)),
            cached.load_tile(&mosaic, TileIndex::new(3, 0)),
        );
        assert_eq!(first.unwrap().index(), TileIndex::new(2, 0));
        assert_eq!(second.unwrap().index(), TileIndex::new(2, 0));
        assert_eq!(other.unwrap().index(), TileIndex::new(3, 0));
        assert_eq!(inner.loads.load(Ordering::SeqCst), 2);
        assert_eq!(cached.len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let inner = Arc::new(CountingSource::default());
        let cached = CachedTileSource::new(inner.clone(), 10);
        let mosaic =
            Mosaic::new("m", Point2::new(0.0, 0.0), Size::new(10, 1), Size::new(1, 1), 1.0)
                .unwrap();

        assert!(cached.load_tile(&mosaic, TileIndex::new(7, 0)).await.is_err());
        assert!(cached.load_tile(&mosaic, TileIndex::new(7, 0)).await.is_err());
        assert_eq!(inner.loads.load(Ordering::SeqCst), 2);
        assert!(cached.is_empty());
    }
}
