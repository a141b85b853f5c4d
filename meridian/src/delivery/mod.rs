//! Asynchronous, cancellable delivery of decoded tiles.
//!
//! [`fetch_tiles`] starts a producer task which loads tiles through a [`TileSource`] and sends
//! them into a bounded channel as soon as they are ready, in completion order. The consumer side
//! of the channel is a [`TileChannel`], which is normally drained by the
//! [`TileCompositor`](crate::TileCompositor).

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::MeridianError;
use crate::pyramid::{Mosaic, TileIndex, TileReference};
#[cfg(feature = "image")]
use crate::pyramid::TileInput;

mod cache;
pub use cache::CachedTileSource;

/// Default admission limit for the number of tiles of one render call.
pub const DEFAULT_MAX_TILES: usize = 500;

/// Decode capability: produces the content of a single tile of a mosaic.
#[async_trait]
pub trait TileSource: Send + Sync {
    /// Loads and decodes the tile at `index` of `mosaic`.
    async fn load_tile(
        &self,
        mosaic: &Mosaic,
        index: TileIndex,
    ) -> Result<TileReference, MeridianError>;
}

/// Message sent through a [`TileChannel`].
#[derive(Debug)]
pub enum TileMessage {
    /// A tile is ready.
    Tile(TileReference),
    /// All tiles have been delivered. Sent exactly once, after the last tile.
    End,
}

/// Tuning parameters for the producer side of a [`TileChannel`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FetchHints {
    /// Maximum number of tiles loaded at the same time.
    pub concurrency: usize,
    /// Number of ready tiles that can wait in the channel before the producer pauses.
    pub channel_capacity: usize,
}

impl Default for FetchHints {
    fn default() -> Self {
        Self {
            concurrency: 8,
            channel_capacity: 16,
        }
    }
}

/// Receiving end of a stream of tiles.
#[derive(Debug)]
pub struct TileChannel {
    receiver: mpsc::Receiver<TileMessage>,
    token: CancellationToken,
}

impl TileChannel {
    /// Waits for the next message. Returns `None` if the producer has stopped without sending
    /// [`TileMessage::End`], which happens only after cancellation.
    pub async fn recv(&mut self) -> Option<TileMessage> {
        self.receiver.recv().await
    }

    /// Stops the producer. Loads in progress are abandoned and no more tiles are sent.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true if the channel has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for TileChannel {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Starts loading tiles at `positions` of `mosaic` on a separate task.
///
/// [Lazy](crate::pyramid::TileInput::Lazy) tiles are decoded on the blocking thread pool
/// before they are sent, so the channel carries decoded tiles only. Tiles that fail to load or
/// decode are logged and skipped. Must be called inside a `tokio` runtime.
pub fn fetch_tiles(
    source: Arc<dyn TileSource>,
    mosaic: Arc<Mosaic>,
    positions: Vec<TileIndex>,
    hints: FetchHints,
) -> TileChannel {
    let (sender, receiver) = mpsc::channel(hints.channel_capacity.max(1));
    let token = CancellationToken::new();
    let producer_token = token.clone();

    crate::async_runtime::spawn(async move {
        let total = positions.len();
        let loads = futures::stream::iter(positions)
            .map(|index| {
                let source = source.clone();
                let mosaic = mosaic.clone();
                async move {
                    let result = match source.load_tile(&mosaic, index).await {
                        Ok(tile) => decode_tile(tile).await,
                        Err(err) => Err(err),
                    };
                    (index, result)
                }
            })
            .buffer_unordered(hints.concurrency.max(1));
        tokio::pin!(loads);

        let mut delivered = 0;
        loop {
            let next = tokio::select! {
                biased;
                _ = producer_token.cancelled() => {
                    log::debug!(
                        "Tile delivery for mosaic {} cancelled after {delivered} of {total} tiles",
                        mosaic.id()
                    );
                    return;
                }
                next = loads.next() => next,
            };

            let Some((index, result)) = next else {
                break;
            };

            match result {
                Ok(tile) => {
                    let sent = tokio::select! {
                        biased;
                        _ = producer_token.cancelled() => return,
                        sent = sender.send(TileMessage::Tile(tile)) => sent,
                    };

                    if sent.is_err() {
                        log::debug!("Tile channel receiver dropped");
                        return;
                    }

                    delivered += 1;
                }
                Err(err) => {
                    log::warn!("Failed to load tile {index:?} of mosaic {}: {err}", mosaic.id());
                }
            }
        }

        log::debug!("Delivered {delivered} of {total} tiles of mosaic {}", mosaic.id());
        let _ = sender.send(TileMessage::End).await;
    });

    TileChannel { receiver, token }
}

#[cfg(feature = "image")]
async fn decode_tile(tile: TileReference) -> Result<TileReference, MeridianError> {
    if tile.is_decoded() {
        return Ok(tile);
    }

    crate::async_runtime::spawn_blocking(move || -> Result<TileReference, MeridianError> {
        let image = tile.decode()?;
        Ok(tile.with_input(TileInput::Decoded(image)))
    })
    .await
    .map_err(|err| MeridianError::Decoding(format!("decoding task failed: {err}")))?
}

// Without an image decoder lazy tiles are handed to the canvas as they are.
#[cfg(not(feature = "image"))]
async fn decode_tile(tile: TileReference) -> Result<TileReference, MeridianError> {
    Ok(tile)
}

/// Admission control rejection: a render call would request more tiles than allowed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{requested} tiles requested, limit is {limit}")]
pub struct TooManyTiles {
    /// Total number of tiles that would be requested.
    pub requested: usize,
    /// Configured limit.
    pub limit: usize,
}

/// Checks the total number of tiles of a render call against the limit.
pub fn admit(requested: usize, limit: usize) -> Result<(), TooManyTiles> {
    if requested > limit {
        Err(TooManyTiles { requested, limit })
    } else {
        Ok(())
    }
}
