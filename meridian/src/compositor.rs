//! Consumption of delivered tiles.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::delivery::{TileChannel, TileMessage};
use crate::pyramid::TileReference;

/// Default interval at which the compositor checks the cancellation flag while waiting.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Cancellation flag of one render call.
///
/// Cloned monitors share the same flag, so a clone can be kept by the caller and tripped from
/// any thread while the render is in progress.
#[derive(Debug, Default, Clone)]
pub struct CancellationMonitor {
    cancelled: Arc<AtomicBool>,
}

impl CancellationMonitor {
    /// Creates a monitor that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests the render to stop.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Returns true if stop was requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// State of the compositor loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CompositorState {
    /// Waiting for the next tile.
    Waiting,
    /// Handing a tile to the paint callback.
    Painting,
    /// End marker received, all tiles are painted.
    Done,
    /// Stopped because of a cancellation request.
    Cancelled,
}

/// Result of draining a tile channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompositorOutcome {
    /// Terminal state: [`CompositorState::Done`] or [`CompositorState::Cancelled`].
    pub state: CompositorState,
    /// Number of tiles passed to the paint callback.
    pub painted: usize,
}

/// Hands delivered tiles to a paint callback one at a time, in the order they arrive.
#[derive(Debug, Copy, Clone)]
pub struct TileCompositor {
    poll_interval: Duration,
}

impl Default for TileCompositor {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl TileCompositor {
    /// Creates a compositor that checks for cancellation at least every `poll_interval`.
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Drains the channel, calling `on_tile` for every received tile.
    ///
    /// Returns when the end marker is received or when `monitor` is cancelled. On cancellation
    /// the channel is cancelled as well, and a tile received after the cancellation has been
    /// observed is dropped without painting. The loop moves from [`CompositorState::Waiting`] to
    /// [`CompositorState::Painting`] for every received tile and back, until it reaches one of
    /// the terminal states.
    pub async fn consume<F>(
        &self,
        channel: &mut TileChannel,
        mut on_tile: F,
        monitor: &CancellationMonitor,
    ) -> CompositorOutcome
    where
        F: FnMut(TileReference),
    {
        let mut painted = 0;
        let mut state = CompositorState::Waiting;
        let mut pending = None;

        loop {
            state = match state {
                CompositorState::Waiting => {
                    if monitor.is_cancelled() {
                        CompositorState::Cancelled
                    } else {
                        match tokio::time::timeout(self.poll_interval, channel.recv()).await {
                            Err(_) => CompositorState::Waiting,
                            Ok(Some(TileMessage::Tile(tile))) => {
                                pending = Some(tile);
                                CompositorState::Painting
                            }
                            Ok(Some(TileMessage::End)) => CompositorState::Done,
                            Ok(None) if channel.is_cancelled() => CompositorState::Cancelled,
                            Ok(None) => {
                                log::warn!("Tile channel closed without end marker");
                                CompositorState::Done
                            }
                        }
                    }
                }
                CompositorState::Painting => match pending.take() {
                    Some(tile) if monitor.is_cancelled() => {
                        log::trace!(
                            "Dropping tile {:?} received after cancellation",
                            tile.index()
                        );
                        CompositorState::Cancelled
                    }
                    Some(tile) => {
                        log::trace!("Painting tile {:?}", tile.index());
                        on_tile(tile);
                        painted += 1;
                        CompositorState::Waiting
                    }
                    None => CompositorState::Waiting,
                },
                CompositorState::Done => {
                    return CompositorOutcome { state, painted };
                }
                CompositorState::Cancelled => {
                    return Self::cancel(channel, painted);
                }
            };
        }
    }

    fn cancel(channel: &TileChannel, painted: usize) -> CompositorOutcome {
        log::debug!("Tile compositing cancelled after {painted} tiles");
        channel.cancel();
        CompositorOutcome {
            state: CompositorState::Cancelled,
            painted,
        }
    }
}
